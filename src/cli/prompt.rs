//! Interactive prompts

use crate::error::DydlError;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Answers accepted as "yes" at every confirmation
pub const AFFIRMATIVE_ANSWERS: &[&str] = &["y", "yes", "是"];

/// Whether `answer` is an affirmative reply
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE_ANSWERS.contains(&answer.as_str())
}

/// Source of user answers
pub trait Prompter: Send {
    /// Show `message` and read one line. End of input is
    /// [`DydlError::Interrupted`].
    fn ask(&mut self, message: &str) -> Result<String, DydlError>;

    /// Ask a yes/no question
    fn confirm(&mut self, message: &str) -> Result<bool, DydlError> {
        Ok(is_affirmative(&self.ask(message)?))
    }
}

/// Prompts on the terminal
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for StdinPrompter {
    fn ask(&mut self, message: &str) -> Result<String, DydlError> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", message.green())?;
        stdout.flush()?;

        // Blocks a runtime worker; the multi-thread runtime keeps the Ctrl-C watcher running
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(DydlError::Interrupted);
        }
        Ok(line.trim().to_string())
    }
}

/// Replays canned answers; runs out as an interruption
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompts shown so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, message: &str) -> Result<String, DydlError> {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or(DydlError::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        for answer in ["y", "Y", "yes", "YES", " yes ", "是"] {
            assert!(is_affirmative(answer), "{answer:?} should be affirmative");
        }
        for answer in ["n", "no", "", "yep", "否", "1"] {
            assert!(!is_affirmative(answer), "{answer:?} should be negative");
        }
    }

    #[test]
    fn test_scripted_prompter() {
        let mut prompter = ScriptedPrompter::new(["  1 ", "y"]);
        assert_eq!(prompter.ask("Choice: ").unwrap(), "1");
        assert!(prompter.confirm("Continue? ").unwrap());
        assert!(prompter.ask("More? ").unwrap_err().is_interrupted());
        assert_eq!(prompter.asked(), ["Choice: ", "Continue? ", "More? "]);
        assert_eq!(prompter.remaining(), 0);
    }
}
