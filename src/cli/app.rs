//! Interactive session loop

use crate::cli::output::OutputFormatter;
use crate::cli::prompt::Prompter;
use crate::core::downloader::{DownloadMode, DownloadRequest, Downloader};
use crate::error::DydlError;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const GOODBYE: &str = "Thanks for using DYDL, goodbye!";
const INTERRUPTED: &str = "Program interrupted, goodbye!";

/// Menu choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Download(DownloadMode),
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Download(DownloadMode::Single)),
            "2" => Some(MenuChoice::Download(DownloadMode::Playlist)),
            "3" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Menu, URL prompt, dispatch, continue prompt
pub struct App<P: Prompter> {
    downloader: Downloader,
    formatter: Arc<OutputFormatter>,
    prompter: P,
}

impl<P: Prompter> App<P> {
    pub fn new(downloader: Downloader, formatter: Arc<OutputFormatter>, prompter: P) -> Self {
        Self {
            downloader,
            formatter,
            prompter,
        }
    }

    /// Run until the user exits. End of input ends the session cleanly.
    pub async fn run(&mut self) -> Result<(), DydlError> {
        self.formatter.print_banner();
        self.report_cookies();

        let download_dir = self.downloader.ensure_download_dir()?;
        debug!(dir = %download_dir.display(), "Download directory ready");

        match self.session_loop(&download_dir).await {
            Err(e) if e.is_interrupted() => {
                println!();
                self.formatter.print_farewell(INTERRUPTED);
                Ok(())
            }
            other => other,
        }
    }

    fn report_cookies(&self) {
        let status = &self.downloader.session().status;
        self.formatter.print_cookie_status(status);
        if status.needs_attention() {
            self.formatter
                .print_cookie_hint(&self.downloader.config().cookies.file_path);
        }
    }

    async fn session_loop(&mut self, download_dir: &Path) -> Result<(), DydlError> {
        loop {
            let mode = match self.choose_mode()? {
                MenuChoice::Download(mode) => mode,
                MenuChoice::Exit => break,
            };

            let url = self.ask_url()?;
            info!(url = %url, ?mode, "Download requested");

            let request = DownloadRequest::new(url, mode);
            let outcome = self
                .downloader
                .download(&request, &mut self.prompter)
                .await?;
            debug!(?outcome, "Download finished");

            if outcome.is_success() {
                self.formatter.print_download_path(download_dir);
            }

            println!();
            if !self.prompter.confirm("Continue downloading? (y/n): ")? {
                break;
            }
        }

        self.formatter.print_farewell(GOODBYE);
        Ok(())
    }

    fn choose_mode(&mut self) -> Result<MenuChoice, DydlError> {
        loop {
            println!();
            self.formatter.print_menu();
            let input = self.prompter.ask("Enter choice (1-3): ")?;
            match MenuChoice::parse(&input) {
                Some(choice) => return Ok(choice),
                None => self.formatter.error("Invalid choice, please try again"),
            }
        }
    }

    fn ask_url(&mut self) -> Result<String, DydlError> {
        self.formatter.print_url_help();
        loop {
            let url = self.prompter.ask("> ")?;
            if !url.trim().is_empty() {
                return Ok(url.trim().to_string());
            }
            self.formatter.error("Link cannot be empty");
        }
    }

    /// Gives the prompter back, mainly for inspecting scripted sessions
    pub fn into_prompter(self) -> P {
        self.prompter
    }
}
