//! Output formatting for the interactive session

use crate::cli::args::VerbosityLevel;
use crate::core::cookies::CookieStatus;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Output formatter for dydl
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    fn is_quiet(&self) -> bool {
        self.verbosity == VerbosityLevel::Quiet
    }

    /// Spinner shown while waiting on the media tool
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.is_quiet() {
            return None;
        }

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.yellow} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if !self.is_quiet() {
            println!("{}", message.yellow());
        }
    }

    /// Print progress step message
    pub fn step(&self, message: &str) {
        if !self.is_quiet() {
            println!("{}", message.blue());
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if !self.is_quiet() {
            println!("{} {}", "✅".green(), message.green());
        }
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if !self.is_quiet() {
            println!("{} {}", "⚠️ ".yellow(), message.yellow());
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "❌".red(), message.red());
    }

    /// Print debug message
    pub fn debug(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Verbose {
            println!("🐛 {}", message.dimmed());
        }
    }

    /// Print the startup banner
    pub fn print_banner(&self) {
        if self.is_quiet() {
            return;
        }

        let lines = [
            format!("DYDL - Short Video Downloader v{}", env!("CARGO_PKG_VERSION")),
            "Single videos and collections".to_string(),
            "Cookies: configured by file".to_string(),
        ];
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;

        println!();
        println!("{}", format!("╔{}╗", "═".repeat(width)).cyan());
        for line in &lines {
            let padding = width - line.chars().count() - 2;
            println!("{}", format!("║  {}{}║", line, " ".repeat(padding)).cyan());
        }
        println!("{}", format!("╚{}╝", "═".repeat(width)).cyan());
        println!();
    }

    /// Print the main menu
    pub fn print_menu(&self) {
        println!("{}", "Choose a download mode:".yellow());
        println!("1. Download a single video");
        println!("2. Download a collection (playlist)");
        println!("3. Exit");
    }

    /// Print the URL prompt header
    pub fn print_url_help(&self) {
        println!();
        println!("{}", "Paste a video link:".yellow());
        if !self.is_quiet() {
            println!("Supported formats:");
            println!("- single video link");
            println!("- collection link");
            println!("- share link");
        }
    }

    /// Report the result of loading the cookie file
    pub fn print_cookie_status(&self, status: &CookieStatus) {
        match status {
            CookieStatus::Disabled => self.debug("Cookies disabled in configuration"),
            CookieStatus::Missing(path) => {
                self.warning(&format!("Cookie file not found: {}", path.display()))
            }
            CookieStatus::Empty(path) => {
                self.warning(&format!("Cookie file is empty: {}", path.display()))
            }
            CookieStatus::Unreadable { path, reason } => self.warning(&format!(
                "Failed to read cookie file {}: {}",
                path.display(),
                reason
            )),
            CookieStatus::LoadedHeader { pairs } => {
                self.success(&format!("Loaded Cookie header file ({} cookies)", pairs))
            }
            CookieStatus::LoadedNetscape(_) => self.success("Loaded Netscape cookie file"),
        }
    }

    /// Startup hint when cookies are enabled but unusable
    pub fn print_cookie_hint(&self, cookie_file: &Path) {
        self.info(&format!(
            "Hint: cookies are enabled but {} is missing or empty",
            cookie_file.display()
        ));
        self.info("Edit that file and retry, or set cookies.enabled to false in the config file");
        println!();
    }

    /// Guidance shown when the media tool rejects the cookies
    pub fn print_cookie_guidance(&self, cookie_file: &Path) {
        self.error("Download failed: valid cookies are required");
        self.info(&format!(
            "Put your cookies in {} and check the \"cookies\" section of the config file",
            cookie_file.display()
        ));
    }

    /// Print video information
    pub fn print_video_info(&self, title: &str, duration_secs: u64) {
        if self.is_quiet() {
            return;
        }

        println!("{}", format!("📹 Title: {}", title).green());
        println!(
            "{}",
            format!(
                "⏱️  Duration: {}",
                format_duration(Duration::from_secs(duration_secs))
            )
            .green()
        );
    }

    /// Print collection information
    pub fn print_playlist_info(&self, title: &str, item_count: usize) {
        if self.is_quiet() {
            return;
        }

        println!("{}", format!("📋 Collection: {}", title).green());
        println!("{}", format!("📊 Videos: {}", item_count).green());
    }

    /// Print where downloads are saved
    pub fn print_download_path(&self, path: &Path) {
        println!();
        println!("{}", format!("💾 Download folder: {}", path.display()).green());
        if !self.is_quiet() {
            println!(
                "{}",
                "Open this folder in your file manager to see the videos".yellow()
            );
        }
    }

    /// Print the farewell line
    pub fn print_farewell(&self, message: &str) {
        println!("{}", message.yellow());
    }
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if seconds == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m {}s", minutes, seconds)
        }
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        }
    }
}
