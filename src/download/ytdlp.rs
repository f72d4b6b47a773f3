//! `yt-dlp` subprocess backend

use crate::config::AppConfig;
use crate::core::MediaMetadata;
use crate::download::fetcher::{FetchError, FetchOptions, MediaFetcher, PlaylistItems};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Stderr lines kept for the failure message
const STDERR_TAIL_LINES: usize = 20;

/// Runs `yt-dlp` for probing and downloading
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    socket_timeout: Duration,
    retries: u32,
    show_progress: bool,
    skip_existing: bool,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    /// Create a backend for the given executable
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            socket_timeout: Duration::from_secs(30),
            retries: 3,
            show_progress: true,
            skip_existing: true,
        }
    }

    /// Create a backend from the `fetcher` and `download` config sections
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.fetcher.binary)
            .with_timeout(config.download.timeout)
            .with_retries(config.download.retries)
            .with_progress(config.download.show_progress)
            .with_skip_existing(config.download.skip_existing)
    }

    /// Set socket timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    /// Set the tool's own retry count
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Show or hide the tool's progress output
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Keep files that already exist
    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments for a metadata-only run
    pub fn probe_args(&self, url: &str, options: &FetchOptions) -> Vec<String> {
        let mut args = self.common_args(options);
        args.push("--dump-single-json".to_string());
        args.push("--skip-download".to_string());
        if options.is_playlist() {
            args.push("--flat-playlist".to_string());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Arguments for a download run
    pub fn fetch_args(&self, url: &str, options: &FetchOptions) -> Vec<String> {
        let mut args = self.common_args(options);
        if !self.show_progress {
            args.push("--no-progress".to_string());
        }
        if self.skip_existing {
            args.push("--no-overwrites".to_string());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    fn common_args(&self, options: &FetchOptions) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            options.format_selector.clone(),
            "--output".to_string(),
            options.output_template.clone(),
            "--socket-timeout".to_string(),
            self.socket_timeout.as_secs().max(1).to_string(),
            "--retries".to_string(),
            self.retries.to_string(),
        ];

        for (name, value) in &options.http_headers {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }

        if let Some(cookie_file) = &options.cookie_file {
            args.push("--cookies".to_string());
            args.push(cookie_file.to_string_lossy().into_owned());
        }

        match options.playlist_items {
            Some(PlaylistItems::All) => args.push("--yes-playlist".to_string()),
            None => args.push("--no-playlist".to_string()),
        }

        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> FetchError {
        FetchError::Spawn {
            program: self.binary.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn probe(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<Option<MediaMetadata>, FetchError> {
        let args = self.probe_args(url, options);
        debug!(binary = %self.binary.display(), ?args, "Probing media");

        let output = self
            .command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(output.status, stderr.lines()));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<(), FetchError> {
        let args = self.fetch_args(url, options);
        info!(binary = %self.binary.display(), url, "Starting media download");
        debug!(?args, "Download arguments");

        // stdout stays on the terminal so the tool's progress is visible
        let mut child = self
            .command(&args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let tail = match child.stderr.take() {
            Some(stderr) => echo_stderr(stderr).await,
            None => VecDeque::new(),
        };

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(failure(status, tail.iter().map(String::as_str)))
        }
    }
}

/// Echo the tool's stderr and keep its last lines.
///
/// Lines are decoded lossily since the tool writes in the console's locale
/// encoding. A read error ends echoing but never the download.
async fn echo_stderr<R>(stderr: R) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stderr);
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(&['\n', '\r'][..]).to_string();
                eprintln!("{}", line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Err(e) => {
                warn!(error = %e, "Stopped reading media tool stderr");
                break;
            }
        }
    }

    tail
}

/// Parse `--dump-single-json` output; nothing or `null` means no media
pub fn parse_probe_output(stdout: &str) -> Result<Option<MediaMetadata>, FetchError> {
    let stdout = stdout.trim();
    if stdout.is_empty() || stdout == "null" {
        return Ok(None);
    }
    Ok(serde_json::from_str(stdout)?)
}

fn failure<'a>(status: ExitStatus, stderr: impl Iterator<Item = &'a str>) -> FetchError {
    FetchError::Failed {
        code: status.code(),
        message: summarize_stderr(stderr, status.code()),
    }
}

/// Prefer the tool's `ERROR:` lines, then its last line of output
fn summarize_stderr<'a>(lines: impl Iterator<Item = &'a str>, code: Option<i32>) -> String {
    let lines: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();

    let errors: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| line.starts_with("ERROR:"))
        .collect();
    if !errors.is_empty() {
        return errors.join("\n");
    }

    match (lines.last(), code) {
        (Some(last), _) => last.to_string(),
        (None, Some(code)) => format!("media tool exited with status {}", code),
        (None, None) => "media tool was terminated by a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn options(playlist: bool) -> FetchOptions {
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), "UA".to_string());
        headers.insert("Cookie".to_string(), "a=1; b=2".to_string());
        FetchOptions {
            format_selector: "best".to_string(),
            output_template: "downloads/42_%(title)s.%(ext)s".to_string(),
            http_headers: headers,
            cookie_file: None,
            playlist_items: if playlist { Some(PlaylistItems::All) } else { None },
        }
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_probe_args_single() {
        let ytdlp = YtDlp::new("yt-dlp").with_timeout(Duration::from_secs(15)).with_retries(5);
        let args = ytdlp.probe_args("https://www.douyin.com/video/42", &options(false));

        assert!(has_pair(&args, "--format", "best"));
        assert!(has_pair(&args, "--output", "downloads/42_%(title)s.%(ext)s"));
        assert!(has_pair(&args, "--socket-timeout", "15"));
        assert!(has_pair(&args, "--retries", "5"));
        assert!(has_pair(&args, "--add-header", "Cookie:a=1; b=2"));
        assert!(has_pair(&args, "--add-header", "User-Agent:UA"));
        assert!(args.contains(&"--dump-single-json".to_string()));
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--flat-playlist".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
        assert_eq!(args[args.len() - 2..], ["--", "https://www.douyin.com/video/42"]);
    }

    #[test]
    fn test_probe_args_playlist() {
        let args = YtDlp::default().probe_args("https://example.com/mix", &options(true));
        assert!(args.contains(&"--yes-playlist".to_string()));
        assert!(args.contains(&"--flat-playlist".to_string()));
        assert!(!args.contains(&"--no-playlist".to_string()));
    }

    #[test]
    fn test_fetch_args() {
        let mut opts = options(false);
        opts.cookie_file = Some(PathBuf::from("cookies.txt"));

        let args = YtDlp::default()
            .with_progress(false)
            .with_skip_existing(true)
            .fetch_args("https://example.com/v", &opts);

        assert!(has_pair(&args, "--cookies", "cookies.txt"));
        assert!(args.contains(&"--no-progress".to_string()));
        assert!(args.contains(&"--no-overwrites".to_string()));
        assert!(!args.contains(&"--dump-single-json".to_string()));

        let args = YtDlp::default()
            .with_skip_existing(false)
            .fetch_args("https://example.com/v", &opts);
        assert!(!args.contains(&"--no-progress".to_string()));
        assert!(!args.contains(&"--no-overwrites".to_string()));
    }

    #[test]
    fn test_parse_probe_output() {
        assert_eq!(parse_probe_output("").unwrap(), None);
        assert_eq!(parse_probe_output(" null\n").unwrap(), None);

        let metadata = parse_probe_output(r#"{"title":"Cats","duration":12}"#)
            .unwrap()
            .unwrap();
        assert_eq!(metadata.display_title(), "Cats");

        assert!(matches!(
            parse_probe_output("not json"),
            Err(FetchError::Metadata(_))
        ));
    }

    #[test]
    fn test_summarize_stderr() {
        let stderr = "[douyin] Extracting URL\nWARNING: slow\nERROR: [Douyin] 42: Fresh cookies are needed\n";
        assert_eq!(
            summarize_stderr(stderr.lines(), Some(1)),
            "ERROR: [Douyin] 42: Fresh cookies are needed"
        );

        assert_eq!(summarize_stderr("a\nlast line\n\n".lines(), Some(1)), "last line");
        assert_eq!(
            summarize_stderr("".lines(), Some(2)),
            "media tool exited with status 2"
        );
    }

    #[tokio::test]
    async fn test_echo_stderr_decodes_lossily() {
        let stderr: &[u8] = b"[douyin] start\nWARNING: \xca\xd3\xc6\xb5 title\r\nERROR: last";
        let tail = echo_stderr(stderr).await;

        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0], "[douyin] start");
        assert!(tail[1].starts_with("WARNING: "));
        assert!(tail[1].ends_with(" title"));
        assert_eq!(tail[2], "ERROR: last");
    }

    #[tokio::test]
    async fn test_echo_stderr_keeps_last_lines() {
        let stderr: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = echo_stderr(stderr.as_bytes()).await;

        assert_eq!(tail.len(), STDERR_TAIL_LINES);
        assert_eq!(tail.front().map(String::as_str), Some("line 10"));
        assert_eq!(tail.back().map(String::as_str), Some("line 29"));
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_survives_non_utf8_stderr() {
        let temp = tempfile::tempdir().unwrap();
        let marker = temp.path().join("done");
        let tool = fake_tool(
            temp.path(),
            &format!(
                "printf 'WARNING: \\312\\323\\306\\265 title\\n' >&2\nsleep 0.2\ntouch '{}'\nexit 0",
                marker.display()
            ),
        );

        let result = YtDlp::new(tool).fetch("https://example.com/v", &options(false)).await;

        assert!(result.is_ok(), "fetch failed: {:?}", result);
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_failure_carries_error_line() {
        let temp = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            temp.path(),
            "echo 'WARNING: slow' >&2\necho 'ERROR: Fresh cookies are needed' >&2\nexit 1",
        );

        let err = YtDlp::new(tool)
            .fetch("https://example.com/v", &options(false))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Failed { code: Some(1), .. }));
        assert_eq!(err.to_string(), "ERROR: Fresh cookies are needed");
        assert!(err.is_cookie_related());
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let ytdlp = YtDlp::new("/nonexistent/yt-dlp-binary");
        let result = ytdlp.probe("https://example.com", &options(false)).await;
        assert!(matches!(result, Err(FetchError::Spawn { .. })));
    }
}
