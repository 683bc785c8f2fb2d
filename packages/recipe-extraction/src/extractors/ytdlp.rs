//! [`VideoMetadataTool`] backed by the `yt-dlp` binary.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::traits::video::{VideoLookup, VideoMetadata, VideoMetadataTool};

const DEFAULT_BINARY: &str = "yt-dlp";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const INSTALL_HINT: &str = "Install it with: pip install yt-dlp";

/// Runs `yt-dlp --dump-json --skip-download` and parses its JSON.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
    timeout: Duration,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Binary name on `PATH` or an explicit path.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve_binary(&self) -> ExtractResult<PathBuf> {
        which::which(&self.binary).map_err(|_| ExtractError::MissingCapability {
            tool: DEFAULT_BINARY.to_string(),
            hint: INSTALL_HINT.to_string(),
        })
    }

    fn args(url: &str, lookup: &VideoLookup) -> Vec<String> {
        let mut args: Vec<String> = ["--dump-json", "--skip-download", "--no-warnings", "--no-playlist"]
            .iter()
            .map(|a| a.to_string())
            .collect();

        if !lookup.caption_languages.is_empty() {
            args.extend(
                ["--write-subs", "--write-auto-subs", "--sub-format", "vtt", "--sub-langs"]
                    .iter()
                    .map(|a| a.to_string()),
            );
            args.push(lookup.caption_languages.join(","));
        }

        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl VideoMetadataTool for YtDlp {
    async fn fetch_metadata(&self, url: &str, lookup: &VideoLookup) -> ExtractResult<VideoMetadata> {
        let binary = self.resolve_binary()?;
        debug!(url = %url, binary = %binary.display(), "Running yt-dlp");

        let mut command = Command::new(&binary);
        command.args(Self::args(url, lookup)).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ExtractError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| ExtractError::platform("yt-dlp", format!("failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status));
            return Err(ExtractError::platform("yt-dlp", message));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ExtractError::platform("yt-dlp", format!("unreadable yt-dlp output: {}", e)))
    }
}
