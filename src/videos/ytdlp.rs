use std::{process::Stdio, sync::Arc, time::Duration};

use log::info;
use thiserror::Error;
use tokio::process::Command;

pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{binary} did not finish within {limit:?}")]
    Timeout { binary: String, limit: Duration },

    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Handle to the external `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: Arc<str>,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: Arc::from(binary.into()),
        }
    }

    /// Runs the tool to completion. The child is killed if `limit` passes
    /// first.
    pub async fn run(&self, args: &[String], limit: Duration) -> Result<ToolOutput, ToolError> {
        info!("Running {} {}", self.binary, args.join(" "));
        let child = Command::new(&*self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                binary: self.binary.to_string(),
                source,
            })?;

        match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ToolOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(source)) => Err(ToolError::Spawn {
                binary: self.binary.to_string(),
                source,
            }),
            Err(_) => Err(ToolError::Timeout {
                binary: self.binary.to_string(),
                limit,
            }),
        }
    }
}

pub fn search_args(query: &str) -> Vec<String> {
    vec![
        "--flat-playlist".into(),
        "--dump-json".into(),
        "--no-warnings".into(),
        "--".into(),
        format!("ytsearch20:{query}"),
    ]
}

pub fn playlist_info_args(url: &str) -> Vec<String> {
    vec![
        "--flat-playlist".into(),
        "--dump-json".into(),
        "--no-warnings".into(),
        "--".into(),
        url.to_string(),
    ]
}

pub fn download_args(format: &str, output_template: &str, url: &str) -> Vec<String> {
    vec![
        "-f".into(),
        format.to_string(),
        "--merge-output-format".into(),
        "mp4".into(),
        "-o".into(),
        output_template.to_string(),
        "--no-warnings".into(),
        "--".into(),
        url.to_string(),
    ]
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_output_and_status() {
        let tool = YtDlp::new("sh");
        let output = tool
            .run(
                &["-c".into(), "echo out; echo err >&2; exit 3".into()],
                Duration::from_secs(10),
            )
            .await
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn slow_child_times_out() {
        let tool = YtDlp::new("sleep");
        let err = tool
            .run(&["5".into()], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let tool = YtDlp::new("definitely-not-installed-ytdlp");
        let err = tool.run(&[], SEARCH_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[test]
    fn arguments_end_option_parsing_before_user_input() {
        let args = download_args("best", "/v/%(title)s.%(ext)s", "-rm");
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().map(String::as_str), Some("-rm"));
        assert_eq!(search_args("lofi").last().map(String::as_str), Some("ytsearch20:lofi"));
    }
}
