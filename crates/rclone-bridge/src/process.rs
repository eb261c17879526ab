//! Subprocess execution and result types.
//!
//! The orchestrator never talks to `tokio::process` directly: it goes
//! through the [`ProcessRunner`] trait so tests can substitute a fake
//! subprocess. [`TokioProcessRunner`] is the real implementation, with
//! piped output streamed line-by-line to an optional callback while the
//! full text is retained for statistics parsing.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::Result;
use crate::stats::TransferStats;

/// Which pipe a streamed chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    /// Short tag passed to output callbacks: "out" or "err".
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStream::Stdout => "out",
            OutputStream::Stderr => "err",
        }
    }
}

/// Sink for streamed subprocess output lines.
pub type OutputCallback = Arc<dyn Fn(OutputStream, &str) + Send + Sync>;

/// Raw outcome of one subprocess run.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, or -1 when the process was killed by the timeout or a
    /// signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the configured timeout elapsed before the process exited.
    pub timed_out: bool,
}

/// Executes a command line with an additive environment under an optional
/// timeout.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `argv[0]` with `argv[1..]` as arguments.
    ///
    /// A timeout is not an error: the child is killed and the output is
    /// returned with `timed_out` set. Errors are reserved for failures to
    /// spawn or wait on the process at all.
    async fn run(
        &self,
        argv: &[String],
        env: &HashMap<String, String>,
        timeout: Option<Duration>,
        on_output: Option<OutputCallback>,
    ) -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        argv: &[String],
        env: &HashMap<String, String>,
        timeout: Option<Duration>,
        on_output: Option<OutputCallback>,
    ) -> Result<ProcessOutput> {
        let (binary, args) = argv
            .split_first()
            .ok_or_else(|| crate::error::RcloneError::Config("empty command line".to_string()))?;

        let mut child = Command::new(binary)
            .args(args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().expect("stdout is piped");
        let stderr = child.stderr.take().expect("stderr is piped");
        let stdout_task = tokio::spawn(drain(stdout, OutputStream::Stdout, on_output.clone()));
        let stderr_task = tokio::spawn(drain(stderr, OutputStream::Stderr, on_output));

        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => Some(status?),
                Err(_) => {
                    warn!(timeout_secs = limit.as_secs(), "process timed out, killing");
                    child.kill().await.ok();
                    None
                }
            },
            None => Some(child.wait().await?),
        };

        // The pipes reach EOF once the child is gone, so the drain tasks
        // finish even on the kill path.
        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        Ok(ProcessOutput {
            exit_code: status.and_then(|s| s.code()).unwrap_or(-1),
            stdout,
            stderr,
            timed_out: status.is_none(),
        })
    }
}

async fn drain<R>(reader: R, stream: OutputStream, on_output: Option<OutputCallback>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut collected = String::new();

    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(callback) = &on_output {
            callback(stream, &line);
        }
        debug!(stream = stream.as_str(), line = line.as_str(), "process output");
        collected.push_str(&line);
        collected.push('\n');
    }

    collected
}

/// Immutable record of one completed (or timed-out) transfer.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    /// Whether the process exited with status zero within the timeout.
    pub successful: bool,
    /// Exit code (-1 when killed).
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Statistics parsed from the combined output.
    pub stats: TransferStats,
}

impl ProcessResult {
    /// Whether the transfer succeeded.
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    /// Whether the transfer failed.
    pub fn failed(&self) -> bool {
        !self.successful
    }

    /// Files transferred, from the parsed statistics.
    pub fn transferred_files(&self) -> u64 {
        self.stats.transferred_files
    }

    /// Bytes transferred, from the parsed statistics.
    pub fn transferred_bytes(&self) -> u64 {
        self.stats.transferred_bytes
    }

    /// Error count, from the parsed statistics.
    pub fn errors(&self) -> u64 {
        self.stats.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_runs_process_and_captures_output() {
        let argv: Vec<String> = ["/bin/sh", "-c", "echo hello; echo oops >&2"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let output = TokioProcessRunner::new()
            .run(&argv, &HashMap::new(), None, None)
            .await
            .unwrap();

        assert_eq!(output.exit_code, 0);
        assert!(!output.timed_out);
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_code() {
        let argv: Vec<String> = ["/bin/sh", "-c", "exit 7"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let output = TokioProcessRunner::new()
            .run(&argv, &HashMap::new(), None, None)
            .await
            .unwrap();
        assert_eq!(output.exit_code, 7);
    }

    #[tokio::test]
    async fn test_environment_is_passed() {
        let argv: Vec<String> = ["/bin/sh", "-c", "echo $RCLONE_CONFIG_X_TYPE"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let env = HashMap::from([("RCLONE_CONFIG_X_TYPE".to_string(), "s3".to_string())]);

        let output = TokioProcessRunner::new()
            .run(&argv, &env, None, None)
            .await
            .unwrap();
        assert_eq!(output.stdout, "s3\n");
    }

    #[tokio::test]
    async fn test_timeout_kills_the_process() {
        let argv: Vec<String> = ["/bin/sh", "-c", "echo started; sleep 30"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let output = TokioProcessRunner::new()
            .run(
                &argv,
                &HashMap::new(),
                Some(Duration::from_millis(200)),
                None,
            )
            .await
            .unwrap();

        assert!(output.timed_out);
        assert_eq!(output.exit_code, -1);
        assert_eq!(output.stdout, "started\n");
    }

    #[tokio::test]
    async fn test_output_callback_receives_tagged_lines() {
        let seen: Arc<Mutex<Vec<(OutputStream, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: OutputCallback = Arc::new(move |stream, line| {
            sink.lock().unwrap().push((stream, line.to_string()));
        });

        let argv: Vec<String> = ["/bin/sh", "-c", "echo one; echo two >&2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        TokioProcessRunner::new()
            .run(&argv, &HashMap::new(), None, Some(callback))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&(OutputStream::Stdout, "one".to_string())));
        assert!(seen.contains(&(OutputStream::Stderr, "two".to_string())));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let argv: Vec<String> = vec!["/definitely/not/a/binary".to_string()];
        let result = TokioProcessRunner::new()
            .run(&argv, &HashMap::new(), None, None)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_output_stream_tags() {
        assert_eq!(OutputStream::Stdout.as_str(), "out");
        assert_eq!(OutputStream::Stderr.as_str(), "err");
    }
}
