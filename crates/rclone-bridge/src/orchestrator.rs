//! Transfer orchestration: fluent configuration, command assembly and
//! subprocess execution.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, error, info};

use crate::command::{CommandBuilder, Operation};
use crate::config::Config;
use crate::error::{Result, RcloneError};
use crate::process::{
    OutputCallback, OutputStream, ProcessResult, ProcessRunner, TokioProcessRunner,
};
use crate::providers::{EnvironmentMap, ProviderRegistry};
use crate::stats;

/// Conventional install locations probed when no binary path is
/// configured, in order.
const BINARY_PROBE_PATHS: [&str; 4] = [
    "/bin/rclone",
    "/usr/bin/rclone",
    "/usr/local/bin/rclone",
    "/opt/homebrew/bin/rclone",
];

/// Orchestrates one rclone transfer.
///
/// An instance holds the mutable configuration for a single transfer:
/// source and target, the option bag seeded from the configured defaults,
/// and an optional output sink. The fluent setters consume and return the
/// orchestrator; a terminal operation ([`sync`](Rclone::sync),
/// [`copy`](Rclone::copy), [`move_files`](Rclone::move_files)) consumes it
/// for good, so one instance describes exactly one run.
///
/// # Example
///
/// ```rust,no_run
/// use rclone_bridge::{Config, Rclone};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::load("rclone.yaml")?;
///     let result = Rclone::new(config)
///         .source("local_media", "/photos")
///         .target("s3_backup", "/photos")
///         .with_progress(true)
///         .transfers(8)?
///         .sync()
///         .await?;
///     println!("transferred {} files", result.transferred_files());
///     Ok(())
/// }
/// ```
pub struct Rclone {
    config: Config,
    registry: Arc<ProviderRegistry>,
    runner: Arc<dyn ProcessRunner>,
    source_disk: String,
    source_path: String,
    target_disk: String,
    target_path: String,
    options: Vec<(String, Value)>,
    output_callback: Option<OutputCallback>,
}

impl Rclone {
    /// Create an orchestrator with the built-in providers and the real
    /// subprocess runner.
    pub fn new(config: Config) -> Self {
        let defaults = &config.defaults;
        let options = vec![
            ("transfers".to_string(), defaults.transfers.into()),
            ("checkers".to_string(), defaults.checkers.into()),
            ("retries".to_string(), defaults.retries.into()),
            ("progress".to_string(), defaults.progress.into()),
            ("stat_interval".to_string(), defaults.stat_interval.into()),
        ];

        Self {
            config,
            registry: Arc::new(ProviderRegistry::with_builtins()),
            runner: Arc::new(TokioProcessRunner::new()),
            source_disk: String::new(),
            source_path: "/".to_string(),
            target_disk: String::new(),
            target_path: "/".to_string(),
            options,
            output_callback: None,
        }
    }

    /// Replace the provider registry.
    pub fn with_registry(mut self, registry: Arc<ProviderRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the subprocess runner (used by tests to fake execution).
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    // ===== Fluent configuration =====

    /// Set the source disk and path.
    pub fn source(mut self, disk: impl Into<String>, path: &str) -> Self {
        self.source_disk = disk.into();
        self.source_path = normalize_path(path);
        self
    }

    /// Set the target disk and path.
    pub fn target(mut self, disk: impl Into<String>, path: &str) -> Self {
        self.target_disk = disk.into();
        self.target_path = normalize_path(path);
        self
    }

    /// Enable or disable `--progress`.
    pub fn with_progress(self, progress: bool) -> Self {
        self.set_option("progress", progress.into())
    }

    /// Set the number of parallel transfers (1-100).
    pub fn transfers(self, transfers: i64) -> Result<Self> {
        let value = crate::command::TRANSFERS.validate(&transfers.into())?;
        Ok(self.set_option("transfers", value.into()))
    }

    /// Set the number of parallel checkers (1-100).
    pub fn checkers(self, checkers: i64) -> Result<Self> {
        let value = crate::command::CHECKERS.validate(&checkers.into())?;
        Ok(self.set_option("checkers", value.into()))
    }

    /// Set the retry count forwarded to rclone (0-10).
    pub fn retries(self, retries: i64) -> Result<Self> {
        let value = crate::command::RETRIES.validate(&retries.into())?;
        Ok(self.set_option("retries", value.into()))
    }

    /// Set the statistics interval in seconds (1-3600).
    pub fn stat_interval(self, seconds: i64) -> Result<Self> {
        let value = crate::command::STAT_INTERVAL.validate(&seconds.into())?;
        Ok(self.set_option("stat_interval", value.into()))
    }

    /// Set an arbitrary option, unchecked. Known numeric options set here
    /// are still bounds-checked when the command is built.
    pub fn option(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        self.set_option(&key, value.into())
    }

    /// Register a sink for streamed subprocess output. The latest callback
    /// replaces any prior one.
    pub fn on_output(
        mut self,
        callback: impl Fn(OutputStream, &str) + Send + Sync + 'static,
    ) -> Self {
        self.output_callback = Some(Arc::new(callback));
        self
    }

    // ===== Terminal operations =====

    /// Run a `sync` operation: make target identical to source.
    pub async fn sync(self) -> Result<ProcessResult> {
        self.execute(Operation::Sync).await
    }

    /// Run a `copy` operation: copy source to target, never deleting.
    pub async fn copy(self) -> Result<ProcessResult> {
        self.execute(Operation::Copy).await
    }

    /// Run a `move` operation: move source files to the target.
    pub async fn move_files(self) -> Result<ProcessResult> {
        self.execute(Operation::Move).await
    }

    async fn execute(self, operation: Operation) -> Result<ProcessResult> {
        self.ensure_disks_configured()?;

        let binary = self.resolve_binary()?;
        let environment = self.build_environment()?;
        let command = self.build_command(&binary, operation)?;
        let timeout = self.config.timeout.map(Duration::from_secs);

        let source_label = format!("{}:{}", self.source_disk, self.source_path);
        let target_label = format!("{}:{}", self.target_disk, self.target_path);
        info!(
            operation = operation.as_str(),
            source = %source_label,
            target = %target_label,
            timeout_secs = self.config.timeout,
            "starting rclone operation"
        );
        let started = Instant::now();

        let output = self
            .runner
            .run(&command, &environment, timeout, self.output_callback.clone())
            .await?;

        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let combined = format!("{}\n{}", output.stdout, output.stderr);
        let stats = stats::parse(&combined);
        let successful = !output.timed_out && output.exit_code == 0;

        if successful {
            info!(
                operation = operation.as_str(),
                execution_time_ms,
                transferred_files = stats.transferred_files,
                transferred_bytes = stats.transferred_bytes,
                errors = stats.errors,
                "rclone operation completed successfully"
            );
        } else {
            error!(
                operation = operation.as_str(),
                exit_code = output.exit_code,
                timed_out = output.timed_out,
                execution_time_ms,
                error_output = output.stderr.as_str(),
                "rclone operation failed"
            );
        }

        Ok(ProcessResult {
            successful,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            stats,
        })
    }

    // ===== Assembly =====

    fn ensure_disks_configured(&self) -> Result<()> {
        if self.source_disk.is_empty() {
            return Err(RcloneError::MissingDisk { side: "Source" });
        }
        if self.target_disk.is_empty() {
            return Err(RcloneError::MissingDisk { side: "Target" });
        }
        Ok(())
    }

    fn resolve_binary(&self) -> Result<String> {
        if let Some(path) = &self.config.binary_path {
            return Ok(path.to_string_lossy().into_owned());
        }

        for candidate in BINARY_PROBE_PATHS {
            if is_executable(Path::new(candidate)) {
                return Ok(candidate.to_string());
            }
        }

        if let Some(paths) = std::env::var_os("PATH") {
            for dir in std::env::split_paths(&paths) {
                let candidate = dir.join("rclone");
                if is_executable(&candidate) {
                    return Ok(candidate.to_string_lossy().into_owned());
                }
            }
        }

        Err(RcloneError::BinaryNotFound)
    }

    /// Merge the provider environments of the source and target disks.
    ///
    /// A disk name missing from the disks table contributes nothing: the
    /// tool may know the remote from its own configuration, so unknown
    /// disks are tolerated rather than rejected. Keys are namespaced by
    /// upper-cased disk name, so source and target never collide.
    fn build_environment(&self) -> Result<EnvironmentMap> {
        let mut environment = EnvironmentMap::new();

        for disk_name in [&self.source_disk, &self.target_disk] {
            if let Some(disk) = self.config.disks.get(disk_name) {
                let provider = self.registry.get(&disk.driver)?;
                environment.extend(provider.build_environment(disk_name, disk)?);
            }
        }

        Ok(environment)
    }

    fn build_command(&self, binary: &str, operation: Operation) -> Result<Vec<String>> {
        let mut builder = CommandBuilder::new(binary, operation)
            .base_options(self.config.base_options.iter().cloned());

        for (key, value) in &self.options {
            builder = builder.add_option(key, value)?;
        }

        let source = self.disk_path(&self.source_disk, &self.source_path);
        let target = self.disk_path(&self.target_disk, &self.target_path);
        let command = builder.source_target(source.as_str(), target.as_str()).build();

        debug!(?command, %source, %target, "built rclone command");
        Ok(command)
    }

    /// Resolve the remote path for a disk, falling back to the plain
    /// `<disk>:<path>` form when the disk (or its driver) is unknown.
    fn disk_path(&self, disk_name: &str, path: &str) -> String {
        if let Some(disk) = self.config.disks.get(disk_name) {
            if let Ok(provider) = self.registry.get(&disk.driver) {
                return provider.build_remote_path(disk_name, path, disk);
            }
        }
        format!("{}:{}", disk_name, path.trim_start_matches('/'))
    }

    fn set_option(mut self, key: &str, value: Value) -> Self {
        match self.options.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.options.push((key.to_string(), value)),
        }
        self
    }
}

/// Normalize a path to exactly one leading slash and no trailing slash.
fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
