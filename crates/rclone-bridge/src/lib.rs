//! # rclone-bridge
//!
//! Typed orchestration layer for [rclone](https://rclone.org) transfers
//! across heterogeneous storage backends.
//!
//! rclone already knows how to move bytes between local disks, S3-compatible
//! stores, SFTP and FTP hosts; this library supplies everything around that:
//!
//! - **Providers** map named disk configurations to the
//!   `RCLONE_CONFIG_<DISK>_*` environment variables and remote path strings
//!   rclone expects, with per-backend validation and credential obscuring
//! - **Command building** renders a bounds-checked, reproducible argument
//!   vector for `sync`/`copy`/`move`
//! - **Execution** runs the subprocess with an optional timeout, streaming
//!   output to a callback while retaining it for inspection
//! - **Statistics parsing** turns rclone's free-form progress text into a
//!   typed [`TransferStats`] record with derived rates
//!
//! ## Example
//!
//! ```rust,no_run
//! use rclone_bridge::{Config, Rclone};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("rclone.yaml")?;
//!     let result = Rclone::new(config)
//!         .source("local_media", "/photos")
//!         .target("s3_backup", "/photos")
//!         .sync()
//!         .await?;
//!     if result.failed() {
//!         eprintln!("sync failed: {}", result.stderr);
//!     }
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod obscure;
pub mod orchestrator;
pub mod process;
pub mod providers;
pub mod stats;

// Re-exports for convenient access
pub use command::{CommandBuilder, Operation};
pub use config::{Config, DiskConfig, TransferDefaults};
pub use error::{RcloneError, Result};
pub use orchestrator::Rclone;
pub use process::{
    OutputCallback, OutputStream, ProcessOutput, ProcessResult, ProcessRunner, TokioProcessRunner,
};
pub use providers::{
    EnvironmentMap, FtpProvider, LocalProvider, Provider, ProviderRegistry, S3Provider,
    SftpProvider,
};
pub use stats::TransferStats;
