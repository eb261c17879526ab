//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the rclone binary. When unset, conventional install
    /// locations and the PATH are probed at execution time.
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Subprocess timeout in seconds. `null` disables the timeout.
    #[serde(default = "default_timeout")]
    pub timeout: Option<u64>,

    /// Flags prepended to every command, in order.
    #[serde(default = "default_base_options")]
    pub base_options: Vec<String>,

    /// Default values for the per-transfer options.
    #[serde(default)]
    pub defaults: TransferDefaults,

    /// Named storage endpoints, keyed by disk name.
    #[serde(default)]
    pub disks: HashMap<String, DiskConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binary_path: None,
            timeout: default_timeout(),
            base_options: default_base_options(),
            defaults: TransferDefaults::default(),
            disks: HashMap::new(),
        }
    }
}

/// Default values applied to every transfer before fluent overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferDefaults {
    /// Number of parallel file transfers (default: 4).
    #[serde(default = "default_transfers")]
    pub transfers: i64,

    /// Number of parallel checkers (default: 8).
    #[serde(default = "default_checkers")]
    pub checkers: i64,

    /// Retry count forwarded to rclone (default: 3).
    #[serde(default = "default_retries")]
    pub retries: i64,

    /// Whether to pass `--progress` (default: false).
    #[serde(default)]
    pub progress: bool,

    /// Statistics print interval in seconds (default: 1).
    #[serde(default = "default_stat_interval")]
    pub stat_interval: i64,
}

impl Default for TransferDefaults {
    fn default() -> Self {
        Self {
            transfers: default_transfers(),
            checkers: default_checkers(),
            retries: default_retries(),
            progress: false,
            stat_interval: default_stat_interval(),
        }
    }
}

/// Configuration of a single named storage endpoint.
///
/// Only `driver` is universal; the remaining fields are read by the
/// provider matching the driver and ignored otherwise.
#[derive(Clone, Serialize, Deserialize)]
pub struct DiskConfig {
    /// Backend kind: "local", "s3", "sftp" or "ftp".
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Root directory (local) or key prefix inside the bucket (s3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Remote host name or IPv4 address (sftp, ftp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Remote port (sftp defaults to 22, ftp to 21).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Login user name (sftp, ftp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Login password (sftp, ftp). Obscured before it reaches the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Access key id (s3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Secret access key (s3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Region identifier (s3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Bucket name (s3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Custom endpoint URL (s3-compatible stores).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Force path-style addressing (s3-compatible stores).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_path_style_endpoint: Option<bool>,

    /// Path to a private key file on the host running rclone (sftp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,

    /// Inline PEM-encoded private key (sftp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_pem: Option<String>,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            root: None,
            host: None,
            port: None,
            username: None,
            password: None,
            key: None,
            secret: None,
            region: None,
            bucket: None,
            endpoint: None,
            use_path_style_endpoint: None,
            key_file: None,
            key_pem: None,
        }
    }
}

// Credentials must never leak through Debug output or logs.
impl std::fmt::Debug for DiskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> Option<&str> {
            value.as_ref().map(|_| "[REDACTED]")
        }

        f.debug_struct("DiskConfig")
            .field("driver", &self.driver)
            .field("root", &self.root)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("key", &self.key)
            .field("secret", &redact(&self.secret))
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("use_path_style_endpoint", &self.use_path_style_endpoint)
            .field("key_file", &self.key_file)
            .field("key_pem", &redact(&self.key_pem))
            .finish()
    }
}

fn default_timeout() -> Option<u64> {
    Some(3600)
}

fn default_base_options() -> Vec<String> {
    vec![
        "--delete-after".to_string(),
        "--fast-list".to_string(),
        "--checksum".to_string(),
    ]
}

fn default_transfers() -> i64 {
    4
}

fn default_checkers() -> i64 {
    8
}

fn default_retries() -> i64 {
    3
}

fn default_stat_interval() -> i64 {
    1
}

fn default_driver() -> String {
    "local".to_string()
}
