//! Storage backend providers.
//!
//! A [`Provider`] turns a named disk's configuration into the environment
//! variables rclone reads (`RCLONE_CONFIG_<DISK>_*`) and into the remote
//! path expression passed on the command line. One provider exists per
//! driver kind:
//!
//! - [`local`]: local filesystem paths
//! - [`s3`]: S3-compatible object storage
//! - [`sftp`]: SFTP hosts
//! - [`ftp`]: FTP hosts
//!
//! Providers are stateless and registered once at startup in a
//! [`ProviderRegistry`]; adding a backend means a new implementation plus a
//! registry entry, not an open-ended subclass hierarchy.

mod ftp;
mod local;
mod registry;
mod s3;
mod sftp;

pub use ftp::FtpProvider;
pub use local::LocalProvider;
pub use registry::ProviderRegistry;
pub use s3::S3Provider;
pub use sftp::SftpProvider;

use std::collections::HashMap;

use crate::config::DiskConfig;
use crate::error::{Result, RcloneError};

/// Environment variables handed to the rclone subprocess.
pub type EnvironmentMap = HashMap<String, String>;

/// Environment variable name for a disk field, e.g.
/// `env_key("BACKUPS", "TYPE")` → `RCLONE_CONFIG_BACKUPS_TYPE`.
fn env_key(upper_disk: &str, field: &str) -> String {
    format!("RCLONE_CONFIG_{}_{}", upper_disk, field)
}

/// Maps one backend driver's disk configuration to rclone environment
/// variables and remote path strings.
pub trait Provider: Send + Sync {
    /// Stable lowercase driver identifier ("local", "s3", ...).
    fn driver(&self) -> &str;

    /// Emit the driver-specific variables into `env`. The `TYPE` variable
    /// is already present; the configuration has already been validated.
    fn extend_environment(
        &self,
        env: &mut EnvironmentMap,
        upper_disk: &str,
        config: &DiskConfig,
    ) -> Result<()>;

    /// Driver-specific validation; the driver match has already been
    /// checked by [`validate_configuration`](Provider::validate_configuration).
    fn validate_fields(&self, _config: &DiskConfig) -> Result<()> {
        Ok(())
    }

    /// Validate the configuration for this provider.
    fn validate_configuration(&self, config: &DiskConfig) -> Result<()> {
        if config.driver != self.driver() {
            return Err(RcloneError::driver_mismatch(self.driver(), &config.driver));
        }
        self.validate_fields(config)
    }

    /// Build the full environment for a disk: validate, emit `TYPE`, then
    /// the driver-specific variables.
    fn build_environment(&self, disk_name: &str, config: &DiskConfig) -> Result<EnvironmentMap> {
        self.validate_configuration(config)?;

        let upper_disk = disk_name.to_uppercase();
        let mut env = EnvironmentMap::new();
        env.insert(env_key(&upper_disk, "TYPE"), self.driver().to_string());

        self.extend_environment(&mut env, &upper_disk, config)?;
        Ok(env)
    }

    /// Build the remote path expression for this disk.
    ///
    /// Default form is `<diskName>:<path without leading slashes>`; the s3
    /// and local providers override this.
    fn build_remote_path(&self, disk_name: &str, path: &str, _config: &DiskConfig) -> String {
        format!("{}:{}", disk_name, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("driver", &self.driver())
            .finish()
    }
}
