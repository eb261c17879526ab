//! FTP provider.

use super::{env_key, EnvironmentMap, Provider};
use crate::config::{validate_host, validate_port, DiskConfig};
use crate::error::{Result, RcloneError};
use crate::obscure;

const DEFAULT_PORT: u16 = 21;

/// Provider for FTP disks.
#[derive(Debug, Clone, Default)]
pub struct FtpProvider;

impl FtpProvider {
    /// Create a new ftp provider instance.
    pub fn new() -> Self {
        Self
    }
}

impl Provider for FtpProvider {
    fn driver(&self) -> &str {
        "ftp"
    }

    fn validate_fields(&self, config: &DiskConfig) -> Result<()> {
        let host = config.host.as_deref().unwrap_or("");
        if host.is_empty() {
            return Err(RcloneError::missing_field(self.driver(), "host"));
        }
        validate_host(host)?;

        if let Some(port) = config.port {
            validate_port(port)?;
        }

        Ok(())
    }

    fn extend_environment(
        &self,
        env: &mut EnvironmentMap,
        upper_disk: &str,
        config: &DiskConfig,
    ) -> Result<()> {
        env.insert(
            env_key(upper_disk, "HOST"),
            config.host.clone().unwrap_or_default(),
        );
        env.insert(
            env_key(upper_disk, "USER"),
            config.username.clone().unwrap_or_default(),
        );
        env.insert(
            env_key(upper_disk, "PASS"),
            obscure::obscure(config.password.as_deref().unwrap_or(""))?,
        );
        env.insert(
            env_key(upper_disk, "PORT"),
            config.port.unwrap_or(DEFAULT_PORT).to_string(),
        );

        Ok(())
    }
}
