//! Local filesystem provider.

use super::{env_key, EnvironmentMap, Provider};
use crate::config::DiskConfig;
use crate::error::Result;

/// Provider for disks on the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalProvider;

impl LocalProvider {
    /// Create a new local provider instance.
    pub fn new() -> Self {
        Self
    }
}

impl Provider for LocalProvider {
    fn driver(&self) -> &str {
        "local"
    }

    fn extend_environment(
        &self,
        env: &mut EnvironmentMap,
        upper_disk: &str,
        config: &DiskConfig,
    ) -> Result<()> {
        env.insert(
            env_key(upper_disk, "ROOT"),
            config.root.clone().unwrap_or_else(|| "/".to_string()),
        );
        Ok(())
    }

    /// Local paths are anchored to the disk's root directory instead of a
    /// `disk:` remote name.
    fn build_remote_path(&self, _disk_name: &str, path: &str, config: &DiskConfig) -> String {
        let root = config.root.as_deref().unwrap_or("");
        format!(
            "{}/{}",
            root.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(root: Option<&str>) -> DiskConfig {
        DiskConfig {
            driver: "local".to_string(),
            root: root.map(String::from),
            ..DiskConfig::default()
        }
    }

    #[test]
    fn test_environment() {
        let env = LocalProvider::new()
            .build_environment("local_test", &disk(Some("/storage/app")))
            .unwrap();
        assert_eq!(env["RCLONE_CONFIG_LOCAL_TEST_TYPE"], "local");
        assert_eq!(env["RCLONE_CONFIG_LOCAL_TEST_ROOT"], "/storage/app");
    }

    #[test]
    fn test_environment_default_root() {
        let env = LocalProvider::new()
            .build_environment("local_test", &disk(None))
            .unwrap();
        assert_eq!(env["RCLONE_CONFIG_LOCAL_TEST_ROOT"], "/");
    }

    #[test]
    fn test_remote_path_without_root() {
        let provider = LocalProvider::new();
        assert_eq!(
            provider.build_remote_path("local_test", "backups", &disk(None)),
            "/backups"
        );
        assert_eq!(provider.build_remote_path("local_test", "/", &disk(None)), "/");
    }

    #[test]
    fn test_remote_path_with_root() {
        let provider = LocalProvider::new();
        assert_eq!(
            provider.build_remote_path("local_test", "backups", &disk(Some("/storage/app"))),
            "/storage/app/backups"
        );
        assert_eq!(
            provider.build_remote_path("local_test", "/", &disk(Some("/storage/app"))),
            "/storage/app/"
        );
    }

    #[test]
    fn test_remote_path_trims_redundant_slashes() {
        let provider = LocalProvider::new();
        assert_eq!(
            provider.build_remote_path("local_test", "/backups/", &disk(Some("/storage/app/"))),
            "/storage/app/backups/"
        );
        assert_eq!(
            provider.build_remote_path(
                "local_test",
                "uploads/images/2024",
                &disk(Some("/var/www"))
            ),
            "/var/www/uploads/images/2024"
        );
    }
}
