//! S3-compatible object storage provider.

use super::{env_key, EnvironmentMap, Provider};
use crate::config::{validate_bucket_name, validate_region, DiskConfig};
use crate::error::{Result, RcloneError};

/// Provider for S3 and S3-compatible disks (MinIO, R2, ...).
#[derive(Debug, Clone, Default)]
pub struct S3Provider;

impl S3Provider {
    /// Create a new s3 provider instance.
    pub fn new() -> Self {
        Self
    }
}

impl Provider for S3Provider {
    fn driver(&self) -> &str {
        "s3"
    }

    fn validate_fields(&self, config: &DiskConfig) -> Result<()> {
        let required: [(&str, &Option<String>); 4] = [
            ("key", &config.key),
            ("secret", &config.secret),
            ("region", &config.region),
            ("bucket", &config.bucket),
        ];
        for (field, value) in required {
            if value.as_deref().unwrap_or("").is_empty() {
                return Err(RcloneError::missing_field(self.driver(), field));
            }
        }

        validate_bucket_name(config.bucket.as_deref().unwrap_or(""))?;
        validate_region(config.region.as_deref().unwrap_or(""))?;
        Ok(())
    }

    fn extend_environment(
        &self,
        env: &mut EnvironmentMap,
        upper_disk: &str,
        config: &DiskConfig,
    ) -> Result<()> {
        env.insert(
            env_key(upper_disk, "ACCESS_KEY_ID"),
            config.key.clone().unwrap_or_default(),
        );
        env.insert(
            env_key(upper_disk, "SECRET_ACCESS_KEY"),
            config.secret.clone().unwrap_or_default(),
        );
        env.insert(
            env_key(upper_disk, "REGION"),
            config.region.clone().unwrap_or_default(),
        );
        env.insert(
            env_key(upper_disk, "BUCKET"),
            config.bucket.clone().unwrap_or_default(),
        );

        if let Some(endpoint) = &config.endpoint {
            env.insert(env_key(upper_disk, "ENDPOINT"), endpoint.clone());
        }
        if let Some(path_style) = config.use_path_style_endpoint {
            env.insert(
                env_key(upper_disk, "FORCE_PATH_STYLE"),
                path_style.to_string(),
            );
        }

        Ok(())
    }

    /// S3 remote paths address the bucket, then the configured prefix,
    /// then the request path: `<disk>:<bucket>[/<root>][/<path>]`.
    fn build_remote_path(&self, disk_name: &str, path: &str, config: &DiskConfig) -> String {
        let mut remote = format!("{}:{}", disk_name, config.bucket.as_deref().unwrap_or(""));

        for segment in [config.root.as_deref().unwrap_or(""), path] {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                remote.push('/');
                remote.push_str(segment);
            }
        }

        remote
    }
}
