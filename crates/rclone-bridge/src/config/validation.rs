//! Configuration validation and shared field validators.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Config;
use crate::command;
use crate::error::{Result, RcloneError};

static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
        .expect("valid regex")
});

static BUCKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9.-]*[a-z0-9])?$").expect("valid regex"));

static IPV4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("valid regex"));

static REGION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

/// Validate the configuration.
///
/// Disk configurations are validated later by their providers; only the
/// transfer defaults are checked here, with the same bounds and errors as
/// the fluent setters.
pub fn validate(config: &Config) -> Result<()> {
    command::TRANSFERS.validate(&config.defaults.transfers.into())?;
    command::CHECKERS.validate(&config.defaults.checkers.into())?;
    command::RETRIES.validate(&config.defaults.retries.into())?;
    command::STAT_INTERVAL.validate(&config.defaults.stat_interval.into())?;
    Ok(())
}

/// Validate a remote port number.
pub fn validate_port(port: u16) -> Result<()> {
    if port == 0 {
        return Err(RcloneError::invalid_field(
            "port",
            port,
            "integer between 1 and 65535",
        ));
    }
    Ok(())
}

/// Validate a hostname or IPv4 address.
pub fn validate_host(host: &str) -> Result<()> {
    if host.len() > 253 || !HOSTNAME_RE.is_match(host) {
        return Err(RcloneError::invalid_field(
            "host",
            host,
            "hostname or IPv4 address",
        ));
    }
    Ok(())
}

/// Validate an S3 bucket name against the AWS naming rules.
pub fn validate_bucket_name(bucket: &str) -> Result<()> {
    let expected = "3-63 lowercase letters, digits, dots or hyphens, \
                    starting and ending alphanumeric";
    if bucket.len() < 3
        || bucket.len() > 63
        || !BUCKET_RE.is_match(bucket)
        || bucket.contains("..")
        || IPV4_RE.is_match(bucket)
    {
        return Err(RcloneError::invalid_field("bucket", bucket, expected));
    }
    Ok(())
}

/// Validate a region identifier.
pub fn validate_region(region: &str) -> Result<()> {
    if !REGION_RE.is_match(region) {
        return Err(RcloneError::invalid_field(
            "region",
            region,
            "region identifier (e.g. us-east-1)",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_out_of_bounds_defaults() {
        let mut config = Config::default();
        config.defaults.transfers = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.defaults.retries = 11;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_port_bounds() {
        assert!(validate_port(0).is_err());
        assert!(validate_port(1).is_ok());
        assert!(validate_port(65535).is_ok());
    }

    #[test]
    fn test_hostnames() {
        assert!(validate_host("example.com").is_ok());
        assert!(validate_host("backup-01.internal").is_ok());
        assert!(validate_host("192.168.1.10").is_ok());
        assert!(validate_host("-leading.dash").is_err());
        assert!(validate_host("under_score").is_err());
        assert!(validate_host("").is_err());
    }

    #[test]
    fn test_bucket_names() {
        assert!(validate_bucket_name("my-bucket-123").is_ok());
        assert!(validate_bucket_name("logs.example.com").is_ok());
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name("UpperCase").is_err());
        assert!(validate_bucket_name("double..dot").is_err());
        assert!(validate_bucket_name("192.168.1.10").is_err());
        assert!(validate_bucket_name("-leading").is_err());
    }

    #[test]
    fn test_regions() {
        assert!(validate_region("us-east-1").is_ok());
        assert!(validate_region("eu-central-1").is_ok());
        assert!(validate_region("auto").is_ok());
        assert!(validate_region("US East").is_err());
        assert!(validate_region("").is_err());
    }
}
