//! Extraction of structured transfer statistics from rclone output.
//!
//! rclone reports progress as free-form text on stderr. [`parse`] runs a
//! fixed set of independent pattern extractors over the combined output and
//! fills a [`TransferStats`] record; every extractor is optional, so
//! missing or malformed lines leave the matching field at its default and
//! parsing itself never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured counters and derived rates for one transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferStats {
    /// Files transferred so far.
    pub transferred_files: u64,
    /// Total files considered.
    pub total_files: u64,
    /// Bytes transferred.
    pub transferred_bytes: u64,
    /// Transfer rate in bytes per second.
    pub transfer_rate: u64,
    /// Error count.
    pub errors: u64,
    /// Files checked without transfer.
    pub checks: u64,
    /// Files deleted on the target.
    pub deletes: u64,
    /// Files renamed on the target.
    pub renames: u64,
    /// Elapsed wall-clock seconds.
    pub elapsed_time: f64,
    /// Completion percentage.
    pub percentage: u32,
    /// Estimated seconds remaining.
    pub eta: u64,
    /// Derived: `100 * (total - errors) / total`, or 100 when no files.
    pub success_rate: f64,
    /// Derived: megabits per second over the elapsed time.
    pub transfer_speed_mbps: f64,
}

impl Default for TransferStats {
    fn default() -> Self {
        Self {
            transferred_files: 0,
            total_files: 0,
            transferred_bytes: 0,
            transfer_rate: 0,
            errors: 0,
            checks: 0,
            deletes: 0,
            renames: 0,
            elapsed_time: 0.0,
            percentage: 0,
            eta: 0,
            success_rate: 100.0,
            transfer_speed_mbps: 0.0,
        }
    }
}

static TRANSFERRED_FILES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Transferred:\s+(\d+)\s+/\s+\d+").expect("valid regex"));

static TOTAL_FILES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Transferred:\s+\d+\s+/\s+(\d+)").expect("valid regex"));

static TRANSFERRED_BYTES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Transferred:\s+([\d,]+(?:\.\d+)?)\s*([KMGTPE]?)i?B").expect("valid regex")
});

static TRANSFER_RATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Transferred:\s+.*,\s*([\d.]+)\s*([KMGTPE]?)i?B/s").expect("valid regex")
});

static ERRORS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Errors:\s+(\d+)").expect("valid regex"));

static CHECKS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Checks:\s+(\d+)").expect("valid regex"));

static DELETES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Deleted:\s+(\d+)").expect("valid regex"));

static RENAMES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Renamed:\s+(\d+)").expect("valid regex"));

static ELAPSED_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Elapsed time:\s+(\d+(?:\.\d+)?)s").expect("valid regex"));

static PERCENTAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").expect("valid regex"));

static ETA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ETA\s+(\d+(?::\d+)*)").expect("valid regex"));

/// Parse rclone output into a [`TransferStats`] record.
///
/// The first matching occurrence of each pattern wins. rclone repeats its
/// summary block while a transfer is running, so callers wanting final
/// totals must feed only the final block; first-match semantics are kept
/// deliberately for compatibility with the tool's historical behavior.
pub fn parse(output: &str) -> TransferStats {
    let mut stats = TransferStats::default();

    if let Some(value) = extract_u64(&TRANSFERRED_FILES_RE, output) {
        stats.transferred_files = value;
    }
    if let Some(value) = extract_u64(&TOTAL_FILES_RE, output) {
        stats.total_files = value;
    }
    if let Some(value) = extract_bytes(&TRANSFERRED_BYTES_RE, output) {
        stats.transferred_bytes = value;
    }
    if let Some(value) = extract_bytes(&TRANSFER_RATE_RE, output) {
        stats.transfer_rate = value;
    }
    if let Some(value) = extract_u64(&ERRORS_RE, output) {
        stats.errors = value;
    }
    if let Some(value) = extract_u64(&CHECKS_RE, output) {
        stats.checks = value;
    }
    if let Some(value) = extract_u64(&DELETES_RE, output) {
        stats.deletes = value;
    }
    if let Some(value) = extract_u64(&RENAMES_RE, output) {
        stats.renames = value;
    }
    if let Some(captures) = ELAPSED_TIME_RE.captures(output) {
        if let Ok(value) = captures[1].parse() {
            stats.elapsed_time = value;
        }
    }
    if let Some(captures) = PERCENTAGE_RE.captures(output) {
        if let Ok(value) = captures[1].parse() {
            stats.percentage = value;
        }
    }
    if let Some(captures) = ETA_RE.captures(output) {
        stats.eta = parse_eta(&captures[1]);
    }

    stats.success_rate = success_rate(stats.total_files, stats.errors);
    stats.transfer_speed_mbps = transfer_speed_mbps(stats.transferred_bytes, stats.elapsed_time);

    stats
}

fn extract_u64(pattern: &Regex, output: &str) -> Option<u64> {
    pattern.captures(output)?[1].parse().ok()
}

/// Parse a byte count with an optional binary-multiple suffix, tolerating
/// comma thousands-separators ("1,048,576 Bytes", "10.5 GiB").
fn extract_bytes(pattern: &Regex, output: &str) -> Option<u64> {
    let captures = pattern.captures(output)?;
    let value: f64 = captures[1].replace(',', "").parse().ok()?;
    let multiplier = unit_multiplier(captures.get(2).map_or("", |m| m.as_str()));
    Some((value * multiplier as f64) as u64)
}

fn unit_multiplier(unit: &str) -> u64 {
    match unit {
        "K" => 1 << 10,
        "M" => 1 << 20,
        "G" => 1 << 30,
        "T" => 1 << 40,
        "P" => 1 << 50,
        "E" => 1 << 60,
        _ => 1,
    }
}

/// Convert colon-separated base-60 groups to seconds, rightmost group
/// first ("2:30" → 150, "1:02:03" → 3723).
fn parse_eta(eta: &str) -> u64 {
    eta.split(':')
        .rev()
        .enumerate()
        .map(|(index, part)| part.parse::<u64>().unwrap_or(0) * 60u64.pow(index as u32))
        .sum()
}

fn success_rate(total_files: u64, errors: u64) -> f64 {
    if total_files == 0 {
        return 100.0;
    }
    let rate = (total_files as f64 - errors as f64) / total_files as f64 * 100.0;
    round2(rate)
}

fn transfer_speed_mbps(bytes: u64, elapsed_time: f64) -> f64 {
    if elapsed_time <= 0.0 || bytes == 0 {
        return 0.0;
    }
    let bytes_per_second = bytes as f64 / elapsed_time;
    round2(bytes_per_second * 8.0 / (1 << 20) as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_statistics() {
        let output = "Transferred: 150 / 200, 75%\n\
                      Transferred: 1048576 Bytes, 1 MiB/s, ETA -\n\
                      Errors: 2\n\
                      Checks: 45 in 30s\n\
                      Elapsed time: 30.5s";
        let stats = parse(output);

        assert_eq!(stats.transferred_files, 150);
        assert_eq!(stats.total_files, 200);
        assert_eq!(stats.transferred_bytes, 1_048_576);
        assert_eq!(stats.transfer_rate, 1_048_576);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.checks, 45);
        assert_eq!(stats.elapsed_time, 30.5);
        assert_eq!(stats.percentage, 75);
        assert_eq!(stats.success_rate, 99.0);
    }

    #[test]
    fn test_parse_complex_output_with_units() {
        let output = "Transferred: 850 / 1000, 85%\n\
                      Transferred: 10.5 GiB / 12.3 GiB, 85%, 150 MiB/s, ETA 12s\n\
                      Errors: 5\n\
                      Checks: 142 in 5m30s\n\
                      Deleted: 12\n\
                      Renamed: 3\n\
                      Elapsed time: 330.2s";
        let stats = parse(output);

        assert_eq!(stats.transferred_files, 850);
        assert_eq!(stats.total_files, 1000);
        assert_eq!(stats.transferred_bytes, (10.5 * (1u64 << 30) as f64) as u64);
        assert_eq!(stats.transfer_rate, 150 * (1 << 20));
        assert_eq!(stats.errors, 5);
        assert_eq!(stats.checks, 142);
        assert_eq!(stats.deletes, 12);
        assert_eq!(stats.renames, 3);
        assert_eq!(stats.elapsed_time, 330.2);
        assert_eq!(stats.eta, 12);
        assert_eq!(stats.success_rate, 99.5);
        assert!(stats.transfer_speed_mbps > 0.0);
    }

    #[test]
    fn test_parse_empty_output_yields_defaults() {
        let stats = parse("");
        assert_eq!(stats, TransferStats::default());
        assert_eq!(stats.success_rate, 100.0);
        assert_eq!(stats.transfer_speed_mbps, 0.0);
    }

    #[test]
    fn test_parse_unrecognized_output_yields_defaults() {
        let stats = parse("No detailed stats available");
        assert_eq!(stats.transferred_files, 0);
        assert_eq!(stats.transferred_bytes, 0);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.success_rate, 100.0);
    }

    #[test]
    fn test_first_match_wins_for_repeated_summaries() {
        // Streaming output repeats the summary block; by design only the
        // first occurrence is honored.
        let output = "Transferred: 10 / 100, 10%\n\
                      Transferred: 100 / 100, 100%";
        let stats = parse(output);
        assert_eq!(stats.transferred_files, 10);
        assert_eq!(stats.total_files, 100);
        assert_eq!(stats.percentage, 10);
    }

    #[test]
    fn test_byte_counts_tolerate_thousands_separators() {
        let stats = parse("Transferred: 1,048,576 Bytes");
        assert_eq!(stats.transferred_bytes, 1_048_576);
    }

    #[test]
    fn test_unit_suffixes_are_binary_multiples() {
        assert_eq!(parse("Transferred: 1 KiB").transferred_bytes, 1024);
        assert_eq!(parse("Transferred: 2 MB").transferred_bytes, 2 << 20);
        assert_eq!(parse("Transferred: 1 TiB").transferred_bytes, 1 << 40);
        assert_eq!(parse("Transferred: 3 B").transferred_bytes, 3);
    }

    #[test]
    fn test_eta_parsing() {
        assert_eq!(parse("ETA 2:30").eta, 150);
        assert_eq!(parse("ETA 1:02:03").eta, 3723);
        assert_eq!(parse("eta 45").eta, 45);
        assert_eq!(parse("ETA -").eta, 0);
    }

    #[test]
    fn test_zero_elapsed_time_has_no_division_by_zero() {
        let stats = parse("Transferred: 1 / 1, 100%\nTransferred: 1024 Bytes\nElapsed time: 0.0s");
        assert_eq!(stats.transfer_speed_mbps, 0.0);
        assert_eq!(stats.success_rate, 100.0);
    }

    #[test]
    fn test_transfer_speed_computation() {
        // 104857600 bytes over 10s = 10 MiB/s = 80 Mbps
        let stats = parse("Transferred: 104857600 Bytes\nElapsed time: 10.0s");
        assert_eq!(stats.transfer_speed_mbps, 80.0);
    }

    #[test]
    fn test_success_rate_rounding() {
        let stats = parse("Transferred: 1 / 3\nErrors: 1");
        assert_eq!(stats.success_rate, 66.67);
    }
}
