//! rclone-bridge CLI - drive rclone transfers from a YAML disk configuration.

use clap::{Args, Parser, Subcommand};
use rclone_bridge::{Config, ProcessResult, Rclone, RcloneError};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "rclone-bridge")]
#[command(about = "Orchestrate rclone transfers between configured disks")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "rclone.yaml")]
    config: PathBuf,

    /// Output the full result as JSON to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make the target identical to the source
    Sync(TransferArgs),

    /// Copy files from source to target without deleting
    Copy(TransferArgs),

    /// Move files from source to target
    Move(TransferArgs),
}

#[derive(Args)]
struct TransferArgs {
    /// Source as disk:path, e.g. local_media:/photos
    source: String,

    /// Target as disk:path, e.g. s3_backup:/photos
    target: String,

    /// Show live transfer progress
    #[arg(long)]
    progress: bool,

    /// Override the number of parallel transfers (1-100)
    #[arg(long)]
    transfers: Option<i64>,

    /// Override the number of parallel checkers (1-100)
    #[arg(long)]
    checkers: Option<i64>,

    /// Override the retry count (0-10)
    #[arg(long)]
    retries: Option<i64>,

    /// Override the statistics interval in seconds (1-3600)
    #[arg(long)]
    stat_interval: Option<i64>,

    /// Extra rclone flag as key=value or a bare key, repeatable
    #[arg(long = "option", value_name = "KEY[=VALUE]")]
    options: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(result) if result.is_successful() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<ProcessResult, RcloneError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)?;

    let config = Config::load(&cli.config)?;
    info!("loaded configuration from {:?}", cli.config);

    let result = execute(config, &cli).await?;

    if cli.output_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result)
                .map_err(|e| RcloneError::Config(e.to_string()))?
        );
    } else {
        print_summary(&result);
    }

    Ok(result)
}

async fn execute(config: Config, cli: &Cli) -> Result<ProcessResult, RcloneError> {
    let (Commands::Sync(args) | Commands::Copy(args) | Commands::Move(args)) = &cli.command;

    let (source_disk, source_path) = parse_remote(&args.source)?;
    let (target_disk, target_path) = parse_remote(&args.target)?;

    let mut rclone = Rclone::new(config)
        .source(source_disk, source_path)
        .target(target_disk, target_path);

    if args.progress {
        rclone = rclone.with_progress(true);
    }
    if let Some(transfers) = args.transfers {
        rclone = rclone.transfers(transfers)?;
    }
    if let Some(checkers) = args.checkers {
        rclone = rclone.checkers(checkers)?;
    }
    if let Some(retries) = args.retries {
        rclone = rclone.retries(retries)?;
    }
    if let Some(interval) = args.stat_interval {
        rclone = rclone.stat_interval(interval)?;
    }
    for option in &args.options {
        let (key, value) = parse_option(option);
        rclone = rclone.option(key, value);
    }

    // Stream subprocess output live unless stdout is reserved for JSON
    if !cli.output_json {
        rclone = rclone.on_output(|stream, line| match stream {
            rclone_bridge::OutputStream::Stdout => println!("{line}"),
            rclone_bridge::OutputStream::Stderr => eprintln!("{line}"),
        });
    }

    match cli.command {
        Commands::Sync(_) => rclone.sync().await,
        Commands::Copy(_) => rclone.copy().await,
        Commands::Move(_) => rclone.move_files().await,
    }
}

/// Split a `disk:path` argument. The path defaults to the disk root.
fn parse_remote(remote: &str) -> Result<(&str, &str), RcloneError> {
    match remote.split_once(':') {
        Some((disk, path)) if !disk.is_empty() => Ok((disk, path)),
        _ => Err(RcloneError::Config(format!(
            "invalid remote '{remote}': expected disk:path"
        ))),
    }
}

/// Parse a repeatable `--option` argument: `key` alone means a boolean
/// flag, `key=value` keeps integers as integers and everything else as a
/// string.
fn parse_option(option: &str) -> (&str, Value) {
    match option.split_once('=') {
        None => (option, Value::Bool(true)),
        Some((key, value)) => {
            let parsed = value
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(value));
            (key, parsed)
        }
    }
}

fn print_summary(result: &ProcessResult) {
    let stats = &result.stats;

    if result.is_successful() {
        println!("\nTransfer completed!");
    } else {
        println!("\nTransfer failed (exit code {})", result.exit_code);
    }
    println!(
        "  Files: {}/{}",
        stats.transferred_files, stats.total_files
    );
    println!("  Bytes: {}", stats.transferred_bytes);
    println!("  Errors: {}", stats.errors);
    println!("  Checks: {}", stats.checks);
    println!("  Elapsed: {:.1}s", stats.elapsed_time);
    println!("  Success rate: {:.2}%", stats.success_rate);
    if stats.transfer_speed_mbps > 0.0 {
        println!("  Speed: {:.2} Mbps", stats.transfer_speed_mbps);
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), RcloneError> {
    let filter = tracing_subscriber::EnvFilter::try_new(verbosity)
        .map_err(|e| RcloneError::Config(format!("invalid verbosity '{verbosity}': {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        "json" => builder.json().init(),
        "text" => builder.init(),
        other => {
            return Err(RcloneError::Config(format!(
                "invalid log format '{other}': expected text or json"
            )))
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote() {
        assert_eq!(parse_remote("disk:/a/b").unwrap(), ("disk", "/a/b"));
        assert_eq!(parse_remote("disk:").unwrap(), ("disk", ""));
        assert!(parse_remote("no-colon").is_err());
        assert!(parse_remote(":/path").is_err());
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(parse_option("dry-run"), ("dry-run", Value::Bool(true)));
        assert_eq!(parse_option("max-depth=3"), ("max-depth", Value::from(3)));
        assert_eq!(
            parse_option("bwlimit=10M"),
            ("bwlimit", Value::from("10M"))
        );
    }
}
