//! CLI for the vigil health-check sample store.
//!
//! Provides commands for recording check results and querying them back.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vigil::{Id, Order, Sample, Store, StoreConfig};

/// vigil: embedded time-ordered storage for service health checks.
#[derive(Parser)]
#[command(name = "vigil", version, about)]
struct Cli {
    /// Path to the store directory.
    #[arg(long, global = true, default_value = "./vigil_data")]
    store: PathBuf,

    /// JSON configuration file; takes precedence over `--store`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Record one check result for a service.
    Record {
        /// Service the result belongs to.
        #[arg(long)]
        service: String,

        /// Status or result code.
        #[arg(long, allow_negative_numbers = true)]
        status: i32,

        /// Server-side duration in milliseconds.
        #[arg(long, default_value = "0")]
        server_ms: u64,

        /// End-to-end duration in milliseconds.
        #[arg(long, default_value = "0")]
        total_ms: u64,

        /// Record time in Unix seconds (defaults to now).
        #[arg(long)]
        at: Option<u64>,
    },

    /// List samples between two times, starting at the first not before `--from`.
    Range {
        /// Service to query.
        service: String,

        /// Start time in Unix seconds.
        #[arg(long)]
        from: u64,

        /// End time in Unix seconds.
        #[arg(long)]
        to: u64,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// List up to `--limit` samples from the oldest, or the newest with `--reverse`.
    Page {
        /// Service to query.
        service: String,

        /// Maximum number of samples (0 = all).
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Start from the newest sample.
        #[arg(long)]
        reverse: bool,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Count the samples stored for a service.
    Count {
        /// Service to count.
        service: String,
    },

    /// List every service with stored samples.
    Services,
}

/// Output format for query results.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array of objects.
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = open_store(cli.store, cli.config.as_ref()).and_then(|store| match cli.command {
        Commands::Record {
            service,
            status,
            server_ms,
            total_ms,
            at,
        } => cmd_record(&store, service, status, server_ms, total_ms, at),
        Commands::Range {
            service,
            from,
            to,
            format,
        } => cmd_range(&store, &service, from, to, &format),
        Commands::Page {
            service,
            limit,
            reverse,
            format,
        } => cmd_page(&store, &service, limit, reverse, &format),
        Commands::Count { service } => cmd_count(&store, &service),
        Commands::Services => cmd_services(&store),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Opens the store named by `--config` if given, else the `--store` directory.
fn open_store(
    store_path: PathBuf,
    config: Option<&PathBuf>,
) -> Result<Store, Box<dyn std::error::Error>> {
    let config = match config {
        Some(file) => StoreConfig::load(file)?,
        None => StoreConfig::new(store_path),
    };
    tracing::debug!(path = %config.path.display(), "opening store");
    Ok(Store::open_with(config)?)
}

/// Implements `vigil record`.
fn cmd_record(
    store: &Store,
    service: String,
    status: i32,
    server_ms: u64,
    total_ms: u64,
    at: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sample = Sample::new(
        service,
        status,
        Duration::from_millis(server_ms),
        Duration::from_millis(total_ms),
    );
    if let Some(secs) = at {
        sample = sample.with_id(Id::with_time(unix(secs)?));
    }

    store.save(&mut sample)?;
    println!("{}", sample.id);
    Ok(())
}

/// Implements `vigil range <service>`.
fn cmd_range(
    store: &Store,
    service: &str,
    from: u64,
    to: u64,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let samples = store.range(service, unix(from)?, unix(to)?)?;
    print_samples(service, &samples, format)
}

/// Implements `vigil page <service>`.
fn cmd_page(
    store: &Store,
    service: &str,
    limit: usize,
    reverse: bool,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let samples = store.page(service, limit, Order::from_reverse(reverse))?;
    print_samples(service, &samples, format)
}

/// Implements `vigil count <service>`.
fn cmd_count(store: &Store, service: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", store.count(service)?);
    Ok(())
}

/// Implements `vigil services`.
fn cmd_services(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    for service in store.services()? {
        println!("{service}");
    }
    Ok(())
}

fn print_samples(
    service: &str,
    samples: &[Sample],
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Csv => {
            println!("# service={service}, samples={}", samples.len());
            println!("id,timestamp,status,server_ms,total_ms");
            for s in samples {
                println!(
                    "{},{},{},{},{}",
                    s.id,
                    s.id.secs(),
                    s.status,
                    millis(s.server),
                    millis(s.total)
                );
            }
        }
        OutputFormat::Json => {
            let json_data: Vec<serde_json::Value> = samples
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "id": s.id.to_string(),
                        "timestamp": s.id.secs(),
                        "status": s.status,
                        "server_ms": millis(s.server),
                        "total_ms": millis(s.total),
                    })
                })
                .collect();

            let output = serde_json::json!({
                "service": service,
                "count": samples.len(),
                "data": json_data,
            });

            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Converts Unix seconds to a `SystemTime`, rejecting values the platform clock cannot hold.
fn unix(secs: u64) -> Result<SystemTime, Box<dyn std::error::Error>> {
    UNIX_EPOCH
        .checked_add(Duration::from_secs(secs))
        .ok_or_else(|| format!("time {secs} is out of range").into())
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_converts_seconds() {
        let time = unix(1_700_000_000).unwrap();
        assert_eq!(time, UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        assert_eq!(unix(0).unwrap(), UNIX_EPOCH);
    }

    #[test]
    fn test_unix_rejects_overflowing_seconds() {
        let err = unix(u64::MAX).unwrap_err();
        assert_eq!(err.to_string(), format!("time {} is out of range", u64::MAX));
    }

    #[test]
    fn test_range_args_accept_max_seconds() {
        let cli = Cli::try_parse_from([
            "vigil",
            "range",
            "svc",
            "--from",
            "18446744073709551615",
            "--to",
            "1",
        ])
        .unwrap();

        match cli.command {
            Commands::Range { from, to, .. } => {
                assert!(unix(from).is_err());
                assert!(unix(to).is_ok());
            }
            _ => panic!("Expected range command"),
        }
    }
}
