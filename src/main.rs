mod batch;
mod caer;
mod config;
mod facilities;
mod fetch;
mod html;
mod parser;
mod record;
mod wind;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use config::{EngineConfig, Strictness};
use fetch::FetchOptions;
use parser::error::ExtractError;

#[derive(Parser)]
#[command(name = "dispatch_scraper", about = "Active incident dispatch scraper and normalizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the live dispatch page and print incidents as JSON
    Dispatch {
        /// Page URL (default: $DISPATCH_URL or the city's combined feed)
        #[arg(long)]
        url: Option<String>,
        /// Only list priority incidents (counts still cover all)
        #[arg(long)]
        priority_only: bool,
        #[command(flatten)]
        engine: EngineArgs,
        #[command(flatten)]
        http: HttpArgs,
    },
    /// Extract incidents from a saved page
    Parse {
        file: PathBuf,
        #[arg(long)]
        priority_only: bool,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Extract every *.html snapshot in a directory
    Batch {
        dir: PathBuf,
        /// Output directory for <name>.json (default: same as input)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Show what the table parser sees in a saved page
    Inspect {
        file: PathBuf,
        /// Rows to show from the largest table
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,
    },
    /// Community alert (CAER) messages with severity
    Caer {
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        http: HttpArgs,
    },
    /// Current wind and plume risk
    Wind {
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        http: HttpArgs,
    },
    /// Known industrial facility coordinates
    Facilities,
}

#[derive(Args)]
struct EngineArgs {
    /// JSON engine config; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Only accept rows whose Agency is a recognized code
    #[arg(long)]
    strict: bool,
    /// Priority keyword (repeatable); replaces the configured list
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,
}

impl EngineArgs {
    fn build(&self) -> anyhow::Result<EngineConfig> {
        let mut cfg = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if self.strict {
            cfg.strictness = Strictness::Strict;
        }
        if !self.keywords.is_empty() {
            cfg.keywords = self.keywords.clone();
        }
        cfg.normalized()
    }
}

#[derive(Args)]
struct HttpArgs {
    /// Request timeout in seconds
    #[arg(long, default_value = "15")]
    timeout: u64,
    /// Retries on rate limits and server errors
    #[arg(long, default_value = "2")]
    retries: u32,
}

impl HttpArgs {
    fn options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout),
            max_retries: self.retries,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dispatch {
            url,
            priority_only,
            engine,
            http,
        } => {
            let cfg = engine.build()?;
            let url = url_or_env(url, "DISPATCH_URL", config::DISPATCH_URL);
            let input = match fetch::fetch_page(&url, &http.options()).await {
                Ok(page) => Ok(html::parse_tables(&page)),
                Err(e) => {
                    warn!("Dispatch fetch failed: {:#}", e);
                    Err(ExtractError::Fetch(format!("{:#}", e)))
                }
            };
            let mut set = parser::run_pipeline(input, &cfg);
            if priority_only {
                set.retain_priority();
            }
            print_json(&set)
        }
        Commands::Parse {
            file,
            priority_only,
            engine,
        } => {
            let cfg = engine.build()?;
            let mut set = batch::extract_file(&file, &cfg)?;
            if priority_only {
                set.retain_priority();
            }
            print_json(&set)
        }
        Commands::Batch { dir, out, engine } => {
            let cfg = engine.build()?;
            let out = out.unwrap_or_else(|| dir.clone());
            let counts = batch::process_dir(&dir, &out, &cfg)?;
            counts.print();
            Ok(())
        }
        Commands::Inspect { file, rows } => {
            let page = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            print_json(&html::sample_rows(&page, rows))
        }
        Commands::Caer { url, http } => {
            let url = url_or_env(url, "CAER_URL", config::CAER_URL);
            let feed = match fetch::fetch_page(&url, &http.options()).await {
                Ok(page) => caer::CaerFeed::new(caer::parse_messages(&page)),
                Err(e) => {
                    warn!("CAER fetch failed: {:#}", e);
                    caer::CaerFeed::failed(format!("{:#}", e))
                }
            };
            print_json(&feed)
        }
        Commands::Wind { url, http } => {
            let url = url_or_env(url, "NWS_FORECAST_URL", config::NWS_FORECAST_URL);
            let report = match wind::fetch_wind(&url, &http.options()).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Wind lookup failed: {:#}", e);
                    wind::WindReport::offline(format!("{:#}", e))
                }
            };
            print_json(&report)
        }
        Commands::Facilities => print_json(&facilities::by_name()),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {}", format_duration(elapsed));
    }

    result
}

fn url_or_env(arg: Option<String>, var: &str, default: &str) -> String {
    arg.or_else(|| std::env::var(var).ok())
        .unwrap_or_else(|| default.to_string())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
