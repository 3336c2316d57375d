use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use eci_results::config::{
    CollisionPolicy, DEFAULT_ALL_OUTPUT, DEFAULT_CONCURRENCY, DEFAULT_INDEPENDENT_LABEL,
    DEFAULT_INDEPENDENT_OUTPUT, DEFAULT_NAME_SUFFIX, DEFAULT_SNAPSHOT_PATH,
    DEFAULT_TEMPLATES_DIR, DEFAULT_TIMEOUT_SECS, FIRST_CONSTITUENCY, LAST_CONSTITUENCY,
    ReportConfig, ScrapeConfig,
};
use eci_results::report::write_reports;
use eci_results::snapshot::{read_snapshot, write_snapshot};
use eci_results::utils::SnapshotStats;
use eci_results::{Aggregator, ReportRenderer, WebScraper};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "eci-results")]
#[command(
    about = "Scrapes constituency-wise results from results.eci.gov.in and renders candidate reports",
    long_about = "Without a subcommand, scrapes every constituency page, saves the snapshot, \
                  then reloads it and renders both HTML reports."
)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        default_value = DEFAULT_SNAPSHOT_PATH,
        global = true,
        help = "Path of the JSON results snapshot"
    )]
    snapshot: PathBuf,

    #[command(flatten)]
    scrape: ScrapeArgs,

    #[command(flatten)]
    report: ReportArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, clap::Args)]
struct ScrapeArgs {
    #[arg(long, global = true, help = "Base URL the constituency pages live under")]
    base_url: Option<String>,

    #[arg(
        long,
        global = true,
        default_value_t = FIRST_CONSTITUENCY,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "First constituency page index"
    )]
    first: u32,

    #[arg(
        long,
        global = true,
        default_value_t = LAST_CONSTITUENCY,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Last constituency page index (inclusive)"
    )]
    last: u32,

    #[arg(
        short = 'c',
        long,
        global = true,
        default_value_t = DEFAULT_CONCURRENCY,
        help = "Maximum number of pages fetched at once"
    )]
    concurrency: usize,

    #[arg(
        long,
        global = true,
        value_name = "SECONDS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Per-request timeout"
    )]
    timeout: u64,

    #[arg(
        long,
        global = true,
        default_value = DEFAULT_NAME_SUFFIX,
        help = "Annotation stripped from constituency names"
    )]
    name_suffix: String,

    #[arg(
        long,
        global = true,
        default_value = "replace",
        value_parser = parse_collision_policy,
        help = "What to do when two pages share a constituency name (replace, keep-first, reject)"
    )]
    on_collision: CollisionPolicy,
}

#[derive(Debug, clap::Args)]
struct ReportArgs {
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_TEMPLATES_DIR,
        help = "Directory holding the report templates"
    )]
    templates: PathBuf,

    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Directory the HTML reports are written to"
    )]
    output_dir: PathBuf,

    #[arg(
        long,
        global = true,
        default_value = DEFAULT_INDEPENDENT_LABEL,
        help = "Party label that marks an independent candidate"
    )]
    independent_label: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape, save the snapshot, then render both reports (the default)
    Run,
    /// Scrape every constituency page and save the snapshot
    Scrape,
    /// Render both reports from an existing snapshot
    Render,
    /// Print a summary of an existing snapshot
    Stats {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn parse_collision_policy(s: &str) -> Result<CollisionPolicy, String> {
    s.parse::<CollisionPolicy>().map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

impl ScrapeArgs {
    fn into_config(self) -> anyhow::Result<ScrapeConfig> {
        let defaults = ScrapeConfig::default();
        let config = ScrapeConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            first: self.first,
            last: self.last,
            timeout: Duration::from_secs(self.timeout),
            concurrency: self.concurrency,
            name_suffix: self.name_suffix,
            on_collision: self.on_collision,
        };
        Ok(config.validate()?)
    }
}

impl ReportArgs {
    fn into_config(self) -> ReportConfig {
        ReportConfig {
            templates_dir: self.templates,
            independent_label: self.independent_label,
            independent_output: self.output_dir.join(DEFAULT_INDEPENDENT_OUTPUT),
            all_output: self.output_dir.join(DEFAULT_ALL_OUTPUT),
        }
    }
}

async fn scrape(config: ScrapeConfig, snapshot_path: &Path) -> anyhow::Result<()> {
    let scraper = WebScraper::new(&config).context("Error creating scraper")?;
    let snapshot = Aggregator::new(scraper, config).run().await;

    write_snapshot(snapshot_path, &snapshot).context("Error saving results")?;
    Ok(())
}

fn render(config: &ReportConfig, snapshot_path: &Path) -> anyhow::Result<()> {
    let snapshot = read_snapshot(snapshot_path).context("Error loading results")?;
    let renderer = ReportRenderer::new(&config.templates_dir);

    log::info!(
        "Rendering {} constituencies with templates from {}",
        snapshot.len(),
        renderer.templates_dir().display()
    );

    write_reports(&renderer, &snapshot, config, Utc::now()).context("Error rendering reports")?;
    Ok(())
}

fn stats(config: &ReportConfig, snapshot_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = read_snapshot(snapshot_path).context("Error loading results")?;
    let stats = SnapshotStats::from_snapshot(&snapshot, &config.independent_label);

    match format {
        OutputFormat::Json => serialize_json(&stats),
        OutputFormat::Text => {
            if snapshot.is_empty() {
                println!("No constituencies in {}.", snapshot_path.display());
            } else {
                for (i, (name, records)) in snapshot.iter().enumerate() {
                    println!("{:>3}. {} ({} candidates)", i + 1, name, records.len());
                }
            }
            print!("{}", stats);
        }
    }
    Ok(())
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let report = cli.report.into_config();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            scrape(cli.scrape.into_config()?, &cli.snapshot).await?;
            render(&report, &cli.snapshot)
        }
        Commands::Scrape => scrape(cli.scrape.into_config()?, &cli.snapshot).await,
        Commands::Render => render(&report, &cli.snapshot),
        Commands::Stats { format } => stats(&report, &cli.snapshot, format),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    if let Err(e) = execute(cli).await {
        log::error!("{:#}", e);
        process::exit(1);
    }
}
