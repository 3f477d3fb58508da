//! Command-line interface for the event-study engine.

use earnings_event_study::config::StudyFileConfig;
use earnings_event_study::data::{load_earnings, load_price_dir, DataConfig};
use earnings_event_study::error::{EventStudyError, Result};
use earnings_event_study::export::{export_caar_csv, export_json, export_series_csv};
use earnings_event_study::report::{Metric, ReportFormatter};
use earnings_event_study::study::EventStudy;
use earnings_event_study::types::CaarTable;

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Event-study analysis of stock performance around earnings announcements.
#[derive(Parser)]
#[command(name = "event-study")]
#[command(version)]
#[command(about = "Beat/Meet/Miss abnormal-return analysis around earnings announcements")]
#[command(long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an example configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "event_study.toml")]
        output: PathBuf,
    },

    /// Show earnings, classification and price windows for one stock
    Stock {
        /// Stock symbol
        symbol: String,
    },

    /// Show AAR (or CAAR) for one group
    Group {
        /// Group name: Beat, Meet or Miss
        name: String,

        /// Show CAAR instead of AAR
        #[arg(long)]
        cumulative: bool,

        /// Also write the series as `Day,<metric>` CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the point-estimate CAAR table
    Export {
        /// Output path (defaults to the configured caar_path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },

    /// Bootstrap group CAAR curves and export the averaged table
    Bootstrap {
        /// Stocks sampled per group per iteration
        #[arg(short, long)]
        sample_size: Option<usize>,

        /// Number of iterations
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Random seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Output path (defaults to the configured bootstrap_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute point-estimate and bootstrapped CAAR and export both
    Run,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    /// Initialize logging based on verbosity level.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("Warning: tracing subscriber already installed");
        }
    }

    fn file_config(&self) -> Result<StudyFileConfig> {
        match &self.config {
            Some(path) => StudyFileConfig::load(path),
            None => Ok(StudyFileConfig::default()),
        }
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    if let Commands::Init { output } = &cli.command {
        return init_config(output);
    }

    let config = cli.file_config()?;
    let study = load_study(&config)?;

    match &cli.command {
        Commands::Init { .. } => Ok(()),

        Commands::Stock { symbol } => {
            ReportFormatter::print_stock(study.stock(symbol)?);
            Ok(())
        }

        Commands::Group {
            name,
            cumulative,
            output,
        } => {
            let group = study.groups().by_name(name)?;
            let metrics = group.metrics(study.store());
            let metric = if *cumulative { Metric::Caar } else { Metric::Aar };
            ReportFormatter::print_group_metrics(
                group.kind(),
                group.len(),
                &metrics,
                metric,
                study.anchor_offset(),
            );

            if let Some(path) = output {
                let points = match metric {
                    Metric::Aar => metrics.aar_by_day(study.anchor_offset()),
                    Metric::Caar => metrics.caar_by_day(study.anchor_offset()),
                };
                export_series_csv(&points, metric.label(), path)?;
                println!("{} data exported to {}", metric.label(), path.display());
            }
            Ok(())
        }

        Commands::Export { output, format } => {
            let path = output.clone().unwrap_or_else(|| config.output.caar_path.clone());
            write_table(&study.caar_table(), &path, *format)
        }

        Commands::Bootstrap {
            sample_size,
            iterations,
            seed,
            output,
        } => {
            let mut bootstrap = config.bootstrap_config();
            if let Some(n) = sample_size {
                bootstrap.sample_size = *n;
            }
            if let Some(n) = iterations {
                bootstrap.iterations = *n;
            }
            if seed.is_some() {
                bootstrap.seed = *seed;
            }

            let result = study.bootstrap(bootstrap)?;
            let table = result.table();
            ReportFormatter::print_caar_table("Bootstrapped CAAR", &table);

            let path = output.clone().unwrap_or_else(|| config.output.bootstrap_path.clone());
            write_table(&table, &path, ExportFormat::Csv)
        }

        Commands::Run => {
            let point = study.caar_table();
            ReportFormatter::print_caar_table("CAAR", &point);
            write_table(&point, &config.output.caar_path, ExportFormat::Csv)?;

            let result = study.bootstrap(config.bootstrap_config())?;
            let table = result.table();
            ReportFormatter::print_caar_table("Bootstrapped CAAR", &table);
            write_table(&table, &config.output.bootstrap_path, ExportFormat::Csv)
        }
    }
}

fn load_study(config: &StudyFileConfig) -> Result<EventStudy> {
    let data_config = DataConfig::default();
    let records = load_earnings(&config.data.earnings_path, &data_config)?;
    if records.is_empty() {
        return Err(EventStudyError::NoData);
    }

    let benchmark_symbol = config.data.benchmark_symbol.as_str();
    let symbols = records
        .iter()
        .map(|r| r.symbol.as_str())
        .chain(std::iter::once(benchmark_symbol));
    let histories = load_price_dir(&config.data.prices_dir, symbols, &data_config);

    let benchmark = histories.get(benchmark_symbol).cloned().ok_or_else(|| {
        EventStudyError::DataError(format!(
            "no price history for benchmark {} in {}",
            benchmark_symbol,
            config.data.prices_dir.display()
        ))
    })?;

    info!("Building event study for {} records", records.len());
    Ok(EventStudy::from_histories(
        records,
        &histories,
        &benchmark,
        &config.window_config(),
    ))
}

fn write_table(table: &CaarTable, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Csv => export_caar_csv(table, path)?,
        ExportFormat::Json => export_json(table, path)?,
    }
    println!("CAAR data exported to {}", path.display());
    Ok(())
}

fn init_config(output: &Path) -> Result<()> {
    fs::write(output, StudyFileConfig::example())?;
    println!("Created example configuration file: {}", output.display());
    println!("\nEdit this file to point at your data, then run:");
    println!("  event-study -c {} run", output.display());
    Ok(())
}
