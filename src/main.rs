use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use codesense::{
    cache::Cache,
    config::Config,
    model::Severity,
    output::{format_report_to_string, print_features, print_report, OutputFormat},
    report::{sort_by_severity, ScanReport, Summary},
    resolver::Resolver,
    scanner::{BaselineLevel, Scanner},
};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const HIGH: u8 = 2;
    pub const MEDIUM: u8 = 3;
    pub const LOW: u8 = 4;
}

#[derive(Parser)]
#[command(name = "codesense")]
#[command(
    author,
    version,
    about = "Scan web projects for browser APIs and check their Baseline availability"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project directory or a single file
    Scan {
        /// Directory or file to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Reporting threshold (widely, newly, all)
        #[arg(short, long)]
        baseline: Option<BaselineLevel>,

        /// Include glob, relative to the scanned directory (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Exclude glob, relative to the scanned directory (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only use the bundled data, never the feature-search service
        #[arg(long)]
        no_remote: bool,

        /// Exit with error if features at or above this severity are found
        #[arg(long, value_enum)]
        fail_on: Option<FailLevel>,
    },

    /// Look up the Baseline status of feature identifiers
    Check {
        /// Feature identifiers, e.g. fetch, css-property-gap
        #[arg(required = true)]
        identifiers: Vec<String>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Only use the bundled data, never the feature-search service
        #[arg(long)]
        no_remote: bool,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Clear the remote lookup cache
    ClearCache,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailLevel {
    High,
    Medium,
    Low,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    match cli.command {
        Commands::Scan {
            path,
            format,
            baseline,
            include,
            exclude,
            output,
            no_remote,
            fail_on,
        } => {
            let mut config = config;
            if let Some(level) = baseline {
                config.baseline_level = level;
            }
            if !include.is_empty() {
                config.include = include;
            }
            config.exclude.extend(exclude);
            if no_remote {
                config.remote_lookup = false;
            }

            let format = format.unwrap_or_else(|| config.default_format.clone());
            run_scan(&config, path, &format, output, fail_on).await
        }
        Commands::Check {
            identifiers,
            format,
            no_remote,
        } => {
            let mut config = config;
            if no_remote {
                config.remote_lookup = false;
            }
            let format = format.unwrap_or_else(|| config.default_format.clone());
            run_check(&config, &identifiers, &format).await?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(cli.config, init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ClearCache => {
            let removed = Cache::new().clear()?;
            println!("Cache cleared ({} entries).", removed);
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(
    config: &Config,
    root: PathBuf,
    format: &str,
    output_file: Option<PathBuf>,
    fail_on: Option<FailLevel>,
) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let resolver = Arc::new(Resolver::from_config(config)?);
    let scanner = Scanner::new(config.scan_options(), resolver);

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Scanning {}...", root.display()));
        Some(pb)
    } else {
        None
    };

    let scanned = scanner.scan_project(&root).await;

    if let Some(pb) = &progress {
        match &scanned {
            Ok(results) => pb.finish_with_message(format!("Scanned {} files", results.len())),
            Err(_) => pb.finish_and_clear(),
        }
    }

    let mut results = scanned?;
    sort_by_severity(&mut results);
    let report = ScanReport::new(root, results);

    if let Some(path) = output_file {
        let text = format_report_to_string(&report, format)?;
        std::fs::write(&path, text)?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_report(&report, format)?;
    }

    Ok(determine_exit_code(&report.summary, fail_on))
}

/// Resolves identifiers concurrently through one shared resolver.
async fn run_check(config: &Config, identifiers: &[String], format: &str) -> Result<()> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let resolver = Resolver::from_config(config)?;

    let lookups = identifiers.iter().map(|id| {
        let resolver = &resolver;
        async move { (id.clone(), resolver.resolve(id).await) }
    });
    let features = join_all(lookups).await;

    print_features(&features, format)
}

/// Determine the exit code based on the worst severity found and --fail-on setting
fn determine_exit_code(summary: &Summary, fail_on: Option<FailLevel>) -> u8 {
    let Some(fail_on) = fail_on else {
        return exit_codes::SUCCESS;
    };

    let threshold = match fail_on {
        FailLevel::High => Severity::High,
        FailLevel::Medium => Severity::Medium,
        FailLevel::Low => Severity::Low,
    };

    match summary.worst_severity() {
        Some(worst) if worst >= threshold => match worst {
            Severity::High => exit_codes::HIGH,
            Severity::Medium => exit_codes::MEDIUM,
            Severity::Low => exit_codes::LOW,
        },
        _ => exit_codes::SUCCESS,
    }
}

fn handle_config(custom_path: Option<PathBuf>, init: bool, show_path: bool) -> Result<()> {
    let config_path = custom_path.unwrap_or_else(Config::config_path);

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        Config::default().save_to(&config_path)?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'codesense config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
