use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use sparkwatch::{Coordinator, SinkKind, SparkwatchConfig};

#[derive(Parser, Debug)]
#[command(name = "sparkwatch")]
#[command(about = "Sidecar that watches a Spark driver and posts its progress")]
#[command(version)]
#[command(long_about = "Runs next to a Spark driver container. Waits for the driver's \
heartbeat marker, announces the application when the status API reports it, posts \
progress at elapsed-time milestones, and closes the thread once the heartbeat goes stale.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "sparkwatch.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting")]
    validate_config: bool,

    /// Print effective configuration and exit
    #[arg(long, help = "Print the effective configuration in TOML format and exit")]
    print_config: bool,

    /// Log posts instead of sending them
    #[arg(long, help = "Run normally but only log what would have been posted")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!("Starting Sparkwatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    // Load and validate configuration
    let mut config = match SparkwatchConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("✗ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if args.dry_run {
        config.notify.sink = SinkKind::Log;
    }

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        info!("Configuration validation successful");
        println!("✓ Configuration is valid");
        return Ok(());
    }

    info!(
        "Watching {} against {}",
        config.heartbeat.marker_path().display(),
        config.spark.base_url
    );

    let coordinator = match Coordinator::from_config(&config) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            error!("Failed to set up sparkwatch: {}", e);
            std::process::exit(1);
        }
    };

    coordinator.install_signal_handlers();

    let summary = match coordinator.run().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Sparkwatch stopped: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Sparkwatch exited with code {} after {:?} in state {}",
        summary.exit_code, summary.reason, summary.final_state
    );

    std::process::exit(summary.exit_code);
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.quiet {
        "error"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sparkwatch={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}
