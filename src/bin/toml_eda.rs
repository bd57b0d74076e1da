use clap::Parser;
use meteor_eda::config::toml_config::TomlConfig;
use meteor_eda::core::ConfigProvider;
use meteor_eda::domain::ports::{DataSource, HistogramBins};
use meteor_eda::utils::{logger, validation::Validate};
use meteor_eda::{EdaPipeline, EtlEngine, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-eda")]
#[command(about = "Meteorite landings analysis driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "eda-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    match config.log_level() {
        Some(level) if level.eq_ignore_ascii_case("json") => logger::init_json_logger(args.verbose),
        _ => logger::init_cli_logger(args.verbose),
    }

    tracing::info!("🚀 Starting TOML-based analysis");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = EdaPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Analysis completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Analysis completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    match config.source() {
        DataSource::File(path) => println!("  Source: {} (file)", path),
        DataSource::Http { url, .. } => println!("  Source: {} (http)", url),
    }
    println!("  Output: {}", config.output_path());
    println!("  Final transform: {}", config.final_transform());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Data Source:");
    match config.source() {
        DataSource::File(path) => println!("  File: {}", path),
        DataSource::Http {
            url,
            timeout_seconds,
        } => {
            println!("  Endpoint: {}", url);
            println!("  Timeout: {}s", timeout_seconds);
        }
    }

    println!();
    println!("🧹 Cleaning:");
    let filter = config.filter_options();
    match (filter.min_year, filter.max_year) {
        (Some(min), Some(max)) => println!("  Years: {} to {}", min, max),
        (None, Some(max)) => println!("  Years: up to {}", max),
        (Some(min), None) => println!("  Years: from {}", min),
        (None, None) => println!("  Years: all"),
    }
    if filter.require_fall_kind {
        println!("  ✅ Only Fell/Found rows kept");
    }

    println!();
    println!("⚙️ Analysis:");
    println!("  IQR multiplier: {}", config.iqr_multiplier());
    println!("  KDE grid size: {}", config.kde_grid_size());
    match config.histogram_bins() {
        HistogramBins::Fixed(n) => println!("  Histogram bins: {}", n),
        HistogramBins::Auto => println!("  Histogram bins: auto"),
    }
    println!("  Final transform: {}", config.final_transform());

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  CSV, JSON and text: {}/", config.data_dir());
    println!("  HTML tables: {}/", config.tables_dir());
    println!("  Chart data: {}/", config.charts_dir());
    if let Some(bundle) = config.bundle_name() {
        println!("  Compression: {} (ZIP)", bundle);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
