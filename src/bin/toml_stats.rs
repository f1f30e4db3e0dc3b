use clap::Parser;
use outbreak_stats::core::ConfigProvider;
use outbreak_stats::utils::error::ErrorSeverity;
use outbreak_stats::utils::{logger, validation::Validate};
use outbreak_stats::{LocalStorage, StatisticsPipeline, StatsEngine, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-stats")]
#[command(about = "Passenger statistics driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "outbreak-stats.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the contact search root from config
    #[arg(long)]
    trace: Option<String>,

    /// Override the contact search depth from config
    #[arg(long)]
    depth: Option<u32>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based statistics run");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(trace) = args.trace.clone() {
        tracing::info!("🔧 Contact search overridden to: {}", trace);
        config.set_trace(trace, args.depth);
    }

    // 驗證配置
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

    let storage = LocalStorage::default();
    let pipeline = StatisticsPipeline::new(storage, config);
    let engine = StatsEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Statistics computed successfully!");
            println!("✅ Statistics computed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Statistics run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

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
        "  Report: {} v{}",
        config.report.name,
        config.report.version.as_deref().unwrap_or("-")
    );
    println!("  Passengers: {}", config.passengers_source());
    if let Some(contacts) = config.contacts_source() {
        println!("  Contacts: {}", contacts);
    }
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Data Sources:");
    println!("  Passengers: {}", config.passengers_source());
    match config.contacts_source() {
        Some(contacts) => println!("  Contacts: {}", contacts),
        None => println!("  Contacts: (none)"),
    }
    println!("  Request timeout: {:?}", config.request_timeout());

    println!();
    println!("⚙️ Analysis:");
    println!("  📈 New and cumulative infections per day");
    println!("  📊 Severity breakdown per day");
    println!("  🧮 R0 estimate up to the peak day");
    if let Some(trace) = config.contact_trace() {
        println!(
            "  🔗 Contact search from {} to depth {}",
            trace.passenger_id, trace.depth
        );
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
