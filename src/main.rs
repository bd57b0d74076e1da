use clap::Parser;
use meteor_eda::config::Command;
use meteor_eda::core::layout;
use meteor_eda::core::Pipeline;
use meteor_eda::utils::{logger, validation::Validate};
use meteor_eda::{CliConfig, EdaError, EdaPipeline, EtlEngine, LocalStorage, ProjectionPipeline};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting meteor-eda CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());

    let outcome = match config.command() {
        Command::Layout { create } => {
            let root = Path::new(&config.output_path);
            let report = if create {
                layout::create_missing(root)
            } else {
                Ok(layout::check_layout(root))
            };
            report.map(|report| {
                println!("{}", report);
                root.display().to_string()
            })
        }
        Command::Project => run(ProjectionPipeline::new(storage, config), monitor_enabled).await,
        Command::Run(_) => run(EdaPipeline::new(storage, config), monitor_enabled).await,
    };

    match outcome {
        Ok(output_path) => {
            tracing::info!("✅ Completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

async fn run<P: Pipeline>(pipeline: P, monitor_enabled: bool) -> meteor_eda::Result<String> {
    EtlEngine::new_with_monitoring(pipeline, monitor_enabled)
        .run()
        .await
}

fn exit_with(e: EdaError) {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
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
