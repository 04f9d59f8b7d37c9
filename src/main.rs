use arloader::utils::error::ArloaderError;
use arloader::utils::{logger, monitor::UploadMonitor, validation::Validate};
use arloader::{app, ArloaderConfig, Arweave, Cli, ConfigProvider, Settings};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<(), ArloaderError> {
    let file_config = cli
        .config
        .as_deref()
        .map(ArloaderConfig::from_file)
        .transpose()?;
    if let Some(file_config) = &file_config {
        file_config.validate()?;
    }

    let settings = Settings::resolve(&cli.overrides(), file_config.as_ref())?;
    settings.validate()?;
    tracing::debug!("Resolved settings: {:?}", settings);

    let monitor = UploadMonitor::new(settings.monitoring_enabled());
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let arweave = Arweave::from_config(&settings, cli.command.requires_wallet()).await?;
    app::run(cli.command, &arweave, &settings, &monitor).await
}
