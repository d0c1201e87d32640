use clap::Parser;
use posemesh_map::utils::error::{ErrorSeverity, MapError};
use posemesh_map::utils::{logger, validation::Validate};
use posemesh_map::{
    CliConfig, DomainConfig, DomainSession, LocalStorage, MapEngine, MapPipeline, MapReport,
    WriteOutcome,
};

/// Exit code when the map was fetched but an artifact could not be produced.
const PARTIAL_FAILURE_EXIT_CODE: i32 = 4;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting posemesh-map");
    tracing::debug!("CLI config: {:?}", cli);

    match run(&cli).await {
        Ok(report) => {
            print_report(&report);
            if report.has_failures() {
                std::process::exit(PARTIAL_FAILURE_EXIT_CODE);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Map download failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

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
}

async fn run(cli: &CliConfig) -> Result<MapReport, MapError> {
    tracing::info!("📁 Loading domain configuration from: {}", cli.config);
    let domain_config = DomainConfig::from_file(&cli.config)?;
    domain_config.validate()?;

    let settings = cli.resolve(&domain_config);
    settings.validate()?;
    tracing::debug!("Map settings: {:?}", settings);

    let mut session = DomainSession::new(&domain_config);
    session.authenticate().await?;

    let storage = LocalStorage::new(settings.output_path.clone());
    let pipeline = MapPipeline::new(session, storage, settings);

    MapEngine::new(pipeline).run().await
}

fn print_report(report: &MapReport) {
    for (artifact, outcome) in [("Image", &report.raster), ("Metadata", &report.metadata)] {
        match outcome {
            WriteOutcome::Written(path) => println!("✅ {} saved to: {}", artifact, path),
            WriteOutcome::Absent => println!("⚠️ {} not present in the map response", artifact),
            WriteOutcome::EncodeFailed(e) => eprintln!("❌ {} could not be decoded: {}", artifact, e),
            WriteOutcome::WriteFailed(e) => eprintln!("❌ {} could not be written: {}", artifact, e),
        }
    }
}
