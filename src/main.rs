use clap::Parser;
use staged_etl::config::cli::LogFormat;
use staged_etl::utils::error::ErrorSeverity;
use staged_etl::utils::{logger, validation::Validate};
use staged_etl::{
    CliConfig, Coordinator, EtlError, HttpSource, RunMode, SequentialRunner, SqliteStore,
};

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ ETL run failed: {} (Severity: {:?})",
        e,
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting staged-etl in {:?} mode", cli.mode);

    let settings = match cli.settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Settings: {:?}", settings);

    let source = HttpSource::from_config(&settings)?;
    let store = SqliteStore::from_config(&settings)?;

    let outcome = match cli.mode {
        RunMode::Staged => Coordinator::new(source, store).run().await.into_result(),
        RunMode::Sequential => SequentialRunner::new(source, store)
            .run()
            .await
            .map(|report| {
                tracing::info!("✅ Persisted {} records", report.persisted.len());
            }),
    };

    if let Err(e) = outcome {
        exit_with(&e);
    }

    tracing::info!("✅ ETL run completed");
    Ok(())
}
