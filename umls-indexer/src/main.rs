use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use umls_indexer::logging::{init_tracing, LogFormat};
use umls_indexer::{Cli, Dependencies, IndexerSettings, IndexingError};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_tracing(LogFormat::from_json_flag(cli.log_json)) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Indexing failed");

            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                error!(cause = %cause, "Caused by");
                source = cause.source();
            }

            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), IndexingError> {
    let settings = IndexerSettings::load(cli)?;
    let dependencies = Dependencies::new(&settings).await?;

    let report = dependencies.orchestrator.run().await?;

    info!(
        provisioning = ?report.provisioning,
        submitted = report.load.submitted,
        succeeded = report.load.succeeded,
        failed = report.load.failed,
        batches = report.load.batches,
        lines_read = report.stream.lines_read,
        short_lines = report.stream.short_lines,
        skipped = report.stream.skipped,
        "Indexing finished"
    );

    Ok(())
}
