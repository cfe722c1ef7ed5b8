use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use order_import::{
    config::ApiConfig,
    infrastructure::{
        http::order_api::HttpOrderGateway,
        local_file::read_import_file,
        memory::history_repo::InMemoryImportHistory,
        parsers::template::{template_csv, TEMPLATE_FILE_NAME},
    },
    FieldCatalog, ImportWizard,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const SKIPPED_ROWS: usize = 100;
const SUMMARY_ERRORS: usize = 10;

/// Import delivery orders from a CSV export.
#[derive(Debug, Parser)]
#[command(name = "order-import", version)]
struct Cli {
    /// CSV or TXT file to import
    #[arg(required_unless_present = "template")]
    file: Option<PathBuf>,

    /// Print the import template to stdout and exit
    #[arg(long)]
    template: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("order_import=debug".parse()?)
            .add_directive("reqwest=info".parse()?))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();
    let catalog = FieldCatalog::orders();

    if cli.template {
        debug!("Writing {} to stdout", TEMPLATE_FILE_NAME);
        print!("{}", template_csv(&catalog)?);
        return Ok(());
    }
    let Some(path) = cli.file else {
        return Err("no input file given".into());
    };

    info!("Starting order import");
    let config = ApiConfig::from_env()?;
    let file = read_import_file(&path).await?;

    let cancel = CancellationToken::new();
    let mut options = config.executor_options();
    options.cancellation = Some(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling the remaining rows");
            cancel.cancel();
        }
    });

    let mut wizard = ImportWizard::new(
        catalog,
        Arc::new(HttpOrderGateway::from_config(&config)),
        Arc::new(InMemoryImportHistory::new()),
        options,
    );

    wizard.upload(&file.name, &file.text)?;
    for field in wizard.catalog().fields() {
        let column = wizard.mapping().get(field.key).unwrap_or("(skip)");
        info!("{}{} -> {}", field.label, if field.required { " *" } else { "" }, column);
    }

    wizard.continue_to_preview()?;
    info!(
        "{} rows: {} valid, {} invalid",
        wizard.validated_rows().len(),
        wizard.valid_count(),
        wizard.invalid_count()
    );
    let invalid = wizard.invalid_count();
    for row in wizard.invalid_rows().take(SKIPPED_ROWS) {
        warn!("Row {} skipped: {}", row.row_number, row.errors.join(", "));
    }
    if invalid > SKIPPED_ROWS {
        warn!("... and {} more skipped rows", invalid - SKIPPED_ROWS);
    }

    let mut progress = wizard.subscribe_progress();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let p = *progress.borrow();
            debug!("Imported {}/{} ({}%)", p.completed, p.total, p.percent);
        }
    });

    let outcome = wizard.start_import().await?;
    reporter.abort();

    info!(
        "Imported {} of {} orders from '{}'",
        outcome.success_count, outcome.total, outcome.file_name
    );
    for failure in outcome.failure_summary(SUMMARY_ERRORS) {
        warn!("Row {} (file row {}): {}", failure.row_number, failure.source_row, failure.message);
    }
    if outcome.errors.len() > SUMMARY_ERRORS {
        warn!("... and {} more failed rows", outcome.errors.len() - SUMMARY_ERRORS);
    }

    Ok(())
}
