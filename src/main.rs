use birthday_importer::{importer, startup};
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting birthday import");

    let config = startup::load_config()?;
    info!(
        "Importing {} into {:?}",
        config.input_path.display(),
        config.target_calendar_name
    );

    importer::run(&config).await?;

    Ok(())
}
