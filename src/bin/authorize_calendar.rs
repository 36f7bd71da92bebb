use birthday_importer::components::google_calendar::{authorized_client, CalendarApi};
use birthday_importer::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    // Load configuration
    let config = startup::load_config()?;

    // Reuse the cached token or run the consent flow, saving the result
    let client = authorized_client(&config).await?;
    println!("Token saved to {}", config.token_path.display());

    // Show the names the importer can target
    let calendars = client.list_calendars().await?;
    println!("\nAvailable calendars:");
    for calendar in calendars {
        let marker = if calendar.summary == config.target_calendar_name {
            " (configured)"
        } else {
            ""
        };
        println!(" - {}{}", calendar.summary, marker);
    }

    Ok(())
}
