use crate::components::google_calendar::{
    self, resolve_calendar_id, upsert_birthday, CalendarApi, UpsertOutcome,
};
use crate::components::roster::{load_roster, RosterRow};
use crate::config::Config;
use crate::error::{Error, ImportResult};
use std::io::{self, Write};
use tracing::info;

/// Counts of what a run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
}

/// Run the whole import: roster, authorization, calendar lookup, events
pub async fn run(config: &Config) -> ImportResult<ImportSummary> {
    if !config.input_path.exists() {
        return Err(Error::FileNotFound(config.input_path.clone()));
    }

    // Schema and date errors abort here, before any authorization
    let rows = load_roster(config)?;

    let client = google_calendar::authorized_client(config).await?;

    let mut out = io::stdout();
    import_roster(&client, config, &rows, &mut out).await
}

/// Import already loaded rows, writing progress lines to `out`
pub async fn import_roster<A, W>(
    api: &A,
    config: &Config,
    rows: &[RosterRow],
    out: &mut W,
) -> ImportResult<ImportSummary>
where
    A: CalendarApi + ?Sized,
    W: Write,
{
    let calendar_id = resolve_calendar_id(api, &config.target_calendar_name, out).await?;

    writeln!(out, "\nUsing calendar: \"{}\"\n", config.target_calendar_name)?;

    let mut summary = ImportSummary::default();
    for row in rows {
        match upsert_birthday(api, &calendar_id, row).await? {
            UpsertOutcome::Inserted => {
                summary.added += 1;
                writeln!(out, "Added: {}", row.name)?;
            }
            UpsertOutcome::Skipped => {
                summary.skipped += 1;
                writeln!(out, "Skipped (already exists): {}", row.name)?;
            }
        }
        out.flush()?;
    }

    writeln!(out, "\nDone.")?;
    info!("Import finished: {} added, {} skipped", summary.added, summary.skipped);
    Ok(summary)
}
