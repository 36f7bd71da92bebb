use super::api::CalendarApi;
use crate::error::{Error, ImportResult};
use std::io::Write;
use tracing::info;

/// Resolve a calendar display name to its identifier.
///
/// The match is exact and case-sensitive; the first hit wins. On a miss
/// every available name is written to `out` before failing.
pub async fn resolve_calendar_id<A, W>(
    api: &A,
    calendar_name: &str,
    out: &mut W,
) -> ImportResult<String>
where
    A: CalendarApi + ?Sized,
    W: Write,
{
    let calendars = api.list_calendars().await?;

    if let Some(calendar) = calendars.iter().find(|cal| cal.summary == calendar_name) {
        info!("Resolved calendar {:?} to {}", calendar_name, calendar.id);
        return Ok(calendar.id.clone());
    }

    writeln!(out, "\nCalendar not found. Available calendars:")?;
    for calendar in &calendars {
        writeln!(out, " - {}", calendar.summary)?;
    }

    Err(Error::CalendarNotFound(calendar_name.to_string()))
}
