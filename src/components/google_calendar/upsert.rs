use super::api::CalendarApi;
use super::models::{CalendarEvent, EventDateTime, TRANSPARENT, YEARLY_RECURRENCE};
use crate::components::roster::RosterRow;
use crate::error::ImportResult;
use tracing::debug;

/// Cap on search results considered by the existence check
pub const EXISTENCE_SEARCH_LIMIT: u32 = 10;

/// What happened to a roster row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Skipped,
}

/// Event title for a person's birthday
pub fn birthday_title(name: &str) -> String {
    format!("🎂 {}'s Birthday", name)
}

/// All-day, yearly, non-blocking event on the birth date
pub fn birthday_event(row: &RosterRow) -> CalendarEvent {
    CalendarEvent {
        summary: Some(birthday_title(&row.name)),
        start: Some(EventDateTime::all_day(row.birth_date)),
        end: Some(EventDateTime::all_day(row.birth_date)),
        recurrence: vec![YEARLY_RECURRENCE.to_string()],
        transparency: Some(TRANSPARENT.to_string()),
        ..Default::default()
    }
}

/// Insert the birthday event unless a matching one already exists.
///
/// Existence is decided by the service's free-text search on the title, so
/// any event whose text matches counts, and only the first
/// [`EXISTENCE_SEARCH_LIMIT`] results are looked at.
pub async fn upsert_birthday<A>(
    api: &A,
    calendar_id: &str,
    row: &RosterRow,
) -> ImportResult<UpsertOutcome>
where
    A: CalendarApi + ?Sized,
{
    let title = birthday_title(&row.name);

    let existing = api
        .search_events(calendar_id, &title, EXISTENCE_SEARCH_LIMIT)
        .await?;
    if !existing.is_empty() {
        debug!("{} matched {} existing events", title, existing.len());
        return Ok(UpsertOutcome::Skipped);
    }

    let created = api.insert_event(calendar_id, &birthday_event(row)).await?;
    debug!("Created event {:?} for {}", created.id, row.name);
    Ok(UpsertOutcome::Inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ada() -> RosterRow {
        RosterRow {
            name: "Ada Lovelace".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
        }
    }

    #[test]
    fn test_title_format() {
        assert_eq!(birthday_title("Ada Lovelace"), "🎂 Ada Lovelace's Birthday");
        assert_eq!(birthday_title("O'Brien"), "🎂 O'Brien's Birthday");
    }

    #[test]
    fn test_event_body() {
        let body = serde_json::to_value(birthday_event(&ada())).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "summary": "🎂 Ada Lovelace's Birthday",
                "start": { "date": "1815-12-10" },
                "end": { "date": "1815-12-10" },
                "recurrence": ["RRULE:FREQ=YEARLY"],
                "transparency": "transparent"
            })
        );
    }
}
