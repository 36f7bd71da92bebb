use super::models::{CalendarEvent, CalendarListEntry};
use crate::error::ImportResult;
use async_trait::async_trait;

/// The three Calendar API operations the importer depends on
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// List the calendars visible to the authorized account (first page only)
    async fn list_calendars(&self) -> ImportResult<Vec<CalendarListEntry>>;

    /// Free-text search over single events of a calendar
    async fn search_events(
        &self,
        calendar_id: &str,
        query: &str,
        max_results: u32,
    ) -> ImportResult<Vec<CalendarEvent>>;

    /// Insert an event and return the created resource
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> ImportResult<CalendarEvent>;
}
