use super::api::CalendarApi;
use super::models::{CalendarEvent, CalendarList, CalendarListEntry, EventList};
use crate::error::{google_calendar_error, ImportResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Calendar API client authenticated with a bearer access token
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl GoogleCalendarClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, access_token: impl Into<String>) -> ImportResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| google_calendar_error(&format!("Invalid API URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(google_calendar_error(&format!(
                "Invalid API URL {}",
                base_url
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            access_token: access_token.into(),
        })
    }

    /// Build an endpoint URL; each segment is percent-encoded on its own
    fn endpoint(&self, segments: &[&str]) -> ImportResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API URL cannot take path segments"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.access_token))
    }

    /// Send a request and decode a successful JSON body
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> ImportResult<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to {}: {}", action, e)))?;

        let response = check_status(response, action).await?;
        response.json().await.map_err(|e| {
            google_calendar_error(&format!("Failed to parse {} response: {}", action, e))
        })
    }
}

async fn check_status(response: Response, action: &str) -> ImportResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());
    Err(google_calendar_error(&format!(
        "Failed to {}: HTTP {} - {}",
        action, status, error_body
    )))
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_calendars(&self) -> ImportResult<Vec<CalendarListEntry>> {
        let url = self.endpoint(&["users", "me", "calendarList"])?;
        let list: CalendarList = self
            .execute(self.client.get(url), "list calendars")
            .await?;

        debug!("Calendar list returned {} calendars", list.items.len());
        Ok(list.items)
    }

    async fn search_events(
        &self,
        calendar_id: &str,
        query: &str,
        max_results: u32,
    ) -> ImportResult<Vec<CalendarEvent>> {
        let mut url = self.endpoint(&["calendars", calendar_id, "events"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("singleEvents", "true")
            .append_pair("maxResults", &max_results.to_string());

        let list: EventList = self.execute(self.client.get(url), "search events").await?;

        debug!("Search for {:?} returned {} events", query, list.items.len());
        Ok(list.items)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> ImportResult<CalendarEvent> {
        let url = self.endpoint(&["calendars", calendar_id, "events"])?;
        self.execute(self.client.post(url).json(event), "insert event")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_calendar_id() {
        let client =
            GoogleCalendarClient::new("https://www.googleapis.com/calendar/v3", "token").unwrap();
        let url = client
            .endpoint(&["calendars", "team#contacts@group.v.calendar.google.com", "events"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team%23contacts@group.v.calendar.google.com/events"
        );
    }

    #[test]
    fn test_endpoint_on_bare_host() {
        let client = GoogleCalendarClient::new("http://127.0.0.1:8080", "token").unwrap();
        let url = client.endpoint(&["users", "me", "calendarList"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/users/me/calendarList");
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(GoogleCalendarClient::new("not a url", "token").is_err());
    }
}
