mod api;
mod client;
pub mod models;
pub mod oauth;
mod resolver;
pub mod token;
mod upsert;

pub use api::CalendarApi;
pub use client::GoogleCalendarClient;
pub use models::{CalendarEvent, CalendarListEntry};
pub use resolver::resolve_calendar_id;
pub use token::{StoredToken, TokenManager};
pub use upsert::{
    birthday_event, birthday_title, upsert_birthday, UpsertOutcome, EXISTENCE_SEARCH_LIMIT,
};

use crate::config::Config;
use crate::error::ImportResult;

/// Authorize and build a Calendar API client for the configured account
pub async fn authorized_client(config: &Config) -> ImportResult<GoogleCalendarClient> {
    let token = TokenManager::new(config).authorize().await?;
    GoogleCalendarClient::new(&config.api_base_url, token.access_token()?)
}
