pub mod google_calendar;
pub mod roster;

pub use google_calendar::{CalendarApi, GoogleCalendarClient};
pub use roster::RosterRow;
