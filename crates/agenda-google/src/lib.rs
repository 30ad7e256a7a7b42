// External collaborators: Google Calendar v3 and the Verisafe identity
// service. Both are plain reqwest JSON clients; nothing here touches the
// database.

pub mod calendar;
pub mod error;
pub mod models;
pub mod time;
pub mod verisafe;

pub use calendar::CalendarClient;
pub use error::{GoogleApiError, GoogleResult};
pub use models::{EventDateTime, GoogleEvent, GoogleEventBody};
pub use verisafe::{SocialAccount, VerisafeClient};
