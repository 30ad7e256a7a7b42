// Public DTOs for the Agenda API
//
// Request/response types shared between the HTTP layer and clients.
// The database rows live in agenda-storage and may differ.

pub mod common;
pub mod events;

pub use common::PagedResponse;
pub use events::{
    CreateEventRequest, Event, EventStatus, Transparency, UpdateEventRequest,
};
