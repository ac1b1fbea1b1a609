//! Event bus handlers.

pub mod ticket_updates;

pub use ticket_updates::{apply_ticket, TicketUpdateHandler};
