//! Support-ticket desk.
//!
//! A member picks a category on the pinned desk panel and states a reason;
//! the desk opens a private channel shared with staff and records a
//! [`Ticket`]. Every non-bot message in that channel is appended to the
//! ticket's transcript. Closing hides the channel from its owner and, after a
//! fixed delay, delivers the transcript and deletes the channel.

mod close;
mod desk;
mod handler;
mod record;

pub use close::CloseScheduler;
pub use desk::{CloseOutcome, Closer, TICKETS_FILE, TicketDesk, buttons, channel_name};
pub use handler::{PANEL_MARKER, TicketHandler};
pub use record::{
    Ticket, TicketCategory, TranscriptEntry, format_date, format_label, format_timestamp,
};
