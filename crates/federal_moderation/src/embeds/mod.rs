//! Member-authored embeds.
//!
//! `/setupembed` lets a member compose an embed in a modal, then name the
//! target channel by mentioning it in their next message. Sent embeds are
//! recorded per author so they can later be edited or deleted.

mod draft;
mod manager;

pub use draft::{DEFAULT_COLOR, EmbedDraft, UserEmbed, normalize_color};
pub use manager::{EMBEDS_FILE, EmbedManager};
