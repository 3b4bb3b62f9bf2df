//! Punishment registry.
//!
//! Staff apply sanctions through a modal on the pinned punishment panel. Each
//! sanction is a [`Punishment`] record persisted before any role change; the
//! record is the source of truth and role state follows it best-effort.

mod audit;
mod category;
mod handler;
mod record;
mod registry;

pub use audit::{QraName, applied_embed, removed_embed};
pub use category::PunishmentCategory;
pub use handler::{PANEL_MARKER, PunishmentHandler};
pub use record::{Punishment, generate_token};
pub use registry::{AppliedPunishment, PUNISHMENTS_FILE, PunishmentRegistry, RoleRevocation};
