//! Moderation core of the Polícia Federal community bot.
//!
//! The crate owns every workflow the bot offers and talks to the chat
//! platform only through the [`Platform`] capability trait:
//!
//! - [`ticket`]: private support channels with transcripts
//! - [`punishment`]: role-backed sanctions with an audit log
//! - [`blacklist`]: permanent bans summarised on a pinned panel
//! - [`embeds`]: member-authored embeds
//! - [`access`]: self-service access role
//!
//! Components are assembled by [`Moderation`], which routes each inbound
//! interaction through the [`Router`] and keeps the pinned panels in place
//! with the [`PanelReconciler`].
//!
//! # Features
//!
//! - `discord`: serenity adapter ([`discord::FederalBot`])
//! - `testing`: in-memory [`testing::MockPlatform`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod blacklist;
pub mod config;
pub mod embeds;
pub mod ids;
pub mod interaction;
pub mod message;
pub mod panel;
pub mod platform;
pub mod punishment;
pub mod resolver;
pub mod router;
pub mod ticket;

mod suite;

#[cfg(feature = "discord")]
pub mod discord;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use access::AccessPanel;
pub use blacklist::{Blacklist, BlacklistEntry};
pub use config::ModerationConfig;
pub use embeds::{EmbedDraft, EmbedManager, UserEmbed};
pub use ids::{ChannelId, GuildId, MessageId, RoleId, UserId};
pub use interaction::{Interaction, InteractionKind, Response};
pub use message::{Embed, OutgoingMessage};
pub use panel::{PanelOutcome, PanelReconciler};
pub use platform::{IncomingMessage, Member, Platform};
pub use punishment::{Punishment, PunishmentCategory, PunishmentHandler, PunishmentRegistry};
pub use resolver::{Resolution, resolve_member};
pub use router::{CommandDefinition, InteractionHandler, MessageListener, Router};
pub use suite::Moderation;
pub use ticket::{Ticket, TicketCategory, TicketDesk, TicketHandler};
