//! Serenity adapter.
//!
//! - **client**: gateway connection ([`FederalBot`])
//! - **handler**: gateway events into the moderation core
//! - **platform**: [`Platform`](crate::Platform) over serenity's HTTP client
//! - **responder**: interaction acknowledgements, deferred or direct
//! - **conversions**: serenity models and builders to and from core types
//!
//! Available with the `discord` feature.

mod client;
mod conversions;
mod handler;
mod platform;
mod responder;

pub use client::FederalBot;
pub use handler::FederalHandler;
pub use platform::SerenityPlatform;
pub use responder::SerenityResponder;
