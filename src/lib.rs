//! Zelador - WhatsApp group moderation engine
//!
//! A modular moderation and automation core for WhatsApp groups, built on
//! top of a pluggable protocol transport.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration (groups, users, bot profile, activity)
//! - `cache` - LRU-based caching with Moka
//! - `transport` - Capability interface to the WhatsApp protocol client
//! - `moderation` - Policy detectors (antiflood, antilink, antifake, command
//!   rate limiting) and the message-screening orchestrator
//! - `commands` - Group command handlers (extensible)
//! - `events` - Membership event handlers (join/leave)
//! - `texts` - Embedded reply-text catalog
//! - `utils` - Utility functions
//!
//! The embedding application owns the protocol connection and dispatch
//! loop: it decodes inbound events into [`transport::InboundMessage`] and
//! hands them to [`engine::Engine`], which runs moderation screening and
//! command dispatch to completion before returning.

pub mod cache;
pub mod commands;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod events;
pub mod moderation;
pub mod texts;
pub mod transport;
pub mod utils;

pub use config::Config;
pub use engine::Engine;
pub use error::CommandError;

use tracing_subscriber::EnvFilter;

/// Initialize logging with sensible defaults.
///
/// If RUST_LOG is not set, defaults to "info" level for this crate.
/// Optional - the embedding application may install its own subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("zelador=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
