//! Moderation policy core.
//!
//! Stateful detectors plus the orchestrator that screens every inbound
//! message:
//!
//! - `flood` - per-(group, user) sliding message windows
//! - `link` - link/invite detection over text and captions
//! - `fake` - country-code allow-list validation
//! - `rate_limit` - per-user command-rate windows with temporary blocks
//! - `procedures` - ignore-conditions and the fixed-order policy checks

pub mod fake;
pub mod flood;
pub mod link;
pub mod procedures;
pub mod rate_limit;

pub use flood::FloodTracker;
pub use rate_limit::CommandRateLimiter;
