//! Event handlers.
//!
//! Add new event handlers by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_event;` below
//! 3. Calling it from the engine

pub mod membership;

pub use membership::{handle_group_join, handle_group_leave};
