//! gatecrab: pull-request governance bot.
//!
//! Facade crate re-exporting the workspace members.

pub use gatecrab_api;
pub use gatecrab_core;
pub use gatecrab_github;
