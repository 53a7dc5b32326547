//! Shared wire types for the social simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces them, and an external physics backend speaks them.

pub mod faction;
pub mod metrics;
pub mod protocol;
pub mod snapshot;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use faction::{AgentState, Faction, ParseFactionError};
pub use metrics::{FactionCounts, MetricsSnapshot, Phase};
pub use protocol::{
    ResetRequest, ResetResponse, StatusResponse, GLITCH_PATH, OBSERVER_PATH, RESET_PATH,
    STATE_PATH, STEP_PATH,
};
pub use snapshot::AgentSnapshot;
