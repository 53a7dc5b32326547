//! Social Simulation Engine Library
//!
//! Agent-based faction simulation: spatial indexing, perception and
//! steering, faction interaction rules, the world clock and metrics, and
//! sync with an external physics backend.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod control;
pub mod output;
pub mod setup;
pub mod simulation;
pub mod sync;
pub mod systems;

pub use components::*;
pub use config::{default_config_toml, ConfigError, SimConfig};
pub use control::{ControlCommand, ControlScript, ScheduledCommand};
pub use simulation::{SimError, Simulation};
pub use sync::{BackendError, DriveOutcome, HttpBackend, PhysicsBackend, SyncAdapter, SyncMode};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
