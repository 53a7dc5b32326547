//! ECS Systems
//!
//! Spatial indexing, perception, steering, faction interactions, the agent
//! step, the world clock and metrics.

pub mod clock;
pub mod interaction;
pub mod metrics;
pub mod perception;
pub mod spatial;
pub mod steering;
pub mod step;

// Re-export commonly used systems
pub use clock::{advance_clock, ClockError, ClockState, WorldClock};
pub use interaction::{
    process_proximity, resolve, rule_for, Conversion, InteractionOutcome, InteractionRule,
    TickInteractions,
};
pub use metrics::{classify_phase, compute_metrics, update_metrics, WorldMetrics};
pub use perception::{perceive, stance_toward, Perception, Stance};
pub use spatial::{rebuild_spatial_index, SpatialIndex};
pub use steering::{cruise_speed, idle_drift, steer, Heading};
pub use step::{advance_agents, update_agent, StepContext};
