//! ECS Components and Resources
//!
//! Agents, the personality catalog, and world-level state.

pub mod agent;
pub mod personality;
pub mod world;

pub use agent::*;
pub use personality::*;
pub use world::*;
