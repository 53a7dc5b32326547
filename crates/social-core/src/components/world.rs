//! World Components
//!
//! Bounds, operator weights, behavior tuning, and the agent collection.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::agent::Agent;

/// Toroidal world extent.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl WorldBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Wrap a position into `[0, width) x [0, height)`.
    pub fn wrap(&self, x: f64, y: f64) -> (f64, f64) {
        (wrap_axis(x, self.width), wrap_axis(y, self.height))
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..self.width).contains(&x) && (0.0..self.height).contains(&y)
    }
}

fn wrap_axis(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// A trait that global weights scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightTrait {
    Aggression,
    Empathy,
    Energy,
}

impl fmt::Display for WeightTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightTrait::Aggression => write!(f, "aggression"),
            WeightTrait::Empathy => write!(f, "empathy"),
            WeightTrait::Energy => write!(f, "energy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown weight trait: {0:?}")]
pub struct ParseWeightTraitError(pub String);

impl FromStr for WeightTrait {
    type Err = ParseWeightTraitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggression" => Ok(WeightTrait::Aggression),
            "empathy" => Ok(WeightTrait::Empathy),
            "energy" => Ok(WeightTrait::Energy),
            _ => Err(ParseWeightTraitError(s.to_string())),
        }
    }
}

/// Operator multipliers applied to every personality trait at decision time.
///
/// Stored personalities are never scaled; only comparisons and speeds are.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalWeights {
    pub aggression: f64,
    pub empathy: f64,
    pub energy: f64,
}

impl Default for GlobalWeights {
    fn default() -> Self {
        Self {
            aggression: 1.0,
            empathy: 1.0,
            energy: 1.0,
        }
    }
}

impl GlobalWeights {
    pub fn get(&self, weight: WeightTrait) -> f64 {
        match weight {
            WeightTrait::Aggression => self.aggression,
            WeightTrait::Empathy => self.empathy,
            WeightTrait::Energy => self.energy,
        }
    }

    pub fn set(&mut self, weight: WeightTrait, value: f64) {
        match weight {
            WeightTrait::Aggression => self.aggression = value,
            WeightTrait::Empathy => self.empathy = value,
            WeightTrait::Energy => self.energy = value,
        }
    }

    pub fn is_valid_value(value: f64) -> bool {
        value.is_finite() && value >= 0.0
    }
}

/// Behavior tuning shared by every agent.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    /// Perception range
    pub vision_radius: f64,
    /// Spatial index cell edge; must exceed half the vision radius
    pub cell_size: f64,
    /// Energy lost per unit dt
    pub energy_decay: f64,
    /// First-order approach factor for steering
    pub steering_smoothing: f64,
    /// Extra speed multiplier when fleeing
    pub flee_boost: f64,
    /// Added to the radius sum for the interaction distance
    pub interaction_margin: f64,
    /// Ticks an agent waits after resolving an interaction
    pub cooldown_ticks: f64,
    /// Per-tick chance an idle agent nudges its heading
    pub idle_nudge_chance: f64,
    /// Max velocity change of an idle nudge per axis
    pub idle_nudge_strength: f64,
    /// Velocity multiplier applied to idle agents each tick
    pub idle_damping: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            vision_radius: 60.0,
            cell_size: 50.0,
            energy_decay: 0.0002,
            steering_smoothing: 0.1,
            flee_boost: 1.5,
            interaction_margin: 2.0,
            cooldown_ticks: 10.0,
            idle_nudge_chance: 0.05,
            idle_nudge_strength: 0.5,
            idle_damping: 0.98,
        }
    }
}

impl AgentParams {
    /// The spatial index needs a positive cell size and a finite,
    /// non-negative vision radius.
    pub fn index_is_valid(&self) -> bool {
        self.cell_size.is_finite()
            && self.cell_size > 0.0
            && self.vision_radius.is_finite()
            && self.vision_radius >= 0.0
    }
}

/// The agent collection. Insertion order is id order and is never changed.
#[derive(Resource, Debug, Clone, Default)]
pub struct Population {
    pub agents: Vec<Agent>,
}

impl Population {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    pub fn active(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
