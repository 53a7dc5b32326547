//! Operator Controls
//!
//! Commands an operator issues between ticks, and scripts that schedule them
//! by tick for headless runs.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::components::world::WeightTrait;

/// A single operator command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    Pause,
    Resume,
    Toggle,
    /// Change one global weight multiplier
    SetWeight {
        #[serde(rename = "trait")]
        weight: WeightTrait,
        value: f64,
    },
    /// Change the dt multiplier
    SetSpeed { value: f64 },
    /// Teleport a random fifth of the population
    Glitch,
    /// Freeze all momentum
    Observer,
    /// Respawn the population within new bounds
    Reset { width: f64, height: f64 },
}

/// A command due when the clock reaches `at_tick`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub at_tick: u64,
    pub command: ControlCommand,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered list of scheduled commands, stored as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlScript {
    pub entries: Vec<ScheduledCommand>,
}

impl ControlScript {
    pub fn new(entries: Vec<ScheduledCommand>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Commands scheduled for `tick`, in script order.
    pub fn due_at(&self, tick: u64) -> impl Iterator<Item = &ControlCommand> {
        self.entries
            .iter()
            .filter(move |e| e.at_tick == tick)
            .map(|e| &e.command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
