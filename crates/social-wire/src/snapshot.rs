//! Agent Snapshot
//!
//! Per-agent state exchanged with an external physics backend.
//!
//! A backend's step response is an ordered sequence of these, one per agent
//! index. Consumers apply them positionally. Extra fields a backend sends
//! (personality id, display name) are ignored on decode.

use serde::{Deserialize, Serialize};

use crate::{AgentState, Faction};

/// Wire form of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    #[serde(default)]
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub resource: f64,
    pub energy: f64,
    pub state: AgentState,
    pub faction: Faction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_deactivated: bool,
}

impl AgentSnapshot {
    /// Parse a backend step response body.
    pub fn parse_sequence(json: &str) -> Result<Vec<AgentSnapshot>, serde_json::Error> {
        serde_json::from_str(json)
    }
}
