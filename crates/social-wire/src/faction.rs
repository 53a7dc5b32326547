//! Faction and Behavior State
//!
//! The closed set of factions and the per-tick perception outcome.
//!
//! # Example
//!
//! ```
//! use social_wire::Faction;
//!
//! let f: Faction = "Luminaries".parse().unwrap();
//! assert_eq!(f, Faction::Luminaries);
//! assert_eq!(f.to_string(), "Luminaries");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the four mutually exclusive behavioral categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    Entropics,
    Luminaries,
    Catalysts,
    Inert,
}

impl Faction {
    /// All factions in table order.
    pub const ALL: [Faction; 4] = [
        Faction::Entropics,
        Faction::Luminaries,
        Faction::Catalysts,
        Faction::Inert,
    ];

    /// Row/column of this faction in 4x4 lookup tables.
    pub const fn index(self) -> usize {
        match self {
            Faction::Entropics => 0,
            Faction::Luminaries => 1,
            Faction::Catalysts => 2,
            Faction::Inert => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Faction::Entropics => "Entropics",
            Faction::Luminaries => "Luminaries",
            Faction::Catalysts => "Catalysts",
            Faction::Inert => "Inert",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known faction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown faction: {0:?}")]
pub struct ParseFactionError(pub String);

impl FromStr for Faction {
    type Err = ParseFactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Faction::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFactionError(s.to_string()))
    }
}

/// Last-resolved perception outcome for an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentState {
    #[default]
    Idle,
    Hunt,
    Flee,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Idle => write!(f, "IDLE"),
            AgentState::Hunt => write!(f, "HUNT"),
            AgentState::Flee => write!(f, "FLEE"),
        }
    }
}
