//! Metrics Snapshot
//!
//! Aggregate world metrics derived after every drive step.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Faction;

/// Active agent counts per faction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionCounts {
    pub entropics: usize,
    pub luminaries: usize,
    pub catalysts: usize,
    pub inert: usize,
}

impl FactionCounts {
    pub fn get(&self, faction: Faction) -> usize {
        match faction {
            Faction::Entropics => self.entropics,
            Faction::Luminaries => self.luminaries,
            Faction::Catalysts => self.catalysts,
            Faction::Inert => self.inert,
        }
    }

    pub fn increment(&mut self, faction: Faction) {
        match faction {
            Faction::Entropics => self.entropics += 1,
            Faction::Luminaries => self.luminaries += 1,
            Faction::Catalysts => self.catalysts += 1,
            Faction::Inert => self.inert += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.entropics + self.luminaries + self.catalysts + self.inert
    }

    /// Share of `faction` in the counted population, 0.0 when empty.
    pub fn share(&self, faction: Faction) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.get(faction) as f64 / total as f64
        }
    }
}

/// Coarse label summarizing world state.
///
/// Informational only; nothing in the rule set reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Genesis,
    Collapse,
    Dominion(Faction),
    Chaos,
    Stable,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Genesis => write!(f, "Genesis"),
            Phase::Collapse => write!(f, "Collapse"),
            Phase::Dominion(faction) => write!(f, "Dominion ({})", faction),
            Phase::Chaos => write!(f, "Chaos"),
            Phase::Stable => write!(f, "Stable"),
        }
    }
}

/// Snapshot of aggregate metrics at a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    pub population: usize,
    pub counts: FactionCounts,
    pub mean_energy: f64,
    /// `1 - mean_energy`; 1.0 for an empty world.
    pub entropy: f64,
    pub phase: Phase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_increment_and_share() {
        let mut counts = FactionCounts::default();
        counts.increment(Faction::Entropics);
        counts.increment(Faction::Entropics);
        counts.increment(Faction::Inert);
        counts.increment(Faction::Luminaries);

        assert_eq!(counts.total(), 4);
        assert_eq!(counts.get(Faction::Entropics), 2);
        assert_eq!(counts.share(Faction::Entropics), 0.5);
        assert_eq!(counts.share(Faction::Catalysts), 0.0);
        assert_eq!(FactionCounts::default().share(Faction::Inert), 0.0);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Genesis.to_string(), "Genesis");
        assert_eq!(
            Phase::Dominion(Faction::Luminaries).to_string(),
            "Dominion (Luminaries)"
        );
    }

    #[test]
    fn test_metrics_json_shape() {
        let metrics = MetricsSnapshot {
            tick: 600,
            population: 2,
            counts: FactionCounts {
                entropics: 2,
                ..Default::default()
            },
            mean_energy: 0.75,
            entropy: 0.25,
            phase: Phase::Dominion(Faction::Entropics),
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["phase"]["Dominion"], "Entropics");
        assert_eq!(json["counts"]["entropics"], 2);

        let parsed: MetricsSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, metrics);
    }
}
