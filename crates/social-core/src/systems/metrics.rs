//! World Metrics
//!
//! Per-faction counts, mean energy, entropy and the phase label. Recomputed
//! after every drive step, running or paused.

use bevy_ecs::prelude::*;
use social_wire::{Faction, FactionCounts, MetricsSnapshot, Phase};

use crate::components::agent::Agent;
use crate::components::world::Population;

use super::clock::WorldClock;

pub mod phase_constants {
    /// Every tick before this is Genesis
    pub const GENESIS_TICKS: u64 = 500;
    /// Active population below this is Collapse
    pub const COLLAPSE_POPULATION: usize = 100;
    /// A faction above this share holds Dominion
    pub const DOMINION_SHARE: f64 = 0.5;
    /// Entropics above this share is Chaos
    pub const CHAOS_SHARE: f64 = 0.4;
    /// Entropy reported when the computation is not a number
    pub const NEUTRAL_ENTROPY: f64 = 0.5;
}

use phase_constants::*;

/// Latest metrics snapshot
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldMetrics {
    pub latest: MetricsSnapshot,
}

pub fn classify_phase(tick: u64, counts: &FactionCounts) -> Phase {
    if tick < GENESIS_TICKS {
        return Phase::Genesis;
    }
    if counts.total() < COLLAPSE_POPULATION {
        return Phase::Collapse;
    }
    if let Some(faction) = Faction::ALL
        .into_iter()
        .find(|&f| counts.share(f) > DOMINION_SHARE)
    {
        return Phase::Dominion(faction);
    }
    if counts.share(Faction::Entropics) > CHAOS_SHARE {
        return Phase::Chaos;
    }
    Phase::Stable
}

/// Aggregate over active agents.
pub fn compute_metrics(agents: &[Agent], tick: u64) -> MetricsSnapshot {
    let mut counts = FactionCounts::default();
    let mut energy_sum = 0.0;
    for agent in agents.iter().filter(|a| a.is_active()) {
        counts.increment(agent.faction());
        energy_sum += agent.energy;
    }

    let population = counts.total();
    let (mean_energy, entropy) = if population == 0 {
        (0.0, 1.0)
    } else {
        let mean = energy_sum / population as f64;
        let entropy = 1.0 - mean;
        (
            mean,
            if entropy.is_nan() { NEUTRAL_ENTROPY } else { entropy },
        )
    };

    MetricsSnapshot {
        tick,
        population,
        counts,
        mean_energy,
        entropy,
        phase: classify_phase(tick, &counts),
    }
}

/// System: refresh `WorldMetrics`
pub fn update_metrics(
    mut metrics: ResMut<WorldMetrics>,
    population: Res<Population>,
    clock: Res<WorldClock>,
) {
    metrics.latest = compute_metrics(&population.agents, clock.tick);
}
