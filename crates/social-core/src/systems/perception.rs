//! Perception
//!
//! Picks the nearest target to pursue and the nearest threat to flee from
//! among the neighbors an agent can see.

use social_wire::{AgentState, Faction};

use crate::components::agent::Agent;
use crate::components::world::GlobalWeights;

/// How an agent regards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Target,
    Threat,
}

/// Perception rule table keyed by (self faction, other faction).
///
/// Trait comparisons use weighted values; stored traits are never scaled.
pub fn stance_toward(me: &Agent, other: &Agent, weights: &GlobalWeights) -> Option<Stance> {
    use Faction::*;

    match (me.faction(), other.faction()) {
        (Entropics, Luminaries | Inert) => Some(Stance::Target),
        (Entropics, Entropics | Catalysts) => None,

        (Luminaries, Entropics) => Some(Stance::Threat),
        (Luminaries, Inert) => Some(Stance::Target),
        (Luminaries, Luminaries) if other.resource < 1.0 => Some(Stance::Target),
        (Luminaries, Luminaries | Catalysts) => None,

        (Inert, Entropics) => Some(Stance::Threat),
        (Inert, Luminaries | Catalysts | Inert) => None,

        (Catalysts, Entropics) => Some(Stance::Target),
        (Catalysts, Catalysts | Luminaries) => {
            let theirs = other.personality.aggression * weights.aggression;
            let mine = me.personality.aggression * weights.aggression;
            (theirs > mine).then_some(Stance::Threat)
        }
        (Catalysts, Inert) => None,
    }
}

/// Nearest candidates found in one scan, as (population index, distance).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Perception {
    pub target: Option<(usize, f64)>,
    pub threat: Option<(usize, f64)>,
}

impl Perception {
    /// Threat always overrides target.
    pub fn focus(&self) -> Option<(Stance, usize)> {
        match (self.threat, self.target) {
            (Some((idx, _)), _) => Some((Stance::Threat, idx)),
            (None, Some((idx, _))) => Some((Stance::Target, idx)),
            (None, None) => None,
        }
    }

    pub fn state(&self) -> AgentState {
        match self.focus() {
            Some((Stance::Threat, _)) => AgentState::Flee,
            Some((Stance::Target, _)) => AgentState::Hunt,
            None => AgentState::Idle,
        }
    }
}

/// Scan `neighbors` once from the point of view of `agents[me]`.
///
/// Skips self, deactivated agents, and anything beyond `vision_radius`.
/// A candidate is replaced only by a strictly closer one, so ties keep the
/// first found in neighborhood order.
pub fn perceive(
    me: usize,
    neighbors: &[usize],
    agents: &[Agent],
    weights: &GlobalWeights,
    vision_radius: f64,
) -> Perception {
    let viewer = &agents[me];
    let mut perception = Perception::default();

    for &idx in neighbors {
        if idx == me {
            continue;
        }
        let other = &agents[idx];
        if other.is_deactivated {
            continue;
        }
        let dist = viewer.distance_to(other);
        if dist > vision_radius {
            continue;
        }

        let slot = match stance_toward(viewer, other, weights) {
            Some(Stance::Target) => &mut perception.target,
            Some(Stance::Threat) => &mut perception.threat,
            None => continue,
        };
        if slot.map_or(true, |(_, best)| dist < best) {
            *slot = Some((idx, dist));
        }
    }

    perception
}
