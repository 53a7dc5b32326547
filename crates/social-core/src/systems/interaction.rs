//! Faction Interaction Rules
//!
//! Proximity-triggered collisions. Resolution is directional: only the
//! initiating agent's rule runs, and the mirror interaction (if any) happens
//! on the other agent's own turn.

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use social_wire::Faction;

use crate::components::agent::{Agent, InertCause};
use crate::components::personality::APEX_PREDATOR;
use crate::components::world::GlobalWeights;

use super::step::StepContext;

/// Rule magnitudes
pub mod rule_constants {
    /// Resource an Entropics drain moves from victim to drainer
    pub const ENTROPIC_DRAIN: f64 = 0.1;
    /// Energy an Entropics drainer regains
    pub const ENTROPIC_ENERGY_GAIN: f64 = 0.1;
    /// Resource a Luminaries repel removes from the Entropics agent
    pub const REPEL_DRAIN: f64 = 0.05;
    /// Resource a Luminaries repel grants the Luminaries agent
    pub const REPEL_GAIN: f64 = 0.02;
    /// Resource a Luminaries agent shares per interaction
    pub const SHARE_AMOUNT: f64 = 0.05;
    /// A Luminaries agent only shares above this resource
    pub const SHARE_MIN_RESOURCE: f64 = 0.2;
    /// Luminaries peers at or above this resource are not helped
    pub const SHARE_PEER_CAP: f64 = 1.0;
    /// An Inert recipient above this resource becomes Luminaries
    pub const ENLIGHTEN_THRESHOLD: f64 = 0.5;
    /// Resource a Catalysts disruption removes
    pub const DISRUPT_DRAIN: f64 = 0.15;
    /// Resource a Catalysts disruption grants (half the drain)
    pub const DISRUPT_GAIN: f64 = 0.075;
    pub const DISRUPT_ENERGY_GAIN: f64 = 0.05;
    /// Disrupted Entropics at or below this resource may collapse to Inert
    pub const DISRUPT_COLLAPSE_THRESHOLD: f64 = 0.1;
    pub const DISRUPT_COLLAPSE_CHANCE: f64 = 0.3;
    /// Resource moved either way by a Catalysts/Luminaries exchange
    pub const EXCHANGE_AMOUNT: f64 = 0.03;
    pub const EXCHANGE_MIN_RESOURCE: f64 = 0.1;
    /// Chance a Catalysts agent recruits an Inert one
    pub const SEED_CHANCE: f64 = 0.1;
    pub const SEED_MIN_RESOURCE: f64 = 0.3;
}

use rule_constants::*;

/// Collision rule for an (actor, other) faction pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionRule {
    /// Pair has no rule; cooldown still applies
    NoOp,
    /// Entropics vs Luminaries/Inert
    EntropicDrain,
    /// Luminaries vs Entropics
    LuminaryRepel,
    /// Luminaries vs Inert or poor Luminaries
    LuminaryShare,
    /// Catalysts vs Entropics
    CatalystDisrupt,
    /// Catalysts vs Luminaries
    CatalystExchange,
    /// Catalysts vs Inert
    CatalystSeed,
}

impl fmt::Display for InteractionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionRule::NoOp => "no_op",
            InteractionRule::EntropicDrain => "entropic_drain",
            InteractionRule::LuminaryRepel => "luminary_repel",
            InteractionRule::LuminaryShare => "luminary_share",
            InteractionRule::CatalystDisrupt => "catalyst_disrupt",
            InteractionRule::CatalystExchange => "catalyst_exchange",
            InteractionRule::CatalystSeed => "catalyst_seed",
        };
        f.write_str(name)
    }
}

use InteractionRule::*;

/// Rows: actor faction. Columns: other faction. Both in `Faction::ALL` order
/// (Entropics, Luminaries, Catalysts, Inert).
pub const RULE_TABLE: [[InteractionRule; 4]; 4] = [
    [NoOp, EntropicDrain, NoOp, EntropicDrain],
    [LuminaryRepel, LuminaryShare, NoOp, LuminaryShare],
    [CatalystDisrupt, CatalystExchange, NoOp, CatalystSeed],
    [NoOp, NoOp, NoOp, NoOp],
];

pub fn rule_for(actor: Faction, other: Faction) -> InteractionRule {
    RULE_TABLE[actor.index()][other.index()]
}

/// Faction change or kill caused by a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    ToEntropics,
    ToLuminaries,
    ToCatalysts,
    ToInert,
    Deactivated,
}

/// Record of one resolved collision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub actor: u32,
    pub other: u32,
    pub rule: InteractionRule,
    /// False when the rule's gate did not pass
    pub applied: bool,
    pub conversion: Option<Conversion>,
}

/// Collisions resolved during the current tick, in resolution order
#[derive(Resource, Debug, Default)]
pub struct TickInteractions {
    pub outcomes: Vec<InteractionOutcome>,
}

impl TickInteractions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }

    pub fn record(&mut self, outcome: InteractionOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn conversions(&self) -> impl Iterator<Item = &InteractionOutcome> {
        self.outcomes.iter().filter(|o| o.conversion.is_some())
    }
}

/// Two distinct mutable borrows into the population.
fn pair_mut(agents: &mut [Agent], a: usize, b: usize) -> (&mut Agent, &mut Agent) {
    assert_ne!(a, b, "an agent cannot collide with itself");
    if a < b {
        let (lo, hi) = agents.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = agents.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

/// Resolve at most one collision for `agents[me]`.
///
/// No-op while cooling down. Otherwise the first neighbor in scan order (not
/// the nearest) closer than the radius sum plus margin is the partner.
pub fn process_proximity<R: Rng + ?Sized>(
    me: usize,
    neighbors: &[usize],
    agents: &mut [Agent],
    ctx: &StepContext<'_>,
    rng: &mut R,
) -> Option<InteractionOutcome> {
    if !agents[me].is_ready() {
        return None;
    }

    let partner = {
        let actor = &agents[me];
        neighbors.iter().copied().find(|&idx| {
            if idx == me {
                return false;
            }
            let other = &agents[idx];
            !other.is_deactivated
                && actor.distance_to(other)
                    < actor.radius + other.radius + ctx.params.interaction_margin
        })?
    };

    let (actor, other) = pair_mut(agents, me, partner);
    actor.cooldown = ctx.params.cooldown_ticks;

    let rule = rule_for(actor.faction(), other.faction());
    let (applied, conversion) = resolve(rule, actor, other, ctx.weights, rng);

    actor.refresh_radius();
    other.refresh_radius();

    if let Some(conversion) = conversion {
        debug!(actor = actor.id, other = other.id, %rule, ?conversion, "Collision converted agent");
    }

    Some(InteractionOutcome {
        actor: actor.id,
        other: other.id,
        rule,
        applied,
        conversion,
    })
}

/// Apply one rule. Returns whether its gate passed and any conversion.
pub fn resolve<R: Rng + ?Sized>(
    rule: InteractionRule,
    actor: &mut Agent,
    other: &mut Agent,
    weights: &GlobalWeights,
    rng: &mut R,
) -> (bool, Option<Conversion>) {
    match rule {
        NoOp => (false, None),
        EntropicDrain => entropic_drain(actor, other, weights),
        LuminaryRepel => luminary_repel(actor, other, weights),
        LuminaryShare => luminary_share(actor, other),
        CatalystDisrupt => catalyst_disrupt(actor, other, rng),
        CatalystExchange => catalyst_exchange(actor, other, rng),
        CatalystSeed => catalyst_seed(actor, other, rng),
    }
}

fn entropic_drain(
    actor: &mut Agent,
    other: &mut Agent,
    weights: &GlobalWeights,
) -> (bool, Option<Conversion>) {
    let force = actor.personality.aggression * weights.aggression;
    let resistance = other.personality.empathy * weights.empathy;
    if force <= resistance {
        return (false, None);
    }

    other.resource -= ENTROPIC_DRAIN;
    actor.resource += ENTROPIC_DRAIN;
    actor.energy = (actor.energy + ENTROPIC_ENERGY_GAIN).min(1.0);

    if other.resource > 0.0 {
        return (true, None);
    }
    if actor.personality.name == APEX_PREDATOR {
        other.deactivate();
        (true, Some(Conversion::Deactivated))
    } else {
        other.convert_to_entropic(&actor.personality.color);
        (true, Some(Conversion::ToEntropics))
    }
}

fn luminary_repel(
    actor: &mut Agent,
    other: &mut Agent,
    weights: &GlobalWeights,
) -> (bool, Option<Conversion>) {
    let resolve = actor.personality.empathy * weights.empathy;
    let force = other.personality.aggression * weights.aggression;
    if resolve <= force {
        return (false, None);
    }
    other.resource -= REPEL_DRAIN;
    actor.resource += REPEL_GAIN;
    (true, None)
}

fn luminary_share(actor: &mut Agent, other: &mut Agent) -> (bool, Option<Conversion>) {
    let recipient_is_inert = other.faction() == Faction::Inert;
    if !recipient_is_inert && other.resource >= SHARE_PEER_CAP {
        return (false, None);
    }
    if actor.resource <= SHARE_MIN_RESOURCE {
        return (false, None);
    }

    actor.resource -= SHARE_AMOUNT;
    other.resource += SHARE_AMOUNT;

    if recipient_is_inert && other.resource > ENLIGHTEN_THRESHOLD {
        other.convert_to_luminary(&actor.personality.color);
        return (true, Some(Conversion::ToLuminaries));
    }
    (true, None)
}

fn catalyst_disrupt<R: Rng + ?Sized>(
    actor: &mut Agent,
    other: &mut Agent,
    rng: &mut R,
) -> (bool, Option<Conversion>) {
    other.resource -= DISRUPT_DRAIN;
    actor.resource += DISRUPT_GAIN;
    actor.energy = (actor.energy + DISRUPT_ENERGY_GAIN).min(1.0);

    if other.resource <= DISRUPT_COLLAPSE_THRESHOLD && rng.gen::<f64>() < DISRUPT_COLLAPSE_CHANCE {
        other.convert_to_inert(InertCause::Disruption);
        return (true, Some(Conversion::ToInert));
    }
    (true, None)
}

fn catalyst_exchange<R: Rng + ?Sized>(
    actor: &mut Agent,
    other: &mut Agent,
    rng: &mut R,
) -> (bool, Option<Conversion>) {
    if rng.gen::<f64>() < 0.5 {
        if actor.resource <= EXCHANGE_MIN_RESOURCE {
            return (false, None);
        }
        actor.resource -= EXCHANGE_AMOUNT;
        other.resource += EXCHANGE_AMOUNT;
    } else {
        other.resource -= EXCHANGE_AMOUNT;
        actor.resource += EXCHANGE_AMOUNT;
    }
    (true, None)
}

fn catalyst_seed<R: Rng + ?Sized>(
    actor: &mut Agent,
    other: &mut Agent,
    rng: &mut R,
) -> (bool, Option<Conversion>) {
    if !(rng.gen::<f64>() < SEED_CHANCE && other.resource > SEED_MIN_RESOURCE) {
        return (false, None);
    }
    if rng.gen::<f64>() < 0.5 {
        other.convert_to_catalyst(&actor.personality.color);
        (true, Some(Conversion::ToCatalysts))
    } else {
        other.convert_to_luminary(&actor.personality.color);
        (true, Some(Conversion::ToLuminaries))
    }
}
