//! Agent Step
//!
//! One agent's turn within a tick: energy decay, perception, steering,
//! proximity interaction, integration and wrap.

use bevy_ecs::prelude::*;
use rand::Rng;
use social_wire::AgentState;

use crate::components::agent::{Agent, InertCause};
use crate::components::world::{AgentParams, GlobalWeights, Population, WorldBounds};
use crate::SimRng;

use super::clock::WorldClock;
use super::interaction::{process_proximity, InteractionOutcome, TickInteractions};
use super::perception::{perceive, Stance};
use super::spatial::SpatialIndex;
use super::steering::{idle_drift, steer, Heading};

/// Read-only world context shared by every agent during a tick.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub weights: &'a GlobalWeights,
    pub params: &'a AgentParams,
    pub bounds: &'a WorldBounds,
    pub dt: f64,
}

/// Advance `agents[me]` by one tick.
///
/// Agents earlier in the population have already moved this tick; their
/// updated state is what this agent sees.
pub fn update_agent<R: Rng + ?Sized>(
    me: usize,
    agents: &mut [Agent],
    index: &SpatialIndex,
    ctx: &StepContext<'_>,
    rng: &mut R,
) -> Option<InteractionOutcome> {
    if agents[me].is_deactivated {
        return None;
    }

    {
        let agent = &mut agents[me];
        agent.energy -= ctx.params.energy_decay * ctx.dt;
        if agent.energy <= 0.0 {
            agent.convert_to_inert(InertCause::Exhaustion);
        }
    }

    let outcome = think(me, agents, index, ctx, rng);

    let agent = &mut agents[me];
    let (x, y) = ctx
        .bounds
        .wrap(agent.x + agent.vx * ctx.dt, agent.y + agent.vy * ctx.dt);
    agent.x = x;
    agent.y = y;

    if agent.cooldown > 0.0 {
        agent.cooldown -= ctx.dt;
    }

    outcome
}

fn think<R: Rng + ?Sized>(
    me: usize,
    agents: &mut [Agent],
    index: &SpatialIndex,
    ctx: &StepContext<'_>,
    rng: &mut R,
) -> Option<InteractionOutcome> {
    let neighbors = index.query_neighborhood(agents[me].x, agents[me].y);
    if neighbors.is_empty() {
        agents[me].state = AgentState::Idle;
        return None;
    }

    let perception = perceive(
        me,
        &neighbors,
        agents,
        ctx.weights,
        ctx.params.vision_radius,
    );
    let focus = perception
        .focus()
        .map(|(stance, idx)| (stance, (agents[idx].x, agents[idx].y)));

    let agent = &mut agents[me];
    agent.state = perception.state();
    match focus {
        Some((Stance::Threat, point)) => {
            steer(agent, point, Heading::Away, ctx.dt, ctx.weights, ctx.params)
        }
        Some((Stance::Target, point)) => {
            steer(agent, point, Heading::Toward, ctx.dt, ctx.weights, ctx.params)
        }
        None => idle_drift(agent, ctx.params, rng),
    }

    process_proximity(me, &neighbors, agents, ctx, rng)
}

/// System: update every agent once, in id order
#[allow(clippy::too_many_arguments)]
pub fn advance_agents(
    mut population: ResMut<Population>,
    index: Res<SpatialIndex>,
    weights: Res<GlobalWeights>,
    params: Res<AgentParams>,
    bounds: Res<WorldBounds>,
    clock: Res<WorldClock>,
    mut rng: ResMut<SimRng>,
    mut interactions: ResMut<TickInteractions>,
) {
    let ctx = StepContext {
        weights: &weights,
        params: &params,
        bounds: &bounds,
        dt: clock.tick_dt,
    };

    interactions.clear();
    let agents = &mut population.agents;
    for idx in 0..agents.len() {
        if let Some(outcome) = update_agent(idx, agents, &index, &ctx, &mut rng.0) {
            interactions.record(outcome);
        }
    }
}
