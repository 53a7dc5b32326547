//! Steering
//!
//! Exponential-smoothing approach toward a desired velocity, plus idle drift.

use rand::Rng;

use crate::components::agent::Agent;
use crate::components::world::{AgentParams, GlobalWeights};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Toward,
    Away,
}

/// Cruise speed from the energy trait; a zero trait falls back to 0.5.
pub fn cruise_speed(agent: &Agent, weights: &GlobalWeights) -> f64 {
    let trait_value = if agent.personality.energy_trait == 0.0 {
        0.5
    } else {
        agent.personality.energy_trait
    };
    trait_value * 2.0 * weights.energy
}

/// Move velocity a fraction of the way toward the desired velocity.
///
/// Exact overlap with the point is a no-op.
pub fn steer(
    agent: &mut Agent,
    point: (f64, f64),
    heading: Heading,
    dt: f64,
    weights: &GlobalWeights,
    params: &AgentParams,
) {
    let dx = point.0 - agent.x;
    let dy = point.1 - agent.y;
    let dist = dx.hypot(dy);
    if dist == 0.0 {
        return;
    }

    let mut speed = cruise_speed(agent, weights);
    let sign = match heading {
        Heading::Toward => 1.0,
        Heading::Away => {
            speed *= params.flee_boost;
            -1.0
        }
    };
    let desired_x = sign * dx / dist * speed;
    let desired_y = sign * dy / dist * speed;

    let k = params.steering_smoothing * dt;
    agent.vx += (desired_x - agent.vx) * k;
    agent.vy += (desired_y - agent.vy) * k;
}

/// Occasional random heading nudge, then damping.
pub fn idle_drift<R: Rng + ?Sized>(agent: &mut Agent, params: &AgentParams, rng: &mut R) {
    if rng.gen::<f64>() < params.idle_nudge_chance {
        agent.vx += (rng.gen::<f64>() - 0.5) * 2.0 * params.idle_nudge_strength;
        agent.vy += (rng.gen::<f64>() - 0.5) * 2.0 * params.idle_nudge_strength;
    }
    agent.vx *= params.idle_damping;
    agent.vy *= params.idle_damping;
}
