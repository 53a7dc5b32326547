//! Simulation Host
//!
//! Owns the ECS world and its schedules and exposes the engine's operations:
//! reset, step, run control, weights, glitch, observer, snapshots and remote
//! sync.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use social_wire::{AgentSnapshot, AgentState, MetricsSnapshot};

use crate::components::agent::{Agent, Personality};
use crate::components::personality::PersonalityCatalog;
use crate::components::world::{AgentParams, GlobalWeights, Population, WeightTrait, WorldBounds};
use crate::config::{ConfigError, SimConfig};
use crate::setup::spawn_population;
use crate::systems::{
    advance_agents, advance_clock, compute_metrics, rebuild_spatial_index, update_metrics,
    ClockError, ClockState, InteractionOutcome, SpatialIndex, TickInteractions, WorldClock,
    WorldMetrics,
};
use crate::SimRng;

/// Chance per active agent of being teleported by a glitch
pub const GLITCH_CHANCE: f64 = 0.2;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error("invalid world bounds {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },
    #[error("invalid {weight} weight: {value}")]
    InvalidWeight { weight: WeightTrait, value: f64 },
    #[error("invalid speed: {0}")]
    InvalidSpeed(f64),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub struct Simulation {
    world: World,
    tick_schedule: Schedule,
    metrics_schedule: Schedule,
    seed: u64,
    population_size: usize,
}

impl Simulation {
    /// Build the world and spawn the initial population.
    pub fn new(config: &SimConfig, catalog: PersonalityCatalog) -> Result<Self, SimError> {
        config.validate()?;

        let mut world = World::new();
        world.insert_resource(config.bounds());
        world.insert_resource(config.weights);
        world.insert_resource(config.agent.clone());
        world.insert_resource(catalog);
        world.insert_resource(Population::default());
        world.insert_resource(SpatialIndex::new(
            config.agent.cell_size,
            config.agent.vision_radius,
        ));
        world.insert_resource(WorldClock::new(config.world.speed));
        world.insert_resource(SimRng(SmallRng::seed_from_u64(config.world.seed)));
        world.insert_resource(TickInteractions::new());
        world.insert_resource(WorldMetrics::default());

        let mut tick_schedule = Schedule::default();
        tick_schedule.add_systems((rebuild_spatial_index, advance_clock, advance_agents).chain());

        let mut metrics_schedule = Schedule::default();
        metrics_schedule.add_systems(update_metrics);

        let mut sim = Self {
            world,
            tick_schedule,
            metrics_schedule,
            seed: config.world.seed,
            population_size: config.world.population,
        };
        sim.reset(config.bounds())?;
        Ok(sim)
    }

    /// Reseed, respawn the population within `bounds` and rewind the clock.
    ///
    /// Two resets with the same bounds produce identical populations.
    pub fn reset(&mut self, bounds: WorldBounds) -> Result<(), SimError> {
        if !bounds.is_valid() {
            return Err(SimError::InvalidBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }

        let count = self.population_size;
        self.world.insert_resource(bounds);
        self.world.insert_resource(SimRng(SmallRng::seed_from_u64(self.seed)));
        let agents = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            let catalog = world.resource::<PersonalityCatalog>();
            spawn_population(catalog, &bounds, count, &mut rng.0)
        });
        self.world.insert_resource(Population::new(agents));
        self.world.resource_mut::<WorldClock>().rewind();
        self.world.resource_mut::<TickInteractions>().clear();
        self.metrics_schedule.run(&mut self.world);

        info!(
            width = bounds.width,
            height = bounds.height,
            agents = count,
            seed = self.seed,
            "World reset"
        );
        Ok(())
    }

    /// One drive step. Agents advance by `dt * speed` only while running;
    /// metrics are refreshed either way. Returns whether a tick ran.
    pub fn step(&mut self, dt: f64) -> Result<bool, SimError> {
        let running = {
            let mut clock = self.world.resource_mut::<WorldClock>();
            clock.begin_tick(dt)?;
            clock.is_running()
        };
        if running {
            self.tick_schedule.run(&mut self.world);
        }
        self.world.resource_mut::<WorldClock>().end_tick();
        self.metrics_schedule.run(&mut self.world);
        Ok(running)
    }

    pub fn pause(&mut self) {
        self.world.resource_mut::<WorldClock>().pause();
    }

    pub fn resume(&mut self) {
        self.world.resource_mut::<WorldClock>().resume();
    }

    pub fn toggle(&mut self) -> ClockState {
        self.world.resource_mut::<WorldClock>().toggle()
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), SimError> {
        if !GlobalWeights::is_valid_value(speed) {
            return Err(SimError::InvalidSpeed(speed));
        }
        self.world.resource_mut::<WorldClock>().speed = speed;
        Ok(())
    }

    pub fn set_global_weight(&mut self, weight: WeightTrait, value: f64) -> Result<(), SimError> {
        if !GlobalWeights::is_valid_value(value) {
            return Err(SimError::InvalidWeight { weight, value });
        }
        self.world.resource_mut::<GlobalWeights>().set(weight, value);
        debug!(%weight, value, "Global weight changed");
        Ok(())
    }

    /// Teleport each active agent with probability `GLITCH_CHANCE`.
    /// Returns how many moved.
    pub fn trigger_glitch(&mut self) -> usize {
        let bounds = *self.world.resource::<WorldBounds>();
        let moved = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            let mut population = world.resource_mut::<Population>();
            let mut moved = 0;
            for agent in population.agents.iter_mut().filter(|a| a.is_active()) {
                if rng.0.gen::<f64>() < GLITCH_CHANCE {
                    let (x, y) = bounds.wrap(
                        rng.0.gen::<f64>() * bounds.width,
                        rng.0.gen::<f64>() * bounds.height,
                    );
                    agent.x = x;
                    agent.y = y;
                    moved += 1;
                }
            }
            moved
        });
        info!(moved, "Glitch triggered");
        moved
    }

    /// Freeze all momentum: zero velocity and IDLE for every active agent.
    pub fn trigger_observer(&mut self) {
        let mut population = self.world.resource_mut::<Population>();
        for agent in population.agents.iter_mut().filter(|a| a.is_active()) {
            agent.vx = 0.0;
            agent.vy = 0.0;
            agent.state = AgentState::Idle;
        }
        info!("Observer effect applied");
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.world.resource::<WorldMetrics>().latest.clone()
    }

    /// Active agents in id order.
    pub fn agent_snapshot(&self) -> Vec<AgentSnapshot> {
        self.population()
            .iter()
            .filter(|a| a.is_active())
            .map(Agent::snapshot)
            .collect()
    }

    /// Apply one remotely computed tick, snapshot `i` to agent `i`.
    ///
    /// A faction change reassigns the first catalog archetype of the new
    /// faction. Remote state can deactivate an agent but never revive or
    /// move one.
    pub fn apply_remote_step(&mut self, snapshots: &[AgentSnapshot]) {
        self.world.resource_scope(|world, mut population: Mut<Population>| {
            let catalog = world.resource::<PersonalityCatalog>();
            if snapshots.len() != population.agents.len() {
                warn!(
                    remote = snapshots.len(),
                    local = population.agents.len(),
                    "Remote snapshot count differs from local population"
                );
            }
            for (agent, snap) in population.agents.iter_mut().zip(snapshots) {
                apply_snapshot(agent, snap, catalog);
            }
        });
        self.world.resource_mut::<WorldClock>().tick += 1;
        self.world.resource_mut::<TickInteractions>().clear();
        self.metrics_schedule.run(&mut self.world);
    }

    pub fn population(&self) -> &[Agent] {
        &self.world.resource::<Population>().agents
    }

    pub fn clock(&self) -> &WorldClock {
        self.world.resource::<WorldClock>()
    }

    pub fn tick(&self) -> u64 {
        self.clock().tick
    }

    pub fn is_running(&self) -> bool {
        self.clock().is_running()
    }

    pub fn bounds(&self) -> WorldBounds {
        *self.world.resource::<WorldBounds>()
    }

    pub fn weights(&self) -> GlobalWeights {
        *self.world.resource::<GlobalWeights>()
    }

    pub fn params(&self) -> &AgentParams {
        self.world.resource::<AgentParams>()
    }

    pub fn catalog(&self) -> &PersonalityCatalog {
        self.world.resource::<PersonalityCatalog>()
    }

    /// Collisions resolved during the last tick
    pub fn interactions(&self) -> &[InteractionOutcome] {
        &self.world.resource::<TickInteractions>().outcomes
    }

    /// Metrics recomputed from the population right now, bypassing the
    /// cached snapshot.
    pub fn fresh_metrics(&self) -> MetricsSnapshot {
        compute_metrics(self.population(), self.tick())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

/// Deactivated agents are terminal and ignore remote state.
fn apply_snapshot(agent: &mut Agent, snap: &AgentSnapshot, catalog: &PersonalityCatalog) {
    if agent.is_deactivated {
        return;
    }
    agent.x = snap.x;
    agent.y = snap.y;
    agent.resource = snap.resource;
    agent.energy = snap.energy;
    agent.state = snap.state;
    agent.refresh_radius();

    if agent.faction() != snap.faction {
        match catalog.first_of(snap.faction) {
            Some(record) => agent.personality = Personality::from(record),
            None => agent.personality.faction = snap.faction,
        }
    }
    if snap.is_deactivated {
        agent.deactivate();
    }
}
