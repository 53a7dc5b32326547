//! Population Spawning
//!
//! Fills the world with agents drawn uniformly from the catalog and placed
//! uniformly within bounds.

use rand::Rng;
use std::collections::BTreeMap;

use social_wire::Faction;

use crate::components::agent::Agent;
use crate::components::personality::PersonalityCatalog;
use crate::components::world::WorldBounds;

/// Spawn `count` agents with ids `0..count`.
pub fn spawn_population<R: Rng + ?Sized>(
    catalog: &PersonalityCatalog,
    bounds: &WorldBounds,
    count: usize,
    rng: &mut R,
) -> Vec<Agent> {
    (0..count)
        .map(|i| {
            let record = catalog.pick(rng);
            let x = rng.gen::<f64>() * bounds.width;
            let y = rng.gen::<f64>() * bounds.height;
            let (x, y) = bounds.wrap(x, y);
            Agent::new(i as u32, record, x, y)
        })
        .collect()
}

/// Summary of spawned agents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnSummary {
    pub total_agents: usize,
    pub by_faction: BTreeMap<String, usize>,
}

pub fn spawn_summary(agents: &[Agent]) -> SpawnSummary {
    let mut by_faction = BTreeMap::new();
    for faction in Faction::ALL {
        by_faction.insert(faction.to_string(), 0);
    }
    for agent in agents {
        *by_faction.entry(agent.faction().to_string()).or_insert(0) += 1;
    }
    SpawnSummary {
        total_agents: agents.len(),
        by_faction,
    }
}
