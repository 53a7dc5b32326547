//! Spatial Index
//!
//! Uniform grid bucketing of agents by cell, rebuilt every tick. Buckets hold
//! indices into the population, never the agents themselves.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::components::agent::Agent;
use crate::components::world::{AgentParams, Population};

type CellKey = (i64, i64);

/// Resource mapping cell coordinates to agent indices
#[derive(Resource, Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    vision_radius: f64,
    /// Rings of cells scanned around the query cell
    reach: i64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(50.0, 60.0)
    }
}

/// Rings needed so the block spans `vision_radius` past any point of the
/// center cell. At least one.
pub fn reach_for(cell_size: f64, vision_radius: f64) -> i64 {
    ((vision_radius / cell_size).ceil() as i64).max(1)
}

impl SpatialIndex {
    pub fn new(cell_size: f64, vision_radius: f64) -> Self {
        Self {
            cell_size,
            vision_radius,
            reach: reach_for(cell_size, vision_radius),
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn reach(&self) -> i64 {
        self.reach
    }

    pub fn cell_of(&self, x: f64, y: f64) -> CellKey {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Repopulate from scratch. Deactivated agents are left out.
    ///
    /// Agents are pushed in index order, so every bucket is sorted by id.
    pub fn build(&mut self, agents: &[Agent]) {
        self.clear();
        for (idx, agent) in agents.iter().enumerate() {
            if agent.is_deactivated {
                continue;
            }
            let key = self.cell_of(agent.x, agent.y);
            self.cells.entry(key).or_default().push(idx);
        }
    }

    /// Union of the `(2 * reach + 1)` square cell block around the cell
    /// holding `(x, y)`; 5x5 for vision 60 over 50-unit cells.
    ///
    /// Columns outer, rows inner, agents in id order within a cell. Callers
    /// filter by exact distance; every agent within the vision radius of
    /// `(x, y)` is included.
    pub fn query_neighborhood(&self, x: f64, y: f64) -> Vec<usize> {
        let (cx, cy) = self.cell_of(x, y);
        let r = self.reach;
        let mut result = Vec::new();
        for gx in cx - r..=cx + r {
            for gy in cy - r..=cy + r {
                if let Some(bucket) = self.cells.get(&(gx, gy)) {
                    result.extend_from_slice(bucket);
                }
            }
        }
        result
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn indexed_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}

/// System: rebuild the index from current agent positions
pub fn rebuild_spatial_index(
    mut index: ResMut<SpatialIndex>,
    params: Res<AgentParams>,
    population: Res<Population>,
) {
    if index.cell_size != params.cell_size || index.vision_radius != params.vision_radius {
        *index = SpatialIndex::new(params.cell_size, params.vision_radius);
    }
    index.build(&population.agents);
}
