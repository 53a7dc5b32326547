//! Agent Components
//!
//! Per-entity state: position, velocity, a mutable personality copy, vitals
//! and behavior.

use serde::{Deserialize, Serialize};

use social_wire::{AgentSnapshot, AgentState, Faction};

use super::personality::PersonalityRecord;

/// Display color every agent takes when it runs out of energy.
pub const INERT_COLOR: &str = "#808080";

/// Smallest radius an agent may have.
pub const MIN_RADIUS: f64 = 2.0;

/// Starting vitals.
pub const INITIAL_ENERGY: f64 = 1.0;
pub const INITIAL_RESOURCE: f64 = 0.5;

/// Agent's own copy of an archetype; conversions mutate this, never the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub archetype_id: u32,
    pub name: String,
    pub faction: Faction,
    pub color: String,
    pub aggression: f64,
    pub empathy: f64,
    pub energy_trait: f64,
}

impl From<&PersonalityRecord> for Personality {
    fn from(record: &PersonalityRecord) -> Self {
        Self {
            archetype_id: record.id,
            name: record.name.clone(),
            faction: record.faction,
            color: record.color.clone(),
            aggression: record.aggression,
            empathy: record.empathy,
            energy_trait: record.energy_trait,
        }
    }
}

/// Which path drove an agent into the Inert faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertCause {
    /// Energy reached zero.
    Exhaustion,
    /// Catalysts disruption drained it below the collapse threshold.
    Disruption,
}

/// A mobile entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub personality: Personality,
    pub energy: f64,
    pub resource: f64,
    pub is_deactivated: bool,
    pub state: AgentState,
    pub cooldown: f64,
}

/// `max(2, 3 + resource * 4)`
pub fn radius_for(resource: f64) -> f64 {
    (3.0 + resource * 4.0).max(MIN_RADIUS)
}

impl Agent {
    pub fn new(id: u32, record: &PersonalityRecord, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius: radius_for(INITIAL_RESOURCE),
            personality: Personality::from(record),
            energy: INITIAL_ENERGY,
            resource: INITIAL_RESOURCE,
            is_deactivated: false,
            state: AgentState::Idle,
            cooldown: 0.0,
        }
    }

    pub fn faction(&self) -> Faction {
        self.personality.faction
    }

    pub fn is_active(&self) -> bool {
        !self.is_deactivated
    }

    /// Ready to initiate a proximity interaction.
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub fn distance_to(&self, other: &Agent) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn refresh_radius(&mut self) {
        self.radius = radius_for(self.resource);
    }

    /// Permanent kill. Storage slot is kept for index stability.
    pub fn deactivate(&mut self) {
        self.is_deactivated = true;
    }

    pub fn convert_to_inert(&mut self, cause: InertCause) {
        self.personality.faction = Faction::Inert;
        self.personality.color = INERT_COLOR.to_string();
        self.personality.aggression = 0.1;
        if cause == InertCause::Exhaustion {
            self.personality.energy_trait = 0.2;
        }
    }

    /// Absorbed by an Entropics drain; aggression escalates from this agent's own value.
    pub fn convert_to_entropic(&mut self, source_color: &str) {
        let p = &mut self.personality;
        p.faction = Faction::Entropics;
        p.color = source_color.to_string();
        p.aggression = (p.aggression + 0.2).max(0.8);
        p.empathy = 0.0;
        p.energy_trait = 0.8;
    }

    pub fn convert_to_luminary(&mut self, source_color: &str) {
        let p = &mut self.personality;
        p.faction = Faction::Luminaries;
        p.color = source_color.to_string();
        p.empathy = (p.empathy + 0.1).max(0.8);
        p.aggression = 0.1;
    }

    pub fn convert_to_catalyst(&mut self, source_color: &str) {
        let p = &mut self.personality;
        p.faction = Faction::Catalysts;
        p.color = source_color.to_string();
        p.aggression = 0.5;
        p.empathy = 0.5;
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            x: self.x,
            y: self.y,
            resource: self.resource,
            energy: self.energy,
            state: self.state,
            faction: self.personality.faction,
            color: Some(self.personality.color.clone()),
            is_deactivated: self.is_deactivated,
        }
    }
}
