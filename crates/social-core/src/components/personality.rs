//! Personality Catalog
//!
//! Immutable faction x archetype records. Agents copy a record into their own
//! mutable [`Personality`](super::agent::Personality) at spawn time, so the
//! catalog is never touched by conversions.

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use social_wire::Faction;

/// Archetype name of the apex predator. Its drains deactivate instead of convert.
pub const APEX_PREDATOR: &str = "Reaper";

/// A single archetype record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityRecord {
    pub id: u32,
    pub name: String,
    pub faction: Faction,
    pub color: String,
    pub aggression: f64,
    pub empathy: f64,
    pub energy_trait: f64,
}

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error reading catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error in catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog contains no archetypes")]
    Empty,
    #[error("archetype {name:?} has {field} = {value} outside [0, 1]")]
    TraitOutOfRange {
        name: String,
        field: &'static str,
        value: f64,
    },
}

/// On-disk layout: archetypes grouped under their faction.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    personalities: Vec<FactionGroup>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FactionGroup {
    faction: Faction,
    types: Vec<ArchetypeEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArchetypeEntry {
    id: u32,
    name: String,
    color: String,
    aggression: f64,
    empathy: f64,
    #[serde(rename = "energy")]
    energy_trait: f64,
}

/// Flattened, read-only archetype catalog.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PersonalityCatalog {
    records: Vec<PersonalityRecord>,
}

impl PersonalityCatalog {
    /// Build a catalog from flat records, validating trait ranges.
    pub fn new(records: Vec<PersonalityRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }
        for record in &records {
            for (field, value) in [
                ("aggression", record.aggression),
                ("empathy", record.empathy),
                ("energy", record.energy_trait),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(CatalogError::TraitOutOfRange {
                        name: record.name.clone(),
                        field,
                        value,
                    });
                }
            }
        }
        Ok(Self { records })
    }

    /// Parse the nested `{"personalities": [{faction, types}]}` document.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        let records = file
            .personalities
            .into_iter()
            .flat_map(|group| {
                let faction = group.faction;
                group.types.into_iter().map(move |t| PersonalityRecord {
                    id: t.id,
                    name: t.name,
                    faction,
                    color: t.color,
                    aggression: t.aggression,
                    empathy: t.empathy,
                    energy_trait: t.energy_trait,
                })
            })
            .collect();
        Self::new(records)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load from `path`, substituting the built-in catalog on any failure.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::from_file(path) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    archetypes = catalog.len(),
                    "Loaded personality catalog"
                );
                catalog
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Catalog unavailable, using built-in archetypes"
                );
                Self::builtin()
            }
        }
    }

    /// Serialize back into the nested on-disk layout.
    pub fn to_json_pretty(&self) -> String {
        let personalities = Faction::ALL
            .into_iter()
            .filter(|f| self.records.iter().any(|r| r.faction == *f))
            .map(|faction| FactionGroup {
                faction,
                types: self
                    .by_faction(faction)
                    .map(|r| ArchetypeEntry {
                        id: r.id,
                        name: r.name.clone(),
                        color: r.color.clone(),
                        aggression: r.aggression,
                        empathy: r.empathy,
                        energy_trait: r.energy_trait,
                    })
                    .collect(),
            })
            .collect();
        serde_json::to_string_pretty(&CatalogFile { personalities })
            .unwrap_or_else(|_| r#"{"personalities": []}"#.to_string())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PersonalityRecord] {
        &self.records
    }

    pub fn by_faction(&self, faction: Faction) -> impl Iterator<Item = &PersonalityRecord> {
        self.records.iter().filter(move |r| r.faction == faction)
    }

    /// First archetype listed for a faction; used when a remote sync reassigns faction.
    pub fn first_of(&self, faction: Faction) -> Option<&PersonalityRecord> {
        self.by_faction(faction).next()
    }

    /// Uniformly random archetype.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &PersonalityRecord {
        let idx = (rng.gen::<f64>() * self.records.len() as f64) as usize;
        &self.records[idx.min(self.records.len() - 1)]
    }

    /// The 40 archetypes compiled into the engine.
    pub fn builtin() -> Self {
        let records = BUILTIN_ARCHETYPES
            .iter()
            .map(|&(id, name, faction, color, aggression, empathy, energy_trait)| {
                PersonalityRecord {
                    id,
                    name: name.to_string(),
                    faction,
                    color: color.to_string(),
                    aggression,
                    empathy,
                    energy_trait,
                }
            })
            .collect();
        Self { records }
    }
}

impl Default for PersonalityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

type ArchetypeRow = (u32, &'static str, Faction, &'static str, f64, f64, f64);

// (id, name, faction, color, aggression, empathy, energy)
#[rustfmt::skip]
const BUILTIN_ARCHETYPES: &[ArchetypeRow] = &[
    (1,  "The Void",    Faction::Entropics,  "#000000", 1.0, 0.0, 0.2),
    (2,  "Berserker",   Faction::Entropics,  "#1A0000", 0.9, 0.1, 0.9),
    (3,  "Leech",       Faction::Entropics,  "#222222", 0.4, 0.2, 0.4),
    (4,  "Shadow",      Faction::Entropics,  "#333333", 0.2, 0.1, 0.7),
    (5,  "Corruptor",   Faction::Entropics,  "#050505", 0.8, 0.0, 0.5),
    (6,  "Viral",       Faction::Entropics,  "#0A0A0A", 0.7, 0.1, 0.8),
    (7,  "Nihilist",    Faction::Entropics,  "#111111", 0.3, 0.0, 0.1),
    (8,  "Specter",     Faction::Entropics,  "#1C1C1C", 0.5, 0.1, 0.6),
    (9,  "Obsidian",    Faction::Entropics,  "#020202", 0.1, 0.0, 0.0),
    (10, "Reaper",      Faction::Entropics,  "#000005", 0.9, 0.0, 1.0),
    (11, "The Sun",     Faction::Luminaries, "#FFD700", 0.1, 1.0, 0.1),
    (12, "Monk",        Faction::Luminaries, "#FFFACD", 0.0, 0.9, 0.2),
    (13, "Beacon",      Faction::Luminaries, "#FFFFFF", 0.5, 0.8, 0.5),
    (14, "Protector",   Faction::Luminaries, "#F0E68C", 0.6, 0.7, 0.6),
    (15, "Messenger",   Faction::Luminaries, "#EEDD82", 0.2, 0.9, 0.9),
    (16, "Aura",        Faction::Luminaries, "#FAFAD2", 0.1, 0.8, 0.4),
    (17, "Prism",       Faction::Luminaries, "#FFFFE0", 0.3, 0.7, 0.7),
    (18, "Guardian",    Faction::Luminaries, "#B8860B", 0.8, 0.6, 0.5),
    (19, "Starlight",   Faction::Luminaries, "#F5F5DC", 0.1, 0.5, 1.0),
    (20, "Sage",        Faction::Luminaries, "#DAA520", 0.0, 1.0, 0.3),
    (21, "Chaos",       Faction::Catalysts,  "#FF00FF", 0.5, 0.5, 1.0),
    (22, "Glitch",      Faction::Catalysts,  "#00FFFF", 0.2, 0.2, 0.8),
    (23, "Mutant",      Faction::Catalysts,  "#39FF14", 0.7, 0.3, 0.6),
    (24, "Spark",       Faction::Catalysts,  "#FF4500", 0.9, 0.5, 0.9),
    (25, "Inverter",    Faction::Catalysts,  "#7FFF00", 0.5, 0.5, 0.4),
    (26, "Shifter",     Faction::Catalysts,  "#9400D3", 0.4, 0.4, 0.7),
    (27, "Pulse",       Faction::Catalysts,  "#FF1493", 0.1, 0.1, 0.5),
    (28, "Drifter",     Faction::Catalysts,  "#00BFFF", 0.2, 0.5, 0.9),
    (29, "Anomalous",   Faction::Catalysts,  "#ADFF2F", 0.6, 0.6, 0.6),
    (30, "Catalyst-X",  Faction::Catalysts,  "#FF6347", 1.0, 1.0, 1.0),
    (31, "Citizen",     Faction::Inert,      "#808080", 0.2, 0.5, 0.3),
    (32, "Wall",        Faction::Inert,      "#444444", 0.0, 0.1, 0.0),
    (33, "Skeptic",     Faction::Inert,      "#A9A9A9", 0.1, 0.3, 0.2),
    (34, "Follower",    Faction::Inert,      "#D3D3D3", 0.1, 0.5, 0.5),
    (35, "Static",      Faction::Inert,      "#696969", 0.0, 0.5, 0.1),
    (36, "Anchor",      Faction::Inert,      "#2F4F4F", 0.1, 0.6, 0.0),
    (37, "Vessel",      Faction::Inert,      "#BEBEBE", 0.1, 0.9, 0.4),
    (38, "Drone",       Faction::Inert,      "#778899", 0.3, 0.3, 0.6),
    (39, "Buffer",      Faction::Inert,      "#708090", 0.0, 0.5, 0.3),
    (40, "The Average", Faction::Inert,      "#777777", 0.5, 0.5, 0.5),
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn test_builtin_has_ten_per_faction() {
        let catalog = PersonalityCatalog::builtin();
        assert_eq!(catalog.len(), 40);
        for faction in Faction::ALL {
            assert_eq!(catalog.by_faction(faction).count(), 10);
        }
        assert!(catalog.records().iter().any(|r| r.name == APEX_PREDATOR));
    }

    #[test]
    fn test_builtin_passes_validation() {
        let catalog = PersonalityCatalog::builtin();
        assert!(PersonalityCatalog::new(catalog.records().to_vec()).is_ok());
    }

    #[test]
    fn test_shipped_json_matches_builtin() {
        let json = include_str!("../../data/personalities.json");
        let parsed = PersonalityCatalog::from_json_str(json).unwrap();
        assert_eq!(parsed, PersonalityCatalog::builtin());
    }

    #[test]
    fn test_json_roundtrip_preserves_grouping() {
        let catalog = PersonalityCatalog::builtin();
        let json = catalog.to_json_pretty();
        assert!(json.contains(r#""energy": 0.2"#));
        assert_eq!(PersonalityCatalog::from_json_str(&json).unwrap(), catalog);
    }

    #[test]
    fn test_first_of_faction() {
        let catalog = PersonalityCatalog::builtin();
        assert_eq!(catalog.first_of(Faction::Inert).unwrap().name, "Citizen");
        assert_eq!(catalog.first_of(Faction::Catalysts).unwrap().id, 21);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = PersonalityCatalog::from_json_str(r#"{"personalities": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn test_out_of_range_trait_rejected() {
        let json = r##"{"personalities": [{"faction": "Inert", "types": [
            {"id": 1, "name": "Overdrive", "color": "#fff", "aggression": 1.5, "empathy": 0.0, "energy": 0.5}
        ]}]}"##;
        let err = PersonalityCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::TraitOutOfRange { field: "aggression", .. }));
    }

    #[test]
    fn test_malformed_file_falls_back_to_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();

        let catalog = PersonalityCatalog::load_or_builtin(Some(file.path()));
        assert_eq!(catalog, PersonalityCatalog::builtin());
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let catalog =
            PersonalityCatalog::load_or_builtin(Some(Path::new("does/not/exist.json")));
        assert_eq!(catalog.len(), 40);
    }

    #[test]
    fn test_custom_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{"personalities": [{{"faction": "Catalysts", "types": [
                {{"id": 99, "name": "Solo", "color": "#123456", "aggression": 0.3, "empathy": 0.4, "energy": 0.5}}
            ]}}]}}"##
        )
        .unwrap();

        let catalog = PersonalityCatalog::load_or_builtin(Some(file.path()));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].faction, Faction::Catalysts);
        assert_eq!(catalog.records()[0].energy_trait, 0.5);
    }

    #[test]
    fn test_pick_is_deterministic() {
        let catalog = PersonalityCatalog::builtin();
        let mut a = SmallRng::seed_from_u64(7);
        let mut b = SmallRng::seed_from_u64(7);
        let first: Vec<u32> = (0..20).map(|_| catalog.pick(&mut a).id).collect();
        let second: Vec<u32> = (0..20).map(|_| catalog.pick(&mut b).id).collect();
        assert_eq!(first, second);
    }
}
