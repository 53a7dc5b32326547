//! Configuration loading for the simulation.
//!
//! World, agent, weight, backend and catalog settings are loaded from a TOML
//! file. Every section is optional and falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::components::world::{AgentParams, GlobalWeights, WorldBounds};

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// World bounds, population and seed
    #[serde(default)]
    pub world: WorldConfig,
    /// Agent behavior tuning
    #[serde(default)]
    pub agent: AgentParams,
    /// Initial global weight multipliers
    #[serde(default)]
    pub weights: GlobalWeights,
    /// External physics backend
    #[serde(default)]
    pub backend: BackendConfig,
    /// Personality catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.world.width, self.world.height)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bounds().is_valid() {
            return Err(ConfigError::Invalid(format!(
                "world bounds must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if !self.agent.index_is_valid() {
            return Err(ConfigError::Invalid(format!(
                "cell_size ({1}) must be positive and vision_radius ({0}) non-negative",
                self.agent.vision_radius, self.agent.cell_size
            )));
        }
        if !GlobalWeights::is_valid_value(self.world.speed) {
            return Err(ConfigError::Invalid(format!(
                "speed must be finite and non-negative, got {}",
                self.world.speed
            )));
        }
        for (name, value) in [
            ("aggression", self.weights.aggression),
            ("empathy", self.weights.empathy),
            ("energy", self.weights.energy),
        ] {
            if !GlobalWeights::is_valid_value(value) {
                return Err(ConfigError::Invalid(format!(
                    "weight {} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.backend.timeout_ms == 0 {
            return Err(ConfigError::Invalid("backend timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

/// World settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Agents spawned on every reset
    pub population: usize,
    /// RNG seed; every reset reseeds from it
    pub seed: u64,
    /// Multiplier on every drive step's dt
    pub speed: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            population: 500,
            seed: 42,
            speed: 1.0,
        }
    }
}

/// External physics backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; local stepping only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Per-request timeout
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 2000,
        }
    }
}

/// Personality catalog settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog; the built-in catalog is used when unset or unreadable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Simulation Configuration

[world]
width = 800.0
height = 600.0
population = 500
seed = 42
speed = 1.0

[agent]
vision_radius = 60.0
cell_size = 50.0
energy_decay = 0.0002
steering_smoothing = 0.1
flee_boost = 1.5
interaction_margin = 2.0
cooldown_ticks = 10.0
idle_nudge_chance = 0.05
idle_nudge_strength = 0.5
idle_damping = 0.98

[weights]
aggression = 1.0
empathy = 1.0
energy = 1.0

[backend]
# url = "http://127.0.0.1:8000"
timeout_ms = 2000

[catalog]
# path = "crates/social-core/data/personalities.json"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();

        assert_eq!(config.world.width, 800.0);
        assert_eq!(config.world.height, 600.0);
        assert_eq!(config.world.population, 500);
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.agent.vision_radius, 60.0);
        assert_eq!(config.agent.cooldown_ticks, 10.0);
        assert_eq!(config.weights.aggression, 1.0);
        assert!(config.backend.url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = SimConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_config_to_toml_round_trip() {
        let mut config = SimConfig::default();
        config.backend.url = Some("http://localhost:8000".into());
        config.catalog.path = Some(PathBuf::from("data/personalities.json"));
        config.weights.aggression = 1.5;

        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[world]"));
        assert!(toml.contains("[agent]"));
        assert_eq!(SimConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [world]
            population = 40

            [weights]
            empathy = 0.25
        "#;
        let config = SimConfig::from_str(toml).unwrap();

        assert_eq!(config.world.population, 40);
        assert_eq!(config.world.width, 800.0);
        assert_eq!(config.weights.empathy, 0.25);
        assert_eq!(config.weights.aggression, 1.0);
        assert_eq!(config.agent, AgentParams::default());
    }

    #[test]
    fn test_validate_rejects_degenerate_index() {
        let toml = r#"
            [agent]
            vision_radius = 60.0
            cell_size = 0.0
        "#;
        let config = SimConfig::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("cell_size"));
    }

    #[test]
    fn test_validate_accepts_vision_wider_than_cells() {
        let toml = r#"
            [agent]
            vision_radius = 100.0
            cell_size = 50.0
        "#;
        let config = SimConfig::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SimConfig::default();
        config.world.width = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.world.speed = -1.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.weights.energy = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.weights.energy = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml() {
        let err = SimConfig::from_str("[world\nwidth = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[world]\nseed = 7\nspeed = 2.0").unwrap();

        let config = SimConfig::from_file(file.path()).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.speed, 2.0);

        let missing = SimConfig::from_file(Path::new("/nonexistent/sim.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
