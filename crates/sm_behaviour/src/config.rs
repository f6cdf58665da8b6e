//! Behaviour configuration
//!
//! Every tunable the body and head elements read. Loaded from YAML (or JSON
//! by extension); every field has a default so partial files are valid.
//!
//! ```rust
//! use sm_behaviour::config::{BehaviourConfig, PlayerRole};
//!
//! let config = BehaviourConfig::from_yaml_str("role: center\n").unwrap();
//! assert_eq!(config.role, PlayerRole::Center);
//! assert_eq!(config.supporter.ball_far_distance, 1.1);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sm_core::EngineConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which body root decision the robot runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    #[default]
    Supporter,
    Center,
    Goalie,
    Penalty,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourConfig {
    pub role: PlayerRole,
    pub field: FieldConfig,
    pub fieldie: FieldieConfig,
    pub supporter: SupporterConfig,
    pub world: WorldConfig,
    pub toggles: Toggles,
    pub wait: WaitConfig,
    pub search: SearchConfig,
    pub engine: EngineConfig,
}

/// Field geometry in meters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub length: f64,
    pub goal_width: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self { length: 9.0, goal_width: 2.6 }
    }
}

/// Field player kicking and positioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldieConfig {
    /// Ball forward offset (u) at which a kick is possible.
    pub kick_distance: f64,
    /// Ball closer than this (u) is too close to kick.
    pub min_kick_distance: f64,
    /// Maximum sideways offset (|v|) for a penalty kick without realigning.
    pub kick_align: f64,
    /// Duty position on the field (x, y).
    pub duty_position: (f64, f64),
    /// Distance at which a go-to target counts as reached.
    pub arrive_tolerance: f64,
}

impl Default for FieldieConfig {
    fn default() -> Self {
        Self {
            kick_distance: 0.25,
            min_kick_distance: 0.05,
            kick_align: 0.1,
            duty_position: (-1.5, 0.0),
            arrive_tolerance: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupporterConfig {
    /// Ball farther than this is approached; closer means wait.
    pub ball_far_distance: f64,
    /// Seconds since the last sighting before the supporter searches.
    pub ball_lost_timeout: f64,
}

impl Default for SupporterConfig {
    fn default() -> Self {
        Self { ball_far_distance: 1.1, ball_lost_timeout: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seconds a ball sighting stays "seen".
    pub ball_seen_window: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { ball_seen_window: 0.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    /// Goalie walks back to its duty position after a throw.
    pub goalie_relocate_turn: bool,
    /// Penalty taker kicks straight away instead of a first positioning kick.
    pub direct_penalty_kick: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self { goalie_relocate_turn: true, direct_penalty_kick: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Seconds waited when a `Wait` is pushed without a duration.
    pub default_duration: f64,
    /// Pop while the deadline has NOT yet passed, reproducing the older
    /// behaviour stack. Off by default; see DESIGN.md.
    pub legacy_pop_before_deadline: bool,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self { default_duration: 10.0, legacy_pop_before_deadline: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Head (pan, tilt) points in radians, visited in order.
    pub pattern: Vec<(f64, f64)>,
    /// Head search frames spent on each pattern point.
    pub frames_per_point: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: vec![(-1.2, 0.3), (-0.6, 0.6), (0.0, 0.3), (0.6, 0.6), (1.2, 0.3)],
            frames_per_point: 3,
        }
    }
}

impl BehaviourConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk. `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fieldie.min_kick_distance >= self.fieldie.kick_distance {
            return Err(ConfigError::Invalid(format!(
                "fieldie.min_kick_distance ({}) must be below fieldie.kick_distance ({})",
                self.fieldie.min_kick_distance, self.fieldie.kick_distance
            )));
        }
        if self.search.pattern.is_empty() {
            return Err(ConfigError::Invalid("search.pattern is empty".into()));
        }
        if self.search.frames_per_point == 0 {
            return Err(ConfigError::Invalid("search.frames_per_point must be positive".into()));
        }
        if self.wait.default_duration < 0.0 {
            return Err(ConfigError::Invalid("wait.default_duration is negative".into()));
        }
        if self.engine.max_chain_len == 0 {
            return Err(ConfigError::Invalid("engine.max_chain_len must be positive".into()));
        }
        Ok(())
    }
}
