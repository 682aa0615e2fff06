//! Scene descriptions as the editor stores them.
//!
//! A [`Scene`] is the list of emitters placed in one room of the game plus
//! the simulation settings used to preview it. Scenes serialize to JSON; live
//! particle state never does.
//!
//! ```json
//! {
//!   "name": "Tavern",
//!   "emitters": [
//!     { "id": 1, "name": "Hearth", "position": [320.0, 400.0], "emit_rate": 30.0 }
//!   ],
//!   "simulation": { "seed": 7 }
//! }
//! ```
//!
//! Missing emitter fields take their defaults, missing simulation settings
//! fall back to [`SimulationConfig::default`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::emitter::{Emitter, EmitterId};
use crate::error::ConfigError;
use crate::pool::MAX_PARTICLES;
use crate::preset::PresetLibrary;
use crate::time::DEFAULT_MAX_DELTA;

fn default_max_particles() -> usize {
    MAX_PARTICLES
}

fn default_max_delta() -> f32 {
    DEFAULT_MAX_DELTA
}

fn default_time_scale() -> f32 {
    1.0
}

/// Preview settings for the simulation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Live particle cap per emitter.
    #[serde(default = "default_max_particles")]
    pub max_particles: usize,
    /// Longest delta a single frame may simulate, seconds.
    #[serde(default = "default_max_delta")]
    pub max_delta: f32,
    /// Simulation speed multiplier (1.0 = normal, 0.5 = half speed, 2.0 = double speed)
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
    /// Fixed seed for reproducible previews. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            max_delta: DEFAULT_MAX_DELTA,
            time_scale: 1.0,
            seed: None,
        }
    }
}

/// The emitters of one scene, in declaration order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub emitters: Vec<Emitter>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Highest id ever handed out by [`Scene::next_id`]. Deleted ids are
    /// never reissued, so a new emitter can't pick up a stale pool.
    #[serde(default)]
    last_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emitters: Vec::new(),
            simulation: SimulationConfig::default(),
            last_id: 0,
        }
    }

    /// One emitter per preset in `presets`, laid out left to right.
    pub fn showcase(presets: &PresetLibrary) -> Self {
        let mut scene = Self::new("Preset showcase");
        for (i, preset) in presets.iter().enumerate() {
            let id = scene.next_id();
            let position = Vec2::new(80.0 + i as f32 * 120.0, 240.0);
            scene
                .emitters
                .push(Emitter::from_preset(id, preset.name.clone(), position, preset));
        }
        scene
    }

    /// Parse and validate a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let scene: Scene = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load and validate a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Save the scene to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| ConfigError::io(path, e))
    }

    /// Check the invariants the simulation relies on: unique emitter ids,
    /// lifetime ranges with `0 < min <= max`, finite non-negative emit rates
    /// and parseable colors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for e in &self.emitters {
            if !seen.insert(e.id) {
                return Err(ConfigError::Invalid(format!("duplicate emitter id {}", e.id.0)));
            }
            let life = e.lifetime;
            if !(life.min > 0.0 && life.min <= life.max && life.max.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{} ({}): lifetime must satisfy 0 < min <= max, got {}..{}",
                    e.id, e.name, life.min, life.max
                )));
            }
            if !(e.emit_rate.is_finite() && e.emit_rate >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} ({}): emit_rate must be a non-negative number, got {}",
                    e.id, e.name, e.emit_rate
                )));
            }
            for hex in [&e.color.start, &e.color.end] {
                Rgba::try_from_hex(hex).map_err(|err| {
                    ConfigError::Invalid(format!("{} ({}): color {:?}: {}", e.id, e.name, hex, err))
                })?;
            }
        }
        if self.simulation.time_scale < 0.0 || self.simulation.max_delta < 0.0 {
            return Err(ConfigError::Invalid(
                "time_scale and max_delta must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Allocate an id no emitter of this scene has used, including deleted
    /// ones.
    pub fn next_id(&mut self) -> EmitterId {
        let highest = self.emitters.iter().map(|e| e.id.0).max().unwrap_or(0);
        self.last_id = self.last_id.max(highest) + 1;
        EmitterId(self.last_id)
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.iter().find(|e| e.id == id)
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters.iter_mut().find(|e| e.id == id)
    }

    /// Remove an emitter, returning it if it was present.
    pub fn remove_emitter(&mut self, id: EmitterId) -> Option<Emitter> {
        let index = self.emitters.iter().position(|e| e.id == id)?;
        Some(self.emitters.remove(index))
    }
}
