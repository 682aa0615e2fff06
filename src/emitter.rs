//! Scene emitters.
//!
//! An [`Emitter`] is a particle source placed in a scene by the editor. It
//! owns its own copy of every emission parameter: applying a preset copies
//! the preset's values in, and editing the emitter afterwards never touches
//! the catalog.
//!
//! # Spawn Area
//!
//! Particles appear uniformly inside an axis-aligned rectangle centered on
//! the emitter's position:
//!
//! ```text
//!   (x - w/2, y - h/2) +-----------+
//!                      |     +     |  <- position (x, y)
//!                      +-----------+ (x + w/2, y + h/2)
//! ```
//!
//! # Example
//!
//! ```
//! use scenefx::prelude::*;
//!
//! let presets = PresetLibrary::builtin();
//! let mut torch = Emitter::new(EmitterId(1), "Torch", Vec2::new(320.0, 180.0));
//! assert!(presets.apply_preset(&mut torch, "fire"));
//! assert_eq!(torch.emit_rate, 30.0);
//!
//! // Unknown presets leave the emitter alone.
//! assert!(!presets.apply_preset(&mut torch, "lava"));
//! ```

use std::fmt;

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::preset::{Envelope, Preset, PresetLibrary, ValueRange};
use crate::visuals::{BlendMode, ParticleShape};

/// Stable identity of an emitter within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmitterId(pub u64);

impl fmt::Display for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "emitter#{}", self.0)
    }
}

/// A configured particle source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emitter {
    pub id: EmitterId,
    pub name: String,
    /// Center of the spawn rectangle.
    pub position: Vec2,
    /// Spawn rectangle width.
    pub width: f32,
    /// Spawn rectangle height.
    pub height: f32,
    /// Disabled emitters lose all their live particles on the next step.
    pub enabled: bool,
    pub blend_mode: BlendMode,

    // Emission fields, overwritten by `apply_preset`.
    /// Particles per second.
    pub emit_rate: f32,
    /// Seconds.
    pub lifetime: ValueRange,
    /// Units per second.
    pub speed: ValueRange,
    /// Degrees clockwise from "up" (negative Y).
    pub direction: ValueRange,
    /// Vertical acceleration, units per second squared.
    pub gravity: f32,
    pub size: Envelope<f32>,
    /// Hex colors, `#rrggbb` or `#rrggbbaa`.
    pub color: Envelope<String>,
    pub shape: ParticleShape,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            id: EmitterId::default(),
            name: "Emitter".into(),
            position: Vec2::ZERO,
            width: 20.0,
            height: 20.0,
            enabled: true,
            blend_mode: BlendMode::Alpha,
            emit_rate: 10.0,
            lifetime: ValueRange::new(1.0, 2.0),
            speed: ValueRange::new(20.0, 50.0),
            direction: ValueRange::new(-30.0, 30.0),
            gravity: 0.0,
            size: Envelope::new(4.0, 1.0),
            color: Envelope::new("#ffffff".into(), "#ffffff00".into()),
            shape: ParticleShape::Circle,
        }
    }
}

impl Emitter {
    /// Create an emitter with default emission settings.
    pub fn new(id: EmitterId, name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            ..Default::default()
        }
    }

    /// Create an emitter initialized from a preset.
    pub fn from_preset(id: EmitterId, name: impl Into<String>, position: Vec2, preset: &Preset) -> Self {
        let mut emitter = Self::new(id, name, position);
        emitter.apply_preset(preset);
        emitter
    }

    /// Builder-style spawn area.
    pub fn with_area(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builder-style blend mode.
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Overwrite the emission fields with the preset's values.
    ///
    /// Identity, position, spawn area, enabled flag and blend mode are kept.
    /// Particles already alive keep their captured appearance.
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.emit_rate = preset.emit_rate;
        self.lifetime = preset.lifetime;
        self.speed = preset.speed;
        self.direction = preset.direction;
        self.gravity = preset.gravity;
        self.size = preset.size;
        self.color = preset.color.clone();
        self.shape = preset.shape;
    }

    /// Corners `(min, max)` of the spawn rectangle.
    pub fn spawn_rect(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.width, self.height) * 0.5;
        (self.position - half, self.position + half)
    }
}

impl PresetLibrary {
    /// Apply the named preset to `emitter`.
    ///
    /// Returns `false` and leaves the emitter untouched if the name is not in
    /// the catalog.
    pub fn apply_preset(&self, emitter: &mut Emitter, name: &str) -> bool {
        match self.get(name) {
            Some(preset) => {
                emitter.apply_preset(preset);
                true
            }
            None => {
                debug!("{}: unknown preset {:?}, emitter unchanged", emitter.id, name);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_emitter() -> Emitter {
        Emitter {
            id: EmitterId(7),
            name: "Waterfall".into(),
            position: Vec2::new(100.0, 50.0),
            width: 64.0,
            height: 8.0,
            enabled: false,
            blend_mode: BlendMode::Screen,
            emit_rate: 999.0,
            lifetime: ValueRange::new(9.0, 9.0),
            speed: ValueRange::new(1.0, 2.0),
            direction: ValueRange::new(90.0, 90.0),
            gravity: 3.0,
            size: Envelope::new(1.0, 1.0),
            color: Envelope::new("#000000".into(), "#000000".into()),
            shape: ParticleShape::Star,
        }
    }

    #[test]
    fn test_apply_fire_overwrites_emission_fields() {
        let lib = PresetLibrary::builtin();
        let mut e = custom_emitter();
        assert!(lib.apply_preset(&mut e, "fire"));

        assert_eq!(e.shape, ParticleShape::Circle);
        assert_eq!(e.emit_rate, 30.0);
        assert_eq!(e.gravity, -50.0);
        let fire = lib.get("fire").unwrap();
        assert_eq!(e.lifetime, fire.lifetime);
        assert_eq!(e.color, fire.color);
    }

    #[test]
    fn test_apply_preserves_placement() {
        let lib = PresetLibrary::builtin();
        let mut e = custom_emitter();
        lib.apply_preset(&mut e, "rain");

        assert_eq!(e.id, EmitterId(7));
        assert_eq!(e.name, "Waterfall");
        assert_eq!(e.position, Vec2::new(100.0, 50.0));
        assert_eq!((e.width, e.height), (64.0, 8.0));
        assert!(!e.enabled);
        assert_eq!(e.blend_mode, BlendMode::Screen);
    }

    #[test]
    fn test_unknown_preset_is_noop() {
        let lib = PresetLibrary::builtin();
        let mut e = custom_emitter();
        assert!(!lib.apply_preset(&mut e, "lava"));
        assert_eq!(e, custom_emitter());
    }

    #[test]
    fn test_editing_emitter_does_not_touch_catalog() {
        let lib = PresetLibrary::builtin();
        let mut e = Emitter::from_preset(EmitterId(1), "Torch", Vec2::ZERO, lib.get("fire").unwrap());
        e.emit_rate = 1.0;
        e.color.start = "#00ff00".into();
        assert_eq!(lib.get("fire").unwrap().emit_rate, 30.0);
        assert_eq!(lib.get("fire").unwrap().color.start, "#ff6600");
    }

    #[test]
    fn test_spawn_rect() {
        let e = Emitter::new(EmitterId(1), "e", Vec2::new(10.0, 20.0)).with_area(4.0, 8.0);
        assert_eq!(e.spawn_rect(), (Vec2::new(8.0, 16.0), Vec2::new(12.0, 24.0)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let e: Emitter = serde_json::from_str(r#"{ "id": 3, "name": "Mist", "position": [1.0, 2.0] }"#).unwrap();
        assert_eq!(e.id, EmitterId(3));
        assert_eq!(e.position, Vec2::new(1.0, 2.0));
        assert!(e.enabled);
        assert_eq!(e.shape, ParticleShape::Circle);
    }
}
