//! The preset catalog: named emission templates.
//!
//! A [`Preset`] bundles every emission parameter an emitter needs. The
//! [`PresetLibrary`] is an immutable catalog of them, built once and handed to
//! whoever needs lookups. The built-in catalog ships eight entries:
//!
//! | Name | Shape | Notes |
//! |------|-------|-------|
//! | `fire` | circle | rising, shrinking, orange to transparent red |
//! | `smoke` | circle | slow, growing grey puffs |
//! | `rain` | line | fast downward streaks |
//! | `snow` | circle | slow drifting flakes |
//! | `dust` | circle | omnidirectional motes, no gravity |
//! | `magic` | star | sparkles fading from violet to blue |
//! | `bubbles` | circle | rising, growing bubbles |
//! | `sparks` | line | fast bursts pulled down by gravity |
//!
//! Alternate catalogs can be built from any iterator of presets or loaded from
//! JSON, so tests and tools are never tied to the built-in table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::visuals::ParticleShape;

/// Icon shown for presets the catalog does not know.
pub const FALLBACK_ICON: &str = "💫";

/// A closed interval sampled uniformly at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A range that always samples `value`.
    pub const fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Map a unit sample `u` in `[0, 1)` into the range.
    ///
    /// Inverted ranges (`max < min`) are sampled without panicking.
    #[inline]
    pub fn sample_unit(&self, u: f32) -> f32 {
        self.min + u * (self.max - self.min)
    }
}

/// Start and end values interpolated over a particle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub start: T,
    pub end: T,
}

impl<T> Envelope<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }
}

impl Envelope<f32> {
    /// Plain scalar interpolation at `progress` in `[0, 1]`.
    #[inline]
    pub fn at(&self, progress: f32) -> f32 {
        self.start + (self.end - self.start) * progress
    }
}

/// A named emission template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub icon: String,
    /// Particles per second.
    pub emit_rate: f32,
    /// Seconds.
    pub lifetime: ValueRange,
    /// Units per second.
    pub speed: ValueRange,
    /// Degrees clockwise from "up" (negative Y).
    pub direction: ValueRange,
    /// Vertical acceleration in units per second squared. Negative rises.
    pub gravity: f32,
    pub size: Envelope<f32>,
    /// Hex colors, `#rrggbb` or `#rrggbbaa`.
    pub color: Envelope<String>,
    pub shape: ParticleShape,
}

/// An immutable catalog of presets keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetLibrary {
    presets: BTreeMap<String, Preset>,
}

impl PresetLibrary {
    /// Build a catalog from presets. Later entries replace earlier ones with
    /// the same name.
    pub fn from_presets(presets: impl IntoIterator<Item = Preset>) -> Self {
        Self {
            presets: presets
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
        }
    }

    /// Parse a catalog from a JSON array of presets.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let presets: Vec<Preset> = serde_json::from_str(json)?;
        Ok(Self::from_presets(presets))
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Look up a preset by exact name.
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// The preset's icon glyph, or [`FALLBACK_ICON`] if the name is unknown.
    pub fn icon_for(&self, name: &str) -> &str {
        self.get(name).map_or(FALLBACK_ICON, |p| p.icon.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    // =========================================================================
    // BUILT-IN CATALOG
    // =========================================================================

    /// The eight presets shipped with the editor.
    pub fn builtin() -> Self {
        Self::from_presets([
            fire(),
            smoke(),
            rain(),
            snow(),
            dust(),
            magic(),
            bubbles(),
            sparks(),
        ])
    }
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[allow(clippy::too_many_arguments)]
fn preset(
    name: &str,
    icon: &str,
    emit_rate: f32,
    lifetime: (f32, f32),
    speed: (f32, f32),
    direction: (f32, f32),
    gravity: f32,
    size: (f32, f32),
    color: (&str, &str),
    shape: ParticleShape,
) -> Preset {
    Preset {
        name: name.into(),
        icon: icon.into(),
        emit_rate,
        lifetime: ValueRange::new(lifetime.0, lifetime.1),
        speed: ValueRange::new(speed.0, speed.1),
        direction: ValueRange::new(direction.0, direction.1),
        gravity,
        size: Envelope::new(size.0, size.1),
        color: Envelope::new(color.0.into(), color.1.into()),
        shape,
    }
}

fn fire() -> Preset {
    preset(
        "fire",
        "🔥",
        30.0,
        (0.5, 1.5),
        (20.0, 60.0),
        (-20.0, 20.0),
        -50.0,
        (8.0, 2.0),
        ("#ff6600", "#ff000000"),
        ParticleShape::Circle,
    )
}

fn smoke() -> Preset {
    preset(
        "smoke",
        "💨",
        10.0,
        (2.0, 4.0),
        (10.0, 30.0),
        (-15.0, 15.0),
        -20.0,
        (10.0, 40.0),
        ("#66666699", "#33333300"),
        ParticleShape::Circle,
    )
}

fn rain() -> Preset {
    preset(
        "rain",
        "🌧️",
        80.0,
        (0.8, 1.2),
        (300.0, 400.0),
        (170.0, 190.0),
        200.0,
        (2.0, 2.0),
        ("#6699ffcc", "#6699ff66"),
        ParticleShape::Line,
    )
}

fn snow() -> Preset {
    preset(
        "snow",
        "❄️",
        20.0,
        (4.0, 6.0),
        (20.0, 40.0),
        (160.0, 200.0),
        10.0,
        (4.0, 3.0),
        ("#ffffff", "#ffffff66"),
        ParticleShape::Circle,
    )
}

fn dust() -> Preset {
    preset(
        "dust",
        "🌫️",
        8.0,
        (3.0, 5.0),
        (5.0, 15.0),
        (0.0, 360.0),
        0.0,
        (3.0, 1.0),
        ("#c8b496aa", "#c8b49600"),
        ParticleShape::Circle,
    )
}

fn magic() -> Preset {
    preset(
        "magic",
        "✨",
        25.0,
        (1.0, 2.0),
        (20.0, 50.0),
        (0.0, 360.0),
        -10.0,
        (6.0, 0.0),
        ("#cc66ff", "#3366ff00"),
        ParticleShape::Star,
    )
}

fn bubbles() -> Preset {
    preset(
        "bubbles",
        "🫧",
        5.0,
        (2.0, 4.0),
        (20.0, 40.0),
        (-10.0, 10.0),
        -15.0,
        (6.0, 10.0),
        ("#aaddff88", "#aaddff00"),
        ParticleShape::Circle,
    )
}

fn sparks() -> Preset {
    preset(
        "sparks",
        "⚡",
        40.0,
        (0.3, 0.8),
        (100.0, 200.0),
        (0.0, 360.0),
        150.0,
        (3.0, 1.0),
        ("#ffff66", "#ff660000"),
        ParticleShape::Line,
    )
}
