//! Visual attributes handed to the renderer.
//!
//! The engine does not draw anything. Each frame the renderer asks for the
//! live particles of an emitter and gets back plain [`VisualAttributes`]:
//! where to draw, how big, in which color and at what rotation. Shape and
//! blend mode decide how those attributes are turned into pixels.
//!
//! # Usage
//!
//! ```ignore
//! for attrs in system.resolved(&emitter) {
//!     canvas.draw(emitter.shape, emitter.blend_mode, attrs);
//! }
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::particle::Particle;

/// Compositing hint passed through to the renderer untouched.
///
/// The simulation never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Colors add up, overlapping particles glow. Fire, magic, sparks.
    Additive,

    /// Lightens without blowing out to white.
    Screen,

    /// Colors multiply, darkening the result. Shadows and soot.
    Multiply,
}

impl BlendMode {
    pub const ALL: [Self; 4] = [Self::Alpha, Self::Additive, Self::Screen, Self::Multiply];

    pub fn label(&self) -> &'static str {
        match self {
            BlendMode::Alpha => "Alpha",
            BlendMode::Additive => "Additive",
            BlendMode::Screen => "Screen",
            BlendMode::Multiply => "Multiply",
        }
    }
}

/// Particle shape for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleShape {
    /// Round dot (default).
    #[default]
    Circle,

    /// Vertical streak four times taller than wide, e.g. rain.
    Line,

    /// Star drawn rotated by 45 degrees.
    Star,
}

impl ParticleShape {
    pub const ALL: [Self; 3] = [Self::Circle, Self::Line, Self::Star];

    /// Height of the drawn quad relative to its width.
    pub fn aspect(&self) -> f32 {
        match self {
            ParticleShape::Line => 4.0,
            ParticleShape::Circle | ParticleShape::Star => 1.0,
        }
    }

    /// Rotation hint in degrees.
    pub fn rotation(&self) -> f32 {
        match self {
            ParticleShape::Star => 45.0,
            ParticleShape::Circle | ParticleShape::Line => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParticleShape::Circle => "circle",
            ParticleShape::Line => "line",
            ParticleShape::Star => "star",
        }
    }
}

/// Everything a renderer needs to draw one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualAttributes {
    /// Absolute scene position of the particle's center.
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub color: Rgba,
    /// Degrees.
    pub rotation: f32,
}

/// Map a particle to its visual attributes at its current age.
///
/// Size and color are interpolated over the envelopes the particle captured
/// when it spawned, so later edits to the emitter do not affect it.
pub fn resolve(particle: &Particle, shape: ParticleShape) -> VisualAttributes {
    let progress = particle.progress();
    let size = particle.size.at(progress);
    VisualAttributes {
        position: particle.position,
        width: size,
        height: size * shape.aspect(),
        color: particle.color.start.lerp(particle.color.end, progress),
        rotation: shape.rotation(),
    }
}
