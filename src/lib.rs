//! # scenefx - Scene particle effects
//!
//! CPU particle emitters for a 2D point-and-click adventure scene editor.
//!
//! scenefx turns declarative emitter settings (rate, lifetime, speed,
//! direction, gravity, size and color envelopes) into a bounded population of
//! live particles, advanced by whatever frame driver the host provides. The
//! renderer reads plain visual attributes back each frame; the engine itself
//! never draws, never spawns threads and never owns a timer.
//!
//! ## Quick Start
//!
//! ```
//! use scenefx::prelude::*;
//!
//! let presets = PresetLibrary::builtin();
//! let mut scene = Scene::new("Cellar");
//! let id = scene.next_id();
//! scene.emitters.push(
//!     Emitter::from_preset(id, "Drip", Vec2::new(64.0, 0.0), presets.get("rain").unwrap())
//!         .with_area(32.0, 4.0),
//! );
//!
//! let mut sim = Simulation::seeded(7);
//! sim.start();
//! for _ in 0..30 {
//!     sim.advance(1.0 / 30.0, &scene.emitters);
//! }
//!
//! for frame in sim.system().render_frame(&scene.emitters) {
//!     for p in &frame.particles {
//!         // draw a p.width x p.height quad at p.position in p.color,
//!         // rotated by p.rotation degrees
//!         assert_eq!(p.height, p.width * 4.0);
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Presets
//!
//! A [`PresetLibrary`] is an immutable catalog of named templates. Applying a
//! preset copies its emission fields into an emitter; position, spawn area,
//! enabled flag and blend mode stay as they were.
//!
//! ### Emitters and pools
//!
//! Every [`Emitter`] gets its own [`ParticlePool`], capped at
//! [`MAX_PARTICLES`] live particles with oldest-first eviction. Disabling an
//! emitter clears its pool on the next step.
//!
//! ### Appearance
//!
//! Particles capture their size and color envelopes when they spawn and
//! interpolate them by normalized age. [`visuals::resolve`] maps a particle
//! and its emitter's [`ParticleShape`] to [`VisualAttributes`].
//!
//! ### Time
//!
//! [`SimulationClock`] converts driver timestamps to deltas and owns the
//! start/stop lifecycle. [`Simulation`] combines a clock with a
//! [`ParticleSystem`] and an optional per-frame hook.
//!
//! ### Randomness
//!
//! Spawning draws from an injected [`rand::Rng`]. Use
//! [`ParticleSystem::seeded`] or [`Simulation::seeded`] for reproducible runs.

pub mod color;
pub mod emitter;
pub mod error;
pub mod particle;
pub mod pool;
pub mod preset;
pub mod scene;
pub mod simulation;
pub mod time;
pub mod visuals;

pub use color::Rgba;
pub use emitter::{Emitter, EmitterId};
pub use error::{ColorError, ConfigError};
pub use glam::Vec2;
pub use particle::Particle;
pub use pool::{ParticlePool, MAX_PARTICLES};
pub use preset::{Envelope, Preset, PresetLibrary, ValueRange, FALLBACK_ICON};
pub use scene::{Scene, SimulationConfig};
pub use simulation::{EmitterFrame, FrameHook, ParticleSystem, Simulation};
pub use time::SimulationClock;
pub use visuals::{BlendMode, ParticleShape, VisualAttributes};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use scenefx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Rgba;
    pub use crate::emitter::{Emitter, EmitterId};
    pub use crate::particle::Particle;
    pub use crate::pool::ParticlePool;
    pub use crate::preset::{Envelope, Preset, PresetLibrary, ValueRange};
    pub use crate::scene::{Scene, SimulationConfig};
    pub use crate::simulation::{EmitterFrame, ParticleSystem, Simulation};
    pub use crate::time::SimulationClock;
    pub use crate::visuals::{BlendMode, ParticleShape, VisualAttributes};
    pub use crate::Vec2;
}
