//! Per-scene particle state and the frame-driven simulation loop.
//!
//! [`ParticleSystem`] owns one [`ParticlePool`] per emitter id plus the random
//! source used for spawning. Pools appear lazily the first time an emitter is
//! stepped and disappear when the emitter is removed or the system is reset.
//!
//! [`Simulation`] ties a [`SimulationClock`] to a system: the host calls
//! [`Simulation::tick`] from its frame callback and the simulation steps
//! every emitter in scene order, then fires the optional frame hook.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use scenefx::prelude::*;
//!
//! let presets = PresetLibrary::builtin();
//! let emitters = vec![Emitter::from_preset(
//!     EmitterId(1),
//!     "Campfire",
//!     Vec2::new(200.0, 300.0),
//!     presets.get("fire").unwrap(),
//! )];
//!
//! let mut sim = Simulation::seeded(42);
//! sim.start();
//! for frame in 0..60u64 {
//!     sim.tick(Duration::from_millis(frame * 16), &emitters);
//! }
//! assert!(sim.system().live_count(EmitterId(1)) > 0);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::emitter::{Emitter, EmitterId};
use crate::particle::Particle;
use crate::pool::{ParticlePool, MAX_PARTICLES};
use crate::scene::SimulationConfig;
use crate::time::SimulationClock;
use crate::visuals::{BlendMode, ParticleShape, VisualAttributes};

/// Resolved particles of one emitter, ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterFrame {
    pub id: EmitterId,
    pub shape: ParticleShape,
    pub blend_mode: BlendMode,
    /// Oldest first.
    pub particles: Vec<VisualAttributes>,
}

/// Live particles for every emitter of a scene.
#[derive(Debug, Clone)]
pub struct ParticleSystem<R = SmallRng> {
    pools: HashMap<EmitterId, ParticlePool>,
    /// Cap handed to newly created pools.
    capacity: usize,
    rng: R,
}

impl ParticleSystem<SmallRng> {
    /// A system seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// A reproducible system.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for ParticleSystem<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ParticleSystem<R> {
    /// A system drawing spawn randomness from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            pools: HashMap::new(),
            capacity: MAX_PARTICLES,
            rng,
        }
    }

    /// Set the per-emitter cap for pools created from now on.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Step one emitter by `dt` seconds, creating its pool if needed.
    pub fn step(&mut self, emitter: &Emitter, dt: f32) {
        let capacity = self.capacity;
        let pool = self.pools.entry(emitter.id).or_insert_with(|| {
            debug!("{}: creating particle pool", emitter.id);
            ParticlePool::with_capacity(capacity)
        });
        pool.step(emitter, dt, &mut self.rng);
    }

    /// Step every emitter, in slice order.
    pub fn step_all(&mut self, emitters: &[Emitter], dt: f32) {
        for emitter in emitters {
            self.step(emitter, dt);
        }
    }

    /// Drop the pool of a deleted emitter. Returns whether one existed.
    pub fn remove_emitter(&mut self, id: EmitterId) -> bool {
        let removed = self.pools.remove(&id).is_some();
        if removed {
            debug!("{}: particle pool removed", id);
        }
        removed
    }

    /// Drop the pools of emitters that are no longer in `emitters`.
    pub fn retain_scene(&mut self, emitters: &[Emitter]) {
        self.pools.retain(|id, _| {
            let keep = emitters.iter().any(|e| e.id == *id);
            if !keep {
                debug!("{}: emitter left the scene, pool removed", id);
            }
            keep
        });
    }

    /// Drop every pool.
    pub fn reset(&mut self) {
        debug!("resetting particle system ({} pools)", self.pools.len());
        self.pools.clear();
    }
}

impl<R> ParticleSystem<R> {
    pub fn pool(&self, id: EmitterId) -> Option<&ParticlePool> {
        self.pools.get(&id)
    }

    /// Live particles of one emitter, oldest first. Empty if it was never
    /// stepped.
    pub fn particles(&self, id: EmitterId) -> impl Iterator<Item = &Particle> + '_ {
        self.pools.get(&id).into_iter().flat_map(ParticlePool::iter)
    }

    pub fn live_count(&self, id: EmitterId) -> usize {
        self.pools.get(&id).map_or(0, ParticlePool::len)
    }

    /// Live particles across all emitters.
    pub fn total_live(&self) -> usize {
        self.pools.values().map(ParticlePool::len).sum()
    }

    /// Number of pools currently allocated.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Visual attributes of one emitter's live particles, recomputed on
    /// every call.
    pub fn resolved<'a>(&'a self, emitter: &Emitter) -> impl Iterator<Item = VisualAttributes> + 'a {
        let shape = emitter.shape;
        self.pools
            .get(&emitter.id)
            .into_iter()
            .flat_map(move |pool| pool.resolved(shape))
    }

    /// Resolved particles of every emitter, in slice order.
    pub fn render_frame(&self, emitters: &[Emitter]) -> Vec<EmitterFrame> {
        emitters
            .iter()
            .map(|e| EmitterFrame {
                id: e.id,
                shape: e.shape,
                blend_mode: e.blend_mode,
                particles: self.resolved(e).collect(),
            })
            .collect()
    }
}

/// Callback fired after every simulated frame with the frame's delta.
pub type FrameHook<R> = Box<dyn FnMut(&ParticleSystem<R>, f32)>;

/// A particle system driven by a clock.
pub struct Simulation<R = SmallRng> {
    clock: SimulationClock,
    system: ParticleSystem<R>,
    on_frame: Option<FrameHook<R>>,
}

impl Simulation<SmallRng> {
    /// A stopped simulation seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_system(ParticleSystem::new())
    }

    /// A stopped, reproducible simulation.
    pub fn seeded(seed: u64) -> Self {
        Self::with_system(ParticleSystem::seeded(seed))
    }

    /// Build from a scene's simulation settings.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let system = match config.seed {
            Some(seed) => ParticleSystem::seeded(seed),
            None => ParticleSystem::new(),
        };
        let mut sim = Self::with_system(system.with_capacity(config.max_particles));
        sim.clock.set_max_delta(config.max_delta);
        sim.clock.set_time_scale(config.time_scale);
        sim
    }
}

impl Default for Simulation<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Simulation<R> {
    /// A stopped simulation around an existing system.
    pub fn with_system(system: ParticleSystem<R>) -> Self {
        Self {
            clock: SimulationClock::new(),
            system,
            on_frame: None,
        }
    }

    /// Register a hook called after each simulated frame, typically to
    /// request a redraw.
    pub fn on_frame(mut self, hook: impl FnMut(&ParticleSystem<R>, f32) + 'static) -> Self {
        self.on_frame = Some(Box::new(hook));
        self
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Handle a driver tick at timestamp `now`.
    ///
    /// `emitters` is the full scene. Pools of emitters no longer in it are
    /// dropped. Returns the simulated delta, or `None` if the simulation is stopped
    /// and nothing was stepped.
    pub fn tick(&mut self, now: Duration, emitters: &[Emitter]) -> Option<f32> {
        let dt = self.clock.tick(now)?;
        self.run_frame(emitters, dt);
        Some(dt)
    }

    /// Handle a driver tick that already knows its delta.
    pub fn advance(&mut self, dt: f32, emitters: &[Emitter]) -> Option<f32> {
        let dt = self.clock.advance(dt)?;
        self.run_frame(emitters, dt);
        Some(dt)
    }

    /// `emitters` is the whole scene: pools of emitters missing from it are
    /// dropped before stepping.
    fn run_frame(&mut self, emitters: &[Emitter], dt: f32) {
        self.system.retain_scene(emitters);
        self.system.step_all(emitters, dt);
        if let Some(hook) = self.on_frame.as_mut() {
            hook(&self.system, dt);
        }
    }

    /// Stop the clock and drop every pool.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.system.reset();
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    pub fn system(&self) -> &ParticleSystem<R> {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut ParticleSystem<R> {
        &mut self.system
    }
}
