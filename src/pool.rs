//! Bounded per-emitter particle storage and the simulation step.
//!
//! Each emitter gets one [`ParticlePool`]. A step runs in a fixed order:
//!
//! 1. **Clear** everything if the emitter is disabled, then stop.
//! 2. **Spawn** `rate * dt` particles, rounding the fractional part
//!    stochastically so the long-run average matches the configured rate.
//! 3. **Integrate** every particle, including the ones just spawned, and drop
//!    the ones whose life ran out.
//! 4. **Evict** the oldest particles until the pool is back under its cap.
//!
//! A step never builds more than `capacity` new particles. When the rate asks
//! for more, the oldest of that step's spawns are counted as evicted without
//! being created.
//!
//! Particles are kept in spawn order, so eviction is a pop from the front.

use std::collections::VecDeque;

use glam::Vec2;
use log::{trace, warn};
use rand::Rng;

use crate::color::Rgba;
use crate::emitter::Emitter;
use crate::particle::Particle;
use crate::preset::{Envelope, ValueRange};
use crate::visuals::{self, ParticleShape, VisualAttributes};

/// Maximum live particles per emitter.
pub const MAX_PARTICLES: usize = 500;

/// Shortest lifetime a release build clamps an invalid range to, in seconds.
pub const MIN_LIFETIME: f32 = 1e-3;

/// Live particles of a single emitter.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    /// Oldest first.
    particles: VecDeque<Particle>,
    capacity: usize,
    total_spawned: u64,
    total_evicted: u64,
    /// Set once an invalid lifetime range has been reported.
    lifetime_warned: bool,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticlePool {
    /// An empty pool capped at [`MAX_PARTICLES`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_PARTICLES)
    }

    /// An empty pool capped at `capacity` particles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(capacity.min(MAX_PARTICLES)),
            capacity,
            total_spawned: 0,
            total_evicted: 0,
            lifetime_warned: false,
        }
    }

    /// Advance the pool by `dt` seconds using `emitter`'s current settings.
    ///
    /// Negative or non-finite `dt` is treated as zero.
    pub fn step<R: Rng + ?Sized>(&mut self, emitter: &Emitter, dt: f32, rng: &mut R) {
        if !emitter.enabled {
            self.particles.clear();
            return;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let count = spawn_count(emitter.emit_rate * dt, rng);
        // Only the newest `capacity` spawns could outlive eviction; the rest
        // are counted but never built.
        let built = count.min(self.capacity);
        let skipped = count - built;
        if built > 0 {
            self.spawn(emitter, built, rng);
        }
        self.total_spawned = self.total_spawned.saturating_add(count as u64);
        self.total_evicted = self.total_evicted.saturating_add(skipped as u64);

        let gravity = emitter.gravity;
        for p in self.particles.iter_mut() {
            p.integrate(dt, gravity);
        }
        self.particles.retain(Particle::is_alive);

        let excess = self.particles.len().saturating_sub(self.capacity);
        if excess > 0 {
            self.particles.drain(..excess);
            self.total_evicted = self.total_evicted.saturating_add(excess as u64);
        }

        trace!(
            "{}: dt={:.4} spawned={} live={} evicted={}",
            emitter.id,
            dt,
            count,
            self.particles.len(),
            excess + skipped
        );
    }

    fn spawn<R: Rng + ?Sized>(&mut self, emitter: &Emitter, count: usize, rng: &mut R) {
        let lifetime = self.checked_lifetime(emitter);
        let (min, max) = emitter.spawn_rect();
        let color = Envelope::new(
            Rgba::from_hex(&emitter.color.start),
            Rgba::from_hex(&emitter.color.end),
        );

        for _ in 0..count {
            let position = Vec2::new(
                ValueRange::new(min.x, max.x).sample_unit(rng.gen()),
                ValueRange::new(min.y, max.y).sample_unit(rng.gen()),
            );
            let angle = emitter.direction.sample_unit(rng.gen()).to_radians();
            let speed = emitter.speed.sample_unit(rng.gen());
            let life = lifetime.sample_unit(rng.gen());

            self.particles.push_back(Particle {
                position,
                velocity: Vec2::new(angle.sin(), -angle.cos()) * speed,
                life,
                max_life: life,
                size: emitter.size,
                color,
            });
        }
    }

    /// The emitter's lifetime range, which must satisfy `0 < min <= max`.
    ///
    /// Debug builds panic on a violation. Release builds clamp to the nearest
    /// valid range and warn once per pool.
    fn checked_lifetime(&mut self, emitter: &Emitter) -> ValueRange {
        let ValueRange { min, max } = emitter.lifetime;
        let valid = min > 0.0 && min <= max && max.is_finite();
        debug_assert!(
            valid,
            "{}: invalid lifetime range {:?}",
            emitter.id, emitter.lifetime
        );
        if valid {
            return emitter.lifetime;
        }

        if !self.lifetime_warned {
            warn!(
                "{}: invalid lifetime range {:?}, clamping",
                emitter.id, emitter.lifetime
            );
            self.lifetime_warned = true;
        }
        let min = if min.is_finite() { min.max(MIN_LIFETIME) } else { MIN_LIFETIME };
        let max = if max.is_finite() { max.max(min) } else { min };
        ValueRange::new(min, max)
    }

    /// Drop every live particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Live particles, oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Particle> + '_ {
        self.particles.iter()
    }

    /// Visual attributes of every live particle, oldest first.
    pub fn resolved(&self, shape: ParticleShape) -> impl ExactSizeIterator<Item = VisualAttributes> + '_ {
        self.particles.iter().map(move |p| visuals::resolve(p, shape))
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Particles spawned over the pool's lifetime.
    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Particles removed by the cap over the pool's lifetime.
    pub fn total_evicted(&self) -> u64 {
        self.total_evicted
    }
}

/// Whole part of `expected`, plus one with probability equal to its
/// fractional part.
fn spawn_count<R: Rng + ?Sized>(expected: f32, rng: &mut R) -> usize {
    if !expected.is_finite() || expected <= 0.0 {
        return 0;
    }
    let whole = expected.floor();
    let fraction = expected - whole;
    let extra = fraction > 0.0 && rng.gen::<f32>() < fraction;
    whole as usize + usize::from(extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::EmitterId;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn emitter() -> Emitter {
        Emitter {
            emit_rate: 100.0,
            lifetime: ValueRange::constant(0.5),
            speed: ValueRange::constant(10.0),
            direction: ValueRange::constant(0.0),
            gravity: 0.0,
            ..Emitter::new(EmitterId(1), "test", Vec2::new(50.0, 50.0))
        }
    }

    #[test]
    fn test_spawn_count_whole() {
        let mut rng = rng();
        assert_eq!(spawn_count(10.0, &mut rng), 10);
        assert_eq!(spawn_count(0.0, &mut rng), 0);
        assert_eq!(spawn_count(-3.0, &mut rng), 0);
        assert_eq!(spawn_count(f32::NAN, &mut rng), 0);
        assert_eq!(spawn_count(f32::INFINITY, &mut rng), 0);
    }

    #[test]
    fn test_spawn_count_fraction_averages_out() {
        let mut rng = rng();
        let total: usize = (0..10_000).map(|_| spawn_count(0.25, &mut rng)).sum();
        // Expected 2500
        assert!((2300..2700).contains(&total), "total = {total}");
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let e = emitter();
        pool.step(&e, 0.1, &mut rng);
        let before: Vec<Particle> = pool.iter().cloned().collect();

        pool.step(&e, 0.0, &mut rng);
        let after: Vec<Particle> = pool.iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_spawned_particles_are_integrated_once() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        pool.step(&emitter(), 0.1, &mut rng);

        assert_eq!(pool.len(), 10);
        for p in pool.iter() {
            assert_eq!(p.max_life, 0.5);
            assert!((p.life - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_spawn_inside_rect() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let e = Emitter {
            speed: ValueRange::constant(0.0),
            lifetime: ValueRange::constant(10.0),
            ..emitter().with_area(40.0, 10.0)
        };
        pool.step(&e, 0.5, &mut rng);
        let (min, max) = e.spawn_rect();
        assert_eq!(pool.len(), 50);
        for p in pool.iter() {
            assert!(p.position.x >= min.x && p.position.x <= max.x);
            assert!(p.position.y >= min.y && p.position.y <= max.y);
        }
    }

    #[test]
    fn test_direction_zero_points_up() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        pool.step(&emitter().with_area(0.0, 0.0), 0.05, &mut rng);
        let p = pool.iter().next().unwrap();
        assert!(p.velocity.x.abs() < 1e-4);
        assert!((p.velocity.y + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_direction_ninety_points_right() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let e = Emitter {
            direction: ValueRange::constant(90.0),
            ..emitter()
        };
        pool.step(&e, 0.05, &mut rng);
        let p = pool.iter().next().unwrap();
        assert!((p.velocity.x - 10.0).abs() < 1e-4);
        assert!(p.velocity.y.abs() < 1e-4);
    }

    #[test]
    fn test_particles_die() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let mut e = emitter();
        pool.step(&e, 0.1, &mut rng);
        assert_eq!(pool.len(), 10);

        e.emit_rate = 0.0;
        pool.step(&e, 0.3, &mut rng);
        assert_eq!(pool.len(), 10);
        pool.step(&e, 0.2, &mut rng);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let mut e = Emitter {
            lifetime: ValueRange::constant(100.0),
            emit_rate: 400.0,
            ..emitter()
        };
        pool.step(&e, 1.0, &mut rng);
        assert_eq!(pool.len(), 400);
        let survivor_life = pool.iter().next().unwrap().life;

        e.emit_rate = 200.0;
        pool.step(&e, 1.0, &mut rng);
        assert_eq!(pool.len(), MAX_PARTICLES);
        assert_eq!(pool.total_spawned(), 600);
        assert_eq!(pool.total_evicted(), 100);
        // Oldest remaining are from the first batch, aged two steps
        let oldest = pool.iter().next().unwrap();
        assert!((oldest.life - (survivor_life - 1.0)).abs() < 1e-4);
        // Newest are from the second batch, aged one step
        let newest = pool.iter().last().unwrap();
        assert!((newest.life - 99.0).abs() < 1e-4);
    }

    #[test]
    fn test_custom_capacity() {
        let mut rng = rng();
        let mut pool = ParticlePool::with_capacity(16);
        pool.step(&emitter(), 0.4, &mut rng);
        assert_eq!(pool.len(), 16);
        assert_eq!(pool.capacity(), 16);
    }

    #[test]
    fn test_huge_rate_builds_at_most_capacity() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let e = Emitter {
            emit_rate: 4e7,
            ..emitter()
        };
        pool.step(&e, 0.25, &mut rng);
        assert_eq!(pool.len(), MAX_PARTICLES);
        assert_eq!(pool.total_spawned(), 10_000_000);
        assert_eq!(pool.total_evicted(), 10_000_000 - MAX_PARTICLES as u64);
        for p in pool.iter() {
            assert!((p.life - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_saturating_rate_degrades_safely() {
        let mut rng = rng();
        let mut pool = ParticlePool::with_capacity(8);
        let e = Emitter {
            emit_rate: 1e30,
            ..emitter()
        };
        for _ in 0..3 {
            pool.step(&e, 0.1, &mut rng);
            assert_eq!(pool.len(), 8);
        }
        assert!(pool.total_spawned() >= pool.total_evicted());
    }

    #[test]
    fn test_disabled_clears() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let mut e = emitter();
        pool.step(&e, 0.1, &mut rng);
        assert!(!pool.is_empty());

        e.enabled = false;
        pool.step(&e, 0.1, &mut rng);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_gravity_accelerates_downward() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let e = Emitter {
            speed: ValueRange::constant(0.0),
            gravity: 100.0,
            lifetime: ValueRange::constant(5.0),
            ..emitter()
        };
        pool.step(&e, 0.05, &mut rng);
        assert_eq!(pool.len(), 5);
        let mut stepped = e.clone();
        stepped.emit_rate = 0.0;
        pool.step(&stepped, 0.5, &mut rng);
        for p in pool.iter() {
            assert_eq!(p.velocity.x, 0.0);
            assert!((p.velocity.y - 55.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_appearance_frozen_at_spawn() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let mut e = emitter();
        e.lifetime = ValueRange::constant(10.0);
        pool.step(&e, 0.1, &mut rng);

        e.size = Envelope::new(100.0, 100.0);
        e.color = Envelope::new("#00ff00".into(), "#00ff00".into());
        e.emit_rate = 0.0;
        pool.step(&e, 0.1, &mut rng);

        let original = emitter();
        for p in pool.iter() {
            assert_eq!(p.size, original.size);
            assert_eq!(p.color.start, Rgba::from_hex(&original.color.start));
        }
    }

    #[test]
    fn test_negative_dt_treated_as_zero() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        pool.step(&emitter(), -1.0, &mut rng);
        assert!(pool.is_empty());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "invalid lifetime range")]
    fn test_invalid_lifetime_panics_in_debug() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let e = Emitter {
            lifetime: ValueRange::new(2.0, 1.0),
            ..emitter()
        };
        pool.step(&e, 0.1, &mut rng);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_invalid_lifetime_clamped_in_release() {
        let mut rng = rng();
        let mut pool = ParticlePool::new();
        let e = Emitter {
            lifetime: ValueRange::new(0.0, -1.0),
            ..emitter()
        };
        pool.step(&e, 0.1, &mut rng);
        // Clamped to MIN_LIFETIME, shorter than the step
        assert!(pool.is_empty());
        assert_eq!(pool.total_spawned(), 10);
    }
}
