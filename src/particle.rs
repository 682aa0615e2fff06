//! Live particle state.

use glam::Vec2;

use crate::color::Rgba;
use crate::preset::Envelope;

/// One live particle, owned by its emitter's [`ParticlePool`](crate::ParticlePool).
///
/// The size and color envelopes are captured when the particle spawns. Editing
/// the emitter afterwards only affects particles spawned later.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining life in seconds.
    pub life: f32,
    /// Lifetime at spawn in seconds, always positive.
    pub max_life: f32,
    pub size: Envelope<f32>,
    pub color: Envelope<Rgba>,
}

impl Particle {
    /// Normalized age: 0 at spawn, 1 at death.
    #[inline]
    pub fn progress(&self) -> f32 {
        (1.0 - self.life / self.max_life).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Advance by `dt` seconds: move, apply vertical gravity, age.
    #[inline]
    pub(crate) fn integrate(&mut self, dt: f32, gravity: f32) {
        self.position += self.velocity * dt;
        self.velocity.y += gravity * dt;
        self.life -= dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle() -> Particle {
        Particle {
            position: Vec2::ZERO,
            velocity: Vec2::new(10.0, -20.0),
            life: 2.0,
            max_life: 2.0,
            size: Envelope::new(1.0, 1.0),
            color: Envelope::new(Rgba::WHITE, Rgba::WHITE),
        }
    }

    #[test]
    fn test_progress() {
        let mut p = particle();
        assert_eq!(p.progress(), 0.0);
        p.life = 1.0;
        assert_eq!(p.progress(), 0.5);
        p.life = 0.0;
        assert_eq!(p.progress(), 1.0);
    }

    #[test]
    fn test_integrate() {
        let mut p = particle();
        p.integrate(0.5, 100.0);
        // Position uses the velocity from before gravity is applied
        assert_eq!(p.position, Vec2::new(5.0, -10.0));
        assert_eq!(p.velocity, Vec2::new(10.0, 30.0));
        assert_eq!(p.life, 1.5);
    }

    #[test]
    fn test_gravity_is_vertical_only() {
        let mut p = particle();
        p.integrate(1.0, -50.0);
        assert_eq!(p.velocity.x, 10.0);
    }
}
