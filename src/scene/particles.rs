use glam::Vec3;
use rand::{distributions::Uniform, prelude::Distribution, rngs::StdRng, Rng, SeedableRng};

use crate::math::{Point3, Vec3Ext};

use super::light::Color4;

/// One particle of an emitter's pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Point3,
    /// Units per second.
    pub velocity: Vec3,
    pub color: Color4,
    /// Seconds until respawn.
    pub lifetime: f32,
    pub age: f32,
}

/// Fixed-size particle pool. Particles fly ballistically (no forces) and
/// respawn with fresh random state when their lifetime expires; the pool
/// never grows or shrinks, so a draw of the emitter is one buffer update
/// and one point-primitive draw call.
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    particles: Vec<Particle>,
    rng: StdRng,
    color: Color4,
}

impl ParticleEmitter {
    pub fn new(capacity: usize, color: Color4, seed: u64) -> Self {
        let mut emitter = Self {
            particles: Vec::with_capacity(capacity),
            rng: StdRng::seed_from_u64(seed),
            color,
        };
        for _ in 0..capacity {
            let p = emitter.spawn();
            emitter.particles.push(p);
        }
        // Stagger initial ages so the pool does not respawn in lockstep.
        for i in 0..emitter.particles.len() {
            let lifetime = emitter.particles[i].lifetime;
            emitter.particles[i].age = emitter.rng.gen_range(0.0..lifetime);
        }
        emitter
    }

    fn spawn(&mut self) -> Particle {
        let rng = &mut self.rng;
        let position = Point3::new(
            Uniform::new(-100.0, 100.0).sample(rng),
            Uniform::new(-100.0, 100.0).sample(rng),
            0.0,
        );
        let speed = Uniform::new(2.0f32, 5.0).sample(rng);
        let direction = Vec3::new(
            Uniform::new(-10.0, 10.0).sample(rng),
            Uniform::new(-10.0, 10.0).sample(rng),
            Uniform::new(0.0, 10.0).sample(rng),
        )
        .normalize_or_keep();
        Particle {
            position,
            velocity: direction * speed,
            color: self.color,
            lifetime: Uniform::new(40.0f32, 50.0).sample(rng),
            age: 0.0,
        }
    }

    /// Advance every particle by `dt` seconds, respawning the expired ones.
    pub fn tick(&mut self, dt: f32) {
        for i in 0..self.particles.len() {
            let expired = {
                let p = &mut self.particles[i];
                p.age += dt;
                p.position = p.position + p.velocity * dt;
                p.age > p.lifetime
            };
            if expired {
                self.particles[i] = self.spawn();
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}
