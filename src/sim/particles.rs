//! First-finish fireworks
//!
//! One radial burst, integrated once per animation frame until every particle
//! has burned out. Frame-based (not dt-based): one call to `tick` is one frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::polar_to_cartesian;
use crate::renderer::Color;

/// A single firework spark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in frames
    pub life: f32,
    pub color: Color,
}

impl Particle {
    /// Advance one frame: move, fall, age
    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.vel.y += PARTICLE_GRAVITY;
        self.life -= 1.0;
    }

    /// Render opacity, fading to zero and never below it
    pub fn alpha(&self) -> f32 {
        (self.life / PARTICLE_LIFE_MAX).max(0.0)
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Drives one burst at a time
///
/// `running` is the loop's stop flag: the host keeps requesting frames while it
/// is set, and `stop` clears it for cancellation.
#[derive(Debug, Clone, Default)]
pub struct ParticleSimulator {
    particles: Vec<Particle>,
    running: bool,
    frames: u32,
}

impl ParticleSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a full burst of sparks evenly spaced around `origin`
    pub fn burst<R: Rng + ?Sized>(&mut self, origin: Vec2, rng: &mut R) {
        let particles = (0..BURST_PARTICLES).map(|i| {
            let angle = std::f32::consts::TAU * (i as f32 / BURST_PARTICLES as f32);
            let speed = rng.random_range(PARTICLE_SPEED_MIN..PARTICLE_SPEED_MAX);
            let hue = rng.random_range(0..360u16);
            Particle {
                pos: origin,
                vel: polar_to_cartesian(speed, angle),
                life: rng.random_range(PARTICLE_LIFE_MIN..PARTICLE_LIFE_MAX),
                color: Color::hsl(hue, PARTICLE_SATURATION, PARTICLE_LIGHTNESS),
            }
        });
        self.emit(particles);
    }

    /// Start a loop over an explicit particle set (replaces any previous one)
    pub fn emit(&mut self, particles: impl IntoIterator<Item = Particle>) {
        self.particles = particles.into_iter().collect();
        self.frames = 0;
        self.running = self.has_live_particles();
        log::debug!("Fireworks: {} particles", self.particles.len());
    }

    /// Advance one frame and return the particles to draw this frame
    ///
    /// Sparks that expired on the previous frame are dropped first, so a spark
    /// whose life just reached zero is still returned once (at zero alpha).
    /// When nothing is left alive the loop stops itself.
    pub fn tick(&mut self) -> &[Particle] {
        if !self.running {
            return &[];
        }
        self.particles.retain(Particle::is_alive);
        for particle in self.particles.iter_mut() {
            particle.advance();
        }
        self.frames += 1;
        if !self.has_live_particles() {
            self.running = false;
            log::debug!("Fireworks burned out after {} frames", self.frames);
        }
        &self.particles
    }

    /// Cancel the loop and forget every particle
    pub fn stop(&mut self) {
        self.running = false;
        self.particles.clear();
        self.frames = 0;
    }

    /// Whether the host should keep requesting frames
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_live_particles(&self) -> bool {
        self.particles.iter().any(Particle::is_alive)
    }

    /// Particles returned by the last `tick` (empty once stopped)
    pub fn frame(&self) -> &[Particle] {
        &self.particles
    }

    /// The live set (life > 0)
    pub fn live(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Frames ticked in the current burst
    pub fn frames(&self) -> u32 {
        self.frames
    }
}
