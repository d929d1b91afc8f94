//! Race simulation
//!
//! Arena layout, finish tracking, fireworks and the race lifecycle. Nothing in
//! here touches the browser; hosts plug in a physics engine, a drawing surface
//! and a clock.
//! - Seeded RNG only (arena launch velocities, particle speeds/hues/lives)
//! - Frame-stepped particles
//! - Append-only ranking per race

pub mod arena;
pub mod finish;
pub mod particles;
pub mod race;
pub mod state;

pub use arena::Arena;
pub use finish::FinishTracker;
pub use particles::{Particle, ParticleSimulator};
pub use race::{RaceController, RaceSession};
pub use state::{FinishRecord, RaceEvent, RacePhase, RaceSnapshot, RacerId, Standing};
