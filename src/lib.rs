//! Peg Race - five balls, one finish line
//!
//! Core modules:
//! - `sim`: Race logic (arena layout, finish ranking, lifecycle, fireworks)
//! - `engine`: Seam to the external rigid-body physics engine
//! - `renderer`: Overlay drawing on a shared 2D surface
//! - `platform`: Browser/native clocks and canvas bindings
//! - `settings`: Player preferences
//! - `podium`: Podium summary for the results screen

pub mod engine;
pub mod error;
pub mod platform;
pub mod podium;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{EngineError, RaceError, SurfaceError};
pub use podium::PodiumSummary;
pub use settings::Settings;

use glam::Vec2;

/// Race configuration constants
pub mod consts {
    /// Arena dimensions (pixels)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Finish line sits this far above the floor
    pub const FINISH_OFFSET: f32 = 40.0;
    pub const FINISH_Y: f32 = ARENA_HEIGHT - FINISH_OFFSET;

    /// World gravity handed to the physics engine
    pub const GRAVITY_Y: f32 = 1.1;

    /// Number of racing balls
    pub const RACER_COUNT: usize = 5;

    /// Delay between the last finish and the podium screen
    pub const PODIUM_DELAY_MS: u64 = 1300;

    /// Fireworks
    pub const BURST_PARTICLES: usize = 120;
    pub const PARTICLE_SPEED_MIN: f32 = 2.0;
    pub const PARTICLE_SPEED_MAX: f32 = 5.0;
    pub const PARTICLE_LIFE_MIN: f32 = 35.0;
    pub const PARTICLE_LIFE_MAX: f32 = 70.0;
    /// Downward acceleration (units/frame²)
    pub const PARTICLE_GRAVITY: f32 = 0.05;
    pub const PARTICLE_RADIUS: f32 = 2.0;
    pub const PARTICLE_SATURATION: u8 = 80;
    pub const PARTICLE_LIGHTNESS: u8 = 60;

    /// Celebration origin is kept this far from the side walls
    pub const CELEBRATION_MARGIN: f32 = 120.0;
    /// Celebration origin height above the finish line
    pub const CELEBRATION_RISE: f32 = 60.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Point the first-finish fireworks are launched from
///
/// Horizontally centred on the finish line, clamped away from the walls,
/// and lifted a little above it.
pub fn celebration_point(arena_width: f32, finish_y: f32) -> Vec2 {
    let margin = consts::CELEBRATION_MARGIN.min(arena_width / 2.0);
    let x = (arena_width / 2.0).clamp(margin, arena_width - margin);
    Vec2::new(x, finish_y - consts::CELEBRATION_RISE)
}
