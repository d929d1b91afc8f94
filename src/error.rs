//! Error types
//!
//! Setup failures surface from `start`/`reset`. Teardown failures are logged
//! per resource and never leave this crate.

use thiserror::Error;

/// Failures reported by the physics engine seam.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The engine could not allocate a world.
    #[error("failed to create physics world: {0}")]
    WorldCreation(String),
    /// A call referenced a world the engine does not know about.
    #[error("unknown physics world {0}")]
    UnknownWorld(u32),
    /// Bodies were rejected by the engine.
    #[error("failed to add bodies: {0}")]
    Bodies(String),
    /// The render loop could not be started or stopped.
    #[error("render loop error: {0}")]
    Render(String),
    /// The stepping runner could not be started or stopped.
    #[error("runner error: {0}")]
    Runner(String),
    /// Anything else the host engine reports.
    #[error("{0}")]
    Other(String),
}

/// Failures reported by the drawing surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// No element with the requested id.
    #[error("no canvas element with id `{0}`")]
    MissingCanvas(String),
    /// The canvas exists but refused to hand out a 2D context.
    #[error("canvas has no 2d rendering context")]
    MissingContext,
    /// A draw call failed.
    #[error("draw call failed: {0}")]
    Draw(String),
}

/// Setup failures surfaced to the caller of `start`/`reset`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RaceError {
    #[error("arena setup failed: {0}")]
    Engine(#[from] EngineError),
    #[error("drawing surface unavailable: {0}")]
    Surface(#[from] SurfaceError),
    #[error("invalid settings: {0}")]
    Settings(String),
}

impl From<serde_json::Error> for RaceError {
    fn from(e: serde_json::Error) -> Self {
        RaceError::Settings(e.to_string())
    }
}
