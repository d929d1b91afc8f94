//! Overlay rendering
//!
//! Shapes are drawn by the physics engine; this module only paints the overlay
//! (finish band, labels, fireworks) on a shared 2D surface.

pub mod color;
pub mod overlay;
pub mod surface;

pub use color::{Color, colors};
pub use overlay::OverlayRenderer;
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};
