//! Overlay drawn above the physics engine's canvas
//!
//! The surface keeps its pixels between passes, so every pass repaints the
//! whole frame: clear, finish band and labels, then the current sparks. The
//! engine's render-complete hook and the fireworks loop both call it; whichever
//! runs last in a frame wins.

use glam::Vec2;

use super::color::colors;
use super::surface::DrawSurface;
use crate::consts::PARTICLE_RADIUS;
use crate::error::SurfaceError;
use crate::sim::Particle;

pub const LABEL_FONT: &str = "14px ui-sans-serif, system-ui";
pub const FINISH_BAND_ALPHA: f32 = 0.4;
pub const FINISH_BAND_HEIGHT: f32 = 16.0;
/// Left margin of the band and labels
pub const OVERLAY_INSET: f32 = 20.0;
pub const START_LABEL_Y: f32 = 24.0;
/// Finish label baseline sits this far above the finish line
pub const FINISH_LABEL_RISE: f32 = 12.0;

/// Draws the finish band, START/FINISH labels and firework sparks
#[derive(Debug, Clone, Copy)]
pub struct OverlayRenderer {
    width: f32,
    finish_y: f32,
}

impl OverlayRenderer {
    pub fn new(width: f32, finish_y: f32) -> Self {
        Self { width, finish_y }
    }

    /// Repaint one whole overlay frame
    ///
    /// The surface is persistent, so every pass clears first: the finish band
    /// and labels (when `with_static`), then one dot per spark at its alpha.
    pub fn draw_frame<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        with_static: bool,
        particles: &[Particle],
    ) -> Result<(), SurfaceError> {
        surface.clear()?;
        if with_static {
            self.paint_static(surface)?;
        }
        for particle in particles {
            surface.fill_circle(particle.pos, PARTICLE_RADIUS, particle.color, particle.alpha())?;
        }
        Ok(())
    }

    /// Finish band and labels only
    pub fn draw_static<S: DrawSurface + ?Sized>(&self, surface: &mut S) -> Result<(), SurfaceError> {
        self.draw_frame(surface, true, &[])
    }

    /// Sparks only
    pub fn draw_particles<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        particles: &[Particle],
    ) -> Result<(), SurfaceError> {
        self.draw_frame(surface, false, particles)
    }

    fn paint_static<S: DrawSurface + ?Sized>(&self, surface: &mut S) -> Result<(), SurfaceError> {
        surface.fill_rect(
            Vec2::new(OVERLAY_INSET, self.finish_y - FINISH_BAND_HEIGHT / 2.0),
            Vec2::new(self.width - 2.0 * OVERLAY_INSET, FINISH_BAND_HEIGHT),
            colors::FINISH_BAND,
            FINISH_BAND_ALPHA,
        )?;
        surface.fill_text(
            "START",
            Vec2::new(OVERLAY_INSET, START_LABEL_Y),
            LABEL_FONT,
            colors::LABEL_TEXT,
        )?;
        surface.fill_text(
            "FINISH",
            Vec2::new(OVERLAY_INSET, self.finish_y - FINISH_LABEL_RISE),
            LABEL_FONT,
            colors::LABEL_TEXT,
        )
    }
}
