//! Drawing surface abstraction
//!
//! One transparent surface is shared by the static overlay and the fireworks.
//! Both writers run on the same thread; the particle pass always clears first.

use glam::Vec2;

use super::color::Color;
use crate::error::SurfaceError;

/// Minimal 2D immediate-mode drawing target
pub trait DrawSurface {
    /// Surface size in pixels
    fn size(&self) -> Vec2;

    /// Erase everything (fully transparent)
    fn clear(&mut self) -> Result<(), SurfaceError>;

    fn fill_rect(
        &mut self,
        origin: Vec2,
        size: Vec2,
        color: Color,
        alpha: f32,
    ) -> Result<(), SurfaceError>;

    fn fill_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Color,
        alpha: f32,
    ) -> Result<(), SurfaceError>;

    fn fill_text(
        &mut self,
        text: &str,
        at: Vec2,
        font: &str,
        color: Color,
    ) -> Result<(), SurfaceError>;
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect {
        origin: Vec2,
        size: Vec2,
        color: Color,
        alpha: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
        alpha: f32,
    },
    Text {
        text: String,
        at: Vec2,
        font: String,
        color: Color,
    },
}

/// Surface that records draw calls instead of rasterising them
///
/// Used by the headless host and by tests.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    /// Everything drawn since creation (or the last `take`)
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded calls
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Draw calls issued after the most recent clear
    pub fn visible(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Whether the last call was a clear (the surface is blank)
    pub fn is_blank(&self) -> bool {
        self.visible().is_empty()
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::Clear);
        Ok(())
    }

    fn fill_rect(
        &mut self,
        origin: Vec2,
        size: Vec2,
        color: Color,
        alpha: f32,
    ) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::Rect {
            origin,
            size,
            color,
            alpha,
        });
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Color,
        alpha: f32,
    ) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            alpha,
        });
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        at: Vec2,
        font: &str,
        color: Color,
    ) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            font: font.to_string(),
            color,
        });
        Ok(())
    }
}
