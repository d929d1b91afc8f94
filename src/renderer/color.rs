//! Colours for arena bodies, overlay and fireworks

use serde::{Deserialize, Serialize};

/// A colour as the canvas understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Rgb { r: u8, g: u8, b: u8 },
    /// Hue in degrees, saturation/lightness in percent
    Hsl { hue: u16, saturation: u8, lightness: u8 },
}

impl Color {
    /// Build from a `0xRRGGBB` literal
    pub const fn hex(rgb: u32) -> Self {
        Color::Rgb {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    pub const fn hsl(hue: u16, saturation: u8, lightness: u8) -> Self {
        Color::Hsl {
            hue: hue % 360,
            saturation,
            lightness,
        }
    }

    /// CSS colour string (`#rrggbb` or `hsl(h, s%, l%)`)
    pub fn to_css(&self) -> String {
        match *self {
            Color::Rgb { r, g, b } => format!("#{r:02x}{g:02x}{b:02x}"),
            Color::Hsl {
                hue,
                saturation,
                lightness,
            } => format!("hsl({hue}, {saturation}%, {lightness}%)"),
        }
    }

    /// Linear 0-1 RGBA with the given alpha
    pub fn to_rgba(&self, alpha: f32) -> [f32; 4] {
        let (r, g, b) = match *self {
            Color::Rgb { r, g, b } => (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0),
            Color::Hsl {
                hue,
                saturation,
                lightness,
            } => hsl_to_rgb(
                hue as f32,
                saturation as f32 / 100.0,
                lightness as f32 / 100.0,
            ),
        };
        [r, g, b, alpha.clamp(0.0, 1.0)]
    }
}

fn hsl_to_rgb(hue: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = (hue % 360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (r + m, g + m, b + m)
}

/// Colours for arena elements and the overlay
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = Color::hex(0x0f172a);
    pub const WALL: Color = Color::hex(0x1e293b);
    pub const FINISH_SENSOR: Color = Color::hex(0xf8fafc);
    pub const PEG: Color = Color::hex(0x334155);
    pub const PEG_STROKE: Color = Color::hex(0x64748b);
    pub const BUMPER_LEFT: Color = Color::hex(0x0ea5e9);
    pub const BUMPER_RIGHT: Color = Color::hex(0xef4444);
    pub const PADDLE_LEFT: Color = Color::hex(0x16a34a);
    pub const PADDLE_RIGHT: Color = Color::hex(0xf97316);
    pub const BALL_STROKE: Color = Color::hex(0xffffff);

    pub const FINISH_BAND: Color = Color::hex(0x94a3b8);
    pub const LABEL_TEXT: Color = Color::hex(0xe2e8f0);
    /// Empty podium step
    pub const PODIUM_EMPTY: Color = Color::hex(0x475569);

    /// Racer palette, indexed by racer id
    pub const RACERS: [Color; 5] = [
        Color::hex(0xef4444),
        Color::hex(0x3b82f6),
        Color::hex(0x22c55e),
        Color::hex(0xeab308),
        Color::hex(0xa855f7),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_css_round_trip() {
        assert_eq!(colors::RACERS[1].to_css(), "#3b82f6");
    }

    #[test]
    fn hsl_css_format() {
        assert_eq!(Color::hsl(210, 80, 60).to_css(), "hsl(210, 80%, 60%)");
        assert_eq!(Color::hsl(400, 80, 60), Color::hsl(40, 80, 60));
    }

    #[test]
    fn hsl_primary_hues() {
        let red = Color::hsl(0, 100, 50).to_rgba(1.0);
        assert!((red[0] - 1.0).abs() < 1e-5 && red[1].abs() < 1e-5 && red[2].abs() < 1e-5);
        let green = Color::hsl(120, 100, 50).to_rgba(1.0);
        assert!((green[1] - 1.0).abs() < 1e-5 && green[0].abs() < 1e-5);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(colors::WALL.to_rgba(-0.5)[3], 0.0);
        assert_eq!(colors::WALL.to_rgba(1.5)[3], 1.0);
    }
}
