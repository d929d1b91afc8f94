//! Arena layout
//!
//! Builds the fixed track (walls, finish sensor, pegs, bumpers, paddles) and
//! the five balls. Only the balls' launch velocities are random.

use glam::Vec2;
use rand::Rng;

use super::state::RacerId;
use crate::consts::*;
use crate::engine::{BodyDef, BodyLabel, BodyStyle, Shape, WallSide, WorldConfig};
use crate::renderer::{Color, colors};

pub const WALL_THICKNESS: f32 = 50.0;
pub const FINISH_HEIGHT: f32 = 6.0;
/// Finish sensor inset from each side wall
pub const FINISH_INSET: f32 = 20.0;

pub const PEG_ROWS: usize = 5;
pub const PEG_COLS: usize = 7;
pub const PEG_RADIUS: f32 = 7.0;
pub const PEG_TOP: f32 = 140.0;
pub const PEG_ROW_SPACING: f32 = 70.0;
/// Horizontal margin of the first/last peg column
pub const PEG_MARGIN: f32 = 60.0;
pub const PEG_RESTITUTION: f32 = 0.9;

pub const BUMPER_RADIUS: f32 = 24.0;
/// Above 1: bumpers add energy
pub const BUMPER_RESTITUTION: f32 = 1.2;

pub const PADDLE_LENGTH: f32 = 160.0;
pub const PADDLE_THICKNESS: f32 = 12.0;

pub const BALL_RADIUS: f32 = 12.0;
pub const BALL_START_Y: f32 = 60.0;
pub const BALL_SPACING: f32 = 120.0;
pub const BALL_RESTITUTION: f32 = 0.85;
pub const BALL_FRICTION: f32 = 0.01;
pub const BALL_FRICTION_AIR: f32 = 0.002;

/// Everything one race hands to the physics engine
#[derive(Debug, Clone)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub finish_y: f32,
    /// Static track followed by the balls, in insertion order
    pub bodies: Vec<BodyDef>,
}

impl Arena {
    /// Build the standard 800×600 track
    pub fn build<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (width, height) = (ARENA_WIDTH, ARENA_HEIGHT);
        let finish_y = FINISH_Y;

        let mut bodies = walls(width, height);
        bodies.push(finish_sensor(width, finish_y));
        bodies.extend(peg_field(width));
        bodies.extend(bumpers(width, height));
        bodies.extend(paddles(width, height));
        bodies.extend(RacerId::all().map(|id| ball(id, rng)));

        log::debug!("Arena built: {} bodies", bodies.len());

        Self {
            width,
            height,
            finish_y,
            bodies,
        }
    }

    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            gravity_y: GRAVITY_Y,
            width: self.width,
            height: self.height,
            background: colors::BACKGROUND,
        }
    }

    /// Bodies carrying the given label kind
    pub fn bodies_where(&self, pred: impl Fn(&BodyLabel) -> bool) -> impl Iterator<Item = &BodyDef> {
        self.bodies.iter().filter(move |b| pred(&b.label))
    }

    pub fn balls(&self) -> impl Iterator<Item = &BodyDef> {
        self.bodies_where(|l| matches!(l, BodyLabel::Ball(_)))
    }

    pub fn finish(&self) -> Option<&BodyDef> {
        self.bodies.iter().find(|b| b.label == BodyLabel::Finish)
    }
}

fn walls(width: f32, height: f32) -> Vec<BodyDef> {
    let t = WALL_THICKNESS;
    let style = BodyStyle::fill(colors::WALL);
    let horizontal = Shape::Rectangle {
        width,
        height: t,
    };
    let vertical = Shape::Rectangle { width: t, height };
    vec![
        BodyDef::fixed(
            BodyLabel::Wall(WallSide::Ground),
            horizontal,
            Vec2::new(width / 2.0, height + t / 2.0),
            style,
        ),
        BodyDef::fixed(
            BodyLabel::Wall(WallSide::Ceiling),
            horizontal,
            Vec2::new(width / 2.0, -t / 2.0),
            style,
        ),
        BodyDef::fixed(
            BodyLabel::Wall(WallSide::Left),
            vertical,
            Vec2::new(-t / 2.0, height / 2.0),
            style,
        ),
        BodyDef::fixed(
            BodyLabel::Wall(WallSide::Right),
            vertical,
            Vec2::new(width + t / 2.0, height / 2.0),
            style,
        ),
    ]
}

fn finish_sensor(width: f32, finish_y: f32) -> BodyDef {
    BodyDef {
        is_sensor: true,
        ..BodyDef::fixed(
            BodyLabel::Finish,
            Shape::Rectangle {
                width: width - 2.0 * FINISH_INSET,
                height: FINISH_HEIGHT,
            },
            Vec2::new(width / 2.0, finish_y),
            BodyStyle::fill(colors::FINISH_SENSOR),
        )
    }
}

/// Staggered grid: odd rows shift half a column right
fn peg_field(width: f32) -> Vec<BodyDef> {
    let spacing_x = (width - 2.0 * PEG_MARGIN) / (PEG_COLS as f32 - 1.0);
    let style = BodyStyle::outlined(colors::PEG, colors::PEG_STROKE, 1.0);

    let mut pegs = Vec::with_capacity(PEG_ROWS * PEG_COLS);
    for row in 0..PEG_ROWS {
        let stagger = if row % 2 == 1 { spacing_x / 2.0 } else { 0.0 };
        let y = PEG_TOP + row as f32 * PEG_ROW_SPACING;
        for col in 0..PEG_COLS {
            let x = PEG_MARGIN + col as f32 * spacing_x + stagger;
            pegs.push(BodyDef {
                restitution: PEG_RESTITUTION,
                friction: 0.0,
                ..BodyDef::fixed(
                    BodyLabel::Peg,
                    Shape::Circle { radius: PEG_RADIUS },
                    Vec2::new(x, y),
                    style,
                )
            });
        }
    }
    pegs
}

fn bumpers(width: f32, height: f32) -> [BodyDef; 2] {
    let bumper = |pos: Vec2, fill: Color| BodyDef {
        restitution: BUMPER_RESTITUTION,
        ..BodyDef::fixed(
            BodyLabel::Bumper,
            Shape::Circle {
                radius: BUMPER_RADIUS,
            },
            pos,
            BodyStyle::fill(fill),
        )
    };
    [
        bumper(Vec2::new(width * 0.25, height * 0.55), colors::BUMPER_LEFT),
        bumper(Vec2::new(width * 0.75, height * 0.5), colors::BUMPER_RIGHT),
    ]
}

/// Tilted in opposite directions to funnel balls back toward the middle
fn paddles(width: f32, height: f32) -> [BodyDef; 2] {
    let paddle = |pos: Vec2, angle: f32, fill: Color| BodyDef {
        angle,
        ..BodyDef::fixed(
            BodyLabel::Paddle,
            Shape::Rectangle {
                width: PADDLE_LENGTH,
                height: PADDLE_THICKNESS,
            },
            pos,
            BodyStyle::fill(fill),
        )
    };
    [
        paddle(Vec2::new(width * 0.2, height * 0.75), -0.4, colors::PADDLE_LEFT),
        paddle(Vec2::new(width * 0.8, height * 0.78), 0.45, colors::PADDLE_RIGHT),
    ]
}

fn ball<R: Rng + ?Sized>(id: RacerId, rng: &mut R) -> BodyDef {
    let x = BALL_SPACING + id.index() as f32 * BALL_SPACING;
    // Small random kick so identical balls don't fall in lockstep
    let velocity = Vec2::new(rng.random_range(-2.0..2.0), rng.random_range(1.0..3.0));
    BodyDef {
        label: BodyLabel::Ball(id),
        shape: Shape::Circle {
            radius: BALL_RADIUS,
        },
        position: Vec2::new(x, BALL_START_Y),
        angle: 0.0,
        is_static: false,
        is_sensor: false,
        restitution: BALL_RESTITUTION,
        friction: BALL_FRICTION,
        friction_air: BALL_FRICTION_AIR,
        velocity,
        style: BodyStyle::outlined(id.color(), colors::BALL_STROKE, 1.5),
    }
}
