//! Seam to the external rigid-body physics engine
//!
//! The engine owns bodies, gravity, collision detection, fixed-step integration
//! and shape rendering. This crate only describes bodies, starts/stops the
//! engine's loops and listens to collision-start notifications.

pub mod headless;

use std::sync::mpsc::Sender;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::renderer::Color;
use crate::sim::RacerId;

pub use headless::HeadlessEngine;

/// Handle to one world inside the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(pub u32);

/// Options for `PhysicsEngine::create_world`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub gravity_y: f32,
    pub width: f32,
    pub height: f32,
    pub background: Color,
}

/// Which boundary wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    Ground,
    Ceiling,
    Left,
    Right,
}

/// Typed form of the label string every body carries
///
/// Serializes as the label string itself (`"ball_3"`, `"finish"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BodyLabel {
    Finish,
    Ball(RacerId),
    Wall(WallSide),
    Peg,
    Bumper,
    Paddle,
}

impl BodyLabel {
    pub const FINISH: &'static str = "finish";
    const BALL_PREFIX: &'static str = "ball_";

    /// Label string handed to the engine
    pub fn as_label(&self) -> String {
        match self {
            BodyLabel::Finish => Self::FINISH.to_string(),
            BodyLabel::Ball(id) => format!("{}{}", Self::BALL_PREFIX, id),
            BodyLabel::Wall(WallSide::Ground) => "wall_ground".to_string(),
            BodyLabel::Wall(WallSide::Ceiling) => "wall_ceiling".to_string(),
            BodyLabel::Wall(WallSide::Left) => "wall_left".to_string(),
            BodyLabel::Wall(WallSide::Right) => "wall_right".to_string(),
            BodyLabel::Peg => "peg".to_string(),
            BodyLabel::Bumper => "bumper".to_string(),
            BodyLabel::Paddle => "paddle".to_string(),
        }
    }

    /// Parse a label reported by the engine; `None` for anything unknown
    /// (including ball ids outside the racer range)
    pub fn parse(label: &str) -> Option<Self> {
        if let Some(id) = label.strip_prefix(Self::BALL_PREFIX) {
            return id.parse().ok().and_then(RacerId::new).map(BodyLabel::Ball);
        }
        match label {
            Self::FINISH => Some(BodyLabel::Finish),
            "wall_ground" => Some(BodyLabel::Wall(WallSide::Ground)),
            "wall_ceiling" => Some(BodyLabel::Wall(WallSide::Ceiling)),
            "wall_left" => Some(BodyLabel::Wall(WallSide::Left)),
            "wall_right" => Some(BodyLabel::Wall(WallSide::Right)),
            "peg" => Some(BodyLabel::Peg),
            "bumper" => Some(BodyLabel::Bumper),
            "paddle" => Some(BodyLabel::Paddle),
            _ => None,
        }
    }

    pub fn racer(&self) -> Option<RacerId> {
        match self {
            BodyLabel::Ball(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<BodyLabel> for String {
    fn from(label: BodyLabel) -> Self {
        label.as_label()
    }
}

impl TryFrom<String> for BodyLabel {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        BodyLabel::parse(&label).ok_or_else(|| format!("unknown body label `{label}`"))
    }
}

/// Body geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle { width: f32, height: f32 },
    Circle { radius: f32 },
}

/// Fill/stroke for the engine's own renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyStyle {
    pub fill: Color,
    pub stroke: Option<(Color, f32)>,
}

impl BodyStyle {
    pub const fn fill(fill: Color) -> Self {
        Self { fill, stroke: None }
    }

    pub const fn outlined(fill: Color, stroke: Color, line_width: f32) -> Self {
        Self {
            fill,
            stroke: Some((stroke, line_width)),
        }
    }
}

/// Everything the engine needs to create one body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    pub label: BodyLabel,
    pub shape: Shape,
    /// Centre position
    pub position: Vec2,
    /// Rotation (radians)
    pub angle: f32,
    pub is_static: bool,
    pub is_sensor: bool,
    pub restitution: f32,
    pub friction: f32,
    pub friction_air: f32,
    /// Initial velocity (dynamic bodies only)
    pub velocity: Vec2,
    pub style: BodyStyle,
}

impl BodyDef {
    /// Static body with the engine's default material
    pub fn fixed(label: BodyLabel, shape: Shape, position: Vec2, style: BodyStyle) -> Self {
        Self {
            label,
            shape,
            position,
            angle: 0.0,
            is_static: true,
            is_sensor: false,
            restitution: 0.0,
            friction: 0.1,
            friction_air: 0.01,
            velocity: Vec2::ZERO,
            style,
        }
    }
}

/// Two bodies that started touching during one step, by label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionPair {
    pub label_a: String,
    pub label_b: String,
}

impl CollisionPair {
    pub fn new(label_a: impl Into<String>, label_b: impl Into<String>) -> Self {
        Self {
            label_a: label_a.into(),
            label_b: label_b.into(),
        }
    }
}

/// All collision-start pairs of one simulation step, in engine order
pub type CollisionBatch = Vec<CollisionPair>;

/// Where the engine delivers collision batches; dropping the receiving end
/// unsubscribes
pub type CollisionSink = Sender<CollisionBatch>;

/// The operations this crate needs from a physics engine
pub trait PhysicsEngine {
    fn create_world(&mut self, config: &WorldConfig) -> Result<WorldId, EngineError>;

    fn add_bodies(&mut self, world: WorldId, bodies: &[BodyDef]) -> Result<(), EngineError>;

    /// Deliver every collision-start batch of `world` to `sink`
    fn subscribe_collisions(&mut self, world: WorldId, sink: CollisionSink)
    -> Result<(), EngineError>;

    /// Shape rendering loop; the host forwards its render-complete notification
    /// to the race controller
    fn start_render(&mut self, world: WorldId) -> Result<(), EngineError>;
    fn stop_render(&mut self, world: WorldId) -> Result<(), EngineError>;

    /// Fixed-step stepping loop, independent of rendering
    fn start_runner(&mut self, world: WorldId) -> Result<(), EngineError>;
    fn stop_runner(&mut self, world: WorldId) -> Result<(), EngineError>;

    /// Release every body and the world itself
    fn clear_world(&mut self, world: WorldId) -> Result<(), EngineError>;
}
