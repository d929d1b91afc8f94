//! Race state and core types
//!
//! Everything the presentation shell can observe lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::RACER_COUNT;
use crate::renderer::{Color, colors};

/// Stable identity of one ball (0..RACER_COUNT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RacerId(u8);

impl RacerId {
    /// `None` when out of range
    pub fn new(id: u8) -> Option<Self> {
        ((id as usize) < RACER_COUNT).then_some(Self(id))
    }

    /// Every racer in id order
    pub fn all() -> impl Iterator<Item = RacerId> {
        (0..RACER_COUNT as u8).map(RacerId)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Palette colour keyed by id
    pub fn color(self) -> Color {
        colors::RACERS[self.index()]
    }

    /// Human-facing name ("Ball 1" for id 0)
    pub fn display_name(self) -> String {
        format!("Ball {}", self.0 + 1)
    }
}

impl std::fmt::Display for RacerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A racer crossing the finish sensor for the first time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishRecord {
    pub racer: RacerId,
    /// Monotonic clock reading when the crossing was observed
    pub timestamp_ms: f64,
}

/// Lifecycle phase of the current race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Nothing built yet (or the last build failed)
    Idle,
    /// Tearing down the previous arena and constructing the next one
    Building,
    /// Balls are dropping; fireworks may be playing on top
    Running,
    /// Every ball crossed the line; podium pending
    AllFinished,
    /// Results screen
    Podium,
}

/// One row of the ranking as the shell shows it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based finishing position
    pub place: usize,
    pub racer: RacerId,
    pub color: Color,
    pub timestamp_ms: f64,
}

impl Standing {
    pub fn from_record(place: usize, record: &FinishRecord) -> Self {
        Self {
            place,
            racer: record.racer,
            color: record.racer.color(),
            timestamp_ms: record.timestamp_ms,
        }
    }
}

/// Notifications published by the race controller, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    /// A new arena is being built; the ranking is empty again
    Building,
    /// The arena is live
    Running,
    /// A racer finished (appended to the ranking)
    Finished(Standing),
    /// First finisher fireworks launched from this point
    Celebration { origin: Vec2 },
    /// Every racer finished; podium scheduled after the delay
    AllFinished,
    /// The podium screen should be visible
    PodiumShown,
    /// The arena was released
    TornDown,
}

/// Compact observable state for the presentation shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub phase: RacePhase,
    pub ranking: Vec<Standing>,
    pub podium_visible: bool,
    pub celebrating: bool,
    pub live_particles: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn racer_ids_are_bounded() {
        assert!(RacerId::new(4).is_some());
        assert!(RacerId::new(5).is_none());
        assert_eq!(RacerId::all().count(), RACER_COUNT);
    }

    #[test]
    fn racer_colour_and_name() {
        let id = RacerId::new(2).unwrap();
        assert_eq!(id.color().to_css(), "#22c55e");
        assert_eq!(id.display_name(), "Ball 3");
    }

    #[test]
    fn snapshot_serializes() {
        let id = RacerId::new(0).unwrap();
        let snapshot = RaceSnapshot {
            phase: RacePhase::Running,
            ranking: vec![Standing::from_record(
                1,
                &FinishRecord {
                    racer: id,
                    timestamp_ms: 12.5,
                },
            )],
            podium_visible: false,
            celebrating: true,
            live_particles: 120,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"phase\":\"Running\""));
        assert!(json.contains("\"racer\":0"));
    }
}
