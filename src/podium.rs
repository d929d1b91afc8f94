//! Podium summary for the results screen
//!
//! Top three finishers on stepped blocks, everyone else listed below.

use serde::{Deserialize, Serialize};

use crate::renderer::{Color, colors};
use crate::sim::Standing;

/// Number of podium steps
pub const PODIUM_PLACES: usize = 3;

/// Block heights (pixels) for 1st, 2nd, 3rd
pub const STEP_HEIGHTS: [f32; PODIUM_PLACES] = [220.0, 170.0, 140.0];

/// Label shown on a step nobody reached
pub const EMPTY_LABEL: &str = "—";

/// One podium block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodiumStep {
    /// 1-based place
    pub place: usize,
    pub height: f32,
    pub winner: Option<Standing>,
}

impl PodiumStep {
    /// Winner's colour, grey when the step is empty
    pub fn color(&self) -> Color {
        self.winner.map(|w| w.color).unwrap_or(colors::PODIUM_EMPTY)
    }

    pub fn label(&self) -> String {
        self.winner
            .map(|w| w.racer.display_name())
            .unwrap_or_else(|| EMPTY_LABEL.to_string())
    }
}

/// Results screen contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodiumSummary {
    pub steps: [PodiumStep; PODIUM_PLACES],
    /// Finishers below third place, in order
    pub others: Vec<Standing>,
}

impl PodiumSummary {
    /// Split an ordered ranking into podium steps and the rest
    pub fn from_ranking(ranking: &[Standing]) -> Self {
        let steps = std::array::from_fn(|i| PodiumStep {
            place: i + 1,
            height: STEP_HEIGHTS[i],
            winner: ranking.get(i).copied(),
        });
        let others = ranking.iter().skip(PODIUM_PLACES).copied().collect();
        Self { steps, others }
    }

    /// Winner of the race, if anyone finished
    pub fn champion(&self) -> Option<&Standing> {
        self.steps[0].winner.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.champion().is_none()
    }
}
