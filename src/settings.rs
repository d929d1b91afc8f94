//! Race settings and preferences
//!
//! Handed over by the host as JSON (or built in code). Track layout is not
//! configurable; see `consts` for the fixed arena.

use serde::{Deserialize, Serialize};

use crate::consts::PODIUM_DELAY_MS;
use crate::error::RaceError;

/// Race settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed RNG seed (ball launch velocities, fireworks). Random when unset.
    pub seed: Option<u64>,
    /// Delay between the last finish and the podium screen (milliseconds)
    pub podium_delay_ms: u64,

    // === Visual Effects ===
    /// First-finish fireworks
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (suppresses fireworks)
    pub reduced_motion: bool,

    // === Diagnostics ===
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`, `off`)
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            podium_delay_ms: PODIUM_DELAY_MS,
            particles: true,
            reduced_motion: false,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, RaceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder-style seed override
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether the first-finish fireworks should play (respects reduced_motion)
    pub fn effective_celebration(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Parsed log level, `Info` when the name is not recognised
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"seed": 42}"#).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.podium_delay_ms, 1300);
        assert!(settings.particles);
    }

    #[test]
    fn json_round_trip() {
        let settings = Settings::default().with_seed(7);
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn malformed_json_is_a_settings_error() {
        let err = Settings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, RaceError::Settings(_)));
    }

    #[test]
    fn reduced_motion_disables_celebration() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_celebration());
        assert!(Settings::default().effective_celebration());
    }

    #[test]
    fn level_filter_parsing() {
        let mut settings = Settings::default();
        settings.log_level = "debug".into();
        assert_eq!(settings.level_filter(), log::LevelFilter::Debug);
        settings.log_level = "loud".into();
        assert_eq!(settings.level_filter(), log::LevelFilter::Info);
    }
}
