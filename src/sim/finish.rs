//! Finish order tracking
//!
//! Turns collision-start notifications into an append-only ranking. A racer is
//! recorded the first time it touches the finish sensor; the sensor keeps
//! reporting overlaps for a few steps, and those repeats are ignored.

use super::state::{FinishRecord, RacerId, Standing};
use crate::consts::RACER_COUNT;
use crate::engine::BodyLabel;

/// Append-ordered finish list (the ranking)
#[derive(Debug, Clone, Default)]
pub struct FinishTracker {
    records: Vec<FinishRecord>,
}

impl FinishTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one collision-start pair
    ///
    /// Returns the new record when a ball touched the finish sensor for the
    /// first time, `None` for everything else (including repeats).
    pub fn on_collision(
        &mut self,
        label_a: &str,
        label_b: &str,
        now_ms: f64,
    ) -> Option<FinishRecord> {
        let other = if label_a == BodyLabel::FINISH {
            label_b
        } else if label_b == BodyLabel::FINISH {
            label_a
        } else {
            return None;
        };
        let racer = BodyLabel::parse(other)?.racer()?;
        self.record(racer, now_ms)
    }

    /// Record `racer` as finished unless it already is
    pub fn record(&mut self, racer: RacerId, now_ms: f64) -> Option<FinishRecord> {
        if self.contains(racer) {
            return None;
        }
        // Appending keeps the list sorted by time as long as the clock is monotonic
        let timestamp_ms = match self.records.last() {
            Some(last) if now_ms < last.timestamp_ms => {
                log::warn!(
                    "Clock went backwards ({now_ms} < {}), clamping finish time",
                    last.timestamp_ms
                );
                last.timestamp_ms
            }
            _ => now_ms,
        };
        let record = FinishRecord {
            racer,
            timestamp_ms,
        };
        self.records.push(record);
        Some(record)
    }

    pub fn contains(&self, racer: RacerId) -> bool {
        self.records.iter().any(|r| r.racer == racer)
    }

    /// Finish records in finishing order
    pub fn ranking(&self) -> &[FinishRecord] {
        &self.records
    }

    /// Ranking with 1-based places and colours
    pub fn standings(&self) -> Vec<Standing> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| Standing::from_record(i + 1, r))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every racer has finished
    pub fn is_complete(&self) -> bool {
        self.records.len() == RACER_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(tracker: &FinishTracker) -> Vec<u8> {
        tracker.ranking().iter().map(|r| r.racer.get()).collect()
    }

    #[test]
    fn ignores_pairs_without_finish() {
        let mut tracker = FinishTracker::new();
        assert_eq!(tracker.on_collision("ball_0", "peg", 1.0), None);
        assert_eq!(tracker.on_collision("ball_0", "ball_1", 1.0), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn ignores_finish_against_scenery_or_unknown() {
        let mut tracker = FinishTracker::new();
        assert_eq!(tracker.on_collision("finish", "wall_ground", 1.0), None);
        assert_eq!(tracker.on_collision("finish", "finish", 1.0), None);
        assert_eq!(tracker.on_collision("ball_7", "finish", 1.0), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn finish_may_be_either_side() {
        let mut tracker = FinishTracker::new();
        let a = tracker.on_collision("finish", "ball_3", 10.0).unwrap();
        let b = tracker.on_collision("ball_1", "finish", 20.0).unwrap();
        assert_eq!(a.racer.get(), 3);
        assert_eq!(b.racer.get(), 1);
        assert_eq!(b.timestamp_ms, 20.0);
    }

    #[test]
    fn duplicate_overlap_keeps_first_position() {
        let mut tracker = FinishTracker::new();
        tracker.on_collision("ball_0", "finish", 1.0);
        tracker.on_collision("ball_2", "finish", 2.0);
        assert_eq!(tracker.on_collision("finish", "ball_0", 3.0), None);
        assert_eq!(ids(&tracker), vec![0, 2]);
        assert_eq!(tracker.ranking()[0].timestamp_ms, 1.0);
    }

    #[test]
    fn append_order_is_the_ranking() {
        let mut tracker = FinishTracker::new();
        for (t, id) in [2, 0, 4, 1, 3].into_iter().enumerate() {
            tracker.on_collision(&format!("ball_{id}"), "finish", t as f64);
        }
        assert_eq!(ids(&tracker), vec![2, 0, 4, 1, 3]);
        assert!(tracker.is_complete());
        let places: Vec<usize> = tracker.standings().iter().map(|s| s.place).collect();
        assert_eq!(places, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn backwards_clock_is_clamped() {
        let mut tracker = FinishTracker::new();
        tracker.on_collision("ball_0", "finish", 50.0);
        let late = tracker.on_collision("ball_1", "finish", 40.0).unwrap();
        assert_eq!(late.timestamp_ms, 50.0);
    }

    proptest! {
        #[test]
        fn never_records_a_racer_twice(events in prop::collection::vec((0u8..8, any::<bool>(), 0u8..3), 0..64)) {
            let mut tracker = FinishTracker::new();
            let mut previous_len = 0;
            for (t, (id, finish_first, other)) in events.into_iter().enumerate() {
                let ball = format!("ball_{id}");
                let partner = match other {
                    0 => "finish",
                    1 => "peg",
                    _ => "bumper",
                };
                if finish_first {
                    tracker.on_collision(partner, &ball, t as f64);
                } else {
                    tracker.on_collision(&ball, partner, t as f64);
                }
                prop_assert!(tracker.len() >= previous_len);
                previous_len = tracker.len();
            }
            let mut seen = std::collections::HashSet::new();
            for record in tracker.ranking() {
                prop_assert!(seen.insert(record.racer));
            }
            prop_assert!(tracker.len() <= RACER_COUNT);
            let times: Vec<f64> = tracker.ranking().iter().map(|r| r.timestamp_ms).collect();
            prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
