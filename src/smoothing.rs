//! Per-landmark temporal smoothing.
//!
//! Each (hand slot, landmark) pair keeps a short window of raw pixel samples.
//! The output is a recency-weighted average of that window; with
//! [`SmoothingStrategy::JitterSnap`] sub-threshold movement is additionally
//! snapped back to the previous raw sample so one-pixel flicker disappears.

use std::collections::VecDeque;

use crate::{
    config::{SmoothingCfg, SmoothingStrategy},
    types::{LANDMARK_COUNT, PixelPoint},
};

/// Bounded window of raw samples for one landmark.
#[derive(Clone, Debug)]
struct PointHistory {
    samples: VecDeque<PixelPoint>,
}

impl PointHistory {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
        }
    }

    fn push(&mut self, point: PixelPoint, capacity: usize) {
        if self.samples.len() == capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(point);
    }

    /// Oldest sample weighs 1, newest weighs `len`.
    fn weighted_average(&self) -> (f32, f32) {
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut total = 0.0;
        for (k, p) in self.samples.iter().enumerate() {
            let weight = (k + 1) as f32;
            sum_x += p.x as f32 * weight;
            sum_y += p.y as f32 * weight;
            total += weight;
        }
        (sum_x / total, sum_y / total)
    }

    fn previous(&self) -> Option<PixelPoint> {
        let len = self.samples.len();
        if len < 2 {
            None
        } else {
            self.samples.get(len - 2).copied()
        }
    }
}

pub struct LandmarkSmoother {
    strategy: SmoothingStrategy,
    capacity: usize,
    jitter_threshold: i32,
    hands: Vec<Vec<PointHistory>>,
}

impl LandmarkSmoother {
    pub fn new(cfg: &SmoothingCfg, max_hands: usize) -> Self {
        let capacity = cfg.history.max(1);
        let hands = (0..max_hands)
            .map(|_| {
                (0..LANDMARK_COUNT)
                    .map(|_| PointHistory::with_capacity(capacity))
                    .collect()
            })
            .collect();

        Self {
            strategy: cfg.strategy,
            capacity,
            jitter_threshold: cfg.jitter_threshold_px,
            hands,
        }
    }

    /// Records `raw` for landmark `index` of hand `slot` and returns the stabilized position.
    ///
    /// Slots or indices outside the preallocated tracks pass through unchanged.
    pub fn smooth(&mut self, slot: usize, index: usize, raw: PixelPoint) -> PixelPoint {
        let Some(history) = self
            .hands
            .get_mut(slot)
            .and_then(|hand| hand.get_mut(index))
        else {
            return raw;
        };

        history.push(raw, self.capacity);
        let Some(previous) = history.previous() else {
            return raw;
        };

        let (avg_x, avg_y) = history.weighted_average();
        let mut smoothed = PixelPoint::new(avg_x.round() as i32, avg_y.round() as i32);

        if self.strategy == SmoothingStrategy::JitterSnap {
            let threshold = self.jitter_threshold as f32;
            if (avg_x - previous.x as f32).abs() < threshold {
                smoothed.x = previous.x;
            }
            if (avg_y - previous.y as f32).abs() < threshold {
                smoothed.y = previous.y;
            }
        }

        smoothed
    }

    /// Smooths a full hand in landmark order.
    pub fn smooth_hand(&mut self, slot: usize, raw: &[PixelPoint]) -> Vec<PixelPoint> {
        raw.iter()
            .enumerate()
            .map(|(index, point)| self.smooth(slot, index, *point))
            .collect()
    }

    /// Forgets all history for `slot`.
    pub fn reset_slot(&mut self, slot: usize) {
        if let Some(hand) = self.hands.get_mut(slot) {
            for history in hand {
                history.samples.clear();
            }
        }
    }
}
