//! Finger-state classification and majority-vote debouncing.

use std::collections::VecDeque;

use crate::{
    config::{ClassifierCfg, DebounceCfg},
    types::{Finger, FingerStates, LANDMARK_COUNT, PixelPoint, landmarks},
};

/// Per-frame extended/flexed decision for each finger.
///
/// The thumb test only looks at horizontal offset and ignores handedness; the
/// other fingers compare tip height against the joint two positions down the chain.
#[derive(Clone, Debug)]
pub struct FingerClassifier {
    thumb_margin: i32,
    mirrored: bool,
}

impl FingerClassifier {
    pub fn new(cfg: &ClassifierCfg) -> Self {
        Self {
            thumb_margin: cfg.thumb_margin_px,
            mirrored: cfg.mirrored,
        }
    }

    /// Returns all-flexed when the hand is missing or incomplete.
    pub fn classify(&self, points: &[PixelPoint]) -> FingerStates {
        if points.len() < LANDMARK_COUNT {
            return FingerStates::ALL_FLEXED;
        }

        let mut flags = [false; 5];
        for finger in Finger::ALL {
            flags[finger.position()] = match finger {
                Finger::Thumb => self.classify_thumb(points),
                _ => classify_finger(points, finger),
            };
        }
        FingerStates::new(flags)
    }

    fn classify_thumb(&self, points: &[PixelPoint]) -> bool {
        let tip = points[landmarks::THUMB_TIP];
        let joint = points[landmarks::THUMB_IP];
        if self.mirrored {
            tip.x > joint.x.saturating_add(self.thumb_margin)
        } else {
            tip.x < joint.x.saturating_sub(self.thumb_margin)
        }
    }
}

fn classify_finger(points: &[PixelPoint], finger: Finger) -> bool {
    // image y grows downward
    points[finger.tip()].y < points[finger.reference_joint()].y
}

/// Majority vote over the last few raw finger-state vectors of one hand slot.
#[derive(Clone, Debug)]
pub struct GestureDebouncer {
    window: usize,
    history: VecDeque<FingerStates>,
}

impl GestureDebouncer {
    pub fn new(cfg: &DebounceCfg) -> Self {
        let window = cfg.window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    /// Pushes `raw` and returns the most frequent vector in the window.
    ///
    /// Ties go to the vector whose first occurrence is oldest.
    pub fn update(&mut self, raw: FingerStates) -> FingerStates {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(raw);
        self.stable().unwrap_or(raw)
    }

    pub fn stable(&self) -> Option<FingerStates> {
        let mut counts: Vec<(FingerStates, usize)> = Vec::with_capacity(self.history.len());
        for states in &self.history {
            match counts.iter_mut().find(|(seen, _)| seen == states) {
                Some((_, count)) => *count += 1,
                None => counts.push((*states, 1)),
            }
        }

        let mut best: Option<(FingerStates, usize)> = None;
        for (states, count) in counts {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((states, count));
            }
        }
        best.map(|(states, _)| states)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hand() -> Vec<PixelPoint> {
        // every tip level with its reference joint: nothing extended
        vec![PixelPoint::new(300, 300); LANDMARK_COUNT]
    }

    fn set_point(points: &mut [PixelPoint], index: usize, x: i32, y: i32) {
        points[index] = PixelPoint::new(x, y);
    }

    fn states(bits: [u8; 5]) -> FingerStates {
        FingerStates::new(bits.map(|b| b == 1))
    }

    #[test]
    fn thumb_needs_more_than_margin() {
        let classifier = FingerClassifier::new(&ClassifierCfg::default());
        let mut hand = make_hand();
        set_point(&mut hand, landmarks::THUMB_IP, 200, 300);

        set_point(&mut hand, landmarks::THUMB_TIP, 210, 300);
        assert!(classifier.classify(&hand).is_extended(Finger::Thumb));

        set_point(&mut hand, landmarks::THUMB_TIP, 202, 300);
        assert!(!classifier.classify(&hand).is_extended(Finger::Thumb));
    }

    #[test]
    fn unmirrored_thumb_points_left() {
        let classifier = FingerClassifier::new(&ClassifierCfg {
            thumb_margin_px: 5,
            mirrored: false,
        });
        let mut hand = make_hand();
        set_point(&mut hand, landmarks::THUMB_IP, 200, 300);
        set_point(&mut hand, landmarks::THUMB_TIP, 190, 300);
        assert!(classifier.classify(&hand).is_extended(Finger::Thumb));
        set_point(&mut hand, landmarks::THUMB_TIP, 210, 300);
        assert!(!classifier.classify(&hand).is_extended(Finger::Thumb));
    }

    #[test]
    fn fingers_extended_when_tip_above_joint() {
        let classifier = FingerClassifier::new(&ClassifierCfg::default());
        let mut hand = make_hand();
        set_point(&mut hand, landmarks::INDEX_PIP, 300, 250);
        set_point(&mut hand, landmarks::INDEX_TIP, 300, 180);
        set_point(&mut hand, landmarks::MIDDLE_PIP, 320, 250);
        set_point(&mut hand, landmarks::MIDDLE_TIP, 320, 280);
        set_point(&mut hand, landmarks::PINKY_PIP, 360, 260);
        set_point(&mut hand, landmarks::PINKY_TIP, 360, 259);

        assert_eq!(classifier.classify(&hand), states([0, 1, 0, 0, 1]));
    }

    #[test]
    fn missing_hand_is_all_flexed() {
        let classifier = FingerClassifier::new(&ClassifierCfg::default());
        assert_eq!(classifier.classify(&[]), FingerStates::ALL_FLEXED);
        assert_eq!(
            classifier.classify(&make_hand()[..10]),
            FingerStates::ALL_FLEXED
        );
    }

    #[test]
    fn constant_input_is_stable_from_first_frame() {
        let mut debouncer = GestureDebouncer::new(&DebounceCfg { window: 5 });
        let point = states([0, 1, 0, 0, 0]);
        for _ in 0..5 {
            assert_eq!(debouncer.update(point), point);
        }
    }

    #[test]
    fn alternating_input_keeps_majority() {
        let mut debouncer = GestureDebouncer::new(&DebounceCfg { window: 5 });
        let a = states([0, 1, 0, 0, 0]);
        let b = states([0, 1, 1, 0, 0]);
        let mut out = a;
        for raw in [a, b, a, b, a] {
            out = debouncer.update(raw);
        }
        assert_eq!(out, a);
    }

    #[test]
    fn tie_goes_to_oldest_first_occurrence() {
        let mut debouncer = GestureDebouncer::new(&DebounceCfg { window: 5 });
        let a = states([1, 0, 0, 0, 0]);
        let b = states([0, 0, 0, 0, 1]);
        assert_eq!(debouncer.update(b), b);
        assert_eq!(debouncer.update(a), b);
        assert_eq!(debouncer.update(a), a);
        // b and a both seen twice; b appeared first
        assert_eq!(debouncer.update(b), b);
    }

    #[test]
    fn single_misread_frame_is_suppressed() {
        let mut debouncer = GestureDebouncer::new(&DebounceCfg { window: 5 });
        let point = states([0, 1, 0, 0, 0]);
        let misread = states([0, 0, 0, 0, 0]);
        for _ in 0..4 {
            debouncer.update(point);
        }
        assert_eq!(debouncer.update(misread), point);
        assert_eq!(debouncer.update(point), point);
    }

    #[test]
    fn output_is_always_in_window() {
        let mut debouncer = GestureDebouncer::new(&DebounceCfg { window: 3 });
        let sequence: Vec<FingerStates> = (0u8..32)
            .map(|i| states([i & 1, (i >> 1) & 1, (i >> 2) & 1, (i >> 3) & 1, (i >> 4) & 1]))
            .collect();
        for (i, raw) in sequence.iter().enumerate() {
            let out = debouncer.update(*raw);
            let start = i.saturating_sub(2);
            assert!(sequence[start..=i].contains(&out));
            assert!(debouncer.len() <= 3);
        }
    }

    #[test]
    fn reset_clears_history() {
        let mut debouncer = GestureDebouncer::new(&DebounceCfg { window: 5 });
        debouncer.update(states([1, 1, 1, 1, 1]));
        debouncer.reset();
        assert!(debouncer.is_empty());
        assert_eq!(debouncer.stable(), None);
    }
}
