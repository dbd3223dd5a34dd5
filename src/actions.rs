//! Single-hand gesture → event mapping gated by frame-counted cooldowns.

use crate::{
    config::{ActionsCfg, CooldownCfg},
    types::{
        Finger, FingerStates, GestureEvent, LANDMARK_COUNT, MouseButton, PixelPoint,
        VerticalDirection, landmarks,
    },
};

/// Frame counter gating a repeatable action. Fires only at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cooldown {
    remaining: u32,
}

impl Cooldown {
    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn trigger(&mut self, reload: u32) {
        self.remaining = reload;
    }

    /// Called once per processed frame.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

const FIST: [bool; 5] = [false, false, false, false, false];
const THUMB_ONLY: [bool; 5] = [true, false, false, false, false];
const THUMB_AND_PINKY: [bool; 5] = [true, false, false, false, true];
const THUMB_AND_INDEX: [bool; 5] = [true, true, false, false, false];
const FOUR_FINGERS: [bool; 5] = [false, true, true, true, true];

/// What the primary hand asks of the cursor this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerIntent {
    Move,
    Click(MouseButton),
}

pub struct ActionMapper {
    reloads: CooldownCfg,
    bands: ActionsCfg,
    click_distance: f32,
    swipe: Cooldown,
    volume: Cooldown,
    scroll: Cooldown,
    last_pointer: Option<PointerIntent>,
}

impl ActionMapper {
    pub fn new(reloads: &CooldownCfg, bands: &ActionsCfg, click_distance: f32) -> Self {
        Self {
            reloads: reloads.clone(),
            bands: bands.clone(),
            click_distance,
            swipe: Cooldown::default(),
            volume: Cooldown::default(),
            scroll: Cooldown::default(),
            last_pointer: None,
        }
    }

    /// Maps one hand's stable gesture to discrete events.
    ///
    /// Play/pause, app switch and screenshot share a single cooldown.
    pub fn map_hand(
        &mut self,
        stable: FingerStates,
        points: &[PixelPoint],
        events: &mut Vec<GestureEvent>,
    ) {
        if points.len() < LANDMARK_COUNT {
            return;
        }
        let tip_y = points[landmarks::INDEX_TIP].y;

        match stable.0 {
            FIST => {
                if self.swipe.is_ready() {
                    events.push(GestureEvent::PlayPause);
                    self.swipe.trigger(self.reloads.play_pause);
                }
            }
            THUMB_ONLY => {
                if self.swipe.is_ready() {
                    events.push(GestureEvent::AppSwitch);
                    self.swipe.trigger(self.reloads.app_switch);
                }
            }
            THUMB_AND_PINKY => {
                if self.swipe.is_ready() {
                    events.push(GestureEvent::Screenshot);
                    self.swipe.trigger(self.reloads.screenshot);
                }
            }
            THUMB_AND_INDEX => {
                if self.volume.is_ready() {
                    if let Some(direction) = self.band_direction(tip_y) {
                        events.push(GestureEvent::Volume { direction });
                    }
                    self.volume.trigger(self.reloads.volume);
                }
            }
            FOUR_FINGERS => {
                if self.scroll.is_ready() {
                    if let Some(direction) = self.band_direction(tip_y) {
                        events.push(GestureEvent::Scroll { direction });
                    }
                    self.scroll.trigger(self.reloads.scroll);
                }
            }
            _ => {}
        }
    }

    fn band_direction(&self, y: i32) -> Option<VerticalDirection> {
        if y < self.bands.upper_band_px {
            Some(VerticalDirection::Up)
        } else if y > self.bands.lower_band_px {
            Some(VerticalDirection::Down)
        } else {
            None
        }
    }

    /// Cursor intent for the primary hand; `None` when the pose asks for nothing.
    pub fn pointer_intent(
        &self,
        stable: FingerStates,
        points: &[PixelPoint],
    ) -> Option<PointerIntent> {
        if points.len() < LANDMARK_COUNT || !stable.is_extended(Finger::Index) {
            return None;
        }

        if !stable.is_extended(Finger::Middle) {
            return Some(PointerIntent::Move);
        }

        let gap = points[landmarks::INDEX_TIP].distance_to(points[landmarks::MIDDLE_TIP]);
        if gap < self.click_distance {
            Some(PointerIntent::Click(MouseButton::Left))
        } else if stable.is_extended(Finger::Ring) {
            Some(PointerIntent::Click(MouseButton::Right))
        } else {
            None
        }
    }

    /// Remembers the latest pointer intent and reports whether a click should fire.
    ///
    /// Clicks are edge-triggered: holding the pose does not repeat them.
    pub fn latch_pointer(&mut self, intent: Option<PointerIntent>) -> Option<MouseButton> {
        let previous = std::mem::replace(&mut self.last_pointer, intent);
        match intent {
            Some(PointerIntent::Click(button)) if previous != intent => Some(button),
            _ => None,
        }
    }

    pub fn tick(&mut self) {
        self.swipe.tick();
        self.volume.tick();
        self.scroll.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mapper() -> ActionMapper {
        ActionMapper::new(&CooldownCfg::default(), &ActionsCfg::default(), 45.0)
    }

    fn make_hand(index_tip: (i32, i32), middle_tip: (i32, i32)) -> Vec<PixelPoint> {
        let mut points = vec![PixelPoint::new(320, 240); LANDMARK_COUNT];
        points[landmarks::INDEX_TIP] = PixelPoint::new(index_tip.0, index_tip.1);
        points[landmarks::MIDDLE_TIP] = PixelPoint::new(middle_tip.0, middle_tip.1);
        points
    }

    fn states(bits: [u8; 5]) -> FingerStates {
        FingerStates::new(bits.map(|b| b == 1))
    }

    #[test]
    fn cooldown_fires_only_at_zero() {
        let mut cooldown = Cooldown::default();
        assert!(cooldown.is_ready());
        cooldown.trigger(2);
        assert!(!cooldown.is_ready());
        cooldown.tick();
        assert_eq!(cooldown.remaining(), 1);
        cooldown.tick();
        cooldown.tick();
        assert!(cooldown.is_ready());
        assert_eq!(cooldown.remaining(), 0);
    }

    #[test]
    fn fist_triggers_play_pause_once_per_cooldown() {
        let mut mapper = make_mapper();
        let hand = make_hand((320, 240), (340, 240));
        let mut fired = 0;
        for _ in 0..40 {
            let mut events = Vec::new();
            mapper.map_hand(FingerStates::ALL_FLEXED, &hand, &mut events);
            fired += events.iter().filter(|e| **e == GestureEvent::PlayPause).count();
            mapper.tick();
        }
        assert_eq!(fired, 1);

        let mut events = Vec::new();
        mapper.map_hand(FingerStates::ALL_FLEXED, &hand, &mut events);
        assert_eq!(events, vec![GestureEvent::PlayPause]);
    }

    #[test]
    fn swipe_cooldown_is_shared() {
        let mut mapper = make_mapper();
        let hand = make_hand((320, 240), (340, 240));
        let mut events = Vec::new();
        mapper.map_hand(states([1, 0, 0, 0, 0]), &hand, &mut events);
        mapper.map_hand(states([1, 0, 0, 0, 1]), &hand, &mut events);
        mapper.map_hand(FingerStates::ALL_FLEXED, &hand, &mut events);
        assert_eq!(events, vec![GestureEvent::AppSwitch]);
    }

    #[test]
    fn volume_direction_follows_vertical_band() {
        let mut mapper = make_mapper();
        let mut events = Vec::new();
        mapper.map_hand(states([1, 1, 0, 0, 0]), &make_hand((320, 150), (0, 0)), &mut events);
        assert_eq!(
            events,
            vec![GestureEvent::Volume {
                direction: VerticalDirection::Up
            }]
        );

        let mut mapper = make_mapper();
        let mut events = Vec::new();
        mapper.map_hand(states([1, 1, 0, 0, 0]), &make_hand((320, 250), (0, 0)), &mut events);
        assert!(events.is_empty());
        // the dead band still consumes the cooldown
        assert!(!mapper.volume.is_ready());
    }

    #[test]
    fn four_fingers_scroll_down_low_in_frame() {
        let mut mapper = make_mapper();
        let mut events = Vec::new();
        mapper.map_hand(states([0, 1, 1, 1, 1]), &make_hand((320, 400), (300, 400)), &mut events);
        assert_eq!(
            events,
            vec![GestureEvent::Scroll {
                direction: VerticalDirection::Down
            }]
        );
    }

    #[test]
    fn pointer_intents_follow_original_priority() {
        let mapper = make_mapper();
        let apart = make_hand((300, 100), (380, 100));
        let together = make_hand((300, 100), (320, 100));

        assert_eq!(
            mapper.pointer_intent(states([0, 1, 0, 0, 0]), &apart),
            Some(PointerIntent::Move)
        );
        assert_eq!(
            mapper.pointer_intent(states([0, 1, 1, 0, 0]), &together),
            Some(PointerIntent::Click(MouseButton::Left))
        );
        assert_eq!(
            mapper.pointer_intent(states([0, 1, 1, 1, 0]), &apart),
            Some(PointerIntent::Click(MouseButton::Right))
        );
        assert_eq!(mapper.pointer_intent(states([0, 1, 1, 0, 0]), &apart), None);
        assert_eq!(mapper.pointer_intent(states([1, 0, 1, 1, 1]), &apart), None);
        assert_eq!(mapper.pointer_intent(states([0, 1, 0, 0, 0]), &[]), None);
    }

    #[test]
    fn clicks_are_edge_triggered() {
        let mut mapper = make_mapper();
        let left = Some(PointerIntent::Click(MouseButton::Left));
        assert_eq!(mapper.latch_pointer(left), Some(MouseButton::Left));
        assert_eq!(mapper.latch_pointer(left), None);
        assert_eq!(mapper.latch_pointer(Some(PointerIntent::Move)), None);
        assert_eq!(mapper.latch_pointer(left), Some(MouseButton::Left));
        mapper.latch_pointer(None);
        assert_eq!(mapper.latch_pointer(left), Some(MouseButton::Left));
    }
}
