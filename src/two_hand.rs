//! Zoom and rotate intents from the relative motion of two palm centers.

use crate::{
    actions::Cooldown,
    config::TwoHandCfg,
    types::{GestureEvent, PixelPoint, RotateDirection, ZoomDirection},
};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Baseline {
    distance: f32,
    angle: f32,
}

/// Zoom and rotate share one cooldown, so at most one of them fires per cooldown period.
pub struct TwoHandDetector {
    distance_threshold: f32,
    angle_threshold: f32,
    zoom_reload: u32,
    rotate_reload: u32,
    baseline: Option<Baseline>,
    cooldown: Cooldown,
}

impl TwoHandDetector {
    pub fn new(cfg: &TwoHandCfg) -> Self {
        Self {
            distance_threshold: cfg.distance_threshold_px,
            angle_threshold: cfg.angle_threshold_deg,
            zoom_reload: cfg.zoom_cooldown,
            rotate_reload: cfg.rotate_cooldown,
            baseline: None,
            cooldown: Cooldown::default(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.baseline.is_some()
    }

    /// Feeds this frame's palm centers. Anything other than exactly two hands drops the baseline.
    pub fn update(&mut self, palms: &[PixelPoint], events: &mut Vec<GestureEvent>) {
        let [first, second] = palms else {
            if self.baseline.take().is_some() {
                log::debug!("two-hand baseline cleared");
            }
            return;
        };

        let distance = first.distance_to(*second);
        let angle = (second.y as f32 - first.y as f32)
            .atan2(second.x as f32 - first.x as f32)
            .to_degrees();

        let Some(baseline) = self.baseline.as_mut() else {
            self.baseline = Some(Baseline { distance, angle });
            return;
        };

        let distance_delta = distance - baseline.distance;
        if distance_delta.abs() > self.distance_threshold && self.cooldown.is_ready() {
            let direction = if distance_delta > 0.0 {
                ZoomDirection::In
            } else {
                ZoomDirection::Out
            };
            events.push(GestureEvent::Zoom { direction });
            self.cooldown.trigger(self.zoom_reload);
            baseline.distance = distance;
        }

        let angle_delta = wrap_degrees(angle - baseline.angle);
        if angle_delta.abs() > self.angle_threshold && self.cooldown.is_ready() {
            let direction = if angle_delta > 0.0 {
                RotateDirection::Right
            } else {
                RotateDirection::Left
            };
            events.push(GestureEvent::Rotate { direction });
            self.cooldown.trigger(self.rotate_reload);
            baseline.angle = angle;
        }
    }

    pub fn tick(&mut self) {
        self.cooldown.tick();
    }
}

/// Folds an angle difference into (-180, 180].
fn wrap_degrees(delta: f32) -> f32 {
    let wrapped = delta.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_detector(zoom_cooldown: u32, rotate_cooldown: u32) -> TwoHandDetector {
        TwoHandDetector::new(&TwoHandCfg {
            zoom_cooldown,
            rotate_cooldown,
            ..TwoHandCfg::default()
        })
    }

    fn palms(distance: i32) -> [PixelPoint; 2] {
        [PixelPoint::new(100, 200), PixelPoint::new(100 + distance, 200)]
    }

    fn feed(detector: &mut TwoHandDetector, palms: &[PixelPoint]) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        detector.update(palms, &mut events);
        detector.tick();
        events
    }

    #[test]
    fn first_two_hand_frame_only_seeds_baseline() {
        let mut detector = make_detector(10, 15);
        assert!(!detector.is_armed());
        assert!(feed(&mut detector, &palms(200)).is_empty());
        assert!(detector.is_armed());
    }

    #[test]
    fn distance_jump_zooms_once_and_rebases() {
        let mut detector = make_detector(0, 0);
        feed(&mut detector, &palms(200));
        assert_eq!(
            feed(&mut detector, &palms(260)),
            vec![GestureEvent::Zoom {
                direction: ZoomDirection::In
            }]
        );
        assert!(feed(&mut detector, &palms(260)).is_empty());
        assert!(feed(&mut detector, &palms(300)).is_empty());
        assert_eq!(
            feed(&mut detector, &palms(190)),
            vec![GestureEvent::Zoom {
                direction: ZoomDirection::Out
            }]
        );
    }

    #[test]
    fn small_changes_do_not_fire() {
        let mut detector = make_detector(10, 15);
        feed(&mut detector, &palms(200));
        assert!(feed(&mut detector, &palms(250)).is_empty());
        assert!(feed(&mut detector, &palms(150)).is_empty());
    }

    #[test]
    fn rotation_direction_follows_angle_sign() {
        let mut detector = make_detector(0, 0);
        let left = PixelPoint::new(100, 200);
        feed(&mut detector, &[left, PixelPoint::new(300, 200)]);
        // ~27 degrees clockwise in image coordinates, same distance band
        let events = feed(&mut detector, &[left, PixelPoint::new(280, 290)]);
        assert_eq!(
            events,
            vec![GestureEvent::Rotate {
                direction: RotateDirection::Right
            }]
        );
        let events = feed(&mut detector, &[left, PixelPoint::new(300, 200)]);
        assert_eq!(
            events,
            vec![GestureEvent::Rotate {
                direction: RotateDirection::Left
            }]
        );
    }

    #[test]
    fn zoom_and_rotate_share_cooldown() {
        let mut detector = make_detector(10, 15);
        let left = PixelPoint::new(100, 200);
        feed(&mut detector, &[left, PixelPoint::new(200, 200)]);
        // distance 100 -> ~184 and angle 0 -> ~33 degrees in one frame
        let events = feed(&mut detector, &[left, PixelPoint::new(254, 300)]);
        assert_eq!(
            events,
            vec![GestureEvent::Zoom {
                direction: ZoomDirection::In
            }]
        );

        for _ in 0..9 {
            assert!(feed(&mut detector, &[left, PixelPoint::new(254, 300)]).is_empty());
        }
        // rotation still pending against the old angle baseline
        assert_eq!(
            feed(&mut detector, &[left, PixelPoint::new(254, 300)]),
            vec![GestureEvent::Rotate {
                direction: RotateDirection::Right
            }]
        );
    }

    #[test]
    fn losing_a_hand_resets_baseline() {
        let mut detector = make_detector(0, 0);
        feed(&mut detector, &palms(200));
        feed(&mut detector, &palms(200)[..1]);
        assert!(!detector.is_armed());
        // re-seeded at 400, so no zoom despite the jump from 200
        assert!(feed(&mut detector, &palms(400)).is_empty());
        assert!(feed(&mut detector, &palms(400)).is_empty());
    }

    #[test]
    fn angle_wraps_across_half_turn() {
        assert!((wrap_degrees(358.0) - (-2.0)).abs() < 1e-4);
        assert!((wrap_degrees(-350.0) - 10.0).abs() < 1e-4);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);

        let mut detector = make_detector(0, 0);
        let origin = PixelPoint::new(300, 300);
        feed(&mut detector, &[origin, PixelPoint::new(100, 299)]);
        // atan2 flips from about -180 to +180 here; no real rotation
        assert!(feed(&mut detector, &[origin, PixelPoint::new(100, 301)]).is_empty());
    }
}
