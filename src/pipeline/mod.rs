mod source;
mod stats;
mod worker;

pub use self::{
    source::{
        JsonLinesSource, LandmarkSource, SourceStream, SubprocessSource, open_input, start_source,
    },
    stats::FrameRateMeter,
    worker::{FrameDelivery, FrameOrderGuard, start_pipeline},
};

use crate::{
    actions::{ActionMapper, PointerIntent},
    config::{ConfigError, PipelineConfig, validate_confidence},
    cursor::CursorFilter,
    gesture::{FingerClassifier, GestureDebouncer},
    smoothing::LandmarkSmoother,
    two_hand::TwoHandDetector,
    types::{
        FingerStates, FrameOutput, GestureEvent, HandDetection, HandOutput, Handedness,
        LANDMARK_COUNT, LandmarkFrame, PixelPoint, ScreenPoint, landmarks,
    },
};

/// Frame-ordered driver for the whole stabilization chain.
///
/// Hand slots follow detection order within each frame. A hand that moves to a
/// different slot between frames inherits that slot's history; there is no
/// re-identification.
pub struct GesturePipeline {
    config: PipelineConfig,
    smoother: LandmarkSmoother,
    classifier: FingerClassifier,
    debouncers: Vec<GestureDebouncer>,
    cursor: CursorFilter,
    two_hand: TwoHandDetector,
    actions: ActionMapper,
}

impl GesturePipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config: config.clone(),
            smoother: LandmarkSmoother::new(&config.smoothing, config.max_hands),
            classifier: FingerClassifier::new(&config.classifier),
            debouncers: (0..config.max_hands)
                .map(|_| GestureDebouncer::new(&config.debounce))
                .collect(),
            cursor: CursorFilter::new(&config.cursor),
            two_hand: TwoHandDetector::new(&config.two_hand),
            actions: ActionMapper::new(
                &config.cooldowns,
                &config.actions,
                config.cursor.click_distance_px,
            ),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> Result<(), ConfigError> {
        self.cursor.set_smoothing(smoothing)?;
        self.config.cursor.smoothing = smoothing;
        log::info!("cursor smoothing set to {smoothing}");
        Ok(())
    }

    pub fn set_detection_confidence(&mut self, confidence: f32) -> Result<(), ConfigError> {
        validate_confidence(confidence)?;
        self.config.min_detection_confidence = confidence;
        log::info!("minimum detection confidence set to {confidence}");
        Ok(())
    }

    pub fn cursor_position(&self) -> ScreenPoint {
        self.cursor.position()
    }

    pub fn set_cursor_position(&mut self, position: ScreenPoint) {
        self.cursor.set_position(position);
    }

    /// Runs one frame through smoothing, classification, debouncing, cursor
    /// filtering and action mapping. Frames must arrive in timestamp order.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameOutput {
        let min_confidence = self.config.min_detection_confidence;
        let tracked: Vec<&HandDetection> = frame
            .hands
            .iter()
            .filter(|hand| hand.score >= min_confidence)
            .take(self.config.max_hands)
            .collect();

        let mut output = FrameOutput {
            timestamp_ms: frame.timestamp_ms,
            ..FrameOutput::default()
        };
        let mut palms = Vec::with_capacity(2);

        for slot in 0..self.config.max_hands {
            let Some(hand) = tracked.get(slot) else {
                self.release_slot(slot);
                continue;
            };

            let raw: Vec<PixelPoint> = hand
                .to_pixels(frame.width, frame.height)
                .into_iter()
                .map(|(x, y)| PixelPoint::new(x.round() as i32, y.round() as i32))
                .collect();

            if raw.len() != LANDMARK_COUNT {
                log::warn!(
                    "hand in slot {slot} has {} landmarks, expected {LANDMARK_COUNT}",
                    raw.len()
                );
                self.release_slot(slot);
                output.hands.push(HandOutput {
                    slot,
                    handedness: hand.handedness,
                    landmarks: raw,
                    raw: FingerStates::ALL_FLEXED,
                    stable: FingerStates::ALL_FLEXED,
                });
                continue;
            }

            let smoothed = self.smoother.smooth_hand(slot, &raw);
            let raw_states = self.classifier.classify(&smoothed);
            let stable = self.debouncers[slot].update(raw_states);
            log::trace!(
                "slot {slot} ({}): raw {raw_states} stable {stable}",
                hand.handedness.unwrap_or(Handedness::Unknown).label()
            );

            self.actions.map_hand(stable, &smoothed, &mut output.events);
            if slot == 0 {
                output.cursor = self.drive_cursor(stable, &smoothed, frame, &mut output.events);
            }

            palms.push(smoothed[landmarks::PALM_CENTER]);
            output.hands.push(HandOutput {
                slot,
                handedness: hand.handedness,
                landmarks: smoothed,
                raw: raw_states,
                stable,
            });
        }

        if tracked.len() != 2 {
            palms.clear();
        }
        self.two_hand.update(&palms, &mut output.events);

        self.actions.tick();
        self.two_hand.tick();

        for event in &output.events {
            log::debug!("t={}ms event {}", frame.timestamp_ms, event.as_str());
        }

        output
    }

    fn drive_cursor(
        &mut self,
        stable: FingerStates,
        points: &[PixelPoint],
        frame: &LandmarkFrame,
        events: &mut Vec<GestureEvent>,
    ) -> Option<ScreenPoint> {
        let intent = self.actions.pointer_intent(stable, points);
        if let Some(button) = self.actions.latch_pointer(intent) {
            events.push(GestureEvent::Click { button });
        }

        if intent != Some(PointerIntent::Move) {
            return None;
        }

        let position = self
            .cursor
            .update(points[landmarks::INDEX_TIP], frame.width, frame.height);
        events.push(GestureEvent::Move {
            x: position.x,
            y: position.y,
        });
        Some(position)
    }

    fn release_slot(&mut self, slot: usize) {
        self.smoother.reset_slot(slot);
        if let Some(debouncer) = self.debouncers.get_mut(slot) {
            debouncer.reset();
        }
        if slot == 0 {
            self.actions.latch_pointer(None);
        }
    }
}
