//! Fingertip → screen cursor mapping with adaptive exponential smoothing.

use crate::{
    config::{ConfigError, CursorCfg, validate_smoothing},
    types::{PixelPoint, ScreenPoint},
};

/// Floor for the divisor used on large jumps.
const MIN_FAST_DIVISOR: f32 = 2.0;
const FINE_GAIN: f32 = 1.5;
const COARSE_GAIN: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct CursorFilter {
    smoothing: f32,
    margin: f32,
    screen_width: f32,
    screen_height: f32,
    fine_distance: f32,
    coarse_distance: f32,
    position: ScreenPoint,
}

impl CursorFilter {
    pub fn new(cfg: &CursorCfg) -> Self {
        Self {
            smoothing: cfg.smoothing,
            margin: cfg.margin_px as f32,
            screen_width: cfg.screen_width as f32,
            screen_height: cfg.screen_height as f32,
            fine_distance: cfg.fine_distance_px,
            coarse_distance: cfg.coarse_distance_px,
            position: ScreenPoint::default(),
        }
    }

    pub fn position(&self) -> ScreenPoint {
        self.position
    }

    /// Seeds the filter, e.g. with the current OS cursor position.
    pub fn set_position(&mut self, position: ScreenPoint) {
        self.position = position;
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> Result<(), ConfigError> {
        validate_smoothing(smoothing)?;
        self.smoothing = smoothing;
        Ok(())
    }

    /// Linear remap of the margin-trimmed frame onto the screen.
    ///
    /// Points outside the active rectangle extrapolate; clamping is the OS's job.
    /// Returns `None` when the margin leaves no active area.
    pub fn map_to_screen(
        &self,
        point: PixelPoint,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<ScreenPoint> {
        let span_x = frame_width as f32 - 2.0 * self.margin;
        let span_y = frame_height as f32 - 2.0 * self.margin;
        if span_x <= 0.0 || span_y <= 0.0 {
            return None;
        }

        Some(ScreenPoint::new(
            (point.x as f32 - self.margin) / span_x * self.screen_width,
            (point.y as f32 - self.margin) / span_y * self.screen_height,
        ))
    }

    pub fn effective_divisor(&self, distance: f32) -> f32 {
        if distance < self.fine_distance {
            self.smoothing * FINE_GAIN
        } else if distance > self.coarse_distance {
            (self.smoothing * COARSE_GAIN).max(MIN_FAST_DIVISOR)
        } else {
            self.smoothing
        }
    }

    /// Moves one filter step towards `target` and returns the new position.
    pub fn step_towards(&mut self, target: ScreenPoint) -> ScreenPoint {
        let distance = self.position.distance_to(target);
        let divisor = self.effective_divisor(distance);
        self.position = ScreenPoint::new(
            self.position.x + (target.x - self.position.x) / divisor,
            self.position.y + (target.y - self.position.y) / divisor,
        );
        self.position
    }

    /// Maps a fingertip and advances the filter. A degenerate frame leaves the cursor where it was.
    pub fn update(
        &mut self,
        fingertip: PixelPoint,
        frame_width: u32,
        frame_height: u32,
    ) -> ScreenPoint {
        match self.map_to_screen(fingertip, frame_width, frame_height) {
            Some(target) => self.step_towards(target),
            None => {
                log::warn!(
                    "cursor margin {}px leaves no active area in {frame_width}x{frame_height} frame",
                    self.margin
                );
                self.position
            }
        }
    }
}
