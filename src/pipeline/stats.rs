const RATE_SMOOTHING: f64 = 0.1;
const REPORT_EVERY: u64 = 60;

/// Exponentially smoothed input rate, derived from frame timestamps.
#[derive(Clone, Debug, Default)]
pub struct FrameRateMeter {
    last_timestamp: Option<u64>,
    fps: Option<f64>,
    frames: u64,
}

impl FrameRateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame and returns the current estimate every `REPORT_EVERY` frames.
    pub fn record(&mut self, timestamp_ms: u64) -> Option<f64> {
        self.frames += 1;

        if let Some(last) = self.last_timestamp {
            let delta = timestamp_ms.saturating_sub(last);
            if delta > 0 {
                let instant = 1_000.0 / delta as f64;
                self.fps = Some(match self.fps {
                    Some(fps) => fps + (instant - fps) * RATE_SMOOTHING,
                    None => instant,
                });
            }
        }
        self.last_timestamp = Some(timestamp_ms);

        if self.frames % REPORT_EVERY == 0 {
            self.fps
        } else {
            None
        }
    }

    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
