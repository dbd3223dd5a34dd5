use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of keypoints in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Hand landmark indices (MediaPipe hand landmark topology).
pub mod landmarks {
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;

    /// Representative whole-hand position used by two-hand gestures.
    pub const PALM_CENTER: usize = MIDDLE_MCP;
}

/// A detector keypoint, normalized to [0, 1] of the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// A landmark position in frame pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: PixelPoint) -> f32 {
        let dx = other.x as f32 - self.x as f32;
        let dy = other.y as f32 - self.y as f32;
        dx.hypot(dy)
    }
}

/// An absolute cursor position on the target screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: ScreenPoint) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Handedness {
    pub fn label(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
            Handedness::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn position(&self) -> usize {
        *self as usize
    }

    pub fn tip(&self) -> usize {
        match self {
            Finger::Thumb => landmarks::THUMB_TIP,
            Finger::Index => landmarks::INDEX_TIP,
            Finger::Middle => landmarks::MIDDLE_TIP,
            Finger::Ring => landmarks::RING_TIP,
            Finger::Pinky => landmarks::PINKY_TIP,
        }
    }

    /// Joint the tip is compared against when deciding extension.
    pub fn reference_joint(&self) -> usize {
        match self {
            Finger::Thumb => landmarks::THUMB_IP,
            Finger::Index => landmarks::INDEX_PIP,
            Finger::Middle => landmarks::MIDDLE_PIP,
            Finger::Ring => landmarks::RING_PIP,
            Finger::Pinky => landmarks::PINKY_PIP,
        }
    }

    pub fn short_label(&self) -> char {
        match self {
            Finger::Thumb => 'T',
            Finger::Index => 'I',
            Finger::Middle => 'M',
            Finger::Ring => 'R',
            Finger::Pinky => 'P',
        }
    }
}

/// Extended (`true`) / flexed (`false`) flags ordered thumb, index, middle, ring, pinky.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    pub const ALL_FLEXED: FingerStates = FingerStates([false; 5]);

    pub const fn new(flags: [bool; 5]) -> Self {
        Self(flags)
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger.position()]
    }
}

impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finger in Finger::ALL {
            let c = if self.is_extended(finger) {
                finger.short_label()
            } else {
                '-'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

fn default_score() -> f32 {
    1.0
}

/// One hand as reported by the external landmark detector.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HandDetection {
    #[serde(default)]
    pub landmarks: Vec<NormalizedLandmark>,
    #[serde(default = "default_score")]
    pub score: f32,
    #[serde(default)]
    pub handedness: Option<Handedness>,
}

impl HandDetection {
    /// Scales normalized landmarks into frame pixel space.
    pub fn to_pixels(&self, width: u32, height: u32) -> Vec<(f32, f32)> {
        self.landmarks
            .iter()
            .map(|lm| (lm.x * width as f32, lm.y * height as f32))
            .collect()
    }
}

/// All detections for one video frame.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LandmarkFrame {
    pub timestamp_ms: u64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub hands: Vec<HandDetection>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalDirection {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateDirection {
    Left,
    Right,
}

/// Intent emitted by the pipeline. Executing it is up to the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    Move { x: f32, y: f32 },
    Click { button: MouseButton },
    Scroll { direction: VerticalDirection },
    Volume { direction: VerticalDirection },
    Zoom { direction: ZoomDirection },
    Rotate { direction: RotateDirection },
    AppSwitch,
    Screenshot,
    PlayPause,
}

impl GestureEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureEvent::Move { .. } => "move",
            GestureEvent::Click { .. } => "click",
            GestureEvent::Scroll { .. } => "scroll",
            GestureEvent::Volume { .. } => "volume",
            GestureEvent::Zoom { .. } => "zoom",
            GestureEvent::Rotate { .. } => "rotate",
            GestureEvent::AppSwitch => "app_switch",
            GestureEvent::Screenshot => "screenshot",
            GestureEvent::PlayPause => "play_pause",
        }
    }
}

/// Per-hand result for one frame. `slot` is detection order, not a persistent identity.
#[derive(Clone, Debug, Serialize)]
pub struct HandOutput {
    pub slot: usize,
    pub handedness: Option<Handedness>,
    pub landmarks: Vec<PixelPoint>,
    pub raw: FingerStates,
    pub stable: FingerStates,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct FrameOutput {
    pub timestamp_ms: u64,
    pub hands: Vec<HandOutput>,
    pub cursor: Option<ScreenPoint>,
    pub events: Vec<GestureEvent>,
}

impl FrameOutput {
    pub fn primary(&self) -> Option<&HandOutput> {
        self.hands.iter().find(|hand| hand.slot == 0)
    }
}
