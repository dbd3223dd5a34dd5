//! Turns per-frame hand-landmark detections into stable finger states, a
//! filtered cursor position and discrete gesture events.
//!
//! Data flow per frame: raw landmarks → [`smoothing`] → [`gesture`] classifier
//! → [`gesture`] debouncer → [`actions`]; the primary hand's index fingertip
//! additionally drives [`cursor`], and two tracked hands feed [`two_hand`].
//! [`pipeline::GesturePipeline`] owns all of that state.

pub mod actions;
pub mod config;
pub mod cursor;
pub mod gesture;
pub mod pipeline;
pub mod smoothing;
pub mod two_hand;
pub mod types;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::GesturePipeline;
pub use types::{FingerStates, FrameOutput, GestureEvent, LandmarkFrame};
