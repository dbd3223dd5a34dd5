use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("smoothing factor must be finite and at least 1.0, got {0}")]
    InvalidSmoothing(f32),
    #[error("{0} must hold at least one entry")]
    ZeroCapacity(&'static str),
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
    #[error("max_hands must be at least 1")]
    ZeroMaxHands,
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingStrategy {
    /// Recency-weighted average only.
    Weighted,
    /// Weighted average, then per-axis snap to the previous sample under the jitter threshold.
    #[default]
    JitterSnap,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SmoothingCfg {
    pub strategy: SmoothingStrategy,
    pub history: usize,
    pub jitter_threshold_px: i32,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self {
            strategy: SmoothingStrategy::JitterSnap,
            history: 5,
            jitter_threshold_px: 2,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClassifierCfg {
    pub thumb_margin_px: i32,
    /// Camera frame is mirrored, so an open thumb points towards larger x.
    pub mirrored: bool,
}

impl Default for ClassifierCfg {
    fn default() -> Self {
        Self {
            thumb_margin_px: 5,
            mirrored: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DebounceCfg {
    pub window: usize,
}

impl Default for DebounceCfg {
    fn default() -> Self {
        Self { window: 5 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CursorCfg {
    pub smoothing: f32,
    pub margin_px: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub fine_distance_px: f32,
    pub coarse_distance_px: f32,
    pub click_distance_px: f32,
}

impl Default for CursorCfg {
    fn default() -> Self {
        Self {
            smoothing: 4.0,
            margin_px: 100,
            screen_width: 1920,
            screen_height: 1080,
            fine_distance_px: 10.0,
            coarse_distance_px: 100.0,
            click_distance_px: 45.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TwoHandCfg {
    pub distance_threshold_px: f32,
    pub angle_threshold_deg: f32,
    pub zoom_cooldown: u32,
    pub rotate_cooldown: u32,
}

impl Default for TwoHandCfg {
    fn default() -> Self {
        Self {
            distance_threshold_px: 50.0,
            angle_threshold_deg: 20.0,
            zoom_cooldown: 10,
            rotate_cooldown: 15,
        }
    }
}

/// Reload values, in frames, for single-hand actions.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CooldownCfg {
    pub play_pause: u32,
    pub app_switch: u32,
    pub screenshot: u32,
    pub volume: u32,
    pub scroll: u32,
}

impl Default for CooldownCfg {
    fn default() -> Self {
        Self {
            play_pause: 40,
            app_switch: 20,
            screenshot: 40,
            volume: 5,
            scroll: 5,
        }
    }
}

/// Vertical bands (frame pixels) that pick the direction of volume and scroll steps.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ActionsCfg {
    pub upper_band_px: i32,
    pub lower_band_px: i32,
}

impl Default for ActionsCfg {
    fn default() -> Self {
        Self {
            upper_band_px: 200,
            lower_band_px: 300,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_hands: usize,
    pub min_detection_confidence: f32,
    pub smoothing: SmoothingCfg,
    pub classifier: ClassifierCfg,
    pub debounce: DebounceCfg,
    pub cursor: CursorCfg,
    pub two_hand: TwoHandCfg,
    pub cooldowns: CooldownCfg,
    pub actions: ActionsCfg,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_hands: 2,
            min_detection_confidence: 0.4,
            smoothing: SmoothingCfg::default(),
            classifier: ClassifierCfg::default(),
            debounce: DebounceCfg::default(),
            cursor: CursorCfg::default(),
            two_hand: TwoHandCfg::default(),
            cooldowns: CooldownCfg::default(),
            actions: ActionsCfg::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hands == 0 {
            return Err(ConfigError::ZeroMaxHands);
        }
        if self.smoothing.history == 0 {
            return Err(ConfigError::ZeroCapacity("smoothing.history"));
        }
        if self.debounce.window == 0 {
            return Err(ConfigError::ZeroCapacity("debounce.window"));
        }
        validate_smoothing(self.cursor.smoothing)?;
        validate_confidence(self.min_detection_confidence)?;

        let thresholds = [
            (
                "smoothing.jitter_threshold_px",
                self.smoothing.jitter_threshold_px as f32,
            ),
            (
                "classifier.thumb_margin_px",
                self.classifier.thumb_margin_px as f32,
            ),
            ("cursor.fine_distance_px", self.cursor.fine_distance_px),
            ("cursor.coarse_distance_px", self.cursor.coarse_distance_px),
            ("cursor.click_distance_px", self.cursor.click_distance_px),
            (
                "two_hand.distance_threshold_px",
                self.two_hand.distance_threshold_px,
            ),
            (
                "two_hand.angle_threshold_deg",
                self.two_hand.angle_threshold_deg,
            ),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        Ok(())
    }
}

pub(crate) fn validate_smoothing(value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSmoothing(value))
    }
}

pub(crate) fn validate_confidence(value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold {
            name: "min_detection_confidence",
            value,
        })
    }
}
