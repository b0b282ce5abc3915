use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::pixel::{PixelFormat, Rgb565Scaling};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub annotate: AnnotateConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Synthetic,
    Directory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_frame_width")]
    pub width: u32,
    #[serde(default = "default_frame_height")]
    pub height: u32,
    #[serde(default = "default_pixel_format")]
    pub pixel_format: PixelFormat,
    #[serde(default = "default_true")]
    pub loop_frames: bool,
}

/// Which interior rule the evaluator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// Dark border around a uniformly light interior.
    #[default]
    SolidInterior,
    /// Dark border around a light interior holding a bounded dark shape.
    BoundedDarkShape,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub policy: MarkerPolicy,
    #[serde(default = "default_sensitivity")]
    pub sensitivity_threshold: u32,
    #[serde(default = "default_dark_level")]
    pub dark_level: u8,
    #[serde(default)]
    pub rgb565_scaling: Rgb565Scaling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelType {
    #[default]
    St7701,
    Hdmi,
    Virtual,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub panel: PanelType,
    #[serde(default = "default_panel_width")]
    pub width: u32,
    #[serde(default = "default_panel_height")]
    pub height: u32,
    #[serde(default = "default_true")]
    pub preview: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub save_every: u64,
}

/// Largest center-marker radius accepted from config.
pub const MAX_MARKER_RADIUS: u32 = 4096;

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotateConfig {
    #[serde(default = "default_color")]
    pub color: [u8; 3],
    /// Outline thickness; policy default when unset.
    pub thickness: Option<u32>,
    /// Whether to fill a dot at the rect center; policy default when unset.
    pub center_marker: Option<bool>,
    #[serde(default = "default_marker_radius")]
    pub marker_radius: u32,
}

impl AnnotateConfig {
    pub fn thickness_for(&self, policy: MarkerPolicy) -> u32 {
        self.thickness.unwrap_or(match policy {
            MarkerPolicy::SolidInterior => 1,
            MarkerPolicy::BoundedDarkShape => 2,
        })
    }

    pub fn center_marker_for(&self, policy: MarkerPolicy) -> bool {
        self.center_marker
            .unwrap_or(policy == MarkerPolicy::BoundedDarkShape)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub max_frames: Option<u64>,
    #[serde(default = "default_fps_report_every")]
    pub fps_report_every: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            directory: default_directory(),
            width: default_frame_width(),
            height: default_frame_height(),
            pixel_format: default_pixel_format(),
            loop_frames: true,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            policy: MarkerPolicy::default(),
            sensitivity_threshold: default_sensitivity(),
            dark_level: default_dark_level(),
            rgb565_scaling: Rgb565Scaling::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            panel: PanelType::default(),
            width: default_panel_width(),
            height: default_panel_height(),
            preview: true,
            output_dir: default_output_dir(),
            save_every: 0,
        }
    }
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            thickness: None,
            center_marker: None,
            marker_radius: default_marker_radius(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_frames: None,
            fps_report_every: default_fps_report_every(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.annotate.marker_radius > MAX_MARKER_RADIUS {
            warn!(
                requested = config.annotate.marker_radius,
                max = MAX_MARKER_RADIUS,
                "marker_radius clamped"
            );
            config.annotate.marker_radius = MAX_MARKER_RADIUS;
        }
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_directory() -> PathBuf {
    "frames".into()
}
fn default_frame_width() -> u32 {
    320
}
fn default_frame_height() -> u32 {
    240
}
fn default_pixel_format() -> PixelFormat {
    PixelFormat::Rgb565
}
fn default_sensitivity() -> u32 {
    8000
}
fn default_dark_level() -> u8 {
    100
}
fn default_panel_width() -> u32 {
    640
}
fn default_panel_height() -> u32 {
    480
}
fn default_output_dir() -> PathBuf {
    "scanner-out".into()
}
fn default_color() -> [u8; 3] {
    [0, 255, 0]
}
fn default_marker_radius() -> u32 {
    5
}
fn default_fps_report_every() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}
