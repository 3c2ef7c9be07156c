//! Overlay configuration (~/.config/Watchpost/overlay.toml)
//!
//! Every option is optional in the file; missing keys take the defaults
//! below. Loaded once when the overlay is created.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::PresentationType;
use crate::value::Color3;

/// Overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Decimal places for numeric formatting (default: 4)
    #[serde(default = "default_float_precision")]
    pub float_precision: usize,
    /// Width of the docked panel stack as a fraction of the screen (default: 1.0)
    #[serde(default = "default_one")]
    pub main_panel_width: f32,
    /// Width of the console as a fraction of the screen (default: 1.0)
    #[serde(default = "default_one")]
    pub console_panel_width: f32,
    /// Observer panel width in pixels (default: 160)
    #[serde(default = "default_observer_panel_width")]
    pub observer_panel_width_px: f32,
    /// Observer panel opacity (default: 0.4)
    #[serde(default = "default_alpha")]
    pub main_panel_alpha: f32,
    /// Console opacity (default: 0.4)
    #[serde(default = "default_alpha")]
    pub console_panel_alpha: f32,
    /// Anchor connector opacity (default: 0.4)
    #[serde(default = "default_alpha")]
    pub lines_alpha: f32,
    /// Horizontal offset of a world-anchored panel from its anchor (default: 100)
    #[serde(default = "default_anchor_offset_x")]
    pub anchor_offset_x_px: f32,
    /// Vertical offset of a world-anchored panel from its anchor (default: 200)
    #[serde(default = "default_anchor_offset_y")]
    pub anchor_offset_y_px: f32,
    /// Console capacity in lines (default: 10)
    #[serde(default = "default_max_console_lines")]
    pub max_console_lines: usize,
    /// Height of a console line in pixels (default: 12)
    #[serde(default = "default_console_line_height")]
    pub console_line_height_px: f32,
    /// Height of the console in pixels (default: 120)
    #[serde(default = "default_console_panel_height")]
    pub console_panel_height_px: f32,
    /// Screen side of the docked stack (default: right)
    #[serde(default)]
    pub dock_side: DockSide,
    /// Prefix written before each console line (default: ticks)
    #[serde(default)]
    pub console_stamp: ConsoleStamp,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub path: PathConfig,
}

/// Screen side of the docked panel stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DockSide {
    Left,
    #[default]
    Right,
}

impl DockSide {
    pub fn flipped(self) -> Self {
        match self {
            DockSide::Left => DockSide::Right,
            DockSide::Right => DockSide::Left,
        }
    }
}

/// Console line prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStamp {
    /// Tick counter at log time
    #[default]
    Ticks,
    /// `MM:SS.mmm` since the overlay was created
    Elapsed,
}

/// Panel colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Fallback panel colour (default: grey)
    #[serde(default = "default_observer_panel_color")]
    pub observer_panel: Color3,
    /// Panel colour when a debug predicate fires (default: red)
    #[serde(default = "default_debug_hit_color")]
    pub debug_hit: Color3,
    /// Panel colour when a highlight predicate fires (default: yellow)
    #[serde(default = "default_highlight_hit_color")]
    pub highlight_hit: Color3,
    #[serde(default)]
    pub types: TypeColors,
}

/// Base panel colour per presentation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeColors {
    pub text: Color3,
    pub float: Color3,
    pub boolean: Color3,
    pub mesh_transform: Color3,
    pub vector2: Color3,
    pub vector3: Color3,
    pub color3: Color3,
    pub color4: Color3,
    pub point_sequence: Color3,
}

impl TypeColors {
    pub fn get(&self, ty: PresentationType) -> Color3 {
        match ty {
            PresentationType::Text => self.text,
            PresentationType::Float => self.float,
            PresentationType::Boolean => self.boolean,
            PresentationType::MeshTransform => self.mesh_transform,
            PresentationType::Vector2 => self.vector2,
            PresentationType::Vector3 => self.vector3,
            PresentationType::Color3 => self.color3,
            PresentationType::Color4 => self.color4,
            PresentationType::PointSequence => self.point_sequence,
        }
    }
}

/// Point-sequence visualization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Tube colour (default: dark green)
    pub line_color: Color3,
    /// Marker colour (default: dark red)
    pub marker_color: Color3,
    /// Opacity of both materials (default: 0.4)
    pub alpha: f32,
    /// Tube radius in world units (default: 0.01)
    pub tube_radius: f32,
    /// Marker sphere diameter in world units (default: 0.08)
    pub marker_diameter: f32,
    /// Marker sphere tessellation (default: 8)
    pub marker_segments: u32,
}

fn default_float_precision() -> usize {
    4
}
fn default_one() -> f32 {
    1.0
}
fn default_observer_panel_width() -> f32 {
    160.0
}
fn default_alpha() -> f32 {
    0.4
}
fn default_anchor_offset_x() -> f32 {
    100.0
}
fn default_anchor_offset_y() -> f32 {
    200.0
}
fn default_max_console_lines() -> usize {
    10
}
fn default_console_line_height() -> f32 {
    12.0
}
fn default_console_panel_height() -> f32 {
    default_max_console_lines() as f32 * default_console_line_height()
}
fn default_observer_panel_color() -> Color3 {
    Color3::gray(0.5)
}
fn default_debug_hit_color() -> Color3 {
    Color3::RED
}
fn default_highlight_hit_color() -> Color3 {
    Color3::YELLOW
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            float_precision: default_float_precision(),
            main_panel_width: default_one(),
            console_panel_width: default_one(),
            observer_panel_width_px: default_observer_panel_width(),
            main_panel_alpha: default_alpha(),
            console_panel_alpha: default_alpha(),
            lines_alpha: default_alpha(),
            anchor_offset_x_px: default_anchor_offset_x(),
            anchor_offset_y_px: default_anchor_offset_y(),
            max_console_lines: default_max_console_lines(),
            console_line_height_px: default_console_line_height(),
            console_panel_height_px: default_console_panel_height(),
            dock_side: DockSide::default(),
            console_stamp: ConsoleStamp::default(),
            colors: ColorConfig::default(),
            path: PathConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            observer_panel: default_observer_panel_color(),
            debug_hit: default_debug_hit_color(),
            highlight_hit: default_highlight_hit_color(),
            types: TypeColors::default(),
        }
    }
}

impl Default for TypeColors {
    fn default() -> Self {
        Self {
            text: Color3::gray(0.4),
            float: Color3::new(0.6, 0.6, 0.9),
            boolean: Color3::new(0.9, 0.6, 0.6),
            mesh_transform: Color3::new(0.0, 0.1, 0.7),
            vector2: Color3::new(0.0, 0.7, 0.1),
            vector3: Color3::new(0.0, 0.7, 0.1),
            color3: Color3::BLACK,
            color4: Color3::BLACK,
            point_sequence: Color3::BLACK,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            line_color: Color3::new(0.0, 0.4, 0.0),
            marker_color: Color3::new(0.4, 0.0, 0.0),
            alpha: 0.4,
            tube_radius: 0.01,
            marker_diameter: 0.08,
            marker_segments: 8,
        }
    }
}

/// Configuration loading/validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl OverlayConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: OverlayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_console_lines == 0 {
            return Err(ConfigError::Invalid(
                "max_console_lines must be at least 1".to_string(),
            ));
        }
        if self.float_precision > 16 {
            return Err(ConfigError::Invalid(format!(
                "float_precision {} exceeds 16",
                self.float_precision
            )));
        }

        let alphas = [
            (self.main_panel_alpha, "main_panel_alpha"),
            (self.console_panel_alpha, "console_panel_alpha"),
            (self.lines_alpha, "lines_alpha"),
            (self.path.alpha, "path.alpha"),
        ];
        for (alpha, name) in alphas {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within 0.0-1.0, got {}",
                    name, alpha
                )));
            }
        }

        let sizes = [
            (self.main_panel_width, "main_panel_width"),
            (self.console_panel_width, "console_panel_width"),
            (self.observer_panel_width_px, "observer_panel_width_px"),
            (self.console_line_height_px, "console_line_height_px"),
            (self.console_panel_height_px, "console_panel_height_px"),
        ];
        for (size, name) in sizes {
            if size <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, size
                )));
            }
        }

        Ok(())
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.watchpost", "", "Watchpost")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads `overlay.toml` from the platform's configuration directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> OverlayConfig {
    let Some(path) = config_dir().map(|dir| dir.join("overlay.toml")) else {
        return OverlayConfig::default();
    };
    if !path.exists() {
        return OverlayConfig::default();
    }
    match load_from_path(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{}, using default overlay config", e);
            OverlayConfig::default()
        }
    }
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_from_path(path: &Path) -> Result<OverlayConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    OverlayConfig::from_toml_str(&content)
}
