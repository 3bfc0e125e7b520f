//! Session configuration.

use crate::error::ConfigError;
use crate::shapes::SerializableColor;
use crate::surface::BorderStyle;
use crate::tools::{InteractionMode, MIN_MOTION};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default stroke width in logical units.
pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;

/// Defaults applied to text shapes inserted through the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextDefaults {
    pub font_size: f64,
    pub scale: f64,
    pub rotate: f64,
    pub color: SerializableColor,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_size: 20.0,
            scale: 0.8,
            rotate: 0.0,
            color: SerializableColor::new(0x4a, 0x4a, 0x4a, 255),
        }
    }
}

/// Styling for shapes the surface selects and manipulates itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeConfiguration {
    pub border_color: SerializableColor,
    pub border_style: BorderStyle,
    pub border_stroke_width: f64,
}

impl Default for ShapeConfiguration {
    fn default() -> Self {
        Self {
            border_color: SerializableColor::transparent(),
            border_style: BorderStyle::Dashed,
            border_stroke_width: 1.0,
        }
    }
}

/// Everything an editing session needs to know up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Authoring actor stamped on new operations.
    pub user: Option<String>,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    /// Device pixels per logical unit.
    pub screen_scale: f64,
    /// Zoom applied by the host view; pointer motion is divided by it.
    pub scale: f64,
    pub touch_enabled: bool,
    pub mode: InteractionMode,
    /// Minimum per-axis motion before a stroke sample is kept.
    pub motion_threshold: f64,
    pub text: TextDefaults,
    pub shape: ShapeConfiguration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: None,
            stroke_color: SerializableColor::black(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            screen_scale: 1.0,
            scale: 1.0,
            touch_enabled: true,
            mode: InteractionMode::Draw,
            motion_threshold: MIN_MOTION,
            text: TextDefaults::default(),
            shape: ShapeConfiguration::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_screen_scale(mut self, screen_scale: f64) -> Self {
        self.screen_scale = screen_scale;
        self
    }

    pub fn with_mode(mut self, mode: InteractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace non-positive scale factors, which would make every transform
    /// divide by zero, with 1.
    fn sanitized(mut self) -> Self {
        if self.screen_scale.is_nan() || self.screen_scale <= 0.0 {
            log::warn!("Ignoring screen scale {}, using 1", self.screen_scale);
            self.screen_scale = 1.0;
        }
        if self.scale.is_nan() || self.scale <= 0.0 {
            log::warn!("Ignoring zoom scale {}, using 1", self.scale);
            self.scale = 1.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.stroke_width, 3.0);
        assert_eq!(config.motion_threshold, 2.5);
        assert_eq!(config.mode, InteractionMode::Draw);
        assert!(config.touch_enabled);
        assert_eq!(config.text.color.to_string(), "#4a4a4a");
    }

    #[test]
    fn test_partial_json() {
        let config = SessionConfig::from_json(
            r##"{ "user": "ana", "strokeColor": "#ff0000", "screenScale": 2.5, "mode": "text" }"##,
        )
        .unwrap();
        assert_eq!(config.user.as_deref(), Some("ana"));
        assert_eq!(config.stroke_color, SerializableColor::new(255, 0, 0, 255));
        assert_eq!(config.screen_scale, 2.5);
        assert_eq!(config.mode, InteractionMode::Text);
        assert_eq!(config.stroke_width, 3.0);
    }

    #[test]
    fn test_bad_scale_sanitized() {
        let config = SessionConfig::from_json(r#"{ "screenScale": 0, "scale": -2 }"#).unwrap();
        assert_eq!(config.screen_scale, 1.0);
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SessionConfig::from_json(r#"{ "strokeColor": "blue" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "strokeWidth": 9, "touchEnabled": false }}"#).unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.stroke_width, 9.0);
        assert!(!config.touch_enabled);

        assert!(matches!(
            SessionConfig::load("/nonexistent/sketchlog.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
