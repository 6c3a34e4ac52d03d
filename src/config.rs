use crate::color::parse_color;
use crate::error::WatermarkError;
use crate::font::font_candidates;
use crate::layout::Position;
use image::Rgb;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw watermark settings, as read from a TOML file and the command line.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatermarkSettings {
    pub font_size: i64,
    pub color: String,
    pub position: String,
    pub opacity: i64,
    pub default_text: Option<String>,
    pub fonts: Vec<PathBuf>,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            font_size: 16,
            color: "white".to_string(),
            position: "bottom-right".to_string(),
            opacity: 80,
            default_text: None,
            fonts: Vec::new(),
        }
    }
}

impl WatermarkSettings {
    pub fn load_from_file(path: &Path) -> Result<Self, WatermarkError> {
        let config_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            WatermarkError::ConfigFile {
                path: path.to_path_buf(),
                source,
            }
        };

        let content = std::fs::read_to_string(path).map_err(|e| config_error(Box::new(e)))?;
        toml_edit::de::from_str::<WatermarkSettings>(&content).map_err(|e| config_error(Box::new(e)))
    }
}

/// Validated watermark configuration, fixed for the whole batch.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkConfig {
    pub font_size: u32,
    pub color: Rgb<u8>,
    pub position: Position,
    pub opacity: u8,
    pub default_text: Option<String>,
    pub font_candidates: Vec<PathBuf>,
}

impl TryFrom<&WatermarkSettings> for WatermarkConfig {
    type Error = WatermarkError;

    fn try_from(settings: &WatermarkSettings) -> Result<Self, Self::Error> {
        if settings.font_size <= 0 || settings.font_size > u32::MAX as i64 {
            return Err(WatermarkError::InvalidConfiguration(format!(
                "font size must be a positive integer, got {}",
                settings.font_size
            )));
        }

        if !(0..=100).contains(&settings.opacity) {
            return Err(WatermarkError::InvalidConfiguration(format!(
                "opacity must be between 0 and 100, got {}",
                settings.opacity
            )));
        }

        Ok(Self {
            font_size: settings.font_size as u32,
            color: parse_color(&settings.color)?,
            position: settings.position.parse()?,
            opacity: settings.opacity as u8,
            default_text: settings.default_text.clone().filter(|t| !t.is_empty()),
            font_candidates: font_candidates(&settings.fonts),
        })
    }
}

impl TryFrom<WatermarkSettings> for WatermarkConfig {
    type Error = WatermarkError;

    fn try_from(settings: WatermarkSettings) -> Result<Self, Self::Error> {
        WatermarkConfig::try_from(&settings)
    }
}
