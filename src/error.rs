use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is neither a file nor a directory: {0}")]
    PathNotAFileOrDirectory(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to load font {path}: {reason}")]
    FontLoad { path: PathBuf, reason: String },

    #[error("Failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl WatermarkError {
    /// Per-file errors are skipped by the batch; everything else ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            WatermarkError::Decode { .. }
                | WatermarkError::FontLoad { .. }
                | WatermarkError::Save { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WatermarkError>;
