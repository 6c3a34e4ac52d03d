pub mod batch;
pub mod color;
pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod metadata;
pub mod render;
pub mod text;

pub use batch::{BatchInput, BatchReport, Processed, SourceImage, process_file, run};
pub use config::{WatermarkConfig, WatermarkSettings};
pub use error::WatermarkError;
pub use font::Typeface;
pub use layout::{MARGIN, Position, place};
pub use render::{TextStyle, apply_watermark, render};
