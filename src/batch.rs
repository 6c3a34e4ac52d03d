use crate::config::WatermarkConfig;
use crate::error::{Result, WatermarkError};
use crate::font::Typeface;
use crate::metadata::capture_date;
use crate::render::apply_watermark;
use crate::text::resolve;
use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

pub const OUTPUT_SUFFIX: &str = "_watermark";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "gif", "webp"];

/// Whether the file name carries one of the recognized image extensions.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// An image file decoded for watermarking
pub struct SourceImage {
    pub path: PathBuf,
    pub image: DynamicImage,
    pub format: ImageFormat,
    pub capture_date: Option<NaiveDate>,
}

impl SourceImage {
    pub fn open(path: &Path) -> Result<Self> {
        let decode_error = |source: image::ImageError| WatermarkError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let data = std::fs::read(path).map_err(|e| decode_error(e.into()))?;
        let format = image::guess_format(&data).map_err(decode_error)?;
        let image = image::load_from_memory_with_format(&data, format).map_err(decode_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            image,
            format,
            capture_date: capture_date(&data),
        })
    }
}

/// What the input path resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum BatchInput {
    File(PathBuf),
    Directory(PathBuf),
}

impl BatchInput {
    pub fn resolve(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WatermarkError::PathNotFound(path.to_path_buf()));
        }

        // "." and ".." have no file name of their own
        let path = if path.file_name().is_none() {
            path.canonicalize()
                .map_err(|_| WatermarkError::PathNotFound(path.to_path_buf()))?
        } else {
            path.to_path_buf()
        };

        if path.is_file() {
            Ok(BatchInput::File(path))
        } else if path.is_dir() {
            Ok(BatchInput::Directory(path))
        } else {
            Err(WatermarkError::PathNotAFileOrDirectory(path))
        }
    }

    /// Sibling directory that receives the watermarked copies.
    ///
    /// `photos/` maps to `photos_watermark/`; a single file `photos/a.jpg`
    /// maps to `photos/a_watermark/`.
    pub fn output_directory(&self) -> PathBuf {
        let (path, name) = match self {
            BatchInput::Directory(path) => (path, path.file_name()),
            BatchInput::File(path) => (path, path.file_stem()),
        };
        let mut dir_name = name.unwrap_or_default().to_os_string();
        dir_name.push(OUTPUT_SUFFIX);

        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(dir_name),
            _ => PathBuf::from(dir_name),
        }
    }

    /// Candidate images paired with their destination paths.
    pub fn targets(&self) -> Vec<(PathBuf, PathBuf)> {
        let output_dir = self.output_directory();
        match self {
            BatchInput::File(path) => {
                if !is_image(path) {
                    warn!("{} is not a supported image format", path.display());
                    return Vec::new();
                }
                let file_name = path.file_name().unwrap_or_default();
                vec![(path.clone(), output_dir.join(file_name))]
            }
            BatchInput::Directory(root) => {
                let mut targets = Vec::new();
                for entry in WalkDir::new(root)
                    .follow_links(true)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    let path = entry.path();
                    if !entry.file_type().is_file() || !is_image(path) {
                        continue;
                    }
                    if let Ok(relative) = path.strip_prefix(root) {
                        targets.push((path.to_path_buf(), output_dir.join(relative)));
                    }
                }
                targets
            }
        }
    }
}

/// A file that was watermarked and written
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub source: PathBuf,
    pub output: PathBuf,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub output_directory: PathBuf,
    pub processed: Vec<Processed>,
    pub failed: Vec<(PathBuf, WatermarkError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Watermark one file and write the result to `output`.
pub fn process_file(
    source: &Path,
    output: &Path,
    config: &WatermarkConfig,
    typeface: &Typeface,
) -> Result<Processed> {
    let source_image = SourceImage::open(source)?;
    let text = resolve(source_image.capture_date, config.default_text.as_deref());
    debug!("Watermark text for {}: {}", source.display(), text);

    let watermarked = apply_watermark(&source_image.image, &text, typeface, config);

    let save_error = |source: image::ImageError| WatermarkError::Save {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| save_error(e.into()))?;
    }
    watermarked
        .save_with_format(output, source_image.format)
        .map_err(save_error)?;

    info!("Saved watermarked image to {}", output.display());
    Ok(Processed {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        text,
    })
}

/// Watermark every image under `path`, skipping files that fail.
///
/// Only an unusable input path ends the run early.
pub fn run(path: &Path, config: &WatermarkConfig, typeface: &Typeface) -> Result<BatchReport> {
    let input = BatchInput::resolve(path)?;
    let mut report = BatchReport {
        output_directory: input.output_directory(),
        ..Default::default()
    };

    for (source, output) in input.targets() {
        match process_file(&source, &output, config, typeface) {
            Ok(processed) => report.processed.push(processed),
            Err(e) => {
                error!("Failed to process {}: {}", source.display(), e);
                report.failed.push((source, e));
            }
        }
    }

    info!(
        "Done: {} files, {} succeeded, {} failed",
        report.total(),
        report.processed.len(),
        report.failed.len()
    );
    Ok(report)
}
