use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use photo_watermark::{Typeface, WatermarkConfig, WatermarkSettings, batch};

/// Stamp photos with their capture date (or a text of your choice)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Image file or directory of images
    #[arg(short, long)]
    path: PathBuf,

    /// Font size in pixels [default: 16]
    #[arg(short = 's', long, allow_negative_numbers = true)]
    font_size: Option<i64>,

    /// Color name, #rgb, #rrggbb or rgb(r, g, b) [default: white]
    #[arg(short, long)]
    color: Option<String>,

    /// top-left, top-right, bottom-left, bottom-right or center [default: bottom-right]
    #[arg(long, visible_alias = "pos")]
    position: Option<String>,

    /// Opacity from 0 (invisible) to 100 (opaque) [default: 80]
    #[arg(short, long, allow_negative_numbers = true)]
    opacity: Option<i64>,

    /// Text used when an image has no capture date [default: today's date]
    #[arg(short, long)]
    default_text: Option<String>,

    /// Font file to try before the system fonts (repeatable)
    #[arg(short, long = "font")]
    fonts: Vec<PathBuf>,

    /// TOML file with watermark settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    fn settings(&self) -> Result<WatermarkSettings, Box<dyn std::error::Error>> {
        let mut settings = match &self.config {
            Some(path) => WatermarkSettings::load_from_file(path)?,
            None => WatermarkSettings::default(),
        };

        if let Some(font_size) = self.font_size {
            settings.font_size = font_size;
        }
        if let Some(color) = &self.color {
            settings.color = color.clone();
        }
        if let Some(position) = &self.position {
            settings.position = position.clone();
        }
        if let Some(opacity) = self.opacity {
            settings.opacity = opacity;
        }
        if self.default_text.is_some() {
            settings.default_text = self.default_text.clone();
        }
        // Fonts given on the command line are tried before those from the file
        settings.fonts.splice(0..0, self.fonts.iter().cloned());

        Ok(settings)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Everything that can be wrong with the configuration fails here, before any file is touched
    let config = WatermarkConfig::try_from(cli.settings()?)?;
    info!(
        "Watermark: size {}, color {:?}, position {}, opacity {}",
        config.font_size, config.color.0, config.position, config.opacity
    );

    let typeface = Typeface::load(&config.font_candidates);
    let report = batch::run(&cli.path, &config, &typeface)?;

    if !report.failed.is_empty() {
        info!(
            "{} file(s) could not be watermarked, see errors above",
            report.failed.len()
        );
    }
    info!("Output directory: {}", report.output_directory.display());

    Ok(())
}
