use crate::config::WatermarkConfig;
use crate::font::Typeface;
use crate::layout::place;
use image::{DynamicImage, GrayImage, Rgb};

/// How the watermark text is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: u32,
    pub color: Rgb<u8>,
    /// 0 (invisible) to 100 (opaque)
    pub opacity: u8,
}

impl From<&WatermarkConfig> for TextStyle {
    fn from(config: &WatermarkConfig) -> Self {
        Self {
            font_size: config.font_size,
            color: config.color,
            opacity: config.opacity,
        }
    }
}

/// Scale an opacity percentage to an 8-bit alpha value.
pub fn opacity_to_alpha(opacity: u8) -> u8 {
    (opacity.min(100) as u32 * 255 / 100) as u8
}

/// Composite `text` onto a copy of `image` with its top-left corner at `origin`.
///
/// Pixels not touched by a glyph keep their original value. The result has an
/// alpha channel only if the source had one.
pub fn render(
    image: &DynamicImage,
    text: &str,
    origin: (i32, i32),
    typeface: &Typeface,
    style: &TextStyle,
) -> DynamicImage {
    let mut canvas = image.to_rgba8();
    let mut coverage = GrayImage::new(canvas.width(), canvas.height());
    typeface.draw_coverage(&mut coverage, origin.0, origin.1, style.font_size, text);

    const FULL: u32 = 255 * 255;
    let alpha = opacity_to_alpha(style.opacity) as u32;
    let color = style.color;

    for (pixel, cover) in canvas.pixels_mut().zip(coverage.pixels()) {
        let weight = cover[0] as u32 * alpha;
        if weight == 0 {
            continue;
        }
        for channel in 0..3 {
            let blended =
                pixel[channel] as u32 * (FULL - weight) + color[channel] as u32 * weight;
            pixel[channel] = ((blended + FULL / 2) / FULL) as u8;
        }
        let blended_alpha = 255 * weight + pixel[3] as u32 * (FULL - weight);
        pixel[3] = ((blended_alpha + FULL / 2) / FULL) as u8;
    }

    if image.color().has_alpha() {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }
}

/// Measure, place and render the watermark text for one image.
pub fn apply_watermark(
    image: &DynamicImage,
    text: &str,
    typeface: &Typeface,
    config: &WatermarkConfig,
) -> DynamicImage {
    let style = TextStyle::from(config);
    let (text_width, text_height) = typeface.text_size(style.font_size, text);
    let origin = place(
        image.width(),
        image.height(),
        text_width,
        text_height,
        config.position,
    );
    render(image, text, origin, typeface, &style)
}
