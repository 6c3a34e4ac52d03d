use crate::error::WatermarkError;
use ab_glyph::{FontVec, PxScale};
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fonts probed after any user supplied ones. CJK-capable faces come first so
/// that non-Latin default text renders when such a font is installed.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "C:/Windows/Fonts/simhei.ttf",
    "C:/Windows/Fonts/msyh.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "C:/Windows/Fonts/arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// Ordered list of font files to try: user fonts, then the defaults.
pub fn font_candidates(user_fonts: &[PathBuf]) -> Vec<PathBuf> {
    user_fonts
        .iter()
        .cloned()
        .chain(DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from))
        .collect()
}

/// The face used to draw watermark text.
pub enum Typeface {
    /// A TrueType/OpenType font loaded from disk
    Vector { font: FontVec, source: PathBuf },
    /// Bitmap font compiled into the binary, covering ASCII only
    Builtin,
}

impl Typeface {
    /// Load the first usable font among `candidates`, or the built-in font.
    pub fn load(candidates: &[PathBuf]) -> Typeface {
        for path in candidates {
            match Typeface::from_file(path) {
                Ok(typeface) => {
                    info!("Using font {}", path.display());
                    return typeface;
                }
                Err(e) => debug!("{}", e),
            }
        }

        warn!("No usable font found, falling back to the built-in font (ASCII only)");
        Typeface::Builtin
    }

    pub fn from_file(path: &Path) -> Result<Typeface, WatermarkError> {
        let font_error = |reason: String| WatermarkError::FontLoad {
            path: path.to_path_buf(),
            reason,
        };

        let font_data = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let font = FontVec::try_from_vec(font_data).map_err(|e| font_error(e.to_string()))?;

        Ok(Typeface::Vector {
            font,
            source: path.to_path_buf(),
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Typeface::Vector { source, .. } => source.display().to_string(),
            Typeface::Builtin => "built-in".to_string(),
        }
    }

    /// Width and height in pixels of `text` at `font_size`.
    pub fn text_size(&self, font_size: u32, text: &str) -> (u32, u32) {
        match self {
            Typeface::Vector { font, .. } => text_size(PxScale::from(font_size as f32), font, text),
            Typeface::Builtin => builtin::text_size(font_size, text),
        }
    }

    /// Draw `text` into a coverage mask, 255 meaning fully covered.
    pub fn draw_coverage(&self, mask: &mut GrayImage, x: i32, y: i32, font_size: u32, text: &str) {
        match self {
            Typeface::Vector { font, .. } => draw_text_mut(
                mask,
                Luma([255u8]),
                x,
                y,
                PxScale::from(font_size as f32),
                font,
                text,
            ),
            Typeface::Builtin => builtin::draw(mask, x, y, font_size, text),
        }
    }
}

mod builtin {
    use image::{GrayImage, Luma};

    const GLYPH_WIDTH: u32 = 5;
    const GLYPH_HEIGHT: u32 = 7;
    const ADVANCE: u32 = GLYPH_WIDTH + 1;

    // Each row holds five pixels, most significant bit on the left
    const BOX: [u8; 7] = [
        0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
    ];

    fn glyph(c: char) -> [u8; 7] {
        match c.to_ascii_uppercase() {
            ' ' => [0, 0, 0, 0, 0, 0, 0],
            '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
            '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
            '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
            '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
            '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
            '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
            '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
            '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
            '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
            '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
            'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
            'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
            'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
            'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
            'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
            'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
            'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
            'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
            'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
            'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
            'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
            'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
            'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
            'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
            'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
            'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
            'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
            'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
            'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
            'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
            'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
            'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
            'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
            'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
            'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
            'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
            '-' => [0, 0, 0, 0b11111, 0, 0, 0],
            '_' => [0, 0, 0, 0, 0, 0, 0b11111],
            '+' => [0, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0],
            ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
            '.' => [0, 0, 0, 0, 0, 0b01100, 0b01100],
            ',' => [0, 0, 0, 0, 0b01100, 0b00100, 0b01000],
            '/' => [0b00001, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000],
            '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
            ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
            '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0, 0b00100],
            '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0, 0b00100],
            '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
            '\'' => [0b00100, 0b00100, 0b01000, 0, 0, 0, 0],
            '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
            '@' => [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110],
            _ => BOX,
        }
    }

    /// Pixel size of one glyph cell, so the glyph height tracks the font size.
    fn pixel_size(font_size: u32) -> u32 {
        (font_size / GLYPH_HEIGHT).max(1)
    }

    pub fn text_size(font_size: u32, text: &str) -> (u32, u32) {
        let scale = pixel_size(font_size);
        let count = text.chars().count() as u32;
        if count == 0 {
            return (0, 0);
        }
        ((count * ADVANCE - 1) * scale, GLYPH_HEIGHT * scale)
    }

    pub fn draw(mask: &mut GrayImage, x: i32, y: i32, font_size: u32, text: &str) {
        let scale = pixel_size(font_size) as i64;
        let (width, height) = (mask.width() as i64, mask.height() as i64);

        for (index, c) in text.chars().enumerate() {
            let origin_x = x as i64 + index as i64 * ADVANCE as i64 * scale;
            for (row, bits) in glyph(c).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let cell_x = origin_x + col as i64 * scale;
                    let cell_y = y as i64 + row as i64 * scale;
                    for py in cell_y.max(0)..(cell_y + scale).min(height) {
                        for px in cell_x.max(0)..(cell_x + scale).min(width) {
                            mask.put_pixel(px as u32, py as u32, Luma([255]));
                        }
                    }
                }
            }
        }
    }
}
