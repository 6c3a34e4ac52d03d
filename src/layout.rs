use crate::error::WatermarkError;
use std::fmt;
use std::str::FromStr;

/// Distance in pixels between the watermark and the image edges it is anchored to
pub const MARGIN: i64 = 10;

/// Placement anchor for the watermark text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::TopLeft,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
        Position::Center,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
            Position::Center => "center",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                WatermarkError::InvalidConfiguration(format!(
                    "unknown position '{}', expected one of: top-left, top-right, bottom-left, bottom-right, center",
                    s
                ))
            })
    }
}

/// Compute the top-left pixel at which text of the given extent is drawn.
///
/// The result is not clamped: text larger than the image yields negative
/// coordinates and is drawn partly off-canvas.
pub fn place(
    image_width: u32,
    image_height: u32,
    text_width: u32,
    text_height: u32,
    position: Position,
) -> (i32, i32) {
    let (iw, ih) = (image_width as i64, image_height as i64);
    let (tw, th) = (text_width as i64, text_height as i64);

    let (x, y) = match position {
        Position::TopLeft => (MARGIN, MARGIN),
        Position::TopRight => (iw - tw - MARGIN, MARGIN),
        Position::BottomLeft => (MARGIN, ih - th - MARGIN),
        Position::BottomRight => (iw - tw - MARGIN, ih - th - MARGIN),
        Position::Center => ((iw - tw).div_euclid(2), (ih - th).div_euclid(2)),
    };

    (x as i32, y as i32)
}
