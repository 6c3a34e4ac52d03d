use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

/// Read the capture date from EXIF data embedded in an encoded image.
///
/// Formats that carry no EXIF (PNG, BMP, GIF) and EXIF blocks that are
/// corrupt or lack a usable date both yield `None`.
pub fn capture_date(data: &[u8]) -> Option<NaiveDate> {
    match rexif::parse_buffer(data) {
        Ok(exif_data) => extract_capture_date(&exif_data),
        Err(e) => {
            trace!("No EXIF data: {}", e);
            None
        }
    }
}

fn extract_capture_date(exif: &rexif::ExifData) -> Option<NaiveDate> {
    // Original capture first, then the time the image was digitized
    let date_fields = [
        rexif::ExifTag::DateTimeOriginal,
        rexif::ExifTag::DateTimeDigitized,
    ];

    for field in &date_fields {
        if let Some(entry) = exif.entries.iter().find(|e| e.tag == *field) {
            if let Some(date) = parse_exif_date(&entry.value_more_readable) {
                debug!("Found capture date in {:?}: {}", field, date);
                return Some(date);
            }
            debug!(
                "Unparseable {:?} value: {:?}",
                field, entry.value_more_readable
            );
        }
    }

    None
}

/// Parse an EXIF datetime such as "2005:07:30 07:22:46" down to its date.
pub fn parse_exif_date(datetime_str: &str) -> Option<NaiveDate> {
    let datetime_str = datetime_str.trim().trim_end_matches('\0');

    if let Ok(naive_dt) = NaiveDateTime::parse_from_str(datetime_str, "%Y:%m:%d %H:%M:%S") {
        return Some(naive_dt.date());
    }

    // Fall back to the date part alone, with any of the usual separators
    let date_part = datetime_str.split_whitespace().next()?;
    let formats = ["%Y:%m:%d", "%Y-%m-%d", "%Y/%m/%d"];
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_exif_datetime() {
        assert_eq!(
            parse_exif_date("2023:05:01 14:30:25"),
            NaiveDate::from_ymd_opt(2023, 5, 1)
        );
    }

    #[test]
    fn test_parse_date_only_and_alternative_separators() {
        let expected = NaiveDate::from_ymd_opt(2021, 12, 24);
        assert_eq!(parse_exif_date("2021:12:24"), expected);
        assert_eq!(parse_exif_date("2021-12-24 08:00:00"), expected);
        assert_eq!(parse_exif_date("2021/12/24"), expected);
        // Malformed time part still yields the date
        assert_eq!(parse_exif_date("2021:12:24 99:99"), expected);
    }

    #[test]
    fn test_parse_garbage_is_absent() {
        assert_eq!(parse_exif_date(""), None);
        assert_eq!(parse_exif_date("    :  :     :  :  "), None);
        assert_eq!(parse_exif_date("yesterday"), None);
        assert_eq!(parse_exif_date("2023:13:45 00:00:00"), None);
    }

    #[test]
    fn test_non_exif_data_is_absent() {
        assert_eq!(capture_date(b"not an image at all"), None);
        assert_eq!(capture_date(&[]), None);
    }

    #[test]
    fn test_png_has_no_capture_date() {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        assert_eq!(capture_date(&bytes), None);
    }
}
