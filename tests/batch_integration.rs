use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photo_watermark::{
    Typeface, WatermarkConfig, WatermarkError, WatermarkSettings, batch, metadata,
};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Little-endian TIFF block holding only an Exif IFD with DateTimeOriginal
fn exif_tiff(datetime: &str) -> Vec<u8> {
    let mut value = datetime.as_bytes().to_vec();
    value.push(0);

    let ifd0_offset: u32 = 8;
    let exif_ifd_offset: u32 = ifd0_offset + 18;
    let value_offset: u32 = exif_ifd_offset + 18;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&ifd0_offset.to_le_bytes());

    // IFD0: pointer to the Exif sub-IFD
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&exif_ifd_offset.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    // Exif IFD: DateTimeOriginal as ASCII
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&(value.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&value_offset.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    tiff.extend_from_slice(&value);
    tiff
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

fn test_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(200, 120, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    }))
}

/// A JPEG whose APP1 segment carries the given capture time
fn jpeg_with_capture_date(datetime: &str) -> Vec<u8> {
    let jpeg = encode(&test_image(), ImageFormat::Jpeg);
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&exif_tiff(datetime));

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn create_album(temp_dir: &TempDir) -> PathBuf {
    let album = temp_dir.path().join("album");
    std::fs::create_dir_all(&album).unwrap();
    std::fs::write(
        album.join("photo.jpg"),
        jpeg_with_capture_date("2023:05:01 12:00:00"),
    )
    .unwrap();
    std::fs::write(album.join("plain.png"), encode(&test_image(), ImageFormat::Png)).unwrap();
    std::fs::write(album.join("notes.txt"), b"not an image").unwrap();
    album
}

fn default_config() -> WatermarkConfig {
    WatermarkConfig::try_from(WatermarkSettings::default()).unwrap()
}

fn text_for<'a>(report: &'a batch::BatchReport, file_name: &str) -> &'a str {
    report
        .processed
        .iter()
        .find(|p| p.source.file_name().unwrap() == file_name)
        .map(|p| p.text.as_str())
        .unwrap()
}

fn read_dir_sorted(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            (
                path.file_name().unwrap().to_string_lossy().to_string(),
                std::fs::read(&path).unwrap(),
            )
        })
        .collect();
    entries.sort();
    entries
}

#[test]
fn test_fixture_jpeg_carries_capture_date() {
    let bytes = jpeg_with_capture_date("2023:05:01 12:00:00");
    assert_eq!(
        metadata::capture_date(&bytes),
        chrono::NaiveDate::from_ymd_opt(2023, 5, 1)
    );
    // The extra segment must not break decoding
    assert!(image::load_from_memory(&bytes).is_ok());
}

#[test]
fn test_jpeg_gets_capture_date_and_png_gets_today() {
    let temp_dir = TempDir::new().unwrap();
    let album = create_album(&temp_dir);

    let before = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let report = batch::run(&album, &default_config(), &Typeface::Builtin).unwrap();
    let after = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();

    let output_dir = temp_dir.path().join("album_watermark");
    assert_eq!(report.output_directory, output_dir);
    assert_eq!(report.total(), 2);
    assert!(report.failed.is_empty());

    let files: Vec<String> = read_dir_sorted(&output_dir).into_iter().map(|(n, _)| n).collect();
    assert_eq!(files, vec!["photo.jpg".to_string(), "plain.png".to_string()]);

    assert_eq!(text_for(&report, "photo.jpg"), "2023-05-01");
    let png_text = text_for(&report, "plain.png");
    assert!(png_text == before || png_text == after);
}

#[test]
fn test_default_text_replaces_missing_date_only() {
    let temp_dir = TempDir::new().unwrap();
    let album = create_album(&temp_dir);

    let config = WatermarkConfig::try_from(WatermarkSettings {
        default_text: Some("My Photo".to_string()),
        ..Default::default()
    })
    .unwrap();
    let report = batch::run(&album, &config, &Typeface::Builtin).unwrap();

    assert_eq!(text_for(&report, "photo.jpg"), "2023-05-01");
    assert_eq!(text_for(&report, "plain.png"), "My Photo");
}

#[test]
fn test_outputs_decode_in_the_source_format() {
    let temp_dir = TempDir::new().unwrap();
    let album = create_album(&temp_dir);
    let report = batch::run(&album, &default_config(), &Typeface::Builtin).unwrap();

    for processed in &report.processed {
        let bytes = std::fs::read(&processed.output).unwrap();
        let expected = image::guess_format(&std::fs::read(&processed.source).unwrap()).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), expected);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 120));
        assert_ne!(processed.output, processed.source);
    }
}

#[test]
fn test_watermark_changes_png_pixels() {
    let temp_dir = TempDir::new().unwrap();
    let album = create_album(&temp_dir);
    let config = WatermarkConfig::try_from(WatermarkSettings {
        opacity: 100,
        color: "#000000".to_string(),
        default_text: Some("SAMPLE".to_string()),
        ..Default::default()
    })
    .unwrap();
    batch::run(&album, &config, &Typeface::Builtin).unwrap();

    let original = image::open(album.join("plain.png")).unwrap().to_rgb8();
    let output = image::open(temp_dir.path().join("album_watermark/plain.png"))
        .unwrap()
        .to_rgb8();

    let changed: Vec<(u32, u32)> = original
        .enumerate_pixels()
        .filter(|(x, y, p)| output.get_pixel(*x, *y) != *p)
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!changed.is_empty());

    // 16px text uses 2px cells: six glyphs span 70x14, anchored bottom-right
    let (left, top) = (200 - 70 - 10, 120 - 14 - 10);
    assert!(
        changed
            .iter()
            .all(|(x, y)| *x >= left && *x < 190 && *y >= top && *y < 110)
    );
}

#[test]
fn test_rerun_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let album = create_album(&temp_dir);
    let config = WatermarkConfig::try_from(WatermarkSettings {
        default_text: Some("fixed".to_string()),
        ..Default::default()
    })
    .unwrap();
    let output_dir = temp_dir.path().join("album_watermark");

    batch::run(&album, &config, &Typeface::Builtin).unwrap();
    let first = read_dir_sorted(&output_dir);
    batch::run(&album, &config, &Typeface::Builtin).unwrap();
    let second = read_dir_sorted(&output_dir);

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_single_file_goes_to_stem_directory() {
    let temp_dir = TempDir::new().unwrap();
    let album = create_album(&temp_dir);

    let report = batch::run(&album.join("photo.jpg"), &default_config(), &Typeface::Builtin).unwrap();

    let expected = album.join("photo_watermark").join("photo.jpg");
    assert_eq!(report.processed.len(), 1);
    assert_eq!(report.processed[0].output, expected);
    assert!(expected.exists());
    assert!(!temp_dir.path().join("album_watermark").exists());
}

#[test]
fn test_invalid_opacity_fails_before_touching_files() {
    let temp_dir = TempDir::new().unwrap();
    create_album(&temp_dir);

    let result = WatermarkConfig::try_from(WatermarkSettings {
        opacity: 150,
        ..Default::default()
    });

    assert!(matches!(result, Err(WatermarkError::InvalidConfiguration(_))));
    assert!(!temp_dir.path().join("album_watermark").exists());
}

#[test]
fn test_missing_input_path_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let result = batch::run(
        &temp_dir.path().join("does-not-exist"),
        &default_config(),
        &Typeface::Builtin,
    );
    match result {
        Err(e) => {
            assert!(matches!(e, WatermarkError::PathNotFound(_)));
            assert!(e.is_fatal());
        }
        Ok(_) => panic!("expected PathNotFound"),
    }
}
