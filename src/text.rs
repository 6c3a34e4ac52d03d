use chrono::NaiveDate;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Choose the watermark text: capture date, then the caller's default, then today.
pub fn resolve(capture_date: Option<NaiveDate>, default_text: Option<&str>) -> String {
    resolve_with_today(capture_date, default_text, chrono::Local::now().date_naive())
}

pub fn resolve_with_today(
    capture_date: Option<NaiveDate>,
    default_text: Option<&str>,
    today: NaiveDate,
) -> String {
    if let Some(date) = capture_date {
        return date.format(DATE_FORMAT).to_string();
    }

    match default_text {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => {
            warn!("No capture date and no default text, using current date");
            today.format(DATE_FORMAT).to_string()
        }
    }
}
