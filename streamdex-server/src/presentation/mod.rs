//! Wire shapes served by the route layer and the parsing of route segments.

pub mod links;
pub mod manifest;
pub mod meta;
pub mod params;
pub mod posters;
pub mod preview;

use chrono::{Datelike, NaiveDate};

pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Absolute image URL for a TMDB image path at the given size.
pub fn tmdb_image(size: &str, path: &str) -> String {
    format!("{TMDB_IMAGE_BASE}/{size}{path}")
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?, "%Y-%m-%d").ok()
}

/// Year of a `YYYY-MM-DD` date.
pub fn release_year(raw: Option<&str>) -> Option<String> {
    parse_date(raw).map(|date| date.year().to_string())
}

/// Midnight UTC of a `YYYY-MM-DD` date in ISO 8601.
pub fn released_at(raw: Option<&str>) -> Option<String> {
    parse_date(raw).map(|date| format!("{}T00:00:00.000Z", date.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_render_as_year_and_iso_timestamp() {
        assert_eq!(release_year(Some("1999-03-31")).as_deref(), Some("1999"));
        assert_eq!(
            released_at(Some("1999-03-31")).as_deref(),
            Some("1999-03-31T00:00:00.000Z")
        );
        assert_eq!(release_year(Some("soon")), None);
        assert_eq!(released_at(None), None);
    }
}
