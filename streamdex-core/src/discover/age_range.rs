use std::{fmt, str::FromStr};

use crate::types::MediaKind;

/// Genres excluded from the youngest movie catalogs: horror, drama,
/// thriller, crime, war, western, romance, war & politics, talk, soap,
/// reality, news, mystery, documentary, history.
pub const CHILD_EXCLUDED_GENRES: &str =
    "27,18,53,80,10752,37,10749,10768,10767,10766,10764,10763,9648,99,36";
pub const KIDS_GENRE: &str = "10762";
pub const ANIMATION_GENRE: &str = "16";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeRange {
    UpToFive,
    SixToEleven,
    TwelveToFifteen,
    SixteenToSeventeen,
    Adult,
}

impl AgeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            AgeRange::UpToFive => "0-5",
            AgeRange::SixToEleven => "6-11",
            AgeRange::TwelveToFifteen => "12-15",
            AgeRange::SixteenToSeventeen => "16-17",
            AgeRange::Adult => "18+",
        }
    }

    /// Upstream discover parameters enforcing this range.
    pub fn constraints(self, kind: MediaKind) -> Vec<(&'static str, &'static str)> {
        match (self, kind) {
            (AgeRange::UpToFive | AgeRange::SixToEleven, MediaKind::Movie) => vec![
                ("certification_country", "US"),
                ("certification", "G"),
                ("without_genres", CHILD_EXCLUDED_GENRES),
            ],
            (AgeRange::UpToFive | AgeRange::SixToEleven, MediaKind::Series) => {
                vec![("with_genres", KIDS_GENRE)]
            }
            (AgeRange::TwelveToFifteen, MediaKind::Movie) => vec![
                ("certification_country", "US"),
                ("certification", "PG"),
            ],
            (AgeRange::TwelveToFifteen, MediaKind::Series) => {
                vec![("with_genres", ANIMATION_GENRE)]
            }
            (AgeRange::SixteenToSeventeen, MediaKind::Movie) => vec![
                ("certification_country", "US"),
                ("certification", "PG-13"),
            ],
            (AgeRange::Adult, MediaKind::Movie) => vec![("include_adult", "true")],
            (AgeRange::SixteenToSeventeen | AgeRange::Adult, MediaKind::Series) => Vec::new(),
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAgeRange(pub String);

impl FromStr for AgeRange {
    type Err = UnknownAgeRange;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "0-5" => Ok(AgeRange::UpToFive),
            "6-11" => Ok(AgeRange::SixToEleven),
            "12-15" => Ok(AgeRange::TwelveToFifteen),
            "16-17" => Ok(AgeRange::SixteenToSeventeen),
            "18+" => Ok(AgeRange::Adult),
            other => Err(UnknownAgeRange(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn young_ranges_share_constraints() {
        for range in [AgeRange::UpToFive, AgeRange::SixToEleven] {
            assert_eq!(
                range.constraints(MediaKind::Movie),
                vec![
                    ("certification_country", "US"),
                    ("certification", "G"),
                    ("without_genres", CHILD_EXCLUDED_GENRES),
                ]
            );
            assert_eq!(
                range.constraints(MediaKind::Series),
                vec![("with_genres", "10762")]
            );
        }
    }

    #[test]
    fn older_ranges() {
        assert_eq!(
            AgeRange::TwelveToFifteen.constraints(MediaKind::Series),
            vec![("with_genres", "16")]
        );
        assert_eq!(
            AgeRange::SixteenToSeventeen.constraints(MediaKind::Movie)[1],
            ("certification", "PG-13")
        );
        assert!(AgeRange::SixteenToSeventeen.constraints(MediaKind::Series).is_empty());
        assert_eq!(
            AgeRange::Adult.constraints(MediaKind::Movie),
            vec![("include_adult", "true")]
        );
        assert!(AgeRange::Adult.constraints(MediaKind::Series).is_empty());
    }

    #[test]
    fn parses_known_tags_only() {
        assert_eq!("18+".parse::<AgeRange>(), Ok(AgeRange::Adult));
        assert_eq!("12-15".parse::<AgeRange>().map(AgeRange::as_str), Ok("12-15"));
        assert!("13+".parse::<AgeRange>().is_err());
    }
}
