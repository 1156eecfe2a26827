//! Detection method names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A duplicate-detection heuristic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DetectionMethod {
    /// Identical name and size.
    Exact,
    /// Sizes within a relative tolerance.
    Size,
    /// Fuzzy-similar file names.
    Similar,
    /// Identical content hash.
    Hash,
}

impl DetectionMethod {
    /// Methods used when none (or none valid) are requested.
    pub const DEFAULTS: [DetectionMethod; 3] = [
        DetectionMethod::Exact,
        DetectionMethod::Similar,
        DetectionMethod::Size,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exact => "Exact match",
            Self::Size => "Size match",
            Self::Similar => "Similar names",
            Self::Hash => "Content hash",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_method_names() {
        assert_eq!(DetectionMethod::from_str("exact").unwrap(), DetectionMethod::Exact);
        assert_eq!(DetectionMethod::from_str("HASH").unwrap(), DetectionMethod::Hash);
        assert!(DetectionMethod::from_str("perceptual").is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for method in DetectionMethod::iter() {
            let name = method.to_string();
            assert_eq!(DetectionMethod::from_str(&name).unwrap(), method);
        }
    }
}
