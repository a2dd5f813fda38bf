//! Zone and archetype classification.
//!
//! A missing score is banded as the neutral midpoint for display only.
//! It stays `None` for every comparison and coverage computation.

use crate::content::{ContentPack, ZoneThresholds};
use crate::models::{ArchetypeRecord, Dimension, Zone, NEUTRAL_SCORE};

/// Band a score against a dimension's thresholds.
pub fn zone_for(score: f64, thresholds: &ZoneThresholds) -> Zone {
    if score <= thresholds.low_max {
        Zone::Low
    } else if score >= thresholds.high_min {
        Zone::High
    } else {
        Zone::Mid
    }
}

/// Zone used for display, substituting the midpoint for missing scores.
pub fn display_zone(score: Option<f64>, thresholds: &ZoneThresholds) -> Zone {
    zone_for(score.unwrap_or(NEUTRAL_SCORE), thresholds)
}

/// Zone and resolved archetype of one dimension score.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub zone: Zone,
    pub archetype: ArchetypeRecord,
}

/// Classify a (possibly missing) score of one dimension.
pub fn classify(dimension: Dimension, score: Option<f64>, content: &ContentPack) -> Classification {
    let dimension_content = content.dimension(dimension);
    let zone = display_zone(score, &dimension_content.thresholds);
    Classification {
        zone,
        archetype: dimension_content.archetype(dimension, zone),
    }
}
