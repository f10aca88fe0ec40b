//! Pollination Chance Scoring
//!
//! Turns one site's four directional land cover strings into a bounded
//! [0, 1] habitat score:
//!
//! 1. Parse each direction into (percent, MUC code) segments.
//! 2. Sum `(percent / 100) × category multiplier` over every segment of
//!    every direction.
//! 3. Normalize by the fixed constant 4 (one full share per direction) and
//!    clamp at 1.0.
//!
//! The divisor is a constant, not derived from the input: missing or
//! malformed directions lower the score, they never shrink the denominator.
//! Urban cover (MUC 91/93) *raises* the score at 1/10 weight; that is the
//! upstream behavior and is reproduced, not corrected (see the tests).
//!
//! Pure functions throughout: no I/O, no shared state, safe to call from
//! any number of request handlers concurrently.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::feature::SiteProperties;
use crate::landcover::{parse_classifications, Direction, MucCategory};

/// Fixed normalization constant: one full contribution share per direction.
const DIRECTION_SHARES: f64 = 4.0;

/// Pollination chance for one site, in [0, 1].
pub fn pollination_chance(properties: &SiteProperties) -> f64 {
    let mut total = 0.0;
    for direction in Direction::ALL {
        for segment in parse_classifications(properties.classification(direction)) {
            total += segment.contribution();
        }
    }
    (total / DIRECTION_SHARES).min(1.0)
}

/// Display tier for a pollination chance. Boundaries are inclusive on the
/// lower bound of each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollinationTier {
    High,
    Medium,
    Low,
    Minimal,
}

impl PollinationTier {
    pub fn from_chance(chance: f64) -> Self {
        if chance >= 0.75 {
            PollinationTier::High
        } else if chance >= 0.5 {
            PollinationTier::Medium
        } else if chance >= 0.25 {
            PollinationTier::Low
        } else {
            PollinationTier::Minimal
        }
    }

    /// Map marker color for this tier.
    pub fn marker_color(self) -> &'static str {
        match self {
            PollinationTier::High => "#4caf50",
            PollinationTier::Medium => "#ffeb3b",
            PollinationTier::Low => "#ff9800",
            PollinationTier::Minimal => "#f44336",
        }
    }
}

/// Per-direction detail behind a site's score, for the detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Final normalized, clamped score.
    pub chance: f64,
    pub tier: PollinationTier,
    /// Contribution of each direction before normalization.
    pub directions: Vec<DirectionContribution>,
    /// Accumulated weighted mass per contributing category
    /// (`"vegetation"` / `"urban"`), before normalization.
    pub category_mass: FxHashMap<&'static str, f64>,
    /// Total segments parsed across all four directions.
    pub segments_parsed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionContribution {
    pub direction: Direction,
    /// Summed weighted share of this direction's segments.
    pub contribution: f64,
    pub segments: usize,
}

/// Compute the score together with its per-direction breakdown.
///
/// `breakdown.chance` equals [`pollination_chance`] on the same input.
pub fn score_breakdown(properties: &SiteProperties) -> ScoreBreakdown {
    let mut directions = Vec::with_capacity(Direction::ALL.len());
    let mut category_mass: FxHashMap<&'static str, f64> = FxHashMap::default();
    let mut segments_parsed = 0;
    let mut total = 0.0;

    for direction in Direction::ALL {
        let segments = parse_classifications(properties.classification(direction));
        let mut contribution = 0.0;
        for segment in &segments {
            let share = segment.contribution();
            contribution += share;
            if segment.category() != MucCategory::Unclassified {
                *category_mass.entry(segment.category().label()).or_insert(0.0) += share;
            }
        }
        total += contribution;
        segments_parsed += segments.len();
        directions.push(DirectionContribution {
            direction,
            contribution,
            segments: segments.len(),
        });
    }

    let chance = (total / DIRECTION_SHARES).min(1.0);
    ScoreBreakdown {
        chance,
        tier: PollinationTier::from_chance(chance),
        directions,
        category_mass,
        segments_parsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn props(north: Option<&str>, south: Option<&str>, east: Option<&str>, west: Option<&str>) -> SiteProperties {
        let mut properties = json!({});
        for (key, value) in [
            ("landcoversNorthClassifications", north),
            ("landcoversSouthClassifications", south),
            ("landcoversEastClassifications", east),
            ("landcoversWestClassifications", west),
        ] {
            if let Some(text) = value {
                properties[key] = json!(text);
            }
        }
        serde_json::from_value(properties).unwrap()
    }

    #[test]
    fn test_all_fields_absent_scores_zero() {
        assert_relative_eq!(pollination_chance(&props(None, None, None, None)), 0.0);
    }

    #[test]
    fn test_single_full_vegetation_direction() {
        let p = props(Some("100% xx MUC 1"), None, None, None);
        assert_relative_eq!(pollination_chance(&p), 0.25);
    }

    #[test]
    fn test_four_full_vegetation_directions_clamp_at_one() {
        let text = Some("100% xx MUC 1");
        let p = props(text, text, text, text);
        assert_relative_eq!(pollination_chance(&p), 1.0);
    }

    #[test]
    fn test_urban_half_cover_contributes_five_hundredths() {
        // Documented quirk kept from upstream: urban cover raises the score
        // (at 1/10 weight) instead of lowering it
        let p = props(Some("50% xx MUC 91"), None, None, None);
        assert_relative_eq!(pollination_chance(&p), 0.05 / 4.0);
    }

    #[test]
    fn test_unrecognized_codes_contribute_nothing() {
        let p = props(Some("100% xx MUC 999"), Some("100% xx MUC 7"), None, None);
        assert_relative_eq!(pollination_chance(&p), 0.0);
    }

    #[test]
    fn test_directions_are_interchangeable() {
        let a = "70% canopy MUC 1";
        let b = "30% lawn MUC 43, 20% roofs MUC 93";
        let c = "garbage no pattern here";

        let original = pollination_chance(&props(Some(a), Some(b), Some(c), None));
        let shuffled = pollination_chance(&props(None, Some(c), Some(a), Some(b)));
        assert_relative_eq!(original, shuffled);
    }

    #[test]
    fn test_malformed_text_degrades_to_zero() {
        let p = props(Some("garbage no pattern here"), None, None, None);
        assert_relative_eq!(pollination_chance(&p), 0.0);
    }

    #[test]
    fn test_excess_mass_clamps_to_one() {
        // 400% of vegetation in one direction alone
        let p = props(Some("400% dense MUC 1, 400% dense MUC 43"), None, None, None);
        assert_relative_eq!(pollination_chance(&p), 1.0);
    }

    #[test]
    fn test_chance_always_in_unit_interval() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let codes = [0u32, 1, 7, 43, 91, 93, 999, 4_000_000];

        for _ in 0..500 {
            let mut fields: Vec<Option<String>> = Vec::with_capacity(4);
            for _ in 0..4 {
                if rng.gen_bool(0.2) {
                    fields.push(None);
                    continue;
                }
                let mut text = String::new();
                for _ in 0..rng.gen_range(0..5) {
                    let percent: u64 = rng.gen_range(0..10_000_000);
                    let code = codes[rng.gen_range(0..codes.len())];
                    text.push_str(&format!("{}% synthetic cover MUC {} ", percent, code));
                }
                fields.push(Some(text));
            }
            let p = props(
                fields[0].as_deref(),
                fields[1].as_deref(),
                fields[2].as_deref(),
                fields[3].as_deref(),
            );
            let chance = pollination_chance(&p);
            assert!((0.0..=1.0).contains(&chance), "chance {} out of range", chance);
        }
    }

    #[test]
    fn test_tier_boundaries_inclusive_on_lower_bound() {
        assert_eq!(PollinationTier::from_chance(1.0), PollinationTier::High);
        assert_eq!(PollinationTier::from_chance(0.75), PollinationTier::High);
        assert_eq!(PollinationTier::from_chance(0.74), PollinationTier::Medium);
        assert_eq!(PollinationTier::from_chance(0.5), PollinationTier::Medium);
        assert_eq!(PollinationTier::from_chance(0.49), PollinationTier::Low);
        assert_eq!(PollinationTier::from_chance(0.25), PollinationTier::Low);
        assert_eq!(PollinationTier::from_chance(0.24), PollinationTier::Minimal);
        assert_eq!(PollinationTier::from_chance(0.0), PollinationTier::Minimal);
    }

    #[test]
    fn test_marker_colors() {
        assert_eq!(PollinationTier::High.marker_color(), "#4caf50");
        assert_eq!(PollinationTier::Medium.marker_color(), "#ffeb3b");
        assert_eq!(PollinationTier::Low.marker_color(), "#ff9800");
        assert_eq!(PollinationTier::Minimal.marker_color(), "#f44336");
    }

    #[test]
    fn test_breakdown_matches_chance() {
        let p = props(
            Some("60% Trees MUC 1, 40% Herbaceous MUC 43"),
            Some("100% Urban, Residential MUC 91"),
            None,
            Some("not a classification"),
        );

        let breakdown = score_breakdown(&p);
        assert_relative_eq!(breakdown.chance, pollination_chance(&p));
        assert_relative_eq!(breakdown.chance, (1.0 + 0.1) / 4.0);
        assert_eq!(breakdown.tier, PollinationTier::Low);
        assert_eq!(breakdown.segments_parsed, 3);

        assert_eq!(breakdown.directions.len(), 4);
        assert_relative_eq!(breakdown.directions[0].contribution, 1.0);
        assert_relative_eq!(breakdown.directions[1].contribution, 0.1);
        assert_relative_eq!(breakdown.directions[2].contribution, 0.0);
        assert_relative_eq!(breakdown.directions[3].contribution, 0.0);

        assert_relative_eq!(breakdown.category_mass["vegetation"], 1.0);
        assert_relative_eq!(breakdown.category_mass["urban"], 0.1);
        assert!(!breakdown.category_mass.contains_key("unclassified"));
    }
}
