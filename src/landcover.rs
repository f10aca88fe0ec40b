//! Land Cover Classification Parsing
//!
//! GLOBE vegetation cover observations carry one free-text classification
//! string per compass direction, e.g.:
//!
//! `"60% Trees, Closed Forest, Evergreen MUC 1, 40% Herbaceous MUC 43"`
//!
//! Each segment is `<percent>% <description> MUC <code>`, where the code is a
//! Modified UNESCO Classification (MUC) land cover class. The description
//! between the percent and the code varies freely and is irrelevant here;
//! only the (percent, code) pairs feed scoring.
//!
//! Parsing is deliberately forgiving: fragments that do not fit the pattern
//! are skipped, an absent field yields no segments, and duplicate codes all
//! contribute independently.

use serde::Serialize;
use smallvec::SmallVec;

/// Compass direction of one classification field.
///
/// Upstream names the four fields with fixed literal keys; each variant maps
/// to exactly one of them (no dynamic key construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four directions, in the order they are summed.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Upstream property name holding this direction's classification string.
    pub fn field_name(self) -> &'static str {
        match self {
            Direction::North => "landcoversNorthClassifications",
            Direction::South => "landcoversSouthClassifications",
            Direction::East => "landcoversEastClassifications",
            Direction::West => "landcoversWestClassifications",
        }
    }
}

/// Scoring category of a MUC land cover class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MucCategory {
    /// Vegetated cover classes (MUC 1, 43). Full weight.
    Vegetation,
    /// Built-up cover classes (MUC 91, 93). 1/10 weight.
    Urban,
    /// Everything else. No contribution.
    Unclassified,
}

impl MucCategory {
    /// Fixed classification table. Closed: codes outside it are unclassified.
    pub fn classify(muc_code: u32) -> Self {
        match muc_code {
            1 | 43 => MucCategory::Vegetation,
            91 | 93 => MucCategory::Urban,
            _ => MucCategory::Unclassified,
        }
    }

    /// Weight applied to a segment's percent share.
    pub fn multiplier(self) -> f64 {
        match self {
            MucCategory::Vegetation => 1.0,
            MucCategory::Urban => 0.1,
            MucCategory::Unclassified => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MucCategory::Vegetation => "vegetation",
            MucCategory::Urban => "urban",
            MucCategory::Unclassified => "unclassified",
        }
    }
}

/// One parsed `<percent>% ... MUC <code>` segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MucSegment {
    pub percent: u32,
    pub muc_code: u32,
}

impl MucSegment {
    pub fn category(self) -> MucCategory {
        MucCategory::classify(self.muc_code)
    }

    /// Weighted share this segment adds to the running total:
    /// `(percent / 100) × category multiplier`.
    pub fn contribution(self) -> f64 {
        (f64::from(self.percent) / 100.0) * self.category().multiplier()
    }
}

/// Extract all (percent, MUC code) segments from one classification string.
///
/// Scans for non-overlapping matches of: a digit run immediately followed by
/// `%`, then the shortest gap reaching a `MUC ` token that is immediately
/// followed by a digit run. Both digit runs parse as base-10 integers
/// (leading run only, so `"12.5%"` yields percent 5: the `12` is not
/// followed by `%`). Unmatched text is skipped silently.
pub fn parse_classifications(text: Option<&str>) -> SmallVec<[MucSegment; 4]> {
    // Most observations carry 1-3 segments per direction
    let mut segments: SmallVec<[MucSegment; 4]> = SmallVec::new();
    let Some(text) = text else {
        return segments;
    };

    let bytes = text.as_bytes();
    let mut pos = 0;

    'scan: while pos < bytes.len() {
        if !bytes[pos].is_ascii_digit() {
            pos += 1;
            continue;
        }

        let run_end = digit_run_end(bytes, pos);
        if run_end >= bytes.len() || bytes[run_end] != b'%' {
            // Digit run without a percent sign: not a segment start
            pos = run_end;
            continue;
        }
        let percent = parse_digit_run(&bytes[pos..run_end]);

        // Shortest gap: first `MUC ` after the percent sign that is followed
        // by at least one digit. A bare `MUC ` without digits extends the gap.
        let mut cursor = run_end + 1;
        loop {
            let Some(offset) = find_token(&bytes[cursor..], b"MUC ") else {
                // No code remains anywhere to the right, so no later percent
                // can complete a segment either
                break 'scan;
            };
            let code_start = cursor + offset + 4;
            if code_start < bytes.len() && bytes[code_start].is_ascii_digit() {
                let code_end = digit_run_end(bytes, code_start);
                segments.push(MucSegment {
                    percent,
                    muc_code: parse_digit_run(&bytes[code_start..code_end]),
                });
                pos = code_end;
                continue 'scan;
            }
            cursor += offset + 1;
        }
    }

    segments
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    end
}

/// Base-10 parse of an ASCII digit run. Saturates on overflow; a matched
/// segment always yields a value.
fn parse_digit_run(run: &[u8]) -> u32 {
    run.iter().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    })
}

fn find_token(haystack: &[u8], token: &[u8]) -> Option<usize> {
    if haystack.len() < token.len() {
        return None;
    }
    haystack.windows(token.len()).position(|w| w == token)
}
