//! # Aspect-Ratio Classification
//!
//! Maps the pixel dimensions of an uploaded photo onto the closest entry of a
//! fixed table of aspect-ratio labels. The generation backend uses the label
//! to choose its output canvas.
//!
//! The table order matters: when two entries are equally close, the earlier
//! one wins.

use std::fmt;
use std::str::FromStr;

use crate::error::StagingError;

/// Aspect ratios understood by the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    #[default]
    Square,
    Portrait2x3,
    Landscape3x2,
    Portrait3x4,
    Landscape4x3,
    Portrait4x5,
    Landscape5x4,
    Portrait9x16,
    Landscape16x9,
    Ultrawide21x9,
}

/// Classification table in tie-break order.
pub const ASPECT_TABLE: [AspectRatio; 10] = [
    AspectRatio::Square,
    AspectRatio::Portrait2x3,
    AspectRatio::Landscape3x2,
    AspectRatio::Portrait3x4,
    AspectRatio::Landscape4x3,
    AspectRatio::Portrait4x5,
    AspectRatio::Landscape5x4,
    AspectRatio::Portrait9x16,
    AspectRatio::Landscape16x9,
    AspectRatio::Ultrawide21x9,
];

impl AspectRatio {
    /// Label sent on the wire, e.g. `"4:3"`.
    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }

    /// Reference value (width / height).
    pub fn value(self) -> f64 {
        let (w, h) = self.parts();
        w as f64 / h as f64
    }

    fn parts(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1, 1),
            AspectRatio::Portrait2x3 => (2, 3),
            AspectRatio::Landscape3x2 => (3, 2),
            AspectRatio::Portrait3x4 => (3, 4),
            AspectRatio::Landscape4x3 => (4, 3),
            AspectRatio::Portrait4x5 => (4, 5),
            AspectRatio::Landscape5x4 => (5, 4),
            AspectRatio::Portrait9x16 => (9, 16),
            AspectRatio::Landscape16x9 => (16, 9),
            AspectRatio::Ultrawide21x9 => (21, 9),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectRatio {
    type Err = StagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ASPECT_TABLE
            .iter()
            .copied()
            .find(|r| r.label() == s)
            .ok_or_else(|| StagingError::config("aspect_ratio", s, "unknown aspect ratio"))
    }
}

/// Classify pixel dimensions into the nearest table entry.
///
/// Returns the entry minimising `|width / height - reference|`; ties go to
/// the first entry in [`ASPECT_TABLE`]. A zero height yields `1:1`.
pub fn classify(width: u32, height: u32) -> AspectRatio {
    if height == 0 {
        return AspectRatio::Square;
    }
    let ratio = width as f64 / height as f64;

    let mut best = ASPECT_TABLE[0];
    let mut best_diff = (ratio - best.value()).abs();
    for candidate in &ASPECT_TABLE[1..] {
        let diff = (ratio - candidate.value()).abs();
        if diff < best_diff {
            best = *candidate;
            best_diff = diff;
        }
    }
    best
}
