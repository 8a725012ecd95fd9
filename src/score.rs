//! Score presentation: clamping, the progress ring and the badge band.

use serde::{Deserialize, Serialize};

/// Radius of the progress ring in the result card.
pub const RING_RADIUS: f64 = 52.0;
/// `2 * PI * RING_RADIUS`
pub const RING_CIRCUMFERENCE: f64 = 2.0 * std::f64::consts::PI * RING_RADIUS;

const GAUGE_CELLS: usize = 20;

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Stroke-dash offset for the ring: full circumference at 0, zero at 100.
pub fn ring_offset(score: f64) -> f64 {
    RING_CIRCUMFERENCE * (1.0 - clamp_score(score) / 100.0)
}

/// Text gauge for the terminal, filled in proportion to the ring.
pub fn ring_gauge(score: f64) -> String {
    let filled_ratio = 1.0 - ring_offset(score) / RING_CIRCUMFERENCE;
    let filled = (filled_ratio * GAUGE_CELLS as f64).round() as usize;
    let filled = filled.min(GAUGE_CELLS);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(GAUGE_CELLS - filled))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    NeedsWork,
    Mixed,
    Strong,
    Excellent,
}

impl Badge {
    pub fn for_score(score: f64) -> Self {
        let s = clamp_score(score);
        if s >= 85.0 {
            Badge::Excellent
        } else if s >= 70.0 {
            Badge::Strong
        } else if s >= 55.0 {
            Badge::Mixed
        } else {
            Badge::NeedsWork
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Badge::NeedsWork => "Needs work",
            Badge::Mixed => "Mixed",
            Badge::Strong => "Strong",
            Badge::Excellent => "Excellent",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Score as shown to the user: integral when it is, otherwise one decimal.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{}", score as i64)
    } else {
        format!("{score:.1}")
    }
}
