//! Conciseness meter: a cosmetic cue mapping response word count to a fill
//! percentage. It never feeds into scoring.

use serde::Serialize;

pub const SHORT_LIMIT: usize = 25;
pub const SWEET_SPOT: usize = 90;
pub const LONG_LIMIT: usize = 160;

const SHORT_PCT: f64 = 28.0;
const RAMP_START_PCT: f64 = 60.0;
const PEAK_PCT: f64 = 100.0;
const LONG_END_PCT: f64 = 70.0;
const TOO_LONG_PCT: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeterBand {
    Empty,
    TooShort,
    Good,
    Long,
    TooLong,
}

impl MeterBand {
    pub fn label(self) -> &'static str {
        match self {
            MeterBand::Empty => "Start typing",
            MeterBand::TooShort => "Too short",
            MeterBand::Good => "Good length",
            MeterBand::Long => "A bit long",
            MeterBand::TooLong => "Too long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeterReading {
    pub words: usize,
    pub percent: u8,
    pub band: MeterBand,
}

impl MeterReading {
    pub fn label(&self) -> &'static str {
        self.band.label()
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Piecewise schedule: flat low value below 25 words, ramp up to 90, ramp
/// down to 160, flat mid value beyond.
pub fn reading_for_words(words: usize) -> MeterReading {
    let (pct, band) = if words == 0 {
        (0.0, MeterBand::Empty)
    } else if words < SHORT_LIMIT {
        (SHORT_PCT, MeterBand::TooShort)
    } else if words <= SWEET_SPOT {
        let t = (words - SHORT_LIMIT) as f64 / (SWEET_SPOT - SHORT_LIMIT) as f64;
        (RAMP_START_PCT + t * (PEAK_PCT - RAMP_START_PCT), MeterBand::Good)
    } else if words <= LONG_LIMIT {
        let t = (words - SWEET_SPOT) as f64 / (LONG_LIMIT - SWEET_SPOT) as f64;
        (PEAK_PCT - t * (PEAK_PCT - LONG_END_PCT), MeterBand::Long)
    } else {
        (TOO_LONG_PCT, MeterBand::TooLong)
    };

    MeterReading {
        words,
        percent: pct.round().clamp(0.0, 100.0) as u8,
        band,
    }
}

pub fn update_conciseness_meter(text: &str) -> MeterReading {
    reading_for_words(word_count(text))
}
