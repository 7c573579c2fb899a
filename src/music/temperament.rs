use crate::error::{DspError, Result};

use super::interval::{self, MAX_SEMITONE};

const RATIO_COUNT: usize = MAX_SEMITONE as usize + 1;

/// Frequency ratios for each semitone of an octave, unison through octave.
#[derive(Clone, Debug, PartialEq)]
pub struct Temperament {
    name: String,
    ratios: [f64; RATIO_COUNT],
}

impl Temperament {
    pub fn new(name: impl Into<String>, ratios: &[f64]) -> Result<Self> {
        let ratios: [f64; RATIO_COUNT] = ratios.try_into().map_err(|_| {
            DspError::Configuration(format!(
                "{} ratios are required, {} received",
                RATIO_COUNT,
                ratios.len()
            ))
        })?;
        Ok(Self {
            name: name.into(),
            ratios,
        })
    }

    /// Twelve equal steps per octave.
    pub fn even() -> Self {
        let mut ratios = [0.0; RATIO_COUNT];
        for (i, r) in ratios.iter_mut().enumerate() {
            *r = 2f64.powf(i as f64 / 12.0);
        }
        Self {
            name: "even".into(),
            ratios,
        }
    }

    pub fn pythagorean() -> Self {
        Self {
            name: "pythagorean".into(),
            ratios: [
                1.0,
                256.0 / 243.0,
                9.0 / 8.0,
                32.0 / 27.0,
                81.0 / 64.0,
                4.0 / 3.0,
                729.0 / 512.0,
                3.0 / 2.0,
                128.0 / 81.0,
                27.0 / 16.0,
                16.0 / 9.0,
                243.0 / 128.0,
                2.0,
            ],
        }
    }

    pub fn just() -> Self {
        Self {
            name: "just".into(),
            ratios: [
                1.0,
                25.0 / 24.0,
                9.0 / 8.0,
                6.0 / 5.0,
                5.0 / 4.0,
                4.0 / 3.0,
                45.0 / 32.0,
                3.0 / 2.0,
                8.0 / 5.0,
                5.0 / 3.0,
                9.0 / 5.0,
                15.0 / 8.0,
                2.0,
            ],
        }
    }

    /// The built-in temperaments.
    pub fn all() -> Vec<Temperament> {
        vec![Self::even(), Self::pythagorean(), Self::just()]
    }

    /// Look up a built-in temperament by name ("modern" is "even").
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "even" | "modern" => Some(Self::even()),
            "pythagorean" => Some(Self::pythagorean()),
            "just" => Some(Self::just()),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ratio for a semitone offset, `None` past the octave.
    pub fn ratio(&self, semitone: u8) -> Option<f64> {
        self.ratios.get(semitone as usize).copied()
    }

    /// Ratio for a named interval.
    pub fn interval(&self, name: &str) -> Option<f64> {
        interval::semitones(name).and_then(|s| self.ratio(s))
    }

    pub fn octave(&self) -> f64 {
        self.ratios[RATIO_COUNT - 1]
    }
}
