use super::interval::{self, MAX_SEMITONE};
use super::temperament::Temperament;

pub const CONCERT_A4: f64 = 440.0;
pub const MIDDLE_C: f64 = 261.626;
pub const SCIENTIFIC_MIDDLE_C: f64 = 256.0;

/// A root frequency plus a temperament: turns semitone offsets into Hz.
#[derive(Clone, Debug)]
pub struct Key {
    root_frequency: f64,
    temperament: Temperament,
}

impl Default for Key {
    fn default() -> Self {
        Self::new(CONCERT_A4, Temperament::even())
    }
}

impl Key {
    pub fn new(root_frequency: f64, temperament: Temperament) -> Self {
        Self {
            root_frequency,
            temperament,
        }
    }

    pub fn root_frequency(&self) -> f64 {
        self.root_frequency
    }

    pub fn temperament(&self) -> &Temperament {
        &self.temperament
    }

    /// Frequency of `semitone` above the root, `octave` octaves up. Semitones
    /// past twelve carry into the octave.
    pub fn interval(&self, semitone: u32, octave: i32) -> f64 {
        let steps = MAX_SEMITONE as u32;
        let index = (semitone % steps) as u8;
        let octave = octave + (semitone / steps) as i32;
        let octave_root = self.root_frequency * self.temperament.octave().powi(octave);
        let ratio = self.temperament.ratio(index).unwrap_or(1.0);
        let frequency = octave_root * ratio;
        log::trace!(
            "{} ({}) octave {}: {:.3} Hz",
            semitone,
            interval::name(index).unwrap_or("?"),
            octave,
            frequency
        );
        frequency
    }
}
