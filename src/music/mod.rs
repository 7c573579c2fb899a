//! Pitch helpers for callers that think in notes rather than Hz.

pub mod interval;
pub mod key;
pub mod temperament;

pub use key::{Key, CONCERT_A4, MIDDLE_C, SCIENTIFIC_MIDDLE_C};
pub use temperament::Temperament;
