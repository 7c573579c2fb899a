//! Batch signal synthesis and spectral analysis.
//!
//! A [`Waveform`] holds samples plus framerate. Generators in [`generate`]
//! produce waveforms from frequencies and lengths, [`signal::mix_down`]
//! combines them, and [`analysis`] recovers their frequency content. Nothing
//! in this crate touches the filesystem.

pub mod analysis;
pub mod error;
pub mod generate;
pub mod music;
pub mod score;
pub mod signal;

pub use error::{DspError, Result};
pub use signal::Waveform;
