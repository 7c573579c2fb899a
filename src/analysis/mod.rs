//! Forward FFT analysis: whole-buffer spectra and sliding-window STFT.

pub mod spectrum;
pub mod stft;

pub use spectrum::{analyze_window, SpectralBin, Spectrum};
pub use stft::{hann_window, AnalysisConfig, SpectralAnalyzer, Spectrogram};

use crate::error::{DspError, Result};

/// Largest window a precision setting may ask for.
pub const MAX_WINDOW_FRAMES: usize = 1 << 24;

/// Window length giving bins roughly `desired_precision` Hz apart:
/// `floor(framerate / 2 / desired_precision)`. May be zero; callers decide
/// what an empty window means.
pub fn window_size_for(framerate: u32, desired_precision: f64) -> Result<usize> {
    if !desired_precision.is_finite() || desired_precision <= 0.0 {
        return Err(DspError::Configuration(format!(
            "precision must be a positive number of Hz, got {}",
            desired_precision
        )));
    }
    let size = (framerate as f64 / 2.0 / desired_precision).floor();
    if size > MAX_WINDOW_FRAMES as f64 {
        return Err(DspError::Configuration(format!(
            "precision {} Hz at {} Hz needs a {} frame window (limit {})",
            desired_precision, framerate, size, MAX_WINDOW_FRAMES
        )));
    }
    Ok(size as usize)
}

/// Centre frequency (Hz) of each bin of an FFT over `size` samples, in bin
/// order: `0, 1, .., ceil(size/2)-1` followed by the negative half.
pub fn fft_frequencies(size: usize, framerate: u32) -> Vec<f64> {
    let spacing = framerate as f64 / size as f64;
    let positive = (size + 1) / 2;
    (0..size)
        .map(|i| {
            let k = if i < positive {
                i as f64
            } else {
                i as f64 - size as f64
            };
            k * spacing
        })
        .collect()
}
