use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::signal::Waveform;

use super::spectrum::{analyze_window, Spectrum};
use super::window_size_for;

/// Per-window spectra keyed by the window's start frame.
pub type Spectrogram = BTreeMap<usize, Spectrum>;

#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisConfig {
    /// Target bin spacing in Hz; sets the STFT window size.
    #[serde(default = "default_precision")]
    pub desired_precision: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            desired_precision: default_precision(),
        }
    }
}

fn default_precision() -> f64 {
    10.0
}

/// Sliding-window spectral analysis.
///
/// With `nyquist / window_size ≈ desired_precision` the window size is
/// `framerate / 2 / desired_precision`: 400 frames at 8 kHz, 2205 at 44.1 kHz.
#[derive(Clone, Debug, Default)]
pub struct SpectralAnalyzer {
    config: AnalysisConfig,
}

impl SpectralAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn window_size(&self, framerate: u32) -> Result<usize> {
        window_size_for(framerate, self.config.desired_precision)
    }

    /// Step between window starts: half a window less one frame.
    pub fn step(&self, framerate: u32) -> Result<usize> {
        Ok((self.window_size(framerate)? / 2).saturating_sub(1).max(1))
    }

    /// STFT over the whole buffer. Each window is Hann-tapered; the last one is
    /// zero-padded past the end of the data.
    pub fn analyze_whole_waveform(&self, waveform: &Waveform) -> Result<Spectrogram> {
        let framerate = waveform.framerate();
        let window_size = self.window_size(framerate)?;
        let step = self.step(framerate)?;
        let samples = waveform.to_mono();

        if window_size == 0 || samples.is_empty() {
            return Ok(Spectrogram::new());
        }

        let taper = hann_window(window_size);
        let starts: Vec<usize> = (0..samples.len()).step_by(step).collect();

        log::debug!(
            "STFT: {} frames, window={}, step={}, {} windows",
            samples.len(),
            window_size,
            step,
            starts.len()
        );

        Ok(starts
            .into_par_iter()
            .map(|start| {
                let end = (start + window_size).min(samples.len());
                let mut window = vec![0.0; window_size];
                for (i, &s) in samples[start..end].iter().enumerate() {
                    window[i] = taper[i] * s;
                }
                (start, analyze_window(&Waveform::mono(window, framerate)))
            })
            .collect())
    }
}

/// Symmetric Hann window of `size` points, zero at both ends.
pub fn hann_window(size: usize) -> Vec<f64> {
    match size {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..size)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos())
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(frequency: f64, framerate: u32, frames: usize) -> Waveform {
        let samples = (0..frames)
            .map(|f| (2.0 * PI * frequency * f as f64 / framerate as f64).sin())
            .collect();
        Waveform::mono(samples, framerate)
    }

    #[test]
    fn hann_shape() {
        let w = hann_window(401);
        assert!(w[0].abs() < 1e-12);
        assert!(w[400].abs() < 1e-12);
        assert!((w[200] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn window_geometry_at_8k() {
        let analyzer = SpectralAnalyzer::default();
        assert_eq!(analyzer.window_size(8000).unwrap(), 400);
        assert_eq!(analyzer.step(8000).unwrap(), 199);
        assert_eq!(analyzer.window_size(44100).unwrap(), 2205);
        assert_eq!(analyzer.step(44100).unwrap(), 1101);
    }

    #[test]
    fn window_count_and_offsets() {
        let analyzer = SpectralAnalyzer::default();
        let framecount = 1000;
        let spectrogram = analyzer
            .analyze_whole_waveform(&sine(1000.0, 8000, framecount))
            .unwrap();
        let step = analyzer.step(8000).unwrap();
        assert_eq!(spectrogram.len(), (framecount + step - 1) / step);
        let keys: Vec<usize> = spectrogram.keys().copied().collect();
        assert_eq!(keys, vec![0, 199, 398, 597, 796, 995]);
    }

    #[test]
    fn tail_window_is_zero_padded() {
        let analyzer = SpectralAnalyzer::default();
        let spectrogram = analyzer
            .analyze_whole_waveform(&sine(1000.0, 8000, 1000))
            .unwrap();
        // Only five frames remain at 995; the window is mostly silence.
        let tail = &spectrogram[&995];
        let full = &spectrogram[&199];
        let tail_peak = tail.dominant().map_or(0.0, |b| b.magnitude);
        let full_peak = full.dominant().unwrap().magnitude;
        assert!(tail_peak < full_peak);
    }

    #[test]
    fn tracks_a_tone_change_over_time() {
        let framerate = 8000;
        let mut samples: Vec<f64> = sine(1000.0, framerate, 4000).into_frames();
        samples.extend(sine(440.0, framerate, 4000).into_frames());
        let analyzer = SpectralAnalyzer::default();
        let spectrogram = analyzer
            .analyze_whole_waveform(&Waveform::mono(samples, framerate))
            .unwrap();

        let early = spectrogram[&0].dominant().unwrap().frequency;
        assert!((early - 1000.0).abs() <= 20.0);
        let late_key = spectrogram.keys().copied().find(|&k| k >= 5000).unwrap();
        let late = spectrogram[&late_key].dominant().unwrap().frequency;
        assert!((late - 440.0).abs() <= 20.0);
    }

    #[test]
    fn empty_waveform_has_no_windows() {
        let analyzer = SpectralAnalyzer::default();
        assert!(analyzer
            .analyze_whole_waveform(&Waveform::silence(0, 8000))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn zero_precision_is_a_configuration_error() {
        let analyzer = SpectralAnalyzer::new(AnalysisConfig {
            desired_precision: 0.0,
        });
        assert!(matches!(
            analyzer.analyze_whole_waveform(&sine(440.0, 8000, 800)),
            Err(crate::error::DspError::Configuration(_))
        ));
    }
}
