use rustfft::{num_complex::Complex, FftPlanner};

use crate::signal::Waveform;

use super::fft_frequencies;

/// One retained FFT bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectralBin {
    /// Bin centre frequency in Hz.
    pub frequency: f64,
    /// Coefficient magnitude, rounded to an integer.
    pub magnitude: f64,
    pub coefficient: Complex<f64>,
}

/// Sparse frequency -> (magnitude, coefficient) mapping in ascending bin
/// order. Bins whose rounded magnitude is zero are not stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    bins: Vec<SpectralBin>,
}

impl Spectrum {
    pub fn iter(&self) -> std::slice::Iter<'_, SpectralBin> {
        self.bins.iter()
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bin stored under exactly `frequency`.
    pub fn get(&self, frequency: f64) -> Option<&SpectralBin> {
        self.bins.iter().find(|bin| bin.frequency == frequency)
    }

    /// Bin with the largest magnitude; the lowest frequency wins ties.
    pub fn dominant(&self) -> Option<&SpectralBin> {
        self.bins.iter().fold(None, |best: Option<&SpectralBin>, bin| match best {
            Some(b) if b.magnitude >= bin.magnitude => Some(b),
            _ => Some(bin),
        })
    }
}

impl<'a> IntoIterator for &'a Spectrum {
    type Item = &'a SpectralBin;
    type IntoIter = std::slice::Iter<'a, SpectralBin>;

    fn into_iter(self) -> Self::IntoIter {
        self.bins.iter()
    }
}

/// Forward FFT over the whole buffer, keeping the non-negative half.
///
/// Stereo input is analysed as its channel mean.
pub fn analyze_window(waveform: &Waveform) -> Spectrum {
    let samples = waveform.to_mono();
    let size = samples.len();
    if size == 0 {
        return Spectrum::default();
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(size);
    let mut buffer: Vec<Complex<f64>> =
        samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    let frequencies = fft_frequencies(size, waveform.framerate());
    let half = size / 2;

    let bins = buffer[..half]
        .iter()
        .zip(&frequencies[..half])
        .filter_map(|(&coefficient, &frequency)| {
            let magnitude = (coefficient.re * coefficient.re
                + coefficient.im * coefficient.im)
                .sqrt()
                .round();
            (magnitude != 0.0).then_some(SpectralBin {
                frequency,
                magnitude,
                coefficient,
            })
        })
        .collect();

    Spectrum { bins }
}
