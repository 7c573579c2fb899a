use rustfft::{num_complex::Complex, FftPlanner};

use crate::analysis::{fft_frequencies, window_size_for};
use crate::error::{DspError, Result};
use crate::signal::time::framecount;
use crate::signal::{normalize, Waveform};

use super::{unsupported, GeneratorConfig, Request, Segment, SignalGenerator, Tone};

/// Requested frequencies above this are out of range for bin matching.
const BIN_SEARCH_CEILING_HZ: f64 = 20_000.0;

/// Multi-tone synthesis through an inverse FFT.
///
/// Each requested tone gets an equal share of energy in its nearest bin; the
/// inverse transform of that sparse spectrum is one window, tiled until the
/// buffer is covered. Output is periodic with period `window_size`.
#[derive(Debug)]
pub struct SpectralGenerator {
    length: f64,
    framerate: u32,
    desired_precision: f64,
}

impl SpectralGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            length: config.length,
            framerate: config.framerate,
            desired_precision: config.desired_precision,
        }
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    pub fn window_size(&self) -> Result<usize> {
        window_size_for(self.framerate, self.desired_precision)
    }

    /// Bin centre frequencies for one window.
    pub fn frequencies(&self) -> Result<Vec<f64>> {
        Ok(fft_frequencies(self.window_size()?, self.framerate))
    }

    /// Index of the non-negative bin closest to `requested`, or `None` when
    /// no bin lies within 20 kHz. The first of equally close bins wins.
    pub fn nearest_bin(&self, requested: f64) -> Result<Option<usize>> {
        Ok(nearest_in(&self.frequencies()?, requested))
    }

    /// One period of the combined tones, peak-normalised.
    pub fn window(&self, frequencies: &[f64]) -> Result<Vec<f64>> {
        let size = self.window_size()?;
        if size == 0 {
            return Err(DspError::Configuration(format!(
                "precision {} Hz leaves no room for a window at {} Hz",
                self.desired_precision, self.framerate
            )));
        }

        let mut spectrum = self.sparse_spectrum(frequencies, size);
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_inverse(size).process(&mut spectrum);
        let real: Vec<f64> = spectrum.iter().map(|c| c.re / size as f64).collect();
        Ok(normalize(&real))
    }

    /// Frequency-domain window with `framerate / placed` at each tone's bin,
    /// where `placed` counts only tones that found a bin.
    fn sparse_spectrum(&self, frequencies: &[f64], size: usize) -> Vec<Complex<f64>> {
        let bin_freqs = fft_frequencies(size, self.framerate);
        let mut bins = Vec::with_capacity(frequencies.len());
        for &frequency in frequencies {
            match nearest_in(&bin_freqs, frequency) {
                Some(bin) => bins.push(bin),
                None => log::warn!("no bin within range of {} Hz; tone dropped", frequency),
            }
        }

        let mut spectrum = vec![Complex::new(0.0, 0.0); size];
        if !bins.is_empty() {
            let share = self.framerate as f64 / bins.len() as f64;
            for bin in bins {
                spectrum[bin] = Complex::new(share, 0.0);
            }
        }
        spectrum
    }

    /// Tile the window for `frequencies` across the configured length.
    pub fn generate_tones(&mut self, frequencies: &[f64], segment: Segment) -> Result<Waveform> {
        if let Some(length) = segment.length {
            self.length = length;
        }
        if let Some(framerate) = segment.framerate {
            self.framerate = framerate;
        }
        let framecount = framecount(self.length, self.framerate);
        self.length = framecount as f64 / self.framerate as f64;

        let window = Waveform::mono(self.window(frequencies)?, self.framerate);
        let mut wavedata = Waveform::silence(framecount, self.framerate);
        let mut count = 0;
        for offset in (0..framecount).step_by(window.len()) {
            wavedata = wavedata.insert(offset, &window)?;
            count += 1;
        }
        log::debug!(
            "spectral generator: {} windows of {} frames for {:?}",
            count,
            window.len(),
            frequencies
        );
        Ok(wavedata)
    }
}

fn nearest_in(bin_freqs: &[f64], requested: f64) -> Option<usize> {
    let mut diff = BIN_SEARCH_CEILING_HZ;
    let mut closest = None;
    for (index, &freq) in bin_freqs.iter().enumerate() {
        if freq < 0.0 {
            continue;
        }
        let d = (requested - freq).abs();
        if d < diff {
            diff = d;
            closest = Some(index);
        }
    }
    log::debug!("using bin {:?} for {} Hz", closest, requested);
    closest
}

impl SignalGenerator for SpectralGenerator {
    fn generate(&mut self, request: &Request) -> Result<Waveform> {
        match &request.tone {
            Tone::Chord(frequencies) => self.generate_tones(frequencies, request.segment),
            Tone::Constant(frequency) => self.generate_tones(&[*frequency], request.segment),
            tone => Err(unsupported("spectral generator", tone)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_window;

    fn generator(framerate: u32, length: f64) -> SpectralGenerator {
        SpectralGenerator::new(GeneratorConfig {
            length,
            framerate,
            ..Default::default()
        })
    }

    #[test]
    fn window_size_from_precision() {
        assert_eq!(generator(8000, 1.0).window_size().unwrap(), 400);
        assert_eq!(generator(44100, 1.0).window_size().unwrap(), 2205);
    }

    #[test]
    fn nearest_bin_on_bin() {
        // 400-point window at 8 kHz: 20 Hz bins.
        let gen = generator(8000, 1.0);
        assert_eq!(gen.nearest_bin(440.0).unwrap(), Some(22));
        assert_eq!(gen.nearest_bin(0.0).unwrap(), Some(0));
    }

    #[test]
    fn nearest_bin_between_bins() {
        let gen = generator(8000, 1.0);
        assert_eq!(gen.nearest_bin(447.0).unwrap(), Some(22));
        assert_eq!(gen.nearest_bin(453.0).unwrap(), Some(23));
        // Exactly halfway: the lower bin is seen first.
        assert_eq!(gen.nearest_bin(450.0).unwrap(), Some(22));
    }

    #[test]
    fn nearest_bin_minimises_distance_over_positive_bins() {
        let gen = generator(8000, 1.0);
        let freqs = gen.frequencies().unwrap();
        for requested in [13.0, 999.0, 2500.5, 3999.0] {
            let best = gen.nearest_bin(requested).unwrap().unwrap();
            assert!(freqs[best] >= 0.0);
            let d = (freqs[best] - requested).abs();
            assert!(freqs
                .iter()
                .filter(|&&f| f >= 0.0)
                .all(|&f| (f - requested).abs() >= d));
        }
    }

    #[test]
    fn output_is_periodic_and_normalised() {
        let mut gen = generator(8000, 0.25);
        let w = gen.generate_tones(&[440.0, 660.0], Segment::default()).unwrap();
        let size = gen.window_size().unwrap();
        assert!(w.len() >= 2000);
        let peak = w.frames().iter().map(|s| s.abs()).fold(0.0, f64::max);
        assert!((peak - 1.0).abs() < 1e-12);
        for i in 0..size {
            assert!((w.frames()[i] - w.frames()[i + size]).abs() < 1e-12);
        }
    }

    #[test]
    fn tones_appear_in_the_spectrum() {
        let mut gen = generator(8000, 0.1);
        let w = gen.generate_tones(&[440.0, 1000.0], Segment::default()).unwrap();
        let window = Waveform::mono(w.frames()[..400].to_vec(), 8000);
        let spectrum = analyze_window(&window);
        let mut peaks: Vec<f64> = spectrum
            .iter()
            .filter(|b| b.magnitude > 50.0)
            .map(|b| b.frequency)
            .collect();
        peaks.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(peaks, vec![440.0, 1000.0]);
    }

    #[test]
    fn zero_window_is_a_configuration_error() {
        let mut gen = SpectralGenerator::new(GeneratorConfig {
            framerate: 10,
            desired_precision: 100.0,
            ..Default::default()
        });
        assert!(matches!(
            gen.generate_tones(&[1.0], Segment::default()),
            Err(DspError::Configuration(_))
        ));
    }

    #[test]
    fn zero_precision_is_a_configuration_error() {
        let mut gen = SpectralGenerator::new(GeneratorConfig {
            framerate: 8000,
            desired_precision: 0.0,
            ..Default::default()
        });
        assert!(matches!(gen.window_size(), Err(DspError::Configuration(_))));
        assert!(matches!(
            gen.generate_tones(&[440.0], Segment::default()),
            Err(DspError::Configuration(_))
        ));
    }

    #[test]
    fn out_of_range_tone_does_not_take_a_share() {
        let gen = generator(8000, 0.05);
        assert_eq!(gen.nearest_bin(30_000.0).unwrap(), None);

        let spectrum = gen.sparse_spectrum(&[440.0, 30_000.0], 400);
        assert_eq!(spectrum[22], Complex::new(8000.0, 0.0));
        assert_eq!(spectrum.iter().filter(|c| c.re != 0.0).count(), 1);

        let spectrum = gen.sparse_spectrum(&[440.0, 1000.0], 400);
        assert_eq!(spectrum[22], Complex::new(4000.0, 0.0));
        assert_eq!(spectrum[50], Complex::new(4000.0, 0.0));
    }

    #[test]
    fn only_out_of_range_tones_give_silence() {
        let gen = generator(8000, 0.05);
        let window = gen.window(&[30_000.0]).unwrap();
        assert_eq!(window.len(), 400);
        assert!(window.iter().all(|&s| s == 0.0));
    }
}
