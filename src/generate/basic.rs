use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::f64::consts::PI;

use crate::error::Result;
use crate::signal::time::framecount;
use crate::signal::Waveform;

use super::{unsupported, GeneratorConfig, Request, Segment, SignalGenerator, Tone};

/// Time-domain sinusoid and noise synthesis.
///
/// Every call reconfigures the buffer from scratch, so output never depends on
/// earlier calls (apart from the random phase stream).
#[derive(Debug)]
pub struct BasicGenerator {
    length: f64,
    framerate: u32,
    fade_percentage: f64,
    framecount: usize,
    phase: f64,
    rng: StdRng,
}

impl BasicGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Generator whose random phases and noise are reproducible.
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GeneratorConfig, rng: StdRng) -> Self {
        let framecount = framecount(config.length, config.framerate);
        Self {
            length: config.length,
            framerate: config.framerate,
            fade_percentage: config.fade_percentage,
            framecount,
            phase: 0.0,
            rng,
        }
    }

    /// Length in seconds, quantised to whole frames after `configure`.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    pub fn framecount(&self) -> usize {
        self.framecount
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn fade_percentage(&self) -> f64 {
        self.fade_percentage
    }

    pub fn set_fade_percentage(&mut self, fade_percentage: f64) {
        self.fade_percentage = fade_percentage;
    }

    /// Apply overrides, recompute the framecount and pick the phase.
    pub fn configure(&mut self, segment: Segment) {
        if let Some(length) = segment.length {
            self.length = length;
        }
        if let Some(framerate) = segment.framerate {
            self.framerate = framerate;
        }
        self.framecount = framecount(self.length, self.framerate);
        self.length = self.framecount as f64 / self.framerate as f64;
        self.phase = match segment.phase {
            Some(phase) => phase,
            None => self.rng.gen::<f64>() * 2.0 * PI,
        };
        log::debug!(
            "basic generator: {} frames at {} Hz, phase {:.4}",
            self.framecount,
            self.framerate,
            self.phase
        );
    }

    fn sinusoid(&self, frame: usize, frequency: f64) -> f64 {
        (self.phase + 2.0 * PI * frequency * frame as f64 / self.framerate as f64).sin()
    }

    /// Amplitude envelope applied by `sin_constant`: a linear ramp up over the
    /// first `fade_percentage` of the buffer and down over the last.
    pub fn fade_gain(&self, frame: usize) -> f64 {
        let fade_frames = self.fade_percentage * self.framecount as f64;
        if fade_frames <= 0.0 {
            return 1.0;
        }
        let frame = frame as f64;
        let fade_point = self.framecount as f64 - fade_frames;
        let mut gain = 1.0;
        if frame > fade_point {
            gain *= 1.0 - (frame - fade_point) / fade_frames;
        }
        if frame < fade_frames {
            gain *= frame / fade_frames;
        }
        gain
    }

    /// Constant-frequency sinusoid with faded edges.
    pub fn sin_constant(&mut self, frequency: f64, segment: Segment) -> Waveform {
        self.configure(segment);
        let samples = (0..self.framecount)
            .map(|frame| self.sinusoid(frame, frequency) * self.fade_gain(frame))
            .collect();
        Waveform::mono(samples, self.framerate)
    }

    /// Sinusoid whose frequency moves linearly from `start_freq` to `end_freq`.
    /// No fade is applied.
    pub fn sin_linear(&mut self, start_freq: f64, end_freq: f64, segment: Segment) -> Waveform {
        self.configure(segment);
        let rate = (end_freq - start_freq) / self.framecount as f64;
        let samples = (0..self.framecount)
            .map(|frame| self.sinusoid(frame, start_freq + frame as f64 * rate))
            .collect();
        Waveform::mono(samples, self.framerate)
    }

    /// Independent standard-normal samples.
    pub fn whitenoise(&mut self, segment: Segment) -> Waveform {
        self.configure(segment);
        let samples = (0..self.framecount)
            .map(|_| self.rng.sample::<f64, _>(StandardNormal))
            .collect();
        Waveform::mono(samples, self.framerate)
    }
}

impl SignalGenerator for BasicGenerator {
    fn generate(&mut self, request: &Request) -> Result<Waveform> {
        match request.tone {
            Tone::Constant(frequency) => Ok(self.sin_constant(frequency, request.segment)),
            Tone::Sweep { start, end } => Ok(self.sin_linear(start, end, request.segment)),
            Tone::WhiteNoise => Ok(self.whitenoise(request.segment)),
            ref tone => Err(unsupported("basic generator", tone)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(length: f64, framerate: u32) -> BasicGenerator {
        BasicGenerator::with_seed(
            GeneratorConfig {
                length,
                framerate,
                ..Default::default()
            },
            42,
        )
    }

    #[test]
    fn constant_tone_at_8k() {
        let mut gen = generator(1.0, 8000);
        let w = gen.sin_constant(1000.0, Segment::default());
        assert_eq!(w.len(), 8000);
        assert_eq!(w.channels(), 1);
        assert!(w.frames().iter().all(|s| (-1.0..=1.0).contains(s)));
        assert_eq!(w.frames()[0], 0.0);
    }

    #[test]
    fn fade_ramps_are_monotonic() {
        let mut gen = generator(1.0, 8000);
        gen.configure(Segment::default());
        let fade = (0.02 * 8000.0) as usize;
        assert_eq!(fade, 160);

        let head: Vec<f64> = (0..fade).map(|f| gen.fade_gain(f)).collect();
        assert_eq!(head[0], 0.0);
        assert!(head.windows(2).all(|w| w[0] < w[1]));

        let tail: Vec<f64> = (8000 - fade..8000).map(|f| gen.fade_gain(f)).collect();
        assert!(tail.windows(2).all(|w| w[0] >= w[1]));
        assert!(tail[tail.len() - 1] < 0.01);

        assert_eq!(gen.fade_gain(4000), 1.0);
    }

    #[test]
    fn faded_samples_stay_under_envelope() {
        let mut gen = generator(1.0, 8000);
        let w = gen.sin_constant(1000.0, Segment::default().phase(0.3));
        for frame in 0..160 {
            assert!(w.frames()[frame].abs() <= gen.fade_gain(frame) + 1e-12);
        }
    }

    #[test]
    fn explicit_phase_is_used() {
        let mut gen = generator(0.01, 8000);
        let w = gen.sin_linear(100.0, 200.0, Segment::default().phase(PI / 2.0));
        assert_eq!(gen.phase(), PI / 2.0);
        assert!((w.frames()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn random_phase_in_range() {
        let mut gen = generator(0.01, 8000);
        for _ in 0..20 {
            gen.configure(Segment::default());
            assert!((0.0..2.0 * PI).contains(&gen.phase()));
        }
    }

    #[test]
    fn length_is_rectified_to_frames() {
        let mut gen = generator(1.0, 8000);
        gen.configure(Segment::default().length(0.12345));
        assert_eq!(gen.framecount(), 988);
        assert!((gen.length() - 988.0 / 8000.0).abs() < 1e-15);
    }

    #[test]
    fn sweep_matches_instantaneous_formula() {
        let mut gen = generator(0.5, 8000);
        let w = gen.sin_linear(200.0, 400.0, Segment::default().phase(0.0));
        let framecount = w.len() as f64;
        for &frame in &[0usize, 1, 1000, 3999] {
            let freq = 200.0 + frame as f64 * 200.0 / framecount;
            let expected = (2.0 * PI * freq * frame as f64 / 8000.0).sin();
            assert!((w.frames()[frame] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn noise_is_roughly_standard_normal() {
        let mut gen = generator(1.0, 8000);
        let w = gen.whitenoise(Segment::default());
        let n = w.len() as f64;
        let mean = w.frames().iter().sum::<f64>() / n;
        let var = w.frames().iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1);
        assert!((var - 1.0).abs() < 0.1);
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let a = generator(0.1, 8000).whitenoise(Segment::default());
        let b = generator(0.1, 8000).whitenoise(Segment::default());
        assert_eq!(a, b);
    }
}
