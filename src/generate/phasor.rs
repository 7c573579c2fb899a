use rustfft::num_complex::Complex;
use std::f64::consts::{PI, TAU};

use crate::error::{DspError, Result};
use crate::signal::time::framecount;
use crate::signal::Waveform;

use super::{unsupported, GeneratorConfig, Request, SignalGenerator, Tone};

/// Relative tolerance when checking a phase correction against the last sample.
const CMP_PRECISION: f64 = 1e-7;
/// Absolute floor for the same check, for samples sitting near zero.
const CMP_FLOOR: f64 = 1e-9;

/// Phase-continuous synthesis across frequency changes.
///
/// Each sample is the real projection of a unit phasor `e^{i(2πft + φ)}`. When
/// the frequency changes, `φ` is re-solved so the new phasor reproduces the
/// last emitted sample, and synthesis resumes from the following frame.
///
/// The buffer is append-only: calls must arrive in the order they should be
/// heard.
#[derive(Debug)]
pub struct PhasorGenerator {
    framerate: u32,
    length: f64,
    amplitude: f64,
    wavedata: Vec<f64>,
    frequency: f64,
    phase: f64,
    last_frame: Option<usize>,
    last_frequency: f64,
    last_phase: f64,
}

impl PhasorGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            framerate: config.framerate,
            length: config.length,
            amplitude: 1.0,
            wavedata: Vec::new(),
            frequency: 0.0,
            phase: 0.0,
            last_frame: None,
            last_frequency: 0.0,
            last_phase: 0.0,
        }
    }

    /// Start the first segment at `phase` instead of zero. Ignored once
    /// synthesis has begun.
    pub fn set_initial_phase(&mut self, phase: f64) {
        if self.last_frame.is_none() {
            self.phase = phase;
        }
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    /// Phase in use for the current frequency.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Index of the last emitted frame, `None` before the first segment.
    pub fn last_frame(&self) -> Option<usize> {
        self.last_frame
    }

    pub fn samples(&self) -> &[f64] {
        &self.wavedata
    }

    /// Everything generated so far.
    pub fn waveform(&self) -> Waveform {
        Waveform::mono(self.wavedata.clone(), self.framerate)
    }

    /// Sample value the current frequency and phase give at `frame`.
    pub fn sample_at(&self, frame: usize) -> f64 {
        self.phasor(frame, self.frequency, self.phase).re
    }

    fn angle(&self, frame: usize, frequency: f64, phase: f64) -> f64 {
        2.0 * PI * frequency * (frame as f64 / self.framerate as f64) + phase
    }

    fn phasor(&self, frame: usize, frequency: f64, phase: f64) -> Complex<f64> {
        Complex::from_polar(self.amplitude, self.angle(frame, frequency, phase))
    }

    /// Append `length` seconds (or the previous length) at `frequency`.
    /// On `ContinuityFailure` nothing is appended and the generator keeps its
    /// previous frequency, phase and length.
    pub fn generate_segment(&mut self, frequency: f64, length: Option<f64>) -> Result<()> {
        let framecount = framecount(length.unwrap_or(self.length), self.framerate);

        let phase = match self.last_frame {
            Some(last_frame) if frequency != self.last_frequency => {
                self.phase_correction(last_frame, frequency)?
            }
            _ => self.phase,
        };
        self.length = framecount as f64 / self.framerate as f64;
        self.frequency = frequency;
        self.phase = phase;

        let start = self.last_frame.map_or(0, |frame| frame + 1);
        log::debug!(
            "phasor: {} frames at {} Hz from frame {} (phase {:.6})",
            framecount,
            frequency,
            start,
            self.phase
        );
        self.wavedata.reserve(framecount);
        for frame in start..start + framecount {
            let value = self.phasor(frame, frequency, self.phase).re;
            self.wavedata.push(value);
        }

        if framecount > 0 {
            self.last_frame = Some(start + framecount - 1);
        }
        self.last_frequency = frequency;
        self.last_phase = self.phase;
        Ok(())
    }

    /// Solve for the phase that makes `frequency` pass through the sample
    /// already emitted at `last_frame`.
    ///
    /// The arctangent of the previous phasor only fixes its angle modulo a
    /// half turn, so the first candidate may land on the negated sample; the
    /// other root is `π` away.
    fn phase_correction(&self, last_frame: usize, frequency: f64) -> Result<f64> {
        let expected = self.wavedata[last_frame];
        let previous = self.phasor(last_frame, self.last_frequency, self.last_phase);
        let argument = (previous.im / previous.re).atan();
        let base = self.angle(last_frame, frequency, 0.0);

        let mut actual = f64::NAN;
        for turn in [0.0, PI] {
            let correction = (argument - base + turn).rem_euclid(TAU);
            actual = self.phasor(last_frame, frequency, correction).re;
            if is_close(expected, actual) {
                log::debug!(
                    "phase correction {:.6} rad at frame {} ({} Hz -> {} Hz)",
                    correction,
                    last_frame,
                    self.last_frequency,
                    frequency
                );
                return Ok(correction);
            }
        }

        Err(DspError::ContinuityFailure {
            frame: last_frame,
            from_hz: self.last_frequency,
            to_hz: frequency,
            expected,
            actual,
        })
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= (CMP_PRECISION * a.abs().max(b.abs())).max(CMP_FLOOR)
}

impl SignalGenerator for PhasorGenerator {
    fn generate(&mut self, request: &Request) -> Result<Waveform> {
        let frequency = match request.tone {
            Tone::Constant(frequency) => frequency,
            ref tone => return Err(unsupported("phasor generator", tone)),
        };
        if let Some(framerate) = request.segment.framerate {
            if self.last_frame.is_some() && framerate != self.framerate {
                return Err(DspError::Unsupported(
                    "phasor generator cannot change framerate mid-signal".into(),
                ));
            }
            self.framerate = framerate;
        }
        if let Some(phase) = request.segment.phase {
            self.set_initial_phase(phase);
        }
        self.generate_segment(frequency, request.segment.length)?;
        Ok(self.waveform())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Segment;

    fn generator(framerate: u32) -> PhasorGenerator {
        PhasorGenerator::new(GeneratorConfig {
            framerate,
            ..Default::default()
        })
    }

    #[test]
    fn first_segment_starts_at_frame_zero() {
        let mut gen = generator(8000);
        gen.generate_segment(440.0, Some(0.1)).unwrap();
        assert_eq!(gen.samples().len(), 800);
        assert_eq!(gen.last_frame(), Some(799));
        assert_eq!(gen.phase(), 0.0);
        assert!((gen.samples()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn segments_append() {
        let mut gen = generator(8000);
        gen.generate_segment(300.0, Some(0.05)).unwrap();
        gen.generate_segment(800.0, Some(0.1)).unwrap();
        gen.generate_segment(800.0, None).unwrap();
        assert_eq!(gen.samples().len(), 400 + 800 + 800);
        assert_eq!(gen.last_frame(), Some(1999));
    }

    #[test]
    fn continuity_across_frequency_changes() {
        let cases = [
            (300.0, 800.0, 0.1, 0.1),
            (440.0, 261.626, 0.0371, 0.25),
            (1000.0, 1001.0, 0.5, 0.01),
            (55.0, 3520.0, 0.33333, 0.2),
            (7.0, 13.0, 1.0, 1.0),
        ];
        for (f1, f2, l1, l2) in cases {
            let mut gen = generator(8000);
            gen.generate_segment(f1, Some(l1)).unwrap();
            let last = gen.last_frame().unwrap();
            let before = gen.samples()[last];
            gen.generate_segment(f2, Some(l2)).unwrap();
            assert!(
                (gen.sample_at(last) - before).abs() < 1e-6,
                "{} -> {} Hz: {} vs {}",
                f1,
                f2,
                gen.sample_at(last),
                before
            );
        }
    }

    #[test]
    fn continuity_over_many_changes() {
        let mut gen = generator(44100);
        let freqs = [261.626, 293.665, 329.628, 349.228, 391.995, 440.0, 493.883, 523.251];
        for &f in &freqs {
            let last = gen.last_frame();
            let before = last.map(|frame| gen.samples()[frame]);
            gen.generate_segment(f, Some(0.137)).unwrap();
            if let (Some(frame), Some(value)) = (last, before) {
                assert!((gen.sample_at(frame) - value).abs() < 1e-6);
            }
        }
        assert!(gen.samples().iter().all(|s| s.abs() <= 1.0 + 1e-12));
    }

    #[test]
    fn no_jump_at_the_boundary() {
        let mut gen = generator(8000);
        gen.generate_segment(300.0, Some(0.1)).unwrap();
        gen.generate_segment(800.0, Some(0.1)).unwrap();
        // Largest step between adjacent samples of an 800 Hz sine at 8 kHz.
        let max_step = 2.0 * (PI * 800.0 / 8000.0).sin();
        let s = gen.samples();
        assert!((s[800] - s[799]).abs() <= max_step + 1e-9);
    }

    #[test]
    fn same_frequency_keeps_phase() {
        let mut gen = generator(8000);
        gen.generate_segment(440.0, Some(0.1)).unwrap();
        let phase = gen.phase();
        gen.generate_segment(440.0, Some(0.1)).unwrap();
        assert_eq!(gen.phase(), phase);
        let expected = (2.0 * PI * 440.0 * 1200.0 / 8000.0).cos();
        assert!((gen.samples()[1200] - expected).abs() < 1e-9);
    }

    #[test]
    fn order_matters() {
        let mut ab = generator(8000);
        ab.generate_segment(300.0, Some(0.05)).unwrap();
        ab.generate_segment(500.0, Some(0.05)).unwrap();
        let mut ba = generator(8000);
        ba.generate_segment(500.0, Some(0.05)).unwrap();
        ba.generate_segment(300.0, Some(0.05)).unwrap();
        assert_ne!(ab.samples(), ba.samples());
    }

    #[test]
    fn initial_phase_only_before_start() {
        let mut gen = generator(8000);
        gen.set_initial_phase(PI / 2.0);
        gen.generate_segment(440.0, Some(0.01)).unwrap();
        assert!(gen.samples()[0].abs() < 1e-12);
        gen.set_initial_phase(0.0);
        assert_eq!(gen.phase(), PI / 2.0);
    }

    #[test]
    fn framerate_change_mid_signal_is_rejected() {
        let mut gen = generator(8000);
        let request = Request::new(Tone::Constant(440.0));
        gen.generate(&request).unwrap();
        let moved = request.with_segment(Segment::default().framerate(44100));
        assert!(matches!(gen.generate(&moved), Err(DspError::Unsupported(_))));
    }

    #[test]
    fn unreachable_sample_is_a_continuity_failure() {
        let mut gen = generator(8000);
        gen.generate_segment(300.0, Some(0.05)).unwrap();
        let last = gen.last_frame().unwrap();
        let phase = gen.phase();
        // No unit phasor projects to 2.0, so neither candidate phase can match.
        gen.wavedata[last] = 2.0;

        let err = gen.generate_segment(800.0, Some(0.5)).unwrap_err();
        match err {
            DspError::ContinuityFailure {
                frame,
                from_hz,
                to_hz,
                expected,
                ..
            } => {
                assert_eq!(frame, last);
                assert_eq!(from_hz, 300.0);
                assert_eq!(to_hz, 800.0);
                assert_eq!(expected, 2.0);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(gen.samples().len(), 400);
        assert_eq!(gen.last_frame(), Some(last));
        assert_eq!(gen.frequency(), 300.0);
        assert_eq!(gen.phase(), phase);

        // The rejected length was not kept either.
        gen.generate_segment(300.0, None).unwrap();
        assert_eq!(gen.samples().len(), 800);
    }

    #[test]
    fn close_comparison() {
        assert!(is_close(0.5, 0.5 + 1e-9));
        assert!(!is_close(0.5, 0.51));
        assert!(is_close(1e-17, -3e-16));
    }
}
