//! Signal generators.
//!
//! Three variants share one capability, [`SignalGenerator::generate`]:
//!
//! - [`BasicGenerator`]: time-domain sinusoids and white noise, one buffer per
//!   call, independent of earlier calls.
//! - [`SpectralGenerator`]: several simultaneous tones from a sparse spectrum
//!   run through an inverse FFT.
//! - [`PhasorGenerator`]: an append-only signal whose phase stays continuous
//!   across frequency changes.

pub mod basic;
pub mod phasor;
pub mod spectral;

use serde::Deserialize;

use crate::error::{DspError, Result};
use crate::signal::Waveform;

pub use basic::BasicGenerator;
pub use phasor::PhasorGenerator;
pub use spectral::SpectralGenerator;

/// Defaults handed to each generator at construction.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Buffer length in seconds.
    #[serde(default = "default_length")]
    pub length: f64,
    /// Samples per second.
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    /// Share of the buffer faded in and out by `sin_constant`.
    #[serde(default = "default_fade_percentage")]
    pub fade_percentage: f64,
    /// Bin spacing target (Hz) for the spectral generator.
    #[serde(default = "default_precision")]
    pub desired_precision: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            framerate: default_framerate(),
            fade_percentage: default_fade_percentage(),
            desired_precision: default_precision(),
        }
    }
}

fn default_length() -> f64 { 1.0 }
fn default_framerate() -> u32 { 44100 }
fn default_fade_percentage() -> f64 { 0.02 }
fn default_precision() -> f64 { 10.0 }

/// Per-call overrides. Unset fields keep the generator's current values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
    pub length: Option<f64>,
    pub framerate: Option<u32>,
    /// Starting phase in radians; random in `[0, 2π)` when unset.
    pub phase: Option<f64>,
}

impl Segment {
    pub fn length(mut self, seconds: f64) -> Self {
        self.length = Some(seconds);
        self
    }

    pub fn framerate(mut self, framerate: u32) -> Self {
        self.framerate = Some(framerate);
        self
    }

    pub fn phase(mut self, radians: f64) -> Self {
        self.phase = Some(radians);
        self
    }
}

/// What to synthesise.
#[derive(Clone, Debug, PartialEq)]
pub enum Tone {
    Constant(f64),
    Sweep { start: f64, end: f64 },
    Chord(Vec<f64>),
    WhiteNoise,
}

/// One generation request.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub tone: Tone,
    pub segment: Segment,
}

impl Request {
    pub fn new(tone: Tone) -> Self {
        Self {
            tone,
            segment: Segment::default(),
        }
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segment = segment;
        self
    }
}

pub trait SignalGenerator {
    fn generate(&mut self, request: &Request) -> Result<Waveform>;
}

/// The closed set of generator variants, picked explicitly by the caller.
#[derive(Debug)]
pub enum Generator {
    Basic(BasicGenerator),
    Spectral(SpectralGenerator),
    Phasor(PhasorGenerator),
}

impl SignalGenerator for Generator {
    fn generate(&mut self, request: &Request) -> Result<Waveform> {
        match self {
            Generator::Basic(g) => g.generate(request),
            Generator::Spectral(g) => g.generate(request),
            Generator::Phasor(g) => g.generate(request),
        }
    }
}

fn unsupported(generator: &str, tone: &Tone) -> DspError {
    DspError::Unsupported(format!("{} cannot synthesise {:?}", generator, tone))
}
