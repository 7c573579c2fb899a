use crate::error::{DspError, Result};

use super::mix::mix_down;

/// Raw sample input accepted by [`Waveform::new`].
///
/// `Mono` is a 1-D sequence. `Rows` is a 2-D array in either orientation:
/// `(framecount, channels)` or `(channels, framecount)`.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleData {
    Mono(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

impl From<Vec<f64>> for SampleData {
    fn from(samples: Vec<f64>) -> Self {
        SampleData::Mono(samples)
    }
}

impl From<&[f64]> for SampleData {
    fn from(samples: &[f64]) -> Self {
        SampleData::Mono(samples.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for SampleData {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        SampleData::Rows(rows)
    }
}

/// A block of audio samples with its framerate.
///
/// Samples are stored frame-major: `frames()[f * channels + c]` is channel `c`
/// of frame `f`, i.e. a `(framecount, channels)` layout even for mono data.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    samples: Vec<f64>,
    channels: usize,
    framerate: u32,
}

impl Waveform {
    /// Build a waveform from 1-D or 2-D sample data.
    pub fn new(data: impl Into<SampleData>, framerate: u32) -> Result<Self> {
        let (samples, channels) = shape_samples(data.into())?;
        Ok(Self {
            samples,
            channels,
            framerate,
        })
    }

    /// Build a mono waveform. Infallible since 1-D data is always one channel.
    pub fn mono(samples: Vec<f64>, framerate: u32) -> Self {
        Self {
            samples,
            channels: 1,
            framerate,
        }
    }

    /// Build from samples already interleaved in `(framecount, channels)`
    /// order.
    pub fn interleaved(samples: Vec<f64>, channels: usize, framerate: u32) -> Result<Self> {
        if !(1..=2).contains(&channels) {
            return Err(DspError::Shape(format!("expected 1 or 2 channels, got {}", channels)));
        }
        if samples.len() % channels != 0 {
            return Err(DspError::Shape(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            channels,
            framerate,
        })
    }

    /// Silent mono waveform of `framecount` frames.
    pub fn silence(framecount: usize, framerate: u32) -> Self {
        Self::mono(vec![0.0; framecount], framerate)
    }

    /// Interleaved samples in `(framecount, channels)` order.
    pub fn frames(&self) -> &[f64] {
        &self.samples
    }

    /// Replace the sample data, re-validating its shape. The waveform is left
    /// untouched when the new data is rejected.
    pub fn set_frames(&mut self, data: impl Into<SampleData>) -> Result<()> {
        let (samples, channels) = shape_samples(data.into())?;
        self.samples = samples;
        self.channels = channels;
        Ok(())
    }

    pub fn into_frames(self) -> Vec<f64> {
        self.samples
    }

    /// All channels of one frame.
    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.channels)?;
        self.samples.get(start..start + self.channels)
    }

    /// Iterator over a single channel's samples.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f64> + '_ {
        let channels = self.channels;
        self.samples
            .iter()
            .skip(channel)
            .step_by(channels)
            .copied()
            .take(if channel < channels { usize::MAX } else { 0 })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    pub fn is_mono(&self) -> bool {
        self.channels == 1
    }

    /// Frame count (samples per channel).
    pub fn len(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn length_seconds(&self) -> f64 {
        self.len() as f64 / self.framerate as f64
    }

    /// Mono view of the data: the samples themselves for mono, the per-frame
    /// channel mean for stereo.
    pub fn to_mono(&self) -> Vec<f64> {
        if self.channels == 1 {
            return self.samples.clone();
        }
        self.samples
            .chunks(self.channels)
            .map(|frame| frame.iter().sum::<f64>() / self.channels as f64)
            .collect()
    }

    /// Overlay `other` starting at frame `offset` and mix it down with `self`.
    ///
    /// The result spans `max(offset + other.len(), self.len())` frames. Only
    /// mono operands are supported.
    pub fn insert(&self, offset: usize, other: &Waveform) -> Result<Waveform> {
        if !self.is_mono() || !other.is_mono() {
            return Err(DspError::Unsupported(format!(
                "insert requires mono operands (got {} and {} channels)",
                self.channels, other.channels
            )));
        }

        let size = (offset + other.len()).max(self.len());
        let mut overlay = vec![0.0; size];
        overlay[offset..offset + other.len()].copy_from_slice(&other.samples);

        Ok(Waveform::mono(
            mix_down(&self.samples, &overlay),
            self.framerate,
        ))
    }
}

fn shape_samples(data: SampleData) -> Result<(Vec<f64>, usize)> {
    let rows = match data {
        SampleData::Mono(samples) => return Ok((samples, 1)),
        SampleData::Rows(rows) => rows,
    };

    let width = match rows.first() {
        Some(row) => row.len(),
        None => return Err(DspError::Shape("2-D sample data has no rows".into())),
    };
    if let Some(bad) = rows.iter().find(|row| row.len() != width) {
        return Err(DspError::Shape(format!(
            "ragged 2-D sample data: rows of {} and {} columns",
            width,
            bad.len()
        )));
    }

    let height = rows.len();
    // Orient so the shorter axis is the channel axis.
    let (framecount, channels, transposed) = if height < width {
        (width, height, true)
    } else {
        (height, width, false)
    };
    if !(1..=2).contains(&channels) {
        return Err(DspError::Shape(format!(
            "expected 1 or 2 channels, got shape ({}, {})",
            height, width
        )));
    }

    let samples = if transposed {
        let mut samples = Vec::with_capacity(framecount * channels);
        for frame in 0..framecount {
            for row in &rows {
                samples.push(row[frame]);
            }
        }
        samples
    } else {
        rows.into_iter().flatten().collect()
    };

    Ok((samples, channels))
}
