use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tonewave::signal::Waveform;

/// Streams waveforms into a 16-bit PCM WAV file.
pub struct WavEncoder {
    writer: hound::WavWriter<BufWriter<File>>,
    channels: u16,
    frames_written: usize,
}

impl WavEncoder {
    pub fn new(output_path: &Path, channels: u16, framerate: u32) -> Result<Self> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: framerate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(output_path, spec)
            .with_context(|| format!("Failed to create WAV file: {}", output_path.display()))?;

        log::info!(
            "WAV encoder started: {}, {} channel(s) @ {}Hz",
            output_path.display(),
            channels,
            framerate
        );

        Ok(Self {
            writer,
            channels,
            frames_written: 0,
        })
    }

    /// Append all frames of `waveform`. Samples outside [-1, 1] are clipped.
    pub fn write_frames(&mut self, waveform: &Waveform) -> Result<()> {
        if waveform.channels() != self.channels as usize {
            anyhow::bail!(
                "Waveform has {} channel(s), file expects {}",
                waveform.channels(),
                self.channels
            );
        }
        for &sample in waveform.frames() {
            self.writer
                .write_sample(to_pcm16(sample))
                .context("Failed to write WAV sample")?;
        }
        self.frames_written += waveform.len();
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        self.writer.finalize().context("Failed to finalize WAV file")?;
        log::info!("WAV encoding complete: {} frames", self.frames_written);
        Ok(())
    }
}

/// Write a single waveform to `path`.
pub fn write_wav(path: &Path, waveform: &Waveform) -> Result<()> {
    let mut encoder = WavEncoder::new(path, waveform.channels() as u16, waveform.framerate())?;
    encoder.write_frames(waveform)?;
    encoder.finish()
}

fn to_pcm16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16
}
