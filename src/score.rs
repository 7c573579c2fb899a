//! Rendering note lists into one waveform.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::generate::{BasicGenerator, Segment};
use crate::signal::{quarter_note_length, seconds_to_frame, Waveform};

/// A note placed in musical time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    /// Start, in quarter notes from the beginning.
    pub offset: f64,
    /// Duration in quarter notes.
    pub quarter_length: f64,
    pub frequency: f64,
}

impl Note {
    pub fn new(offset: f64, quarter_length: f64, frequency: f64) -> Self {
        Self {
            offset,
            quarter_length,
            frequency,
        }
    }
}

/// Shared stop flag checked between notes.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of [`render_notes`].
#[derive(Clone, Debug)]
pub struct Rendered {
    pub waveform: Waveform,
    /// Notes inserted before finishing or being cancelled.
    pub notes_rendered: usize,
    pub cancelled: bool,
}

/// Render `notes` at `tempo_bpm` with constant sinusoids, each inserted at its
/// offset. Cancellation stops before the next note and keeps what was built.
pub fn render_notes(
    notes: &[Note],
    tempo_bpm: f64,
    generator: &mut BasicGenerator,
    cancel: &CancelToken,
    mut on_note: impl FnMut(usize, &Note),
) -> Result<Rendered> {
    let framerate = generator.framerate();
    let qnl = quarter_note_length(tempo_bpm);
    let mut song = Waveform::silence(0, framerate);

    for (count, note) in notes.iter().enumerate() {
        if cancel.is_cancelled() {
            log::info!("Stopping render after {}/{} notes", count, notes.len());
            return Ok(Rendered {
                waveform: song,
                notes_rendered: count,
                cancelled: true,
            });
        }

        let length = qnl * note.quarter_length;
        let start = seconds_to_frame(qnl * note.offset, framerate);
        log::debug!(
            "{}/{}: {:.2} Hz for {:.3}s at frame {}",
            count + 1,
            notes.len(),
            note.frequency,
            length,
            start
        );
        let tone = generator.sin_constant(note.frequency, Segment::default().length(length));
        song = song.insert(start, &tone)?;
        on_note(count, note);
    }

    Ok(Rendered {
        waveform: song,
        notes_rendered: notes.len(),
        cancelled: false,
    })
}
