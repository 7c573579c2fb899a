//! Unit conversions between seconds, frames and musical beats.

/// Frame index at `seconds`, rounded down.
pub fn seconds_to_frame(seconds: f64, framerate: u32) -> usize {
    (seconds * framerate as f64).floor() as usize
}

pub fn frame_to_seconds(frame: usize, framerate: u32) -> f64 {
    frame as f64 / framerate as f64
}

/// Seconds per beat (quarter note) at `tempo_bpm`.
pub fn quarter_note_length(tempo_bpm: f64) -> f64 {
    60.0 / tempo_bpm
}

/// Frames spanned by `length` seconds, rounded to the nearest frame.
pub(crate) fn framecount(length: f64, framerate: u32) -> usize {
    (framerate as f64 * length).round().max(0.0) as usize
}
