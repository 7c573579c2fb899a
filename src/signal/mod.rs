pub mod mix;
pub mod time;
pub mod waveform;

pub use mix::{mix_down, normalize};
pub use time::{frame_to_seconds, quarter_note_length, seconds_to_frame};
pub use waveform::{SampleData, Waveform};
