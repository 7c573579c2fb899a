use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tonewave", version, about = "Sinusoid, phasor and FFT signal generator and analyzer")]
pub struct Cli {
    /// Config file (defaults to tonewave.toml or ~/.config/tonewave/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// WAV file to write the generated signal to
    #[arg(short, long, global = true, default_value = "signal.wav")]
    pub output: PathBuf,

    /// Frames per second
    #[arg(short = 'F', long, global = true, default_value_t = 44100)]
    pub framerate: u32,

    /// Length in seconds of each generated signal or segment
    #[arg(short, long, global = true, default_value_t = 1.0)]
    pub length: f64,

    /// Seed for random phase and noise
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sinusoid of constant frequency with faded edges
    Constant {
        #[arg(short, long, default_value_t = 480.0)]
        frequency: f64,
        /// Starting phase in radians (random when omitted)
        #[arg(long)]
        phase: Option<f64>,
    },
    /// Sinusoid sweeping linearly between two frequencies
    Linear {
        #[arg(long, default_value_t = 240.0)]
        start: f64,
        #[arg(long, default_value_t = 960.0)]
        end: f64,
    },
    /// Gaussian white noise
    Noise,
    /// Several simultaneous tones from an inverse FFT
    Chord {
        #[arg(short, long = "frequency", default_values_t = [440.0, 554.365, 659.255])]
        frequencies: Vec<f64>,
        /// FFT bin spacing in Hz
        #[arg(long)]
        precision: Option<f64>,
    },
    /// Phase-continuous sequence of tones, one segment per frequency
    Phasor {
        #[arg(short, long = "frequency", default_values_t = [300.0, 800.0])]
        frequencies: Vec<f64>,
    },
    /// The thirteen semitones of a key, played in one or more temperaments
    Scale {
        /// Root frequency in Hz
        #[arg(long, default_value_t = 440.0)]
        root: f64,
        #[arg(long, value_enum, default_value_t = TemperamentChoice::All)]
        temperament: TemperamentChoice,
        /// Beats per minute; each note lasts one beat
        #[arg(short, long, default_value_t = 100.0)]
        tempo: f64,
    },
    /// Frequency analysis of an audio file or a built-in test signal
    Analyze {
        /// Audio file (WAV, FLAC, MP3, OGG); a two-tone test signal when omitted
        input: Option<PathBuf>,
        /// Sliding-window analysis instead of one FFT over the whole signal
        #[arg(long)]
        stft: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// STFT bin spacing in Hz
        #[arg(long)]
        precision: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TemperamentChoice {
    Even,
    Pythagorean,
    Just,
    All,
}
