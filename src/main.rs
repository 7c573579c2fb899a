mod audio;
mod cli;
mod config;
mod encode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use cli::{Cli, Command, TemperamentChoice};
use config::Config;
use tonewave::analysis::{analyze_window, AnalysisConfig, SpectralAnalyzer, Spectrum};
use tonewave::generate::{
    BasicGenerator, GeneratorConfig, PhasorGenerator, Segment, SpectralGenerator,
};
use tonewave::music::{Key, Temperament};
use tonewave::score::{render_notes, CancelToken, Note};
use tonewave::signal::{frame_to_seconds, seconds_to_frame};
use tonewave::Waveform;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    let mut cfg = Config::default();
    if let Some(path) = config::find_config(cli.config.as_deref()) {
        if let Some(loaded) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            cfg = loaded;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    // Config values apply only when the CLI is at its default
    let mut generator_config = cfg.generator.clone();
    if cli.framerate != 44100 { generator_config.framerate = cli.framerate; }
    if cli.length != 1.0 { generator_config.length = cli.length; }
    if cli.output == PathBuf::from("signal.wav") { cli.output = cfg.output.filename.clone(); }

    log::info!(
        "Framerate: {}Hz, length: {:.3}s",
        generator_config.framerate,
        generator_config.length
    );

    let waveform = match cli.command {
        Command::Constant { frequency, phase } => {
            let mut gen = basic_generator(&generator_config, cli.seed);
            let segment = Segment { phase, ..Segment::default() };
            log::info!("Constant sinusoid at {} Hz", frequency);
            gen.sin_constant(frequency, segment)
        }
        Command::Linear { start, end } => {
            let mut gen = basic_generator(&generator_config, cli.seed);
            log::info!("Linear sweep {} Hz -> {} Hz", start, end);
            gen.sin_linear(start, end, Segment::default())
        }
        Command::Noise => {
            let mut gen = basic_generator(&generator_config, cli.seed);
            log::info!("White noise");
            gen.whitenoise(Segment::default())
        }
        Command::Chord { frequencies, precision } => {
            if let Some(precision) = precision {
                generator_config.desired_precision = precision;
            }
            let mut gen = SpectralGenerator::new(generator_config.clone());
            log::info!(
                "FFT chord {:?} Hz, window {} frames",
                frequencies,
                gen.window_size()?
            );
            gen.generate_tones(&frequencies, Segment::default())?
        }
        Command::Phasor { frequencies } => {
            let mut gen = PhasorGenerator::new(generator_config.clone());
            for &frequency in &frequencies {
                gen.generate_segment(frequency, None)
                    .with_context(|| format!("Failed to continue signal at {} Hz", frequency))?;
            }
            log::info!("Phasor sequence {:?} Hz", frequencies);
            gen.waveform()
        }
        Command::Scale { root, temperament, tempo } => {
            let tempo = if tempo == 100.0 { cfg.output.tempo } else { tempo };
            render_scale(&generator_config, cli.seed, root, temperament, tempo)?
        }
        Command::Analyze { input, stft, json, precision } => {
            let mut analysis_config = cfg.analysis.clone();
            if let Some(precision) = precision {
                analysis_config.desired_precision = precision;
            }
            let waveform = match input {
                Some(ref path) => {
                    if !path.exists() {
                        anyhow::bail!("Input file not found: {}", path.display());
                    }
                    audio::decode::decode_audio(path)?
                }
                None => test_signal(&generator_config, cli.seed)?,
            };
            return analyze(&waveform, analysis_config, stft, json);
        }
    };

    log::info!(
        "Generated {} frames ({:.3}s)",
        waveform.len(),
        waveform.length_seconds()
    );
    encode::wav::write_wav(&cli.output, &waveform)?;
    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

fn basic_generator(config: &GeneratorConfig, seed: Option<u64>) -> BasicGenerator {
    match seed {
        Some(seed) => BasicGenerator::with_seed(config.clone(), seed),
        None => BasicGenerator::new(config.clone()),
    }
}

fn render_scale(
    config: &GeneratorConfig,
    seed: Option<u64>,
    root: f64,
    choice: TemperamentChoice,
    tempo: f64,
) -> Result<Waveform> {
    let temperaments = match choice {
        TemperamentChoice::Even => vec![Temperament::even()],
        TemperamentChoice::Pythagorean => vec![Temperament::pythagorean()],
        TemperamentChoice::Just => vec![Temperament::just()],
        TemperamentChoice::All => Temperament::all(),
    };

    let mut notes = Vec::new();
    for temperament in temperaments {
        log::info!("Temperament: {}", temperament.name());
        let key = Key::new(root, temperament);
        for semitone in 0..=12u32 {
            notes.push(Note::new(notes.len() as f64, 1.0, key.interval(semitone, 0)));
        }
    }

    let pb = ProgressBar::new(notes.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} notes ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut gen = basic_generator(config, seed);
    let rendered = render_notes(&notes, tempo, &mut gen, &CancelToken::new(), |count, _| {
        pb.set_position(count as u64 + 1);
    })?;
    pb.finish_with_message("Rendering complete");

    Ok(rendered.waveform)
}

/// 0.2s at 1000 Hz, overlapped from 0.1s by 0.2s at 440 Hz.
fn test_signal(config: &GeneratorConfig, seed: Option<u64>) -> Result<Waveform> {
    log::info!("No input given; analyzing 1000 Hz + 440 Hz test signal");
    let mut gen = basic_generator(config, seed);
    let framerate = config.framerate;
    let signal = Waveform::silence(0, framerate)
        .insert(0, &gen.sin_constant(1000.0, Segment::default().length(0.2)))?
        .insert(
            seconds_to_frame(0.1, framerate),
            &gen.sin_constant(440.0, Segment::default().length(0.2)),
        )?;
    Ok(signal)
}

#[derive(Serialize)]
struct BinReport {
    frequency: f64,
    magnitude: f64,
    re: f64,
    im: f64,
}

#[derive(Serialize)]
struct WindowReport {
    start_frame: usize,
    start_seconds: f64,
    bins: Vec<BinReport>,
}

fn bin_reports(spectrum: &Spectrum) -> Vec<BinReport> {
    spectrum
        .iter()
        .map(|bin| BinReport {
            frequency: bin.frequency,
            magnitude: bin.magnitude,
            re: bin.coefficient.re,
            im: bin.coefficient.im,
        })
        .collect()
}

fn strongest(spectrum: &Spectrum, count: usize) -> Vec<(f64, f64)> {
    let mut bins: Vec<(f64, f64)> = spectrum.iter().map(|b| (b.frequency, b.magnitude)).collect();
    bins.sort_by(|a, b| b.1.total_cmp(&a.1));
    bins.truncate(count);
    bins
}

fn analyze(waveform: &Waveform, config: AnalysisConfig, stft: bool, json: bool) -> Result<()> {
    let framerate = waveform.framerate();

    if !stft {
        let spectrum = analyze_window(waveform);
        log::info!("Whole-signal FFT: {} non-zero bins", spectrum.len());
        if json {
            println!("{}", serde_json::to_string_pretty(&bin_reports(&spectrum))?);
        } else {
            println!("Strongest frequencies:");
            for (frequency, magnitude) in strongest(&spectrum, 10) {
                println!("  {:>10.2} Hz  {:>12.0}", frequency, magnitude);
            }
        }
        return Ok(());
    }

    let analyzer = SpectralAnalyzer::new(config);
    let spectrogram = analyzer.analyze_whole_waveform(waveform)?;
    log::info!(
        "STFT: {} windows of {} frames, step {}",
        spectrogram.len(),
        analyzer.window_size(framerate)?,
        analyzer.step(framerate)?
    );

    if json {
        let windows: Vec<WindowReport> = spectrogram
            .iter()
            .map(|(&start_frame, spectrum)| WindowReport {
                start_frame,
                start_seconds: frame_to_seconds(start_frame, framerate),
                bins: bin_reports(spectrum),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&windows)?);
    } else {
        println!("Frequency powers found by STFT:");
        let summary: BTreeMap<usize, Vec<(f64, f64)>> = spectrogram
            .iter()
            .map(|(&start, spectrum)| (start, strongest(spectrum, 3)))
            .collect();
        for (start, peaks) in summary {
            let peaks: Vec<String> = peaks
                .iter()
                .map(|(f, m)| format!("{:.0} Hz ({:.0})", f, m))
                .collect();
            println!(
                "  {:>8} ({:>7.3}s): {}",
                start,
                frame_to_seconds(start, framerate),
                peaks.join(", ")
            );
        }
    }
    Ok(())
}
