mod app;
mod audio;
mod command;
mod sequencer;
mod synth;
mod ui;

use anyhow::Result;
use clap::Parser;

use app::App;
use sequencer::Meter;

/// Stepline - terminal drum machine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Starting tempo in BPM (clamped to 30-250)
    #[arg(long, default_value_t = 120.0)]
    bpm: f64,

    /// Steps per cycle (1-16)
    #[arg(long, default_value_t = 16)]
    beats: usize,

    /// Subdivisions per beat (1-8)
    #[arg(long, default_value_t = 1)]
    subdivision: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut app = App::new(args.bpm, Meter::new(args.beats, args.subdivision))?;
    app.run()
}
