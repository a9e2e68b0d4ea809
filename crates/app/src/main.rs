use std::path::PathBuf;

use clap::Parser;
use mml_synth_core::{render, RenderConfig};
use tracing_subscriber::EnvFilter;

fn main() -> mml_synth_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = RenderConfig {
        output_path: cli.output,
        emit_summary: cli.summary,
    };

    tracing::info!(score = %cli.score, output = %config.output_path.display(), "rendering score");

    let output = render(&cli.score, cli.timbre.as_deref())?;
    std::fs::write(&config.output_path, &output.wav)?;

    if config.emit_summary {
        match serde_json::to_string_pretty(&output.summary) {
            Ok(text) => println!("{text}"),
            Err(err) => tracing::warn!(%err, "could not serialize render summary"),
        }
    }

    tracing::info!(
        bytes = output.wav.len(),
        duration_seconds = output.summary.duration_seconds,
        "WAV file written"
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Additive-synthesis MML to WAV renderer", long_about = None)]
struct Cli {
    /// MML score. Channels are separated by `|`; within a channel the
    /// directives are `a`-`g` (note), `r` (rest), `o<digit>` (octave) and
    /// `l<digit>` (note length = 1/digit seconds).
    score: String,

    /// Per-channel Fourier timbres, channels separated by `|`. Each channel
    /// is `real1,real2,...;imag1,imag2,...` with the imaginary list optional.
    #[arg(short, long)]
    timbre: Option<String>,

    /// Destination path for the rendered WAV file.
    #[arg(short, long, default_value = "output.wav")]
    output: PathBuf,

    /// Print a JSON render summary to stdout.
    #[arg(long)]
    summary: bool,
}
