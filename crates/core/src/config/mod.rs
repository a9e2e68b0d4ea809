use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output sample rate in Hz. The pipeline renders mono 16-bit PCM at this
/// fixed rate; there is no resampling stage.
pub const SAMPLE_RATE: u32 = 44_100;

/// Maximum number of simultaneously mixed channels.
pub const MAX_CHANNELS: usize = 4;

/// Maximum number of harmonics in a single timbre table.
pub const MAX_HARMONICS: usize = 16;

/// Maximum number of notes in a single channel.
pub const MAX_NOTES: usize = 128;

/// Octave a channel starts in before any `o` directive.
pub const DEFAULT_OCTAVE: u8 = 4;

/// Note length in seconds before any `l` directive.
pub const DEFAULT_NOTE_LENGTH: f64 = 0.5;

/// Harmonic amplitudes for channel 0 when no timbre is supplied.
pub const DEFAULT_LEAD_HARMONICS: &[f64] = &[1.0, 0.5, 0.25];

/// Harmonic amplitudes for channel 1 when no timbre is supplied.
pub const DEFAULT_BACKING_HARMONICS: &[f64] = &[1.0];

/// Render job configuration assembled by the caller (the CLI front end).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Destination path for the rendered WAV file.
    pub output_path: PathBuf,
    /// Whether to report a JSON summary of the finished render.
    pub emit_summary: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output.wav"),
            emit_summary: false,
        }
    }
}
