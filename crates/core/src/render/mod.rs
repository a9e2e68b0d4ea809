use serde::{Deserialize, Serialize};

use crate::config::SAMPLE_RATE;
use crate::score::parse_score;
use crate::synth::{mix, normalize};
use crate::timbre::{default_timbres, parse_timbres};
use crate::{wav, Result};

/// Metadata describing a completed render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSummary {
    pub channels: usize,
    pub notes: usize,
    pub samples: usize,
    pub duration_seconds: f64,
    /// Peak amplitude before normalization; values above 1.0 were rescaled.
    pub peak: f64,
}

/// A finished render: the WAV byte stream plus its summary.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub wav: Vec<u8>,
    pub summary: RenderSummary,
}

/// Runs the whole pipeline: parse timbres and score, synthesize and mix,
/// normalize, encode. When `timbre_text` is `None` the default two-voice
/// timbres apply.
pub fn render(score_text: &str, timbre_text: Option<&str>) -> Result<RenderOutput> {
    let timbres = match timbre_text {
        Some(text) => parse_timbres(text)?,
        None => default_timbres(),
    };

    let score = parse_score(score_text, &timbres)?;
    let mut samples = mix(&score);
    let peak = normalize(&mut samples);

    let summary = RenderSummary {
        channels: score.channels().len(),
        notes: score
            .channels()
            .iter()
            .map(|channel| channel.notes().len())
            .sum(),
        samples: samples.len(),
        duration_seconds: samples.len() as f64 / f64::from(SAMPLE_RATE),
        peak,
    };
    tracing::debug!(
        channels = summary.channels,
        notes = summary.notes,
        samples = summary.samples,
        peak = summary.peak,
        "render complete"
    );

    let wav = wav::encode_to_vec(&samples, SAMPLE_RATE)?;
    Ok(RenderOutput { wav, summary })
}
