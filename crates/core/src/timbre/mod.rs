use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_BACKING_HARMONICS, DEFAULT_LEAD_HARMONICS, MAX_CHANNELS, MAX_HARMONICS};
use crate::{RenderError, Result};

/// One complex Fourier coefficient. Position in the table is the harmonic
/// index, starting at 1 for the fundamental.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    pub real: f64,
    pub imag: f64,
}

/// Ordered harmonic coefficient table for one channel. Immutable once
/// parsed; the owning channel is the only consumer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Timbre {
    harmonics: Vec<Harmonic>,
}

impl Timbre {
    /// Builds a purely real table (cosine-only synthesis).
    pub fn from_real(real: &[f64]) -> Self {
        Self {
            harmonics: real
                .iter()
                .map(|&real| Harmonic { real, imag: 0.0 })
                .collect(),
        }
    }

    pub fn harmonics(&self) -> &[Harmonic] {
        &self.harmonics
    }

    pub fn len(&self) -> usize {
        self.harmonics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.harmonics.is_empty()
    }
}

/// Timbres used when the caller does not supply any: a lead voice with
/// three decaying harmonics and a pure-sine backing voice.
pub fn default_timbres() -> Vec<Timbre> {
    vec![
        Timbre::from_real(DEFAULT_LEAD_HARMONICS),
        Timbre::from_real(DEFAULT_BACKING_HARMONICS),
    ]
}

/// Parses a multi-channel timbre description.
///
/// Channels are separated by `|`. Within a channel the comma-separated real
/// coefficient list comes first; an optional `;` introduces the imaginary
/// list. The real list defines the harmonic count. A shorter imaginary list
/// is padded with zeros, an absent one means every harmonic is purely real.
/// Empty channel segments are skipped.
pub fn parse_timbres(input: &str) -> Result<Vec<Timbre>> {
    let segments: Vec<&str> = input
        .split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.len() > MAX_CHANNELS {
        return Err(RenderError::ChannelCapacityExceeded {
            count: segments.len(),
            max: MAX_CHANNELS,
        });
    }

    let mut timbres = Vec::with_capacity(segments.len());
    for (channel, segment) in segments.iter().enumerate() {
        timbres.push(parse_channel_timbre(channel, segment)?);
    }
    tracing::debug!(channels = timbres.len(), "parsed timbres");
    Ok(timbres)
}

fn parse_channel_timbre(channel: usize, segment: &str) -> Result<Timbre> {
    let mut parts = segment.splitn(2, ';');
    let real = parse_coefficients(channel, parts.next().unwrap_or(""))?;
    let imag = match parts.next() {
        Some(list) => parse_coefficients(channel, list)?,
        None => Vec::new(),
    };

    if real.len() > MAX_HARMONICS {
        return Err(RenderError::HarmonicCapacityExceeded {
            channel,
            count: real.len(),
            max: MAX_HARMONICS,
        });
    }
    // The real list fixes the harmonic count for the channel.
    if imag.len() > real.len() {
        return Err(RenderError::HarmonicCapacityExceeded {
            channel,
            count: imag.len(),
            max: real.len(),
        });
    }

    let harmonics = real
        .iter()
        .enumerate()
        .map(|(index, &real)| Harmonic {
            real,
            imag: imag.get(index).copied().unwrap_or(0.0),
        })
        .collect();
    Ok(Timbre { harmonics })
}

fn parse_coefficients(channel: usize, list: &str) -> Result<Vec<f64>> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }

    list.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<f64>()
                .map_err(|_| RenderError::MalformedTimbreCoefficient {
                    channel,
                    token: token.to_string(),
                })
        })
        .collect()
}
