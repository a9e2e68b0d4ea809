use std::f64::consts::TAU;

use crate::config::SAMPLE_RATE;
use crate::score::{NoteEvent, NoteKind, Score};
use crate::timbre::Timbre;

/// Number of samples a note occupies when rendered, and equally the amount
/// the mixer advances past it: `floor(duration * SAMPLE_RATE)`. Using one
/// rounding rule for both keeps note boundaries aligned across a channel.
pub fn note_span(note: &NoteEvent) -> usize {
    (note.duration * f64::from(SAMPLE_RATE)) as usize
}

/// Additively renders one note into `buffer` starting at sample `start`.
///
/// Each sample is the real part of a sum of complex exponentials weighted
/// by the timbre's coefficients, harmonic index starting at 1 (no DC term).
/// Phase restarts at 0 for every note; there is no phase continuity across
/// note boundaries. Samples that would land past the end of the buffer are
/// dropped.
pub fn render_note(buffer: &mut [f64], start: usize, note: &NoteEvent, timbre: &Timbre) {
    let f0 = match note.kind {
        // Rests leave the zero-initialized buffer untouched entirely.
        NoteKind::Rest => return,
        NoteKind::Pitch { .. } => note.frequency(),
    };

    for i in 0..note_span(note) {
        let index = start + i;
        if index >= buffer.len() {
            break;
        }
        let t = i as f64 / f64::from(SAMPLE_RATE);
        let mut sample = 0.0;
        for (h, harmonic) in timbre.harmonics().iter().enumerate() {
            let phase = TAU * (h + 1) as f64 * f0 * t;
            sample += harmonic.real * phase.cos() - harmonic.imag * phase.sin();
        }
        buffer[index] += sample;
    }
}

/// Renders every note of every channel into one shared buffer, additively.
/// Shorter channels leave the tail of the buffer at zero.
pub fn mix(score: &Score) -> Vec<f64> {
    let mut buffer = vec![0.0; score.buffer_len()];
    for channel in score.channels() {
        let mut start = 0;
        for note in channel.notes() {
            render_note(&mut buffer, start, note, channel.timbre());
            start += note_span(note);
        }
        tracing::debug!(
            channel = channel.index(),
            notes = channel.notes().len(),
            end_offset = start,
            "mixed channel"
        );
    }
    buffer
}

/// Rescales the buffer to a peak of 1.0 when it would clip. Material whose
/// peak is already within range is left untouched, never amplified.
/// Returns the pre-scaling peak.
pub fn normalize(buffer: &mut [f64]) -> f64 {
    let peak = buffer
        .iter()
        .fold(0.0_f64, |peak, sample| peak.max(sample.abs()));
    if peak > 1.0 {
        for sample in buffer.iter_mut() {
            *sample /= peak;
        }
    }
    peak
}
