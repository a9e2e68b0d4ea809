use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_NOTE_LENGTH, DEFAULT_OCTAVE, MAX_CHANNELS, MAX_NOTES, SAMPLE_RATE};
use crate::timbre::Timbre;
use crate::{RenderError, Result};

/// The seven pitch letters of the score grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl PitchLetter {
    fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            b'a' => Some(Self::A),
            b'b' => Some(Self::B),
            b'c' => Some(Self::C),
            b'd' => Some(Self::D),
            b'e' => Some(Self::E),
            b'f' => Some(Self::F),
            b'g' => Some(Self::G),
            _ => None,
        }
    }

    /// Base frequency in Hz at octave 4 (C4 = 261.63 Hz).
    pub fn base_frequency(self) -> f64 {
        match self {
            Self::C => 261.63,
            Self::D => 293.66,
            Self::E => 329.63,
            Self::F => 349.23,
            Self::G => 392.00,
            Self::A => 440.00,
            Self::B => 493.88,
        }
    }

    /// Frequency at the given octave, scaled by `2^(octave - 4)`.
    pub fn frequency(self, octave: u8) -> f64 {
        self.base_frequency() * f64::powi(2.0, i32::from(octave) - 4)
    }
}

/// Pitched note or rest, without timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoteKind {
    Pitch { letter: PitchLetter, octave: u8 },
    Rest,
}

/// One scored note. Duration is in seconds, already resolved from the
/// note-length setting that was active when the note was scanned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub kind: NoteKind,
    pub duration: f64,
}

impl NoteEvent {
    /// Base frequency in Hz; 0.0 for rests.
    pub fn frequency(&self) -> f64 {
        match self.kind {
            NoteKind::Pitch { letter, octave } => letter.frequency(octave),
            NoteKind::Rest => 0.0,
        }
    }
}

/// Ordered note sequence bound to exactly one timbre. Built incrementally
/// while scanning, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Channel {
    index: usize,
    notes: Vec<NoteEvent>,
    timbre: Timbre,
}

impl Channel {
    pub fn new(index: usize, timbre: Timbre) -> Self {
        Self {
            index,
            notes: Vec::new(),
            timbre,
        }
    }

    /// Appends a note, enforcing the per-channel capacity.
    pub fn push(&mut self, note: NoteEvent) -> Result<()> {
        if self.notes.len() >= MAX_NOTES {
            return Err(RenderError::ChannelOverflow {
                channel: self.index,
                max: MAX_NOTES,
            });
        }
        self.notes.push(note);
        Ok(())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn timbre(&self) -> &Timbre {
        &self.timbre
    }

    /// Sum of the channel's note durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.notes.iter().map(|note| note.duration).sum()
    }
}

/// A fully parsed score: the channels plus the shared buffer length they
/// will all render into.
#[derive(Debug, Clone)]
pub struct Score {
    channels: Vec<Channel>,
    buffer_len: usize,
}

impl Score {
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Sample count covering the longest channel:
    /// `ceil(max_total_duration * SAMPLE_RATE)`.
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }
}

/// One structured instruction produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Note(PitchLetter),
    Rest,
    Octave(u8),
    Length(u8),
}

/// Cursor over one channel segment: an immutable byte view plus a scan
/// position. Unrecognized bytes are skipped, per the grammar's ignore rule.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(segment: &'a str) -> Self {
        Self {
            input: segment.as_bytes(),
            pos: 0,
        }
    }

    fn peek_digit(&self) -> Option<u8> {
        self.input
            .get(self.pos)
            .filter(|byte| byte.is_ascii_digit())
            .map(|byte| byte - b'0')
    }

    fn next(&mut self) -> Option<Directive> {
        while self.pos < self.input.len() {
            let byte = self.input[self.pos];
            self.pos += 1;
            match byte {
                b'r' => return Some(Directive::Rest),
                b'a'..=b'g' => {
                    if let Some(letter) = PitchLetter::from_ascii(byte) {
                        return Some(Directive::Note(letter));
                    }
                }
                // `o` or `l` without a following digit is ignored like any
                // other stray byte; the next byte stays unconsumed.
                b'o' => {
                    if let Some(digit) = self.peek_digit() {
                        self.pos += 1;
                        return Some(Directive::Octave(digit));
                    }
                }
                b'l' => {
                    // `l0` would mean a zero-division note length
                    if let Some(digit) = self.peek_digit() {
                        if digit > 0 {
                            self.pos += 1;
                            return Some(Directive::Length(digit));
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// Parses a multi-channel score against the already parsed timbres.
///
/// Score segments bind to timbres by position. Segments without a timbre
/// are ignored; timbres without a segment produce an empty channel. Empty
/// segments are skipped the same way the timbre parser skips them.
pub fn parse_score(input: &str, timbres: &[Timbre]) -> Result<Score> {
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

    let mut channels = Vec::with_capacity(timbres.len());
    let mut longest = 0.0_f64;
    for (index, timbre) in timbres.iter().enumerate() {
        let mut channel = Channel::new(index, timbre.clone());
        if let Some(segment) = segments.get(index) {
            scan_channel(&mut channel, segment)?;
        }
        longest = longest.max(channel.total_duration());
        channels.push(channel);
    }

    let buffer_len = (longest * f64::from(SAMPLE_RATE)).ceil() as usize;
    tracing::debug!(channels = channels.len(), buffer_len, "parsed score");
    Ok(Score {
        channels,
        buffer_len,
    })
}

fn scan_channel(channel: &mut Channel, segment: &str) -> Result<()> {
    let mut octave = DEFAULT_OCTAVE;
    let mut note_length = DEFAULT_NOTE_LENGTH;
    let mut scanner = Scanner::new(segment);

    while let Some(directive) = scanner.next() {
        match directive {
            Directive::Note(letter) => channel.push(NoteEvent {
                kind: NoteKind::Pitch { letter, octave },
                duration: note_length,
            })?,
            Directive::Rest => channel.push(NoteEvent {
                kind: NoteKind::Rest,
                duration: note_length,
            })?,
            Directive::Octave(digit) => octave = digit,
            Directive::Length(digit) => note_length = 1.0 / f64::from(digit),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timbre::parse_timbres;

    fn single_timbre() -> Vec<Timbre> {
        vec![Timbre::from_real(&[1.0])]
    }

    #[test]
    fn base_frequencies_match_fixed_table() {
        assert_eq!(PitchLetter::C.frequency(4), 261.63);
        assert_eq!(PitchLetter::D.frequency(4), 293.66);
        assert_eq!(PitchLetter::E.frequency(4), 329.63);
        assert_eq!(PitchLetter::F.frequency(4), 349.23);
        assert_eq!(PitchLetter::G.frequency(4), 392.00);
        assert_eq!(PitchLetter::A.frequency(4), 440.00);
        assert_eq!(PitchLetter::B.frequency(4), 493.88);
    }

    #[test]
    fn frequency_doubles_per_octave() {
        assert_eq!(PitchLetter::A.frequency(5), 880.0);
        assert_eq!(PitchLetter::A.frequency(2), 110.0);
        let ratio = PitchLetter::C.frequency(7) / PitchLetter::C.frequency(4);
        assert!((ratio - 8.0).abs() < 1e-12);
    }

    #[test]
    fn rest_has_zero_frequency() {
        let rest = NoteEvent {
            kind: NoteKind::Rest,
            duration: 0.5,
        };
        assert_eq!(rest.frequency(), 0.0);
    }

    #[test]
    fn scans_plain_scale() {
        let score = parse_score("cdefgab", &single_timbre()).unwrap();
        let notes = score.channels()[0].notes();
        assert_eq!(notes.len(), 7);
        assert!(notes.iter().all(|note| note.duration == 0.5));
        assert!(notes.iter().all(|note| matches!(
            note.kind,
            NoteKind::Pitch { octave: 4, .. }
        )));
        // 7 notes * 0.5 s * 44100 Hz
        assert_eq!(score.buffer_len(), 154_350);
    }

    #[test]
    fn octave_and_length_directives_apply_to_later_notes() {
        let score = parse_score("o5 l4 c r c", &single_timbre()).unwrap();
        let channel = &score.channels()[0];
        let notes = channel.notes();
        assert_eq!(notes.len(), 3);
        assert_eq!(
            notes[0].kind,
            NoteKind::Pitch {
                letter: PitchLetter::C,
                octave: 5
            }
        );
        assert_eq!(notes[1].kind, NoteKind::Rest);
        assert!(notes.iter().all(|note| note.duration == 0.25));
        assert!((channel.total_duration() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn octave_directive_is_absolute() {
        let score = parse_score("o2co6c", &single_timbre()).unwrap();
        let notes = score.channels()[0].notes();
        assert_eq!(
            notes[0].kind,
            NoteKind::Pitch {
                letter: PitchLetter::C,
                octave: 2
            }
        );
        assert_eq!(
            notes[1].kind,
            NoteKind::Pitch {
                letter: PitchLetter::C,
                octave: 6
            }
        );
    }

    #[test]
    fn unknown_characters_are_ignored() {
        let score = parse_score("c? x,d!", &single_timbre()).unwrap();
        assert_eq!(score.channels()[0].notes().len(), 2);
    }

    #[test]
    fn directive_without_digit_is_ignored() {
        let score = parse_score("co", &single_timbre()).unwrap();
        assert_eq!(score.channels()[0].notes().len(), 1);

        // `l0` is ignored; the default note length stays in effect
        let score = parse_score("l0c", &single_timbre()).unwrap();
        let notes = score.channels()[0].notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].duration, 0.5);
    }

    #[test]
    fn note_length_is_reciprocal_of_digit() {
        let score = parse_score("l8c", &single_timbre()).unwrap();
        assert_eq!(score.channels()[0].notes()[0].duration, 0.125);
    }

    #[test]
    fn overflows_after_128_notes() {
        let long = "c".repeat(MAX_NOTES + 1);
        let err = parse_score(&long, &single_timbre()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ChannelOverflow {
                channel: 0,
                max: 128
            }
        ));
    }

    #[test]
    fn exactly_128_notes_fit() {
        let long = "c".repeat(MAX_NOTES);
        let score = parse_score(&long, &single_timbre()).unwrap();
        assert_eq!(score.channels()[0].notes().len(), MAX_NOTES);
    }

    #[test]
    fn rejects_too_many_score_segments() {
        let err = parse_score("c|c|c|c|c", &single_timbre()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ChannelCapacityExceeded { count: 5, max: 4 }
        ));
    }

    #[test]
    fn segments_without_timbre_are_ignored() {
        let score = parse_score("c|d", &single_timbre()).unwrap();
        assert_eq!(score.channels().len(), 1);
        assert_eq!(score.channels()[0].notes().len(), 1);
    }

    #[test]
    fn timbre_without_segment_yields_empty_channel() {
        let timbres = parse_timbres("1|1").unwrap();
        let score = parse_score("c", &timbres).unwrap();
        assert_eq!(score.channels().len(), 2);
        assert!(score.channels()[1].notes().is_empty());
        // buffer is still sized by the populated channel
        assert_eq!(score.buffer_len(), 22_050);
    }

    #[test]
    fn buffer_covers_longest_channel() {
        let timbres = parse_timbres("1|1").unwrap();
        let score = parse_score("cc|c", &timbres).unwrap();
        assert_eq!(score.buffer_len(), 44_100);
    }

    #[test]
    fn fractional_sample_counts_round_up() {
        // 3 notes of 1/8 s = 0.375 s -> 16537.5 samples
        let score = parse_score("l8ccc", &single_timbre()).unwrap();
        assert_eq!(score.buffer_len(), 16_538);
    }
}
