//! Core library for the MML additive synthesiser.
//!
//! The crate turns a compact per-channel note score ("MML") and a set of
//! per-channel Fourier harmonic coefficient tables into a mono 16-bit PCM
//! WAV byte stream. Each module owns a distinct pipeline stage (timbre
//! parsing, score parsing, synthesis and mixing, WAV encoding) and the
//! [`render`] entry point chains them into a single synchronous batch
//! computation. No file handles are opened here; callers hand the returned
//! bytes to whatever sink they manage.

pub mod config;
pub mod error;
pub mod render;
pub mod score;
pub mod synth;
pub mod timbre;
pub mod wav;

pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use render::{render, RenderOutput, RenderSummary};
pub use score::{parse_score, Channel, NoteEvent, NoteKind, PitchLetter, Score};
pub use timbre::{default_timbres, parse_timbres, Harmonic, Timbre};
