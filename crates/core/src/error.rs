/// Result alias that carries the custom [`RenderError`] type.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Common error type for the core crate.
///
/// Parse and capacity violations abort the render before any output is
/// produced; unparsable coefficients and over-full tables are never
/// silently patched over.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A numeric token in a timbre description failed to parse.
    #[error("channel {channel}: malformed timbre coefficient `{token}`")]
    MalformedTimbreCoefficient { channel: usize, token: String },

    /// More channel segments than the mixer supports.
    #[error("{count} channels exceed the {max} channel limit")]
    ChannelCapacityExceeded { count: usize, max: usize },

    /// A single timbre declared more harmonics than its table can hold.
    #[error("channel {channel}: {count} harmonics exceed the limit of {max}")]
    HarmonicCapacityExceeded {
        channel: usize,
        count: usize,
        max: usize,
    },

    /// A score segment emitted more notes than one channel can hold.
    #[error("channel {channel}: note capacity of {max} exceeded")]
    ChannelOverflow { channel: usize, max: usize },

    /// The destination for the WAV byte stream could not be written.
    #[error("output sink unavailable: {0}")]
    OutputSink(#[from] std::io::Error),
}
