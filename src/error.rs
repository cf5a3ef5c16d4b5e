//! Error types for composition, configuration and engine calls.

use thiserror::Error;

/// Top-level error for engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
    /// Composing sibling traces failed.
    #[error("Composite error on channel {channel}: {source}")]
    Composite {
        channel: usize,
        #[source]
        source: CompositeError,
    },

    /// The scope description was rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No channel exists at this index.
    #[error("Unknown channel {0}")]
    UnknownChannel(usize),

    /// The channel is a composite where a generator was required.
    #[error("Channel {0} is not a generator")]
    NotAGenerator(usize),

    /// The channel has no stroke buffer.
    #[error("Channel {0} cannot capture strokes")]
    NotCaptureCapable(usize),
}

/// Failures of the compositor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositeError {
    /// Inputs of unequal length. Indicates a missed resize.
    #[error("Length mismatch: input {index} has {found} samples, expected {expected}")]
    LengthMismatch {
        expected: usize,
        found: usize,
        index: usize,
    },

    /// Nothing to combine.
    #[error("No inputs to combine")]
    Degenerate,
}

/// Invalid scope descriptions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Composite channel {channel} references missing channel {sibling}")]
    MissingSibling { channel: usize, sibling: usize },

    #[error("Composite channel {channel} references non-generator channel {sibling}")]
    SiblingNotGenerator { channel: usize, sibling: usize },

    #[error("Channel {channel}: {field} must be finite, got {value}")]
    NonFinite {
        channel: usize,
        field: &'static str,
        value: f64,
    },

    #[error(
        "Composite channel {channel} fits {siblings} generators but only {candidates} harmonic components are analysed"
    )]
    TooFewHarmonics {
        channel: usize,
        siblings: usize,
        candidates: usize,
    },

    #[error("Viewport height {height} leaves no room inside margin {margin}")]
    EmptyViewport { height: f64, margin: f64 },

    #[error("Malformed JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ScopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_error_names_channel() {
        let err = ScopeError::Composite {
            channel: 3,
            source: CompositeError::LengthMismatch {
                expected: 10,
                found: 8,
                index: 1,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("channel 3"), "got {msg}");
    }

    #[test]
    fn config_error_converts() {
        let err: ScopeError = ConfigError::MissingSibling {
            channel: 1,
            sibling: 9,
        }
        .into();
        assert!(matches!(err, ScopeError::Config(_)));
    }
}
