use thiserror::Error;

/// Engine-level failures. Everything here is recoverable: callers either
/// drop the offending rule or fall back to a narrower form.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid validation pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}
