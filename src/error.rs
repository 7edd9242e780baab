use thiserror::Error;

/// Failure taxonomy shared by the caption and quiz services.
///
/// Every variant is converted to a `{ "error": message }` body at the
/// handler boundary; nothing propagates unhandled to the transport layer.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Bad or missing caller input. Surfaced verbatim with a 400 status.
    #[error("{0}")]
    Validation(String),
    /// Missing or unusable credential, detected at startup.
    #[error("API configuration error: {0}")]
    Configuration(String),
    /// The external model call failed or returned unusable content.
    #[error("Upstream model request failed: {0}")]
    Upstream(String),
    /// The model output did not contain parseable structured data.
    #[error("Failed to parse model output: {0}")]
    Parse(String),
    /// The model answered, but with nothing usable.
    #[error("{0}")]
    EmptyResult(String),
}
