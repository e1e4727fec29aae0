use thiserror::Error;

/// Failures a refresh cycle can hit.
///
/// None of these propagate out of the scheduler; each variant maps to a
/// recovery path. `NoFallback` is the only one that surfaces a visible
/// error state.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The transport could not deliver a response.
    #[error("network request failed: {0}")]
    Network(anyhow::Error),

    /// The response body was not valid post data.
    #[error("malformed feed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The automatic fetch ceiling was reached; throttling, not failure.
    #[error("refresh attempts exhausted")]
    AttemptsExhausted,

    /// A fetch failed and no cached snapshot exists to fall back on.
    #[error("no cached content available")]
    NoFallback,
}
