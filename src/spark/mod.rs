pub mod auth;
pub mod client;
pub mod protocol;

pub use client::SparkClient;

/// Failures inside one analysis exchange. None of these reach the caller of
/// the HTTP API directly; the analysis handler converts every variant into a
/// fallback response.
#[derive(Debug, thiserror::Error)]
pub enum SparkError {
    #[error("Spark credentials are not configured")]
    MissingCredentials,

    #[error("Invalid Spark endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Spark API error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("Analysis exchange timed out")]
    Timeout,
}
