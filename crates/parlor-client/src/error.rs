//! Client-side transport and API errors.

use thiserror::Error;

/// Errors from the gateway transport and the REST messaging API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Gateway connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The socket failed mid-session.
    #[error("socket error: {0}")]
    Socket(String),

    /// A frame violated the wire protocol.
    #[error("protocol error: {0}")]
    Protocol(#[from] parlor_proto::ProtocolError),

    /// The credential provider could not produce a token.
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    /// HTTP request failed before a response arrived.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("api error: status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it was readable.
        message: String,
    },
}

/// Convenience alias for client results.
pub type Result<T> = std::result::Result<T, ClientError>;
