//! Error types for event translation and response capture.
//!
//! Every error here is a deterministic function of the inbound event or of what the
//! handler wrote: nothing is transient, so nothing is retried.

/// Failures raised while translating events or finalizing captured responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The event declared a base64 body that does not decode
    #[error("could not decode base64 body: {0}")]
    Body(#[from] base64::DecodeError),
    /// The event method is not a valid HTTP token
    #[error("invalid http method {0:?}")]
    InvalidMethod(String),
    /// Host, path and query did not combine into a valid URI
    #[error("invalid request url {url:?}: {source}")]
    InvalidUri {
        url: String,
        #[source]
        source: http::uri::InvalidUri,
    },
    /// A header name or value from the event cannot be carried by an HTTP request
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },
    #[error("could not build request: {0}")]
    Request(#[from] http::Error),
    /// Context header could not be encoded or decoded
    #[error("invalid context payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no {0} header in request")]
    MissingContextHeader(&'static str),
    /// Payload matched neither or both discriminator fields of a switchable envelope
    #[error("unable to determine {0} version")]
    UnknownVersion(&'static str),
    /// The handler neither wrote a body nor set a status
    #[error("status code not set on response")]
    StatusNotSet,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
