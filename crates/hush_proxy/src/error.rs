use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures of a single proxied exchange. None of them outlive the
/// connection that produced them.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Request carries no usable origin address (missing Host, bad port).
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("cannot reach origin {origin}: {reason}")]
    OriginUnreachable { origin: String, reason: String },

    #[error("failed to send request to origin")]
    OriginWriteFailure(#[source] io::Error),

    #[error("failed to read from origin")]
    OriginReadFailure(#[source] io::Error),

    #[error("failed to write to client")]
    ClientWrite(#[source] io::Error),

    #[error("cache file {}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProxyError {
    /// Errors the client learns about through a 502 instead of a silent close.
    pub fn wants_bad_gateway(&self) -> bool {
        matches!(
            self,
            ProxyError::MalformedRequest(_) | ProxyError::OriginUnreachable { .. }
        )
    }
}
