use std::io;

use thiserror::Error;

/// Boxed cause produced by the transport layer
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by connection setup, uploads and session release
#[derive(Debug, Error)]
pub enum SftpError {
    /// Network dial or authentication failed
    #[error("failed to dial SSH: {0}")]
    Dial(#[source] BoxError),

    /// The SFTP subsystem could not be negotiated on the transport
    #[error("failed to create SFTP client: {0}")]
    Session(#[source] BoxError),

    /// The remote file could not be created
    #[error("failed to create remote file {path:?}: {source}")]
    Create {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Writing to the remote file failed; the handle was released cleanly
    #[error("failed to write remote file {path:?}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The data was written but releasing the remote file failed
    #[error("failed to close remote file {path:?}: {source}")]
    Close {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Writing failed and releasing the handle failed afterwards
    #[error("failed to write remote file {path:?}: {write} (close also failed: {close})")]
    WriteAndClose {
        path: String,
        #[source]
        write: io::Error,
        close: io::Error,
    },

    /// Releasing the SFTP session or its transport failed
    #[error("failed to close SFTP session: {0}")]
    Release(#[source] BoxError),
}

impl SftpError {
    /// The error that closing the remote file produced, if any.
    pub fn close_error(&self) -> Option<&io::Error> {
        match self {
            SftpError::Close { source, .. } => Some(source),
            SftpError::WriteAndClose { close, .. } => Some(close),
            _ => None,
        }
    }

    /// The error that writing to the remote file produced, if any.
    pub fn write_error(&self) -> Option<&io::Error> {
        match self {
            SftpError::Write { source, .. } => Some(source),
            SftpError::WriteAndClose { write, .. } => Some(write),
            _ => None,
        }
    }
}
