use std::io;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::error::BoxError;
use crate::types::AuthConfig;

/// Opens an authenticated transport to a server
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Transport produced by a successful dial
    type Transport: Send + 'static;

    /// Dials `address` (`host:port`) and authenticates with `auth`
    async fn dial(&self, address: &str, auth: &AuthConfig) -> Result<Self::Transport, BoxError>;
}

/// Negotiates a file-transfer session on top of a transport
#[async_trait]
pub trait SessionFactory<T: Send + 'static>: Send + Sync {
    /// Consumes the transport and returns the session running over it
    async fn new_session(&self, transport: T) -> Result<Box<dyn RemoteFs>, BoxError>;
}

/// An open file-transfer session
#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// Creates or truncates the file at `path` and returns a handle to it
    ///
    /// The handle is released with `AsyncWriteExt::shutdown`.
    async fn create(&self, path: &str) -> io::Result<Box<dyn RemoteFile>>;

    /// Releases the session and the transport it runs on
    async fn close(&self) -> Result<(), BoxError>;
}

/// A writable remote file handle
pub trait RemoteFile: AsyncWrite + Unpin + Send {}

impl<T: AsyncWrite + Unpin + Send> RemoteFile for T {}
