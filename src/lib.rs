// Module declarations
mod client;
mod error;
pub mod memory;
mod operations;
mod session;
mod ssh;
mod transport;
mod types;

// Public API exports
pub use client::SftpClient;
pub use error::{BoxError, SftpError};
pub use memory::{FailPoint, MemoryFs};
pub use session::connect;
pub use ssh::{AcceptAnyHostKey, SftpSubsystem, SshDialer};
pub use transport::{Dialer, RemoteFile, RemoteFs, SessionFactory};
pub use types::{AuthConfig, ConnectionParams};

// Re-export commonly used external types for convenience
pub use bytes::Bytes;
