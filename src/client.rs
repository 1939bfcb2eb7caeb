use bytes::Bytes;
use tracing::{error, info};

use crate::error::SftpError;
use crate::operations::upload;
use crate::session;
use crate::ssh::{SftpSubsystem, SshDialer};
use crate::transport::{Dialer, RemoteFs, SessionFactory};
use crate::types::ConnectionParams;

/// SFTP client owning one open session on a remote server
pub struct SftpClient {
    pub(crate) fs: Box<dyn RemoteFs>,
}

impl std::fmt::Debug for SftpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpClient").finish_non_exhaustive()
    }
}

impl SftpClient {
    /// Wraps an already negotiated session
    ///
    /// Mostly useful with a test double such as [`MemoryFs`](crate::MemoryFs).
    pub fn new(fs: Box<dyn RemoteFs>) -> Self {
        Self { fs }
    }

    /// Connects over SSH with password authentication and starts SFTP
    ///
    /// Host keys are not verified.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let params = ConnectionParams::new("tester", "password", "127.0.0.1", 22);
    /// let client = SftpClient::connect(&params).await?;
    /// ```
    pub async fn connect(params: &ConnectionParams) -> Result<Self, SftpError> {
        session::connect(params, &SshDialer::default(), &SftpSubsystem).await
    }

    /// Connects through caller supplied dial and session capabilities
    pub async fn connect_with<D, F>(
        params: &ConnectionParams,
        dialer: &D,
        sessions: &F,
    ) -> Result<Self, SftpError>
    where
        D: Dialer,
        F: SessionFactory<D::Transport>,
    {
        session::connect(params, dialer, sessions).await
    }

    /// Writes `data` to a new or truncated file at `remote_path`
    ///
    /// # Arguments
    ///
    /// * `data` - Complete contents of the remote file
    /// * `remote_path` - Destination path on the remote server
    ///
    /// # Example
    ///
    /// ```ignore
    /// client.upload(b"This is a test file content.".as_slice(), "test.txt").await?;
    /// ```
    pub async fn upload(
        &self,
        data: impl Into<Bytes>,
        remote_path: &str,
    ) -> Result<(), SftpError> {
        upload::put_bytes(self, data.into(), remote_path).await
    }

    /// Closes the SFTP session and its transport
    ///
    /// Consumes the client, so a session is released at most once.
    pub async fn close(self) -> Result<(), SftpError> {
        self.fs.close().await.map_err(|err| {
            error!("Failed to close sftp session: {}", err);
            SftpError::Release(err)
        })?;
        info!("sftp session closed");
        Ok(())
    }
}
