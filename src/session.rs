use tracing::{debug, error, info};

use crate::client::SftpClient;
use crate::error::SftpError;
use crate::transport::{Dialer, SessionFactory};
use crate::types::ConnectionParams;

/// Establishes an SFTP session through the given capabilities
///
/// Dials `host:port` with password credentials, then negotiates the
/// file-transfer session on the resulting transport.
///
/// # Errors
///
/// Returns an error if:
/// - The dial or authentication fails (`SftpError::Dial`)
/// - The SFTP session cannot be negotiated (`SftpError::Session`)
///
/// The session factory is not invoked when the dial fails.
pub async fn connect<D, F>(
    params: &ConnectionParams,
    dialer: &D,
    sessions: &F,
) -> Result<SftpClient, SftpError>
where
    D: Dialer,
    F: SessionFactory<D::Transport>,
{
    let address = params.address();
    info!("Connecting to {:?}@{:?}", params.username, address);
    let transport = dialer
        .dial(&address, &params.auth())
        .await
        .map_err(|err| {
            error!("Failed to dial {:?}: {}", address, err);
            SftpError::Dial(err)
        })?;

    debug!("Creating sftp client from transport");
    let fs = sessions.new_session(transport).await.map_err(|err| {
        error!("Failed to start sftp session on {:?}: {}", address, err);
        SftpError::Session(err)
    })?;
    debug!("sftp client created successfully");
    Ok(SftpClient::new(fs))
}
