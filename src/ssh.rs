use std::future::Future;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{AuthResult, Handle};
use russh::keys::PublicKey;
use russh::keys::ssh_key::HashAlg;
use russh::Disconnect;
use russh_sftp::client::SftpSession;
use tracing::{debug, error, info};

use crate::error::BoxError;
use crate::transport::{Dialer, RemoteFile, RemoteFs, SessionFactory};
use crate::types::AuthConfig;

/// Client handler that accepts every server host key
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAnyHostKey;

impl russh::client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        debug!(
            "Skipping host key verification for {} key {}",
            server_public_key.algorithm(),
            server_public_key.fingerprint(HashAlg::Sha256)
        );
        async { Ok(true) }
    }
}

/// Dials over TCP with russh and authenticates with a password
#[derive(Clone)]
pub struct SshDialer {
    config: Arc<russh::client::Config>,
}

impl Default for SshDialer {
    fn default() -> Self {
        Self::with_config(russh::client::Config::default())
    }
}

impl SshDialer {
    /// Creates a dialer using the given russh client configuration
    pub fn with_config(config: russh::client::Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl Dialer for SshDialer {
    type Transport = Handle<AcceptAnyHostKey>;

    async fn dial(&self, address: &str, auth: &AuthConfig) -> Result<Self::Transport, BoxError> {
        let mut handle =
            russh::client::connect(self.config.clone(), address, AcceptAnyHostKey).await?;
        debug!("SSH handshake with {:?} completed", address);

        match handle
            .authenticate_password(auth.user.as_str(), auth.password.as_str())
            .await?
        {
            AuthResult::Success => {
                info!("Authenticated as {:?} on {:?}", auth.user, address);
                Ok(handle)
            }
            AuthResult::Failure {
                remaining_methods, ..
            } => {
                error!("Password authentication rejected for {:?}", auth.user);
                Err(format!(
                    "password authentication failed for {:?}, server suggests: {:?}",
                    auth.user, remaining_methods
                )
                .into())
            }
        }
    }
}

/// Starts the `sftp` subsystem on a russh session channel
#[derive(Debug, Default, Clone, Copy)]
pub struct SftpSubsystem;

#[async_trait]
impl SessionFactory<Handle<AcceptAnyHostKey>> for SftpSubsystem {
    async fn new_session(
        &self,
        transport: Handle<AcceptAnyHostKey>,
    ) -> Result<Box<dyn RemoteFs>, BoxError> {
        let channel = transport.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await?;
        debug!("sftp subsystem started");
        Ok(Box::new(RusshSftp {
            sftp,
            transport: Some(transport),
        }))
    }
}

/// SFTP session backed by russh-sftp; keeps its transport alive
struct RusshSftp {
    sftp: SftpSession,
    /// `None` when the session does not run over an SSH channel
    transport: Option<Handle<AcceptAnyHostKey>>,
}

#[async_trait]
impl RemoteFs for RusshSftp {
    async fn create(&self, path: &str) -> io::Result<Box<dyn RemoteFile>> {
        let file = self.sftp.create(path).await.map_err(io::Error::other)?;
        Ok(Box::new(file))
    }

    async fn close(&self) -> Result<(), BoxError> {
        self.sftp.close().await?;
        if let Some(transport) = &self.transport {
            transport
                .disconnect(Disconnect::ByApplication, "", "en")
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use parking_lot::Mutex;
    use russh_sftp::protocol::{
        FileAttributes, Handle as FileHandle, OpenFlags, Status, StatusCode, Version,
    };
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::client::SftpClient;
    use crate::error::SftpError;
    use crate::session;
    use crate::types::ConnectionParams;

    #[derive(Debug, Default)]
    struct Received {
        files: HashMap<String, Vec<u8>>,
        closes: usize,
    }

    /// sftp server that keeps written files in memory
    #[derive(Clone, Default)]
    struct FileServer {
        received: Arc<Mutex<Received>>,
        reject_write: bool,
        reject_close: bool,
    }

    fn ok_status(id: u32) -> Status {
        Status {
            id,
            status_code: StatusCode::Ok,
            error_message: "Ok".to_string(),
            language_tag: "en-US".to_string(),
        }
    }

    impl russh_sftp::server::Handler for FileServer {
        type Error = StatusCode;

        fn unimplemented(&self) -> Self::Error {
            StatusCode::OpUnsupported
        }

        async fn init(
            &mut self,
            _version: u32,
            _extensions: HashMap<String, String>,
        ) -> Result<Version, Self::Error> {
            Ok(Version::new())
        }

        async fn open(
            &mut self,
            id: u32,
            filename: String,
            _pflags: OpenFlags,
            _attrs: FileAttributes,
        ) -> Result<FileHandle, Self::Error> {
            self.received.lock().files.insert(filename.clone(), Vec::new());
            Ok(FileHandle {
                id,
                handle: filename,
            })
        }

        async fn write(
            &mut self,
            id: u32,
            handle: String,
            offset: u64,
            data: Vec<u8>,
        ) -> Result<Status, Self::Error> {
            if self.reject_write {
                return Err(StatusCode::Failure);
            }
            let mut received = self.received.lock();
            let file = received.files.entry(handle).or_default();
            let start = offset as usize;
            if file.len() < start + data.len() {
                file.resize(start + data.len(), 0);
            }
            file[start..start + data.len()].copy_from_slice(&data);
            Ok(ok_status(id))
        }

        async fn close(&mut self, id: u32, _handle: String) -> Result<Status, Self::Error> {
            self.received.lock().closes += 1;
            if self.reject_close {
                return Err(StatusCode::Failure);
            }
            Ok(ok_status(id))
        }
    }

    async fn client_for(server: &FileServer) -> SftpClient {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        russh_sftp::server::run(server_io, server.clone()).await;
        let sftp = assert_ok!(SftpSession::new(client_io).await);
        SftpClient::new(Box::new(RusshSftp {
            sftp,
            transport: None,
        }))
    }

    #[tokio::test]
    async fn server_receives_exact_bytes_and_one_close() {
        let server = FileServer::default();
        let client = client_for(&server).await;

        assert_ok!(client.upload(b"hello world".as_slice(), "remote/path").await);

        let received = server.received.lock();
        assert_eq!(
            received.files.get("remote/path").map(Vec::as_slice),
            Some(b"hello world".as_slice())
        );
        assert_eq!(received.closes, 1);
    }

    #[tokio::test]
    async fn rejected_write_is_a_write_error() {
        let server = FileServer {
            reject_write: true,
            ..Default::default()
        };
        let client = client_for(&server).await;

        let err = assert_err!(client.upload(b"hello world".as_slice(), "remote/path").await);

        assert!(matches!(err, SftpError::Write { .. }), "got {err:?}");
        assert!(err.write_error().is_some());
        assert_eq!(server.received.lock().closes, 1);
    }

    #[tokio::test]
    async fn rejected_close_is_a_close_error() {
        let server = FileServer {
            reject_close: true,
            ..Default::default()
        };
        let client = client_for(&server).await;

        let err = assert_err!(client.upload(b"hello world".as_slice(), "remote/path").await);

        assert!(matches!(err, SftpError::Close { .. }), "got {err:?}");
        assert_eq!(
            server.received.lock().files.get("remote/path").map(Vec::as_slice),
            Some(b"hello world".as_slice())
        );
    }

    #[tokio::test]
    async fn refused_connection_is_a_dial_error() {
        let auth = ConnectionParams::new("tester", "password", "127.0.0.1", 1).auth();
        let dialed = SshDialer::default().dial("127.0.0.1:1", &auth).await;
        assert!(dialed.is_err());

        let params = ConnectionParams::new("tester", "password", "127.0.0.1", 1);
        let err = assert_err!(
            session::connect(&params, &SshDialer::default(), &SftpSubsystem).await
        );
        assert!(matches!(err, SftpError::Dial(_)), "got {err:?}");
    }
}
