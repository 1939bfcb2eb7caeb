use bytes::Bytes;
use std::io;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::client::SftpClient;
use crate::error::SftpError;
use crate::transport::RemoteFile;

/// Uploads an in-memory buffer to the remote server
///
/// 1. Creates (or truncates) the remote file
/// 2. Writes the whole buffer in one call and flushes it
/// 3. Releases the remote file handle, whether or not the write succeeded
///
/// # Arguments
///
/// * `client` - The SFTP client instance
/// * `data` - Bytes to store in the remote file
/// * `remote_path` - Destination path on the remote server
///
/// # Errors
///
/// Returns an error if:
/// - The remote file cannot be created; nothing is written or released
/// - The write fails (`Write`, or `WriteAndClose` when releasing fails too)
/// - The data was written but releasing the handle fails (`Close`)
pub async fn put_bytes(
    client: &SftpClient,
    data: Bytes,
    remote_path: &str,
) -> Result<(), SftpError> {
    let upload_time = Instant::now();
    let mut remote_file = client.fs.create(remote_path).await.map_err(|err| {
        error!("Failed to create file: {:?} ERROR: {:?}", remote_path, err);
        SftpError::Create {
            path: remote_path.to_string(),
            source: err,
        }
    })?;
    info!("Remote file created path: {:?}", remote_path);

    let write_result = write_fully(&mut remote_file, &data).await;
    let close_result = remote_file.shutdown().await;

    let path = remote_path.to_string();
    match (write_result, close_result) {
        (Ok(()), Ok(())) => {
            info!(
                "{} bytes uploaded to {:?}. Time taken {:?}",
                data.len(),
                remote_path,
                upload_time.elapsed(),
            );
            Ok(())
        }
        (Err(write), Ok(())) => {
            error!("Error writing remote file {:?}: {:?}", remote_path, write);
            Err(SftpError::Write {
                path,
                source: write,
            })
        }
        (Ok(()), Err(close)) => {
            error!("Error closing remote file {:?}: {:?}", remote_path, close);
            Err(SftpError::Close {
                path,
                source: close,
            })
        }
        (Err(write), Err(close)) => {
            error!(
                "Error writing remote file {:?}: {:?}, close also failed: {:?}",
                remote_path, write, close
            );
            Err(SftpError::WriteAndClose { path, write, close })
        }
    }
}

/// Writes `data` and waits until the server has acknowledged every write
async fn write_fully(remote_file: &mut Box<dyn RemoteFile>, data: &[u8]) -> io::Result<()> {
    remote_file.write_all(data).await?;
    // russh-sftp only reports a rejected write when pending writes are drained
    remote_file.flush().await
}
