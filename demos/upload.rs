// demos/upload.rs
// Run with: cargo run --example upload [connection.json]
//
// connection.json:
//   {"username": "tester", "password": "password", "host": "127.0.0.1", "port": 22}

use anyhow::Context;
use sftp_uploader::{Bytes, ConnectionParams, SftpClient, SftpError};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let params = match std::env::args().nth(1) {
        Some(path) => ConnectionParams::from_json_file(path)?,
        None => ConnectionParams::new("tester", "password", "127.0.0.1", 22),
    };

    let client = SftpClient::connect(&params)
        .await
        .context("Error connecting to SFTP server")?;

    // Example data to upload
    let file_data = Bytes::from_static(b"This is a test file content.");
    let upload_result = client.upload(file_data, "test.txt").await;
    let close_result = client.close().await;
    report(upload_result, close_result)?;

    println!("File uploaded successfully");

    Ok(())
}

/// Upload failure takes precedence; a close failure after it is logged
fn report(
    upload_result: Result<(), SftpError>,
    close_result: Result<(), SftpError>,
) -> Result<(), anyhow::Error> {
    match (upload_result, close_result) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(upload), Ok(())) => Err(upload).context("Error uploading file"),
        (Ok(()), Err(close)) => Err(close).context("Error closing SFTP session"),
        (Err(upload), Err(close)) => {
            tracing::error!("Error closing SFTP session: {}", close);
            Err(upload).context("Error uploading file")
        }
    }
}
