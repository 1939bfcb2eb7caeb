//! In-memory stand-in for a remote SFTP session.
//!
//! `MemoryFs` keeps files in a map, counts every create and release, and can
//! be told to fail a given step. Clones share state, so a test can hand one
//! clone to an [`SftpClient`](crate::SftpClient) and inspect another.

use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncWrite;

use crate::error::BoxError;
use crate::transport::{RemoteFile, RemoteFs};

/// Step of an upload that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Create,
    Write,
    Close,
    /// Releasing the whole session
    Release,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<String, Vec<u8>>,
    faults: HashMap<FailPoint, String>,
    created: usize,
    writes: usize,
    released: usize,
    session_closes: usize,
}

impl State {
    fn fault(&self, point: FailPoint) -> Option<io::Error> {
        self.faults
            .get(&point)
            .map(|message| io::Error::other(message.clone()))
    }
}

/// In-memory file-transfer session
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    state: Arc<Mutex<State>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call at `point` fail with `message`
    pub fn fail_on(&self, point: FailPoint, message: impl Into<String>) {
        self.state.lock().faults.insert(point, message.into());
    }

    /// Contents of the file at `path`, if it was ever created
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    /// Number of remote file handles handed out
    pub fn files_created(&self) -> usize {
        self.state.lock().created
    }

    /// Number of `poll_write` calls that reached a handle
    pub fn write_calls(&self) -> usize {
        self.state.lock().writes
    }

    /// Number of release attempts on remote file handles, failed ones included
    pub fn handles_released(&self) -> usize {
        self.state.lock().released
    }

    /// Number of times the session itself was closed
    pub fn session_closes(&self) -> usize {
        self.state.lock().session_closes
    }
}

#[async_trait]
impl RemoteFs for MemoryFs {
    async fn create(&self, path: &str) -> io::Result<Box<dyn RemoteFile>> {
        let mut state = self.state.lock();
        if let Some(err) = state.fault(FailPoint::Create) {
            return Err(err);
        }
        state.created += 1;
        state.files.insert(path.to_string(), Vec::new());
        Ok(Box::new(MemoryFile {
            path: path.to_string(),
            state: self.state.clone(),
        }))
    }

    async fn close(&self) -> Result<(), BoxError> {
        let mut state = self.state.lock();
        state.session_closes += 1;
        match state.fault(FailPoint::Release) {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// Handle to one file inside a `MemoryFs`
struct MemoryFile {
    path: String,
    state: Arc<Mutex<State>>,
}

impl AsyncWrite for MemoryFile {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let mut state = this.state.lock();
        state.writes += 1;
        if let Some(err) = state.fault(FailPoint::Write) {
            return Poll::Ready(Err(err));
        }
        state
            .files
            .entry(this.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut state = self.state.lock();
        state.released += 1;
        match state.fault(FailPoint::Close) {
            Some(err) => Poll::Ready(Err(err)),
            None => Poll::Ready(Ok(())),
        }
    }
}
