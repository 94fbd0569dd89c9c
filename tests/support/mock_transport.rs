// ABOUTME: Scripted in-memory transport for executor and client tests.
// ABOUTME: Replays queued responses and records every call it receives.

use async_trait::async_trait;
use parking_lot::Mutex;
use remote_exec::SessionConfig;
use remote_exec::transport::{RawOutput, Transport, TransportError};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Session handle handed out by [`MockTransport`].
#[derive(Debug)]
pub struct MockSession {
    pub id: usize,
}

/// Transport that replays scripted results.
///
/// Unscripted `open`, `upload` and `download` calls succeed. An unscripted
/// `execute` fails with a network error, so a test that scripts nothing
/// observes a host that never answers.
#[derive(Default)]
pub struct MockTransport {
    opens: Mutex<VecDeque<Result<(), TransportError>>>,
    executions: Mutex<VecDeque<Result<RawOutput, TransportError>>>,
    transfers: Mutex<VecDeque<Result<(), TransportError>>>,
    next_session: AtomicUsize,
    closed: AtomicUsize,
    pub commands: Mutex<Vec<(usize, String, bool)>>,
    pub uploads: Mutex<Vec<(PathBuf, String, bool)>>,
    pub downloads: Mutex<Vec<(String, PathBuf)>>,
    pub opened_for: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_fails(self, err: TransportError) -> Self {
        self.opens.lock().push_back(Err(err));
        self
    }

    pub fn exits(self, status: i32, stdout: &str, stderr: &str) -> Self {
        self.executions
            .lock()
            .push_back(Ok(RawOutput::exited(status, stdout, stderr)));
        self
    }

    pub fn outputs(self, output: RawOutput) -> Self {
        self.executions.lock().push_back(Ok(output));
        self
    }

    pub fn exec_fails(self, err: TransportError) -> Self {
        self.executions.lock().push_back(Err(err));
        self
    }

    pub fn transfer_fails(self, err: TransportError) -> Self {
        self.transfers.lock().push_back(Err(err));
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.next_session.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<String> {
        self.commands.lock().iter().map(|(_, c, _)| c.clone()).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Session = MockSession;

    async fn open(&self, config: &SessionConfig) -> Result<MockSession, TransportError> {
        self.opened_for.lock().push(config.target());
        if let Some(Err(e)) = self.opens.lock().pop_front() {
            return Err(e);
        }
        let id = self.next_session.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession { id })
    }

    async fn execute(
        &self,
        session: &MockSession,
        command: &str,
        quiet: bool,
    ) -> Result<RawOutput, TransportError> {
        self.commands
            .lock()
            .push((session.id, command.to_string(), quiet));
        self.executions
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("host unreachable".into())))
    }

    async fn upload(
        &self,
        _session: &MockSession,
        local_path: &Path,
        remote_path: &str,
        preserve_mode: bool,
    ) -> Result<(), TransportError> {
        self.uploads
            .lock()
            .push((local_path.to_path_buf(), remote_path.to_string(), preserve_mode));
        self.transfers.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn download(
        &self,
        _session: &MockSession,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<(), TransportError> {
        self.downloads
            .lock()
            .push((remote_path.to_string(), local_path.to_path_buf()));
        self.transfers.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn close(&self, _session: MockSession) -> Result<(), TransportError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
