//! Shared test utilities: a scripted mock `RawPort` and response-frame
//! builders, used across the integration tests exercising the transport
//! state machine end-to-end.

#![allow(dead_code)]

use std::collections::VecDeque;

use kkt_rs::codec;
use kkt_rs::error::KktError;
use kkt_rs::serial::RawPort;

/// A scripted, deterministic stand-in for a real serial port.
///
/// Reads are served from a queue of pre-scripted chunks, one chunk per
/// `read()` call regardless of the requested length (tests script chunks
/// that match exactly what the transport asks for at each step). An empty
/// queue yields an empty read, which `RawPort` defines as a timeout.
///
/// Every byte written is appended to `writes`, so a test can assert the
/// full, byte-exact write history at the end.
pub struct MockPort {
    reads: VecDeque<Vec<u8>>,
    pub writes: Vec<u8>,
    open: bool,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            reads: VecDeque::new(),
            writes: Vec::new(),
            open: false,
        }
    }

    /// Queues one scripted `read()` reply.
    pub fn push_read(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.reads.push_back(bytes.into());
        self
    }

    /// Queues several scripted `read()` replies in order.
    pub fn push_reads<I, B>(&mut self, chunks: I) -> &mut Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        for chunk in chunks {
            self.push_read(chunk);
        }
        self
    }

    /// Queues a device-side timeout (an empty read reply).
    pub fn push_timeout(&mut self) -> &mut Self {
        self.push_read(Vec::new())
    }
}

impl Default for MockPort {
    fn default() -> Self {
        Self::new()
    }
}

impl RawPort for MockPort {
    fn open(&mut self) -> Result<(), KktError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>, KktError> {
        let chunk = self.reads.pop_front().unwrap_or_default();
        assert!(
            chunk.len() <= n,
            "scripted read chunk ({} bytes) is longer than the requested {n} bytes",
            chunk.len()
        );
        Ok(chunk)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), KktError> {
        self.writes.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), KktError> {
        Ok(())
    }
}

/// Builds a complete device response frame `STX | LEN | CMD | ERROR | DATA | LRC`
/// and splits it into the four chunks the transport reads one at a time:
/// `[STX]`, `[LEN]`, `CMD|ERROR|DATA`, `[LRC]`.
pub fn response_chunks(command: u8, error: u8, data: &[u8]) -> [Vec<u8>; 4] {
    let mut body = vec![command, error];
    body.extend_from_slice(data);
    let len = body.len() as u8;

    let mut for_lrc = vec![len];
    for_lrc.extend_from_slice(&body);
    let lrc = codec::lrc(&for_lrc);

    [vec![kkt_rs::constants::STX], vec![len], body, vec![lrc]]
}

/// Like [`response_chunks`] but flips the low bit of the LRC byte, producing
/// a frame that fails checksum verification.
pub fn response_chunks_bad_lrc(command: u8, error: u8, data: &[u8]) -> [Vec<u8>; 4] {
    let mut chunks = response_chunks(command, error, data);
    chunks[3][0] ^= 0x01;
    chunks
}

/// Builds the exact outgoing request frame bytes a [`kkt_rs::Session`] should
/// produce for `command`/`params`, for asserting byte-exact write history.
pub fn request_frame(command: u8, params: &[u8]) -> Vec<u8> {
    kkt_rs::transport::build_frame(command, params)
}
