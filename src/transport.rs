//! The frame transport: ENQ/ACK/NAK handshake, request framing, response
//! parsing, and the retry/busy-backoff loop. `ask()` is the single public
//! operation; everything else in this module exists to serve it.
//!
//! The handshake is driven by bounded, explicit loops (`MAX_ATTEMPT`,
//! `STX_WAIT_ATTEMPTS`) rather than recursion, with a `drain` flag threaded
//! through instead of a recursive call stack.

use std::thread::sleep;

use crate::codec;
use crate::command_code::CommandCode;
use crate::constants::*;
use crate::error::KktError;
use crate::serial::RawPort;

/// How to build the parameter bytes of an outgoing request.
pub enum Params {
    /// Prefix with the session's operator password, no further bytes.
    OperatorPassword,
    /// Use exactly these bytes (already includes any password prefix the
    /// caller wants, e.g. the administrator password for report commands).
    Explicit(Vec<u8>),
    /// No parameters at all (used by `identify()`, which takes no password).
    WithoutPassword,
}

/// A decoded response: `(command, error, data)`. `data` is a [`bytes::Bytes`]
/// rather than a `Vec<u8>` since it's a read-only view handed onward to the
/// command layer's decoders, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub command: u8,
    pub error: u8,
    pub data: bytes::Bytes,
}

/// Builds `STX | LEN | CMD | PARAMS | LRC`.
pub fn build_frame(command: u8, params: &[u8]) -> Vec<u8> {
    let len = 1 + params.len();
    debug_assert!(len <= u8::MAX as usize, "command+params too long to frame");
    let mut body = Vec::with_capacity(1 + 1 + params.len());
    body.push(len as u8);
    body.push(command);
    body.extend_from_slice(params);
    let checksum = codec::lrc(&body);

    let mut frame = Vec::with_capacity(1 + body.len() + 1);
    frame.push(STX);
    frame.extend_from_slice(&body);
    frame.push(checksum);
    frame
}

/// Outcome of reading a response body: either a decoded frame, or a signal
/// that the host should NAK and have the caller resend the request.
enum BodyOutcome {
    Frame(ResponseFrame),
    NeedsResend,
}

pub struct Transport<P: RawPort> {
    port: P,
    operator_password: [u8; 4],
}

impl<P: RawPort> Transport<P> {
    pub fn new(port: P, operator_password: [u8; 4]) -> Self {
        Self {
            port,
            operator_password,
        }
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn operator_password_bytes(&self) -> [u8; 4] {
        self.operator_password
    }

    fn resolve_params(&self, params: Params) -> Vec<u8> {
        match params {
            Params::OperatorPassword => self.operator_password.to_vec(),
            Params::Explicit(bytes) => bytes,
            Params::WithoutPassword => Vec::new(),
        }
    }

    /// Reads one byte, retrying once after `MIN_TIMEOUT` if the first read
    /// times out. `None` means both reads timed out.
    fn read_one_with_retry(&mut self) -> Result<Option<u8>, KktError> {
        let first = self.port.read(1)?;
        if let Some(&byte) = first.first() {
            return Ok(Some(byte));
        }
        sleep(MIN_TIMEOUT);
        let second = self.port.read(1)?;
        Ok(second.first().copied())
    }

    /// One ENQ round: write ENQ, read the reply (with one retry), and
    /// drive the bounded "still finishing a previous transmission" retry
    /// loop for any reply byte that is neither ACK nor NAK. `drain` controls
    /// whether an ACK reply causes the pending STX frame to be read and
    /// discarded (pre-flight cleanup and mid-send resync both drain; there
    /// is no path that needs to keep the pending frame around without
    /// immediately consuming it).
    fn enq_handshake(&mut self, drain: bool) -> Result<(), KktError> {
        for attempt in 0..STX_WAIT_ATTEMPTS {
            self.port.write(&[ENQ])?;
            match self.read_one_with_retry()? {
                None => {
                    tracing::debug!("ENQ got no reply, link appears dead");
                    return Err(KktError::NoReply);
                }
                Some(NAK) => return Ok(()),
                Some(ACK) => {
                    if drain {
                        tracing::debug!("ENQ found a pending response, draining it");
                        self.read_pending_body(true)?;
                    }
                    return Ok(());
                }
                Some(other) => {
                    tracing::debug!(byte = other, attempt, "device still busy, retrying ENQ");
                    sleep(MIN_TIMEOUT);
                }
            }
        }
        Err(KktError::RetriesExhausted {
            attempts: STX_WAIT_ATTEMPTS,
        })
    }

    /// Waits for the device's STX byte, tolerating noise for up to
    /// `STX_WAIT_ATTEMPTS` rounds spaced `2*MIN_TIMEOUT` apart.
    fn wait_stx(&mut self) -> Result<(), KktError> {
        for attempt in 0..STX_WAIT_ATTEMPTS {
            let byte = self.port.read(1)?;
            if byte.first() == Some(&STX) {
                return Ok(());
            }
            tracing::debug!(attempt, "waiting for STX");
            sleep(2 * MIN_TIMEOUT);
        }
        Err(KktError::RetriesExhausted {
            attempts: STX_WAIT_ATTEMPTS,
        })
    }

    /// Waits for the pending frame's STX, then reads `LEN | CMD | ERROR |
    /// DATA | LRC` for a pending/cleanup drain: reads and discards the body,
    /// ACKs it, and does not decode or validate anything beyond the read
    /// itself.
    fn read_pending_body(&mut self, is_cleanup: bool) -> Result<(), KktError> {
        debug_assert!(is_cleanup);
        self.wait_stx()?;
        let len_byte = self.port.read(1)?;
        let len = match len_byte.first() {
            Some(&l) => l as usize,
            None => return Err(KktError::NoReply),
        };
        let _body = self.port.read(len)?;
        let _lrc = self.port.read(1)?;
        self.port.write(&[ACK])?;
        Ok(())
    }

    /// Reads and validates a real response frame (STX already consumed by
    /// `wait_stx`).
    fn read_response_body(&mut self, command_sent: u8, quick: bool) -> Result<BodyOutcome, KktError> {
        let len_byte = self.port.read(1)?;
        let len = match len_byte.first() {
            Some(&l) => l as usize,
            None => return Err(KktError::NoReply),
        };
        let body = self.port.read(len)?;
        if body.len() != len {
            tracing::info!(expected = len, got = body.len(), "short response body, NAKing");
            self.port.write(&[NAK])?;
            return Ok(BodyOutcome::NeedsResend);
        }
        let lrc_recv = self.port.read(1)?;
        let lrc_recv = match lrc_recv.first() {
            Some(&b) => b,
            None => return Err(KktError::NoReply),
        };

        let command_resp = body[0];
        if command_resp != command_sent {
            return Err(KktError::CommandMismatch {
                expected: command_sent,
                got: command_resp,
            });
        }
        let error = body[1];
        let data = bytes::Bytes::copy_from_slice(&body[2..]);

        let mut for_lrc = vec![len as u8];
        for_lrc.extend_from_slice(&body);
        let lrc_calc = codec::lrc(&for_lrc);
        if lrc_calc != lrc_recv {
            tracing::info!(lrc_calc, lrc_recv, "LRC mismatch, NAKing");
            self.port.write(&[NAK])?;
            return Ok(BodyOutcome::NeedsResend);
        }

        self.port.write(&[ACK])?;
        if !quick {
            self.port.flush()?;
            sleep(GUARD_TIMEOUT);
        }
        Ok(BodyOutcome::Frame(ResponseFrame {
            command: command_resp,
            error,
            data,
        }))
    }

    /// Waits for STX then reads and validates the response body, retrying
    /// internally on short reads / LRC mismatches up to `MAX_ATTEMPT` times
    /// (each retry re-waits for STX, since a NAK tells the device to resend
    /// its response frame).
    fn read_response_frame(&mut self, command_sent: u8, quick: bool) -> Result<ResponseFrame, KktError> {
        for _ in 0..MAX_ATTEMPT {
            self.wait_stx()?;
            match self.read_response_body(command_sent, quick)? {
                BodyOutcome::Frame(frame) => return Ok(frame),
                BodyOutcome::NeedsResend => continue,
            }
        }
        Err(KktError::RetriesExhausted { attempts: MAX_ATTEMPT })
    }

    /// The single public transport operation: frames `command`/`params`,
    /// drives the handshake and send loop, and returns the decoded
    /// response. Busy (`0x50`) responses are retried internally and never
    /// surfaced to the caller.
    pub fn ask(&mut self, command: u8, params: Params, quick: bool) -> Result<ResponseFrame, KktError> {
        tracing::debug!(command = %CommandCode::from(command), quick, "starting exchange");

        self.port.open()?;

        // Pre-flight cleanup: drain anything the device still holds from an
        // earlier aborted exchange.
        self.enq_handshake(true)?;

        let param_bytes = self.resolve_params(params);
        let frame = build_frame(command, &param_bytes);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            if attempt > MAX_ATTEMPT {
                // Best-effort resync; the exhausted-attempts error is what
                // actually gets surfaced regardless of whether this succeeds.
                let _ = self.enq_handshake(true);
                return Err(KktError::RetriesExhausted { attempts: MAX_ATTEMPT });
            }

            self.port.write(&frame)?;
            self.port.flush()?;

            match self.read_one_with_retry()? {
                None => {
                    tracing::debug!(attempt, "no ACK after send, restarting ENQ handshake");
                    self.enq_handshake(true)?;
                    continue;
                }
                Some(ACK) => {
                    let response = self.read_response_frame(command, quick)?;
                    if response.error == ERR_BUSY {
                        tracing::debug!(attempt, "device busy, backing off");
                        sleep(BUSY_BACKOFF);
                        continue;
                    }
                    if !quick {
                        self.port.close();
                    }
                    return Ok(response);
                }
                Some(other) => {
                    tracing::debug!(byte = other, attempt, "unexpected reply while sending, retrying");
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_invariants_hold() {
        let frame = build_frame(0x80, &[1, 2, 3, 4]);
        assert_eq!(frame[0], STX);
        assert_eq!(frame[1] as usize, frame.len() - 3);
        let body = &frame[1..frame.len() - 1];
        assert_eq!(frame[frame.len() - 1], codec::lrc(body));
    }

    #[test]
    fn frame_len_counts_cmd_and_params_only() {
        let frame = build_frame(0xFC, &[]);
        // STX, LEN=1 (cmd only), CMD, LRC
        assert_eq!(frame.len(), 4);
        assert_eq!(frame[1], 1);
    }

    /// Minimal scripted `RawPort` for this module's own round-trip test;
    /// the shared mock used by the black-box integration tests lives under
    /// `tests/common` and isn't reachable from unit tests here.
    struct ScriptedPort {
        reads: std::collections::VecDeque<Vec<u8>>,
    }

    impl RawPort for ScriptedPort {
        fn open(&mut self) -> Result<(), KktError> {
            Ok(())
        }
        fn close(&mut self) {}
        fn is_open(&self) -> bool {
            true
        }
        fn read(&mut self, n: usize) -> Result<Vec<u8>, KktError> {
            let chunk = self.reads.pop_front().unwrap_or_default();
            assert!(chunk.len() <= n);
            Ok(chunk)
        }
        fn write(&mut self, _bytes: &[u8]) -> Result<(), KktError> {
            Ok(())
        }
        fn flush(&mut self) -> Result<(), KktError> {
            Ok(())
        }
    }

    /// Round-trip law: framing `(cmd, params)` as a request, then decoding
    /// the same bytes back as a response stream with `error = 0` and
    /// `data = params`, yields `params` back unchanged.
    #[test]
    fn request_params_round_trip_through_response_decoding() {
        let command = 0x80u8;
        let params = vec![1u8, 2, 3, 4, 5, 6, 7];

        // A response carrying `params` back as DATA, with error = 0.
        let mut body = vec![command, 0x00];
        body.extend_from_slice(&params);
        let len = body.len() as u8;
        let mut for_lrc = vec![len];
        for_lrc.extend_from_slice(&body);
        let lrc = codec::lrc(&for_lrc);

        let mut reads = std::collections::VecDeque::new();
        reads.push_back(vec![NAK]); // pre-flight cleanup: idle
        reads.push_back(vec![ACK]); // ACK for our request
        reads.push_back(vec![STX]);
        reads.push_back(vec![len]);
        reads.push_back(body);
        reads.push_back(vec![lrc]);

        let mut transport = Transport::new(ScriptedPort { reads }, [0, 0, 0, 0]);
        let response = transport
            .ask(command, Params::Explicit(params.clone()), true)
            .expect("round trip exchange should succeed");

        assert_eq!(response.command, command);
        assert_eq!(response.error, 0);
        assert_eq!(response.data, params);
    }
}
