//! Serial link abstraction.
//!
//! `RawPort` is the seam between the frame transport (`transport.rs`) and the
//! physical link, so the handshake state machine can be driven by a
//! deterministic mock in tests instead of real hardware. [`SerialLink`] is
//! the production implementation, wrapping the `serialport` crate.

use std::io::{Read, Write};
use std::time::Duration;

use crate::error::KktError;

/// 8N1, no hardware flow control, one read/write owner at a time.
pub trait RawPort {
    fn open(&mut self) -> Result<(), KktError>;
    fn close(&mut self);
    fn is_open(&self) -> bool;

    /// Reads up to `n` bytes, honoring the per-byte timeout configured at
    /// open time. Returns fewer than `n` bytes (possibly zero) on timeout;
    /// a short read is not an error, it's the protocol's way of signalling
    /// "nothing arrived in time."
    fn read(&mut self, n: usize) -> Result<Vec<u8>, KktError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), KktError>;
    fn flush(&mut self) -> Result<(), KktError>;
}

/// Production [`RawPort`] over a real RS-232 link via the `serialport` crate.
pub struct SerialLink {
    path: String,
    baud_rate: u32,
    read_timeout: Duration,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialLink {
    pub fn new(path: impl Into<String>, baud_rate: u32, read_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            read_timeout,
            port: None,
        }
    }
}

impl RawPort for SerialLink {
    fn open(&mut self) -> Result<(), KktError> {
        if self.port.is_some() {
            return Ok(());
        }
        let port = serialport::new(&self.path, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(self.read_timeout)
            .open()?;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        self.port = None;
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>, KktError> {
        let port = self.port.as_mut().ok_or(KktError::NoReply)?;
        let mut buf = vec![0u8; n];
        let mut total = 0;
        while total < n {
            match port.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(read) => total += read,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(KktError::Io(e)),
            }
        }
        buf.truncate(total);
        Ok(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), KktError> {
        let port = self.port.as_mut().ok_or(KktError::NoReply)?;
        port.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), KktError> {
        let port = self.port.as_mut().ok_or(KktError::NoReply)?;
        port.flush()?;
        Ok(())
    }
}
