use std::io;
use thiserror::Error;

/// The primary error type for `kkt-rs`.
///
/// Every fallible operation returns one of these two broad kinds: a
/// [`KktError::Connection`]-flavoured variant (the link is unusable, the
/// session must be reconnected) or a [`KktError::Device`]-flavoured variant
/// (the exchange completed, the device rejected it, the session is still
/// good). Argument-validation failures are surfaced as device errors too,
/// since they never touch the wire.
#[derive(Error, Debug)]
pub enum KktError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no reply from device (ENQ timed out)")]
    NoReply,

    #[error("device did not respond within {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("response command byte {got:#04x} does not match request command byte {expected:#04x}")]
    CommandMismatch { expected: u8, got: u8 },

    #[error("LRC mismatch after exhausting retries")]
    LrcExhausted,

    #[error("device reported error {code:#04x} ({source_subsystem}): {message}")]
    Device {
        code: u8,
        source_subsystem: &'static str,
        message: &'static str,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl KktError {
    /// True for errors that invalidate the session ("connection errors": the
    /// link is unusable and the caller must reconnect).
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            KktError::Serial(_)
                | KktError::Io(_)
                | KktError::NoReply
                | KktError::RetriesExhausted { .. }
                | KktError::CommandMismatch { .. }
                | KktError::LrcExhausted
        )
    }
}
