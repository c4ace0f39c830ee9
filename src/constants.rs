// Wire-level constants for the ENQ/ACK/NAK handshake and frame format.

use std::time::Duration;

/// Start-of-text marker that precedes every frame.
pub const STX: u8 = 0x02;
/// Enquiry byte used to probe the device before a request.
pub const ENQ: u8 = 0x05;
/// Positive acknowledgement.
pub const ACK: u8 = 0x06;
/// Negative acknowledgement.
pub const NAK: u8 = 0x15;

/// Error byte meaning "success".
pub const ERR_OK: u8 = 0x00;
/// Error byte meaning "device busy, retry after a backoff".
pub const ERR_BUSY: u8 = 0x50;

/// Upper bound on ENQ/send-loop retry rounds before giving up with a
/// connection error.
pub const MAX_ATTEMPT: u32 = 5;

/// Upper bound on ENQ rounds while waiting for a pending STX frame.
pub const STX_WAIT_ATTEMPTS: u32 = 10;

/// Base inter-byte guard interval.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(50);

/// Default per-byte serial read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(700);

/// Post-response guard sleep in non-quick mode: `2 * MIN_TIMEOUT`.
pub const GUARD_TIMEOUT: Duration = Duration::from_millis(100);

/// Backoff sleep after a busy (0x50) response: `10 * MIN_TIMEOUT`.
pub const BUSY_BACKOFF: Duration = Duration::from_millis(500);

/// Width in bytes of an encoded text field (WIN1251, null-padded).
pub const TEXT_FIELD_LEN: usize = 40;

/// Width in bytes of an encoded password field.
pub const PASSWORD_LEN: usize = 4;
