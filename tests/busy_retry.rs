//! End-to-end: a device-busy (0x50) response triggers an internal backoff
//! and resend, invisible to the caller.

mod common;

use common::*;
use kkt_rs::codec::Password;
use kkt_rs::commands::Session;

#[test]
fn busy_response_is_retried_transparently() {
    let mut port = MockPort::new();

    port.push_read([0x15]); // pre-flight cleanup ENQ: NAK, device idle

    // First attempt: ACK, then a response frame reporting busy.
    port.push_read([0x06]);
    port.push_reads(response_chunks(0xE0, 0x50, &[]));

    // Second attempt, after the busy backoff: ACK, then success with operator=3.
    port.push_read([0x06]);
    port.push_reads(response_chunks(0xE0, 0x00, &[3]));

    let mut session = Session::new(port, Password::Numeric(0), Password::Numeric(30));
    let operator = session.open_shift().expect("open_shift should eventually succeed");

    assert_eq!(operator, 3);

    let port = std::mem::replace(session.transport_mut().port_mut(), MockPort::new());
    let request = request_frame(0xE0, &[0, 0, 0, 0]);

    // The exact same request frame is written twice: once per send-loop
    // attempt. Each successfully-parsed response is ACKed once.
    let mut expected_writes = vec![0x05];
    expected_writes.extend_from_slice(&request);
    expected_writes.push(0x06);
    expected_writes.extend_from_slice(&request);
    expected_writes.push(0x06);
    assert_eq!(port.writes, expected_writes);
}
