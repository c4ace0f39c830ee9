//! End-to-end: the device still holds a response from an earlier, aborted
//! exchange. The pre-flight cleanup ENQ drains and ACKs it before the new
//! exchange proceeds normally.

mod common;

use common::*;
use kkt_rs::codec::Password;
use kkt_rs::commands::Session;

#[test]
fn stale_pending_frame_is_drained_before_the_fresh_exchange() {
    let mut port = MockPort::new();

    // Pre-flight cleanup ENQ: device replies ACK, meaning it still holds a
    // response from an earlier exchange. We read and discard it.
    port.push_read([0x06]); // ACK
    port.push_reads(response_chunks(0x01, 0x00, &[])); // stale frame, discarded

    // Now the normal exchange proceeds: device ACKs our fresh request...
    port.push_read([0x06]);
    // ...and replies with its own DATA, no password, per identify().
    let mut identity_data = vec![1u8, 2, 3, 4, 5, 6];
    identity_data.extend_from_slice(b"ABC");
    port.push_reads(response_chunks(0xFC, 0x00, &identity_data));

    let mut session = Session::new(port, Password::Numeric(0), Password::Numeric(30));
    let identity = session.identify().expect("identify should succeed after draining the stale frame");

    assert_eq!(identity.device_type, 1);
    assert_eq!(identity.device_subtype, 2);
    assert_eq!(identity.protocol_version, 3);
    assert_eq!(identity.protocol_subversion, 4);
    assert_eq!(identity.model, 5);
    assert_eq!(identity.language, 6);
    assert_eq!(identity.name, "ABC");

    let port = std::mem::replace(session.transport_mut().port_mut(), MockPort::new());
    let request = request_frame(0xFC, &[]);
    let mut expected_writes = vec![0x05]; // cleanup ENQ
    expected_writes.push(0x06); // ACK draining the stale frame
    expected_writes.extend_from_slice(&request);
    expected_writes.push(0x06); // ACK for the fresh response
    assert_eq!(port.writes, expected_writes);
}
