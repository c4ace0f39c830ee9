//! End-to-end: the device never replies to ENQ. The transport must fail
//! with a connection error and must not write anything beyond the ENQ
//! bytes it already sent.

mod common;

use common::*;
use kkt_rs::codec::Password;
use kkt_rs::commands::Session;
use kkt_rs::error::KktError;

#[test]
fn unresponsive_device_yields_connection_error() {
    let mut port = MockPort::new();
    // `read_one_with_retry` tries twice before giving up; both time out.
    port.push_timeout();
    port.push_timeout();

    let mut session = Session::new(port, Password::Numeric(0), Password::Numeric(30));
    let err = session.open_shift().expect_err("a dead link must surface a connection error");

    assert!(matches!(err, KktError::NoReply));
    assert!(err.is_connection_error());

    let port = std::mem::replace(session.transport_mut().port_mut(), MockPort::new());
    // Exactly one ENQ was written; no framed request follows a dead probe.
    assert_eq!(port.writes, vec![0x05]);
}
