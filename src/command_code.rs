//! Named command codes, for logging and diagnostics.
//!
//! The command layer and transport both work in terms of raw `u8` command
//! bytes on the wire; this enum exists purely so log lines and error
//! messages can say `SaleGoods` instead of `0x80`. Unrecognized bytes (a
//! device extension, a corrupted frame) still round-trip through
//! `Unknown`, they're never a parse failure.

use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum CommandCode {
    #[strum(to_string = "XReport")]
    XReport = 0x40,
    #[strum(to_string = "ZReport")]
    ZReport = 0x41,
    #[strum(to_string = "Sale")]
    Sale = 0x80,
    #[strum(to_string = "Purchase")]
    Purchase = 0x81,
    #[strum(to_string = "ReturnSale")]
    ReturnSale = 0x82,
    #[strum(to_string = "ReturnPurchase")]
    ReturnPurchase = 0x83,
    #[strum(to_string = "Storno")]
    Storno = 0x84,
    #[strum(to_string = "CloseReceipt")]
    CloseReceipt = 0x85,
    #[strum(to_string = "Discount")]
    Discount = 0x86,
    #[strum(to_string = "Surcharge")]
    Surcharge = 0x87,
    #[strum(to_string = "CancelReceipt")]
    CancelReceipt = 0x88,
    #[strum(to_string = "Subtotal")]
    Subtotal = 0x89,
    #[strum(to_string = "DiscountStorno")]
    DiscountStorno = 0x8A,
    #[strum(to_string = "SurchargeStorno")]
    SurchargeStorno = 0x8B,
    #[strum(to_string = "Reprint")]
    Reprint = 0x8C,
    #[strum(to_string = "OpenReceipt")]
    OpenReceipt = 0x8D,
    #[strum(to_string = "ExtendedClose")]
    ExtendedClose = 0x8E,
    #[strum(to_string = "OpenShift")]
    OpenShift = 0xE0,
    #[strum(to_string = "DeviceIdentity")]
    DeviceIdentity = 0xFC,

    #[strum(to_string = "Unknown({0:#04x})")]
    #[num_enum(catch_all)]
    Unknown(u8),
}
