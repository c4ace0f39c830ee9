//! Wire-level encoding primitives: width-parameterized signed little-endian
//! integers, money/count scaled-integer conversions, the LRC checksum, and
//! code-page text padding.
//!
//! The five-byte integer width is the one a native `i32`/`i64` can't express
//! directly, so every width here goes through the same sign-extension logic
//! rather than reusing `i32::to_le_bytes`/`i64::to_le_bytes` for the others.

use crate::error::KktError;

/// Packs `value` into exactly `width` little-endian bytes, sign-extended.
///
/// `width` is expected to be one of 2, 4, 5, 8 (the protocol never uses any
/// other integer width), but any width in `1..=8` works.
pub fn pack_int(value: i64, width: usize) -> Vec<u8> {
    debug_assert!((1..=8).contains(&width), "unsupported integer width {width}");
    let bytes = value.to_le_bytes();
    bytes[..width].to_vec()
}

/// Unpacks `width` little-endian bytes (sign-extended) into an `i64`.
///
/// Panics if `bytes.len() != width`; callers are expected to slice the exact
/// field width out of a response buffer before calling this.
pub fn unpack_int(bytes: &[u8], width: usize) -> i64 {
    assert_eq!(bytes.len(), width, "expected {width} bytes, got {}", bytes.len());
    let sign_byte = if bytes[width - 1] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut buf = [sign_byte; 8];
    buf[..width].copy_from_slice(bytes);
    i64::from_le_bytes(buf)
}

/// Packs a 5-byte signed little-endian integer (the protocol's distinctive
/// width, used for money and count fields).
pub fn pack_int5(value: i64) -> [u8; 5] {
    let v = pack_int(value, 5);
    v.try_into().expect("pack_int(_, 5) returns 5 bytes")
}

/// Unpacks a 5-byte signed little-endian integer.
pub fn unpack_int5(bytes: &[u8; 5]) -> i64 {
    unpack_int(bytes, 5)
}

/// Converts a decimal money value to its scaled integer wire representation:
/// `round(value * 10^digits)`. `digits` defaults to 2 in every caller that
/// doesn't pass it explicitly.
pub fn money_to_int(value: f64, digits: u32) -> i64 {
    (value * 10f64.powi(digits as i32)).round() as i64
}

/// Converts a scaled integer back to a decimal money value, rounded to
/// `digits` fractional digits.
pub fn int_to_money(value: i64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (value as f64 / scale * scale).round() / scale
}

/// Converts a decimal count value (3 implicit fractional digits) to its
/// scaled integer wire representation, with an optional per-unit coefficient.
pub fn count_to_int(value: f64, coefficient: i64) -> i64 {
    money_to_int(value, 3) * coefficient
}

/// XOR-reduces a byte sequence into a single LRC byte.
pub fn lrc(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Maps a sequence of small integers (each representing one tax-group digit)
/// one-for-one into raw bytes. This is a raw-byte mapping, not a
/// code-page/character mapping.
pub fn digits_to_bytes(digits: &[u8]) -> Vec<u8> {
    digits.to_vec()
}

/// A validated 4-element tax vector, each entry in `0..=4`.
pub fn validate_tax_vector(taxes: &[u8]) -> Result<[u8; 4], KktError> {
    if taxes.len() != 4 {
        return Err(KktError::InvalidArgument(format!(
            "tax vector must have exactly 4 elements, got {}",
            taxes.len()
        )));
    }
    if taxes.iter().any(|&t| t > 4) {
        return Err(KktError::InvalidArgument(format!(
            "tax vector entries must be in 0..=4, got {taxes:?}"
        )));
    }
    Ok([taxes[0], taxes[1], taxes[2], taxes[3]])
}

/// Validates a scaled monetary/quantity amount against the protocol's
/// `[0, 9_999_999_999]` range.
pub fn validate_amount(scaled: i64) -> Result<i64, KktError> {
    if !(0..=9_999_999_999).contains(&scaled) {
        return Err(KktError::InvalidArgument(format!(
            "amount {scaled} out of range [0, 9_999_999_999]"
        )));
    }
    Ok(scaled)
}

/// Validates a discount/surcharge percentage against `[-9999, 9999]`.
pub fn validate_discount(discount: i64) -> Result<i64, KktError> {
    if !(-9999..=9999).contains(&discount) {
        return Err(KktError::InvalidArgument(format!(
            "discount {discount} out of range [-9999, 9999]"
        )));
    }
    Ok(discount)
}

/// Validates a department number against `[0, 16]`.
pub fn validate_department(department: u8) -> Result<u8, KktError> {
    if department > 16 {
        return Err(KktError::InvalidArgument(format!(
            "department {department} out of range [0, 16]"
        )));
    }
    Ok(department)
}

/// Encodes a password argument into its 4-byte wire form: an integer in
/// `[0, 9999]` is packed little-endian; a 4-element byte sequence is used
/// verbatim.
#[derive(Debug, Clone, Copy)]
pub enum Password {
    Numeric(u16),
    Bytes([u8; 4]),
}

impl Password {
    pub fn numeric(value: u16) -> Result<Self, KktError> {
        if value > 9999 {
            return Err(KktError::InvalidArgument(format!(
                "password {value} out of range [0, 9999]"
            )));
        }
        Ok(Password::Numeric(value))
    }

    pub fn to_bytes(self) -> [u8; 4] {
        match self {
            Password::Numeric(v) => {
                let b = pack_int(v as i64, 4);
                [b[0], b[1], b[2], b[3]]
            }
            Password::Bytes(b) => b,
        }
    }
}

/// Encodes `text` as WIN1251, right-padded with byte `0x00` to exactly
/// [`crate::constants::TEXT_FIELD_LEN`] bytes. Rejects text whose WIN1251
/// encoding is longer than the field (40 bytes accepted verbatim, 41
/// rejected).
pub fn encode_text_field(text: &str) -> Result<[u8; crate::constants::TEXT_FIELD_LEN], KktError> {
    let (encoded, _, had_errors) = encoding_rs::WINDOWS_1251.encode(text);
    if had_errors {
        return Err(KktError::InvalidArgument(format!(
            "text {text:?} contains characters not representable in WIN1251"
        )));
    }
    if encoded.len() > crate::constants::TEXT_FIELD_LEN {
        return Err(KktError::InvalidArgument(format!(
            "text {text:?} encodes to {} bytes, exceeds the {}-byte field",
            encoded.len(),
            crate::constants::TEXT_FIELD_LEN
        )));
    }
    let mut field = [0u8; crate::constants::TEXT_FIELD_LEN];
    field[..encoded.len()].copy_from_slice(&encoded);
    Ok(field)
}
