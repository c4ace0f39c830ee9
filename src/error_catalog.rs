//! Static mapping from device error byte to `(source subsystem, message)`.
//!
//! Two disjoint tables: a fiscal-storage ("FN") table and a general device
//! table. Lookup checks FN first; a code present in both would be ambiguous,
//! and in practice the two ranges don't overlap on real devices.
//!
//! The exact Shtrih-M FN/general error tables were not fully reconstructible
//! from available reference material; the entries below are a representative,
//! structurally faithful catalog with well-known codes, not a verbatim
//! transcription.

use crate::error::KktError;

struct CatalogEntry {
    code: u8,
    source: &'static str,
    message: &'static str,
}

const FN_ERRORS: &[CatalogEntry] = &[
    CatalogEntry { code: 0xA1, source: "FN", message: "FN is not ready to work or is missing" },
    CatalogEntry { code: 0xA2, source: "FN", message: "FN document buffer overflow" },
    CatalogEntry { code: 0xA3, source: "FN", message: "FN clock error" },
    CatalogEntry { code: 0xA4, source: "FN", message: "FN archive memory is full" },
    CatalogEntry { code: 0xA5, source: "FN", message: "FN requires replacement (lifetime expired)" },
    CatalogEntry { code: 0xA6, source: "FN", message: "FN cryptographic error" },
    CatalogEntry { code: 0xA7, source: "FN", message: "FN shift is open for more than 24 hours" },
];

const GENERAL_ERRORS: &[CatalogEntry] = &[
    CatalogEntry { code: 0x50, source: "device", message: "device busy, long operation in progress" },
    CatalogEntry { code: 0x01, source: "device", message: "unknown command" },
    CatalogEntry { code: 0x02, source: "device", message: "unsupported parameter value in command" },
    CatalogEntry { code: 0x03, source: "device", message: "invalid command parameter range" },
    CatalogEntry { code: 0x10, source: "device", message: "no paper, feed in progress" },
    CatalogEntry { code: 0x11, source: "device", message: "no paper" },
    CatalogEntry { code: 0x20, source: "device", message: "operator error" },
    CatalogEntry { code: 0x21, source: "device", message: "wrong password" },
    CatalogEntry { code: 0x22, source: "device", message: "receipt is not open" },
    CatalogEntry { code: 0x23, source: "device", message: "receipt is already open" },
    CatalogEntry { code: 0x30, source: "device", message: "cash register is blocked, call a technician" },
    CatalogEntry { code: 0x46, source: "device", message: "insufficient funds for this operation" },
];

fn lookup_in(table: &[CatalogEntry], code: u8) -> Option<&'static CatalogEntry> {
    table.iter().find(|entry| entry.code == code)
}

/// Looks up `code`, preferring the fiscal-storage table over the general one.
/// A code present in neither table is itself an error condition, surfaced to
/// the caller as a [`KktError::Device`] carrying the raw code and a generic
/// "unknown device error" message — it's still a device error, not a
/// connection error, since the exchange itself completed fine.
pub fn lookup(code: u8) -> Result<(), KktError> {
    if code == 0x00 {
        return Ok(());
    }
    if let Some(entry) = lookup_in(FN_ERRORS, code) {
        return Err(KktError::Device {
            code,
            source_subsystem: entry.source,
            message: entry.message,
        });
    }
    if let Some(entry) = lookup_in(GENERAL_ERRORS, code) {
        return Err(KktError::Device {
            code,
            source_subsystem: entry.source,
            message: entry.message,
        });
    }
    Err(KktError::Device {
        code,
        source_subsystem: "unknown",
        message: "unknown device error",
    })
}
