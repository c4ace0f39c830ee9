//! The command layer: typed, validated wrappers over [`Transport::ask`],
//! one per command code. Each command builds its parameter bytes with
//! [`crate::codec`], validates arguments once, and decodes the returned
//! data bytes into a small result type.

use crate::codec::{self, Password};
use crate::error::KktError;
use crate::error_catalog;
use crate::serial::RawPort;
use crate::transport::{Params, Transport};

/// Immutable session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout: std::time::Duration,
    pub operator_password: Password,
    pub admin_password: Password,
}

impl SessionConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            read_timeout: crate::constants::DEFAULT_READ_TIMEOUT,
            operator_password: Password::Numeric(0),
            admin_password: Password::Numeric(30),
        }
    }

    pub fn operator_password(mut self, password: Password) -> Self {
        self.operator_password = password;
        self
    }

    pub fn admin_password(mut self, password: Password) -> Self {
        self.admin_password = password;
        self
    }
}

/// A single exchange's worth of arguments for the 0x80–0x84 sale family.
pub struct SaleArgs<'a> {
    pub count: f64,
    pub price: f64,
    pub department: u8,
    pub taxes: [u8; 4],
    pub text: &'a str,
}

pub struct SaleResult {
    pub operator: u8,
}

/// Arguments for 0x85 (close receipt).
pub struct CloseReceiptArgs<'a> {
    pub summs: [f64; 4],
    pub discount: f64,
    pub taxes: [u8; 4],
    pub text: &'a str,
}

pub struct CloseReceiptResult {
    pub operator: u8,
    pub change: f64,
}

/// Arguments for the 0x86/0x87/0x8A/0x8B discount/surcharge family.
pub struct DiscountArgs<'a> {
    pub summa: f64,
    pub taxes: [u8; 4],
    pub text: &'a str,
}

pub struct DiscountResult {
    pub operator: u8,
}

/// Arguments for 0x8E (extended close, 16 payment methods).
pub struct ExtendedCloseArgs<'a> {
    pub summs: [f64; 16],
    pub discount_percent: f64,
    pub taxes: [u8; 4],
    pub text: &'a str,
}

pub struct DeviceIdentity {
    pub device_type: u8,
    pub device_subtype: u8,
    pub protocol_version: u8,
    pub protocol_subversion: u8,
    pub model: u8,
    pub language: u8,
    pub name: String,
}

/// A KKT session bound to one serial port. Not safe for concurrent use;
/// one session drives at most one in-flight exchange at a time, enforced
/// by `&mut self` on every command.
pub struct Session<P: RawPort> {
    transport: Transport<P>,
    admin_password: [u8; 4],
}

impl<P: RawPort> Session<P> {
    /// Builds a session from an already-constructed port and the session's
    /// passwords. Production callers go through [`Session::connect`];
    /// tests construct a `Session::new` directly over a mock `RawPort`.
    pub fn new(port: P, operator_password: Password, admin_password: Password) -> Self {
        Self {
            transport: Transport::new(port, operator_password.to_bytes()),
            admin_password: admin_password.to_bytes(),
        }
    }

    /// Direct access to the underlying transport, mainly useful for tests
    /// that need to inspect or swap out the mock port underneath it.
    pub fn transport_mut(&mut self) -> &mut Transport<P> {
        &mut self.transport
    }

    fn tax_params(taxes: [u8; 4]) -> Result<[u8; 4], KktError> {
        codec::validate_tax_vector(&taxes)
    }

    fn check_error(response_error: u8) -> Result<(), KktError> {
        error_catalog::lookup(response_error)
    }

    /// 0x40: daily X report (no shift reset). Returns the operator number.
    pub fn x_report(&mut self) -> Result<u8, KktError> {
        let mut params = Vec::with_capacity(4);
        params.extend_from_slice(&self.admin_password);
        let resp = self.transport.ask(0x40, Params::Explicit(params), false)?;
        Self::check_error(resp.error)?;
        Ok(resp.data.first().copied().unwrap_or(0))
    }

    /// 0x41: daily Z report (closes shift, resets counters).
    pub fn z_report(&mut self) -> Result<u8, KktError> {
        let mut params = Vec::with_capacity(4);
        params.extend_from_slice(&self.admin_password);
        let resp = self.transport.ask(0x41, Params::Explicit(params), false)?;
        Self::check_error(resp.error)?;
        Ok(resp.data.first().copied().unwrap_or(0))
    }

    /// Shared helper for the 0x80–0x84 family: sale, purchase, return-sale,
    /// return-purchase, storno. They differ only in command byte.
    fn sale_family(&mut self, command: u8, args: SaleArgs<'_>) -> Result<SaleResult, KktError> {
        let count = codec::validate_amount(codec::count_to_int(args.count, 1))?;
        let price = codec::validate_amount(codec::money_to_int(args.price, 2))?;
        let department = codec::validate_department(args.department)?;
        let taxes = Self::tax_params(args.taxes)?;
        let text = codec::encode_text_field(args.text)?;

        let mut params = Vec::with_capacity(4 + 5 + 5 + 1 + 4 + 40);
        params.extend_from_slice(&self.transport.operator_password_bytes());
        params.extend_from_slice(&codec::pack_int5(count));
        params.extend_from_slice(&codec::pack_int5(price));
        params.push(department);
        params.extend_from_slice(&codec::digits_to_bytes(&taxes));
        params.extend_from_slice(&text);

        let resp = self.transport.ask(command, Params::Explicit(params), true)?;
        Self::check_error(resp.error)?;
        Ok(SaleResult {
            operator: resp.data.first().copied().unwrap_or(0),
        })
    }

    pub fn sale(&mut self, args: SaleArgs<'_>) -> Result<SaleResult, KktError> {
        self.sale_family(0x80, args)
    }

    pub fn purchase(&mut self, args: SaleArgs<'_>) -> Result<SaleResult, KktError> {
        self.sale_family(0x81, args)
    }

    pub fn return_sale(&mut self, args: SaleArgs<'_>) -> Result<SaleResult, KktError> {
        self.sale_family(0x82, args)
    }

    pub fn return_purchase(&mut self, args: SaleArgs<'_>) -> Result<SaleResult, KktError> {
        self.sale_family(0x83, args)
    }

    pub fn storno(&mut self, args: SaleArgs<'_>) -> Result<SaleResult, KktError> {
        self.sale_family(0x84, args)
    }

    /// 0x85: close receipt with up to four payment methods.
    pub fn close_receipt(&mut self, args: CloseReceiptArgs<'_>) -> Result<CloseReceiptResult, KktError> {
        let mut summs = [0i64; 4];
        for (i, s) in args.summs.iter().enumerate() {
            summs[i] = codec::validate_amount(codec::money_to_int(*s, 2))?;
        }
        let discount = codec::validate_discount(codec::money_to_int(args.discount, 2))?;
        let taxes = Self::tax_params(args.taxes)?;
        let text = codec::encode_text_field(args.text)?;

        let mut params = Vec::with_capacity(4 + 5 * 4 + 2 + 4 + 40);
        params.extend_from_slice(&self.transport.operator_password_bytes());
        for s in summs {
            params.extend_from_slice(&codec::pack_int5(s));
        }
        params.extend_from_slice(&codec::pack_int(discount, 2));
        params.extend_from_slice(&codec::digits_to_bytes(&taxes));
        params.extend_from_slice(&text);

        let resp = self.transport.ask(0x85, Params::Explicit(params), false)?;
        Self::check_error(resp.error)?;
        let operator = resp.data.first().copied().unwrap_or(0);
        let change_bytes: [u8; 5] = resp
            .data
            .get(1..6)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| KktError::InvalidArgument("short 0x85 response data".into()))?;
        let change = codec::int_to_money(codec::unpack_int5(&change_bytes), 2);
        Ok(CloseReceiptResult { operator, change })
    }

    /// Shared helper for 0x86/0x87/0x8A/0x8B (discount/surcharge and their
    /// storno variants).
    fn discount_family(&mut self, command: u8, args: DiscountArgs<'_>) -> Result<DiscountResult, KktError> {
        let summa = codec::validate_amount(codec::money_to_int(args.summa, 2))?;
        let taxes = Self::tax_params(args.taxes)?;
        let text = codec::encode_text_field(args.text)?;

        let mut params = Vec::with_capacity(4 + 5 + 4 + 40);
        params.extend_from_slice(&self.transport.operator_password_bytes());
        params.extend_from_slice(&codec::pack_int5(summa));
        params.extend_from_slice(&codec::digits_to_bytes(&taxes));
        params.extend_from_slice(&text);

        let resp = self.transport.ask(command, Params::Explicit(params), true)?;
        Self::check_error(resp.error)?;
        Ok(DiscountResult {
            operator: resp.data.first().copied().unwrap_or(0),
        })
    }

    pub fn discount(&mut self, args: DiscountArgs<'_>) -> Result<DiscountResult, KktError> {
        self.discount_family(0x86, args)
    }

    pub fn surcharge(&mut self, args: DiscountArgs<'_>) -> Result<DiscountResult, KktError> {
        self.discount_family(0x87, args)
    }

    pub fn discount_storno(&mut self, args: DiscountArgs<'_>) -> Result<DiscountResult, KktError> {
        self.discount_family(0x8A, args)
    }

    pub fn surcharge_storno(&mut self, args: DiscountArgs<'_>) -> Result<DiscountResult, KktError> {
        self.discount_family(0x8B, args)
    }

    /// 0x88: cancel receipt.
    pub fn cancel_receipt(&mut self) -> Result<u8, KktError> {
        self.operator_only(0x88, false)
    }

    /// 0x89: receipt subtotal.
    pub fn subtotal(&mut self) -> Result<u8, KktError> {
        self.operator_only(0x89, false)
    }

    /// 0x8C: reprint last document.
    pub fn reprint(&mut self) -> Result<u8, KktError> {
        self.operator_only(0x8C, false)
    }

    fn operator_only(&mut self, command: u8, quick: bool) -> Result<u8, KktError> {
        let resp = self.transport.ask(command, Params::OperatorPassword, quick)?;
        Self::check_error(resp.error)?;
        Ok(resp.data.first().copied().unwrap_or(0))
    }

    /// 0x8D: open receipt. `document_type` must be in `0..=3`.
    pub fn open_receipt(&mut self, document_type: u8) -> Result<u8, KktError> {
        if document_type > 3 {
            return Err(KktError::InvalidArgument(format!(
                "document type {document_type} out of range [0, 3]"
            )));
        }
        let mut params = Vec::with_capacity(5);
        params.extend_from_slice(&self.transport.operator_password_bytes());
        params.push(document_type);
        let resp = self.transport.ask(0x8D, Params::Explicit(params), false)?;
        Self::check_error(resp.error)?;
        Ok(resp.data.first().copied().unwrap_or(0))
    }

    /// 0x8E: extended close with up to 16 payment methods. Returns the
    /// change due; its response carries an operator byte first, same as
    /// 0x85, but this call only reports the change that follows it.
    pub fn extended_close(&mut self, args: ExtendedCloseArgs<'_>) -> Result<f64, KktError> {
        let mut summs = [0i64; 16];
        for (i, s) in args.summs.iter().enumerate() {
            summs[i] = codec::validate_amount(codec::money_to_int(*s, 2))?;
        }
        let discount = codec::validate_discount(codec::money_to_int(args.discount_percent, 2))?;
        let taxes = Self::tax_params(args.taxes)?;
        let text = codec::encode_text_field(args.text)?;

        let mut params = Vec::with_capacity(4 + 5 * 16 + 2 + 4 + 40);
        params.extend_from_slice(&self.transport.operator_password_bytes());
        for s in summs {
            params.extend_from_slice(&codec::pack_int5(s));
        }
        params.extend_from_slice(&codec::pack_int(discount, 2));
        params.extend_from_slice(&codec::digits_to_bytes(&taxes));
        params.extend_from_slice(&text);

        let resp = self.transport.ask(0x8E, Params::Explicit(params), false)?;
        Self::check_error(resp.error)?;
        let change_bytes: [u8; 5] = resp
            .data
            .get(1..6)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| KktError::InvalidArgument("short 0x8E response data".into()))?;
        Ok(codec::int_to_money(codec::unpack_int5(&change_bytes), 2))
    }

    /// 0xE0: open shift.
    pub fn open_shift(&mut self) -> Result<u8, KktError> {
        self.operator_only(0xE0, false)
    }

    /// 0xFC: device identity. Takes no password.
    pub fn identify(&mut self) -> Result<DeviceIdentity, KktError> {
        let resp = self.transport.ask(0xFC, Params::WithoutPassword, false)?;
        Self::check_error(resp.error)?;
        let data = &resp.data;
        if data.len() < 6 {
            return Err(KktError::InvalidArgument("short 0xFC response data".into()));
        }
        let (name, _, had_errors) = encoding_rs::WINDOWS_1251.decode(&data[6..]);
        if had_errors {
            return Err(KktError::InvalidArgument("0xFC device name is not valid WIN1251".into()));
        }
        Ok(DeviceIdentity {
            device_type: data[0],
            device_subtype: data[1],
            protocol_version: data[2],
            protocol_subversion: data[3],
            model: data[4],
            language: data[5],
            name: name.trim_end_matches('\u{0}').to_string(),
        })
    }
}

impl Session<crate::serial::SerialLink> {
    /// Builds a session over a real RS-232 port per `config`. The serial
    /// handle itself is opened lazily on the first exchange; this
    /// constructor only records the configuration.
    pub fn connect(config: &SessionConfig) -> Self {
        let port = crate::serial::SerialLink::new(&config.port, config.baud_rate, config.read_timeout);
        Session::new(port, config.operator_password, config.admin_password)
    }
}
