//! Register addresses.
//!
//! Drive registers are addressed with 16 bits and written by operators in
//! hexadecimal, usually without padding (`"1a"`, `"2d"`, `"10"`). The
//! string is treated as if left-padded to four digits, so `"1"` and
//! `"0001"` name the same register. On the wire the address occupies two
//! bytes, high byte first.

use crate::error::{Result, RtuError};
use core::fmt;

/// A 16-bit drive register address.
///
/// # Examples
///
/// ```
/// use actuator_rtu::RegisterAddress;
///
/// let reg: RegisterAddress = "1a".parse().unwrap();
/// assert_eq!(reg.raw(), 0x001A);
/// assert_eq!(reg.to_bytes(), [0x00, 0x1A]);
/// assert_eq!(reg.to_string(), "001A");
///
/// // Prefixes and padding are accepted
/// assert_eq!(RegisterAddress::parse_hex("0x001A").unwrap(), reg);
///
/// // Anything wider than 16 bits is rejected up front
/// assert!(RegisterAddress::parse_hex("10000").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterAddress {
    raw: u16,
}

impl RegisterAddress {
    /// Size of the address on the wire.
    pub const SIZE: usize = 2;

    /// Create from a raw 16-bit value.
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// Parse an operator-supplied hex string.
    ///
    /// Accepts an optional `0x`/`0X` prefix followed by one or more hex
    /// digits. Leading zeros beyond four digits are tolerated as long as the
    /// value fits in 16 bits.
    ///
    /// # Errors
    ///
    /// - invalid register hex if the string is empty or has a non-hex digit
    /// - register out of range if the value exceeds `0xFFFF`
    pub fn parse_hex(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        // from_str_radix alone would accept a leading sign
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RtuError::invalid_register_hex());
        }

        u16::from_str_radix(digits, 16)
            .ok()
            .map(Self::new)
            .ok_or_else(RtuError::register_out_of_range)
    }

    /// Raw 16-bit value.
    #[inline(always)]
    pub const fn raw(self) -> u16 {
        self.raw
    }

    /// High byte (frame offset 2).
    #[inline(always)]
    pub const fn high(self) -> u8 {
        (self.raw >> 8) as u8
    }

    /// Low byte (frame offset 3).
    #[inline(always)]
    pub const fn low(self) -> u8 {
        (self.raw & 0xFF) as u8
    }

    /// Big-endian wire representation.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 2] {
        self.raw.to_be_bytes()
    }

    /// Decode from the two big-endian wire bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self::new(u16::from_be_bytes(bytes))
    }

    /// Zero-padded four digit hex string, as operators write it.
    pub fn to_hex_string(self) -> heapless::String<4> {
        use core::fmt::Write;
        let mut s = heapless::String::new();
        // Four hex digits always fit the buffer
        let _ = write!(s, "{:04X}", self.raw);
        s
    }
}

impl From<u16> for RegisterAddress {
    #[inline]
    fn from(raw: u16) -> Self {
        Self::new(raw)
    }
}

impl From<RegisterAddress> for u16 {
    #[inline]
    fn from(addr: RegisterAddress) -> u16 {
        addr.raw
    }
}

impl core::str::FromStr for RegisterAddress {
    type Err = RtuError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_hex(s)
    }
}

impl fmt::Display for RegisterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.raw)
    }
}
