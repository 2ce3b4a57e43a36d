//! Error types for actuator link operations.
//!
//! Errors are structured by category. Each category wraps a private kind
//! enum and exposes `is_*` helpers, so callers can branch on the failure
//! without the kinds becoming part of the public API. With the `std`
//! feature enabled, every structured error captures a backtrace.
//!
//! Failures that happen on the wire map onto a small numeric taxonomy
//! ([`ErrorCode`]) shared with the drive firmware tooling. Failures that
//! happen before anything is sent (a malformed register string, a value
//! that does not fit in 32 bits) are construction failures and carry no
//! code.

use core::fmt;

#[cfg(feature = "std")]
use std::backtrace::Backtrace;

/// Result type alias for link operations.
pub type Result<T> = core::result::Result<T, RtuError>;

// =============================================================================
// Error Kind Enums (Internal)
// =============================================================================

/// Frame construction error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum EncodeErrorKind {
    InvalidRegisterHex,
    RegisterOutOfRange,
    ValueOutOfRange,
}

/// Response validation error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum ResponseErrorKind {
    Truncated,
    InvalidChecksum,
}

/// Transport error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum TransportErrorKind {
    NotOpen,
    OpenFailed,
    WriteFailed,
    ShortWrite,
    ReadFailed,
    ConfigurationFailed,
    Unsupported,
}

// =============================================================================
// Error Codes
// =============================================================================

/// Numeric classification of a failed transaction.
///
/// The discriminants are the values the drive tooling reports, so they can
/// be logged or forwarded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ErrorCode {
    /// The serial layer failed during I/O.
    CommunicationError = 1,
    /// The response bytes did not decode to the expected numeric form.
    ValueError = 2,
    /// The response was too short to index the expected fields.
    IndexError = 3,
    /// No bytes arrived inside the read window.
    Timeout = 4,
}

impl ErrorCode {
    /// Raw numeric value of the code.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Convert a raw numeric value back into a code.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::CommunicationError),
            2 => Some(Self::ValueError),
            3 => Some(Self::IndexError),
            4 => Some(Self::Timeout),
            _ => None,
        }
    }
}

impl From<ErrorCode> for u8 {
    #[inline]
    fn from(code: ErrorCode) -> u8 {
        code.as_u8()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::CommunicationError => "communication error",
            ErrorCode::ValueError => "value error",
            ErrorCode::IndexError => "index error",
            ErrorCode::Timeout => "timeout",
        };
        write!(f, "{} ({})", name, self.as_u8())
    }
}

// =============================================================================
// Main Error Type
// =============================================================================

/// Actuator link error types.
///
/// This is the error returned by every fallible operation in the crate.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtuError {
    /// The request could not be built (bad register string, bad value)
    Encode(EncodeError),
    /// The response frame failed validation
    Response(ResponseError),
    /// The transport failed (port closed, I/O error, short write)
    Transport(TransportError),
    /// No bytes were returned inside the read window
    Timeout,
}

// =============================================================================
// Structured Error Types
// =============================================================================

/// Frame construction error with optional backtrace
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodeError {
    kind: EncodeErrorKind,
    #[cfg(feature = "std")]
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    backtrace: Backtrace,
}

impl EncodeError {
    pub(crate) fn new(kind: EncodeErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if the register string was not valid hexadecimal
    pub fn is_invalid_register_hex(&self) -> bool {
        matches!(self.kind, EncodeErrorKind::InvalidRegisterHex)
    }

    /// Check if the register value does not fit in 16 bits
    pub fn is_register_out_of_range(&self) -> bool {
        matches!(self.kind, EncodeErrorKind::RegisterOutOfRange)
    }

    /// Check if the payload value does not fit in 32 bits
    pub fn is_value_out_of_range(&self) -> bool {
        matches!(self.kind, EncodeErrorKind::ValueOutOfRange)
    }
}

/// Response validation error with optional backtrace
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseError {
    kind: ResponseErrorKind,
    #[cfg(feature = "std")]
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    backtrace: Backtrace,
}

impl ResponseError {
    pub(crate) fn new(kind: ResponseErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if the response was shorter than a full frame
    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, ResponseErrorKind::Truncated)
    }

    /// Check if the response CRC did not match its contents
    pub fn is_invalid_checksum(&self) -> bool {
        matches!(self.kind, ResponseErrorKind::InvalidChecksum)
    }
}

/// Transport error with optional backtrace
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportError {
    kind: TransportErrorKind,
    #[cfg(feature = "std")]
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    backtrace: Backtrace,
}

impl TransportError {
    pub(crate) fn new(kind: TransportErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if the port was used before being opened
    pub fn is_not_open(&self) -> bool {
        matches!(self.kind, TransportErrorKind::NotOpen)
    }

    /// Check if opening the port failed
    pub fn is_open_failed(&self) -> bool {
        matches!(self.kind, TransportErrorKind::OpenFailed)
    }

    /// Check if fewer bytes than the full frame were written
    pub fn is_short_write(&self) -> bool {
        matches!(self.kind, TransportErrorKind::ShortWrite)
    }

    /// Check if the transport does not support the requested operation
    pub fn is_unsupported(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Unsupported)
    }
}

// =============================================================================
// Convenience Constructors for RtuError
// =============================================================================

impl RtuError {
    // Encode errors
    pub(crate) fn invalid_register_hex() -> Self {
        Self::Encode(EncodeError::new(EncodeErrorKind::InvalidRegisterHex))
    }

    pub(crate) fn register_out_of_range() -> Self {
        Self::Encode(EncodeError::new(EncodeErrorKind::RegisterOutOfRange))
    }

    pub(crate) fn value_out_of_range() -> Self {
        Self::Encode(EncodeError::new(EncodeErrorKind::ValueOutOfRange))
    }

    // Response errors
    pub(crate) fn truncated_response() -> Self {
        Self::Response(ResponseError::new(ResponseErrorKind::Truncated))
    }

    pub(crate) fn invalid_checksum() -> Self {
        Self::Response(ResponseError::new(ResponseErrorKind::InvalidChecksum))
    }

    // Transport errors
    pub(crate) fn not_open() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::NotOpen))
    }

    #[cfg_attr(not(feature = "serial"), expect(dead_code, reason = "only the serial transport opens ports"))]
    pub(crate) fn open_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::OpenFailed))
    }

    pub(crate) fn write_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::WriteFailed))
    }

    pub(crate) fn short_write() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::ShortWrite))
    }

    pub(crate) fn read_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::ReadFailed))
    }

    #[cfg_attr(not(feature = "serial"), expect(dead_code, reason = "only the serial transport reconfigures ports"))]
    pub(crate) fn configuration_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::ConfigurationFailed))
    }

    pub(crate) fn unsupported_operation() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::Unsupported))
    }

    /// Classify this error into the numeric taxonomy.
    ///
    /// Returns `None` for construction failures, which happen before any
    /// byte reaches the wire.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            RtuError::Encode(_) => None,
            RtuError::Transport(_) => Some(ErrorCode::CommunicationError),
            RtuError::Response(e) => match e.kind {
                ResponseErrorKind::Truncated => Some(ErrorCode::IndexError),
                ResponseErrorKind::InvalidChecksum => Some(ErrorCode::ValueError),
            },
            RtuError::Timeout => Some(ErrorCode::Timeout),
        }
    }

    /// Check if this error is a read-window timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, RtuError::Timeout)
    }

    /// Check if this error happened while building the request
    pub fn is_construction_failure(&self) -> bool {
        matches!(self, RtuError::Encode(_))
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

impl fmt::Display for RtuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtuError::Encode(e) => write!(f, "Encode error: {:?}", e.kind),
            RtuError::Response(e) => write!(f, "Response error: {:?}", e.kind),
            RtuError::Transport(e) => write!(f, "Transport error: {:?}", e.kind),
            RtuError::Timeout => write!(f, "Read timeout"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RtuError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_drive_convention() {
        assert_eq!(ErrorCode::CommunicationError.as_u8(), 1);
        assert_eq!(ErrorCode::ValueError.as_u8(), 2);
        assert_eq!(ErrorCode::IndexError.as_u8(), 3);
        assert_eq!(ErrorCode::Timeout.as_u8(), 4);
        assert_eq!(ErrorCode::from_u8(3), Some(ErrorCode::IndexError));
        assert_eq!(ErrorCode::from_u8(0), None);
        assert_eq!(ErrorCode::from_u8(5), None);
    }

    #[test]
    fn test_classification() {
        assert_eq!(RtuError::Timeout.code(), Some(ErrorCode::Timeout));
        assert_eq!(RtuError::read_failed().code(), Some(ErrorCode::CommunicationError));
        assert_eq!(RtuError::not_open().code(), Some(ErrorCode::CommunicationError));
        assert_eq!(RtuError::truncated_response().code(), Some(ErrorCode::IndexError));
        assert_eq!(RtuError::invalid_checksum().code(), Some(ErrorCode::ValueError));
        assert_eq!(RtuError::invalid_register_hex().code(), None);
        assert!(RtuError::value_out_of_range().is_construction_failure());
    }

    #[test]
    fn test_kind_helpers() {
        match RtuError::register_out_of_range() {
            RtuError::Encode(e) => {
                assert!(e.is_register_out_of_range());
                assert!(!e.is_invalid_register_hex());
            }
            other => panic!("unexpected error: {other}"),
        }

        match RtuError::short_write() {
            RtuError::Transport(e) => assert!(e.is_short_write()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RtuError::Timeout), "Read timeout");
        assert_eq!(
            format!("{}", RtuError::truncated_response()),
            "Response error: Truncated"
        );
        assert_eq!(format!("{}", ErrorCode::Timeout), "timeout (4)");
    }
}
