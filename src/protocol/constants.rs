//! Wire-level constants: frame layout and function codes.

/// Every frame on the link, in either direction, is exactly this long.
pub const FRAME_SIZE: usize = 10;

/// Number of bytes covered by the checksum (everything before it).
pub const CHECKSUM_SPAN: usize = 8;

// =============================================================================
// Field Offsets
// =============================================================================

/// Device id (1 byte)
pub const OFFSET_DEVICE_ID: usize = 0;
/// Function code (1 byte)
pub const OFFSET_FUNCTION: usize = 1;
/// Register address (2 bytes, big-endian)
pub const OFFSET_REGISTER: usize = 2;
/// Data payload (4 bytes, big-endian)
pub const OFFSET_PAYLOAD: usize = 4;
/// CRC16 (2 bytes, big-endian)
pub const OFFSET_CRC: usize = 8;

/// Payload width in bytes.
pub const PAYLOAD_SIZE: usize = 4;

/// Payload of every read request.
///
/// Asks the drive for a standard-length answer; it is a bus convention,
/// not a data value.
pub const READ_LENGTH_INDICATOR: u32 = 0x0000_0002;

// =============================================================================
// Function Codes
// =============================================================================

/// Function code constant for a register read (0x03)
pub const FUNCTION_READ: u8 = 0x03;
/// Function code constant for a register write (0x06)
pub const FUNCTION_WRITE: u8 = 0x06;

/// Request function understood by the drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FunctionCode {
    /// Read a 32-bit register value
    Read = FUNCTION_READ,
    /// Write a 32-bit register value
    Write = FUNCTION_WRITE,
}

impl FunctionCode {
    /// Convert a raw byte to `FunctionCode`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            FUNCTION_READ => Some(Self::Read),
            FUNCTION_WRITE => Some(Self::Write),
            _ => None,
        }
    }

    /// Convert `FunctionCode` to its raw byte
    #[inline(always)]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_contiguous() {
        assert_eq!(OFFSET_FUNCTION, OFFSET_DEVICE_ID + 1);
        assert_eq!(OFFSET_REGISTER, OFFSET_FUNCTION + 1);
        assert_eq!(OFFSET_PAYLOAD, OFFSET_REGISTER + 2);
        assert_eq!(OFFSET_CRC, OFFSET_PAYLOAD + PAYLOAD_SIZE);
        assert_eq!(OFFSET_CRC, CHECKSUM_SPAN);
        assert_eq!(FRAME_SIZE, OFFSET_CRC + 2);
    }

    #[test]
    fn test_function_codes() {
        assert_eq!(FunctionCode::Read.to_u8(), 3);
        assert_eq!(FunctionCode::Write.to_u8(), 6);
        assert_eq!(FunctionCode::from_u8(3), Some(FunctionCode::Read));
        assert_eq!(FunctionCode::from_u8(6), Some(FunctionCode::Write));
        assert_eq!(FunctionCode::from_u8(0x83), None);
        assert_eq!(FunctionCode::from_u8(0x10), None);
    }
}
