//! Frame encoding and decoding.
//!
//! Requests and responses share one fixed 10-byte layout:
//!
//! ```text
//! ┌──────────┬──────────┬──────────────┬──────────────────────┬──────────────┐
//! │ Device   │ Function │  Register    │      Payload         │   CRC16      │
//! │ (1 byte) │ (1 byte) │  (2 bytes)   │     (4 bytes)        │  (2 bytes)   │
//! └──────────┴──────────┴──────────────┴──────────────────────┴──────────────┘
//!    0          1          2..4           4..8                    8..10
//! ```
//!
//! All multi-byte fields are big-endian, the CRC included. The CRC covers
//! bytes `0..8` and is always written last.
//!
//! ## Example
//!
//! ```
//! use actuator_rtu::protocol::frame::Frame;
//! use actuator_rtu::RegisterAddress;
//!
//! let frame = Frame::write_request(1, RegisterAddress::new(0x10), -1);
//! assert_eq!(&frame.as_bytes()[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
//! assert!(frame.has_valid_crc());
//!
//! let decoded = Frame::parse(frame.as_bytes()).unwrap();
//! assert_eq!(decoded.value(), -1);
//! ```

use crate::crc::crc16;
use crate::error::{Result, RtuError};
use crate::protocol::constants::{
    FunctionCode, CHECKSUM_SPAN, FRAME_SIZE, OFFSET_CRC, OFFSET_DEVICE_ID, OFFSET_FUNCTION,
    OFFSET_PAYLOAD, OFFSET_REGISTER, PAYLOAD_SIZE, READ_LENGTH_INDICATOR,
};
use crate::register::RegisterAddress;
use core::fmt;

// =============================================================================
// Payload
// =============================================================================

/// The 32-bit data field of a frame.
///
/// Writes carry a signed goal value; negative values travel as their 32-bit
/// two's complement, so `-100` and `2^32 - 100` produce the same bytes.
/// Reads reinterpret the received pattern as signed.
///
/// # Examples
///
/// ```
/// use actuator_rtu::protocol::frame::Payload;
///
/// assert_eq!(Payload::from(-100).to_be_bytes(), Payload::from(u32::MAX - 99).to_be_bytes());
/// assert_eq!(Payload::from(10).to_be_bytes(), [0x00, 0x00, 0x00, 0x0A]);
/// assert!(Payload::try_from(1i64 << 32).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payload {
    raw: u32,
}

impl Payload {
    /// Payload of every read request.
    pub const READ_REQUEST: Self = Self::from_u32(READ_LENGTH_INDICATOR);

    /// From a signed value (two's complement).
    #[inline]
    pub const fn from_i32(value: i32) -> Self {
        Self { raw: value as u32 }
    }

    /// From an unsigned bit pattern.
    #[inline]
    pub const fn from_u32(raw: u32) -> Self {
        Self { raw }
    }

    /// The pattern read as a signed value.
    #[inline(always)]
    pub const fn as_i32(self) -> i32 {
        self.raw as i32
    }

    /// The raw bit pattern.
    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.raw
    }

    /// Wire bytes, most significant first.
    #[inline]
    pub const fn to_be_bytes(self) -> [u8; PAYLOAD_SIZE] {
        self.raw.to_be_bytes()
    }

    /// Decode from wire bytes.
    #[inline]
    pub const fn from_be_bytes(bytes: [u8; PAYLOAD_SIZE]) -> Self {
        Self::from_u32(u32::from_be_bytes(bytes))
    }
}

impl From<i32> for Payload {
    #[inline]
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl From<u32> for Payload {
    #[inline]
    fn from(raw: u32) -> Self {
        Self::from_u32(raw)
    }
}

impl TryFrom<i64> for Payload {
    type Error = RtuError;

    /// Accepts anything representable in 32 bits, signed or unsigned.
    fn try_from(value: i64) -> Result<Self> {
        if let Ok(v) = i32::try_from(value) {
            return Ok(Self::from_i32(v));
        }
        u32::try_from(value)
            .ok()
            .map(Self::from_u32)
            .ok_or_else(RtuError::value_out_of_range)
    }
}

// =============================================================================
// Frame
// =============================================================================

/// One 10-byte frame, request or response.
///
/// Constructors that build requests always finalize the CRC, so a frame
/// built here is well-formed by construction. Frames decoded from the wire
/// go through [`Frame::parse`], which rejects short input and bad CRCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    bytes: [u8; FRAME_SIZE],
}

impl Frame {
    /// Size of a frame in bytes
    pub const SIZE: usize = FRAME_SIZE;

    /// Build a read request for `register` on `device_id`.
    pub const fn read_request(device_id: u8, register: RegisterAddress) -> Self {
        Self::request(device_id, FunctionCode::Read, register, Payload::READ_REQUEST)
    }

    /// Build a write request setting `register` on `device_id` to `payload`.
    pub fn write_request(device_id: u8, register: RegisterAddress, payload: impl Into<Payload>) -> Self {
        Self::request(device_id, FunctionCode::Write, register, payload.into())
    }

    /// Build a request frame and seal it with its CRC.
    pub const fn request(
        device_id: u8,
        function: FunctionCode,
        register: RegisterAddress,
        payload: Payload,
    ) -> Self {
        let reg = register.to_bytes();
        let data = payload.to_be_bytes();

        let mut bytes = [0u8; FRAME_SIZE];
        bytes[OFFSET_DEVICE_ID] = device_id;
        bytes[OFFSET_FUNCTION] = function.to_u8();
        bytes[OFFSET_REGISTER] = reg[0];
        bytes[OFFSET_REGISTER + 1] = reg[1];
        bytes[OFFSET_PAYLOAD] = data[0];
        bytes[OFFSET_PAYLOAD + 1] = data[1];
        bytes[OFFSET_PAYLOAD + 2] = data[2];
        bytes[OFFSET_PAYLOAD + 3] = data[3];

        Self::sealed(bytes)
    }

    /// Recompute and store the CRC over the first eight bytes.
    const fn sealed(mut bytes: [u8; FRAME_SIZE]) -> Self {
        let (body, _) = bytes.split_at(CHECKSUM_SPAN);
        let crc = crc16(body).to_be_bytes();
        bytes[OFFSET_CRC] = crc[0];
        bytes[OFFSET_CRC + 1] = crc[1];
        Self { bytes }
    }

    /// Decode a frame received from the wire.
    ///
    /// Only the first [`FRAME_SIZE`] bytes are considered.
    ///
    /// # Errors
    ///
    /// - truncated response if fewer than 10 bytes are given
    /// - invalid checksum if the CRC field does not match bytes `0..8`
    pub fn parse(data: &[u8]) -> Result<Self> {
        let frame = Self::from_bytes_unchecked(data)?;
        if !frame.has_valid_crc() {
            return Err(RtuError::invalid_checksum());
        }
        Ok(frame)
    }

    /// Decode a frame checking only its length.
    ///
    /// For drives that answer with a CRC the host cannot reproduce.
    pub fn from_bytes_unchecked(data: &[u8]) -> Result<Self> {
        let bytes: [u8; FRAME_SIZE] = data
            .get(..FRAME_SIZE)
            .and_then(|head| head.try_into().ok())
            .ok_or_else(RtuError::truncated_response)?;
        Ok(Self { bytes })
    }

    /// Wrap raw bytes as-is.
    #[inline]
    pub const fn from_raw(bytes: [u8; FRAME_SIZE]) -> Self {
        Self { bytes }
    }

    /// Device id (byte 0)
    #[inline(always)]
    pub const fn device_id(&self) -> u8 {
        self.bytes[OFFSET_DEVICE_ID]
    }

    /// Raw function byte (byte 1)
    #[inline(always)]
    pub const fn raw_function(&self) -> u8 {
        self.bytes[OFFSET_FUNCTION]
    }

    /// Decoded function code, if it is one this link speaks
    pub const fn function(&self) -> Option<FunctionCode> {
        FunctionCode::from_u8(self.raw_function())
    }

    /// Register address (bytes 2..4)
    #[inline]
    pub const fn register(&self) -> RegisterAddress {
        RegisterAddress::from_bytes([self.bytes[OFFSET_REGISTER], self.bytes[OFFSET_REGISTER + 1]])
    }

    /// Payload field (bytes 4..8)
    #[inline]
    pub const fn payload(&self) -> Payload {
        Payload::from_be_bytes([
            self.bytes[OFFSET_PAYLOAD],
            self.bytes[OFFSET_PAYLOAD + 1],
            self.bytes[OFFSET_PAYLOAD + 2],
            self.bytes[OFFSET_PAYLOAD + 3],
        ])
    }

    /// Payload read as a signed register value
    #[inline]
    pub const fn value(&self) -> i32 {
        self.payload().as_i32()
    }

    /// Stored CRC field (bytes 8..10)
    #[inline]
    pub const fn crc(&self) -> u16 {
        u16::from_be_bytes([self.bytes[OFFSET_CRC], self.bytes[OFFSET_CRC + 1]])
    }

    /// Whether the stored CRC matches the frame contents
    pub const fn has_valid_crc(&self) -> bool {
        let (body, _) = self.bytes.split_at(CHECKSUM_SPAN);
        crc16(body) == self.crc()
    }

    /// The complete frame
    #[inline(always)]
    pub const fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.bytes
    }

    /// Render each byte as a `0xNN` pair.
    ///
    /// This is the form drive logs and bench notes use for raw frames.
    pub fn hex_pairs(&self) -> heapless::Vec<heapless::String<4>, FRAME_SIZE> {
        use core::fmt::Write;

        let mut pairs = heapless::Vec::new();
        for byte in self.bytes {
            let mut pair = heapless::String::new();
            // "0x" plus two digits is exactly four characters
            let _ = write!(pair, "0x{byte:02x}");
            // One pair per byte, capacity is the frame size
            let _ = pairs.push(pair);
        }
        pairs
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Frame> for [u8; FRAME_SIZE] {
    fn from(frame: Frame) -> [u8; FRAME_SIZE] {
        frame.bytes
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "0x{byte:02x}")?;
        }
        Ok(())
    }
}
