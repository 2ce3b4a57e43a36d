//! CRC-16/MODBUS checksum.
//!
//! Reflected CRC-16 with polynomial `0x8005` (`0xA001` reversed), initial
//! value `0xFFFF`, no final XOR. Every frame on the link carries this
//! checksum over its first eight bytes, stored big-endian in the last two.
//!
//! ## Example
//!
//! ```
//! use actuator_rtu::crc::{crc16, Crc16};
//!
//! let data = [0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];
//! assert_eq!(crc16(&data), 0xCDC5);
//!
//! let mut digest = Crc16::new();
//! digest.update(&data[..2]);
//! digest.update(&data[2..]);
//! assert_eq!(digest.finish(), 0xCDC5);
//! ```

use ::crc::{Crc, Digest, CRC_16_MODBUS};

/// Initial accumulator value.
pub const CRC16_INIT: u16 = CRC_16_MODBUS.init;

/// Reversed generator polynomial.
pub const CRC16_POLY: u16 = 0xA001;

/// CRC-16/MODBUS engine with its lookup table.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Engine backing [`Crc16`] digests, which borrow it for `'static`.
static CRC16_ENGINE: Crc<u16> = CRC16;

/// Compute the CRC-16/MODBUS checksum of `data`.
///
/// An empty slice yields the untouched initial value `0xFFFF`.
pub const fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Check a buffer whose last two bytes are a big-endian CRC of the rest.
///
/// Buffers shorter than two bytes never verify.
pub fn verify(data: &[u8]) -> bool {
    let Some(split) = data.len().checked_sub(2) else {
        return false;
    };
    let (body, tail) = data.split_at(split);
    crc16(body) == u16::from_be_bytes([tail[0], tail[1]])
}

/// Incremental CRC-16/MODBUS digest.
///
/// Produces the same result as [`crc16`] regardless of how the input is
/// split across [`update`](Self::update) calls.
#[derive(Clone)]
pub struct Crc16 {
    digest: Digest<'static, u16>,
}

impl Crc16 {
    /// Start a new digest.
    pub fn new() -> Self {
        Self {
            digest: CRC16_ENGINE.digest(),
        }
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Current checksum. The digest can keep being updated afterwards.
    pub fn finish(&self) -> u16 {
        self.digest.clone().finalize()
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Crc16 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Crc16")
            .field("checksum", &format_args!("{:#06x}", self.finish()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_initial_value() {
        assert_eq!(crc16(&[]), 0xFFFF);
        assert_eq!(Crc16::new().finish(), 0xFFFF);
    }

    #[test]
    fn test_modbus_reference_vectors() {
        // Read holding registers 0..10 from slave 1: 01 03 00 00 00 0A C5 CD
        assert_eq!(crc16(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]), 0xCDC5);
        // CRC-16/MODBUS check value
        assert_eq!(crc16(b"123456789"), 0x4B37);
    }

    #[test]
    fn test_deterministic() {
        let data = [0x01, 0x06, 0x00, 0x10, 0xFF, 0xFF, 0xFF, 0x9C];
        assert_eq!(crc16(&data), crc16(&data));
    }

    #[test]
    fn test_const_evaluation() {
        const CHECK: u16 = crc16(b"123456789");
        assert_eq!(CHECK, 0x4B37);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data = b"actuator link frame bytes";
        let expected = crc16(data);

        for split in 0..=data.len() {
            let mut digest = Crc16::default();
            digest.update(&data[..split]);
            digest.update(&data[split..]);
            assert_eq!(digest.finish(), expected, "split at {split}");
        }
    }

    #[test]
    fn test_matches_reference_engine() {
        let reference = Crc::<u16>::new(&CRC_16_MODBUS);
        let vectors: [&[u8]; 3] = [b"", b"123456789", &[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]];
        for data in vectors {
            assert_eq!(crc16(data), reference.checksum(data));
        }
        assert_eq!(CRC16_INIT, 0xFFFF);
    }

    #[test]
    fn test_finish_does_not_consume() {
        let mut digest = Crc16::new();
        digest.update(&[0x01, 0x03]);
        let partial = digest.finish();
        assert_eq!(partial, digest.finish());
        digest.update(&[0x00, 0x00, 0x00, 0x0A]);
        assert_eq!(digest.finish(), 0xCDC5);
        assert_ne!(partial, 0xCDC5);
    }

    #[test]
    fn test_verify() {
        let mut frame = [0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00];
        let crc = crc16(&frame[..6]);
        frame[6..].copy_from_slice(&crc.to_be_bytes());
        assert!(verify(&frame));

        frame[3] ^= 0x01;
        assert!(!verify(&frame));

        assert!(!verify(&[]));
        assert!(!verify(&[0xFF]));
        // Empty body: CRC of nothing is 0xFFFF
        assert!(verify(&[0xFF, 0xFF]));
    }
}
