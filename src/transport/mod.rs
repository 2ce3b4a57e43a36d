//! Byte transport abstraction for the serial link.
//!
//! The codec never talks to a port directly. It is handed something that
//! implements [`Transport`] and does exactly one write and one or more
//! bounded reads through it. This keeps the protocol testable without
//! hardware and leaves the port's lifetime to the caller.
//!
//! Implementations shipped with the crate:
//! - [`mock::MockTransport`] - scripted replies, records every write
//! - `serial::SerialTransport` - a real port via `serialport` (feature `serial`)
//!
//! ## Example
//!
//! ```
//! use actuator_rtu::transport::{mock::MockTransport, Transport};
//! use core::time::Duration;
//!
//! let mut port = MockTransport::new();
//! port.push_reply(vec![0x01, 0x02, 0x03]);
//!
//! port.write(&[0xAA, 0xBB]).unwrap();
//!
//! let mut buf = [0u8; 10];
//! let n = port.read(&mut buf, Duration::from_millis(100)).unwrap();
//! assert_eq!(&buf[..n], &[0x01, 0x02, 0x03]);
//! ```

use crate::error::{Result, RtuError};
use core::time::Duration;

pub mod mock;
#[cfg(feature = "serial")]
pub mod serial;

/// Half-duplex byte transport.
///
/// Only one transaction may be in flight on a link at a time. Every method
/// takes `&mut self`, so callers sharing a link need a mutex or a single
/// owner.
pub trait Transport {
    /// Write all of `data` to the link.
    ///
    /// # Returns
    ///
    /// Number of bytes accepted by the link. Callers treat anything less
    /// than `data.len()` as a failed write.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the link is closed or the write fails.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read up to `buf.len()` bytes, waiting at most `timeout`.
    ///
    /// Implementations should keep reading until the buffer is full or the
    /// window elapses, so a frame split across several chunks arrives whole.
    ///
    /// # Returns
    ///
    /// Number of bytes read. `Ok(0)` means the window elapsed with nothing
    /// received, which the codec reports as a timeout.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the link is closed or the read fails.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Open the underlying link.
    ///
    /// Default implementation does nothing. Override if the transport can
    /// be reopened after [`close`](Self::close).
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Close the link and release resources.
    ///
    /// Default implementation does nothing.
    fn close(&mut self) {}

    /// Check if the link is open.
    ///
    /// Default implementation returns `true`.
    fn is_open(&self) -> bool {
        true
    }

    /// Change the link speed.
    ///
    /// Default implementation rejects the request, since most test doubles
    /// have no notion of a baud rate.
    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        let _ = baud_rate;
        Err(RtuError::unsupported_operation())
    }

    /// Current link speed, if the transport has one.
    fn baud_rate(&self) -> Option<u32> {
        None
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        (**self).read(buf, timeout)
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        (**self).set_baud_rate(baud_rate)
    }

    fn baud_rate(&self) -> Option<u32> {
        (**self).baud_rate()
    }
}
