//! Mock transport implementation for testing.
//!
//! This module provides a scripted implementation of [`Transport`] so the
//! codec and transaction logic can be exercised without a drive on the bus.
//!
//! ## Example
//!
//! ```
//! use actuator_rtu::transport::mock::MockTransport;
//! use actuator_rtu::protocol::frame::Frame;
//! use actuator_rtu::{transaction, RegisterAddress};
//!
//! let mut mock = MockTransport::new();
//!
//! // Program the drive's answer
//! mock.push_frame(Frame::write_request(1, RegisterAddress::new(0x10), 10));
//!
//! let reply = transaction::read(&mut mock, 1, "10").unwrap();
//! assert_eq!(reply.value, 10);
//!
//! // Verify what was sent
//! assert_eq!(mock.writes().len(), 1);
//! assert_eq!(mock.writes()[0][1], 0x03);
//! ```

use crate::error::{Result, RtuError};
use crate::protocol::frame::Frame;
use crate::transport::Transport;
use core::time::Duration;

#[cfg(feature = "std")]
use std::collections::VecDeque;

#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// One scripted answer to a `read()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Deliver these bytes (truncated to the caller's buffer)
    Bytes(Vec<u8>),
    /// Let the window elapse with nothing received
    Silence,
    /// Fail the read as the serial layer would
    Fault,
}

/// Scripted transport for testing without real hardware.
///
/// This mock transport allows you to:
/// - Pre-program replies returned by `read()` in FIFO order
/// - Inspect every frame passed to `write()`
/// - Simulate timeouts, serial faults and closed ports
///
/// Once the script runs out, every further read behaves like a silent bus.
#[derive(Debug)]
pub struct MockTransport {
    /// Queue of pre-programmed replies
    replies: VecDeque<MockReply>,
    /// Record of all buffers passed to write()
    writes: Vec<Vec<u8>>,
    /// Timeout passed to each read() call, in order
    read_timeouts: Vec<Duration>,
    /// Whether the port is "open"
    open: bool,
    /// Whether write() should fail
    fail_writes: bool,
    /// Configured link speed
    baud_rate: u32,
}

impl MockTransport {
    /// Baud rate reported before any call to `set_baud_rate()`.
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;

    /// Create a new, open mock transport with an empty script.
    pub fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            writes: Vec::new(),
            read_timeouts: Vec::new(),
            open: true,
            fail_writes: false,
            baud_rate: Self::DEFAULT_BAUD_RATE,
        }
    }

    /// Queue raw reply bytes.
    pub fn push_reply(&mut self, data: Vec<u8>) {
        self.replies.push_back(MockReply::Bytes(data));
    }

    /// Queue a complete frame as the next reply.
    pub fn push_frame(&mut self, frame: Frame) {
        self.push_reply(frame.as_bytes().to_vec());
    }

    /// Queue a read that times out.
    pub fn push_silence(&mut self) {
        self.replies.push_back(MockReply::Silence);
    }

    /// Queue a read that fails at the serial layer.
    pub fn push_fault(&mut self) {
        self.replies.push_back(MockReply::Fault);
    }

    /// Every buffer written so far, oldest first.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Number of `read()` calls made so far.
    pub fn read_count(&self) -> usize {
        self.read_timeouts.len()
    }

    /// Timeout passed to each `read()` call, oldest first.
    pub fn read_timeouts(&self) -> &[Duration] {
        &self.read_timeouts
    }

    /// Number of scripted replies not yet consumed.
    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    /// Make subsequent writes fail.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if !self.open {
            return Err(RtuError::not_open());
        }
        if self.fail_writes {
            return Err(RtuError::write_failed());
        }
        self.writes.push(data.to_vec());
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.open {
            return Err(RtuError::not_open());
        }
        self.read_timeouts.push(timeout);

        match self.replies.pop_front().unwrap_or(MockReply::Silence) {
            MockReply::Bytes(data) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            MockReply::Silence => Ok(0),
            MockReply::Fault => Err(RtuError::read_failed()),
        }
    }

    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        self.replies.clear();
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        if !self.open {
            return Err(RtuError::not_open());
        }
        self.baud_rate = baud_rate;
        Ok(())
    }

    fn baud_rate(&self) -> Option<u32> {
        Some(self.baud_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn test_mock_send_receive() {
        let mut mock = MockTransport::new();
        mock.push_reply(vec![0x01, 0x02, 0x03]);

        assert_eq!(mock.write(&[0xAA, 0xBB]).unwrap(), 2);
        assert_eq!(mock.writes().len(), 1);
        assert_eq!(mock.writes()[0], vec![0xAA, 0xBB]);

        let mut buf = [0u8; 10];
        let n = mock.read(&mut buf, WINDOW).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf[..3], &[0x01, 0x02, 0x03]);
        assert_eq!(mock.read_timeouts(), &[WINDOW]);
    }

    #[test]
    fn test_empty_script_is_silent() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 10];
        assert_eq!(mock.read(&mut buf, WINDOW).unwrap(), 0);
        assert_eq!(mock.read(&mut buf, WINDOW).unwrap(), 0);
        assert_eq!(mock.read_count(), 2);
    }

    #[test]
    fn test_fifo_order() {
        let mut mock = MockTransport::new();
        mock.push_reply(vec![0x01]);
        mock.push_silence();
        mock.push_fault();
        mock.push_reply(vec![0x02]);

        let mut buf = [0u8; 4];
        assert_eq!(mock.read(&mut buf, WINDOW).unwrap(), 1);
        assert_eq!(buf[0], 0x01);
        assert_eq!(mock.read(&mut buf, WINDOW).unwrap(), 0);
        assert!(matches!(mock.read(&mut buf, WINDOW), Err(RtuError::Transport(_))));
        assert_eq!(mock.read(&mut buf, WINDOW).unwrap(), 1);
        assert_eq!(buf[0], 0x02);
        assert_eq!(mock.pending_replies(), 0);
    }

    #[test]
    fn test_reply_truncated_to_buffer() {
        let mut mock = MockTransport::new();
        mock.push_reply(vec![0xEE; 16]);
        let mut buf = [0u8; 10];
        assert_eq!(mock.read(&mut buf, WINDOW).unwrap(), 10);
    }

    #[test]
    fn test_closed_port_fails() {
        let mut mock = MockTransport::new();
        mock.push_reply(vec![0x01]);
        mock.close();
        assert!(!mock.is_open());
        assert_eq!(mock.pending_replies(), 0);

        let mut buf = [0u8; 4];
        match mock.read(&mut buf, WINDOW) {
            Err(RtuError::Transport(e)) => assert!(e.is_not_open()),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(mock.write(&[0x00]).is_err());

        mock.open().unwrap();
        assert!(mock.is_open());
        assert_eq!(mock.write(&[0x00]).unwrap(), 1);
    }

    #[test]
    fn test_write_failure() {
        let mut mock = MockTransport::new();
        mock.set_fail_writes(true);
        assert!(mock.write(&[0x01]).is_err());
        assert!(mock.writes().is_empty());
    }

    #[test]
    fn test_baud_rate() {
        let mut mock = MockTransport::new();
        assert_eq!(mock.baud_rate(), Some(MockTransport::DEFAULT_BAUD_RATE));
        mock.set_baud_rate(9600).unwrap();
        assert_eq!(mock.baud_rate(), Some(9600));
    }
}
