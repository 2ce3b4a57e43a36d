//! Single request/response exchange with the typestate pattern.
//!
//! An exchange moves through a fixed sequence of states, and each state is
//! a distinct type, so an exchange cannot be read before it was sent or
//! sent twice:
//!
//! ```text
//! Built ──send()──► Sent ──receive()──► Received
//!   │                 │                    │
//!   └──── Err ────────┴────── Err ─────────┘   (Errored: exchange dropped)
//! ```
//!
//! `Idle` is simply "no exchange yet"; waiting for the response happens
//! inside [`Exchange::receive`]. A failed transition consumes the exchange
//! and returns the error, which is the `Errored` terminal state. The
//! bounded recovery policy is layered on top in [`crate::transaction`].
//!
//! ## Example
//!
//! ```
//! use actuator_rtu::protocol::exchange::Exchange;
//! use actuator_rtu::protocol::frame::Frame;
//! use actuator_rtu::transport::mock::MockTransport;
//! use actuator_rtu::RegisterAddress;
//! use core::time::Duration;
//!
//! let request = Frame::read_request(1, RegisterAddress::new(0x1A));
//! let mut link = MockTransport::new();
//! link.push_frame(Frame::write_request(1, RegisterAddress::new(0x1A), 0));
//!
//! let sent = Exchange::new(request).send(&mut link)?;
//! let received = sent.receive(&mut link, Duration::from_millis(100), true)?;
//! assert_eq!(received.response().value(), 0);
//! # Ok::<(), actuator_rtu::RtuError>(())
//! ```

use crate::error::{Result, RtuError};
use crate::protocol::constants::FRAME_SIZE;
use crate::protocol::frame::Frame;
use crate::transport::Transport;
use core::time::Duration;

// =============================================================================
// State Types
// =============================================================================

/// Request frame built, nothing written yet
#[derive(Debug, Clone, Copy)]
pub struct Built;

/// Request written, response not read yet
#[derive(Debug, Clone, Copy)]
pub struct Sent;

/// Response read and validated
#[derive(Debug, Clone, Copy)]
pub struct Received {
    response: Frame,
}

// =============================================================================
// Exchange
// =============================================================================

/// One request/response exchange over a transport.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<State> {
    request: Frame,
    state: State,
}

impl<S> Exchange<S> {
    /// The request frame (available in all states)
    #[inline]
    pub const fn request(&self) -> &Frame {
        &self.request
    }
}

impl Exchange<Built> {
    /// Start an exchange for an already sealed request.
    pub const fn new(request: Frame) -> Self {
        Self { request, state: Built }
    }

    /// Write the request (Built → Sent).
    ///
    /// Exactly one write is issued. A write that does not accept the whole
    /// frame is reported as a transport error.
    pub fn send<T: Transport + ?Sized>(self, transport: &mut T) -> Result<Exchange<Sent>> {
        rtu_log!(trace, "tx {}", self.request);

        let written = transport.write(self.request.as_bytes())?;
        if written != FRAME_SIZE {
            rtu_log!(error, "short write: {} of {} bytes", written, FRAME_SIZE);
            return Err(RtuError::short_write());
        }

        Ok(Exchange {
            request: self.request,
            state: Sent,
        })
    }
}

impl Exchange<Sent> {
    /// Wait for and validate the response (Sent → Received).
    ///
    /// Classification of failures:
    /// - nothing arrived inside `timeout` → [`RtuError::Timeout`]
    /// - fewer than 10 bytes → truncated response
    /// - CRC mismatch (when `verify_crc`) → invalid checksum
    /// - transport failure → passed through
    /// - a read count larger than the buffer → transport error
    pub fn receive<T: Transport + ?Sized>(
        self,
        transport: &mut T,
        timeout: Duration,
        verify_crc: bool,
    ) -> Result<Exchange<Received>> {
        let response = read_response(transport, timeout, verify_crc)?;
        Ok(Exchange {
            request: self.request,
            state: Received { response },
        })
    }

    /// Read another response for the same request, without resending it.
    ///
    /// Used by recovery after [`receive`](Self::receive) failed; the
    /// exchange stays in the `Sent` state until a response validates.
    pub fn receive_again<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        timeout: Duration,
        verify_crc: bool,
    ) -> Result<Exchange<Received>> {
        let response = read_response(transport, timeout, verify_crc)?;
        Ok(Exchange {
            request: self.request,
            state: Received { response },
        })
    }
}

impl Exchange<Received> {
    /// The validated response frame
    #[inline]
    pub const fn response(&self) -> &Frame {
        &self.state.response
    }

    /// Split into request and response
    pub const fn into_frames(self) -> (Frame, Frame) {
        (self.request, self.state.response)
    }
}

/// One bounded read of a full response frame.
fn read_response<T: Transport + ?Sized>(
    transport: &mut T,
    timeout: Duration,
    verify_crc: bool,
) -> Result<Frame> {
    let mut buf = [0u8; FRAME_SIZE];
    let n = transport.read(&mut buf, timeout)?;

    if n == 0 {
        return Err(RtuError::Timeout);
    }

    // A transport claiming more bytes than it was given is broken
    let Some(received) = buf.get(..n) else {
        rtu_log!(error, "transport reported {} bytes for a {} byte buffer", n, FRAME_SIZE);
        return Err(RtuError::read_failed());
    };
    let frame = if verify_crc {
        Frame::parse(received)?
    } else {
        Frame::from_bytes_unchecked(received)?
    };

    rtu_log!(trace, "rx {}", frame);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::RegisterAddress;
    use crate::transport::mock::MockTransport;

    const WINDOW: Duration = Duration::from_millis(100);

    fn request() -> Frame {
        Frame::read_request(1, RegisterAddress::new(0x10))
    }

    #[test]
    fn test_happy_path() {
        let reply = Frame::write_request(1, RegisterAddress::new(0x10), 42);
        let mut link = MockTransport::new();
        link.push_frame(reply);

        let sent = Exchange::new(request()).send(&mut link).unwrap();
        assert_eq!(link.writes().len(), 1);
        assert_eq!(link.writes()[0].as_slice(), request().as_bytes());

        let received = sent.receive(&mut link, WINDOW, true).unwrap();
        assert_eq!(*received.response(), reply);
        assert_eq!(link.read_timeouts(), &[WINDOW]);

        let (req, resp) = received.into_frames();
        assert_eq!(req, request());
        assert_eq!(resp.value(), 42);
    }

    #[test]
    fn test_silence_is_timeout() {
        let mut link = MockTransport::new();
        let sent = Exchange::new(request()).send(&mut link).unwrap();
        let err = sent.receive(&mut link, WINDOW, true).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_short_response() {
        let mut link = MockTransport::new();
        link.push_reply(vec![0x01, 0x03, 0x00]);
        let sent = Exchange::new(request()).send(&mut link).unwrap();
        match sent.receive(&mut link, WINDOW, true) {
            Err(RtuError::Response(e)) => assert!(e.is_truncated()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_crc_check_can_be_disabled() {
        let mut bytes = *Frame::write_request(1, RegisterAddress::new(0x10), 7).as_bytes();
        bytes[9] ^= 0xFF;

        let mut link = MockTransport::new();
        link.push_reply(bytes.to_vec());
        link.push_reply(bytes.to_vec());

        let sent = Exchange::new(request()).send(&mut link).unwrap();
        match sent.receive_again(&mut link, WINDOW, true) {
            Err(RtuError::Response(e)) => assert!(e.is_invalid_checksum()),
            other => panic!("unexpected: {other:?}"),
        }
        let received = sent.receive(&mut link, WINDOW, false).unwrap();
        assert_eq!(received.response().value(), 7);
    }

    #[test]
    fn test_failed_write() {
        let mut link = MockTransport::new();
        link.set_fail_writes(true);
        assert!(matches!(
            Exchange::new(request()).send(&mut link),
            Err(RtuError::Transport(_))
        ));
        assert_eq!(link.read_count(), 0);
    }

    #[test]
    fn test_short_write_is_transport_error() {
        struct HalfWriter;

        impl Transport for HalfWriter {
            fn write(&mut self, data: &[u8]) -> Result<usize> {
                Ok(data.len() / 2)
            }

            fn read(&mut self, _buf: &mut [u8], _timeout: Duration) -> Result<usize> {
                Ok(0)
            }
        }

        match Exchange::new(request()).send(&mut HalfWriter) {
            Err(RtuError::Transport(e)) => assert!(e.is_short_write()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_overlong_read_count_is_transport_error() {
        struct OverReporter;

        impl Transport for OverReporter {
            fn write(&mut self, data: &[u8]) -> Result<usize> {
                Ok(data.len())
            }

            fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
                Ok(buf.len() + 2)
            }
        }

        let sent = Exchange::new(request()).send(&mut OverReporter).unwrap();
        let err = sent.receive(&mut OverReporter, WINDOW, true).unwrap_err();
        assert_eq!(err.code(), Some(crate::error::ErrorCode::CommunicationError));

        // Recovery reads hit the same check, so the transaction fails cleanly
        let err = crate::transaction::read(&mut OverReporter, 1, "10").unwrap_err();
        assert!(matches!(err, RtuError::Transport(_)));
    }
}
