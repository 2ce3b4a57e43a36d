//! Read and write transactions.
//!
//! Each call is one atomic request/response exchange on a caller-owned
//! transport: build the frame, write it once, read the 10-byte answer.
//! Nothing is kept between calls.
//!
//! If the first read fails for any reason other than an empty window, the
//! link gets one recovery sequence (see [`RetryPolicy`]): further reads of
//! the same answer, without resending the request. A timeout on the first
//! read is reported as-is.
//!
//! ## Example
//!
//! ```
//! use actuator_rtu::transport::mock::MockTransport;
//! use actuator_rtu::protocol::frame::Frame;
//! use actuator_rtu::{transaction, ErrorCode, RegisterAddress};
//!
//! let mut link = MockTransport::new();
//! link.push_frame(Frame::write_request(1, RegisterAddress::new(0x2D), 5));
//!
//! let reply = transaction::write(&mut link, 1, "2d", 5)?;
//! assert_eq!(reply.response.value(), 5);
//!
//! // Nobody answers the second time
//! let err = transaction::read(&mut link, 1, "2d").unwrap_err();
//! assert_eq!(err.code(), Some(ErrorCode::Timeout));
//! # Ok::<(), actuator_rtu::RtuError>(())
//! ```

use crate::config::{LinkConfig, RetryPolicy};
use crate::error::{Result, RtuError};
use crate::protocol::exchange::{Exchange, Received, Sent};
use crate::protocol::frame::{Frame, Payload};
use crate::register::RegisterAddress;
use crate::transport::Transport;

/// Outcome of a successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadReply {
    /// Register value, payload bytes reinterpreted as signed
    pub value: i32,
    /// The frame that was sent
    pub request: Frame,
    /// The frame that came back
    pub response: Frame,
}

/// Outcome of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteReply {
    /// The frame that was sent
    pub request: Frame,
    /// The drive's acknowledgement
    pub response: Frame,
}

/// Read a register using the default [`LinkConfig`].
///
/// `register` is operator-style hex (`"1a"`, `"0x001A"`).
///
/// # Errors
///
/// Construction failures if `register` is not valid 16-bit hex; otherwise
/// any error classified by [`RtuError::code`](crate::RtuError::code).
pub fn read<T: Transport + ?Sized>(transport: &mut T, device_id: u8, register: &str) -> Result<ReadReply> {
    read_with(transport, &LinkConfig::default(), device_id, register)
}

/// Write a register using the default [`LinkConfig`].
///
/// Negative values are sent as their 32-bit two's complement.
pub fn write<T: Transport + ?Sized>(
    transport: &mut T,
    device_id: u8,
    register: &str,
    value: impl Into<Payload>,
) -> Result<WriteReply> {
    write_with(transport, &LinkConfig::default(), device_id, register, value)
}

/// Read a register with explicit link settings.
pub fn read_with<T: Transport + ?Sized>(
    transport: &mut T,
    config: &LinkConfig,
    device_id: u8,
    register: &str,
) -> Result<ReadReply> {
    let register = RegisterAddress::parse_hex(register)?;
    read_register(transport, config, device_id, register)
}

/// Write a register with explicit link settings.
pub fn write_with<T: Transport + ?Sized>(
    transport: &mut T,
    config: &LinkConfig,
    device_id: u8,
    register: &str,
    value: impl Into<Payload>,
) -> Result<WriteReply> {
    let register = RegisterAddress::parse_hex(register)?;
    write_register(transport, config, device_id, register, value)
}

/// Read an already parsed register.
pub fn read_register<T: Transport + ?Sized>(
    transport: &mut T,
    config: &LinkConfig,
    device_id: u8,
    register: RegisterAddress,
) -> Result<ReadReply> {
    let request = Frame::read_request(device_id, register);
    let (request, response) = execute(transport, config, request)?.into_frames();
    let value = response.value();

    rtu_log!(debug, "device {} register {} = {}", device_id, register, value);
    Ok(ReadReply {
        value,
        request,
        response,
    })
}

/// Write an already parsed register.
pub fn write_register<T: Transport + ?Sized>(
    transport: &mut T,
    config: &LinkConfig,
    device_id: u8,
    register: RegisterAddress,
    value: impl Into<Payload>,
) -> Result<WriteReply> {
    let payload = value.into();
    let request = Frame::write_request(device_id, register, payload);
    let (request, response) = execute(transport, config, request)?.into_frames();

    rtu_log!(
        debug,
        "device {} register {} <- {}",
        device_id,
        register,
        payload.as_i32()
    );
    Ok(WriteReply { request, response })
}

/// Send one request and collect its answer, recovering at most once.
fn execute<T: Transport + ?Sized>(
    transport: &mut T,
    config: &LinkConfig,
    request: Frame,
) -> Result<Exchange<Received>> {
    let sent = Exchange::new(request)
        .send(transport)
        .inspect_err(|e| rtu_log!(error, "request not sent: {}", e))?;

    // `Exchange<Sent>` is `Copy`; recovery keeps reading for the same request
    match sent.receive(transport, config.response_timeout, config.verify_crc) {
        Ok(received) => Ok(received),
        Err(e) if e.is_timeout() => {
            rtu_log!(error, "no response: {}", e);
            Err(e)
        }
        Err(e) => recover(transport, config, &sent, e),
    }
}

/// The single recovery sequence after a failed first read.
fn recover<T: Transport + ?Sized>(
    transport: &mut T,
    config: &LinkConfig,
    sent: &Exchange<Sent>,
    first: RtuError,
) -> Result<Exchange<Received>> {
    let RetryPolicy { attempts, window } = config.retry;
    let mut last = first;

    for attempt in 1..=attempts {
        rtu_log!(warn, "recovery read {}/{} after: {}", attempt, attempts, last);
        match sent.receive_again(transport, window, config.verify_crc) {
            Ok(received) => return Ok(received),
            Err(e) => last = e,
        }
    }

    rtu_log!(error, "transaction failed: {}", last);
    Err(last)
}
