//! High-level actuator client wrapper
//!
//! [`ActuatorClient`] owns one transport and one [`LinkConfig`] and exposes
//! the transactions as methods. It holds no other state, so it is a
//! convenience over the free functions in [`crate::transaction`].

use crate::config::LinkConfig;
use crate::error::Result;
use crate::protocol::frame::Payload;
use crate::register::RegisterAddress;
use crate::transaction::{self, ReadReply, WriteReply};
use crate::transport::Transport;

/// Client for drives sharing one serial link
///
/// # Examples
///
/// ```
/// use actuator_rtu::transport::mock::MockTransport;
/// use actuator_rtu::protocol::frame::Frame;
/// use actuator_rtu::{ActuatorClient, RegisterAddress};
///
/// let mut link = MockTransport::new();
/// link.push_frame(Frame::write_request(3, RegisterAddress::new(0x1A), 250));
///
/// let mut client = ActuatorClient::new(link);
/// assert_eq!(client.read(3, "1a")?.value, 250);
///
/// let link = client.into_inner();
/// assert_eq!(link.writes().len(), 1);
/// # Ok::<(), actuator_rtu::RtuError>(())
/// ```
#[derive(Debug)]
pub struct ActuatorClient<T: Transport> {
    transport: T,
    config: LinkConfig,
}

impl<T: Transport> ActuatorClient<T> {
    /// Create a client with the default link settings
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, LinkConfig::default())
    }

    /// Create a client with explicit link settings
    pub fn with_config(transport: T, config: LinkConfig) -> Self {
        Self { transport, config }
    }

    /// Read a register given as hex (`"1a"`)
    pub fn read(&mut self, device_id: u8, register: &str) -> Result<ReadReply> {
        transaction::read_with(&mut self.transport, &self.config, device_id, register)
    }

    /// Write a register given as hex (`"1a"`)
    pub fn write(
        &mut self,
        device_id: u8,
        register: &str,
        value: impl Into<Payload>,
    ) -> Result<WriteReply> {
        transaction::write_with(&mut self.transport, &self.config, device_id, register, value)
    }

    /// Read a parsed register
    pub fn read_register(&mut self, device_id: u8, register: RegisterAddress) -> Result<ReadReply> {
        transaction::read_register(&mut self.transport, &self.config, device_id, register)
    }

    /// Write a parsed register
    pub fn write_register(
        &mut self,
        device_id: u8,
        register: RegisterAddress,
        value: impl Into<Payload>,
    ) -> Result<WriteReply> {
        transaction::write_register(&mut self.transport, &self.config, device_id, register, value)
    }

    /// Current link settings
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Replace the link settings
    pub fn set_config(&mut self, config: LinkConfig) {
        self.config = config;
    }

    /// Borrow the transport (open/close, baud rate)
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::error::ErrorCode;
    use crate::protocol::frame::Frame;
    use crate::transport::mock::MockTransport;
    use core::time::Duration;

    #[test]
    fn test_read_and_write() {
        let mut link = MockTransport::new();
        link.push_frame(Frame::write_request(1, RegisterAddress::new(0x2D), 1));
        link.push_frame(Frame::write_request(1, RegisterAddress::new(0x2D), 1));

        let mut client = ActuatorClient::new(link);
        client.write(1, "2d", 1).unwrap();
        let reply = client.read_register(1, RegisterAddress::new(0x2D)).unwrap();
        assert_eq!(reply.value, 1);

        let writes = client.transport_mut().writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0][1], 0x06);
        assert_eq!(writes[1][1], 0x03);
    }

    #[test]
    fn test_config_is_applied() {
        let config = LinkConfig::new()
            .with_response_timeout(Duration::from_millis(5))
            .with_retry(RetryPolicy::NONE);
        let mut client = ActuatorClient::with_config(MockTransport::new(), config);
        assert_eq!(client.config(), &config);

        client.transport_mut().push_fault();
        let err = client
            .write_register(1, RegisterAddress::new(0x10), -5)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CommunicationError));
        assert_eq!(client.transport_mut().read_timeouts(), &[Duration::from_millis(5)]);

        client.set_config(LinkConfig::default());
        assert_eq!(client.config().retry.attempts, RetryPolicy::DEFAULT_ATTEMPTS);
    }

    #[test]
    fn test_closed_transport() {
        let mut client = ActuatorClient::new(MockTransport::new());
        client.transport_mut().close();
        let err = client.read(1, "10").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CommunicationError));
    }

    #[test]
    fn test_borrowed_transport() {
        let mut link = MockTransport::new();
        link.push_frame(Frame::write_request(1, RegisterAddress::new(0x01), 42));

        {
            let mut client = ActuatorClient::new(&mut link);
            assert_eq!(client.read(1, "1").unwrap().value, 42);
        }
        assert_eq!(&link.writes()[0][2..4], &[0x00, 0x01]);
    }
}
