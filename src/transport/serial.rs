//! Serial port transport backed by the `serialport` crate.
//!
//! Opens the port 8N1 without flow control, as the drives expect, and
//! implements the windowed read the codec relies on: keep reading until the
//! buffer is full or the window closes, treating the port's own timeout as
//! "nothing more arrived".

use crate::config::SerialConfig;
use crate::error::{Result, RtuError};
use crate::transport::Transport;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

/// A half-duplex serial link to one or more drives.
///
/// # Examples
///
/// ```rust,no_run
/// use actuator_rtu::config::SerialConfig;
/// use actuator_rtu::transport::serial::SerialTransport;
/// use actuator_rtu::transaction;
///
/// let mut port = SerialTransport::open(SerialConfig::new("/dev/ttyUSB0"))?;
/// let reply = transaction::read(&mut port, 1, "2")?;
/// println!("register 0x0002 = {}", reply.value);
/// # Ok::<(), actuator_rtu::RtuError>(())
/// ```
pub struct SerialTransport {
    config: SerialConfig,
    port: Option<Box<dyn SerialPort>>,
}

impl core::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("config", &self.config)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl SerialTransport {
    /// Create a transport without opening the port.
    pub fn new(config: SerialConfig) -> Self {
        Self { config, port: None }
    }

    /// Create a transport and open the port immediately.
    pub fn open(config: SerialConfig) -> Result<Self> {
        let mut transport = Self::new(config);
        Transport::open(&mut transport)?;
        Ok(transport)
    }

    /// Names of the serial ports present on this machine.
    pub fn available_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }

    /// The configuration this transport opens the port with.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or_else(RtuError::not_open)
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let port = self.port_mut()?;

        // Drop anything a previous exchange left behind, so the next read
        // starts at this request's answer.
        if let Err(e) = port.clear(serialport::ClearBuffer::Input) {
            rtu_log!(warn, "failed to clear input buffer: {}", e);
        }

        port.write_all(data).map_err(|e| {
            rtu_log!(error, "serial write failed: {}", e);
            RtuError::write_failed()
        })?;
        port.flush().map_err(|e| {
            rtu_log!(error, "serial flush failed: {}", e);
            RtuError::write_failed()
        })?;
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port_mut()?;
        let deadline = Instant::now() + timeout;
        let mut filled = 0;

        while filled < buf.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            port.set_timeout(remaining).map_err(|e| {
                rtu_log!(error, "failed to set read timeout: {}", e);
                RtuError::configuration_failed()
            })?;

            match port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    rtu_log!(error, "serial read failed: {}", e);
                    return Err(RtuError::read_failed());
                }
            }
        }

        Ok(filled)
    }

    fn open(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }

        let port = serialport::new(self.config.port_name.as_str(), self.config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.config.timeout)
            .open()
            .map_err(|e| {
                rtu_log!(error, "failed to open {}: {}", self.config.port_name, e);
                RtuError::open_failed()
            })?;

        rtu_log!(info, "opened {} at {} baud", self.config.port_name, self.config.baud_rate);
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            rtu_log!(info, "closed {}", self.config.port_name);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        let port = self.port_mut()?;
        port.set_baud_rate(baud_rate).map_err(|e| {
            rtu_log!(error, "failed to set baud rate {}: {}", baud_rate, e);
            RtuError::configuration_failed()
        })?;
        self.config.baud_rate = baud_rate;
        rtu_log!(info, "baud rate set to {}", baud_rate);
        Ok(())
    }

    fn baud_rate(&self) -> Option<u32> {
        Some(self.config.baud_rate)
    }
}
