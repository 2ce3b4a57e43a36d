#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![doc = include_str!("../README.md")]

//! # actuator-rtu
//!
//! Fixed-frame serial command/response protocol for actuator drives.
//!
//! ## Layout
//!
//! - [`crc`] - CRC16/MODBUS engine
//! - [`register`] - hex register addresses
//! - [`protocol`] - 10-byte frame codec and the request/response exchange
//! - [`transport`] - the byte-link trait, a scripted mock and a serial port
//! - [`transaction`] - read/write with bounded recovery
//! - [`client`] - [`ActuatorClient`], an owning wrapper over a transport
//! - [`config`] - link and port settings
//! - [`error`] - [`RtuError`] and the numeric [`ErrorCode`] taxonomy

extern crate alloc;

// Macro modules (must be declared before use)
#[macro_use]
pub mod logging;

pub mod client;
pub mod config;
pub mod crc;
pub mod error;
pub mod protocol;
pub mod register;
pub mod transaction;
pub mod transport;

// Re-export commonly used types
#[doc(inline)]
pub use client::ActuatorClient;
#[doc(inline)]
pub use config::{LinkConfig, RetryPolicy};
#[doc(inline)]
pub use error::{ErrorCode, Result, RtuError};
#[doc(inline)]
pub use protocol::constants::FunctionCode;
#[doc(inline)]
pub use protocol::frame::{Frame, Payload};
#[doc(inline)]
pub use register::RegisterAddress;
#[doc(inline)]
pub use transaction::{ReadReply, WriteReply};
#[doc(inline)]
pub use transport::Transport;
