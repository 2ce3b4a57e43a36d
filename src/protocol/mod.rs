//! Actuator RTU protocol implementation.
//!
//! This module contains the fixed 10-byte frame layout, its codec, and the
//! request/response exchange built on top of a [`Transport`](crate::transport::Transport).

pub mod constants;
pub mod exchange;
pub mod frame;

pub use constants::*;
pub use exchange::{Built, Exchange, Received, Sent};
pub use frame::*;
