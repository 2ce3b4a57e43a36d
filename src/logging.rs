//! Unified logging macro for the link.
//!
//! One macro, three backends selected at compile time:
//!
//! - `log` feature - forwards to the `log` facade (host tools, tests)
//! - `defmt` feature (without `log`) - forwards to `defmt` (embedded targets)
//! - neither - compiles to nothing
//!
//! # Usage
//!
//! ```rust,ignore
//! rtu_log!(trace, "tx {}", frame);
//! rtu_log!(debug, "register {} = {}", register, value);
//! rtu_log!(warn, "recovery read {}/{}", attempt, max);
//! rtu_log!(error, "transaction failed: {}", error);
//! ```
//!
//! Arguments must be passed positionally; inline format captures would be
//! lost in the no-op variant.

/// Log through whichever backend is enabled.
#[macro_export]
#[cfg(feature = "log")]
macro_rules! rtu_log {
    (info, $($arg:tt)*) => { log::info!($($arg)*) };
    (debug, $($arg:tt)*) => { log::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { log::warn!($($arg)*) };
    (error, $($arg:tt)*) => { log::error!($($arg)*) };
    (trace, $($arg:tt)*) => { log::trace!($($arg)*) };
}

#[macro_export]
#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! rtu_log {
    (info, $($arg:tt)*) => { defmt::info!($($arg)*) };
    (debug, $($arg:tt)*) => { defmt::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { defmt::warn!($($arg)*) };
    (error, $($arg:tt)*) => { defmt::error!($($arg)*) };
    (trace, $($arg:tt)*) => { defmt::trace!($($arg)*) };
}

#[macro_export]
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! rtu_log {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}
