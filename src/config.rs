//! Link configuration.
//!
//! Settings can be built in code with the `with_*` methods or read from a
//! plain `KEY=VALUE` text block, one setting per line:
//!
//! ```text
//! RESPONSE_TIMEOUT_MS=100
//! RETRY_ATTEMPTS=3
//! RETRY_WINDOW_MS=1500
//! VERIFY_CRC=true
//! PORT_NAME=/dev/ttyUSB0
//! BAUD_RATE=115200
//! TIMEOUT_MS=1000
//! ```
//!
//! Lines starting with `#` and unknown keys are ignored. A missing or
//! unparsable value keeps its default.

use core::time::Duration;

/// Recovery reads performed after a failed response.
///
/// When the first read of a transaction fails for any reason other than a
/// timeout, the link gets one recovery sequence of up to `attempts` further
/// reads, each waiting up to `window`. The request is not sent again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Maximum number of recovery reads (0 disables recovery)
    pub attempts: u8,
    /// Read window for each recovery read
    pub window: Duration,
}

impl RetryPolicy {
    /// Recovery reads used by the drive tooling.
    pub const DEFAULT_ATTEMPTS: u8 = 3;
    /// Recovery read window used by the drive tooling.
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1500);

    /// No recovery: surface the first failure directly.
    pub const NONE: Self = Self {
        attempts: 0,
        window: Duration::ZERO,
    };

    /// Create a policy.
    pub const fn new(attempts: u8, window: Duration) -> Self {
        Self { attempts, window }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_WINDOW)
    }
}

/// Per-transaction behaviour of the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkConfig {
    /// Read window for the response to a request
    pub response_timeout: Duration,
    /// Recovery after a failed response
    pub retry: RetryPolicy,
    /// Reject responses whose CRC does not match
    pub verify_crc: bool,
}

impl LinkConfig {
    /// Response window used by the drive tooling.
    pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(100);

    /// Create the default configuration.
    pub const fn new() -> Self {
        Self {
            response_timeout: Self::DEFAULT_RESPONSE_TIMEOUT,
            retry: RetryPolicy::new(RetryPolicy::DEFAULT_ATTEMPTS, RetryPolicy::DEFAULT_WINDOW),
            verify_crc: true,
        }
    }

    /// Set the response window.
    #[must_use]
    pub const fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the recovery policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enable or disable response CRC verification.
    #[must_use]
    pub const fn with_verify_crc(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    /// Read settings from `KEY=VALUE` text.
    ///
    /// # Examples
    ///
    /// ```
    /// use actuator_rtu::config::LinkConfig;
    /// use core::time::Duration;
    ///
    /// let config = LinkConfig::from_key_values("RESPONSE_TIMEOUT_MS=250\nRETRY_ATTEMPTS=1\n");
    /// assert_eq!(config.response_timeout, Duration::from_millis(250));
    /// assert_eq!(config.retry.attempts, 1);
    /// assert!(config.verify_crc);
    /// ```
    pub fn from_key_values(text: &str) -> Self {
        let defaults = Self::new();
        Self {
            response_timeout: millis(text, "RESPONSE_TIMEOUT_MS")
                .unwrap_or(defaults.response_timeout),
            retry: RetryPolicy {
                attempts: parsed(text, "RETRY_ATTEMPTS").unwrap_or(defaults.retry.attempts),
                window: millis(text, "RETRY_WINDOW_MS").unwrap_or(defaults.retry.window),
            },
            verify_crc: flag(text, "VERIFY_CRC").unwrap_or(defaults.verify_crc),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for opening a serial port.
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerialConfig {
    /// OS name of the port (`/dev/ttyUSB0`, `COM3`)
    pub port_name: String,
    /// Link speed
    pub baud_rate: u32,
    /// Default I/O timeout applied when the port is opened
    pub timeout: Duration,
}

#[cfg(feature = "std")]
impl SerialConfig {
    /// Baud rate the drives ship with.
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;
    /// Port timeout used when opening.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
    /// Port name used when none is configured.
    pub const DEFAULT_PORT_NAME: &'static str = "/dev/ttyUSB0";

    /// Default settings for the named port.
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate: Self::DEFAULT_BAUD_RATE,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set the baud rate.
    #[must_use]
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the open-time I/O timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read settings from `KEY=VALUE` text.
    pub fn from_key_values(text: &str) -> Self {
        Self {
            port_name: value(text, "PORT_NAME")
                .unwrap_or(Self::DEFAULT_PORT_NAME)
                .to_owned(),
            baud_rate: parsed(text, "BAUD_RATE").unwrap_or(Self::DEFAULT_BAUD_RATE),
            timeout: millis(text, "TIMEOUT_MS").unwrap_or(Self::DEFAULT_TIMEOUT),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PORT_NAME)
    }
}

// =============================================================================
// KEY=VALUE helpers
// =============================================================================

/// Raw value of `key`, trimmed. The last occurrence wins.
fn value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
}

fn parsed<T: core::str::FromStr>(text: &str, key: &str) -> Option<T> {
    let raw = value(text, key)?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        rtu_log!(warn, "ignoring invalid {} value", key);
    }
    parsed
}

fn millis(text: &str, key: &str) -> Option<Duration> {
    parsed::<u64>(text, key).map(Duration::from_millis)
}

fn flag(text: &str, key: &str) -> Option<bool> {
    match value(text, key)? {
        "1" | "true" | "TRUE" | "yes" | "on" => Some(true),
        "0" | "false" | "FALSE" | "no" | "off" => Some(false),
        _ => {
            rtu_log!(warn, "ignoring invalid {} value", key);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.response_timeout, Duration::from_millis(100));
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.window, Duration::from_millis(1500));
        assert!(config.verify_crc);
        assert_eq!(config, LinkConfig::from_key_values(""));
    }

    #[test]
    fn test_builder() {
        let config = LinkConfig::new()
            .with_response_timeout(Duration::from_millis(20))
            .with_retry(RetryPolicy::NONE)
            .with_verify_crc(false);
        assert_eq!(config.response_timeout, Duration::from_millis(20));
        assert_eq!(config.retry.attempts, 0);
        assert!(!config.verify_crc);
    }

    #[test]
    fn test_from_key_values() {
        let text = "
            # bench rig
            RESPONSE_TIMEOUT_MS = 50
            RETRY_ATTEMPTS=5
            RETRY_WINDOW_MS=200
            VERIFY_CRC=off
            UNRELATED=1
        ";
        let config = LinkConfig::from_key_values(text);
        assert_eq!(config.response_timeout, Duration::from_millis(50));
        assert_eq!(config.retry, RetryPolicy::new(5, Duration::from_millis(200)));
        assert!(!config.verify_crc);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = LinkConfig::from_key_values("RETRY_ATTEMPTS=lots\nVERIFY_CRC=maybe\nRESPONSE_TIMEOUT_MS=-1");
        assert_eq!(config, LinkConfig::default());
    }

    #[test]
    fn test_commented_and_repeated_keys() {
        let config = LinkConfig::from_key_values("#RETRY_ATTEMPTS=9\nRETRY_ATTEMPTS=1\nRETRY_ATTEMPTS=2");
        assert_eq!(config.retry.attempts, 2);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_serial_config() {
        let config = SerialConfig::from_key_values("PORT_NAME=COM3\nBAUD_RATE=9600");
        assert_eq!(config.port_name, "COM3");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout, Duration::from_secs(1));

        let config = SerialConfig::default().with_baud_rate(57_600);
        assert_eq!(config.port_name, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 57_600);
    }
}
