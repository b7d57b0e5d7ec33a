//! Engine configuration.

use heapless::String;
use serde::{Deserialize, Serialize};

use super::Error;

/// Maximum host name length in bytes.
pub const MAX_HOST_LEN: usize = 63;
/// Maximum default path length in bytes.
pub const MAX_PATH_LEN: usize = 127;
/// Maximum User-Agent length in bytes.
pub const MAX_USER_AGENT_LEN: usize = 63;

/// Target and behaviour of an HTTP [`Client`](super::Client).
///
/// The client keeps its own copy; changing a `Config` after handing it over has
/// no effect until it is passed to [`Client::update_config`](super::Client::update_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server host name or IP address.
    pub host: String<MAX_HOST_LEN>,
    /// Server port, 1 to 65535.
    pub port: u16,
    /// Path used when a request does not override it.
    pub path: String<MAX_PATH_LEN>,
    /// Connect and I/O timeout in milliseconds.
    pub timeout_ms: u32,
    /// Value sent in the `User-Agent` header.
    pub user_agent: String<MAX_USER_AGENT_LEN>,
    /// Emit per-request log lines. Failures are logged regardless.
    pub enable_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: bounded("192.168.1.100").unwrap_or_default(),
            port: 80,
            path: bounded("/").unwrap_or_default(),
            timeout_ms: 5000,
            user_agent: bounded("ESP32-HTTP-Client/1.0").unwrap_or_default(),
            enable_logging: true,
        }
    }
}

impl Config {
    /// Default configuration aimed at `host:port`.
    pub fn new(host: &str, port: u16) -> Result<Self, Error> {
        Ok(Self {
            host: bounded(host)?,
            port,
            ..Self::default()
        })
    }

    /// Sets the default request path.
    pub fn with_path(mut self, path: &str) -> Result<Self, Error> {
        self.path = bounded(path)?;
        Ok(self)
    }

    /// Sets the connect and I/O timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self, Error> {
        self.user_agent = bounded(user_agent)?;
        Ok(self)
    }

    /// Enables or disables per-request logging.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Parses a configuration from a JSON object.
    ///
    /// Absent fields keep their defaults. The result is validated the same way
    /// [`Client::init`](super::Client::init) validates it.
    ///
    /// ```
    /// use hello_iot::network::application::http::Config;
    ///
    /// let config = Config::from_json(br#"{"host":"10.0.0.7","port":8000,"path":"/hello"}"#).unwrap();
    /// assert_eq!(config.host.as_str(), "10.0.0.7");
    /// assert_eq!(config.timeout_ms, 5000);
    /// ```
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        let (config, _) =
            serde_json_core::from_slice::<Config>(json).map_err(|_| Error::InvalidArgument)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the engine relies on: a non-empty host, a
    /// non-zero port, and a path and user agent that cannot break the request
    /// head.
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.is_empty() {
            error!("Host cannot be empty");
            return Err(Error::InvalidArgument);
        }
        if self.port == 0 {
            error!("Invalid port number: {}", self.port);
            return Err(Error::InvalidArgument);
        }
        if !is_request_target(&self.path) {
            error!("Invalid path: {}", self.path.as_str());
            return Err(Error::InvalidArgument);
        }
        if !is_field_value(&self.user_agent) {
            error!("Invalid user agent");
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

/// `true` if `path` can stand on the request line: no whitespace or line breaks.
pub(crate) fn is_request_target(path: &str) -> bool {
    !path.contains([' ', '\t', '\r', '\n'])
}

/// `true` if `value` can stand as a header value: no line breaks.
pub(crate) fn is_field_value(value: &str) -> bool {
    !value.contains(['\r', '\n'])
}

/// Copies `s` into a bounded string, failing if it does not fit.
pub(crate) fn bounded<const N: usize>(s: &str) -> Result<String<N>, Error> {
    String::try_from(s).map_err(|_| Error::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_firmware() {
        let config = Config::default();
        assert_eq!(config.host.as_str(), "192.168.1.100");
        assert_eq!(config.port, 80);
        assert_eq!(config.path.as_str(), "/");
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.user_agent.as_str(), "ESP32-HTTP-Client/1.0");
        assert!(config.enable_logging);
    }

    #[test]
    fn builder_rejects_overlong_strings() {
        let long_host = [b'h'; MAX_HOST_LEN + 1];
        let long_host = core::str::from_utf8(&long_host).unwrap();
        assert_eq!(Config::new(long_host, 80), Err(Error::InvalidArgument));

        let long_path = [b'p'; MAX_PATH_LEN + 1];
        let long_path = core::str::from_utf8(&long_path).unwrap();
        let config = Config::new("host", 80).unwrap();
        assert_eq!(config.with_path(long_path), Err(Error::InvalidArgument));
    }

    #[test]
    fn validate_checks_host_and_port() {
        let mut config = Config::new("example.local", 8080).unwrap();
        assert!(config.validate().is_ok());

        config.port = 0;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));

        config.port = 65535;
        config.host.clear();
        assert_eq!(config.validate(), Err(Error::InvalidArgument));
    }

    #[test]
    fn validate_rejects_framing_characters() {
        let config = Config::new("example.local", 8080).unwrap();
        assert_eq!(
            config.clone().with_path("/a b").unwrap().validate(),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            config.clone().with_path("/a\r\nX-Evil: 1").unwrap().validate(),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            config.clone().with_user_agent("ua\r\nX-Evil: 1").unwrap().validate(),
            Err(Error::InvalidArgument)
        );
        assert!(config.with_path("/hello?x=1").unwrap().validate().is_ok());
    }

    #[test]
    fn from_json_fills_defaults_and_validates() {
        let config =
            Config::from_json(br#"{"host":"192.168.1.13","port":8000,"enable_logging":false}"#)
                .unwrap();
        assert_eq!(config.host.as_str(), "192.168.1.13");
        assert_eq!(config.port, 8000);
        assert_eq!(config.path.as_str(), "/");
        assert!(!config.enable_logging);

        assert_eq!(
            Config::from_json(br#"{"host":"","port":8000}"#),
            Err(Error::InvalidArgument)
        );
        assert_eq!(Config::from_json(b"not json"), Err(Error::InvalidArgument));
    }
}
