//! # Hello World telemetry client
//!
//! Sends numbered text messages with device statistics to a companion HTTP
//! server on the local network, on top of the [`http`](crate::network::application::http)
//! exchange engine.
//!
//! Each message is a `POST` with a `text/plain; charset=utf-8` body and three
//! headers the server uses to track the device:
//!
//! | Header                    | Value                         |
//! |---------------------------|-------------------------------|
//! | `X-ESP32-Message-Counter` | message number, from 1        |
//! | `X-ESP32-Uptime-MS`       | device uptime in milliseconds |
//! | `X-ESP32-App`             | `HelloWorld`                  |
//!
//! The engine reports any HTTP status as a completed exchange. This module is
//! where status 200 is told apart from everything else: only 200 counts as a
//! delivered message in [`HelloStats`].

use core::fmt::Write as _;
use heapless::String;
use serde::{Deserialize, Serialize};

use crate::network::Connect;
use crate::network::application::http::config::{MAX_HOST_LEN, MAX_PATH_LEN, bounded};
use crate::network::application::http::{Client, Config, Error};
use crate::system::{Clock, Delay};

/// Payload composition.
pub mod message;

pub use message::Snapshot;

/// User agent sent with every message.
pub const USER_AGENT: &str = "ESP32-HelloWorld-App/1.0";
/// Content type of every message.
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Device services the application reads and waits on.
pub trait Platform: Delay {
    /// Milliseconds since boot.
    fn uptime_ms(&self) -> u64;
    /// Free heap in bytes.
    fn free_heap(&self) -> u32;
    /// Lowest free heap seen since boot.
    fn min_free_heap(&self) -> u32;
    /// Heap size in bytes.
    fn total_heap(&self) -> u32;
    /// A random number from the hardware RNG.
    fn random(&mut self) -> u32;
}

/// What to send and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelloConfig {
    /// Server host name or IP address.
    pub target_host: String<MAX_HOST_LEN>,
    /// Server port.
    pub target_port: u16,
    /// Path messages are posted to.
    pub target_path: String<MAX_PATH_LEN>,
    /// Add the heap statistics section.
    pub include_system_info: bool,
    /// Add the random verification section.
    pub include_random_data: bool,
    /// Pause between messages in [`HelloApp::run_periodic`].
    pub message_interval_ms: u32,
}

impl Default for HelloConfig {
    fn default() -> Self {
        Self {
            target_host: bounded("192.168.1.100").unwrap_or_default(),
            target_port: 8000,
            target_path: bounded("/hello").unwrap_or_default(),
            include_system_info: true,
            include_random_data: true,
            message_interval_ms: 5000,
        }
    }
}

impl HelloConfig {
    /// Default configuration aimed at `host:port`.
    pub fn new(host: &str, port: u16) -> Result<Self, Error> {
        Ok(Self {
            target_host: bounded(host)?,
            target_port: port,
            ..Self::default()
        })
    }

    /// Sets the path messages are posted to.
    pub fn with_path(mut self, path: &str) -> Result<Self, Error> {
        self.target_path = bounded(path)?;
        Ok(self)
    }

    /// Parses a configuration from a JSON object; absent fields keep their
    /// defaults. The result is validated like [`HelloApp::new`] validates it.
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        let (config, _) =
            serde_json_core::from_slice::<HelloConfig>(json).map_err(|_| Error::InvalidArgument)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the target can be reached: a non-empty host, a non-zero
    /// port and a usable path.
    pub fn validate(&self) -> Result<(), Error> {
        if self.target_host.is_empty() {
            error!("Target host cannot be empty");
            return Err(Error::InvalidArgument);
        }
        self.http_config()?.validate()
    }

    fn http_config(&self) -> Result<Config, Error> {
        Config::new(&self.target_host, self.target_port)?
            .with_path(&self.target_path)?
            .with_user_agent(USER_AGENT)
            .map(|c| c.with_logging(true))
    }
}

/// Message accounting, as seen by the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloStats {
    /// Messages answered with status 200.
    pub messages_sent: u32,
    /// Messages answered with any other status, or not answered at all.
    pub messages_failed: u32,
    /// Uptime when the last answer arrived.
    pub last_message_time_ms: u64,
    /// Uptime when the last answered message was composed.
    pub uptime_at_last_message_ms: u64,
}

impl HelloStats {
    pub(crate) fn record_answer(&mut self, answered_at_ms: u64, composed_at_ms: u64) {
        self.last_message_time_ms = answered_at_ms;
        self.uptime_at_last_message_ms = composed_at_ms;
    }

    pub(crate) fn record_delivered(&mut self) {
        self.messages_sent = self.messages_sent.saturating_add(1);
    }

    pub(crate) fn record_failed(&mut self) {
        self.messages_failed = self.messages_failed.saturating_add(1);
    }
}

/// Outcome of [`HelloApp::send_demo_sequence`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceReport {
    /// Messages answered with status 200.
    pub delivered: u32,
    /// Messages answered with another status or lost in transport.
    pub failed: u32,
}

/// The Hello World application.
///
/// Owns the HTTP [`Client`] it sends through and the [`Platform`] it reads
/// statistics from. Everything runs on the calling task.
#[derive(Debug)]
pub struct HelloApp<N: Connect, K: Clock, P: Platform> {
    client: Client<N, K>,
    platform: P,
    config: HelloConfig,
    stats: HelloStats,
    message_counter: u32,
}

impl<N: Connect, K: Clock, P: Platform> HelloApp<N, K, P> {
    /// Initialises `client` for `config` and wraps it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty host, a zero port, or a client
    /// configuration that cannot be built from `config`.
    pub fn new(mut client: Client<N, K>, platform: P, config: HelloConfig) -> Result<Self, Error> {
        config.validate()?;
        client.init(config.http_config()?)?;

        info!("Hello World App initialized");
        info!(
            "Target: {}:{}{}",
            config.target_host.as_str(),
            config.target_port,
            config.target_path.as_str()
        );
        info!(
            "System info: {}, Random data: {}",
            enabled(config.include_system_info),
            enabled(config.include_random_data)
        );

        Ok(Self {
            client,
            platform,
            config,
            stats: HelloStats::default(),
            message_counter: 0,
        })
    }

    /// Sends the standard message. Returns the HTTP status.
    pub fn send_message(&mut self) -> Result<u16, Error> {
        self.send_custom_message(None)
    }

    /// Sends a message with `custom` appended. Returns the HTTP status.
    ///
    /// Any status counts as sent from the engine's point of view; here only
    /// 200 is counted in [`HelloStats::messages_sent`].
    pub fn send_custom_message(&mut self, custom: Option<&str>) -> Result<u16, Error> {
        let number = self.next_message_number()?;
        self.deliver(number, custom)
    }

    /// Sends one message, resending it after transport failures.
    ///
    /// Attempt `k` (from 1) that fails in transport is followed by a wait of
    /// `base_delay_ms * k` before the next one. A response with any status ends
    /// the loop. Every attempt is accounted in [`HelloStats`].
    pub fn send_with_retry(
        &mut self,
        custom: Option<&str>,
        max_attempts: u32,
        base_delay_ms: u32,
    ) -> Result<u16, Error> {
        if max_attempts == 0 {
            return Err(Error::InvalidArgument);
        }
        let number = self.next_message_number()?;
        let mut attempt = 1;
        loop {
            match self.deliver(number, custom) {
                Err(Error::Transport(e)) if attempt < max_attempts => {
                    let delay_ms = base_delay_ms.saturating_mul(attempt);
                    warn!(
                        "Message #{} attempt {}/{} failed ({:?}), retrying in {} ms",
                        number,
                        attempt,
                        max_attempts,
                        e,
                        delay_ms
                    );
                    self.platform.delay_ms(delay_ms);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// Sends `count` messages, waiting `base_delay_ms * i` before message `i`
    /// (counting from 0).
    ///
    /// Failed messages do not stop the sequence. Errors other than transport
    /// failures do, and are returned.
    pub fn send_demo_sequence(
        &mut self,
        count: u32,
        base_delay_ms: u32,
    ) -> Result<SequenceReport, Error> {
        if !self.client.is_initialized() {
            return Err(Error::InvalidState);
        }
        if count == 0 {
            return Err(Error::InvalidArgument);
        }

        info!("Starting Hello World demo: {} messages", count);
        let mut report = SequenceReport::default();
        for i in 0..count {
            if i > 0 {
                let delay_ms = base_delay_ms.saturating_mul(i);
                info!("Waiting {} ms before next message...", delay_ms);
                self.platform.delay_ms(delay_ms);
            }

            let mut text: String<64> = String::new();
            let _ = write!(text, "Demo sequence message {} of {}", i + 1, count);
            match self.send_custom_message(Some(text.as_str())) {
                Ok(200) => report.delivered += 1,
                Ok(_) | Err(Error::Transport(_)) => report.failed += 1,
                Err(e) => return Err(e),
            }
        }

        info!(
            "Demo sequence completed: {} delivered, {} failed",
            report.delivered,
            report.failed
        );
        Ok(report)
    }

    /// Sends a message every [`HelloConfig::message_interval_ms`] for as long as
    /// `keep_going` returns `true`.
    ///
    /// `keep_going` is asked before every message. Transport failures are
    /// logged and the loop carries on; any other error ends it.
    pub fn run_periodic(
        &mut self,
        mut keep_going: impl FnMut(&HelloStats) -> bool,
    ) -> Result<(), Error> {
        info!(
            "Auto mode started - sending messages every {} ms",
            self.config.message_interval_ms
        );
        while keep_going(&self.stats) {
            match self.send_message() {
                Ok(_) => {}
                Err(Error::Transport(e)) => error!("Failed to send auto message: {:?}", e),
                Err(e) => return Err(e),
            }
            self.platform.delay_ms(self.config.message_interval_ms);
        }
        info!("Auto mode stopped");
        Ok(())
    }

    /// Retargets the application and its client.
    ///
    /// The client keeps its user agent, timeout and logging settings.
    pub fn update_config(&mut self, config: HelloConfig) -> Result<(), Error> {
        config.validate()?;
        let mut http = self.client.config()?.clone();
        http.host = config.target_host.clone();
        http.port = config.target_port;
        http.path = config.target_path.clone();
        self.client.update_config(http)?;
        self.config = config;
        info!("Configuration updated");
        Ok(())
    }

    /// Application configuration.
    pub fn config(&self) -> &HelloConfig {
        &self.config
    }

    /// Message accounting since start or the last reset.
    pub fn stats(&self) -> Result<HelloStats, Error> {
        if !self.client.is_initialized() {
            return Err(Error::InvalidState);
        }
        Ok(self.stats)
    }

    /// Zeroes the message accounting and restarts numbering at 1.
    pub fn reset_stats(&mut self) -> Result<(), Error> {
        if !self.client.is_initialized() {
            return Err(Error::InvalidState);
        }
        self.stats = HelloStats::default();
        self.message_counter = 0;
        Ok(())
    }

    /// Number of the last message composed.
    pub fn message_count(&self) -> u32 {
        self.message_counter
    }

    /// The HTTP client, e.g. for its request statistics.
    pub fn client(&self) -> &Client<N, K> {
        &self.client
    }

    /// The platform services.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable access to the platform services.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Deinitialises the client and forgets all accounting.
    pub fn deinit(&mut self) -> Result<(), Error> {
        self.client.deinit()?;
        self.stats = HelloStats::default();
        self.message_counter = 0;
        info!("Hello World App deinitialized");
        Ok(())
    }

    fn next_message_number(&mut self) -> Result<u32, Error> {
        if !self.client.is_initialized() {
            error!("App not initialized");
            return Err(Error::InvalidState);
        }
        self.message_counter = self.message_counter.wrapping_add(1);
        Ok(self.message_counter)
    }

    fn deliver(&mut self, number: u32, custom: Option<&str>) -> Result<u16, Error> {
        info!("Sending Hello World message #{}", number);

        let uptime_ms = self.platform.uptime_ms();
        let snapshot = Snapshot {
            number,
            uptime_ms,
            free_heap: self.platform.free_heap(),
            min_free_heap: self.platform.min_free_heap(),
            total_heap: self.platform.total_heap(),
            random: self.platform.random(),
        };
        let body = match message::compose(&self.config, &snapshot, custom) {
            Ok(body) => body,
            Err(e) => {
                self.stats.record_failed();
                return Err(e);
            }
        };

        let mut counter: String<10> = String::new();
        let mut uptime: String<20> = String::new();
        let _ = write!(counter, "{}", number);
        let _ = write!(uptime, "{}", uptime_ms);

        self.client.clear_headers()?;
        self.client.add_header("X-ESP32-Message-Counter", &counter)?;
        self.client.add_header("X-ESP32-Uptime-MS", &uptime)?;
        self.client.add_header("X-ESP32-App", "HelloWorld")?;

        let path = self.config.target_path.as_str();
        match self.client.post(Some(path), CONTENT_TYPE, &body) {
            Ok(mut response) => {
                self.stats.record_answer(self.platform.uptime_ms(), uptime_ms);

                if response.is_ok_status() {
                    info!("Hello World message #{} sent successfully", number);
                    self.stats.record_delivered();
                } else {
                    warn!(
                        "Received response code: {} for message #{}",
                        response.status_code,
                        number
                    );
                    self.stats.record_failed();
                }
                if let Some(text) = response.body_str().filter(|t| !t.is_empty()) {
                    info!("Server response: {}", text);
                }
                response.release();
                Ok(response.status_code)
            }
            Err(e) => {
                error!("Failed to send Hello World message #{}: {:?}", number, e);
                self.stats.record_failed();
                Err(e)
            }
        }
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}
