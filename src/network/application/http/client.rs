//! The blocking exchange engine.

use super::config::{MAX_PATH_LEN, is_field_value, is_request_target};
use super::response::MAX_BODY_LEN;
use super::wire::{self, MAX_RESPONSE_HEAD, RequestHead, ResponseHead};
use super::{Config, Error, HeaderSet, Method, Response, Stats};
use crate::network::{Close, Connect, Connection, ErrorKind};
use crate::system::Clock;

/// One outgoing request, minus the target, which comes from the client's
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    /// HTTP method.
    pub method: Method,
    /// Sent as `Content-Type` when present.
    pub content_type: Option<&'a str>,
    /// Request body. Only written for methods that carry one.
    pub body: Option<&'a [u8]>,
    /// Number of body bytes to send. `None` and `Some(0)` send the whole slice.
    pub body_length: Option<usize>,
}

impl<'a> Request<'a> {
    /// A request with no body and no content type.
    pub const fn new(method: Method) -> Self {
        Self {
            method,
            content_type: None,
            body: None,
            body_length: None,
        }
    }

    /// Attaches a body and its content type.
    pub fn with_body(mut self, content_type: &'a str, body: &'a [u8]) -> Self {
        self.content_type = Some(content_type);
        self.body = Some(body);
        self
    }

    /// The bytes that go on the wire after the head.
    fn payload(&self) -> Result<&'a [u8], Error> {
        if !self.method.has_body() {
            return Ok(&[]);
        }
        let body = self.body.unwrap_or(&[]);
        match self.body_length {
            None | Some(0) => Ok(body),
            Some(len) if len > body.len() => Err(Error::InvalidArgument),
            Some(len) => Ok(&body[..len]),
        }
    }
}

#[derive(Debug)]
struct State {
    config: Config,
    headers: HeaderSet,
    stats: Stats,
    started_at_ms: u64,
}

/// Blocking HTTP/1.1 client performing one exchange at a time.
///
/// The client starts uninitialised; every call except [`init`](Client::init)
/// fails with [`Error::InvalidState`] until a valid [`Config`] has been supplied.
/// Each request opens a fresh connection through the connector `N`, and the
/// clock `K` timestamps requests relative to the last `init`.
///
/// ```rust,no_run
/// use hello_iot::network::application::http::{Client, Config};
/// # use hello_iot::network::{Close, Connect, Connection, Read, Write};
/// # use hello_iot::system::Clock;
/// # struct Tcp;
/// # impl Connection for Tcp {}
/// # impl Read for Tcp {
/// #     type Error = ();
/// #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
/// # }
/// # impl Write for Tcp {
/// #     type Error = ();
/// #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
/// #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # impl Close for Tcp {
/// #     type Error = ();
/// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # struct Net;
/// # impl Connect for Net {
/// #     type Connection = Tcp;
/// #     type Error = ();
/// #     fn connect(&mut self, _: &str, _: u16, _: u32) -> Result<Tcp, ()> { Ok(Tcp) }
/// # }
/// # struct Uptime;
/// # impl Clock for Uptime { fn now_ms(&self) -> u64 { 0 } }
///
/// let mut client = Client::new(Net, Uptime);
/// client.init(Config::new("192.168.1.13", 8000)?.with_path("/hello")?)?;
/// client.add_header("X-ESP32-App", "HelloWorld")?;
///
/// let mut response = client.post(None, "text/plain", "ping")?;
/// if response.is_ok_status() {
///     // read response.body() ...
/// }
/// response.release();
/// # Ok::<(), hello_iot::network::application::http::Error>(())
/// ```
#[derive(Debug)]
pub struct Client<N: Connect, K: Clock> {
    connector: N,
    clock: K,
    state: Option<State>,
}

impl<N: Connect, K: Clock> Client<N, K> {
    /// Creates an uninitialised client.
    pub fn new(connector: N, clock: K) -> Self {
        Self {
            connector,
            clock,
            state: None,
        }
    }

    /// Validates and installs `config`, clearing statistics and headers.
    ///
    /// Calling it on an initialised client replaces everything, as if the
    /// client had been deinitialised first.
    pub fn init(&mut self, config: Config) -> Result<(), Error> {
        config.validate()?;

        info!("HTTP Client initialized");
        info!("Target: {}:{}", config.host.as_str(), config.port);
        info!("Default path: {}", config.path.as_str());
        info!("Timeout: {} ms", config.timeout_ms);

        self.state = Some(State {
            config,
            headers: HeaderSet::new(),
            stats: Stats::default(),
            started_at_ms: self.clock.now_ms(),
        });
        Ok(())
    }

    /// `true` between [`init`](Client::init) and [`deinit`](Client::deinit).
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Performs one exchange.
    ///
    /// The request goes to the configured host and port, at `path` if given or
    /// the configured default path otherwise. The stored configuration is never
    /// modified. Blocks until the response has been read or the transport gives
    /// up.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] before `init`.
    /// - [`Error::InvalidArgument`] for a path longer than the configured path
    ///   limit or containing whitespace, a content type containing a line
    ///   break, or a `body_length` beyond the body.
    /// - [`Error::NoMemory`] when a buffer cannot be allocated.
    /// - [`Error::Transport`] for any failure below the status line.
    ///
    /// Once a connection has been attempted, every failure counts in
    /// [`Stats::requests_failed`] and no response is returned.
    pub fn send_request(
        &mut self,
        request: &Request<'_>,
        path: Option<&str>,
    ) -> Result<Response, Error> {
        let Self {
            connector,
            clock,
            state,
        } = self;
        let Some(state) = state.as_mut() else {
            error!("Client not initialized");
            return Err(Error::InvalidState);
        };

        let path = path.unwrap_or(state.config.path.as_str());
        if path.len() > MAX_PATH_LEN || !is_request_target(path) {
            return Err(Error::InvalidArgument);
        }
        if request.content_type.is_some_and(|ct| !is_field_value(ct)) {
            return Err(Error::InvalidArgument);
        }
        let payload = request.payload()?;
        let head = RequestHead {
            method: request.method,
            host: state.config.host.as_str(),
            port: state.config.port,
            path,
            user_agent: state.config.user_agent.as_str(),
            headers: &state.headers,
            content_type: request.content_type,
            content_length: request.method.has_body().then_some(payload.len()),
        }
        .encode()?;

        let started_at_ms = clock.now_ms().saturating_sub(state.started_at_ms);
        match exchange(connector, &state.config, &head, payload, request.method) {
            Ok(response) => {
                state.stats.record_success(
                    response.status_code,
                    started_at_ms,
                    payload.len(),
                    response.body_length(),
                );
                if state.config.enable_logging {
                    info!(
                        "HTTP {} successful - Status: {}, Content-Length: {}",
                        request.method.as_str(),
                        response.status_code,
                        response.content_length
                    );
                }
                Ok(response)
            }
            Err(e) => {
                state.stats.record_failure();
                error!("HTTP {} request failed: {:?}", request.method.as_str(), e);
                Err(e)
            }
        }
    }

    /// Sends a `GET` to `path`, or to the configured path when `None`.
    pub fn get(&mut self, path: Option<&str>) -> Result<Response, Error> {
        self.send_request(&Request::new(Method::Get), path)
    }

    /// Sends `body` as a `POST` to `path`, or to the configured path when `None`.
    ///
    /// An empty body is valid; an empty content type is
    /// [`Error::InvalidArgument`].
    pub fn post(
        &mut self,
        path: Option<&str>,
        content_type: &str,
        body: &str,
    ) -> Result<Response, Error> {
        if content_type.is_empty() {
            return Err(Error::InvalidArgument);
        }
        let request = Request::new(Method::Post).with_body(content_type, body.as_bytes());
        self.send_request(&request, path)
    }

    /// Appends a header to every following request until cleared.
    ///
    /// See [`HeaderSet::add`] for the truncation and capacity rules.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let state = self.state_mut()?;
        state.headers.add(name, value)?;
        if state.config.enable_logging {
            debug!("Added header: {}: {}", name, value);
        }
        Ok(())
    }

    /// Appends an `Authorization: Basic` header.
    pub fn add_basic_auth(&mut self, user: &str, password: &str) -> Result<(), Error> {
        self.state_mut()?.headers.add_basic_auth(user, password)
    }

    /// Removes every custom header.
    pub fn clear_headers(&mut self) -> Result<(), Error> {
        let state = self.state_mut()?;
        state.headers.clear();
        if state.config.enable_logging {
            debug!("Cleared all custom headers");
        }
        Ok(())
    }

    /// Headers currently attached to outgoing requests.
    pub fn headers(&self) -> Result<&HeaderSet, Error> {
        Ok(&self.state()?.headers)
    }

    /// Replaces the configuration, keeping statistics and headers.
    pub fn update_config(&mut self, config: Config) -> Result<(), Error> {
        let state = self.state_mut()?;
        config.validate()?;
        state.config = config;
        info!("Configuration updated");
        Ok(())
    }

    /// The active configuration.
    pub fn config(&self) -> Result<&Config, Error> {
        Ok(&self.state()?.config)
    }

    /// A snapshot of the request counters.
    pub fn stats(&self) -> Result<Stats, Error> {
        Ok(self.state()?.stats)
    }

    /// Zeroes every counter. Configuration and headers are untouched.
    pub fn reset_stats(&mut self) -> Result<(), Error> {
        self.state_mut()?.stats = Stats::default();
        info!("Statistics reset");
        Ok(())
    }

    /// Drops configuration, headers and statistics.
    ///
    /// Responses returned earlier belong to the caller and stay valid.
    pub fn deinit(&mut self) -> Result<(), Error> {
        if self.state.take().is_none() {
            return Err(Error::InvalidState);
        }
        info!("HTTP Client deinitialized");
        Ok(())
    }

    /// The connector requests are sent through.
    pub fn connector(&self) -> &N {
        &self.connector
    }

    /// Mutable access to the connector, e.g. to retarget a mock.
    pub fn connector_mut(&mut self) -> &mut N {
        &mut self.connector
    }

    fn state(&self) -> Result<&State, Error> {
        self.state.as_ref().ok_or(Error::InvalidState)
    }

    fn state_mut(&mut self) -> Result<&mut State, Error> {
        self.state.as_mut().ok_or(Error::InvalidState)
    }
}

/// Connects, runs the exchange and closes the connection whatever the outcome.
fn exchange<N: Connect>(
    connector: &mut N,
    config: &Config,
    head: &str,
    payload: &[u8],
    method: Method,
) -> Result<Response, Error> {
    let mut conn = connector
        .connect(config.host.as_str(), config.port, config.timeout_ms)
        .map_err(|e| e.kind())?;
    let result = transact(&mut conn, head, payload, method);
    // The exchange outcome is already decided; a failing close only loses the socket.
    if let Err(e) = conn.close() {
        debug!("Close after exchange failed: {:?}", e.kind());
    }
    result
}

fn transact<C: Connection>(
    conn: &mut C,
    head: &str,
    payload: &[u8],
    method: Method,
) -> Result<Response, Error> {
    wire::send(conn, head, payload)?;

    let mut buf = [0u8; MAX_RESPONSE_HEAD];
    let (head_len, filled) = wire::read_head(conn, &mut buf)?;
    let parsed = ResponseHead::parse(&buf[..head_len])?;

    let mut response = Response {
        status_code: parsed.status_code,
        content_length: parsed.content_length,
        content_type: parsed.content_type,
        body: None,
    };
    let captured = parsed.content_length > 0 && parsed.content_length < MAX_BODY_LEN;
    if captured && carries_body(method, parsed.status_code) {
        let already = &buf[head_len + 4..filled];
        response.body = Some(wire::read_body(conn, already, parsed.content_length)?);
    }
    Ok(response)
}

/// Whether a response to `method` with `status` can have a body at all.
fn carries_body(method: Method, status: u16) -> bool {
    method != Method::Head && !(100..200).contains(&status) && status != 204 && status != 304
}
