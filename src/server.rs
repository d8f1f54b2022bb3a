use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_io::{Read, ReadReady, Write};
use log::{debug, warn};

use crate::config::ServerConfig;
use crate::header::MIME_TEXT_PLAIN;
use crate::multipart::{Upload, UploadHandler};
use crate::parser::{ParseError, parse};
use crate::request::{Argument, Method, Request};
use crate::response::Responder;
use crate::router::{Dispatched, RouteMethod, Router};

const BAD_REQUEST: u16 = 400;

/// A client connection.  Reads and writes go through `embedded_io`, `read_ready` reports
/// whether request bytes are waiting.
pub trait Connection: Read + Write + ReadReady {
    /// False once the peer has gone away
    fn is_connected(&mut self) -> bool;
}

/// Source of client connections, typically a listening TCP socket.
pub trait Listener {
    /// Connection type handed out for each client
    type Connection: Connection;

    /// Return a waiting client, without blocking when there is none.
    fn poll_for_connection(&mut self) -> Option<Self::Connection>;

    /// Called between checks while waiting for a client to send its request.  Implementations
    /// may sleep briefly or yield to other work.
    fn idle(&mut self) {
        core::hint::spin_loop();
    }
}

/// Idle polls left before a silent client times out.  `None` never runs out.
struct WaitBudget(Option<u32>);

impl WaitBudget {
    /// Use up one poll.  False once none are left.
    fn take(&mut self) -> bool {
        match &mut self.0 {
            None => true,
            Some(0) => false,
            Some(left) => {
                *left -= 1;
                true
            }
        }
    }
}

/// ServerError is returned by `Server::serve()` and `Server::handle_client()`.  In every case the
/// client has already been dropped; the caller should log it and keep polling.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServerError {
    /// Malformed or unsupported request
    ProtocolError(&'static str),
    /// The client stopped sending before the request was complete
    Incomplete,
    /// A request line, header or body exceeded the configured limits
    LimitExceeded(&'static str),
    /// The client disconnected before sending anything
    Disconnected,
    /// Reading from the client failed
    NetworkError,
    /// The client sent nothing within `ServerConfig::wait_limit` idle polls
    Timeout,
}

impl From<ParseError> for ServerError {
    fn from(value: ParseError) -> Self {
        match value {
            ParseError::ProtocolError(s) => Self::ProtocolError(s),
            ParseError::Incomplete => Self::Incomplete,
            ParseError::LimitExceeded(s) => Self::LimitExceeded(s),
            ParseError::NetworkError => Self::NetworkError,
        }
    }
}

/// Exchange is what a handler gets to work with: read access to the parsed request and a
/// `Responder` for the reply.  It only exists for the duration of one handler call.
pub struct Exchange<'a, C: Write> {
    request: &'a Request,
    responder: Responder<'a, C>,
}

impl<'a, C: Write> Exchange<'a, C> {
    pub(crate) fn new(request: &'a Request, responder: Responder<'a, C>) -> Self {
        Self { request, responder }
    }

    /// The whole parsed request
    pub fn request(&self) -> &'a Request {
        self.request
    }

    #[allow(missing_docs)]
    pub fn method(&self) -> Method {
        self.request.method
    }

    /// Request path without the query string
    pub fn uri(&self) -> &'a str {
        &self.request.path
    }

    /// Value of the first argument named `name`
    pub fn arg(&self, name: &str) -> Option<&'a str> {
        self.request.arg(name)
    }

    /// Value of the argument at `index`
    pub fn arg_at(&self, index: usize) -> Option<&'a str> {
        self.request.arg_at(index)
    }

    /// Name of the argument at `index`
    pub fn arg_name(&self, index: usize) -> Option<&'a str> {
        self.request.arg_name(index)
    }

    /// Number of arguments
    pub fn args(&self) -> usize {
        self.request.args()
    }

    #[allow(missing_docs)]
    pub fn has_arg(&self, name: &str) -> bool {
        self.request.has_arg(name)
    }

    /// All arguments in the order they were parsed
    pub fn arguments(&self) -> &'a [Argument] {
        self.request.arguments()
    }

    /// Value of a header registered with `Server::collect_headers`
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.request.header(name)
    }

    #[allow(missing_docs)]
    pub fn has_header(&self, name: &str) -> bool {
        self.request.has_header(name)
    }

    /// Value of the Host header
    pub fn host_header(&self) -> &'a str {
        &self.request.host
    }

    /// See `Responder::set_header`
    pub fn set_header(&mut self, name: &str, value: &str, first: bool) {
        self.responder.set_header(name, value, first);
    }

    /// See `Responder::send`
    pub fn send(&mut self, code: u16, content_type: Option<&str>, body: impl AsRef<[u8]>) -> usize {
        self.responder.send(code, content_type, body)
    }

    /// See `Responder::send_content`
    pub fn send_content(&mut self, content: impl AsRef<[u8]>) -> usize {
        self.responder.send_content(content)
    }

    /// The underlying responder
    pub fn responder(&mut self) -> &mut Responder<'a, C> {
        &mut self.responder
    }
}

/// Server owns the route table and serves one client per `handle_client()` call.
///
/// ```
/// use solohttp::request::Method;
/// use solohttp::server::{Connection, Server};
///
/// fn routes<C: Connection + 'static>(server: &mut Server<C>) {
///     server.on(Method::GET, "/", |cx| {
///         cx.send(200, None, "<h1>hello</h1>");
///     });
///     server.on(Method::POST, "/led", |cx| {
///         let state = cx.arg("state").unwrap_or("off");
///         cx.set_header("Cache-Control", "no-store", false);
///         cx.send(200, Some("text/plain"), state);
///     });
///     server.on_not_found(|cx| {
///         cx.send(404, Some("text/plain"), "nothing here");
///     });
/// }
/// ```
pub struct Server<C: Connection> {
    config: ServerConfig,
    router: Router<C>,
    upload: Option<UploadHandler>,
    collect: Vec<String>,
}

impl<C: Connection> Default for Server<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connection> Server<C> {
    /// Construct a Server with the default `ServerConfig`
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    #[allow(missing_docs)]
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            upload: None,
            collect: Vec::new(),
        }
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Register `handler` for requests to exactly `path` with `method`, which is a `Method` or
    /// `RouteMethod::Any`.  Routes are tried in registration order and the first match wins.
    /// The handler is expected to `send` a response; if it does not, the client gets nothing
    /// before the connection is dropped.
    pub fn on<F>(&mut self, method: impl Into<RouteMethod>, path: &str, handler: F)
    where
        F: FnMut(&mut Exchange<'_, C>) + 'static,
    {
        self.router.add(method.into(), path, Box::new(handler));
    }

    /// Register `handler` for requests to exactly `path` with any method.
    pub fn on_any<F>(&mut self, path: &str, handler: F)
    where
        F: FnMut(&mut Exchange<'_, C>) + 'static,
    {
        self.on(RouteMethod::Any, path, handler);
    }

    /// Handler for requests no route matches.  Without one the client gets a plain text 404.
    pub fn on_not_found<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Exchange<'_, C>) + 'static,
    {
        self.router.set_not_found(Box::new(handler));
    }

    /// Handler receiving multipart file parts while the request is read.  See the `multipart`
    /// module.
    pub fn on_file_upload<F>(&mut self, handler: F)
    where
        F: FnMut(&Upload<'_>) + 'static,
    {
        self.upload = Some(Box::new(handler));
    }

    /// Request headers to keep for `Exchange::header`.  Others are discarded while parsing.
    /// Replaces any earlier list.
    pub fn collect_headers(&mut self, names: &[&str]) {
        self.collect = names.iter().map(|n| n.to_string()).collect();
    }

    /// Serve the next waiting client, if any.  Returns `Ok(false)` when no client was waiting
    /// and `Ok(true)` once a request has been dispatched.  The connection is dropped before
    /// returning, whatever the outcome.
    pub fn handle_client<L>(&mut self, listener: &mut L) -> Result<bool, ServerError>
    where
        L: Listener<Connection = C>,
    {
        let Some(mut conn) = listener.poll_for_connection() else {
            return Ok(false);
        };
        debug!("new client");

        self.wait_for_request(&mut conn, listener)?;
        self.serve(&mut conn)?;
        Ok(true)
    }

    fn wait_for_request<L>(&self, conn: &mut C, listener: &mut L) -> Result<(), ServerError>
    where
        L: Listener<Connection = C>,
    {
        let mut budget = WaitBudget(self.config.wait_limit);
        loop {
            match conn.read_ready() {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(_) => return Err(ServerError::NetworkError),
            }
            if !conn.is_connected() {
                debug!("client left without sending a request");
                return Err(ServerError::Disconnected);
            }
            if !budget.take() {
                warn!("no request within {:?} polls", self.config.wait_limit);
                return Err(ServerError::Timeout);
            }

            listener.idle();
        }
    }

    /// Read one request from `conn` and dispatch it.  On a parse failure the client gets no
    /// response unless `ServerConfig::reply_bad_request` is set.
    pub fn serve(&mut self, conn: &mut C) -> Result<(), ServerError> {
        let request = match parse(conn, &self.config, &self.collect, self.upload.as_mut()) {
            Ok(request) => request,
            Err(e) => {
                warn!("dropping client: {:?}", e);
                if self.config.reply_bad_request {
                    Responder::new(conn, self.config.download_unit_size).send(
                        BAD_REQUEST,
                        Some(MIME_TEXT_PLAIN),
                        "Bad request",
                    );
                }
                return Err(e.into());
            }
        };

        let mut exchange = Exchange::new(
            &request,
            Responder::new(conn, self.config.download_unit_size),
        );
        if self.router.dispatch(&mut exchange) == Dispatched::DefaultNotFound {
            debug!("sent default not found for {}", request.path);
        }

        Ok(())
    }
}
