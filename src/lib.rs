//! # Solohttp
//!
//! `solohttp` is a small single-client HTTP/1.1 server aimed at `no_std` + `alloc` targets such
//! as microcontrollers serving a configuration page.
//!
//! This crate provides:
//!
//! * decoding of HTTP requests including query strings, urlencoded forms and streamed
//!   `multipart/form-data` file uploads.
//! * routing of requests to handlers by method and exact path, first registration wins.
//! * encoding of responses on the "wire", written in bounded slices.
//!
//! This crate does **not** provide:
//!
//! * keep-alive, chunked transfer encoding or HTTPS.
//! * concurrent clients.  One client is served per call and the connection is closed after the
//!   response.
//!
//! ## Basic Use
//!
//! Create a `server::Server`, register handlers with `on()`, `on_any()`, `on_not_found()` and
//! `on_file_upload()`, then call `handle_client()` from the main loop with something that
//! implements `server::Listener`.  Connections implement `server::Connection`, which builds on
//! `embedded_io::{Read, Write, ReadReady}`.
//!
//! ## Example
//!
//! ```
//! use solohttp::request::Method;
//! use solohttp::server::{Connection, Listener, Server};
//! # use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
//! #
//! # struct Socket {
//! #     input: &'static [u8],
//! # }
//! #
//! # impl ErrorType for Socket {
//! #     type Error = ErrorKind;
//! # }
//! #
//! # impl Read for Socket {
//! #     fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
//! #         let n = self.input.len().min(buf.len());
//! #         buf[..n].copy_from_slice(&self.input[..n]);
//! #         self.input = &self.input[n..];
//! #         Ok(n)
//! #     }
//! # }
//! #
//! # impl ReadReady for Socket {
//! #     fn read_ready(&mut self) -> Result<bool, Self::Error> {
//! #         Ok(!self.input.is_empty())
//! #     }
//! # }
//! #
//! # impl Write for Socket {
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
//! #         Ok(buf.len())
//! #     }
//! #
//! #     fn flush(&mut self) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! #
//! # impl Connection for Socket {
//! #     fn is_connected(&mut self) -> bool {
//! #         true
//! #     }
//! # }
//! #
//! # struct Accept(Option<Socket>);
//! #
//! # impl Listener for Accept {
//! #     type Connection = Socket;
//! #
//! #     fn poll_for_connection(&mut self) -> Option<Socket> {
//! #         self.0.take()
//! #     }
//! # }
//! #
//! // Socket implements solohttp::server::Connection and Accept implements
//! // solohttp::server::Listener (not shown).  These would typically wrap the
//! // network stack's TCP listener and sockets.
//! let mut listener = Accept(Some(Socket {
//!     input: b"GET /led?state=on HTTP/1.1\r\nHost: device.local\r\n\r\n",
//! }));
//!
//! let mut server: Server<Socket> = Server::new();
//! server.on(Method::GET, "/", |cx| {
//!     cx.send(200, None, "<html>...</html>");
//! });
//! server.on(Method::GET, "/led", |cx| {
//!     let state = cx.arg("state").unwrap_or("off");
//!     cx.send(200, Some("text/plain"), state);
//! });
//!
//! // called from the main loop
//! match server.handle_client(&mut listener) {
//!     Ok(true) => { /* served a request */ }
//!     Ok(false) => { /* nobody was waiting */ }
//!     Err(_) => { /* the client was dropped, log it and carry on */ }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

mod ascii;
/// Server configuration
pub mod config;
mod form;
/// HTTP Headers
pub mod header;
pub mod multipart;
/// HTTP request parsing
pub mod parser;
/// HTTP Requests
pub mod request;
/// HTTP responses
pub mod response;
/// Request routing
pub mod router;
/// HTTP server
pub mod server;
mod wire;

#[cfg(test)]
mod mock;

use alloc::vec::Vec;

pub(crate) trait HttpWrite {
    fn write(&self, dst: &mut Vec<u8>);
}
