use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_io::Write;
use log::{debug, trace, warn};

use crate::HttpWrite;
use crate::ascii::{AsciiInt, CR, LF, SP};
use crate::header::{HeaderLine, MIME_TEXT_HTML, RESP_HEAD_CONTENT_TYPE};

const HTTP_PROTO: &str = "HTTP/1.1";

/// HTTP status code returned in a response
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCode {
    /// 200 OK
    OK,
    /// 404 Not found
    NotFound,
    /// 500 Fail
    InternalServerError,
    /// Any other code, sent with an empty reason phrase
    Other(u16),
}

impl StatusCode {
    /// Numeric status code
    pub fn code(self) -> u16 {
        match self {
            Self::OK => 200,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
            Self::Other(n) => n,
        }
    }

    /// Reason phrase sent after the code.  Only the codes this server produces itself have one.
    pub fn reason(self) -> &'static str {
        match self {
            Self::OK => "OK",
            Self::NotFound => "Not found",
            Self::InternalServerError => "Fail",
            Self::Other(_) => "",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(value: u16) -> Self {
        match value {
            200 => Self::OK,
            404 => Self::NotFound,
            500 => Self::InternalServerError,
            n => Self::Other(n),
        }
    }
}

impl HttpWrite for StatusCode {
    fn write(&self, dst: &mut Vec<u8>) {
        let code = AsciiInt::from(self.code() as u64);

        dst.extend_from_slice(HTTP_PROTO.as_bytes());
        dst.push(SP);
        dst.extend_from_slice(code.as_bytes());
        dst.push(SP);
        dst.extend_from_slice(self.reason().as_bytes());
        dst.extend_from_slice(&[CR, LF]);
    }
}

/// Responder streams the response for the current request back to the client.  Headers are
/// staged with `set_header` and go out with the next `send`.  Any further content, e.g. a large
/// page produced piece by piece, follows with `send_content`.
pub struct Responder<'a, C: Write> {
    conn: &'a mut C,
    headers: Vec<HeaderLine>,
    unit_size: usize,
}

impl<'a, C: Write> Responder<'a, C> {
    /// Create a responder writing to `conn` in slices of at most `unit_size` bytes.
    pub fn new(conn: &'a mut C, unit_size: usize) -> Self {
        Self {
            conn,
            headers: Vec::new(),
            unit_size: unit_size.max(1),
        }
    }

    /// Stage a header for the next `send`.  With `first` set the header goes in front of those
    /// already staged.
    pub fn set_header(&mut self, name: &str, value: &str, first: bool) {
        let line = HeaderLine {
            name: name.to_string(),
            value: value.to_string(),
        };

        if first {
            self.headers.insert(0, line);
        } else {
            self.headers.push(line);
        }
    }

    /// Headers staged so far, in the order they will be sent
    pub fn pending_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()))
    }

    /// Send a complete response: the status line, `Content-Type` (`text/html` when `None`),
    /// the staged headers, a blank line and `body`.  The staged headers are cleared.  Returns
    /// the number of bytes the connection accepted.
    pub fn send(&mut self, code: u16, content_type: Option<&str>, body: impl AsRef<[u8]>) -> usize {
        let status = StatusCode::from(code);
        let body = body.as_ref();

        self.set_header(
            RESP_HEAD_CONTENT_TYPE,
            content_type.unwrap_or(MIME_TEXT_HTML),
            true,
        );

        let mut response = Vec::new();
        status.write(&mut response);
        for header in self.headers.drain(..) {
            header.write(&mut response);
        }
        response.extend_from_slice(&[CR, LF]);
        response.extend_from_slice(body);

        debug!("send {} with {} byte body", status.code(), body.len());
        self.send_content(&response)
    }

    /// Write `content` to the client in slices of at most the unit size.  If the connection
    /// stops accepting data (a write of zero bytes or an error) the rest is dropped.  Returns
    /// the number of bytes the connection accepted.
    pub fn send_content(&mut self, content: impl AsRef<[u8]>) -> usize {
        let content = content.as_ref();
        let mut sent = 0;

        while sent < content.len() {
            let end = content.len().min(sent + self.unit_size);
            match self.conn.write(&content[sent..end]) {
                Ok(0) | Err(_) => {
                    warn!(
                        "client stopped accepting data, dropped {} of {} bytes",
                        content.len() - sent,
                        content.len()
                    );
                    break;
                }
                Ok(n) => {
                    trace!("wrote {} bytes", n);
                    sent += n;
                }
            }
        }

        if self.conn.flush().is_err() {
            warn!("flush failed");
        }

        sent
    }
}

/// Human readable body of the default not found response
pub(crate) fn not_found_body(path: &str) -> String {
    let mut body = String::from("Not found: ");
    body.push_str(path);
    body
}
