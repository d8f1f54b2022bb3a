use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_io::Read;
use log::{debug, trace};

use crate::config::ServerConfig;
use crate::form::parse_arguments;
use crate::header::{
    MIME_FORM_URLENCODED, MIME_MULTIPART_FORM_DATA, RequestHeader, header_param, is_media_type,
    split_header_line,
};
use crate::multipart::{UploadHandler, parse_multipart};
use crate::request::{Argument, Method, Request};
use crate::wire::Wire;

const HTTP_PROTO_PREFIX: &str = "HTTP/";
/// Argument name given to a body that is neither urlencoded nor multipart
pub const PLAIN_BODY_ARG: &str = "plain";

/// Errors from reading a request off the wire.  Any of them means the connection should be
/// dropped.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The request is malformed or uses something unsupported
    ProtocolError(&'static str),
    /// The client stopped sending before the request was complete
    Incomplete,
    /// A line or body exceeds the configured limits
    LimitExceeded(&'static str),
    /// Reading from the client failed
    NetworkError,
}

/// Per header-block state that does not end up on the `Request`
#[derive(Default)]
struct HeaderState {
    host_seen: bool,
    transfer_encoding: bool,
}

/// Read one request from `conn`.  Multipart file parts are handed to `upload` as they arrive.
pub(crate) fn parse<C: Read>(
    conn: &mut C,
    config: &ServerConfig,
    collect: &[String],
    upload: Option<&mut UploadHandler>,
) -> Result<Request, ParseError> {
    let mut wire = Wire::new(conn, config.read_buffer_len);

    let line = wire.read_line(config.max_line_len)?;
    let (mut req, query) = parse_request_line(&line)?;
    if let Some(query) = query {
        parse_arguments(query, &mut req.args);
    }

    let mut state = HeaderState::default();
    loop {
        let line = wire.read_line(config.max_line_len)?;
        if line.is_empty() {
            break;
        }
        parse_header_line(&mut req, &line, collect, &mut state)?;
    }

    if !state.host_seen {
        return Err(ParseError::ProtocolError("missing host header"));
    }
    if state.transfer_encoding {
        return Err(ParseError::ProtocolError("unsupported transfer encoding"));
    }

    if req.method.has_body() {
        parse_body(&mut wire, &mut req, config, upload)?;
    }

    debug!(
        "parsed {:?} {} with {} arguments",
        req.method,
        req.path,
        req.args.len()
    );

    Ok(req)
}

/// `METHOD SP URI SP VERSION`.  Returns the request and the raw query string, if any.
fn parse_request_line(line: &str) -> Result<(Request, Option<&str>), ParseError> {
    let mut words = line.split(' ');
    let (Some(method), Some(uri), Some(version), None) =
        (words.next(), words.next(), words.next(), words.next())
    else {
        return Err(ParseError::ProtocolError("malformed http request line"));
    };

    let method = Method::try_from(method.as_bytes()).map_err(ParseError::ProtocolError)?;

    if !version.starts_with(HTTP_PROTO_PREFIX) {
        return Err(ParseError::ProtocolError("malformed http version"));
    }

    let (path, query) = match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    };
    let path = if path.is_empty() { "/" } else { path };

    trace!("request line: {:?} {} {}", method, path, version);

    Ok((
        Request::new(method, path.to_string(), version.to_string()),
        query,
    ))
}

fn parse_header_line(
    req: &mut Request,
    line: &str,
    collect: &[String],
    state: &mut HeaderState,
) -> Result<(), ParseError> {
    let (name, value) =
        split_header_line(line).ok_or(ParseError::ProtocolError("malformed http header"))?;

    if collect.iter().any(|c| c.eq_ignore_ascii_case(name)) {
        req.headers.push((name.to_string(), value.to_string()));
    }

    match RequestHeader::try_from((name, value)).map_err(ParseError::ProtocolError)? {
        RequestHeader::Host(host) => {
            state.host_seen = true;
            req.host = host.to_string();
        }
        RequestHeader::ContentLength(len) => req.content_length = Some(len),
        RequestHeader::ContentType(ct) => req.content_type = Some(ct.to_string()),
        RequestHeader::TransferEncoding(_) => state.transfer_encoding = true,
        _ => {}
    }

    Ok(())
}

fn parse_body<C: Read>(
    wire: &mut Wire<'_, C>,
    req: &mut Request,
    config: &ServerConfig,
    upload: Option<&mut UploadHandler>,
) -> Result<(), ParseError> {
    let len = req
        .content_length
        .ok_or(ParseError::ProtocolError("missing content-length"))?;
    let content_type = req.content_type.clone().unwrap_or_default();

    if is_media_type(&content_type, MIME_MULTIPART_FORM_DATA) {
        let boundary = header_param(&content_type, "boundary")
            .filter(|b| !b.is_empty())
            .ok_or(ParseError::ProtocolError("missing multipart boundary"))?;
        return parse_multipart(wire, boundary, len, config, &mut req.args, upload);
    }

    if len > config.max_body_len {
        return Err(ParseError::LimitExceeded("request body too large"));
    }
    let body = wire.read_exact(len)?;

    if is_media_type(&content_type, MIME_FORM_URLENCODED) {
        parse_arguments(&String::from_utf8_lossy(&body), &mut req.args);
    } else if !body.is_empty() {
        req.args.push(Argument {
            key: PLAIN_BODY_ARG.to_string(),
            value: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    Ok(())
}
