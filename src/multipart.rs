//! Streaming `multipart/form-data` decoding.
//!
//! Plain fields become request arguments.  Parts that carry a filename are never held in memory
//! as a whole, the bytes are handed to the upload handler in slices of at most
//! `ServerConfig::upload_buffer_len` as they are read from the client:
//!
//! ```
//! use solohttp::multipart::{Upload, UploadStatus};
//! use solohttp::server::Server;
//! # use solohttp::server::Connection;
//! # fn register<C: Connection + 'static>(server: &mut Server<C>) {
//!
//! server.on_file_upload(|upload: &Upload<'_>| match upload.status {
//!     UploadStatus::Start => { /* open upload.filename */ }
//!     UploadStatus::Write => { /* append upload.data */ }
//!     UploadStatus::End => { /* close, upload.total_size bytes received */ }
//!     UploadStatus::Aborted => { /* discard the partial file */ }
//! });
//! # }
//! ```

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_io::Read;
use log::{debug, warn};

use crate::ascii::{CR, LF};
use crate::config::ServerConfig;
use crate::header::{ContentDisposition, RequestHeader, split_header_line};
use crate::parser::ParseError;
use crate::request::Argument;
use crate::wire::Wire;

/// Content type assumed for parts that do not declare one
pub const DEFAULT_PART_CONTENT_TYPE: &str = "text/plain";

/// Progress of a file part
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UploadStatus {
    /// A file part begins.  `data` is empty.
    Start,
    /// `data` holds the next slice of file content.
    Write,
    /// The file part is complete.  `data` is empty and `total_size` is final.
    End,
    /// The client stopped sending in the middle of the file part.
    Aborted,
}

/// One upload event handed to the handler registered with `Server::on_file_upload`
#[derive(Debug)]
pub struct Upload<'a> {
    #[allow(missing_docs)]
    pub status: UploadStatus,
    /// Form field name of the part
    pub name: &'a str,
    /// Filename the client supplied
    pub filename: &'a str,
    /// Content-Type of the part
    pub content_type: &'a str,
    /// Bytes of file content delivered so far, this event included
    pub total_size: usize,
    /// File content for `Write` events, empty otherwise
    pub data: &'a [u8],
}

/// Receives upload events while the request is still being read
pub type UploadHandler = Box<dyn FnMut(&Upload<'_>)>;

fn notify(upload: &mut Option<&mut UploadHandler>, event: &Upload<'_>) {
    if let Some(handler) = upload {
        (**handler)(event);
    }
}

/// Reads the multipart body without going past `Content-Length`
struct Multipart<'w, 'c, C: Read> {
    wire: &'w mut Wire<'c, C>,
    remaining: usize,
    /// `\r\n--<boundary>`, which ends every part
    delimiter: Vec<u8>,
}

impl<'w, 'c, C: Read> Multipart<'w, 'c, C> {
    fn next_byte(&mut self) -> Result<u8, ParseError> {
        if self.remaining == 0 {
            return Err(ParseError::ProtocolError(
                "multipart body ended before closing boundary",
            ));
        }
        let b = self.wire.read_byte()?;
        self.remaining -= 1;
        Ok(b)
    }

    fn read_line(&mut self, max_len: usize) -> Result<String, ParseError> {
        let mut line = Vec::new();
        loop {
            match self.next_byte()? {
                LF => break,
                b => {
                    if line.len() == max_len {
                        return Err(ParseError::LimitExceeded("line too long"));
                    }
                    line.push(b);
                }
            }
        }
        if line.last() == Some(&CR) {
            line.pop();
        }
        String::from_utf8(line).map_err(|_| ParseError::ProtocolError("line is not valid utf8"))
    }

    /// Scan content up to the next delimiter, passing it to `sink` in slices of at most
    /// `chunk_len`.  The delimiter itself is consumed.
    fn read_part<F>(&mut self, chunk_len: usize, mut sink: F) -> Result<(), ParseError>
    where
        F: FnMut(&[u8]) -> Result<(), ParseError>,
    {
        let chunk_len = chunk_len.max(1);
        let mut chunk = Vec::with_capacity(chunk_len);
        let mut matched = 0;

        loop {
            let b = self.next_byte()?;

            if b == self.delimiter[matched] {
                matched += 1;
                if matched == self.delimiter.len() {
                    break;
                }
                continue;
            }

            // the delimiter only holds a CR at its start, so a failed partial match can only
            // restart at the current byte
            for i in 0..matched {
                push(&mut chunk, chunk_len, self.delimiter[i], &mut sink)?;
            }
            matched = 0;
            if b == self.delimiter[0] {
                matched = 1;
                continue;
            }
            push(&mut chunk, chunk_len, b, &mut sink)?;
        }

        if !chunk.is_empty() {
            sink(&chunk)?;
        }

        Ok(())
    }

    /// After a delimiter: `--` closes the body, `\r\n` starts another part.  Returns true when
    /// another part follows.
    fn after_delimiter(&mut self) -> Result<bool, ParseError> {
        match [self.next_byte()?, self.next_byte()?] {
            [b'-', b'-'] => {
                // epilogue, normally just a CRLF
                while self.remaining > 0 {
                    self.next_byte()?;
                }
                Ok(false)
            }
            [CR, LF] => Ok(true),
            _ => Err(ParseError::ProtocolError("malformed multipart boundary")),
        }
    }
}

fn push<F>(chunk: &mut Vec<u8>, chunk_len: usize, b: u8, sink: &mut F) -> Result<(), ParseError>
where
    F: FnMut(&[u8]) -> Result<(), ParseError>,
{
    chunk.push(b);
    if chunk.len() == chunk_len {
        sink(chunk)?;
        chunk.clear();
    }
    Ok(())
}

/// Headers of a single part
struct PartHeaders {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
}

fn read_part_headers<C: Read>(
    body: &mut Multipart<'_, '_, C>,
    max_line_len: usize,
) -> Result<PartHeaders, ParseError> {
    let mut disposition: Option<(String, Option<String>)> = None;
    let mut content_type = None;

    loop {
        let line = body.read_line(max_line_len)?;
        if line.is_empty() {
            break;
        }

        let (name, value) = split_header_line(&line)
            .ok_or(ParseError::ProtocolError("malformed multipart header"))?;
        match RequestHeader::try_from((name, value)).map_err(ParseError::ProtocolError)? {
            RequestHeader::ContentDisposition(v) => {
                let cd = ContentDisposition::try_from(v).map_err(ParseError::ProtocolError)?;
                disposition = Some((cd.name.to_string(), cd.filename.map(|f| f.to_string())));
            }
            RequestHeader::ContentType(v) => content_type = Some(v.to_string()),
            _ => {}
        }
    }

    let (name, filename) = disposition.ok_or(ParseError::ProtocolError(
        "multipart part without content-disposition",
    ))?;

    Ok(PartHeaders {
        name,
        filename,
        content_type,
    })
}

/// Decode a multipart body of `content_length` bytes delimited by `boundary`.
pub(crate) fn parse_multipart<C: Read>(
    wire: &mut Wire<'_, C>,
    boundary: &str,
    content_length: usize,
    config: &ServerConfig,
    args: &mut Vec<Argument>,
    mut upload: Option<&mut UploadHandler>,
) -> Result<(), ParseError> {
    let mut delimiter = Vec::with_capacity(boundary.len() + 4);
    delimiter.extend_from_slice(b"\r\n--");
    delimiter.extend_from_slice(boundary.as_bytes());

    let mut body = Multipart {
        wire,
        remaining: content_length,
        delimiter,
    };

    // skip any preamble up to the opening boundary line
    let mut more = loop {
        let line = body.read_line(config.max_line_len)?;
        if let Some(rest) = line.strip_prefix("--")
            && let Some(rest) = rest.strip_prefix(boundary)
        {
            match rest {
                "" => break true,
                "--" => break false,
                _ => {}
            }
        }
    };

    while more {
        let part = read_part_headers(&mut body, config.max_line_len)?;

        match part.filename {
            Some(filename) => {
                let content_type = part
                    .content_type
                    .as_deref()
                    .unwrap_or(DEFAULT_PART_CONTENT_TYPE);
                debug!("upload start: {} ({})", filename, part.name);

                let mut event = Upload {
                    status: UploadStatus::Start,
                    name: &part.name,
                    filename: &filename,
                    content_type,
                    total_size: 0,
                    data: &[],
                };
                notify(&mut upload, &event);

                let mut total = 0usize;
                let res = body.read_part(config.upload_buffer_len, |data| {
                    total += data.len();
                    notify(
                        &mut upload,
                        &Upload {
                            status: UploadStatus::Write,
                            name: &part.name,
                            filename: &filename,
                            content_type,
                            total_size: total,
                            data,
                        },
                    );
                    Ok(())
                });

                event.total_size = total;
                if let Err(e) = res {
                    warn!("upload aborted: {} after {} bytes", filename, total);
                    event.status = UploadStatus::Aborted;
                    notify(&mut upload, &event);
                    return Err(e);
                }

                event.status = UploadStatus::End;
                notify(&mut upload, &event);
                debug!("upload end: {} {} bytes", filename, total);
            }
            None => {
                let mut value = Vec::new();
                body.read_part(config.read_buffer_len, |data| {
                    if value.len() + data.len() > config.max_body_len {
                        return Err(ParseError::LimitExceeded("multipart field too large"));
                    }
                    value.extend_from_slice(data);
                    Ok(())
                })?;

                args.push(Argument {
                    key: part.name,
                    value: String::from_utf8_lossy(&value).into_owned(),
                });
            }
        }

        more = body.after_delimiter()?;
    }

    Ok(())
}
