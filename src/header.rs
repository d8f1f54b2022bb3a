use alloc::string::String;
use alloc::vec::Vec;

use crate::HttpWrite;
use crate::ascii::{CR, LF, atoi};

/// Host
pub const REQ_HEAD_HOST: &str = "Host";
/// Content-Length
pub const REQ_HEAD_CONTENT_LENGTH: &str = "Content-Length";
/// Content-Type
pub const REQ_HEAD_CONTENT_TYPE: &str = "Content-Type";
/// Content-Disposition, only expected on multipart parts
pub const REQ_HEAD_CONTENT_DISPOSITION: &str = "Content-Disposition";
/// Transfer-Encoding
pub const REQ_HEAD_TRANSFER_ENCODING: &str = "Transfer-Encoding";

/// Content-Type
pub const RESP_HEAD_CONTENT_TYPE: &str = "Content-Type";

/// `application/x-www-form-urlencoded`
pub const MIME_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
/// `multipart/form-data`
pub const MIME_MULTIPART_FORM_DATA: &str = "multipart/form-data";
/// `text/html`, the content type sent when a handler does not name one
pub const MIME_TEXT_HTML: &str = "text/html";
/// `text/plain`
pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// The request headers the parser understands.  Everything else is `Other`.
#[allow(missing_docs)]
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RequestHeader<'a> {
    Host(&'a str),
    ContentLength(usize),
    ContentType(&'a str),
    ContentDisposition(&'a str),
    TransferEncoding(&'a str),
    Other(&'a str, &'a str),
}

impl<'a> TryFrom<(&'a str, &'a str)> for RequestHeader<'a> {
    type Error = &'static str;

    fn try_from(value: (&'a str, &'a str)) -> Result<Self, Self::Error> {
        match value.0 {
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_HOST) => Ok(RequestHeader::Host(value.1)),
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_CONTENT_TYPE) => {
                Ok(RequestHeader::ContentType(value.1))
            }
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_CONTENT_DISPOSITION) => {
                Ok(RequestHeader::ContentDisposition(value.1))
            }
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_TRANSFER_ENCODING) => {
                Ok(RequestHeader::TransferEncoding(value.1))
            }
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_CONTENT_LENGTH) => Ok(
                RequestHeader::ContentLength(atoi(value.1.as_bytes()).ok_or("invalid content-length")?),
            ),
            _ => Ok(RequestHeader::Other(value.0, value.1)),
        }
    }
}

/// A response header staged for sending
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HeaderLine {
    pub(crate) name: String,
    pub(crate) value: String,
}

impl HttpWrite for HeaderLine {
    fn write(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(self.name.as_bytes());
        dst.extend_from_slice(": ".as_bytes());
        dst.extend_from_slice(self.value.as_bytes());
        dst.extend_from_slice(&[CR, LF]);
    }
}

/// Split a `name: value` header line, trimming both halves.
pub(crate) fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// True when the media type portion of `content_type` (before any `;`) is `mime`.
pub(crate) fn is_media_type(content_type: &str, mime: &str) -> bool {
    let media = match content_type.split_once(';') {
        Some((m, _)) => m,
        None => content_type,
    };
    media.trim().eq_ignore_ascii_case(mime)
}

/// Look up a `key=value` parameter of a header value such as
/// `multipart/form-data; boundary=xyz` or `form-data; name="f"; filename="a.txt"`.
/// Quoted values are returned without their quotes and may contain `;`.
pub(crate) fn header_param<'a>(value: &'a str, key: &str) -> Option<&'a str> {
    let bytes = value.as_bytes();
    let mut start = 0;
    let mut quoted = false;
    let mut segments_seen = 0;

    for i in 0..=bytes.len() {
        let end_of_segment = i == bytes.len() || (bytes[i] == b';' && !quoted);
        if i < bytes.len() && bytes[i] == b'"' {
            quoted = !quoted;
        }
        if !end_of_segment {
            continue;
        }

        // first segment is the media type / disposition type
        if segments_seen > 0
            && let Some((k, v)) = value[start..i].split_once('=')
            && k.trim().eq_ignore_ascii_case(key)
        {
            let v = v.trim();
            return Some(v.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(v));
        }

        segments_seen += 1;
        start = i + 1;
    }

    None
}

/// `Content-Disposition` of a multipart part
#[derive(Debug, PartialEq)]
pub(crate) struct ContentDisposition<'a> {
    pub(crate) name: &'a str,
    pub(crate) filename: Option<&'a str>,
}

impl<'a> TryFrom<&'a str> for ContentDisposition<'a> {
    type Error = &'static str;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        if !is_media_type(value, "form-data") {
            return Err("multipart part is not form-data");
        }

        Ok(ContentDisposition {
            name: header_param(value, "name").ok_or("multipart part has no name")?,
            filename: header_param(value, "filename"),
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        assert_eq!(
            RequestHeader::try_from(("host", "device.local")),
            Ok(RequestHeader::Host("device.local"))
        );
        assert_eq!(
            RequestHeader::try_from(("CONTENT-LENGTH", "42")),
            Ok(RequestHeader::ContentLength(42))
        );
        assert_eq!(
            RequestHeader::try_from(("Content-Length", "4x2")),
            Err("invalid content-length")
        );
        assert_eq!(
            RequestHeader::try_from(("X-Thing", "1")),
            Ok(RequestHeader::Other("X-Thing", "1"))
        );
    }

    #[test]
    fn test_split_header_line() {
        assert_eq!(split_header_line("Host: a:80"), Some(("Host", "a:80")));
        assert_eq!(split_header_line("X-Empty:"), Some(("X-Empty", "")));
        assert_eq!(split_header_line("no colon here"), None);
        assert_eq!(split_header_line(": value"), None);
    }

    #[test]
    fn test_media_type() {
        assert!(is_media_type(
            "multipart/form-data; boundary=abc",
            MIME_MULTIPART_FORM_DATA
        ));
        assert!(is_media_type(
            "Application/X-WWW-Form-Urlencoded",
            MIME_FORM_URLENCODED
        ));
        assert!(!is_media_type("application/json", MIME_FORM_URLENCODED));
    }

    #[test]
    fn test_header_param() {
        let ct = "multipart/form-data; boundary=----WebKitFormBoundary7MA4YWxk";
        assert_eq!(
            header_param(ct, "boundary"),
            Some("----WebKitFormBoundary7MA4YWxk")
        );
        assert_eq!(header_param("multipart/form-data", "boundary"), None);
        assert_eq!(
            header_param(r#"multipart/form-data; boundary="a;b""#, "boundary"),
            Some("a;b")
        );
        // the media type itself is never a parameter
        assert_eq!(header_param("boundary=x", "boundary"), None);
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            ContentDisposition::try_from(r#"form-data; name="file"; filename="a.txt""#),
            Ok(ContentDisposition {
                name: "file",
                filename: Some("a.txt"),
            })
        );
        assert_eq!(
            ContentDisposition::try_from(r#"form-data; name="ssid""#),
            Ok(ContentDisposition {
                name: "ssid",
                filename: None,
            })
        );
        assert!(ContentDisposition::try_from(r#"attachment; name="x""#).is_err());
        assert!(ContentDisposition::try_from("form-data").is_err());
    }
}
