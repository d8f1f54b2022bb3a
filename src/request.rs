use alloc::string::String;
use alloc::vec::Vec;

const GET: &[u8] = "GET".as_bytes();
const POST: &[u8] = "POST".as_bytes();
const PUT: &[u8] = "PUT".as_bytes();
const PATCH: &[u8] = "PATCH".as_bytes();
const DELETE: &[u8] = "DELETE".as_bytes();
const OPTIONS: &[u8] = "OPTIONS".as_bytes();
const HEAD: &[u8] = "HEAD".as_bytes();

/// Method such as GET. POST, DELETE etc.
#[non_exhaustive]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    #[allow(missing_docs)]
    GET,
    #[allow(missing_docs)]
    POST,
    #[allow(missing_docs)]
    PUT,
    #[allow(missing_docs)]
    PATCH,
    #[allow(missing_docs)]
    DELETE,
    #[allow(missing_docs)]
    OPTIONS,
    #[allow(missing_docs)]
    HEAD,
}

impl Method {
    /// Methods whose requests carry a body that the parser reads.
    pub fn has_body(self) -> bool {
        matches!(self, Self::POST | Self::PUT | Self::PATCH)
    }
}

impl TryFrom<&[u8]> for Method {
    type Error = &'static str;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value {
            GET => Ok(Self::GET),
            POST => Ok(Self::POST),
            PUT => Ok(Self::PUT),
            PATCH => Ok(Self::PATCH),
            DELETE => Ok(Self::DELETE),
            OPTIONS => Ok(Self::OPTIONS),
            HEAD => Ok(Self::HEAD),
            _ => Err("unknown http method"),
        }
    }
}

/// One decoded key/value pair from the query string, a form body or a multipart field.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    #[allow(missing_docs)]
    pub key: String,
    #[allow(missing_docs)]
    pub value: String,
}

/// Request contains the details of the request parsed from bytes read from the client.  A
/// `Request` only lives for a single request/response cycle.
#[non_exhaustive]
#[derive(Debug)]
pub struct Request {
    /// Method (GET, POST etc) parsed from the request
    pub method: Method,
    /// URL path without the query string e.g. `/index.html`
    pub path: String,
    /// Protocol version from the request line e.g. `HTTP/1.1`
    pub version: String,
    /// Host extracted from the host header
    pub host: String,
    /// Content-Type extracted from the Content-Type header where present
    pub content_type: Option<String>,
    /// Content length extracted from the Content-Length header where present
    pub content_length: Option<usize>,
    pub(crate) args: Vec<Argument>,
    pub(crate) headers: Vec<(String, String)>,
}

impl Request {
    pub(crate) fn new(method: Method, path: String, version: String) -> Self {
        Self {
            method,
            path,
            version,
            host: String::new(),
            content_type: None,
            content_length: None,
            args: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Value of the first argument named `name`
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.key == name)
            .map(|a| a.value.as_str())
    }

    /// Value of the argument at `index`
    pub fn arg_at(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|a| a.value.as_str())
    }

    /// Name of the argument at `index`
    pub fn arg_name(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|a| a.key.as_str())
    }

    /// Number of arguments, duplicates included
    pub fn args(&self) -> usize {
        self.args.len()
    }

    #[allow(missing_docs)]
    pub fn has_arg(&self, name: &str) -> bool {
        self.args.iter().any(|a| a.key == name)
    }

    /// All arguments in the order they appeared: query string first, then the body.
    pub fn arguments(&self) -> &[Argument] {
        &self.args
    }

    /// Value of a collected header.  Only headers registered with
    /// `Server::collect_headers` are retained by the parser.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[allow(missing_docs)]
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }
}
