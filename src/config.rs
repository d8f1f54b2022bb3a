/// Default maximum bytes handed to a single connection `write` call.  One TCP segment on a
/// typical 1500 byte MTU link.
pub const DOWNLOAD_UNIT_SIZE: usize = 1460;
/// Default maximum bytes delivered in one upload `Write` event.
pub const UPLOAD_BUFFER_LEN: usize = 2048;
/// Default size of the buffer requests are read through.
pub const READ_BUFFER_LEN: usize = 512;
/// Default maximum length of the request line or any header line.
pub const MAX_LINE_LEN: usize = 1024;
/// Default maximum size of a body (or multipart field) held in memory.
pub const MAX_BODY_LEN: usize = 4096;

/// Tunables for a `Server`.  Every field has a sensible default for a small device, so most
/// users will start from `ServerConfig::default()` and override with the `with_*` setters.
///
/// ```
/// use solohttp::config::ServerConfig;
///
/// let config = ServerConfig::default()
///     .with_download_unit_size(512)
///     .with_wait_limit(Some(5_000));
///
/// assert_eq!(config.download_unit_size, 512);
/// assert_eq!(config.wait_limit, Some(5_000));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServerConfig {
    /// Responses are written to the connection in slices no larger than this.
    pub download_unit_size: usize,
    /// File upload data is handed to the upload handler in slices no larger than this.
    pub upload_buffer_len: usize,
    /// Size of the buffer used to read from the connection.
    pub read_buffer_len: usize,
    /// Longest request or header line accepted.
    pub max_line_len: usize,
    /// Largest urlencoded body, plain body or multipart field accepted.
    pub max_body_len: usize,
    /// Number of idle polls to wait for the first request byte before giving up.  `None` waits
    /// for as long as the client stays connected.
    pub wait_limit: Option<u32>,
    /// Reply `400` to requests that fail to parse instead of silently dropping the connection.
    pub reply_bad_request: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            download_unit_size: DOWNLOAD_UNIT_SIZE,
            upload_buffer_len: UPLOAD_BUFFER_LEN,
            read_buffer_len: READ_BUFFER_LEN,
            max_line_len: MAX_LINE_LEN,
            max_body_len: MAX_BODY_LEN,
            wait_limit: None,
            reply_bad_request: false,
        }
    }
}

impl ServerConfig {
    /// Set `download_unit_size`.  Zero is bumped to one.
    pub fn with_download_unit_size(mut self, size: usize) -> Self {
        self.download_unit_size = size.max(1);
        self
    }

    /// Set `upload_buffer_len`.  Zero is bumped to one.
    pub fn with_upload_buffer_len(mut self, len: usize) -> Self {
        self.upload_buffer_len = len.max(1);
        self
    }

    /// Set `read_buffer_len`.  Zero is bumped to one.
    pub fn with_read_buffer_len(mut self, len: usize) -> Self {
        self.read_buffer_len = len.max(1);
        self
    }

    /// Set `max_line_len`
    pub fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }

    /// Set `max_body_len`
    pub fn with_max_body_len(mut self, len: usize) -> Self {
        self.max_body_len = len;
        self
    }

    /// Set `wait_limit`
    pub fn with_wait_limit(mut self, limit: Option<u32>) -> Self {
        self.wait_limit = limit;
        self
    }

    /// Set `reply_bad_request`
    pub fn with_reply_bad_request(mut self, reply: bool) -> Self {
        self.reply_bad_request = reply;
        self
    }
}
