use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use embedded_io::Read;
use log::trace;

use crate::ascii::{CR, LF};
use crate::parser::ParseError;

/// Buffered reader over the client connection.  Requests are consumed a line or a byte at a
/// time, so reads from the connection are batched through a fixed size buffer.
pub(crate) struct Wire<'c, C: Read> {
    conn: &'c mut C,
    buf: Vec<u8>,
    pos: usize,
    filled: usize,
}

impl<'c, C: Read> Wire<'c, C> {
    pub(crate) fn new(conn: &'c mut C, capacity: usize) -> Self {
        Self {
            conn,
            buf: vec![0u8; capacity.max(1)],
            pos: 0,
            filled: 0,
        }
    }

    fn fill(&mut self) -> Result<(), ParseError> {
        match self.conn.read(&mut self.buf[..]) {
            Ok(0) => Err(ParseError::Incomplete),
            Ok(n) => {
                trace!("read {} bytes from client", n);
                self.pos = 0;
                self.filled = n;
                Ok(())
            }
            Err(_) => Err(ParseError::NetworkError),
        }
    }

    pub(crate) fn read_byte(&mut self) -> Result<u8, ParseError> {
        if self.pos == self.filled {
            self.fill()?;
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Read a `\r\n` (or bare `\n`) terminated line and return it without the terminator.
    pub(crate) fn read_line(&mut self, max_len: usize) -> Result<String, ParseError> {
        let mut line = Vec::new();

        loop {
            match self.read_byte()? {
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

    /// Read exactly `len` bytes
    pub(crate) fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, ParseError> {
        let mut data = Vec::with_capacity(len);

        while data.len() < len {
            if self.pos == self.filled {
                self.fill()?;
            }
            let take = (len - data.len()).min(self.filled - self.pos);
            data.extend_from_slice(&self.buf[self.pos..self.pos + take]);
            self.pos += take;
        }

        Ok(data)
    }
}
