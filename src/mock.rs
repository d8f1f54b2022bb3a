//! In-memory client connection used by the unit tests.

extern crate std;

use std::cell::RefCell;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};

use crate::server::{Connection, Listener};

pub(crate) struct MockConnection {
    input: Vec<u8>,
    read_pos: usize,
    /// largest slice handed out per `read`
    pub(crate) read_chunk: usize,
    /// everything written, shared so it outlives a connection dropped by the server
    pub(crate) output: Rc<RefCell<Vec<u8>>>,
    /// number of `write` calls made
    pub(crate) writes: usize,
    /// total bytes accepted before every further `write` returns 0
    pub(crate) write_budget: Option<usize>,
    pub(crate) connected: bool,
    /// `read_ready` reports false this many times before reporting true
    pub(crate) not_ready_polls: u32,
    /// every `read` fails
    pub(crate) fail_reads: bool,
    /// every `read_ready` fails
    pub(crate) fail_ready: bool,
    /// `write` calls that succeed before the rest fail
    pub(crate) fail_write_after: Option<usize>,
}

impl MockConnection {
    pub(crate) fn new(input: Vec<u8>) -> Self {
        Self {
            input,
            read_pos: 0,
            read_chunk: usize::MAX,
            output: Rc::new(RefCell::new(Vec::new())),
            writes: 0,
            write_budget: None,
            connected: true,
            not_ready_polls: 0,
            fail_reads: false,
            fail_ready: false,
            fail_write_after: None,
        }
    }

    pub(crate) fn output(&self) -> Vec<u8> {
        self.output.borrow().clone()
    }

    pub(crate) fn output_str(&self) -> String {
        String::from_utf8(self.output()).unwrap()
    }
}

impl ErrorType for MockConnection {
    type Error = ErrorKind;
}

impl Read for MockConnection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(ErrorKind::ConnectionReset);
        }
        let remaining = &self.input[self.read_pos..];
        let n = remaining.len().min(buf.len()).min(self.read_chunk);
        buf[..n].copy_from_slice(&remaining[..n]);
        self.read_pos += n;
        Ok(n)
    }
}

impl ReadReady for MockConnection {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        if self.fail_ready {
            return Err(ErrorKind::Other);
        }
        if self.not_ready_polls > 0 {
            self.not_ready_polls -= 1;
            return Ok(false);
        }
        Ok(self.read_pos < self.input.len())
    }
}

impl Write for MockConnection {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.writes += 1;
        if let Some(after) = self.fail_write_after
            && self.writes > after
        {
            return Err(ErrorKind::ConnectionReset);
        }

        let n = match self.write_budget {
            Some(budget) => {
                let n = budget.min(buf.len());
                self.write_budget = Some(budget - n);
                n
            }
            None => buf.len(),
        };

        self.output.borrow_mut().extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for MockConnection {
    fn is_connected(&mut self) -> bool {
        self.connected
    }
}

/// Hands out the queued connections one per poll.
pub(crate) struct MockListener {
    pub(crate) pending: Vec<MockConnection>,
    pub(crate) idles: u32,
}

impl MockListener {
    pub(crate) fn new(pending: Vec<MockConnection>) -> Self {
        Self { pending, idles: 0 }
    }
}

impl Listener for MockListener {
    type Connection = MockConnection;

    fn poll_for_connection(&mut self) -> Option<Self::Connection> {
        if self.pending.is_empty() {
            return None;
        }
        Some(self.pending.remove(0))
    }

    fn idle(&mut self) {
        self.idles += 1;
    }
}
