//! Flow-controlled in-memory byte stream.
//!
//! A [`ByteStream`] is a fixed-capacity ring buffer with a writer side and a
//! reader side.  The writer pushes as many bytes as currently fit and later
//! signals [`end_input`](ByteStream::end_input); the reader peeks, pops or
//! reads buffered bytes and learns the stream is finished through
//! [`at_end_of_output`](ByteStream::at_end_of_output).
//!
//! # Invariants
//! - `bytes_read <= bytes_written` and
//!   `bytes_written - bytes_read <= capacity`.
//! - Both cursors only grow; the slot of absolute byte `i` is
//!   `i % capacity`.
//! - A failed read/peek/pop/end_input changes nothing but the error flag.

use crate::error::{Result, TcpError};

/// A bounded in-order byte pipe with an end-of-input marker.
#[derive(Debug, Clone)]
pub struct ByteStream {
    buf: Vec<u8>,
    /// Total bytes ever written (write cursor).
    write_idx: u64,
    /// Total bytes ever consumed (read cursor).
    read_idx: u64,
    input_ended: bool,
    error: bool,
}

impl ByteStream {
    /// Create an empty stream holding at most `capacity` unread bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity],
            write_idx: 0,
            read_idx: 0,
            input_ended: false,
            error: false,
        }
    }

    // -----------------------------------------------------------------------
    // Writer side
    // -----------------------------------------------------------------------

    /// Write as much of `data` as fits; returns the number of bytes accepted.
    ///
    /// Never blocks and never fails.  Once input has ended nothing more is
    /// accepted.
    pub fn write(&mut self, data: &[u8]) -> usize {
        if self.input_ended {
            log::trace!("[stream] write of {} bytes after end of input", data.len());
            return 0;
        }

        let n = data.len().min(self.remaining_capacity());
        if n == 0 {
            return 0;
        }

        let cap = self.buf.len();
        let start = self.slot(self.write_idx);
        let first = n.min(cap - start);
        self.buf[start..start + first].copy_from_slice(&data[..first]);
        self.buf[..n - first].copy_from_slice(&data[first..n]);

        self.write_idx += n as u64;
        n
    }

    /// Signal that no further bytes will be written.
    pub fn end_input(&mut self) -> Result<()> {
        if self.input_ended {
            self.error = true;
            return Err(TcpError::DoubleEndOfInput);
        }
        self.input_ended = true;
        Ok(())
    }

    /// Mark the stream as failed, e.g. after the connection was abandoned.
    pub fn set_error(&mut self) {
        self.error = true;
    }

    // -----------------------------------------------------------------------
    // Reader side
    // -----------------------------------------------------------------------

    /// Copy the next `len` buffered bytes without consuming them.
    pub fn peek(&mut self, len: usize) -> Result<Vec<u8>> {
        self.check_available(len)?;
        Ok(self.copy_out(len))
    }

    /// Discard the next `len` buffered bytes.
    pub fn pop(&mut self, len: usize) -> Result<()> {
        self.check_available(len)?;
        self.read_idx += len as u64;
        Ok(())
    }

    /// Copy and consume the next `len` buffered bytes.
    pub fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        self.check_available(len)?;
        let out = self.copy_out(len);
        self.read_idx += len as u64;
        Ok(out)
    }

    /// Consume everything currently buffered.
    pub fn read_all(&mut self) -> Vec<u8> {
        let len = self.buffered_bytes();
        let out = self.copy_out(len);
        self.read_idx += len as u64;
        out
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.buf.len() - self.buffered_bytes()
    }

    /// Bytes written but not yet read.
    pub fn buffered_bytes(&self) -> usize {
        (self.write_idx - self.read_idx) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.write_idx == self.read_idx
    }

    pub fn bytes_written(&self) -> u64 {
        self.write_idx
    }

    pub fn bytes_read(&self) -> u64 {
        self.read_idx
    }

    pub fn input_ended(&self) -> bool {
        self.input_ended
    }

    /// `true` once input has ended and every written byte has been read.
    pub fn at_end_of_output(&self) -> bool {
        self.input_ended && self.is_empty()
    }

    pub fn error(&self) -> bool {
        self.error
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn check_available(&mut self, requested: usize) -> Result<()> {
        let available = self.buffered_bytes();
        if requested > available {
            self.error = true;
            return Err(TcpError::Underflow {
                requested,
                available,
            });
        }
        Ok(())
    }

    /// Only called with a non-zero capacity: empty buffers never reach here
    /// with a non-zero length.
    fn slot(&self, index: u64) -> usize {
        (index % self.buf.len() as u64) as usize
    }

    /// Copy `len` bytes starting at the read cursor.  `len` must not exceed
    /// the buffered count.
    fn copy_out(&self, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        if len == 0 {
            return out;
        }
        let start = self.slot(self.read_idx);
        let first = len.min(self.buf.len() - start);
        out.extend_from_slice(&self.buf[start..start + first]);
        out.extend_from_slice(&self.buf[..len - first]);
        out
    }
}
