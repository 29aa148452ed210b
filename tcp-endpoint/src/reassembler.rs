//! Out-of-order substring reassembly.
//!
//! The [`StreamReassembler`] accepts byte ranges tagged with their absolute
//! stream offset, in any order, possibly overlapping and possibly repeated,
//! and writes the contiguous prefix into its output [`ByteStream`] as soon as
//! it becomes available.
//!
//! ```text
//!   bytes_read    index_assembled                  index_assembled
//!       │               │                        + remaining_capacity
//!  ─────┼───────────────┼────────────────────────────────┼──────▶ offset
//!       │ in output,    │  pending (out of order, held   │ dropped
//!       │ unread        │  here until the gap closes)    │
//! ```
//!
//! Pending ranges live in a map keyed by start offset.  Stored ranges never
//! overlap: a new range is trimmed against its neighbours before insertion,
//! and ranges it fully covers are removed in the same call.

use std::collections::BTreeMap;

use crate::byte_stream::ByteStream;

/// Merges out-of-order substrings into an ordered [`ByteStream`].
#[derive(Debug)]
pub struct StreamReassembler {
    output: ByteStream,
    /// Out-of-order ranges: start offset → bytes.
    pending: BTreeMap<u64, Vec<u8>>,
    /// Sum of the lengths of everything in `pending`.
    unassembled: usize,
    /// Offset one past the last byte of the stream, once a range carrying
    /// the end-of-stream mark survived window trimming.
    eof_index: Option<u64>,
}

impl StreamReassembler {
    /// `capacity` bounds unread output plus everything held out of order.
    pub fn new(capacity: usize) -> Self {
        Self {
            output: ByteStream::new(capacity),
            pending: BTreeMap::new(),
            unassembled: 0,
            eof_index: None,
        }
    }

    /// Offer `data`, whose first byte sits at absolute offset `index`.
    ///
    /// `eof` marks `data` as the final piece of the stream.
    pub fn submit(&mut self, data: &[u8], index: u64, eof: bool) {
        let assembled = self.assembled_index();
        let limit = assembled + self.output.remaining_capacity() as u64;
        let end = index + data.len() as u64;

        if eof && end <= limit && self.eof_index.is_none() {
            self.eof_index = Some(end);
        } else if eof && end > limit {
            log::trace!("[reassembler] eof at {end} beyond window edge {limit}; not recorded");
        }

        let start = index.max(assembled);
        let end = end.min(limit);
        if start < end {
            let from = (start - index) as usize;
            let to = (end - index) as usize;
            self.insert(start, &data[from..to]);
        } else if !data.is_empty() {
            log::trace!(
                "[reassembler] drop [{index}, {}) outside [{assembled}, {limit})",
                index + data.len() as u64
            );
        }

        self.flush();
    }

    /// Trim `[start, start + data.len())` against stored ranges and store
    /// what remains, replacing any ranges it fully covers.
    fn insert(&mut self, start: u64, data: &[u8]) {
        let mut lo = start;
        let mut hi = start + data.len() as u64;
        let mut superseded = Vec::new();

        // Only ranges starting before `hi` can touch the new one; the last
        // range starting at or before `lo` is included via the first key.
        let first_key = self
            .pending
            .range(..=lo)
            .next_back()
            .map_or(lo, |(&key, _)| key);

        for (&s, bytes) in self.pending.range(first_key..start + data.len() as u64) {
            let e = s + bytes.len() as u64;
            if s >= hi {
                break;
            }
            if e <= lo {
                continue;
            }
            if s <= lo && e >= hi {
                log::trace!("[reassembler] [{lo}, {hi}) already held in [{s}, {e})");
                return;
            }
            if s <= lo {
                lo = e;
            } else if e <= hi {
                superseded.push(s);
            } else {
                hi = s;
            }
        }

        if lo >= hi {
            return;
        }

        let from = (lo - start) as usize;
        let to = (hi - start) as usize;
        self.unassembled += to - from;
        self.pending.insert(lo, data[from..to].to_vec());

        for key in superseded {
            if let Some(old) = self.pending.remove(&key) {
                self.unassembled -= old.len();
            }
        }
    }

    /// Move every range that now starts at the assembled edge into the
    /// output, then close the output if the final byte has arrived.
    fn flush(&mut self) {
        while let Some(bytes) = self.pending.remove(&self.output.bytes_written()) {
            self.unassembled -= bytes.len();
            let written = self.output.write(&bytes);
            debug_assert_eq!(written, bytes.len(), "pending range exceeded window");
        }

        if self.eof_index == Some(self.assembled_index()) && !self.output.input_ended() {
            log::debug!("[reassembler] end of stream at {}", self.assembled_index());
            // Guarded by `input_ended()` above, so this cannot fail.
            let _ = self.output.end_input();
        }
    }

    /// Bytes held out of order, not yet written to the output.
    pub fn unassembled_bytes(&self) -> usize {
        self.unassembled
    }

    /// Absolute offset of the first byte not yet written to the output.
    pub fn assembled_index(&self) -> u64 {
        self.output.bytes_written()
    }

    /// `true` when nothing is waiting for a gap to close.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// `true` once a range carrying the end-of-stream mark was accepted.
    pub fn saw_eof(&self) -> bool {
        self.eof_index.is_some()
    }

    pub fn stream_out(&self) -> &ByteStream {
        &self.output
    }

    pub fn stream_out_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }
}
