//! Inbound direction: segments in, ordered bytes out.
//!
//! The [`TcpReceiver`] is responsible for everything that happens after a
//! segment has been decoded and before the application reads bytes:
//! - Learning the peer's ISN from its SYN.
//! - Translating wrapping sequence numbers into stream offsets.
//! - Feeding payloads to the [`StreamReassembler`].
//! - Computing the ackno and advertised window for outbound segments.
//!
//! It does **not** send anything itself; the caller reads
//! [`ack_number`](TcpReceiver::ack_number) and
//! [`window_size`](TcpReceiver::window_size) when building its next segment.
//!
//! # Offsets
//!
//! ```text
//!  element      SYN    'c'    'a'    't'    FIN
//!  seqno        isn   isn+1  isn+2  isn+3  isn+4
//!  absolute      0      1      2      3      4
//!  stream index  -      0      1      2      -
//! ```

use crate::byte_stream::ByteStream;
use crate::error::Result;
use crate::reassembler::StreamReassembler;
use crate::segment::TcpSegment;
use crate::state::{ReceiverEvent, ReceiverState};
use crate::wrapping::SeqNum;

/// Receive-side state for one direction of a connection.
#[derive(Debug)]
pub struct TcpReceiver {
    reassembler: StreamReassembler,
    capacity: usize,
    /// Peer's initial sequence number, fixed by its SYN.
    isn: Option<SeqNum>,
    state: ReceiverState,
}

impl TcpReceiver {
    /// `capacity` bounds reassembled-but-unread plus out-of-order bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            reassembler: StreamReassembler::new(capacity),
            capacity,
            isn: None,
            state: ReceiverState::Listening,
        }
    }

    /// Process one inbound segment.
    ///
    /// Segments before the SYN, segments claiming the SYN's slot without
    /// the SYN flag, and anything after the stream has fully ended are
    /// dropped silently.
    pub fn segment_received(&mut self, seg: &TcpSegment) {
        let syn = seg.syn();
        let fin = seg.fin();

        let isn = match (self.state, self.isn) {
            (ReceiverState::Listening, _) => {
                if !syn {
                    log::trace!("[receiver] ← seq={} before SYN; dropped", seg.seqno());
                    return;
                }
                self.isn = Some(seg.seqno());
                self.state = self.state.on_event(ReceiverEvent::Syn);
                log::debug!("[receiver] ← SYN isn={}", seg.seqno());
                seg.seqno()
            }
            (_, Some(isn)) => isn,
            (_, None) => return,
        };

        let checkpoint = self.reassembler.assembled_index();
        let absolute = seg.seqno().unwrap(isn, checkpoint);
        if absolute == 0 && !syn {
            log::debug!("[receiver] ← seq={} claims the SYN slot; dropped", seg.seqno());
            return;
        }
        let index = if syn { 0 } else { absolute - 1 };

        match self.state {
            ReceiverState::SynReceived => {
                if fin {
                    self.state = self.state.on_event(ReceiverEvent::Fin);
                    log::debug!("[receiver] ← FIN at stream index {}", index + seg.payload.len() as u64);
                }
                self.reassembler.submit(&seg.payload, index, fin);
            }
            ReceiverState::FinReceived => {
                if !self.reassembler.stream_out().input_ended() {
                    self.reassembler.submit(&seg.payload, index, fin);
                }
            }
            ReceiverState::Listening => {}
        }

        log::trace!(
            "[receiver] ← seq={} len={} assembled={} pending={}",
            seg.seqno(),
            seg.payload.len(),
            self.reassembler.assembled_index(),
            self.reassembler.unassembled_bytes()
        );
    }

    /// The next sequence number expected from the peer, once its SYN is in.
    ///
    /// Counts the SYN, every assembled byte, and the FIN once the whole
    /// stream has been assembled.
    pub fn ack_number(&self) -> Option<SeqNum> {
        let isn = self.isn?;
        let mut absolute = self.reassembler.assembled_index() + 1;
        if self.reassembler.stream_out().input_ended() {
            absolute += 1;
        }
        Some(SeqNum::wrap(absolute, isn))
    }

    /// Bytes the peer may still send beyond the ackno.
    pub fn window_size(&self) -> usize {
        self.capacity - self.reassembler.stream_out().buffered_bytes()
    }

    pub fn unassembled_bytes(&self) -> usize {
        self.reassembler.unassembled_bytes()
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Read-only view of the reassembled stream.
    pub fn stream_out(&self) -> &ByteStream {
        self.reassembler.stream_out()
    }

    // -----------------------------------------------------------------------
    // Application side
    // -----------------------------------------------------------------------
    //
    // Only the reading half of the output stream is exposed: writes and
    // `end_input` belong to the reassembler, driven by the peer.

    pub fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        self.reassembler.stream_out_mut().read(len)
    }

    pub fn peek(&mut self, len: usize) -> Result<Vec<u8>> {
        self.reassembler.stream_out_mut().peek(len)
    }

    pub fn pop(&mut self, len: usize) -> Result<()> {
        self.reassembler.stream_out_mut().pop(len)
    }

    /// Drain every reassembled byte.  Reading opens the advertised window.
    pub fn read_all(&mut self) -> Vec<u8> {
        self.reassembler.stream_out_mut().read_all()
    }
}
