//! Outbound direction: bytes in, segments out, retransmission on loss.
//!
//! [`TcpSender`] reads the application's outbound [`ByteStream`], cuts it
//! into segments that fit the peer's advertised window, keeps every segment
//! until a cumulative ACK covers it, and resends the oldest one when the
//! retransmission timer expires.  It does **not** touch the network: emitted
//! segments queue up in [`segments_out`](TcpSender::segments_out) for the
//! caller to drain.
//!
//! # Sequence-space layout
//!
//! ```text
//!   bytes_acked          next_seqno            window_right
//!       │                    │                      │
//!  ─────┼────────────────────┼──────────────────────┼──────▶ absolute seqno
//!       │ <── in flight ───▶ │ <──── sendable ────▶ │
//! ```
//!
//! # Zero windows
//!
//! A peer advertising a window of 0 is treated as advertising 1 for the
//! purpose of filling, so exactly one byte (or a bare FIN) goes out as a
//! probe.  While probing, timer expiries retransmit without backing off.

use std::collections::VecDeque;

use rand::Rng;

use crate::byte_stream::ByteStream;
use crate::config::TcpConfig;
use crate::error::TcpError;
use crate::segment::{TcpSegment, MAX_WIRE_PAYLOAD};
use crate::state::{SenderEvent, SenderState};
use crate::timer::RetransmitTimer;
use crate::wrapping::SeqNum;

// ---------------------------------------------------------------------------
// Outstanding
// ---------------------------------------------------------------------------

/// A segment that has been sent but not yet fully acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outstanding {
    /// Absolute sequence number of the segment's first slot.
    pub start: u64,
    pub segment: TcpSegment,
    /// How many times this segment has been transmitted (1 = first send).
    pub tx_count: u32,
}

impl Outstanding {
    /// Absolute sequence number one past the segment's last slot.
    pub fn end(&self) -> u64 {
        self.start + self.segment.length_in_sequence_space() as u64
    }
}

// ---------------------------------------------------------------------------
// TcpSender
// ---------------------------------------------------------------------------

/// Send-side state for one direction of a connection.
#[derive(Debug)]
pub struct TcpSender {
    isn: SeqNum,
    max_payload_size: usize,
    max_retx_attempts: u32,

    stream: ByteStream,
    state: SenderState,
    error: Option<TcpError>,

    /// Segments ready for the caller to put on the wire.
    segments_out: VecDeque<TcpSegment>,
    /// Sent, unacknowledged segments ordered by sequence number.
    outstanding: VecDeque<Outstanding>,

    /// Absolute sequence number of the next slot to send.
    next_seqno: u64,
    /// Absolute ackno: everything before this has been acknowledged.
    bytes_acked: u64,
    /// Absolute sequence number one past the last slot the peer accepts.
    window_right: u64,
    /// The most recent ACK advertised a zero window.
    probing: bool,

    timer: RetransmitTimer,
    consecutive_retransmissions: u32,
}

impl TcpSender {
    /// Create a sender whose stream starts at `isn`.
    ///
    /// `max_payload_size` is capped at what the wire format can carry.
    ///
    /// Until the first ACK arrives the peer is assumed to accept one slot,
    /// which is exactly the SYN.
    pub fn new(config: &TcpConfig, isn: SeqNum) -> Self {
        Self {
            isn,
            max_payload_size: config.max_payload_size.min(MAX_WIRE_PAYLOAD),
            max_retx_attempts: config.max_retx_attempts,
            stream: ByteStream::new(config.send_capacity),
            state: SenderState::Closed,
            error: None,
            segments_out: VecDeque::new(),
            outstanding: VecDeque::new(),
            next_seqno: 0,
            bytes_acked: 0,
            window_right: 1,
            probing: false,
            timer: RetransmitTimer::new(config.rt_timeout),
            consecutive_retransmissions: 0,
        }
    }

    /// Like [`new`](Self::new), taking the ISN from `config.fixed_isn` or
    /// drawing it from `rng`.
    pub fn from_config<R: Rng + ?Sized>(config: &TcpConfig, rng: &mut R) -> Self {
        let isn = config.fixed_isn.unwrap_or_else(|| SeqNum::random(rng));
        Self::new(config, isn)
    }

    // -----------------------------------------------------------------------
    // Transmission
    // -----------------------------------------------------------------------

    /// Send as much as the state and the peer's window allow.
    ///
    /// In `Closed` this emits the SYN; once the SYN is acknowledged it cuts
    /// buffered bytes (and eventually the FIN) into segments.  Call again
    /// after writing to [`stream_in_mut`](Self::stream_in_mut).
    pub fn fill_window(&mut self) {
        match self.state {
            SenderState::Closed => self.send_syn(),
            SenderState::SynAcked => self.send_data(),
            _ => {}
        }
    }

    fn send_syn(&mut self) {
        if self.next_seqno != 0 {
            self.violation("SYN slot already used while closed");
            return;
        }

        // Before the first ACK the peer accepts only the SYN's slot, so a FIN
        // (even for an already finished stream) waits for the SYN's ACK.
        self.transmit(TcpSegment::new(self.isn, true, false, Vec::new()));
        self.state = self.state.on_event(SenderEvent::SynSent);
        log::debug!("[sender] → SYN isn={}", self.isn);
    }

    fn send_data(&mut self) {
        if self.next_seqno == 0 {
            self.violation("transmitting data before the SYN");
            return;
        }

        while self.next_seqno < self.window_right {
            let buffered = self.stream.buffered_bytes();
            if buffered == 0 && !self.stream.input_ended() {
                break;
            }

            let room = (self.window_right - self.next_seqno) as usize;
            let len = buffered.min(room).min(self.max_payload_size);
            // FIN only when it completes the stream and still fits; with
            // "ABC" and a window of 3 the FIN waits for the next opening.
            let fin = self.stream.input_ended() && len == buffered && len < room;
            if len == 0 && !fin {
                break;
            }

            let payload = match self.stream.read(len) {
                Ok(payload) => payload,
                Err(err) => {
                    self.violation_with(err);
                    return;
                }
            };
            let seg = TcpSegment::new(SeqNum::wrap(self.next_seqno, self.isn), false, fin, payload);
            log::trace!(
                "[sender] → DATA seq={} len={}{} in_flight={}",
                seg.seqno(),
                len,
                if fin { " FIN" } else { "" },
                self.bytes_in_flight()
            );
            self.transmit(seg);

            if fin {
                self.state = self.state.on_event(SenderEvent::FinSent);
                log::debug!("[sender] → FIN at {}", self.next_seqno - 1);
                break;
            }
        }
    }

    /// Queue `seg` for the wire and track it until acknowledged.
    fn transmit(&mut self, seg: TcpSegment) {
        let start = self.next_seqno;
        self.next_seqno += seg.length_in_sequence_space() as u64;
        self.segments_out.push_back(seg.clone());
        self.outstanding.push_back(Outstanding {
            start,
            segment: seg,
            tx_count: 1,
        });
        self.timer.start();
    }

    /// Queue a zero-length segment at `next_seqno`.
    ///
    /// It occupies no sequence space, is never retransmitted, and exists so
    /// the caller has something to carry an ACK or window update.
    pub fn send_empty_segment(&mut self) {
        let seqno = SeqNum::wrap(self.next_seqno, self.isn);
        self.segments_out
            .push_back(TcpSegment::new(seqno, false, false, Vec::new()));
    }

    // -----------------------------------------------------------------------
    // Feedback from the peer
    // -----------------------------------------------------------------------

    /// Process an acknowledgment and window advertisement from the peer.
    ///
    /// ACKs before the SYN went out or after a state violation, ACKs for
    /// slots never sent, and ACKs older than the current one are ignored.
    pub fn ack_received(&mut self, ackno: SeqNum, window_size: u16) {
        if matches!(self.state, SenderState::Closed | SenderState::Error) {
            log::trace!("[sender] ← ACK {ackno} in {}; ignored", self.state);
            return;
        }

        let ack = ackno.unwrap(self.isn, self.bytes_acked);
        if ack > self.next_seqno {
            log::debug!("[sender] ← ACK {ackno} beyond next_seqno; ignored");
            return;
        }
        if ack < self.bytes_acked {
            log::trace!("[sender] ← stale ACK {ackno}; ignored");
            return;
        }

        if ack > self.bytes_acked {
            self.bytes_acked = ack;
            self.timer.reset();
            self.consecutive_retransmissions = 0;
        }

        while let Some(front) = self.outstanding.front() {
            if front.end() > ack {
                break;
            }
            if front.segment.syn() {
                self.state = self.state.on_event(SenderEvent::SynAcked);
            }
            if front.segment.fin() {
                self.state = self.state.on_event(SenderEvent::FinAcked);
                log::debug!("[sender] ← ACK of FIN; stream complete");
            }
            self.outstanding.pop_front();
        }

        if self.outstanding.is_empty() {
            self.timer.stop();
        }

        self.probing = window_size == 0;
        self.window_right = ack + u64::from(window_size.max(1));
        log::trace!(
            "[sender] ← ACK ack={ack} win={window_size} in_flight={}",
            self.bytes_in_flight()
        );

        if self.window_right > self.next_seqno {
            self.fill_window();
        }
    }

    /// Advance time by `ms` milliseconds, retransmitting on expiry.
    pub fn on_tick(&mut self, ms: u64) {
        if !self.timer.tick(ms) {
            return;
        }
        let Some(oldest) = self.outstanding.front_mut() else {
            self.timer.stop();
            return;
        };

        oldest.tx_count += 1;
        self.segments_out.push_back(oldest.segment.clone());
        self.consecutive_retransmissions += 1;
        if !self.probing {
            self.timer.back_off();
        }
        log::debug!(
            "[sender] timeout: retransmit seq={} (attempt {}), rto={}",
            oldest.segment.seqno(),
            oldest.tx_count,
            self.timer.rto()
        );
        self.timer.restart();
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    fn violation(&mut self, reason: &'static str) {
        let err = TcpError::StateViolation {
            state: self.state,
            reason,
        };
        self.violation_with(err);
    }

    fn violation_with(&mut self, err: TcpError) {
        log::warn!("[sender] {err}");
        self.state = self.state.on_event(SenderEvent::Violation);
        self.stream.set_error();
        self.error = Some(err);
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Slots sent but not yet acknowledged.
    pub fn bytes_in_flight(&self) -> u64 {
        self.next_seqno - self.bytes_acked
    }

    /// Timer expiries since the last ACK for new data.
    pub fn consecutive_retransmissions(&self) -> u32 {
        self.consecutive_retransmissions
    }

    /// `true` once the caller should give up on the connection.
    pub fn retries_exhausted(&self) -> bool {
        self.consecutive_retransmissions > self.max_retx_attempts
    }

    /// Absolute sequence number of the next slot to send.
    pub fn next_seqno_absolute(&self) -> u64 {
        self.next_seqno
    }

    /// [`next_seqno_absolute`](Self::next_seqno_absolute) as it appears on
    /// the wire.
    pub fn next_seqno(&self) -> SeqNum {
        SeqNum::wrap(self.next_seqno, self.isn)
    }

    /// Absolute ackno of the latest accepted ACK; everything before it has
    /// been acknowledged.
    pub fn bytes_acked(&self) -> u64 {
        self.bytes_acked
    }

    /// Initial sequence number of this direction.
    pub fn isn(&self) -> SeqNum {
        self.isn
    }

    /// Where the outbound direction stands.
    pub fn state(&self) -> SenderState {
        self.state
    }

    /// The violation that moved the sender to [`SenderState::Error`], if any.
    pub fn error(&self) -> Option<&TcpError> {
        self.error.as_ref()
    }

    /// Current retransmission timeout in milliseconds.
    pub fn rto(&self) -> u64 {
        self.timer.rto()
    }

    /// Sent, unacknowledged segments, oldest first.
    pub fn outstanding(&self) -> impl Iterator<Item = &Outstanding> {
        self.outstanding.iter()
    }

    /// Read-only view of the outbound stream.
    pub fn stream_in(&self) -> &ByteStream {
        &self.stream
    }

    /// The application writes outbound bytes here.
    pub fn stream_in_mut(&mut self) -> &mut ByteStream {
        &mut self.stream
    }

    /// Segments waiting to be put on the wire, oldest first.
    pub fn segments_out(&mut self) -> &mut VecDeque<TcpSegment> {
        &mut self.segments_out
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ISN: u32 = 0x7fff_fff0;

    fn sender() -> TcpSender {
        TcpSender::new(&TcpConfig::default(), SeqNum::new(ISN))
    }

    fn sender_with(config: TcpConfig) -> TcpSender {
        TcpSender::new(&config, SeqNum::new(ISN))
    }

    fn ack(n: u64) -> SeqNum {
        SeqNum::wrap(n, SeqNum::new(ISN))
    }

    fn drain(s: &mut TcpSender) -> Vec<TcpSegment> {
        s.segments_out().drain(..).collect()
    }

    /// Send the SYN, have it acknowledged with `window`, drain the SYN.
    fn established(s: &mut TcpSender, window: u16) {
        s.fill_window();
        drain(s);
        s.ack_received(ack(1), window);
        assert_eq!(s.state(), SenderState::SynAcked);
    }

    #[test]
    fn first_fill_sends_syn() {
        let mut s = sender();
        s.fill_window();
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert!(out[0].syn());
        assert!(!out[0].fin());
        assert_eq!(out[0].seqno(), SeqNum::new(ISN));
        assert_eq!(s.state(), SenderState::SynSent);
        assert_eq!(s.bytes_in_flight(), 1);

        // Nothing more until the SYN is acknowledged.
        s.stream_in_mut().write(b"abc");
        s.fill_window();
        assert!(drain(&mut s).is_empty());
    }

    #[test]
    fn from_config_uses_fixed_isn() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let config = TcpConfig {
            fixed_isn: Some(SeqNum::new(77)),
            ..TcpConfig::default()
        };
        let s = TcpSender::from_config(&config, &mut SmallRng::seed_from_u64(1));
        assert_eq!(s.isn(), SeqNum::new(77));
    }

    #[test]
    fn syn_ack_opens_transmission() {
        let mut s = sender();
        s.stream_in_mut().write(b"hello");
        established(&mut s, 1000);

        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, b"hello");
        assert_eq!(out[0].seqno(), ack(1));
        assert_eq!(s.bytes_in_flight(), 5);
    }

    #[test]
    fn segments_respect_max_payload_size() {
        let mut s = sender_with(TcpConfig {
            max_payload_size: 4,
            ..TcpConfig::default()
        });
        s.stream_in_mut().write(b"abcdefghij");
        established(&mut s, 1000);

        let sizes: Vec<usize> = drain(&mut s).iter().map(|seg| seg.payload.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(s.next_seqno_absolute(), 11);
    }

    #[test]
    fn segments_respect_window() {
        let mut s = sender();
        s.stream_in_mut().write(b"abcdefghij");
        established(&mut s, 4);

        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, b"abcd");

        s.ack_received(ack(5), 3);
        let out = drain(&mut s);
        assert_eq!(out[0].payload, b"efg");
        assert_eq!(s.stream_in().buffered_bytes(), 3);
    }

    #[test]
    fn fin_deferred_when_window_exactly_full() {
        let mut s = sender();
        s.stream_in_mut().write(b"ABC");
        s.stream_in_mut().end_input().unwrap();
        established(&mut s, 3);

        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, b"ABC");
        assert!(!out[0].fin());
        assert_eq!(s.state(), SenderState::SynAcked);

        s.ack_received(ack(4), 3);
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert!(out[0].fin());
        assert!(out[0].payload.is_empty());
        assert_eq!(out[0].seqno(), ack(4));
        assert_eq!(s.state(), SenderState::FinSent);

        s.ack_received(ack(5), 3);
        assert_eq!(s.state(), SenderState::FinAcked);
        assert_eq!(s.bytes_in_flight(), 0);
    }

    #[test]
    fn fin_piggybacks_when_room() {
        let mut s = sender();
        s.stream_in_mut().write(b"ABC");
        s.stream_in_mut().end_input().unwrap();
        established(&mut s, 4);

        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert!(out[0].fin());
        assert_eq!(out[0].length_in_sequence_space(), 4);
        assert_eq!(s.state(), SenderState::FinSent);
    }

    #[test]
    fn fin_not_attached_to_a_partial_segment() {
        let mut s = sender_with(TcpConfig {
            max_payload_size: 2,
            ..TcpConfig::default()
        });
        s.stream_in_mut().write(b"abcd");
        s.stream_in_mut().end_input().unwrap();
        established(&mut s, 100);

        let out = drain(&mut s);
        assert_eq!(out.len(), 2);
        assert!(!out[0].fin());
        assert!(out[1].fin());
        assert_eq!(out[1].payload, b"cd");
    }

    #[test]
    fn retransmits_after_rto_and_backs_off() {
        let mut s = sender();
        s.stream_in_mut().write(b"abc");
        established(&mut s, 1000);
        drain(&mut s);

        s.on_tick(999);
        assert!(drain(&mut s).is_empty());

        s.on_tick(2);
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, b"abc");
        assert_eq!(s.rto(), 2000);
        assert_eq!(s.consecutive_retransmissions(), 1);

        s.on_tick(1999);
        assert!(drain(&mut s).is_empty());
        s.on_tick(1);
        assert_eq!(drain(&mut s).len(), 1);
        assert_eq!(s.rto(), 4000);
        assert_eq!(s.consecutive_retransmissions(), 2);
    }

    #[test]
    fn ack_resets_timer_and_counter() {
        let mut s = sender();
        s.stream_in_mut().write(b"abcdef");
        established(&mut s, 3);
        drain(&mut s);

        s.on_tick(1000);
        assert_eq!(s.consecutive_retransmissions(), 1);
        assert_eq!(s.rto(), 2000);

        s.ack_received(ack(4), 3);
        assert_eq!(s.consecutive_retransmissions(), 0);
        assert_eq!(s.rto(), 1000);
        drain(&mut s);

        s.on_tick(999);
        assert!(drain(&mut s).is_empty());
        s.on_tick(1);
        let out = drain(&mut s);
        assert_eq!(out[0].payload, b"def");
    }

    #[test]
    fn syn_is_retransmitted() {
        let mut s = sender();
        s.fill_window();
        drain(&mut s);
        s.on_tick(1000);
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert!(out[0].syn());
    }

    #[test]
    fn timer_stops_when_everything_acked() {
        let mut s = sender();
        s.stream_in_mut().write(b"abc");
        established(&mut s, 1000);
        s.ack_received(ack(4), 1000);
        drain(&mut s);

        s.on_tick(10_000);
        assert!(drain(&mut s).is_empty());
        assert_eq!(s.consecutive_retransmissions(), 0);
    }

    #[test]
    fn ack_for_unsent_data_is_ignored() {
        let mut s = sender();
        s.stream_in_mut().write(b"abc");
        established(&mut s, 1000);

        s.ack_received(ack(100), 1000);
        assert_eq!(s.bytes_acked(), 1);
        assert_eq!(s.bytes_in_flight(), 3);
    }

    #[test]
    fn stale_ack_does_not_shrink_window() {
        let mut s = sender();
        s.stream_in_mut().write(b"abcdef");
        established(&mut s, 3);
        s.ack_received(ack(4), 3);
        drain(&mut s);
        assert_eq!(s.next_seqno_absolute(), 7);

        s.ack_received(ack(1), 0);
        assert_eq!(s.bytes_acked(), 4);
        assert!(drain(&mut s).is_empty());
    }

    #[test]
    fn partial_ack_keeps_segment_outstanding() {
        let mut s = sender();
        s.stream_in_mut().write(b"abcdef");
        established(&mut s, 1000);
        drain(&mut s);

        s.ack_received(ack(3), 1000);
        assert_eq!(s.outstanding().count(), 1);
        assert_eq!(s.bytes_in_flight(), 4);

        s.on_tick(1000);
        let out = drain(&mut s);
        assert_eq!(out[0].payload, b"abcdef");
    }

    #[test]
    fn zero_window_probe() {
        let mut s = sender();
        s.stream_in_mut().write(b"helloxyz");
        established(&mut s, 5);
        assert_eq!(drain(&mut s)[0].payload, b"hello");

        s.ack_received(ack(6), 0);
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, b"x");

        s.on_tick(1000);
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, b"x");
        assert_eq!(s.rto(), 1000);
        assert_eq!(s.consecutive_retransmissions(), 1);

        // The window reopens: the probe byte is acknowledged and the rest flows.
        s.ack_received(ack(7), 10);
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, b"yz");
    }

    #[test]
    fn zero_window_probe_carries_bare_fin() {
        let mut s = sender();
        s.stream_in_mut().write(b"ab");
        s.stream_in_mut().end_input().unwrap();
        established(&mut s, 2);
        drain(&mut s);

        s.ack_received(ack(3), 0);
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert!(out[0].fin());
        assert!(out[0].payload.is_empty());
    }

    #[test]
    fn empty_segment_is_not_tracked() {
        let mut s = sender();
        established(&mut s, 10);
        s.send_empty_segment();
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].length_in_sequence_space(), 0);
        assert_eq!(out[0].seqno(), ack(1));
        assert_eq!(s.outstanding().count(), 0);
        assert_eq!(s.bytes_in_flight(), 0);
    }

    #[test]
    fn retries_exhausted_after_limit() {
        let mut s = sender_with(TcpConfig {
            max_retx_attempts: 2,
            ..TcpConfig::default()
        });
        s.fill_window();
        let mut elapsed = 1000;
        for _ in 0..3 {
            assert!(!s.retries_exhausted());
            s.on_tick(elapsed);
            elapsed *= 2;
        }
        assert_eq!(s.consecutive_retransmissions(), 3);
        assert!(s.retries_exhausted());
    }

    #[test]
    fn ack_wraps_around_isn() {
        let config = TcpConfig::default();
        let isn = SeqNum::new(u32::MAX - 1);
        let mut s = TcpSender::new(&config, isn);
        s.stream_in_mut().write(b"abcd");
        s.fill_window();
        s.ack_received(isn + 1, 100);
        s.segments_out().clear();

        s.ack_received(isn + 5, 100);
        assert_eq!(s.bytes_acked(), 5);
        assert_eq!(s.bytes_in_flight(), 0);
        assert_eq!(s.next_seqno(), SeqNum::new(3));
    }

    #[test]
    fn reused_syn_slot_is_a_violation() {
        let mut s = sender();
        s.next_seqno = 5;
        s.fill_window();
        assert_eq!(s.state(), SenderState::Error);
        assert!(matches!(s.error(), Some(TcpError::StateViolation { .. })));
        assert!(s.stream_in().error());
        assert!(drain(&mut s).is_empty());

        // Absorbing: nothing moves it back.
        s.fill_window();
        s.ack_received(ack(5), 100);
        assert_eq!(s.state(), SenderState::Error);
    }

    #[test]
    fn finished_stream_still_sends_bare_syn() {
        let mut s = sender();
        s.stream_in_mut().end_input().unwrap();
        s.fill_window();
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert!(out[0].syn());
        assert!(!out[0].fin());
        assert_eq!(s.state(), SenderState::SynSent);

        s.ack_received(ack(1), 10);
        let out = drain(&mut s);
        assert_eq!(out.len(), 1);
        assert!(out[0].fin());
        assert_eq!(out[0].seqno(), ack(1));
        assert_eq!(s.state(), SenderState::FinSent);
    }

    #[test]
    fn oversize_payload_setting_is_capped() {
        let mut s = sender_with(TcpConfig {
            max_payload_size: 1 << 20,
            ..TcpConfig::default()
        });
        assert_eq!(s.max_payload_size, MAX_WIRE_PAYLOAD);

        s.stream_in_mut().write(&[1u8; 60_000]);
        established(&mut s, u16::MAX);
        for seg in drain(&mut s) {
            assert!(seg.encode().is_ok());
        }
    }

    #[test]
    fn closed_ack_is_harmless() {
        let mut s = sender();
        s.ack_received(ack(0), 100);
        assert_eq!(s.state(), SenderState::Closed);
        assert!(s.error().is_none());
    }
}
