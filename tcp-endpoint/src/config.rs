//! Tunable parameters for one connection direction.
//!
//! Nothing here is read from the environment; callers build a [`TcpConfig`]
//! (usually starting from [`Default`]) and hand it to the sender and
//! receiver constructors.

use crate::wrapping::SeqNum;

/// Default capacity of the inbound and outbound byte streams.
pub const DEFAULT_CAPACITY: usize = 64_000;

/// Largest payload placed in a single segment.
pub const MAX_PAYLOAD_SIZE: usize = 1000;

/// Initial retransmission timeout, in milliseconds.
pub const TIMEOUT_DFLT: u64 = 1000;

/// Consecutive retransmissions tolerated before the caller should give up.
pub const MAX_RETX_ATTEMPTS: u32 = 8;

/// Per-connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpConfig {
    /// Capacity of the receiver's reassembled output stream.
    pub recv_capacity: usize,
    /// Capacity of the sender's outbound stream.
    pub send_capacity: usize,
    /// Initial retransmission timeout (ms).  Reset to this after every ACK
    /// that acknowledges new data.
    pub rt_timeout: u64,
    /// Upper bound on payload bytes per segment.
    pub max_payload_size: usize,
    /// See [`crate::sender::TcpSender::retries_exhausted`].
    pub max_retx_attempts: u32,
    /// Use this ISN instead of drawing one from the caller's RNG.
    pub fixed_isn: Option<SeqNum>,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            recv_capacity: DEFAULT_CAPACITY,
            send_capacity: DEFAULT_CAPACITY,
            rt_timeout: TIMEOUT_DFLT,
            max_payload_size: MAX_PAYLOAD_SIZE,
            max_retx_attempts: MAX_RETX_ATTEMPTS,
            fixed_isn: None,
        }
    }
}
