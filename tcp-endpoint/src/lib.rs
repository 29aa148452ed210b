//! `tcp-endpoint`: the sans-I/O core of one TCP endpoint.
//!
//! # Architecture
//!
//! ```text
//!   application writes                      application reads
//!          │                                        ▲
//!  ┌───────▼───────┐                        ┌───────┴───────┐
//!  │  ByteStream   │                        │  ByteStream   │
//!  └───────┬───────┘                        └───────▲───────┘
//!  ┌───────▼───────┐   segments (seqno)     ┌───────┴───────┐
//!  │   TcpSender   │───────────────────────▶│  TcpReceiver  │
//!  │ + timer, FSM  │                        │ + Reassembler │
//!  └───────▲───────┘                        └───────┬───────┘
//!          │          ackno + window                │
//!          └────────────────────────────────────────┘
//! ```
//!
//! Nothing here owns a socket or a clock.  Callers move segments between
//! the two halves (through [`simulator`] in tests), advance time with
//! [`TcpSender::on_tick`], and feed acknowledgments back with
//! [`TcpSender::ack_received`].
//!
//! Each module has a single responsibility:
//! - [`byte_stream`]   bounded ring buffer between producer and consumer
//! - [`reassembler`]   out-of-order substrings into an ordered stream
//! - [`wrapping`]      32-bit sequence numbers ↔ 64-bit absolute offsets
//! - [`receiver`]      inbound segments, ackno and window
//! - [`sender`]        outbound segments, retransmission, zero-window probes
//! - [`state`]         finite-state-machine types for both directions
//! - [`timer`]         tick-driven retransmission timer
//! - [`segment`]       segment type and wire format
//! - [`config`]        tunable parameters and defaults
//! - [`error`]         error taxonomy
//! - [`simulator`]     seeded lossy link for testing

pub mod byte_stream;
pub mod config;
pub mod error;
pub mod reassembler;
pub mod receiver;
pub mod segment;
pub mod sender;
pub mod simulator;
pub mod state;
pub mod timer;
pub mod wrapping;

pub use byte_stream::ByteStream;
pub use config::TcpConfig;
pub use error::{Result, TcpError};
pub use reassembler::StreamReassembler;
pub use receiver::TcpReceiver;
pub use segment::TcpSegment;
pub use sender::TcpSender;
pub use state::{ReceiverState, SenderState};
pub use wrapping::SeqNum;
