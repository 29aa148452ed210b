//! Finite-state machine types for both directions of a connection.
//!
//! Each side is a small enum plus a pure transition function
//! `(state, event) → state`.  The sender and receiver never assign a state
//! directly; they feed events through `on_event`, so every path into
//! [`SenderState::Error`] is listed here.
//!
//! ```text
//!  receiver:  LISTENING ──SYN──▶ SYN_RECEIVED ──FIN──▶ FIN_RECEIVED
//!
//!  sender:    CLOSED ──SYN sent──▶ SYN_SENT ──SYN acked──▶ SYN_ACKED
//!                                                             │
//!                                                             │ FIN sent
//!                                                             ▼
//!                                  FIN_ACKED ◀──FIN acked── FIN_SENT
//!
//!             any ──violation──▶ ERROR   (absorbing)
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// Receiver
// ---------------------------------------------------------------------------

/// Where the inbound direction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiverState {
    /// No SYN seen yet; the ISN is unknown and no ackno exists.
    #[default]
    Listening,
    /// SYN accepted; data is being reassembled.
    SynReceived,
    /// A FIN has arrived.  Earlier gaps may still be outstanding.
    FinReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverEvent {
    Syn,
    Fin,
}

impl ReceiverState {
    pub fn on_event(self, event: ReceiverEvent) -> Self {
        match (self, event) {
            (Self::Listening, ReceiverEvent::Syn) => Self::SynReceived,
            (Self::SynReceived, ReceiverEvent::Fin) => Self::FinReceived,
            (state, _) => state,
        }
    }
}

impl fmt::Display for ReceiverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

/// Where the outbound direction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SenderState {
    /// Nothing sent yet.
    #[default]
    Closed,
    /// SYN sent, not yet acknowledged.
    SynSent,
    /// SYN acknowledged; the stream is being transmitted.
    SynAcked,
    /// FIN sent (with or after the last data), not yet acknowledged.
    FinSent,
    /// Every byte including FIN has been acknowledged.
    FinAcked,
    /// An impossible transition was observed.  Nothing leaves this state.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderEvent {
    SynSent,
    SynAcked,
    FinSent,
    FinAcked,
    Violation,
}

impl SenderState {
    pub fn on_event(self, event: SenderEvent) -> Self {
        use SenderEvent as E;
        match (self, event) {
            (Self::Error, _) | (_, E::Violation) => Self::Error,
            (Self::Closed, E::SynSent) => Self::SynSent,
            (Self::SynSent, E::SynAcked) => Self::SynAcked,
            (Self::SynAcked, E::FinSent) => Self::FinSent,
            (Self::FinSent, E::FinAcked) => Self::FinAcked,
            (state, _) => state,
        }
    }
}

impl fmt::Display for SenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
