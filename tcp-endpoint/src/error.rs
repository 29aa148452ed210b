//! Error taxonomy shared by the byte stream and the sender/receiver pair.
//!
//! None of these are fatal to the process.  The owning object latches an
//! error flag (or moves into an error state) and leaves its cursors
//! consistent, so the caller can inspect the flag and decide what to do.
//! Stale or duplicated network input is never reported here; it is trimmed
//! or dropped by the component that sees it.

use thiserror::Error;

use crate::state::SenderState;

/// Convenience alias for results carrying a [`TcpError`].
pub type Result<T> = std::result::Result<T, TcpError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TcpError {
    /// A read, peek or pop asked for more bytes than are buffered.
    #[error("byte stream underflow: requested {requested} bytes, {available} available")]
    Underflow { requested: usize, available: usize },

    /// `end_input` was called on a stream whose input had already ended.
    #[error("end of input signalled twice")]
    DoubleEndOfInput,

    /// The sender observed a transition that cannot happen in `state`.
    #[error("state violation in {state}: {reason}")]
    StateViolation {
        state: SenderState,
        reason: &'static str,
    },
}
