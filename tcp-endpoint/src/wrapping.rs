//! 32-bit wrapping sequence numbers.
//!
//! On the wire every byte of a stream is numbered `isn + offset (mod 2^32)`.
//! Internally the sender and receiver count in absolute 64-bit offsets that
//! never wrap, where offset 0 is the SYN.  [`SeqNum::wrap`] and
//! [`SeqNum::unwrap`] translate between the two.
//!
//! ```text
//!  absolute:  0     1     2    ...   2^32-1   2^32   2^32+1
//!  wrapping: isn  isn+1 isn+2  ...   isn-1    isn    isn+1
//! ```
//!
//! Unwrapping is ambiguous (every `2^32` absolute offsets share one wrapping
//! value), so the caller supplies a *checkpoint*: a recent absolute offset.
//! The candidate closest to the checkpoint wins; on an exact tie the smaller
//! candidate wins.

use std::fmt;
use std::ops::{Add, Sub};

use rand::Rng;

/// Number of distinct wrapping values.
const SPAN: u64 = 1 << 32;

/// A sequence number in the 32-bit wrapping space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SeqNum(u32);

impl SeqNum {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Draw an initial sequence number from a caller-supplied RNG.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen())
    }

    /// Map an absolute offset into the wrapping space anchored at `isn`.
    pub fn wrap(absolute: u64, isn: SeqNum) -> Self {
        // Truncation is the `mod 2^32`.
        isn + absolute as u32
    }

    /// The absolute offset closest to `checkpoint` that wraps to `self`.
    pub fn unwrap(self, isn: SeqNum, checkpoint: u64) -> u64 {
        let offset = u64::from(self.0.wrapping_sub(isn.0));
        if checkpoint <= offset {
            return offset;
        }

        // Largest candidate not above the checkpoint, and the one after it.
        let below = offset + (checkpoint - offset) / SPAN * SPAN;
        match below.checked_add(SPAN) {
            Some(above) if above - checkpoint < checkpoint - below => above,
            _ => below,
        }
    }
}

impl Add<u32> for SeqNum {
    type Output = SeqNum;

    fn add(self, rhs: u32) -> SeqNum {
        SeqNum(self.0.wrapping_add(rhs))
    }
}

/// Signed distance from `rhs` to `self`, taking the shorter way round.
impl Sub for SeqNum {
    type Output = i32;

    fn sub(self, rhs: SeqNum) -> i32 {
        self.0.wrapping_sub(rhs.0) as i32
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
