//! Segments and their wire format.
//!
//! A [`TcpSegment`] is the unit the sender emits and the receiver consumes.
//! The sender only fills in `seqno`, SYN, FIN and the payload; the caller
//! gluing both directions together stamps `ackno`, ACK and `window` from its
//! receiver before the segment goes out.
//!
//! [`TcpSegment::encode`] and [`TcpSegment::decode`] are pure; no I/O
//! happens here.
//!
//! # Wire format
//!
//! All multi-byte integers are **big-endian**.
//!
//! ```text
//!  0               1               2               3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        Sequence Number                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Acknowledgment Number                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Flags     |            Window Size        |               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+               +
//! |         Payload Length        |            Checksum           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        Payload ...                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use thiserror::Error;

use crate::wrapping::SeqNum;

/// Bit-flag constants for the `flags` header field.
pub mod flags {
    pub const SYN: u8 = 0b0000_0001;
    pub const ACK: u8 = 0b0000_0010;
    pub const FIN: u8 = 0b0000_0100;
    pub const RST: u8 = 0b0000_1000;
}

/// Byte length of the fixed-size header on the wire.
/// seq(4) + ack(4) + flags(1) + window(2) + payload_len(2) + checksum(2)
pub const HEADER_LEN: usize = 15;

/// Largest payload the 16-bit `payload_len` field can describe.
pub const MAX_WIRE_PAYLOAD: usize = u16::MAX as usize;

const OFF_SEQ: usize = 0;
const OFF_ACK: usize = 4;
const OFF_FLAGS: usize = 8;
const OFF_WINDOW: usize = 9;
const OFF_PAYLOAD_LEN: usize = 11;
const OFF_CHECKSUM: usize = 13;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Sequence number of the first slot this segment occupies (the SYN if
    /// present, otherwise the first payload byte or the FIN).
    pub seqno: SeqNum,
    /// Next sequence number expected from the peer.  Meaningful only with
    /// [`flags::ACK`].
    pub ackno: SeqNum,
    /// Bitmask of [`flags`] constants.
    pub flags: u8,
    /// Advertised receive window in bytes.
    pub window: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcpSegment {
    pub header: Header,
    pub payload: Vec<u8>,
}

impl TcpSegment {
    /// A segment carrying stream data and/or control flags.
    pub fn new(seqno: SeqNum, syn: bool, fin: bool, payload: Vec<u8>) -> Self {
        let mut bits = 0;
        if syn {
            bits |= flags::SYN;
        }
        if fin {
            bits |= flags::FIN;
        }
        Self {
            header: Header {
                seqno,
                flags: bits,
                ..Header::default()
            },
            payload,
        }
    }

    /// Stamp an acknowledgment and window onto this segment.
    pub fn with_ack(mut self, ackno: SeqNum, window: u16) -> Self {
        self.header.ackno = ackno;
        self.header.window = window;
        self.header.flags |= flags::ACK;
        self
    }

    pub fn seqno(&self) -> SeqNum {
        self.header.seqno
    }

    pub fn syn(&self) -> bool {
        self.header.flags & flags::SYN != 0
    }

    pub fn fin(&self) -> bool {
        self.header.flags & flags::FIN != 0
    }

    pub fn ack(&self) -> bool {
        self.header.flags & flags::ACK != 0
    }

    pub fn rst(&self) -> bool {
        self.header.flags & flags::RST != 0
    }

    /// Slots consumed in sequence space: payload bytes plus one each for
    /// SYN and FIN.
    pub fn length_in_sequence_space(&self) -> usize {
        self.payload.len() + usize::from(self.syn()) + usize::from(self.fin())
    }

    /// Serialise into a newly allocated buffer; the checksum is computed
    /// last over the whole datagram.
    ///
    /// Fails when the payload is longer than [`MAX_WIRE_PAYLOAD`].
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let payload_len = self.payload.len();
        let Ok(wire_len) = u16::try_from(payload_len) else {
            return Err(EncodeError::PayloadTooLarge { len: payload_len });
        };
        let mut buf = vec![0u8; HEADER_LEN + payload_len];

        buf[OFF_SEQ..OFF_SEQ + 4].copy_from_slice(&self.header.seqno.raw().to_be_bytes());
        buf[OFF_ACK..OFF_ACK + 4].copy_from_slice(&self.header.ackno.raw().to_be_bytes());
        buf[OFF_FLAGS] = self.header.flags;
        buf[OFF_WINDOW..OFF_WINDOW + 2].copy_from_slice(&self.header.window.to_be_bytes());
        buf[OFF_PAYLOAD_LEN..OFF_PAYLOAD_LEN + 2]
            .copy_from_slice(&wire_len.to_be_bytes());
        buf[HEADER_LEN..].copy_from_slice(&self.payload);

        let csum = internet_checksum(&buf);
        buf[OFF_CHECKSUM..OFF_CHECKSUM + 2].copy_from_slice(&csum.to_be_bytes());
        Ok(buf)
    }

    /// Parse a datagram produced by [`encode`](Self::encode).
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::BufferTooShort);
        }

        let seqno = read_u32(buf, OFF_SEQ);
        let ackno = read_u32(buf, OFF_ACK);
        let window = read_u16(buf, OFF_WINDOW);
        let payload_len = read_u16(buf, OFF_PAYLOAD_LEN);
        let checksum = read_u16(buf, OFF_CHECKSUM);

        if buf.len() != HEADER_LEN + payload_len as usize {
            return Err(DecodeError::LengthMismatch);
        }

        let mut scratch = buf.to_vec();
        scratch[OFF_CHECKSUM..OFF_CHECKSUM + 2].fill(0);
        if internet_checksum(&scratch) != checksum {
            return Err(DecodeError::ChecksumFailed);
        }

        Ok(Self {
            header: Header {
                seqno: SeqNum::new(seqno),
                ackno: SeqNum::new(ackno),
                flags: buf[OFF_FLAGS],
                window,
            },
            payload: buf[HEADER_LEN..].to_vec(),
        })
    }
}

/// Errors that can arise when serialising a segment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("payload of {len} bytes does not fit the 16-bit length field")]
    PayloadTooLarge { len: usize },
}

/// Errors that can arise when parsing a raw datagram.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer too short to contain a header")]
    BufferTooShort,
    #[error("payload_len field does not match remaining bytes")]
    LengthMismatch,
    #[error("checksum verification failed")]
    ChecksumFailed,
}

fn read_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn read_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([buf[off], buf[off + 1]])
}

/// Internet checksum (RFC 1071) over `data`.
///
/// The checksum field inside `data` must be zero.
fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
    }
    // Odd trailing byte, padded with zero on the right.
    if let [last] = words.remainder() {
        sum += u32::from(*last) << 8;
    }

    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}
