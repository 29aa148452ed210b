//! Fault-injecting link for deterministic testing.
//!
//! Real networks drop, reorder, duplicate and corrupt datagrams.  To exercise
//! the reliability mechanisms without a real network, a [`Simulator`] stands
//! in for one direction of the wire: segments go in through
//! [`transmit`](Simulator::transmit), are encoded, suffer the configured
//! faults, and come out of [`deliver`](Simulator::deliver) decoded.
//!
//! | Fault        | Description                                          |
//! |--------------|------------------------------------------------------|
//! | Loss         | Drop a datagram with probability `loss_rate`.        |
//! | Reordering   | Queue a datagram ahead of an earlier one.            |
//! | Duplication  | Queue a datagram twice.                              |
//! | Corruption   | Flip one bit; the checksum rejects it on delivery.   |
//!
//! All randomness comes from a [`SmallRng`] seeded with
//! [`SimulatorConfig::seed`], so a failing run replays exactly.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::segment::TcpSegment;

/// Configuration for the fault model.
///
/// All probabilities are in the range `[0.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Probability that a datagram is silently dropped.
    pub loss_rate: f64,
    /// Probability that a datagram overtakes the one queued before it.
    pub reorder_rate: f64,
    /// Probability that a datagram is queued twice.
    pub duplicate_rate: f64,
    /// Probability that one bit of a datagram is flipped.
    pub corrupt_rate: f64,
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        // No faults: a transparent pass-through.
        Self {
            loss_rate: 0.0,
            reorder_rate: 0.0,
            duplicate_rate: 0.0,
            corrupt_rate: 0.0,
            seed: 0,
        }
    }
}

/// Counters for what the link did to the traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub sent: u64,
    pub dropped: u64,
    pub duplicated: u64,
    pub reordered: u64,
    pub corrupted: u64,
    /// Datagrams that failed to decode on delivery.
    pub rejected: u64,
    pub delivered: u64,
}

/// One direction of a lossy link.
#[derive(Debug)]
pub struct Simulator {
    config: SimulatorConfig,
    rng: SmallRng,
    /// Encoded datagrams in delivery order.
    in_flight: VecDeque<Vec<u8>>,
    stats: LinkStats,
}

impl Simulator {
    /// A link with an empty wire, its RNG seeded from `config.seed`.
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            in_flight: VecDeque::new(),
            stats: LinkStats::default(),
        }
    }

    /// Put `seg` on the wire, applying the fault model.
    pub fn transmit(&mut self, seg: &TcpSegment) {
        self.stats.sent += 1;

        if self.rng.gen_bool(self.config.loss_rate) {
            self.stats.dropped += 1;
            log::trace!("[link] drop seq={}", seg.seqno());
            return;
        }

        let mut datagram = match seg.encode() {
            Ok(datagram) => datagram,
            Err(err) => {
                self.stats.dropped += 1;
                log::warn!("[link] cannot encode seq={}: {err}", seg.seqno());
                return;
            }
        };
        if self.rng.gen_bool(self.config.corrupt_rate) {
            let bit = self.rng.gen_range(0..datagram.len() * 8);
            datagram[bit / 8] ^= 1 << (bit % 8);
            self.stats.corrupted += 1;
            log::trace!("[link] corrupt seq={} bit={bit}", seg.seqno());
        }

        if self.rng.gen_bool(self.config.duplicate_rate) {
            self.stats.duplicated += 1;
            self.enqueue(datagram.clone());
        }
        self.enqueue(datagram);
    }

    fn enqueue(&mut self, datagram: Vec<u8>) {
        if !self.in_flight.is_empty() && self.rng.gen_bool(self.config.reorder_rate) {
            let at = self.rng.gen_range(0..self.in_flight.len());
            self.in_flight.insert(at, datagram);
            self.stats.reordered += 1;
        } else {
            self.in_flight.push_back(datagram);
        }
    }

    /// Take everything currently on the wire.  Datagrams that no longer
    /// decode are discarded here.
    pub fn deliver(&mut self) -> Vec<TcpSegment> {
        let mut out = Vec::with_capacity(self.in_flight.len());
        while let Some(datagram) = self.in_flight.pop_front() {
            match TcpSegment::decode(&datagram) {
                Ok(seg) => {
                    self.stats.delivered += 1;
                    out.push(seg);
                }
                Err(err) => {
                    self.stats.rejected += 1;
                    log::debug!("[link] discard datagram: {err}");
                }
            }
        }
        out
    }

    /// Datagrams queued and not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapping::SeqNum;

    fn seg(n: u32) -> TcpSegment {
        TcpSegment::new(SeqNum::new(n), false, false, vec![n as u8; 4])
    }

    #[test]
    fn default_is_pass_through() {
        let mut link = Simulator::new(SimulatorConfig::default());
        for n in 0..5 {
            link.transmit(&seg(n));
        }
        let out = link.deliver();
        assert_eq!(out, (0..5).map(seg).collect::<Vec<_>>());
        assert_eq!(link.in_flight(), 0);
        assert_eq!(link.stats().delivered, 5);
    }

    #[test]
    fn total_loss_delivers_nothing() {
        let mut link = Simulator::new(SimulatorConfig {
            loss_rate: 1.0,
            ..SimulatorConfig::default()
        });
        link.transmit(&seg(1));
        assert!(link.deliver().is_empty());
        assert_eq!(link.stats().dropped, 1);
    }

    #[test]
    fn corruption_is_caught_by_checksum() {
        let mut link = Simulator::new(SimulatorConfig {
            corrupt_rate: 1.0,
            seed: 9,
            ..SimulatorConfig::default()
        });
        for n in 0..20 {
            link.transmit(&seg(n));
        }
        assert!(link.deliver().is_empty());
        assert_eq!(link.stats().rejected, 20);
    }

    #[test]
    fn unencodable_segment_is_dropped() {
        let mut link = Simulator::new(SimulatorConfig::default());
        link.transmit(&TcpSegment::new(SeqNum::new(0), false, false, vec![0u8; 70_000]));
        assert!(link.deliver().is_empty());
        assert_eq!(link.stats().dropped, 1);
    }

    #[test]
    fn duplication_delivers_twice() {
        let mut link = Simulator::new(SimulatorConfig {
            duplicate_rate: 1.0,
            ..SimulatorConfig::default()
        });
        link.transmit(&seg(3));
        assert_eq!(link.deliver(), vec![seg(3), seg(3)]);
    }

    #[test]
    fn same_seed_same_faults() {
        let config = SimulatorConfig {
            loss_rate: 0.3,
            reorder_rate: 0.3,
            duplicate_rate: 0.2,
            corrupt_rate: 0.1,
            seed: 42,
        };
        let run = |config: &SimulatorConfig| {
            let mut link = Simulator::new(config.clone());
            for n in 0..50 {
                link.transmit(&seg(n));
            }
            link.deliver()
        };
        assert_eq!(run(&config), run(&config));
    }
}
