//! Retransmission timer.
//!
//! Reliable delivery requires that the oldest unacknowledged segment is sent
//! again if no ACK covers it within the retransmission timeout (RTO).  The
//! timer here owns no clock: the caller advances it with
//! [`RetransmitTimer::tick`], so every expiry is reproducible in tests.
//!
//! - The RTO starts at the configured initial value.
//! - Each expiry the caller treats as a real loss doubles it
//!   ([`back_off`](RetransmitTimer::back_off)).
//! - An ACK for new data restores the initial value
//!   ([`reset`](RetransmitTimer::reset)).

/// A tick-driven retransmission timer for one sender.
#[derive(Debug, Clone)]
pub struct RetransmitTimer {
    initial_rto: u64,
    /// Current RTO in milliseconds.
    current_rto: u64,
    /// Milliseconds accumulated since the timer was (re)started.
    elapsed: u64,
    running: bool,
}

impl RetransmitTimer {
    pub fn new(initial_rto: u64) -> Self {
        Self {
            initial_rto,
            current_rto: initial_rto,
            elapsed: 0,
            running: false,
        }
    }

    /// Start counting from zero unless already running.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.elapsed = 0;
        }
    }

    /// Start counting from zero, even if already running.
    pub fn restart(&mut self) {
        self.running = true;
        self.elapsed = 0;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = 0;
    }

    /// Advance by `ms`.  Returns `true` when the RTO has been reached.
    ///
    /// A stopped timer never expires.  The caller decides what an expiry
    /// means and restarts the timer itself.
    pub fn tick(&mut self, ms: u64) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(ms);
        self.elapsed >= self.current_rto
    }

    /// Double the RTO after a retransmission (exponential back-off).
    pub fn back_off(&mut self) {
        self.current_rto = self.current_rto.saturating_mul(2);
    }

    /// Restore the initial RTO and restart the count.
    pub fn reset(&mut self) {
        self.current_rto = self.initial_rto;
        self.elapsed = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn rto(&self) -> u64 {
        self.current_rto
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_timer_never_fires() {
        let mut t = RetransmitTimer::new(100);
        assert!(!t.tick(1_000));
        assert_eq!(t.elapsed(), 0);
    }

    #[test]
    fn fires_at_rto() {
        let mut t = RetransmitTimer::new(100);
        t.start();
        assert!(!t.tick(99));
        assert!(t.tick(1));
    }

    #[test]
    fn start_does_not_rewind_a_running_timer() {
        let mut t = RetransmitTimer::new(100);
        t.start();
        t.tick(60);
        t.start();
        assert!(t.tick(40));

        t.restart();
        assert!(!t.tick(40));
    }

    #[test]
    fn back_off_then_reset() {
        let mut t = RetransmitTimer::new(1000);
        t.back_off();
        t.back_off();
        assert_eq!(t.rto(), 4000);
        t.reset();
        assert_eq!(t.rto(), 1000);
        assert_eq!(t.elapsed(), 0);
    }

    #[test]
    fn stop_clears_elapsed() {
        let mut t = RetransmitTimer::new(100);
        t.start();
        t.tick(50);
        t.stop();
        assert!(!t.is_running());
        t.start();
        assert!(!t.tick(50));
    }
}
