use std::time::Duration;

/// Reconnect delay generator: `min(cap, base * 2^min(n-1, max_shift))` for
/// attempt `n`, where the counter starts at 1 and resets to 1 on a
/// successful connection.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    max_shift: u32,
    attempt: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(10), 6)
    }
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration, max_shift: u32) -> Self {
        Self {
            base,
            cap,
            max_shift,
            attempt: 1,
        }
    }

    /// Delay for the current attempt; advances the counter.
    pub fn next_delay(&mut self) -> Duration {
        let shift = (self.attempt - 1).min(self.max_shift);
        self.attempt += 1;
        (self.base * (1u32 << shift)).min(self.cap)
    }

    pub fn reset(&mut self) {
        self.attempt = 1;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}
