use std::time::Duration;

/// Policy for re-establishing a dropped feed connection
///
/// Consulted once per closed connection with the number of attempts made
/// since the last successful one. The client resets the attempt counter
/// every time a handshake completes.
pub trait ReconnectionStrategy: Send + Sync {
    /// Delay to wait before attempt number `attempt` (0-indexed)
    ///
    /// `None` stops the retry cycle for good.
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    /// Clear any per-connection state after a successful handshake
    fn reset(&mut self);

    /// Whether attempt number `attempt` should be made at all
    fn should_reconnect(&self, attempt: usize) -> bool;
}

/// Retry at a constant interval
///
/// With no attempt cap this retries forever at the same interval, the
/// policy a price feed wants: the page outlives any one connection, and a
/// constant 5 s delay with no growth and no jitter keeps the behavior
/// predictable.
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<usize>,
}

impl FixedDelay {
    /// `max_attempts = None` retries without limit
    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        self.should_reconnect(attempt).then_some(self.delay)
    }

    fn reset(&mut self) {}

    fn should_reconnect(&self, attempt: usize) -> bool {
        match self.max_attempts {
            Some(max) => attempt < max,
            None => true,
        }
    }
}

/// Retry with exponentially growing delays
///
/// Attempt `n` waits `initial * 2^n`, saturating at `max_delay`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }

        let cap_ms = self.max_delay.as_millis() as u64;

        // Overflow saturates to the cap rather than wrapping
        let ms = 2u64
            .checked_pow(attempt.min(u32::MAX as usize) as u32)
            .and_then(|factor| (self.initial_delay.as_millis() as u64).checked_mul(factor))
            .map_or(cap_ms, |ms| ms.min(cap_ms));

        Some(Duration::from_millis(ms))
    }

    fn reset(&mut self) {}

    fn should_reconnect(&self, attempt: usize) -> bool {
        match self.max_attempts {
            Some(max) => attempt < max,
            None => true,
        }
    }
}

/// Give up on the first closure
///
/// Useful for one-shot tooling that should fail fast instead of retrying.
#[derive(Debug, Clone)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {}

    fn should_reconnect(&self, _attempt: usize) -> bool {
        false
    }
}
