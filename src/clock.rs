//! Blocking delay abstraction used to pace verification retries

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Trait for blocking delays between verification attempts
///
/// Abstracted so unit tests can count and skip the sleeps instead of
/// waiting out real retry delays.
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Production clock backed by `std::thread::sleep`
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn system_clock_blocks_for_roughly_the_requested_duration() {
        let clock = SystemClock;
        let start = Instant::now();
        clock.sleep(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
