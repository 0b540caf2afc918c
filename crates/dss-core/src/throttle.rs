use std::thread;
use std::time::Duration;

/// Fixed courtesy pause between two requests of a same scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Blocks the current thread for the configured delay and returns it.
    pub fn pause(&self) -> Duration {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.delay
    }
}
