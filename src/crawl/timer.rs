// src/crawl/timer.rs
// =============================================================================
// The single gate every outbound request goes through.
//
// Usage pattern for each request:
//   timer.wait().await;          // until the next slot
//   ... send request, read the whole body ...
//   timer.reset(interval);       // next slot = now + interval
//
// Because reset() happens after the body is drained, the interval is an
// idle gap between requests, however long a download takes. A new timer
// fires immediately.
// =============================================================================

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct ConnectionTimer {
    next_slot: Instant,
}

impl ConnectionTimer {
    pub fn new() -> Self {
        Self {
            next_slot: Instant::now(),
        }
    }

    /// Waits until the next request is allowed.
    pub async fn wait(&self) {
        sleep_until(self.next_slot).await;
    }

    /// Schedules the next slot `interval` from now.
    pub fn reset(&mut self, interval: Duration) {
        self.next_slot = Instant::now() + interval;
    }
}

impl Default for ConnectionTimer {
    fn default() -> Self {
        Self::new()
    }
}
