//! Rate limiter for references.

use serde::{Deserialize, Serialize};

/// Limits how fast a signal may change between samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimiter {
    /// Maximum rate of change (units per second).
    pub limit: f64,
    y: f64,
}

impl RateLimiter {
    pub fn new(limit: f64) -> Self {
        Self { limit, y: 0.0 }
    }

    /// Held output.
    pub fn value(&self) -> f64 {
        self.y
    }

    /// Rate-limited output for input `u`, without changing the held output.
    pub fn output(&self, t_s: f64, u: f64) -> f64 {
        let rate = (u - self.y) / t_s;

        if rate > self.limit {
            // Limit rising rate
            self.y + t_s * self.limit
        } else if rate < -self.limit {
            // Limit falling rate
            self.y - t_s * self.limit
        } else {
            u
        }
    }

    pub fn update(&mut self, y: f64) {
        self.y = y;
    }

    /// [`output`](Self::output) followed by [`update`](Self::update).
    pub fn rate_limit(&mut self, t_s: f64, u: f64) -> f64 {
        self.y = self.output(t_s, u);
        self.y
    }
}
