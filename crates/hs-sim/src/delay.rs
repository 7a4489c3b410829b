//! Computational delay between the controller and the converter.

use std::collections::VecDeque;

/// Fixed-length FIFO of duty ratios.
///
/// A delay of `n` periods returns, for every pushed value, the value pushed
/// `n` periods earlier; the first `n` outputs are the neutral value. A delay
/// of zero passes values straight through.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputationalDelay {
    length: usize,
    queue: VecDeque<[f64; 3]>,
}

impl ComputationalDelay {
    /// Delay of `length` periods starting from all-zero duty ratios.
    pub fn new(length: usize) -> Self {
        Self::with_neutral(length, [0.0; 3])
    }

    /// Delay of `length` periods pre-filled with `neutral`.
    pub fn with_neutral(length: usize, neutral: [f64; 3]) -> Self {
        Self {
            length,
            queue: std::iter::repeat_n(neutral, length).collect(),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Push this period's duty ratios and pop the ones to apply now.
    pub fn push(&mut self, d_abc: [f64; 3]) -> [f64; 3] {
        if self.length == 0 {
            return d_abc;
        }
        self.queue.push_back(d_abc);
        self.queue.pop_front().unwrap_or(d_abc)
    }
}

impl Default for ComputationalDelay {
    fn default() -> Self {
        Self::new(1)
    }
}
