//! Pass-through progress stage for streaming persistence.
//!
//! Observes each chunk flowing from the response to the sink and reports
//! percentage and remaining size to the configured hook. The stage is driven
//! inline by the write loop, so it never buffers ahead of the sink and
//! transport backpressure is preserved.

use crate::config::OnProgress;

pub struct ProgressStage<'a> {
    total_size: Option<u64>,
    received: u64,
    percentage: f64,
    hook: &'a OnProgress,
}

impl<'a> ProgressStage<'a> {
    pub fn new(total_size: Option<u64>, hook: &'a OnProgress) -> Self {
        Self {
            total_size,
            received: 0,
            percentage: 0.0,
            hook,
        }
    }

    /// Account for one chunk and fire the hook.
    ///
    /// Percentage is received/total × 100 rounded to two decimals, NaN when
    /// the total is unknown; remaining is round((1 − pct/100) × total), None
    /// when the total is unknown.
    pub fn observe(&mut self, chunk: &[u8]) {
        self.received += chunk.len() as u64;
        self.percentage = match self.total_size {
            Some(total) if total > 0 => round2(self.received as f64 / total as f64 * 100.0),
            _ => f64::NAN,
        };
        let remaining = if self.percentage.is_nan() {
            None
        } else {
            self.total_size
                .map(|total| ((1.0 - self.percentage / 100.0) * total as f64).round() as u64)
        };
        (self.hook)(self.percentage, chunk, remaining);
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
