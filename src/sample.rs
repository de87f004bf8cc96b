//! Sample struct for decoded time series data.

/// A decoded time series sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Timestamp in ticks (typically Unix seconds)
    pub t: u32,
    /// Sample value
    pub v: f64,
}

impl Sample {
    /// Create a new `Sample`
    #[inline]
    #[must_use]
    pub fn new(t: u32, v: f64) -> Self {
        Self { t, v }
    }
}
