use std::fmt;

use crate::error::{
    Error,
    Result,
};

/// Aggregate of every worker's duration, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// The mean is accumulated as a sum of `d / n` terms, not `sum / n`.
    pub fn from_durations(durations: &[f64]) -> Result<Summary> {
        if durations.is_empty() {
            return Err(Error::NoSamples);
        }
        let n = durations.len() as f64;
        let mut summary = Summary {
            avg: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        };
        for &d in durations {
            if d < summary.min {
                summary.min = d;
            }
            if d > summary.max {
                summary.max = d;
            }
            summary.avg += d / n;
        }
        Ok(summary)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "average {:.6}, min {:.6}, max {:.6}", self.avg, self.min, self.max)
    }
}
