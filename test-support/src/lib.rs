// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! Shared helpers for the gyrosum tests and benchmarks.

use slog::o;

/// A logger that throws everything away.
pub fn quiet_log() -> slog::Logger {
    slog::Logger::root(slog::Discard, o!())
}


/// Draws random parameter values, uniformly or log-uniformly between two
/// bounds.
pub struct Sampler {
    is_log: bool,
    low: f64,
    range: f64
}

impl Sampler {
    /// Sample between *low* and *high*, in either order. If *is_log* is true
    /// both bounds must be positive.
    pub fn new(is_log: bool, low: f64, high: f64) -> Self {
        let (mut low, mut high) = if low > high { (high, low) } else { (low, high) };

        if is_log {
            low = low.ln();
            high = high.ln();
        }

        Sampler { is_log: is_log, low: low, range: high - low }
    }

    /// Draw one value.
    pub fn get(&self) -> f64 {
        let n = self.low + rand::random::<f64>() * self.range;

        if self.is_log {
            n.exp()
        } else {
            n
        }
    }
}


#[cfg(test)]
mod tests {
    use super::Sampler;

    #[test]
    fn stays_in_bounds() {
        let lin = Sampler::new(false, 3., -2.);
        let log = Sampler::new(true, 1e-3, 1e6);

        for _ in 0..1000 {
            let x = lin.get();
            assert!(x >= -2. && x <= 3.);

            let y = log.get();
            assert!(y >= 1e-3 * (1. - 1e-12) && y <= 1e6 * (1. + 1e-12));
        }
    }
}
