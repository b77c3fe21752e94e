// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! Error types.

use std::io;
use thiserror::Error;

use crate::gsl::GslError;


/// Problems with a `PlasmaConfig`. These are all detected before any
/// integration begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A parameter that must be a positive, finite number is not.
    #[error("parameter `{field}` must be positive and finite, got {value}")]
    NonPositive {
        /// The name of the offending field.
        field: &'static str,

        /// Its value.
        value: f64,
    },

    /// The observer angle is not strictly between 0 and pi.
    #[error("observer angle must lie strictly between 0 and pi, got {0}")]
    AngleOutOfRange(f64),

    /// The observer angle is perpendicular to the field.
    #[error("observer angle {0} is perpendicular to the field; the resonance Jacobian diverges there")]
    PerpendicularAngle(f64),

    /// The power-law index is at most 1.
    #[error("power-law index must exceed 1 for a normalizable distribution, got {0}")]
    PowerLawIndex(f64),

    /// The power-law lower limit is below rest.
    #[error("gamma_min must be at least 1, got {0}")]
    GammaMin(f64),

    /// The power-law limits are out of order.
    #[error("gamma_max ({gamma_max}) is below gamma_min ({gamma_min})")]
    GammaRange {
        /// The lower limit.
        gamma_min: f64,

        /// The upper limit.
        gamma_max: f64,
    },

    /// The tail step would shrink instead of grow.
    #[error("tail step growth factor must be at least 1, got {0}")]
    StepGrowth(f64),

    /// The tail may not run at all.
    #[error("tail iteration ceiling must be nonzero")]
    NoIterations,

    /// A name given for an enumerated setting is not one we know.
    #[error("unrecognized {what} `{value}`")]
    Unrecognized {
        /// Which setting was being parsed.
        what: &'static str,

        /// The text that was not recognized.
        value: String,
    },

    /// The configuration file could not be read.
    #[error("could not read configuration: {0}")]
    Io(#[from] io::Error),

    /// The configuration file is not valid JSON for a `PlasmaConfig`.
    #[error("could not parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}


/// Failures to compute a distribution's normalization constant.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NormalizationError {
    /// The distribution has a closed form and was handed to the cache anyway.
    #[error("distribution has a closed-form normalization; it is never integrated")]
    ClosedForm,

    /// The power-law limits coincide, so its prefactor divides by zero.
    #[error("power-law prefactor is degenerate (gamma_min = {gamma_min}, gamma_max = {gamma_max})")]
    DegenerateWidth {
        /// The lower limit.
        gamma_min: f64,

        /// The upper limit.
        gamma_max: f64,
    },

    /// The kernel integral failed.
    #[error("normalization integral did not converge: {0}")]
    Quadrature(#[from] GslError),

    /// The kernel integral came out zero, negative or non-finite.
    #[error("normalization integral must be positive and finite, got {0}")]
    NonPositive(f64),
}


/// Everything that can go wrong while computing an emissivity.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The distribution could not be normalized.
    #[error("{0}")]
    Normalization(#[from] NormalizationError),

    /// The observing frequency is zero, negative or non-finite.
    #[error("observing frequency must be positive and finite, got {0}")]
    InvalidFrequency(f64),

    /// The frequency is so high that the harmonics to be summed can no
    /// longer be told apart as `f64`s.
    #[error("frequency {nu:e} needs harmonic {n:e}, past the exactly representable range")]
    HarmonicOutOfRange {
        /// The observing frequency.
        nu: f64,

        /// The highest harmonic that would be summed.
        n: f64,
    },

    /// A gamma or harmonic integral did not converge.
    #[error("quadrature failed near harmonic {n}: {source}")]
    Quadrature {
        /// The harmonic, or the start of the chunk of harmonics, concerned.
        n: f64,

        /// What GSL said.
        source: GslError,
    },

    /// GSL failed outside of any particular integral.
    #[error(transparent)]
    Gsl(#[from] GslError),

    /// The harmonic tail was still growing when we gave up on it.
    #[error("harmonic tail did not converge after {iterations} steps (n = {n_start:e}, total = {ans:e})")]
    TailNotConverged {
        /// How many chunks were integrated.
        iterations: usize,

        /// Where the next chunk would have started.
        n_start: f64,

        /// The tail total so far.
        ans: f64,
    },

    /// A NaN or infinity turned up.
    #[error("non-finite value {value} in {stage}")]
    NonFinite {
        /// Which part of the calculation produced it.
        stage: &'static str,

        /// The offending value.
        value: f64,
    },
}

/// Shorthand for results in this crate.
pub type Result<T> = ::std::result::Result<T, Error>;
