// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Compute cyclo-synchrotron emission coefficients by summing over resonance
harmonics.

The basic structure of the problem is that we need to do an integral in a 2D
quarter-plane defined by the variables *gamma* (>= 1) and *n* (>= 1). For each
harmonic *n*, only a finite window of *gamma* can resonate with the observing
frequency, so the inner integral runs over that window. Technically, *n* can
only take on discrete values. We sum the first few harmonics above the
kinematic threshold one by one, then treat *n* as continuous and integrate
the remainder in chunks whose width grows as the integrand flattens out.

The key publications behind the formalism are [Pandya, Zhang, Chandra, and
Gammie (2016;
DOI:10.3847/0004-637X/822/1/34](https://dx.doi.org/10.3847/0004-637X/822/1/34)
and [Leung, Gammie, and Noble
(2011)](https://dx.doi.org/10.1088/0004-637X/737/1/21).

Start with a `PlasmaConfig`, then build an `EmissivityCalculator` from it:

```no_run
# #[macro_use] extern crate slog;
# extern crate gyrosum;
# fn main() {
let log = slog::Logger::root(slog::Discard, o!());
let calc = gyrosum::EmissivityCalculator::new(gyrosum::PlasmaConfig::default(), log).unwrap();
let nu_c = calc.cyclotron_frequency();
println!("{:e}", calc.emissivity(10. * nu_c).unwrap());
# }
```

*/

#![deny(missing_docs)]

#[cfg(test)] #[macro_use] extern crate assert_approx_eq;
#[cfg(test)] extern crate gyrosum_test_support;
#[cfg(test)] extern crate rand;
extern crate rgsl;
extern crate serde;
extern crate serde_json;
#[macro_use] extern crate slog;
extern crate special_fun;
extern crate thiserror;

use std::fmt;

mod gsl;

pub mod config;
pub mod errors;
pub mod normalization;
pub mod resonance;

pub use config::{DistributionKind, IntegrationSettings, PlasmaConfig, TailSettings, TailStrategy};
pub use errors::{ConfigError, Error, NormalizationError, Result};
pub use gsl::GslError;
pub use normalization::{NormalizationCache, NormalizationState};
pub use resonance::{HarmonicWindow, ResonanceGeometry};

pub use std::f64::consts::PI;

/// Two times pi, as an `f64`.
pub const TWO_PI: f64 = 2. * PI;

/// The mass of the electron in cgs (grams).
pub const MASS_ELECTRON: f64 = 9.1093826e-28;

/// The speed of light in cgs (centimeters per second).
pub const SPEED_LIGHT: f64 = 2.99792458e10;

/// The charge of the electron, in cgs (esu's).
pub const ELECTRON_CHARGE: f64 = 4.80320680e-10;


/// Which polarization kernel to integrate. There's no "U" option because our
/// linear polarization basis is defined such that all U terms are zero.
#[derive(Copy,Clone,Debug,Eq,Hash,PartialEq)]
pub enum Stokes {
    /// The total intensity: the symmetric kernel `M² J_n² + N² J'_n²`. This
    /// is what `EmissivityCalculator::emissivity` computes.
    I,

    /// The linear polarization: the antisymmetric kernel `M² J_n² - N² J'_n²`.
    Q,

    /// The circular polarization: the cross term `-2 M N J_n J'_n`.
    V
}


/// An electron distribution function.
///
/// Each distribution provides two things: an unnormalized kernel, whose
/// integral over `gamma ∈ [1, ∞)` fixes the normalization constant, and the
/// normalized density that enters the emission integrand. The density is the
/// `gamma`-derivative of the distribution function expressed per unit
/// momentum-space volume, i.e. with the `gamma² beta` factor divided out,
/// multiplied by `pi nu n_e / m c²`. It is negative wherever the
/// distribution falls off with energy.
pub trait DistributionFunction: fmt::Debug {
    /// The kernel whose integral over `[1, ∞)` is the inverse normalization.
    fn unnormalized_kernel(&self, gamma: f64) -> f64;

    /// The density at *gamma* and frequency *nu*, given the normalization
    /// constant *norm*.
    fn density(&self, gamma: f64, nu: f64, norm: f64) -> f64;

    /// The normalization constant, if it is known analytically. Distributions
    /// that return `Some` here are never integrated numerically.
    fn closed_form_normalization(&self) -> Option<f64> {
        None
    }

    /// Check that the kernel can be normalized at all, before any quadrature
    /// is attempted.
    fn check_normalizable(&self) -> ::std::result::Result<(), NormalizationError> {
        Ok(())
    }
}


// Distributions

pub mod kappa;
pub use kappa::KappaDistribution;

pub mod power_law;
pub use power_law::PowerLawDistribution;

pub mod thermal_juettner;
pub use thermal_juettner::ThermalJuettnerDistribution;


/// The distribution selected by a `PlasmaConfig`.
#[derive(Copy,Clone,Debug,PartialEq)]
pub enum Distribution {
    /// See `ThermalJuettnerDistribution`.
    Thermal(ThermalJuettnerDistribution),

    /// See `PowerLawDistribution`.
    PowerLaw(PowerLawDistribution),

    /// See `KappaDistribution`.
    Kappa(KappaDistribution),
}

impl Distribution {
    /// Build the distribution that *config* asks for.
    pub fn from_config(config: &PlasmaConfig) -> Self {
        let prefactor = PI * config.density / (config.mass * config.speed_of_light.powi(2));

        match config.distribution {
            DistributionKind::Thermal => Distribution::Thermal(
                ThermalJuettnerDistribution::new(config.temperature)
                    .density_prefactor(prefactor)
            ),

            DistributionKind::PowerLaw => Distribution::PowerLaw(
                PowerLawDistribution::new(config.power_law_index)
                    .gamma_limits(config.gamma_min, config.gamma_max, config.gamma_cutoff)
                    .density_prefactor(prefactor)
            ),

            DistributionKind::Kappa => Distribution::Kappa(
                KappaDistribution::new(config.kappa_index, config.temperature)
                    .gamma_cutoff(config.gamma_cutoff)
                    .density_prefactor(prefactor)
            ),
        }
    }

    /// Which kind of distribution this is.
    pub fn kind(&self) -> DistributionKind {
        match *self {
            Distribution::Thermal(_) => DistributionKind::Thermal,
            Distribution::PowerLaw(_) => DistributionKind::PowerLaw,
            Distribution::Kappa(_) => DistributionKind::Kappa,
        }
    }

    fn inner(&self) -> &dyn DistributionFunction {
        match *self {
            Distribution::Thermal(ref d) => d,
            Distribution::PowerLaw(ref d) => d,
            Distribution::Kappa(ref d) => d,
        }
    }
}

impl DistributionFunction for Distribution {
    fn unnormalized_kernel(&self, gamma: f64) -> f64 {
        self.inner().unnormalized_kernel(gamma)
    }

    fn density(&self, gamma: f64, nu: f64, norm: f64) -> f64 {
        self.inner().density(gamma, nu, norm)
    }

    fn closed_form_normalization(&self) -> Option<f64> {
        self.inner().closed_form_normalization()
    }

    fn check_normalizable(&self) -> ::std::result::Result<(), NormalizationError> {
        self.inner().check_normalizable()
    }
}


// The calculation itself

pub mod emissivity;
pub use emissivity::{EmissivityCalculator, TailOutcome};
