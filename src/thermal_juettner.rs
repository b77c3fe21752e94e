// Copyright 2017 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! A thermal Jüttner distribution.

The electrons are isotropic. *T* is the ratio of the particles’ thermal energy
to their rest-mass energy. The normalization is known in closed form, `1 / (T
K_2(1/T))`, so this distribution never goes through the normalization cache.

Both the kernel and the normalization are taken relative to the rest energy:
the kernel falls off as `exp(-(gamma - 1) / T)` and the constant is `1 / (T
e^(1/T) K_2(1/T))`. The product is unchanged, but neither factor overflows or
underflows for cold plasmas.

*/

use special_fun::FloatSpecial;
use std::f64;

use super::{DistributionFunction, MASS_ELECTRON, PI, SPEED_LIGHT};


/// Past this argument `K_2` is evaluated from its asymptotic series.
const K2_ASYMPTOTIC_THRESHOLD: f64 = 100.;

/// `e^x K_2(x)`, for `x > 0`.
fn scaled_bessel_k2(x: f64) -> f64 {
    if x < K2_ASYMPTOTIC_THRESHOLD {
        return x.besselk(2) * x.exp();
    }

    // sqrt(pi / 2x) sum_k prod_{j<=k} (16 - (2j - 1)^2) / (k! (8x)^k)
    let mut term = 1.;
    let mut sum = 1.;

    for k in 1..7 {
        let odd = (2 * k - 1) as f64;
        term *= (16. - odd * odd) / (k as f64 * 8. * x);
        sum += term;
    }

    (PI / (2. * x)).sqrt() * sum
}


/// Parameters for a thermal Jüttner electron distribution. See the module-level
/// documentation for details.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct ThermalJuettnerDistribution {
    t: f64,
    neg_inverse_t: f64,
    prefactor: f64,
}


impl DistributionFunction for ThermalJuettnerDistribution {
    fn unnormalized_kernel(&self, gamma: f64) -> f64 {
        gamma * (gamma * gamma - 1.).sqrt() * (self.neg_inverse_t * (gamma - 1.)).exp()
    }

    fn density(&self, gamma: f64, nu: f64, norm: f64) -> f64 {
        self.prefactor * nu * norm * self.neg_inverse_t * (self.neg_inverse_t * (gamma - 1.)).exp()
    }

    fn closed_form_normalization(&self) -> Option<f64> {
        Some(1. / (self.t * scaled_bessel_k2(1. / self.t)))
    }
}


impl ThermalJuettnerDistribution {
    /// Create a new thermal Jüttner distribution with the specified
    /// dimensionless temperature, for a unit electron density in cgs.
    pub fn new(t: f64) -> Self {
        ThermalJuettnerDistribution {
            t: t,
            neg_inverse_t: -1. / t,
            prefactor: PI / (MASS_ELECTRON * SPEED_LIGHT * SPEED_LIGHT),
        }
    }

    /// Set the constant `pi n_e / m c^2` that multiplies `nu` in the density.
    pub fn density_prefactor(mut self, prefactor: f64) -> Self {
        self.prefactor = prefactor;
        self
    }
}
