// Copyright 2017 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! The power-law distribution function.

The electrons are isotropic. The power-law index is `p`, such that `dN/dgamma
~ gamma^(-p)`, and an exponential cutoff of the form `exp(-gamma/gamma_cutoff)`
is multiplied in. The bounds `gamma_min` and `gamma_max` enter through the
amplitude `(p - 1) / (gamma_min^(1-p) - gamma_max^(1-p))`; the distribution
itself is not truncated, and its normalization integral runs from 1 to
infinity. That amplitude blows up when the two bounds coincide, which is
reported as a normalization failure.

*/

use std::f64;

use super::{DistributionFunction, MASS_ELECTRON, PI, SPEED_LIGHT};
use crate::errors::NormalizationError;


/// Parameters for a power-law electron distribution. See the module-level
/// documentation for details.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct PowerLawDistribution {
    p: f64,
    gamma_min: f64,
    gamma_max: f64,
    inv_gamma_cutoff: f64,
    prefactor: f64,
}


impl DistributionFunction for PowerLawDistribution {
    fn unnormalized_kernel(&self, gamma: f64) -> f64 {
        self.amplitude() * gamma.powf(-self.p) * (-gamma * self.inv_gamma_cutoff).exp()
    }

    fn density(&self, gamma: f64, nu: f64, norm: f64) -> f64 {
        // d/dgamma of gamma^-p exp(-gamma/gamma_c) / (gamma^2 beta).
        let p_plus_1 = self.p + 1.;
        let g2_minus_1 = gamma * gamma - 1.;
        let f = gamma.powf(-p_plus_1) / g2_minus_1.sqrt() * (-gamma * self.inv_gamma_cutoff).exp();
        let dfdg = -f * (p_plus_1 / gamma + gamma / g2_minus_1 + self.inv_gamma_cutoff);

        self.prefactor * nu * norm * self.amplitude() * dfdg
    }

    fn check_normalizable(&self) -> Result<(), NormalizationError> {
        let a = self.amplitude();

        if a.is_finite() && a > 0. {
            Ok(())
        } else {
            Err(NormalizationError::DegenerateWidth {
                gamma_min: self.gamma_min,
                gamma_max: self.gamma_max,
            })
        }
    }
}


impl PowerLawDistribution {
    /// Create a new set of power-law parameters with the specified power-law
    /// index.
    ///
    /// The default gamma limits are a minimum of 1, a maximum of 1000, and a
    /// cutoff at 1000.
    pub fn new(p: f64) -> Self {
        PowerLawDistribution {
            p: p,
            gamma_min: 1.,
            gamma_max: 1000.,
            inv_gamma_cutoff: 1e-3,
            prefactor: PI / (MASS_ELECTRON * SPEED_LIGHT * SPEED_LIGHT),
        }
    }

    /// Alter the gamma limits of this distribution.
    pub fn gamma_limits(mut self, gamma_min: f64, gamma_max: f64, gamma_cutoff: f64) -> Self {
        self.gamma_min = gamma_min;
        self.gamma_max = gamma_max;
        self.inv_gamma_cutoff = 1. / gamma_cutoff;
        self
    }

    /// Set the constant `pi n_e / m c^2` that multiplies `nu` in the density.
    pub fn density_prefactor(mut self, prefactor: f64) -> Self {
        self.prefactor = prefactor;
        self
    }

    fn amplitude(&self) -> f64 {
        (self.p - 1.) / (self.gamma_min.powf(1. - self.p) - self.gamma_max.powf(1. - self.p))
    }
}


#[cfg(test)]
mod tests {
    use crate::errors::NormalizationError;
    use crate::DistributionFunction;
    use super::PowerLawDistribution;

    #[test]
    fn amplitude() {
        let d = PowerLawDistribution::new(3.).gamma_limits(1., 1000., 1000.);
        assert_approx_eq!(d.amplitude(), 2. / (1. - 1e-6), 1e-12);
        d.check_normalizable().unwrap();
    }

    #[test]
    fn degenerate_width() {
        let d = PowerLawDistribution::new(2.5).gamma_limits(10., 10., 1e4);
        assert_eq!(d.check_normalizable(), Err(NormalizationError::DegenerateWidth {
            gamma_min: 10.,
            gamma_max: 10.,
        }));
    }

    /// The density is the gamma-derivative of the kernel divided by the
    /// momentum-space volume factor `gamma^2 beta`.
    #[test]
    fn density_is_derivative() {
        const EPS: f64 = 1e-6;

        for &p in &[1.5, 2.5, 3., 4.] {
            let d = PowerLawDistribution::new(p).gamma_limits(1., 1e6, 1e4).density_prefactor(1.);
            let shape = |g: f64| d.unnormalized_kernel(g) / (g * (g * g - 1.).sqrt());

            for &gamma in &[1.2, 5., 80., 3000.] {
                let numeric = (shape(gamma + EPS * gamma) - shape(gamma - EPS * gamma)) / (2. * EPS * gamma);
                let analytic = d.density(gamma, 1., 1.);
                assert_approx_eq!(analytic / numeric, 1., 1e-5);
                assert!(analytic < 0.);
            }
        }
    }
}
