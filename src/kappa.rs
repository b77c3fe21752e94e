// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! An isotropic kappa distribution function with an exponential cutoff.

We use the relativistic kappa distribution as defined in Pandya et al 2016,
which cites Xiao et al 2006 as its reference. The energy dependence is `(1 +
(gamma - 1) / (kappa w))^-(kappa + 1)`, where the width *w* plays the role of
the dimensionless temperature, times `exp(-gamma/gamma_cutoff)`. There is no
closed form for the normalization so it is integrated numerically.

*/

use std::f64;

use super::{DistributionFunction, MASS_ELECTRON, PI, SPEED_LIGHT};


/// Parameters for a kappa electron distribution. See the module-level
/// documentation for details.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct KappaDistribution {
    kappa: f64,
    width: f64,
    inv_kappa_width: f64,
    inv_gamma_cutoff: f64,
    prefactor: f64,
}


impl KappaDistribution {
    /// Create a new set of kappa parameters with the specified kappa and
    /// width.
    ///
    /// The default gamma cutoff is 1000.
    pub fn new(kappa: f64, width: f64) -> Self {
        KappaDistribution {
            kappa: kappa,
            width: width,
            inv_kappa_width: 1. / (kappa * width),
            inv_gamma_cutoff: 1e-3,
            prefactor: PI / (MASS_ELECTRON * SPEED_LIGHT * SPEED_LIGHT),
        }
    }

    /// Alter the gamma cutoff of this distribution.
    pub fn gamma_cutoff(mut self, gamma_cutoff: f64) -> Self {
        self.inv_gamma_cutoff = 1. / gamma_cutoff;
        self
    }

    /// Set the constant `pi n_e / m c^2` that multiplies `nu` in the density.
    pub fn density_prefactor(mut self, prefactor: f64) -> Self {
        self.prefactor = prefactor;
        self
    }

    #[inline]
    fn gamma_term(&self, gamma: f64) -> f64 {
        (1. + (gamma - 1.) * self.inv_kappa_width).powf(-(self.kappa + 1.)) *
            (-gamma * self.inv_gamma_cutoff).exp()
    }
}


impl DistributionFunction for KappaDistribution {
    fn unnormalized_kernel(&self, gamma: f64) -> f64 {
        gamma * (gamma * gamma - 1.).sqrt() * self.gamma_term(gamma)
    }

    fn density(&self, gamma: f64, nu: f64, norm: f64) -> f64 {
        let f = self.gamma_term(gamma);
        let dfdg = -f * ((self.kappa + 1.) / (self.kappa * self.width + gamma - 1.) + self.inv_gamma_cutoff);
        self.prefactor * nu * norm * dfdg
    }
}


#[cfg(test)]
mod tests {
    use rand;

    use super::KappaDistribution;
    use crate::DistributionFunction;

    #[test]
    fn test_derivatives() {
        const EPS: f64 = 1e-6;
        const TOL: f64 = 1e-4;

        for _ in 0..100 {
            let kappa = 1.5 + 3. * rand::random::<f64>();
            let width = (1. + 2. * rand::random::<f64>()).exp();
            let gamma = 1.1 + 1e3 * rand::random::<f64>();
            let gamma_cutoff = 1e2 + 1e4 * rand::random::<f64>();

            let d = KappaDistribution::new(kappa, width)
                .gamma_cutoff(gamma_cutoff)
                .density_prefactor(1.);

            let analytic = d.density(gamma, 1., 1.);
            let numeric = (d.gamma_term(gamma + EPS) - d.gamma_term(gamma)) / EPS;

            // The logical not here lets us catch NaNs.

            if !(((analytic - numeric) / numeric).abs() < TOL) {
                panic!("numerical gamma derivative failed: kappa={:.16e} width={:.16e} \
                        gamma={:.16e} gamma_cutoff={:.16e} analytic={:.16e} numeric={:.16e}",
                       kappa, width, gamma, gamma_cutoff, analytic, numeric);
            }
        }
    }

    #[test]
    fn kernel_is_positive() {
        let d = KappaDistribution::new(150., 10.);

        for &gamma in &[1.0001, 2., 50., 500.] {
            assert!(d.unnormalized_kernel(gamma) > 0.);
        }

        assert_eq!(d.unnormalized_kernel(1.), 0.);
    }
}
