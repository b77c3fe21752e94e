// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Resonance kinematics: which electrons can emit at harmonic *n*, and how
strongly.

An electron with Lorentz factor γ and pitch-angle cosine `cos ξ` radiates at
harmonic *n* of the cyclotron frequency `νc` toward an observer at angle θ to
the field when `γ ν (1 - β cos ξ cos θ) = n νc`. For fixed *n* and ν this
picks out a band of energies, the *harmonic window*, and within the window
fixes `cos ξ` as a function of γ.

*/

use special_fun::FloatSpecial;
use std::f64;

use super::Stokes;


/// The closed range of Lorentz factors that can resonate at one harmonic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HarmonicWindow {
    /// The lower edge.
    pub gamma_minus: f64,

    /// The upper edge.
    pub gamma_plus: f64,
}

impl HarmonicWindow {
    /// `gamma_plus - gamma_minus`.
    pub fn width(&self) -> f64 {
        self.gamma_plus - self.gamma_minus
    }
}


/// The parts of the resonance condition that are fixed for a run: the
/// cyclotron frequency and the observer angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResonanceGeometry {
    nu_c: f64,
    cos_observer_angle: f64,
    sin_observer_angle: f64,
}


/// Below this, `γ ν β cos θ` counts as zero and the kernel takes its limiting
/// value.
const DEGENERATE_DENOMINATOR: f64 = 1e-12;


impl ResonanceGeometry {
    /// Fix the cyclotron frequency *nu_c* (Hz) and the observer angle
    /// *theta* (radians).
    pub fn new(nu_c: f64, theta: f64) -> Self {
        ResonanceGeometry {
            nu_c: nu_c,
            cos_observer_angle: theta.cos(),
            sin_observer_angle: theta.sin(),
        }
    }

    /// The cyclotron frequency, in Hz.
    pub fn cyclotron_frequency(&self) -> f64 {
        self.nu_c
    }

    /// `cos theta`.
    pub fn cos_observer_angle(&self) -> f64 {
        self.cos_observer_angle
    }

    /// The lowest (real-valued) harmonic that can resonate at frequency *nu*.
    pub fn n_minus(&self, nu: f64) -> f64 {
        nu / self.nu_c * self.sin_observer_angle.abs()
    }

    /// The window of Lorentz factors that resonate at harmonic *n* and
    /// frequency *nu*, or `None` if the harmonic is kinematically excluded.
    ///
    /// *n* need not be an integer. Both edges are at least 1.
    pub fn window(&self, n: f64, nu: f64) -> Option<HarmonicWindow> {
        let x = n * self.nu_c / nu;
        let sin2 = self.sin_observer_angle.powi(2);
        let discriminant = x * x - sin2;

        if !(discriminant >= 0.) {
            return None;
        }

        let root = self.cos_observer_angle.abs() * discriminant.sqrt();
        let gamma_minus = (x - root) / sin2;
        let gamma_plus = (x + root) / sin2;

        if !(gamma_minus.is_finite() && gamma_plus.is_finite()) {
            return None;
        }

        // Analytically gamma_minus >= 1, with equality at x = 1; this only
        // mops up rounding.
        Some(HarmonicWindow {
            gamma_minus: gamma_minus.max(1.),
            gamma_plus: gamma_plus.max(1.),
        })
    }

    /// The polarization kernel for electrons of Lorentz factor *gamma*
    /// resonating at harmonic *n* and frequency *nu*.
    ///
    /// Inputs on the kinematic boundary, where the `cos ξ` denominator
    /// vanishes, give 0.
    pub fn kernel(&self, stokes: Stokes, gamma: f64, n: f64, nu: f64) -> f64 {
        let beta = (1. - 1. / (gamma * gamma)).sqrt();
        let beta_cos = beta * self.cos_observer_angle;

        if !(beta_cos.abs() > DEGENERATE_DENOMINATOR) {
            return 0.;
        }

        let cos_xi = (gamma * nu - n * self.nu_c) / (gamma * nu * beta_cos);

        if !cos_xi.is_finite() {
            return 0.;
        }

        let cos_xi = cos_xi.max(-1.).min(1.);
        let sin_xi = (1. - cos_xi * cos_xi).sqrt();
        let m = (self.cos_observer_angle - beta * cos_xi) / self.sin_observer_angle;
        let big_n = beta * sin_xi;
        let z = nu * gamma * beta * self.sin_observer_angle * sin_xi / self.nu_c;

        let mj = m * bessel_j(n, z);
        let njp = big_n * bessel_j_prime(n, z);

        match stokes {
            Stokes::I => mj * mj + njp * njp,
            Stokes::Q => mj * mj - njp * njp,
            Stokes::V => -2. * mj * njp,
        }
    }
}


/// `J_n(x)` for real order *n* ≥ 0.
#[inline]
pub fn bessel_j(n: f64, x: f64) -> f64 {
    x.besselj(n)
}

/// `J'_n(x)`, the derivative with regards to the argument.
#[inline]
pub fn bessel_j_prime(n: f64, x: f64) -> f64 {
    0.5 * (x.besselj(n - 1.) - x.besselj(n + 1.))
}
