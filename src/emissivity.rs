// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Sum the emission over resonance harmonics.

The calculation is a double integral over the Lorentz factor *gamma* and the
harmonic number *n*. The first `harmonic_cap` integer harmonics above the
kinematic threshold `n_minus = (nu / nu_c) |sin theta|` are summed one at a
time, each one being a QAG integral over the harmonic's window in *gamma*.
Beyond that block *n* is treated as continuous and the remainder is
integrated with QAG in chunks, the inner *gamma* integral being redone at
every outer evaluation point.

The chunk width starts at `tail.initial_step` and grows by
`tail.step_growth` whenever the per-harmonic contribution is locally flat, as
judged by a centered finite difference. The tail is done when a chunk adds
less than `1 / tail.tolerance` of the running total. Nothing guarantees that
this ever happens, so after `tail.max_iterations` chunks we give up and say
so.

*/

use slog::Logger;
use std::cell::{Cell, RefCell};

use crate::config::{PlasmaConfig, TailStrategy};
use crate::errors::{Error, NormalizationError, Result};
use crate::gsl;
use crate::normalization::NormalizationCache;
use crate::resonance::{HarmonicWindow, ResonanceGeometry};
use crate::{Distribution, DistributionFunction, Stokes};


/// Lorentz factors with `beta` below this are treated as being at rest.
const BETA_FLOOR: f64 = 1e-10;

/// Harmonic numbers past 2^53 no longer map one-to-one onto `f64`s.
const MAX_EXACT_HARMONIC: f64 = 9007199254740992.;


/// The outcome of the integral over the continuous harmonic tail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TailOutcome {
    /// The integrated contribution of the tail.
    pub value: f64,

    /// How many chunks were integrated.
    pub iterations: usize,

    /// The harmonic number at which integration stopped.
    pub n_end: f64,
}


/// Computes emission coefficients for one plasma configuration.
///
/// The calculator is immutable apart from its normalization cache, which is
/// filled on first use. It can be shared between threads.
#[derive(Debug)]
pub struct EmissivityCalculator {
    config: PlasmaConfig,
    distribution: Distribution,
    geometry: ResonanceGeometry,
    norm_cache: NormalizationCache,
    logger: Logger,
}


impl EmissivityCalculator {
    /// Set up a calculation. The configuration is validated here, so that
    /// nothing downstream has to.
    pub fn new(config: PlasmaConfig, logger: Logger) -> Result<Self> {
        config.validate()?;

        let distribution = Distribution::from_config(&config);
        let geometry = ResonanceGeometry::new(config.cyclotron_frequency(), config.angle);

        debug!(logger, "configured emissivity calculation";
               "distribution" => %distribution.kind(),
               "nu_c" => geometry.cyclotron_frequency(),
               "theta" => config.angle,
               "harmonic_cap" => config.harmonic_cap,
               "tail" => ?config.tail.strategy,
        );

        Ok(EmissivityCalculator {
            config: config,
            distribution: distribution,
            geometry: geometry,
            norm_cache: NormalizationCache::new(),
            logger: logger,
        })
    }

    /// The validated configuration of this calculation.
    pub fn config(&self) -> &PlasmaConfig {
        &self.config
    }

    /// The fixed part of the resonance condition.
    pub fn geometry(&self) -> &ResonanceGeometry {
        &self.geometry
    }

    /// The cyclotron frequency `e B / (2 pi m c)`, in Hz.
    pub fn cyclotron_frequency(&self) -> f64 {
        self.geometry.cyclotron_frequency()
    }

    /// The cache holding the numerically integrated normalization, for
    /// distributions that need one.
    pub fn normalization_cache(&self) -> &NormalizationCache {
        &self.norm_cache
    }

    /// The normalization constant of the active distribution.
    ///
    /// The thermal distribution uses its closed form. The others integrate
    /// their kernel the first time this is called; the value, or the failure,
    /// is then reused for the life of the calculator.
    pub fn normalization(&self) -> Result<f64> {
        if let Some(norm) = self.distribution.closed_form_normalization() {
            if norm.is_finite() && norm > 0. {
                return Ok(norm);
            }

            return Err(NormalizationError::NonPositive(1. / norm).into());
        }

        let before = self.norm_cache.computations();
        let outcome = self.norm_cache.get_or_compute(&self.distribution, &self.config.integration);

        if self.norm_cache.computations() != before {
            match &outcome {
                Ok(norm) => debug!(self.logger, "computed normalization";
                                   "distribution" => %self.distribution.kind(),
                                   "norm" => *norm),
                Err(e) => warn!(self.logger, "normalization failed";
                                "distribution" => %self.distribution.kind(),
                                "err" => %e),
            }
        }

        Ok(outcome?)
    }

    /// The Stokes I emission coefficient at frequency *nu* (Hz).
    pub fn emissivity(&self, nu: f64) -> Result<f64> {
        self.coefficient(Stokes::I, nu)
    }

    /// The emission coefficient for the polarization *stokes* at frequency
    /// *nu* (Hz).
    pub fn coefficient(&self, stokes: Stokes, nu: f64) -> Result<f64> {
        self.state(stokes, nu)?.compute()
    }

    /// The Stokes I emission coefficient at the frequency `s nu_c`.
    pub fn emissivity_at_multiple(&self, s: f64) -> Result<f64> {
        self.emissivity(s * self.cyclotron_frequency())
    }

    /// Compute the Stokes I emissivity at each of the frequencies
    /// `s nu_c` for `s` in *multiples*. A failure at one frequency is
    /// reported in its slot and does not stop the others.
    pub fn sweep(&self, multiples: &[f64]) -> Vec<(f64, Result<f64>)> {
        multiples.iter().map(|&s| {
            let result = self.emissivity_at_multiple(s);

            if let Err(ref e) = result {
                warn!(self.logger, "emissivity failed"; "s" => s, "err" => %e);
            }

            (s, result)
        }).collect()
    }

    /// The lowest harmonic that can resonate at *nu*.
    pub fn n_minus(&self, nu: f64) -> f64 {
        self.geometry.n_minus(nu)
    }

    /// The window of Lorentz factors resonating at harmonic *n* and
    /// frequency *nu*, or `None` if the harmonic is excluded.
    pub fn harmonic_window(&self, n: f64, nu: f64) -> Option<HarmonicWindow> {
        self.geometry.window(n, nu)
    }

    /// An analytic estimate of the harmonic number that contributes most to
    /// the emission at *nu*.
    pub fn peak_harmonic(&self, nu: f64) -> f64 {
        let theta_e = self.config.temperature;
        let s = nu / self.cyclotron_frequency();
        let root = (2. * theta_e * s).cbrt();

        let beta2 = if s <= theta_e * theta_e {
            1. - (1. + theta_e).powi(-2)
        } else {
            1. - (2. * theta_e * s).powf(-2. / 3.)
        };

        (theta_e + 1. + root) * s * (1. - beta2 * self.geometry.cos_observer_angle().powi(2))
    }

    /// The contribution of the single harmonic *n* at *nu*: the integral of
    /// the emission integrand over the harmonic's window.
    pub fn harmonic_contribution(&self, stokes: Stokes, n: f64, nu: f64) -> Result<f64> {
        self.state(stokes, nu)?.harmonic_contribution(n)
    }

    /// Sum the contributions of the integer harmonics `first ..= last`. An
    /// empty range gives exactly zero.
    pub fn harmonic_sum(&self, stokes: Stokes, nu: f64, first: u64, last: u64) -> Result<f64> {
        self.state(stokes, nu)?.sum_harmonics(first, last)
    }

    /// The discretely summed block of harmonics at *nu*.
    pub fn discrete_sum(&self, stokes: Stokes, nu: f64) -> Result<f64> {
        self.state(stokes, nu)?.discrete_sum()
    }

    /// The integral over the harmonics beyond the discrete block, using the
    /// configured tail strategy.
    ///
    /// The tail converges relative to the whole emissivity, so the discrete
    /// block is summed first to set the scale.
    pub fn tail(&self, stokes: Stokes, nu: f64) -> Result<TailOutcome> {
        let state = self.state(stokes, nu)?;
        let discrete = state.discrete_sum()?;
        state.tail(discrete)
    }

    fn state(&self, stokes: Stokes, nu: f64) -> Result<CalculationState> {
        if !(nu > 0. && nu.is_finite()) {
            return Err(Error::InvalidFrequency(nu));
        }

        let n_last = self.geometry.n_minus(nu) + f64::from(self.config.harmonic_cap) + 1.;

        if !(n_last < MAX_EXACT_HARMONIC) {
            return Err(Error::HarmonicOutOfRange { nu: nu, n: n_last });
        }

        let norm = self.normalization()?;
        CalculationState::new(self, stokes, nu, norm)
    }
}


/// Everything that is fixed for one evaluation at one frequency.
struct CalculationState<'a> {
    calc: &'a EmissivityCalculator,
    stokes: Stokes,
    nu: f64,
    n_minus: f64,
    norm: f64,
    integrand_prefactor: f64,
    gamma_workspace: RefCell<gsl::IntegrationWorkspace>,
    gamma_epsabs: Cell<f64>,
    inner_failure: RefCell<Option<Error>>,
}


impl<'a> CalculationState<'a> {
    fn new(calc: &'a EmissivityCalculator, stokes: Stokes, nu: f64, norm: f64) -> Result<Self> {
        let c = &calc.config;

        // `-e^2 c / 2 nu` from the emission formula, and `1 / (nu |cos theta|)`
        // from integrating over the delta function of the resonance condition.
        let integrand_prefactor = -c.charge * c.charge * c.speed_of_light /
            (2. * nu * nu * calc.geometry.cos_observer_angle().abs());

        Ok(CalculationState {
            calc: calc,
            stokes: stokes,
            nu: nu,
            n_minus: calc.geometry.n_minus(nu),
            norm: norm,
            integrand_prefactor: integrand_prefactor,
            gamma_workspace: RefCell::new(gsl::IntegrationWorkspace::new(c.integration.gamma_workspace)?),
            gamma_epsabs: Cell::new(0.),
            inner_failure: RefCell::new(None),
        })
    }

    fn compute(&self) -> Result<f64> {
        trace!(self.calc.logger, "beginning emissivity computation";
               "distribution" => %self.calc.distribution.kind(),
               "stokes" => ?self.stokes,
               "nu" => self.nu,
               "n_minus" => self.n_minus,
               "norm" => self.norm,
        );

        let discrete = self.discrete_sum()?;

        if !discrete.is_finite() {
            return Err(Error::NonFinite { stage: "discrete harmonic sum", value: discrete });
        }

        let tail = self.tail(discrete)?;
        let ans = discrete + tail.value;

        trace!(self.calc.logger, "emissivity result";
               "nu" => self.nu,
               "discrete" => discrete,
               "tail" => tail.value,
               "tail_iterations" => tail.iterations,
               "ans" => ans,
        );
        Ok(ans)
    }

    fn discrete_sum(&self) -> Result<f64> {
        let base = self.n_minus.floor() as u64;
        self.sum_harmonics(base + 1, base + u64::from(self.calc.config.harmonic_cap))
    }

    fn sum_harmonics(&self, first: u64, last: u64) -> Result<f64> {
        if first <= last && !((last as f64) < MAX_EXACT_HARMONIC) {
            return Err(Error::HarmonicOutOfRange { nu: self.nu, n: last as f64 });
        }

        let mut ans = 0_f64;

        for n in first..=last {
            let contrib = self.harmonic_contribution(n as f64)?;
            ans += contrib;
            trace!(self.calc.logger, "discrete harmonic"; "n" => n, "contrib" => contrib, "ans" => ans);
        }

        Ok(ans)
    }

    /// Integrate the harmonics past the discrete block, which summed to
    /// *discrete*.
    fn tail(&self, discrete: f64) -> Result<TailOutcome> {
        // The first harmonic not covered by the discrete block.
        let n_start = (f64::from(self.calc.config.harmonic_cap) + self.n_minus + 1.).floor();

        let outcome = match self.calc.config.tail.strategy {
            TailStrategy::Adaptive => self.adaptive_tail(n_start, discrete),
            TailStrategy::Peak => self.peak_tail(n_start, discrete),
        };

        self.gamma_epsabs.set(0.);
        outcome
    }

    /// Let the gamma integrals of a chunk *width* harmonics wide stop once
    /// their error is too small to register against *total*.
    fn set_gamma_floor(&self, total: f64, width: f64) {
        let floor = total.abs() / (self.calc.config.tail.tolerance * width);
        self.gamma_epsabs.set(if floor.is_finite() { floor } else { 0. });
    }

    fn adaptive_tail(&self, mut n_start: f64, discrete: f64) -> Result<TailOutcome> {
        let settings = &self.calc.config.tail;
        let mut n_workspace = gsl::IntegrationWorkspace::new(self.calc.config.integration.n_workspace)?;
        let mut delta_n = settings.initial_step;
        let mut ans = 0_f64;
        let mut iterations = 0;

        trace!(self.calc.logger, ". beginning adaptive tail";
               "n_start" => n_start,
               "delta_n" => delta_n,
               "tolerance" => settings.tolerance,
               "max_iterations" => settings.max_iterations,
        );

        loop {
            if iterations >= settings.max_iterations || !n_start.is_finite() {
                warn!(self.calc.logger, "harmonic tail did not converge";
                      "nu" => self.nu,
                      "iterations" => iterations,
                      "n_start" => n_start,
                      "ans" => ans,
                );
                return Err(Error::TailNotConverged { iterations: iterations, n_start: n_start, ans: ans });
            }

            let deriv = self.harmonic_derivative(n_start)?;
            trace!(self.calc.logger, ". derivative"; "n_start" => n_start, "deriv" => deriv);

            if deriv.abs() < settings.derivative_tolerance {
                delta_n *= settings.step_growth;
                trace!(self.calc.logger, ". increasing delta_n"; "delta_n" => delta_n);
            }

            self.set_gamma_floor(discrete + ans, delta_n);
            let contrib = self.integrate_harmonics(&mut n_workspace, n_start, n_start + delta_n,
                                                   ans.abs() / settings.tolerance)?;

            if contrib.is_nan() || contrib.is_infinite() {
                return Err(Error::NonFinite { stage: "harmonic tail", value: contrib });
            }

            ans += contrib;
            n_start += delta_n;
            iterations += 1;

            trace!(self.calc.logger, ". tail chunk";
                   "iteration" => iterations,
                   "contrib" => format!("{:.16e}", contrib),
                   "ans" => format!("{:.16e}", ans),
            );

            if !(contrib.abs() >= ans.abs() / settings.tolerance) {
                break;
            }
        }

        Ok(TailOutcome { value: ans, iterations: iterations, n_end: n_start })
    }

    fn peak_tail(&self, n_start: f64, discrete: f64) -> Result<TailOutcome> {
        let n_end = self.calc.config.tail.peak_multiple * self.calc.peak_harmonic(self.nu);

        if !n_end.is_finite() {
            return Err(Error::NonFinite { stage: "peak harmonic", value: n_end });
        }

        if !(n_end > n_start) {
            trace!(self.calc.logger, ". peak tail is empty"; "n_start" => n_start, "n_end" => n_end);
            return Ok(TailOutcome { value: 0., iterations: 0, n_end: n_start });
        }

        let mut n_workspace = gsl::IntegrationWorkspace::new(self.calc.config.integration.n_workspace)?;
        self.set_gamma_floor(discrete, n_end - n_start);
        let value = self.integrate_harmonics(&mut n_workspace, n_start, n_end, 0.)?;

        if !value.is_finite() {
            return Err(Error::NonFinite { stage: "harmonic tail", value: value });
        }

        trace!(self.calc.logger, ". peak tail"; "n_start" => n_start, "n_end" => n_end, "value" => value);
        Ok(TailOutcome { value: value, iterations: 1, n_end: n_end })
    }

    /// Centered finite difference of the per-harmonic contribution at *n*.
    fn harmonic_derivative(&self, n: f64) -> Result<f64> {
        let dx = self.calc.config.tail.derivative_step;
        let high = self.harmonic_contribution(n + 0.5 * dx)?;
        let low = self.harmonic_contribution(n - 0.5 * dx)?;
        Ok((high - low) / dx)
    }

    /// Integrate the per-harmonic contribution over `[n_lo, n_hi]`.
    ///
    /// The inner gamma integrals can fail partway through the outer
    /// quadrature, which can only be handed plain numbers. The first such
    /// failure is stashed and returned once GSL is done.
    fn integrate_harmonics(&self, workspace: &mut gsl::IntegrationWorkspace,
                           n_lo: f64, n_hi: f64, epsabs: f64) -> Result<f64> {
        *self.inner_failure.borrow_mut() = None;

        let outcome = workspace.qag(|n| self.harmonic_contribution_or_stash(n), n_lo, n_hi)
            .tolerance(epsabs, self.calc.config.tail.relative_tolerance)
            .rule(gsl::IntegrationRule::GaussKonrod31)
            .compute();

        if let Some(e) = self.inner_failure.borrow_mut().take() {
            return Err(e);
        }

        outcome
            .map(|r| r.value)
            .map_err(|e| Error::Quadrature { n: n_lo, source: e })
    }

    fn harmonic_contribution_or_stash(&self, n: f64) -> f64 {
        match self.harmonic_contribution(n) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = self.inner_failure.borrow_mut();

                if slot.is_none() {
                    *slot = Some(e);
                }

                0.
            },
        }
    }

    /// Integrate the emission integrand across the gamma window of harmonic
    /// *n*. Excluded harmonics contribute zero without any quadrature.
    ///
    /// Inside the tail the integral also carries an absolute error floor, so
    /// harmonics far too weak to matter cannot fail to converge.
    fn harmonic_contribution(&self, n: f64) -> Result<f64> {
        let window = match self.calc.geometry.window(n, self.nu) {
            Some(w) => w,
            None => return Ok(0.),
        };

        if !(window.width() > 0.) {
            return Ok(0.);
        }

        let mut workspace = self.gamma_workspace.borrow_mut();

        workspace.qag(|g| self.gamma_integrand(g, n), window.gamma_minus, window.gamma_plus)
            .tolerance(self.gamma_epsabs.get(), self.calc.config.integration.gamma_relative_tolerance)
            .rule(gsl::IntegrationRule::GaussKonrod31)
            .compute()
            .map(|r| r.value)
            .map_err(|e| Error::Quadrature { n: n, source: e })
    }

    /// The emission integrand at *gamma* for harmonic *n*.
    fn gamma_integrand(&self, gamma: f64, n: f64) -> f64 {
        let beta = (1. - 1. / (gamma * gamma)).sqrt();

        if !(beta > BETA_FLOOR) {
            return 0.;
        }

        let density = self.calc.distribution.density(gamma, self.nu, self.norm);

        if density == 0. {
            return 0.;
        }

        let kernel = self.calc.geometry.kernel(self.stokes, gamma, n, self.nu);

        // The `gamma^2 beta` of the momentum-space volume element; its beta
        // cancels against the `1 / beta` of the resonance Jacobian.
        self.integrand_prefactor * gamma * gamma * density * kernel
    }
}


#[cfg(test)]
mod tests {
    use crate::config::{DistributionKind, PlasmaConfig, TailStrategy};
    use crate::errors::{Error, NormalizationError};
    use crate::Stokes;
    use super::*;

    fn calculator(config: PlasmaConfig) -> EmissivityCalculator {
        let log = slog::Logger::root(slog::Discard, o!());
        EmissivityCalculator::new(config, log).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = PlasmaConfig::default();
        config.temperature = -1.;
        let log = slog::Logger::root(slog::Discard, o!());

        match EmissivityCalculator::new(config, log) {
            Err(Error::Config(_)) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_frequency() {
        let calc = calculator(PlasmaConfig::default());

        for &nu in &[0., -1e8, f64::NAN, f64::INFINITY] {
            assert!(match calc.emissivity(nu) { Err(Error::InvalidFrequency(_)) => true, _ => false });
        }
    }

    #[test]
    fn rejects_unrepresentable_harmonics() {
        let calc = calculator(PlasmaConfig::default());
        let nu = 1e20 * calc.cyclotron_frequency();

        match calc.emissivity(nu) {
            Err(Error::HarmonicOutOfRange { n, .. }) => assert!(n > 1e19),
            other => panic!("unexpected: {:?}", other),
        }

        assert!(match calc.discrete_sum(Stokes::I, nu) { Err(Error::HarmonicOutOfRange { .. }) => true, _ => false });

        match calc.harmonic_sum(Stokes::I, calc.cyclotron_frequency(), u64::MAX - 1, u64::MAX) {
            Err(Error::HarmonicOutOfRange { .. }) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn empty_harmonic_range_is_zero() {
        let calc = calculator(PlasmaConfig::default());
        let nu = 10. * calc.cyclotron_frequency();
        assert_eq!(calc.harmonic_sum(Stokes::I, nu, 20, 19).unwrap(), 0.);

        let mut config = PlasmaConfig::default();
        config.harmonic_cap = 0;
        let calc = calculator(config);
        assert_eq!(calc.discrete_sum(Stokes::I, nu).unwrap(), 0.);
    }

    #[test]
    fn excluded_harmonics_contribute_nothing() {
        let calc = calculator(PlasmaConfig::default());
        let nu = 100. * calc.cyclotron_frequency();
        let n_minus = calc.n_minus(nu);

        assert!(calc.harmonic_window(0.5 * n_minus, nu).is_none());
        assert_eq!(calc.harmonic_contribution(Stokes::I, 0.5 * n_minus, nu).unwrap(), 0.);
    }

    #[test]
    fn discrete_harmonics_are_nonnegative() {
        let calc = calculator(PlasmaConfig::default());
        let nu = 3. * calc.cyclotron_frequency();
        let first = calc.n_minus(nu).floor() as u64 + 1;

        for n in first..(first + 10) {
            let c = calc.harmonic_contribution(Stokes::I, n as f64, nu).unwrap();
            assert!(c.is_finite() && c >= 0., "harmonic {}: {}", n, c);
        }
    }

    #[test]
    fn discrete_sum_matches_harmonic_sum() {
        let calc = calculator(PlasmaConfig::default());
        let nu = 2.5 * calc.cyclotron_frequency();
        let base = calc.n_minus(nu).floor() as u64;

        let a = calc.discrete_sum(Stokes::I, nu).unwrap();
        let b = calc.harmonic_sum(Stokes::I, nu, base + 1, base + 30).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert!(a > 0.);
    }

    #[test]
    fn tail_iteration_ceiling() {
        // Cold enough that the whole tail underflows to exactly zero, so the
        // running total never gets off the ground.
        let mut config = PlasmaConfig::default();
        config.temperature = 0.02;
        config.harmonic_cap = 100;
        config.tail.max_iterations = 5;
        let calc = calculator(config);
        let nu = calc.cyclotron_frequency();

        match calc.tail(Stokes::I, nu) {
            Err(Error::TailNotConverged { iterations, ans, .. }) => {
                assert_eq!(iterations, 5);
                assert_eq!(ans, 0.);
            },
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn tail_terminates() {
        let calc = calculator(PlasmaConfig::default());
        let nu = 10. * calc.cyclotron_frequency();
        let outcome = calc.tail(Stokes::I, nu).unwrap();

        assert!(outcome.value.is_finite() && outcome.value >= 0.);
        assert!(outcome.iterations >= 1);
        assert!(outcome.iterations <= calc.config().tail.max_iterations);
        assert!(outcome.n_end > calc.n_minus(nu) + 30.);
    }

    #[test]
    fn peak_harmonic_branches() {
        let calc = calculator(PlasmaConfig::default());
        let nu_c = calc.cyclotron_frequency();
        let cos2 = calc.geometry().cos_observer_angle().powi(2);

        // Below theta_e^2 nu_c the thermal-width branch applies.
        let expected = (11. + 20_f64.cbrt()) * (1. - (1. - 1. / 121.) * cos2);
        assert_approx_eq!(calc.peak_harmonic(nu_c), expected, 1e-9);

        let s = 1e4;
        let beta2 = 1. - (2e5_f64).powf(-2. / 3.);
        let expected = (11. + 2e5_f64.cbrt()) * s * (1. - beta2 * cos2);
        assert_approx_eq!(calc.peak_harmonic(s * nu_c) / expected, 1., 1e-9);
    }

    #[test]
    fn peak_tail_is_empty_when_peak_is_covered() {
        let mut config = PlasmaConfig::default();
        config.tail.strategy = TailStrategy::Peak;
        config.tail.peak_multiple = 1e-3;
        let calc = calculator(config);
        let nu = calc.cyclotron_frequency();

        let outcome = calc.tail(Stokes::I, nu).unwrap();
        assert_eq!(outcome.value, 0.);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn degenerate_power_law() {
        let mut config = PlasmaConfig::default();
        config.distribution = DistributionKind::PowerLaw;
        config.gamma_min = 50.;
        config.gamma_max = 50.;
        let calc = calculator(config);

        match calc.emissivity_at_multiple(1.) {
            Err(Error::Normalization(NormalizationError::DegenerateWidth { .. })) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn kappa_normalization_is_cached() {
        let mut config = PlasmaConfig::default();
        config.distribution = DistributionKind::Kappa;
        let calc = calculator(config);

        let a = calc.normalization().unwrap();
        let b = calc.normalization().unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(calc.normalization_cache().computations(), 1);
    }

    #[test]
    fn thermal_skips_the_cache() {
        let calc = calculator(PlasmaConfig::default());
        assert!(calc.normalization().unwrap() > 0.);
        assert_eq!(calc.normalization_cache().computations(), 0);
    }
}
