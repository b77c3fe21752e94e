// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Once-only computation of distribution normalization constants.

Distributions without a closed-form normalization are normalized by
integrating their unnormalized kernel over `[1, ∞)` with QAGIU. That integral
is the most expensive single quadrature of a run and its value never
changes, so it is done at most once per cache and the outcome is kept,
successful or not. A failed computation is remembered as a failure: it is
never confused with a cache that has not been filled yet, and it is not
retried.

The cache is a `OnceLock`, so a calculator holding one can be shared between
threads and the integral is still computed exactly once.

*/

use std::f64;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crate::config::IntegrationSettings;
use crate::errors::NormalizationError;
use crate::gsl;
use crate::DistributionFunction;


/// The state of a `NormalizationCache`.
#[derive(Clone, Debug, PartialEq)]
pub enum NormalizationState {
    /// Nobody has asked yet.
    Uncomputed,

    /// The constant, as computed.
    Computed(f64),

    /// The computation failed, and will not be retried.
    Failed(NormalizationError),
}


/// A lazily computed, write-once normalization constant.
#[derive(Debug, Default)]
pub struct NormalizationCache {
    cell: OnceLock<Result<f64, NormalizationError>>,
    computations: AtomicUsize,
}

impl NormalizationCache {
    /// An empty cache.
    pub fn new() -> Self {
        NormalizationCache::default()
    }

    /// Get the normalization constant of *distrib*, integrating its kernel
    /// if this is the first request.
    ///
    /// Distributions that have a closed-form normalization are not integrated;
    /// asking for one here gives `NormalizationError::ClosedForm`.
    pub fn get_or_compute<D>(&self, distrib: &D, settings: &IntegrationSettings)
                             -> Result<f64, NormalizationError>
        where D: DistributionFunction + ?Sized
    {
        if distrib.closed_form_normalization().is_some() {
            return Err(NormalizationError::ClosedForm);
        }

        self.cell.get_or_init(|| {
            self.computations.fetch_add(1, Ordering::SeqCst);
            integrate_kernel(distrib, settings)
        }).clone()
    }

    /// What the cache currently holds.
    pub fn state(&self) -> NormalizationState {
        match self.cell.get() {
            None => NormalizationState::Uncomputed,
            Some(&Ok(v)) => NormalizationState::Computed(v),
            Some(&Err(ref e)) => NormalizationState::Failed(e.clone()),
        }
    }

    /// How many times the kernel integral has been evaluated. Never more
    /// than one.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::SeqCst)
    }
}


/// Compute `1 / ∫_1^∞ kernel(γ) dγ` for *distrib*.
pub fn integrate_kernel<D>(distrib: &D, settings: &IntegrationSettings) -> Result<f64, NormalizationError>
    where D: DistributionFunction + ?Sized
{
    distrib.check_normalizable()?;

    let mut ws = gsl::IntegrationWorkspace::new(settings.normalization_workspace)?;
    let integral = ws.qagiu(|g| distrib.unnormalized_kernel(g), 1.)
        .tolerance(0., settings.normalization_relative_tolerance)
        .limit(settings.normalization_limit)
        .compute()?
        .value;

    if !(integral.is_finite() && integral > 0.) {
        return Err(NormalizationError::NonPositive(integral));
    }

    Ok(1. / integral)
}


#[cfg(test)]
mod tests {
    use std::f64;

    use crate::config::IntegrationSettings;
    use crate::errors::NormalizationError;
    use crate::{DistributionFunction, KappaDistribution, PowerLawDistribution, ThermalJuettnerDistribution};
    use super::{NormalizationCache, NormalizationState};

    #[test]
    fn computed_once() {
        let d = KappaDistribution::new(150., 10.).gamma_cutoff(1000.);
        let settings = IntegrationSettings::default();
        let cache = NormalizationCache::new();
        assert_eq!(cache.state(), NormalizationState::Uncomputed);
        assert_eq!(cache.computations(), 0);

        let a = cache.get_or_compute(&d, &settings).unwrap();
        let b = cache.get_or_compute(&d, &settings).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(cache.computations(), 1);
        assert_eq!(cache.state(), NormalizationState::Computed(a));
    }

    #[test]
    fn power_law_analytic() {
        // Without a cutoff to speak of, the integral is A / (p - 1) with
        // gamma_min = 1, i.e. 1 / (1 - gamma_max^(1-p)).
        let d = PowerLawDistribution::new(3.).gamma_limits(1., 1000., 1e30);
        let norm = super::integrate_kernel(&d, &IntegrationSettings::default()).unwrap();
        assert_approx_eq!(norm, 1. - 1e-6, 1e-7);
    }

    #[test]
    fn degenerate_power_law_fails_fast() {
        let d = PowerLawDistribution::new(3.).gamma_limits(50., 50., 1000.);
        let cache = NormalizationCache::new();
        let settings = IntegrationSettings::default();

        let e = cache.get_or_compute(&d, &settings).unwrap_err();
        assert!(match e { NormalizationError::DegenerateWidth { .. } => true, _ => false });

        // The failure sticks.
        let e2 = cache.get_or_compute(&d, &settings).unwrap_err();
        assert_eq!(e, e2);
        assert_eq!(cache.computations(), 1);
        assert_eq!(cache.state(), NormalizationState::Failed(e));
    }

    #[test]
    fn thermal_is_closed_form() {
        let d = ThermalJuettnerDistribution::new(10.);
        let cache = NormalizationCache::new();
        let e = cache.get_or_compute(&d, &IntegrationSettings::default()).unwrap_err();
        assert_eq!(e, NormalizationError::ClosedForm);
        assert_eq!(cache.state(), NormalizationState::Uncomputed);
        assert!(d.closed_form_normalization().unwrap() > 0.);
    }

    #[test]
    fn thread_safe() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(NormalizationCache::new());
        let d = KappaDistribution::new(4., 3.).gamma_cutoff(1e4);

        let handles: Vec<_> = (0..4).map(|_| {
            let cache = cache.clone();
            thread::spawn(move || {
                cache.get_or_compute(&d, &IntegrationSettings::default()).unwrap().to_bits()
            })
        }).collect();

        let values: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(values.iter().all(|&v| v == values[0]));
        assert_eq!(cache.computations(), 1);
    }
}
