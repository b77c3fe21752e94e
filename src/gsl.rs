// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! A small builder-style layer over GSL's adaptive quadrature routines.

We only need two of them: QAG, for finite intervals, and QAGIU, for intervals
of the form `[a, ∞)`. Both report failure to meet the requested tolerance as
an error status, which we surface as `GslError::NotConverged` rather than
handing back the best-effort estimate as if it were exact.

*/

use rgsl;
use std::f64;
use std::sync::Once;
use thiserror::Error;


static SILENCE_HANDLER: Once = Once::new();

/// GSL's default error handler aborts the process. We check status codes
/// ourselves, so turn it off before the first workspace is allocated.
fn silence_error_handler() {
    SILENCE_HANDLER.call_once(|| {
        let _ = rgsl::error::set_error_handler_off();
    });
}


/// Ways in which a GSL computation can fail.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GslError {
    /// GSL could not allocate an integration workspace.
    #[error("could not allocate a GSL integration workspace of {0} intervals")]
    Allocation(usize),

    /// The integrator gave up before reaching the requested tolerance.
    #[error("GSL integration failed to converge (status {status})")]
    NotConverged {
        /// GSL's description of the failure.
        status: String,
    },
}

/// Shorthand for results of GSL computations.
pub type GslResult<T> = Result<T, GslError>;


/// An integration workspace. GSL uses this to hold the subintervals of an
/// adaptive integration, so its size bounds the number of subdivisions.
pub struct IntegrationWorkspace {
    inner: rgsl::IntegrationWorkspace,
    size: usize,
}

impl IntegrationWorkspace {
    /// Allocate a workspace that can hold *n* subintervals.
    pub fn new(n: usize) -> GslResult<Self> {
        silence_error_handler();

        rgsl::IntegrationWorkspace::new(n)
            .map(|inner| IntegrationWorkspace { inner: inner, size: n })
            .ok_or(GslError::Allocation(n))
    }

    /// Set up an integral of *f* over `[lower_bound, ∞)`.
    pub fn qagiu<'a, F>(&'a mut self, f: F, lower_bound: f64) -> IntegrationBuilder<'a, F>
        where F: Fn(f64) -> f64
    {
        IntegrationBuilder::new(self, f, Integrator::QAGIU, lower_bound, f64::INFINITY)
    }

    /// Set up an integral of *f* over `[lower_bound, upper_bound]`.
    pub fn qag<'a, F>(&'a mut self, f: F, lower_bound: f64, upper_bound: f64) -> IntegrationBuilder<'a, F>
        where F: Fn(f64) -> f64
    {
        IntegrationBuilder::new(self, f, Integrator::QAG, lower_bound, upper_bound)
    }
}

impl ::std::fmt::Debug for IntegrationWorkspace {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("IntegrationWorkspace").field("size", &self.size).finish()
    }
}


/// The value of an integral and GSL's estimate of its absolute error.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct IntegrationResult {
    pub value: f64,
    pub abserr: f64
}


/// The Gauss-Kronrod rule used by QAG on each subinterval.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum IntegrationRule {
    GaussKonrod15,
    GaussKonrod21,
    GaussKonrod31,
    GaussKonrod41,
    GaussKonrod51,
    GaussKonrod61,
}

impl From<IntegrationRule> for rgsl::GaussKronrodRule {
    fn from(rule: IntegrationRule) -> Self {
        match rule {
            IntegrationRule::GaussKonrod15 => rgsl::GaussKronrodRule::Gauss15,
            IntegrationRule::GaussKonrod21 => rgsl::GaussKronrodRule::Gauss21,
            IntegrationRule::GaussKonrod31 => rgsl::GaussKronrodRule::Gauss31,
            IntegrationRule::GaussKonrod41 => rgsl::GaussKronrodRule::Gauss41,
            IntegrationRule::GaussKonrod51 => rgsl::GaussKronrodRule::Gauss51,
            IntegrationRule::GaussKonrod61 => rgsl::GaussKronrodRule::Gauss61,
        }
    }
}


#[derive(Clone,Copy,Debug,Eq,PartialEq)]
enum Integrator {
    QAG,
    QAGIU,
}


/// A pending integration. Configure it with the chained methods, then call
/// `compute()`.
pub struct IntegrationBuilder<'a, F> where F: Fn(f64) -> f64 {
    workspace: &'a mut IntegrationWorkspace,
    function: F,
    kind: Integrator,
    rule: IntegrationRule,
    lower_bound: f64,
    upper_bound: f64,
    epsabs: f64,
    epsrel: f64,
    limit: usize,
}

impl<'a, F> IntegrationBuilder<'a, F> where F: Fn(f64) -> f64 {
    fn new(ws: &'a mut IntegrationWorkspace, f: F, kind: Integrator,
           lower: f64, upper: f64) -> IntegrationBuilder<'a, F> {
        let limit = ws.size;

        IntegrationBuilder {
            workspace: ws,
            function: f,
            kind: kind,
            rule: IntegrationRule::GaussKonrod31,
            lower_bound: lower,
            upper_bound: upper,
            epsabs: 0.,
            epsrel: 1e-6,
            limit: limit,
        }
    }

    /// Set the absolute and relative error targets. GSL stops once either
    /// one is met.
    pub fn tolerance(mut self, epsabs: f64, epsrel: f64) -> Self {
        self.epsabs = epsabs;
        self.epsrel = epsrel;
        self
    }

    /// Set the Gauss-Kronrod rule. Ignored by QAGIU, which always uses the
    /// 15-point rule.
    pub fn rule(mut self, rule: IntegrationRule) -> Self {
        self.rule = rule;
        self
    }

    /// Cap the number of subdivisions. Values larger than the workspace size
    /// are clamped to it.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(self.workspace.size);
        self
    }

    pub fn compute(self) -> GslResult<IntegrationResult> {
        let IntegrationBuilder { workspace, function, kind, rule, lower_bound, upper_bound,
                                 epsabs, epsrel, limit } = self;

        let outcome = match kind {
            Integrator::QAG => workspace.inner.qag(
                function, lower_bound, upper_bound, epsabs, epsrel, limit, rule.into()
            ),
            Integrator::QAGIU => workspace.inner.qagiu(
                function, lower_bound, epsabs, epsrel, limit
            ),
        };

        outcome
            .map(|(value, abserr)| IntegrationResult { value: value, abserr: abserr })
            .map_err(|status| GslError::NotConverged { status: format!("{:?}", status) })
    }
}


#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use super::*;

    #[test]
    fn qag_smooth() {
        let mut ws = IntegrationWorkspace::new(1024).unwrap();
        let r = ws.qag(|x| x.cos().powi(2), 0., 0.5 * PI)
            .tolerance(0., 1e-8)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, 0.25 * PI, 1e-8);
        assert!(r.abserr < 1e-6);
    }

    #[test]
    fn qagiu_power() {
        let mut ws = IntegrationWorkspace::new(1024).unwrap();
        let r = ws.qagiu(|x| 1. / (x * x), 0.5)
            .tolerance(0., 1e-6)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, 2., 1e-5);
    }

    #[test]
    fn qag_reports_nonconvergence() {
        // One subinterval can't resolve an endpoint singularity this tightly.
        let mut ws = IntegrationWorkspace::new(1024).unwrap();
        let r = ws.qag(|x| 1. / x.sqrt(), 0., 1.)
            .tolerance(0., 1e-12)
            .rule(IntegrationRule::GaussKonrod15)
            .limit(1)
            .compute();

        match r {
            Err(GslError::NotConverged { .. }) => {},
            other => panic!("expected a convergence failure, got {:?}", other),
        }
    }

    #[test]
    fn limit_is_clamped() {
        let mut ws = IntegrationWorkspace::new(16).unwrap();
        assert_eq!(ws.size, 16);
        let b = ws.qag(|x| x, 0., 1.).limit(1000);
        assert_eq!(b.limit, 16);
    }
}
