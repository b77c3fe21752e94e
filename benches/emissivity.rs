// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/// Time the emissivity calculation for each distribution at a few
/// frequencies.
///
/// The benchmarker runs each "iteration" many times, and the higher
/// frequencies push the harmonic tail out a long way, so this is slow.

#[macro_use] extern crate bencher;
extern crate gyrosum;
extern crate gyrosum_test_support;

use bencher::Bencher;
use gyrosum::{DistributionKind, EmissivityCalculator, PlasmaConfig, Stokes, TailStrategy};
use gyrosum_test_support::quiet_log;


fn calculator(kind: DistributionKind, tail: TailStrategy) -> EmissivityCalculator {
    let mut config = PlasmaConfig::default();
    config.distribution = kind;
    config.tail.strategy = tail;
    EmissivityCalculator::new(config, quiet_log()).unwrap()
}


fn thermal_s1(b: &mut Bencher) {
    let calc = calculator(DistributionKind::Thermal, TailStrategy::Adaptive);
    b.iter(|| calc.emissivity_at_multiple(1.).unwrap());
}

fn thermal_s100(b: &mut Bencher) {
    let calc = calculator(DistributionKind::Thermal, TailStrategy::Adaptive);
    b.iter(|| calc.emissivity_at_multiple(100.).unwrap());
}

fn thermal_s100_peak(b: &mut Bencher) {
    let calc = calculator(DistributionKind::Thermal, TailStrategy::Peak);
    b.iter(|| calc.emissivity_at_multiple(100.).unwrap());
}

fn powerlaw_s10(b: &mut Bencher) {
    let calc = calculator(DistributionKind::PowerLaw, TailStrategy::Adaptive);
    b.iter(|| calc.emissivity_at_multiple(10.).unwrap());
}

fn kappa_s10(b: &mut Bencher) {
    let calc = calculator(DistributionKind::Kappa, TailStrategy::Adaptive);
    b.iter(|| calc.emissivity_at_multiple(10.).unwrap());
}

/// Just the discrete block, to separate its cost from the tail's.
fn thermal_discrete_s100(b: &mut Bencher) {
    let calc = calculator(DistributionKind::Thermal, TailStrategy::Adaptive);
    let nu = 100. * calc.cyclotron_frequency();
    b.iter(|| calc.discrete_sum(Stokes::I, nu).unwrap());
}


benchmark_group!(thermal, thermal_s1, thermal_s100, thermal_s100_peak, thermal_discrete_s100);
benchmark_group!(nonthermal, powerlaw_s10, kappa_s10);
benchmark_main!(thermal, nonthermal);
