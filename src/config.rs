// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Run configuration.

A `PlasmaConfig` holds everything that stays fixed over a run: physical
constants, the plasma and field parameters, the observer angle, which
electron distribution is active, and the knobs of the numerical integration.
The defaults reproduce the fiducial problem: a `θe = 10` thermal plasma with
`n_e = 1 cm^-3` in a 30 G field, viewed at 60° to the field.

Configurations can be loaded from JSON; any field that is left out takes its
default value.

*/

use serde::{Deserialize, Serialize};
use std::f64;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::{ELECTRON_CHARGE, MASS_ELECTRON, PI, SPEED_LIGHT, TWO_PI};


/// Which electron distribution function is active.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionKind {
    /// The relativistic Maxwell–Jüttner distribution.
    Thermal,

    /// A power law in gamma with an exponential cutoff.
    PowerLaw,

    /// A kappa distribution with an exponential cutoff.
    Kappa,
}

impl FromStr for DistributionKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "thermal" => Ok(DistributionKind::Thermal),
            "power-law" => Ok(DistributionKind::PowerLaw),
            "kappa" => Ok(DistributionKind::Kappa),
            _ => Err(ConfigError::Unrecognized { what: "distribution", value: s.to_owned() }),
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            DistributionKind::Thermal => "thermal",
            DistributionKind::PowerLaw => "power-law",
            DistributionKind::Kappa => "kappa",
        })
    }
}


/// How the harmonics beyond the discretely summed block are handled.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TailStrategy {
    /// Integrate in growing chunks until the chunks stop mattering.
    Adaptive,

    /// Integrate once, up to a fixed multiple of the analytic peak harmonic.
    Peak,
}

impl FromStr for TailStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "adaptive" => Ok(TailStrategy::Adaptive),
            "peak" => Ok(TailStrategy::Peak),
            _ => Err(ConfigError::Unrecognized { what: "tail strategy", value: s.to_owned() }),
        }
    }
}


/// Settings for the integral over the continuous harmonic index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TailSettings {
    /// Which way to integrate the tail.
    pub strategy: TailStrategy,

    /// The width of the first chunk in harmonic number.
    pub initial_step: f64,

    /// The factor by which the chunk width grows when the integrand is flat.
    pub step_growth: f64,

    /// The spacing of the centered difference used to gauge flatness.
    pub derivative_step: f64,

    /// Derivatives smaller than this (in absolute terms) count as flat.
    pub derivative_tolerance: f64,

    /// Stop once a chunk contributes less than `1 / tolerance` of the total.
    pub tolerance: f64,

    /// Relative accuracy requested of each chunk's integral.
    pub relative_tolerance: f64,

    /// Give up after this many chunks.
    pub max_iterations: usize,

    /// For `TailStrategy::Peak`, integrate up to this multiple of the peak
    /// harmonic.
    pub peak_multiple: f64,
}

impl Default for TailSettings {
    fn default() -> Self {
        TailSettings {
            strategy: TailStrategy::Adaptive,
            initial_step: 1e3,
            step_growth: 10.,
            derivative_step: 0.01,
            derivative_tolerance: 1e-10,
            tolerance: 1e13,
            relative_tolerance: 1e-3,
            max_iterations: 64,
            peak_multiple: 10.,
        }
    }
}


/// Settings for the integrals over gamma.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegrationSettings {
    /// Relative accuracy requested of each per-harmonic gamma integral.
    pub gamma_relative_tolerance: f64,

    /// Workspace size (subintervals) for the gamma integrals.
    pub gamma_workspace: usize,

    /// Workspace size (subintervals) for the integrals over harmonic number.
    pub n_workspace: usize,

    /// Relative accuracy of the normalization integral.
    pub normalization_relative_tolerance: f64,

    /// Subdivision budget of the normalization integral.
    pub normalization_limit: usize,

    /// Workspace size for the normalization integral.
    pub normalization_workspace: usize,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        IntegrationSettings {
            gamma_relative_tolerance: 1e-3,
            gamma_workspace: 5000,
            n_workspace: 1000,
            normalization_relative_tolerance: 1e-8,
            normalization_limit: 1000,
            normalization_workspace: 5000,
        }
    }
}


/// Everything needed to set up an emissivity calculation. Units are cgs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlasmaConfig {
    /// Electron rest mass (g).
    pub mass: f64,

    /// Elementary charge (esu).
    pub charge: f64,

    /// Speed of light (cm/s).
    pub speed_of_light: f64,

    /// Electron number density (cm^-3).
    pub density: f64,

    /// Dimensionless temperature `kT / m c^2`. Also sets the width of the
    /// kappa distribution.
    pub temperature: f64,

    /// Magnetic field strength (G).
    pub field_strength: f64,

    /// Observer angle relative to the field (radians).
    pub angle: f64,

    /// Number of harmonics summed discretely before the tail takes over.
    pub harmonic_cap: u32,

    /// The active electron distribution.
    pub distribution: DistributionKind,

    /// Power-law index *p*.
    pub power_law_index: f64,

    /// Lower Lorentz-factor limit of the power law.
    pub gamma_min: f64,

    /// Upper Lorentz-factor limit of the power law.
    pub gamma_max: f64,

    /// Lorentz factor of the exponential cutoff, for the power-law and kappa
    /// distributions.
    pub gamma_cutoff: f64,

    /// The kappa index.
    pub kappa_index: f64,

    /// How the harmonic tail is integrated.
    pub tail: TailSettings,

    /// How the gamma and normalization integrals are done.
    pub integration: IntegrationSettings,
}

impl Default for PlasmaConfig {
    fn default() -> Self {
        PlasmaConfig {
            mass: MASS_ELECTRON,
            charge: ELECTRON_CHARGE,
            speed_of_light: SPEED_LIGHT,
            density: 1.,
            temperature: 10.,
            field_strength: 30.,
            angle: PI / 3.,
            harmonic_cap: 30,
            distribution: DistributionKind::Thermal,
            power_law_index: 3.,
            gamma_min: 1.,
            gamma_max: 1000.,
            gamma_cutoff: 1000.,
            kappa_index: 150.,
            tail: TailSettings::default(),
            integration: IntegrationSettings::default(),
        }
    }
}


fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0. && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field: field, value: value })
    }
}


impl PlasmaConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values. The result is not validated.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let f = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(f)?)
    }

    /// The cyclotron frequency `e B / (2 pi m c)`, in Hz.
    pub fn cyclotron_frequency(&self) -> f64 {
        self.charge * self.field_strength / (TWO_PI * self.mass * self.speed_of_light)
    }

    /// Check that the configuration describes a computable problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("mass", self.mass)?;
        positive("charge", self.charge)?;
        positive("speed_of_light", self.speed_of_light)?;
        positive("density", self.density)?;
        positive("temperature", self.temperature)?;
        positive("field_strength", self.field_strength)?;

        if !(self.angle > 0. && self.angle < PI) {
            return Err(ConfigError::AngleOutOfRange(self.angle));
        }

        if self.angle.cos().abs() < 1e-8 {
            return Err(ConfigError::PerpendicularAngle(self.angle));
        }

        match self.distribution {
            DistributionKind::Thermal => {},

            DistributionKind::PowerLaw => {
                if !(self.power_law_index > 1.) {
                    return Err(ConfigError::PowerLawIndex(self.power_law_index));
                }

                if !(self.gamma_min >= 1.) {
                    return Err(ConfigError::GammaMin(self.gamma_min));
                }

                // Equal limits get through here; the normalization step
                // reports them.
                if !(self.gamma_max >= self.gamma_min) {
                    return Err(ConfigError::GammaRange {
                        gamma_min: self.gamma_min,
                        gamma_max: self.gamma_max,
                    });
                }

                positive("gamma_cutoff", self.gamma_cutoff)?;
            },

            DistributionKind::Kappa => {
                positive("kappa_index", self.kappa_index)?;
                positive("gamma_cutoff", self.gamma_cutoff)?;
            },
        }

        let t = &self.tail;
        positive("tail.initial_step", t.initial_step)?;
        positive("tail.derivative_step", t.derivative_step)?;
        positive("tail.derivative_tolerance", t.derivative_tolerance)?;
        positive("tail.tolerance", t.tolerance)?;
        positive("tail.relative_tolerance", t.relative_tolerance)?;
        positive("tail.peak_multiple", t.peak_multiple)?;

        if !(t.step_growth >= 1. && t.step_growth.is_finite()) {
            return Err(ConfigError::StepGrowth(t.step_growth));
        }

        if t.max_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }

        let i = &self.integration;
        positive("integration.gamma_relative_tolerance", i.gamma_relative_tolerance)?;
        positive("integration.normalization_relative_tolerance", i.normalization_relative_tolerance)?;
        positive("integration.gamma_workspace", i.gamma_workspace as f64)?;
        positive("integration.n_workspace", i.n_workspace as f64)?;
        positive("integration.normalization_limit", i.normalization_limit as f64)?;
        positive("integration.normalization_workspace", i.normalization_workspace as f64)?;

        Ok(())
    }
}
