//! Configuration for the nonmonotone barrier parameter update.

use std::fmt;
use std::str::FromStr;

use crate::error::{BarrierError, BarrierResult};
use crate::options::{OptionValue, OptionsList};

/// Progress acceptance mechanism used to decide whether μ may keep adapting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Globalization {
    /// Compare the scaled KKT residual against a sliding window of
    /// previously accepted values.
    #[default]
    Window,

    /// Test (objective, constraint violation) against a dominance filter.
    Filter,
}

impl Globalization {
    /// Integer code used by the `adaptive_globalization` option.
    pub fn code(self) -> i64 {
        match self {
            Globalization::Window => 1,
            Globalization::Filter => 2,
        }
    }

    pub fn from_code(code: i64) -> BarrierResult<Self> {
        match code {
            1 => Ok(Globalization::Window),
            2 => Ok(Globalization::Filter),
            other => Err(BarrierError::UnknownGlobalization(other.to_string())),
        }
    }
}

impl FromStr for Globalization {
    type Err = BarrierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" | "1" => Ok(Globalization::Window),
            "filter" | "2" => Ok(Globalization::Filter),
            _ => Err(BarrierError::UnknownGlobalization(s.to_string())),
        }
    }
}

impl fmt::Display for Globalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Globalization::Window => write!(f, "window"),
            Globalization::Filter => write!(f, "filter"),
        }
    }
}

/// User-facing settings for [`NonmonotoneMuUpdate`](crate::barrier::NonmonotoneMuUpdate).
///
/// Fields left at their defaults reproduce the standard nonmonotone
/// strategy. `mu_min` and `tau_max` are optional because their defaults
/// depend on other settings (`tol` and `tau_min` respectively).
#[derive(Debug, Clone)]
pub struct NonmonotoneSettings {
    /// Overall convergence tolerance ε of the surrounding solver
    pub tol: f64,

    /// Upper bound on μ
    pub mu_max: f64,

    /// Lower bound on μ (None = 0.1 * tol)
    pub mu_min: Option<f64>,

    /// Lower bound on the fraction-to-boundary parameter
    pub tau_min: f64,

    /// Upper bound on the fraction-to-boundary parameter (None = tau_min)
    pub tau_max: Option<f64>,

    /// Exponent for the μ safeguard (accepted and validated, not used by
    /// the safeguard formula)
    pub mu_safeguard_exp: f64,

    /// Scaling factor for the lower μ safeguard (0 disables it)
    pub mu_safeguard_factor: f64,

    /// Required reduction of the scaled residual relative to a window entry
    pub refs_red_fact: f64,

    /// Capacity of the progress window
    pub max_refs: usize,

    /// Never switch to fixed mode
    pub mu_never_fix: bool,

    /// Progress acceptance mechanism
    pub globalization: Globalization,

    /// Barrier subproblem tolerance factor in fixed mode (error <= κ_ε μ)
    pub kappa_epsilon: f64,

    /// Linear decrease factor for μ in fixed mode
    pub kappa_mu: f64,

    /// Superlinear decrease exponent for μ in fixed mode
    pub theta_mu: f64,
}

impl Default for NonmonotoneSettings {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            mu_max: 1e10,
            mu_min: None,
            tau_min: 0.99,
            tau_max: None,
            mu_safeguard_exp: 0.0,
            mu_safeguard_factor: 0.0,
            refs_red_fact: 0.9999,
            max_refs: 4,
            mu_never_fix: false,
            globalization: Globalization::Window,
            kappa_epsilon: 10.0,
            kappa_mu: 0.2,
            theta_mu: 1.5,
        }
    }
}

/// Validated, fully resolved parameter set.
///
/// Only obtainable through [`NonmonotoneSettings::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct NonmonotoneParams {
    pub tol: f64,
    pub mu_max: f64,
    pub mu_min: f64,
    pub tau_min: f64,
    pub tau_max: f64,
    pub mu_safeguard_exp: f64,
    pub mu_safeguard_factor: f64,
    pub refs_red_fact: f64,
    pub max_refs: usize,
    pub mu_never_fix: bool,
    pub globalization: Globalization,
    pub kappa_epsilon: f64,
    pub kappa_mu: f64,
    pub theta_mu: f64,
}

#[inline]
fn positive(v: f64) -> bool {
    v > 0.0
}

#[inline]
fn non_negative(v: f64) -> bool {
    v >= 0.0
}

#[inline]
fn closed_interval(v: f64, lo: f64, hi: f64) -> bool {
    v >= lo && v <= hi
}

#[inline]
fn open_interval(v: f64, lo: f64, hi: f64) -> bool {
    v > lo && v < hi
}

impl NonmonotoneSettings {
    /// Use the dominance filter instead of the residual window.
    pub fn with_filter(mut self) -> Self {
        self.globalization = Globalization::Filter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_mu_bounds(mut self, mu_min: f64, mu_max: f64) -> Self {
        self.mu_min = Some(mu_min);
        self.mu_max = mu_max;
        self
    }

    pub fn with_tau_bounds(mut self, tau_min: f64, tau_max: f64) -> Self {
        self.tau_min = tau_min;
        self.tau_max = Some(tau_max);
        self
    }

    pub fn with_safeguard_factor(mut self, factor: f64) -> Self {
        self.mu_safeguard_factor = factor;
        self
    }

    pub fn with_window(mut self, max_refs: usize, refs_red_fact: f64) -> Self {
        self.globalization = Globalization::Window;
        self.max_refs = max_refs;
        self.refs_red_fact = refs_red_fact;
        self
    }

    pub fn with_never_fix(mut self, never_fix: bool) -> Self {
        self.mu_never_fix = never_fix;
        self
    }

    /// Read settings from a named option list.
    ///
    /// Options that are absent keep their default. The result is validated
    /// before it is returned.
    pub fn from_options(options: &OptionsList, prefix: &str) -> BarrierResult<Self> {
        let mut s = Self::default();

        if let Some(v) = options.get_numeric("tol", prefix)? {
            s.tol = v;
        }
        if let Some(v) = options.get_numeric("mu_max", prefix)? {
            s.mu_max = v;
        }
        s.mu_min = options.get_numeric("mu_min", prefix)?;
        if let Some(v) = options.get_numeric("tau_min", prefix)? {
            s.tau_min = v;
        }
        s.tau_max = options.get_numeric("tau_max", prefix)?;
        if let Some(v) = options.get_numeric("mu_safeguard_exp", prefix)? {
            s.mu_safeguard_exp = v;
        }
        if let Some(v) = options.get_numeric("mu_safeguard_factor", prefix)? {
            s.mu_safeguard_factor = v;
        }
        if let Some(v) = options.get_numeric("nonmonotone_mu_refs_redfact", prefix)? {
            s.refs_red_fact = v;
        }
        if let Some(v) = options.get_integer("nonmonotone_mu_max_refs", prefix)? {
            s.max_refs = usize::try_from(v).map_err(|_| {
                BarrierError::out_of_range(
                    "nonmonotone_mu_max_refs",
                    v,
                    "This value must be non-negative.",
                )
            })?;
        }
        if let Some(v) = options.get_integer("mu_never_fix", prefix)? {
            s.mu_never_fix = v != 0;
        }
        s.globalization = match options.get("adaptive_globalization", prefix) {
            None => Globalization::default(),
            Some(OptionValue::String(name)) => name.parse()?,
            Some(OptionValue::Integer(code)) => Globalization::from_code(*code)?,
            Some(OptionValue::Numeric(_)) => {
                return Err(BarrierError::OptionType {
                    option: "adaptive_globalization".to_string(),
                    expected: "integer or string",
                })
            }
        };
        if let Some(v) = options.get_numeric("kappa_epsilon", prefix)? {
            s.kappa_epsilon = v;
        }
        if let Some(v) = options.get_numeric("kappa_mu", prefix)? {
            s.kappa_mu = v;
        }
        if let Some(v) = options.get_numeric("theta_mu", prefix)? {
            s.theta_mu = v;
        }

        s.validate()?;
        Ok(s)
    }

    /// Check every range and resolve dependent defaults.
    pub fn validate(&self) -> BarrierResult<NonmonotoneParams> {
        if !positive(self.tol) {
            return Err(BarrierError::out_of_range(
                "tol",
                self.tol,
                "This value must be larger than 0.",
            ));
        }
        if !positive(self.mu_max) {
            return Err(BarrierError::out_of_range(
                "mu_max",
                self.mu_max,
                "This value must be larger than 0.",
            ));
        }
        let mu_min = self.mu_min.unwrap_or(0.1 * self.tol);
        if !open_interval(mu_min, 0.0, self.mu_max) {
            return Err(BarrierError::out_of_range(
                "mu_min",
                mu_min,
                "This value must be larger than 0 and less than mu_max.",
            ));
        }
        if !open_interval(self.tau_min, 0.0, 1.0) {
            return Err(BarrierError::out_of_range(
                "tau_min",
                self.tau_min,
                "This value must be between 0 and 1.",
            ));
        }
        let tau_max = self.tau_max.unwrap_or(self.tau_min);
        if !closed_interval(tau_max, self.tau_min, 1.0) {
            return Err(BarrierError::out_of_range(
                "tau_max",
                tau_max,
                "This value must be between tau_min and 1.",
            ));
        }
        if !non_negative(self.mu_safeguard_exp) {
            return Err(BarrierError::out_of_range(
                "mu_safeguard_exp",
                self.mu_safeguard_exp,
                "This value must be non-negative.",
            ));
        }
        if !non_negative(self.mu_safeguard_factor) {
            return Err(BarrierError::out_of_range(
                "mu_safeguard_factor",
                self.mu_safeguard_factor,
                "This value must be non-negative.",
            ));
        }
        if !open_interval(self.refs_red_fact, 0.0, 1.0) {
            return Err(BarrierError::out_of_range(
                "nonmonotone_mu_refs_redfact",
                self.refs_red_fact,
                "This value must be between 0 and 1.",
            ));
        }
        if !positive(self.kappa_epsilon) {
            return Err(BarrierError::out_of_range(
                "kappa_epsilon",
                self.kappa_epsilon,
                "This value must be larger than 0.",
            ));
        }
        if !open_interval(self.kappa_mu, 0.0, 1.0) {
            return Err(BarrierError::out_of_range(
                "kappa_mu",
                self.kappa_mu,
                "This value must be between 0 and 1.",
            ));
        }
        if !open_interval(self.theta_mu, 1.0, 2.0) {
            return Err(BarrierError::out_of_range(
                "theta_mu",
                self.theta_mu,
                "This value must be between 1 and 2.",
            ));
        }

        Ok(NonmonotoneParams {
            tol: self.tol,
            mu_max: self.mu_max,
            mu_min,
            tau_min: self.tau_min,
            tau_max,
            mu_safeguard_exp: self.mu_safeguard_exp,
            mu_safeguard_factor: self.mu_safeguard_factor,
            refs_red_fact: self.refs_red_fact,
            max_refs: self.max_refs,
            mu_never_fix: self.mu_never_fix,
            globalization: self.globalization,
            kappa_epsilon: self.kappa_epsilon,
            kappa_mu: self.kappa_mu,
            theta_mu: self.theta_mu,
        })
    }
}
