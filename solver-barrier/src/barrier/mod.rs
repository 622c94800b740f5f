//! Adaptive nonmonotone barrier parameter update.
//!
//! Once per outer iteration the controller decides μ and the
//! fraction-to-boundary parameter τ. It runs in one of two modes:
//!
//! - **Free**: an oracle proposes μ every iteration. The proposal is
//!   clipped to `[mu_min, mu_max]` and raised to the lower safeguard.
//! - **Fixed**: μ is held at a safeguarded value and only reduced
//!   monotonically once the barrier subproblem is solved to `κ_ε μ`.
//!
//! The switch between modes is driven by a progress test. With the
//! [`Globalization::Window`] strategy the scaled KKT residual must improve
//! on some entry of a sliding window of accepted residuals; with
//! [`Globalization::Filter`] the (objective, violation) pair must not be
//! dominated by a filter entry. Free mode is kept while progress is made,
//! fixed mode is entered as soon as it is not, and left again as soon as
//! progress resumes.
//!
//! Problems without any bound multipliers have no barrier term at all;
//! μ and τ are then pinned at their minima on the first call.

pub mod filter;
pub mod safeguard;
pub mod window;

pub use filter::{DominanceFilter, FilterEntry, ParetoFilter};
pub use safeguard::{scaled_kkt_residual, InfeasibilityBaseline, MuSafeguard};
pub use window::ProgressWindow;

use crate::data::{IpmData, IterateMeasures};
use crate::error::BarrierResult;
use crate::line_search::LineSearch;
use crate::options::OptionsList;
use crate::oracle::MuOracle;
use crate::settings::{Globalization, NonmonotoneParams, NonmonotoneSettings};

/// Margin applied to filter entries so that later points cannot sit
/// arbitrarily close to the filter boundary.
pub const FILTER_MARGIN: f64 = 1e-5;

/// Reference residual used by the filter strategy when choosing a fixed μ.
pub const FILTER_MAX_REF: f64 = 1e20;

/// Barrier parameter mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum MuMode {
    #[default]
    Free,
    Fixed,
}

/// What a call to [`NonmonotoneMuUpdate::update_barrier_parameter`] did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// No bound multipliers: μ and τ are pinned at their minima.
    NoBounds,

    /// Stayed in free mode and took the oracle's μ.
    Free { mu: f64, tau: f64, safeguarded: bool },

    /// Progress resumed in fixed mode; back to free mode with the oracle's μ.
    ReturnedToFree { mu: f64, tau: f64, safeguarded: bool },

    /// Insufficient progress in free mode; switched to fixed mode.
    EnteredFixed { mu: f64, tau: f64 },

    /// Stayed in fixed mode and reduced μ.
    FixedDecrease { mu: f64, tau: f64 },

    /// Stayed in fixed mode without changing μ.
    FixedHold,
}

impl UpdateOutcome {
    /// Whether this call committed new values of μ and τ.
    pub fn committed(&self) -> bool {
        !matches!(self, UpdateOutcome::NoBounds | UpdateOutcome::FixedHold)
    }
}

/// Progress acceptance state, one variant per strategy.
enum Acceptance {
    Window(ProgressWindow),
    Filter(Box<dyn DominanceFilter>),
}

/// Result of counting bound multipliers on the first call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum BoundsCheck {
    Pending,
    HasBounds,
    NoBounds,
}

/// Nonmonotone (free/fixed mode) barrier parameter update.
pub struct NonmonotoneMuUpdate {
    params: NonmonotoneParams,
    free_oracle: Box<dyn MuOracle>,
    fixed_oracle: Option<Box<dyn MuOracle>>,
    acceptance: Acceptance,
    safeguard: MuSafeguard,
    bounds: BoundsCheck,
}

impl NonmonotoneMuUpdate {
    /// Build the controller from settings.
    ///
    /// The oracles are initialized with an empty option list. Fails if the
    /// settings are out of range or an oracle refuses to initialize.
    pub fn new(
        settings: &NonmonotoneSettings,
        free_oracle: Box<dyn MuOracle>,
        fixed_oracle: Option<Box<dyn MuOracle>>,
    ) -> BarrierResult<Self> {
        Self::build(settings, free_oracle, fixed_oracle, &OptionsList::new(), "")
    }

    /// Build the controller from a named option list.
    ///
    /// The same list and prefix are forwarded to both oracles.
    pub fn from_options(
        options: &OptionsList,
        prefix: &str,
        free_oracle: Box<dyn MuOracle>,
        fixed_oracle: Option<Box<dyn MuOracle>>,
    ) -> BarrierResult<Self> {
        let settings = NonmonotoneSettings::from_options(options, prefix)?;
        Self::build(&settings, free_oracle, fixed_oracle, options, prefix)
    }

    fn build(
        settings: &NonmonotoneSettings,
        mut free_oracle: Box<dyn MuOracle>,
        mut fixed_oracle: Option<Box<dyn MuOracle>>,
        options: &OptionsList,
        prefix: &str,
    ) -> BarrierResult<Self> {
        let params = settings.validate()?;

        free_oracle.initialize(options, prefix)?;
        if let Some(oracle) = fixed_oracle.as_mut() {
            oracle.initialize(options, prefix)?;
        }

        let acceptance = match params.globalization {
            Globalization::Window => Acceptance::Window(ProgressWindow::new(params.max_refs)),
            Globalization::Filter => Acceptance::Filter(Box::new(ParetoFilter::new())),
        };

        log::debug!(
            "nonmonotone mu update: globalization={} free oracle={} fixed oracle={}",
            params.globalization,
            free_oracle.name(),
            fixed_oracle.as_ref().map_or("avrg_compl", |o| o.name()),
        );

        Ok(Self {
            safeguard: MuSafeguard::new(params.mu_safeguard_factor),
            params,
            free_oracle,
            fixed_oracle,
            acceptance,
            bounds: BoundsCheck::Pending,
        })
    }

    /// Use a custom dominance filter. Switches the strategy to
    /// [`Globalization::Filter`].
    pub fn with_filter(mut self, filter: Box<dyn DominanceFilter>) -> Self {
        self.params.globalization = Globalization::Filter;
        self.acceptance = Acceptance::Filter(filter);
        self
    }

    pub fn params(&self) -> &NonmonotoneParams {
        &self.params
    }

    /// The progress window, when the window strategy is active.
    pub fn window(&self) -> Option<&ProgressWindow> {
        match &self.acceptance {
            Acceptance::Window(w) => Some(w),
            Acceptance::Filter(_) => None,
        }
    }

    /// The dominance filter, when the filter strategy is active.
    pub fn filter(&self) -> Option<&dyn DominanceFilter> {
        match &self.acceptance {
            Acceptance::Window(_) => None,
            Acceptance::Filter(f) => Some(&**f),
        }
    }

    /// `None` before the first update, then whether the problem has any
    /// bound multipliers.
    pub fn has_bounds(&self) -> Option<bool> {
        match self.bounds {
            BoundsCheck::Pending => None,
            BoundsCheck::HasBounds => Some(true),
            BoundsCheck::NoBounds => Some(false),
        }
    }

    pub fn safeguard_baseline(&self) -> Option<InfeasibilityBaseline> {
        self.safeguard.baseline()
    }

    /// Decide and commit μ and τ for the current iteration.
    pub fn update_barrier_parameter<L>(
        &mut self,
        iterate: &IterateMeasures,
        data: &mut IpmData,
        line_search: &mut L,
    ) -> UpdateOutcome
    where
        L: LineSearch + ?Sized,
    {
        if self.pin_if_no_bounds(iterate, data) {
            return UpdateOutcome::NoBounds;
        }

        let mut returned_to_free = false;
        let mut fixed_outcome = None;

        match data.mode() {
            MuMode::Fixed => {
                if self.check_sufficient_progress(iterate) {
                    log::debug!("Switching back to free mu mode.");
                    data.set_mode(MuMode::Free);
                    self.remember_current_point_as_accepted(iterate);
                    returned_to_free = true;
                } else {
                    log::debug!("Remaining in fixed mu mode.");
                    let mu = data.mu();
                    if iterate.barrier_error <= self.params.kappa_epsilon * mu {
                        let new_mu = self.decreased_fixed_mu(mu);
                        let new_tau = self.compute_tau(new_mu);
                        data.set_mu(new_mu);
                        data.set_tau(new_tau);
                        log::debug!(
                            "Reducing mu to {:e} in fixed mu mode. Tau becomes {:e}",
                            new_mu,
                            new_tau
                        );
                        line_search.reset();
                        fixed_outcome = Some(UpdateOutcome::FixedDecrease {
                            mu: new_mu,
                            tau: new_tau,
                        });
                    }
                }
            }
            MuMode::Free => {
                if self.check_sufficient_progress(iterate) {
                    log::debug!("Staying in free mu mode.");
                    self.remember_current_point_as_accepted(iterate);
                } else {
                    data.set_mode(MuMode::Fixed);

                    let mu = self.new_fixed_mu(iterate, data.mu());
                    let tau = self.compute_tau(mu);
                    data.set_mu(mu);
                    data.set_tau(tau);
                    log::debug!(
                        "Switching to fixed mu mode with mu = {:e} and tau = {:e}.",
                        mu,
                        tau
                    );
                    line_search.reset();
                    fixed_outcome = Some(UpdateOutcome::EnteredFixed { mu, tau });
                }
            }
        }

        if data.free_mu_mode() {
            let (mu, tau, safeguarded) = self.free_mode_update(iterate, data);
            line_search.reset();
            if returned_to_free {
                UpdateOutcome::ReturnedToFree { mu, tau, safeguarded }
            } else {
                UpdateOutcome::Free { mu, tau, safeguarded }
            }
        } else {
            match fixed_outcome {
                Some(decrease @ UpdateOutcome::FixedDecrease { .. }) => decrease,
                other => {
                    data.append_info("F");
                    other.unwrap_or(UpdateOutcome::FixedHold)
                }
            }
        }
    }

    /// Whether the current iterate made enough progress to stay in (or
    /// return to) free mode.
    pub fn check_sufficient_progress(&self, iterate: &IterateMeasures) -> bool {
        if self.params.mu_never_fix {
            return true;
        }

        match &self.acceptance {
            Acceptance::Window(window) => {
                if !window.is_full() {
                    return true;
                }
                window.accepts(scaled_kkt_residual(iterate), self.params.refs_red_fact)
            }
            Acceptance::Filter(filter) => {
                filter.acceptable(iterate.objective, iterate.constraint_violation)
            }
        }
    }

    /// Record the current iterate as accepted by the progress test.
    pub fn remember_current_point_as_accepted(&mut self, iterate: &IterateMeasures) {
        match &mut self.acceptance {
            Acceptance::Window(window) => {
                window.push(scaled_kkt_residual(iterate));
                if log::log_enabled!(log::Level::Trace) {
                    for (i, r) in window.iter().enumerate() {
                        log::trace!("pd system reference[{:2}] = {:.6e}", i + 1, r);
                    }
                }
            }
            Acceptance::Filter(filter) => {
                let theta = iterate.constraint_violation;
                filter.add_entry(
                    iterate.objective - FILTER_MARGIN * theta,
                    theta - FILTER_MARGIN * theta,
                    iterate.iter_count,
                );
            }
        }
    }

    /// μ to use when entering fixed mode.
    ///
    /// `current_mu` is only used if the fixed-mode oracle returns an
    /// unusable value.
    pub fn new_fixed_mu(&mut self, iterate: &IterateMeasures, current_mu: f64) -> f64 {
        let max_ref = match &self.acceptance {
            Acceptance::Window(window) => window.max().unwrap_or(f64::INFINITY),
            Acceptance::Filter(_) => FILTER_MAX_REF,
        };

        let candidate = match self.fixed_oracle.as_mut() {
            Some(oracle) => {
                let mu = oracle.calculate_mu(iterate);
                checked_oracle_mu(oracle.name(), mu, current_mu)
            }
            None => iterate.avrg_compl,
        };

        let mut mu = candidate.max(self.lower_mu_safeguard(iterate));
        mu = mu.min(0.1 * max_ref);

        mu.max(self.params.mu_min).min(self.params.mu_max)
    }

    /// Lower safeguard for μ at the current iterate.
    pub fn lower_mu_safeguard(&mut self, iterate: &IterateMeasures) -> f64 {
        let window = match &self.acceptance {
            Acceptance::Window(w) => Some(w),
            Acceptance::Filter(_) => None,
        };
        self.safeguard.lower_bound(iterate, window)
    }

    /// τ(μ) = max(τ_min, min(1 - μ, τ_max)).
    #[inline]
    pub fn compute_tau(&self, mu: f64) -> f64 {
        self.params.tau_min.max((1.0 - mu).min(self.params.tau_max))
    }

    fn pin_if_no_bounds(&mut self, iterate: &IterateMeasures, data: &mut IpmData) -> bool {
        if self.bounds == BoundsCheck::Pending {
            if iterate.dims.n_bounds() == 0 {
                data.set_mu(self.params.mu_min);
                data.set_tau(self.params.tau_min);
                log::debug!(
                    "No bound multipliers: fixing mu = {:e} and tau = {:e}",
                    self.params.mu_min,
                    self.params.tau_min
                );
                self.bounds = BoundsCheck::NoBounds;
            } else {
                self.bounds = BoundsCheck::HasBounds;
            }
        }
        self.bounds == BoundsCheck::NoBounds
    }

    /// Monotone Fiacco-McCormick style decrease used inside fixed mode.
    fn decreased_fixed_mu(&self, mu: f64) -> f64 {
        let p = &self.params;
        (p.kappa_mu * mu)
            .min(mu.powf(p.theta_mu))
            .max(p.tol / 10.0)
            .clamp(p.mu_min, p.mu_max)
    }

    fn free_mode_update(&mut self, iterate: &IterateMeasures, data: &mut IpmData) -> (f64, f64, bool) {
        let proposed = self.free_oracle.calculate_mu(iterate);
        let mut mu = checked_oracle_mu(self.free_oracle.name(), proposed, data.mu());

        mu = mu.max(self.params.mu_min);
        let mu_lower_safe = self.lower_mu_safeguard(iterate);
        let safeguarded = mu < mu_lower_safe;
        if safeguarded {
            log::debug!(
                "mu = {:e} smaller than safeguard = {:e}. Increasing mu.",
                mu,
                mu_lower_safe
            );
            mu = mu_lower_safe;
            data.append_info("m");
        }
        log::debug!("Barrier parameter mu computed by oracle is {:e}", mu);

        mu = mu.min(self.params.mu_max);
        log::debug!("Barrier parameter mu after safeguards is {:e}", mu);

        let tau = self.compute_tau(mu);
        log::debug!("Fraction-to-the-boundary parameter tau is {:e}", tau);

        data.set_mu(mu);
        data.set_tau(tau);
        (mu, tau, safeguarded)
    }
}

/// Replace a non-finite or non-positive oracle value by `fallback`.
fn checked_oracle_mu(oracle: &str, mu: f64, fallback: f64) -> f64 {
    if mu.is_finite() && mu > 0.0 {
        mu
    } else {
        log::warn!(
            "mu oracle {} returned {:e}; keeping mu = {:e}",
            oracle,
            mu,
            fallback
        );
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::IterateDims;

    struct ConstOracle(f64);

    impl MuOracle for ConstOracle {
        fn name(&self) -> &'static str {
            "const"
        }

        fn calculate_mu(&mut self, _iterate: &IterateMeasures) -> f64 {
            self.0
        }
    }

    #[derive(Default)]
    struct CountingLineSearch {
        resets: usize,
    }

    impl LineSearch for CountingLineSearch {
        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn bounded_iterate(residual: f64) -> IterateMeasures {
        let mut m = IterateMeasures::new(IterateDims {
            n_x: 1,
            n_z_l: 1,
            ..Default::default()
        });
        m.dual_inf = residual;
        m.avrg_compl = 0.5;
        m.barrier_error = 1e3;
        m
    }

    fn controller(settings: NonmonotoneSettings, mu: f64) -> NonmonotoneMuUpdate {
        NonmonotoneMuUpdate::new(&settings, Box::new(ConstOracle(mu)), None).unwrap()
    }

    #[test]
    fn test_compute_tau_saturation() {
        let ctl = controller(NonmonotoneSettings::default().with_tau_bounds(0.9, 0.995), 0.1);
        assert_eq!(ctl.compute_tau(1e-6), 0.995);
        assert_eq!(ctl.compute_tau(0.001), 0.995);
        assert!((ctl.compute_tau(0.05) - 0.95).abs() < 1e-15);
        assert_eq!(ctl.compute_tau(0.2), 0.9);
        assert_eq!(ctl.compute_tau(10.0), 0.9);
    }

    #[test]
    fn test_compute_tau_monotone() {
        let ctl = controller(NonmonotoneSettings::default().with_tau_bounds(0.5, 1.0), 0.1);
        let mut prev = f64::INFINITY;
        for i in 0..=200 {
            let mu = i as f64 * 0.005;
            let tau = ctl.compute_tau(mu);
            assert!(tau <= prev);
            assert!((0.5..=1.0).contains(&tau));
            prev = tau;
        }
    }

    #[test]
    fn test_free_mode_clips_to_mu_min() {
        let settings = NonmonotoneSettings::default().with_mu_bounds(1e-4, 1.0);
        let mut ctl = controller(settings, 1e-12);
        let mut data = IpmData::new(0.1, 0.99);
        let mut ls = CountingLineSearch::default();

        let out = ctl.update_barrier_parameter(&bounded_iterate(1.0), &mut data, &mut ls);
        assert_eq!(
            out,
            UpdateOutcome::Free { mu: 1e-4, tau: 0.99, safeguarded: false }
        );
        assert_eq!(data.mu(), 1e-4);
        assert_eq!(ls.resets, 1);
        assert!(data.info().is_empty());
    }

    #[test]
    fn test_safeguard_raise_then_mu_max_cap() {
        // Safeguard of 1e3 exceeds mu_max; the upper clip wins. The filter
        // strategy is used so the window minimum does not cap the safeguard.
        let settings = NonmonotoneSettings::default()
            .with_mu_bounds(1e-9, 10.0)
            .with_safeguard_factor(1e3)
            .with_filter();
        let mut ctl = controller(settings, 1e-3);
        let mut data = IpmData::default();
        let mut ls = CountingLineSearch::default();

        let out = ctl.update_barrier_parameter(&bounded_iterate(1.0), &mut data, &mut ls);
        match out {
            UpdateOutcome::Free { mu, safeguarded, .. } => {
                assert!(safeguarded);
                assert_eq!(mu, 10.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(data.info(), "m");
    }

    #[test]
    fn test_oracle_nan_keeps_current_mu() {
        let mut ctl = controller(NonmonotoneSettings::default(), f64::NAN);
        let mut data = IpmData::new(0.25, 0.99);
        let mut ls = CountingLineSearch::default();

        ctl.update_barrier_parameter(&bounded_iterate(1.0), &mut data, &mut ls);
        assert_eq!(data.mu(), 0.25);

        let mut ctl = controller(NonmonotoneSettings::default(), -1.0);
        ctl.update_barrier_parameter(&bounded_iterate(1.0), &mut data, &mut ls);
        assert_eq!(data.mu(), 0.25);
    }

    #[test]
    fn test_filter_margin_on_remember() {
        let mut ctl = controller(NonmonotoneSettings::default().with_filter(), 0.1);
        let mut it = bounded_iterate(1.0);
        it.objective = 2.0;
        it.constraint_violation = 1.0;
        it.iter_count = 7;
        ctl.remember_current_point_as_accepted(&it);

        let filter = ctl.filter().unwrap();
        // The stored point itself is now dominated
        assert!(!filter.acceptable(2.0, 1.0));
        // but a point just inside the margin is not blocked on objective
        assert!(filter.acceptable(2.0 - 2e-5, 1.0));
        assert!(ctl.window().is_none());
    }

    #[test]
    fn test_new_fixed_mu_filter_uses_avrg_compl() {
        let mut ctl = controller(NonmonotoneSettings::default().with_filter(), 0.1);
        let mut it = bounded_iterate(1.0);
        it.avrg_compl = 3.0;
        assert_eq!(ctl.new_fixed_mu(&it, 0.1), 3.0);
    }

    #[test]
    fn test_new_fixed_mu_window_caps_at_tenth_of_max_ref() {
        let mut ctl = controller(NonmonotoneSettings::default().with_window(2, 0.9), 0.1);
        let it = bounded_iterate(4.0);
        // dual_inf 4 over one row: residual 4
        ctl.remember_current_point_as_accepted(&it);
        let mut it = bounded_iterate(4.0);
        it.avrg_compl = 50.0;
        assert!((ctl.new_fixed_mu(&it, 0.1) - 0.4).abs() < 1e-15);
    }

    #[test]
    fn test_fixed_oracle_used_when_present() {
        let mut ctl = NonmonotoneMuUpdate::new(
            &NonmonotoneSettings::default().with_filter(),
            Box::new(ConstOracle(0.1)),
            Some(Box::new(ConstOracle(0.02))),
        )
        .unwrap();
        assert_eq!(ctl.new_fixed_mu(&bounded_iterate(1.0), 0.1), 0.02);
    }

    #[test]
    fn test_outcome_committed() {
        assert!(!UpdateOutcome::NoBounds.committed());
        assert!(!UpdateOutcome::FixedHold.committed());
        assert!(UpdateOutcome::EnteredFixed { mu: 1.0, tau: 0.99 }.committed());
    }
}
