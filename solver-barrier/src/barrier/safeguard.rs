//! Lower safeguard on μ and the scaled primal-dual residual.
//!
//! The safeguard keeps μ from dropping far below the current infeasibility
//! when the iterate is still far from feasible. Infeasibilities are
//! measured relative to the first iterate the safeguard sees, so the bound
//! is insensitive to the absolute scaling of the problem.

use super::window::ProgressWindow;
use crate::data::IterateMeasures;

/// Scaled infeasibilities frozen at the first safeguard evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfeasibilityBaseline {
    pub dual_inf: f64,
    pub primal_inf: f64,
}

impl InfeasibilityBaseline {
    /// Both components are at least one.
    pub fn capture(dual_inf: f64, primal_inf: f64) -> Self {
        Self {
            dual_inf: dual_inf.max(1.0),
            primal_inf: primal_inf.max(1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MuSafeguard {
    factor: f64,
    baseline: Option<InfeasibilityBaseline>,
}

impl MuSafeguard {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            baseline: None,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Baseline captured so far, if any.
    pub fn baseline(&self) -> Option<InfeasibilityBaseline> {
        self.baseline
    }

    /// Freeze the baseline from `iterate` unless one is already set.
    pub fn capture_baseline(&mut self, iterate: &IterateMeasures) -> InfeasibilityBaseline {
        *self.baseline.get_or_insert_with(|| {
            let b = InfeasibilityBaseline::capture(
                iterate.scaled_dual_inf(),
                iterate.scaled_primal_inf(),
            );
            log::debug!(
                "mu safeguard baseline: dual_inf={:.6e} primal_inf={:.6e}",
                b.dual_inf,
                b.primal_inf
            );
            b
        })
    }

    /// Lower bound for μ at the current iterate.
    ///
    /// With the window strategy the bound is additionally capped at the
    /// smallest residual in the window, so the safeguard never asks for
    /// more than the best progress already recorded.
    pub fn lower_bound(&mut self, iterate: &IterateMeasures, window: Option<&ProgressWindow>) -> f64 {
        let baseline = self.capture_baseline(iterate);
        let dual_inf = iterate.scaled_dual_inf();
        let primal_inf = iterate.scaled_primal_inf();

        let mut bound = (self.factor * (dual_inf / baseline.dual_inf))
            .max(self.factor * (primal_inf / baseline.primal_inf));

        if let Some(min_ref) = window.and_then(ProgressWindow::min) {
            bound = bound.min(min_ref);
        }
        bound
    }
}

/// Sum of the dimension-averaged dual infeasibility, primal infeasibility
/// and complementarity.
pub fn scaled_kkt_residual(iterate: &IterateMeasures) -> f64 {
    let dual_inf = iterate.scaled_dual_inf();
    let primal_inf = iterate.scaled_primal_inf();
    let complementarity = iterate.scaled_complementarity();
    let residual = primal_inf + dual_inf + complementarity;

    log::trace!(
        "barrier update check: avg primal inf {:.6e}, avg dual inf {:.6e}, avg compl {:.6e}, scaled pd norm {:.6e}",
        primal_inf,
        dual_inf,
        complementarity,
        residual
    );
    residual
}
