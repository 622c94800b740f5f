//! Solver-shared iterate data.
//!
//! The barrier update reads the current iterate through [`IterateMeasures`]
//! and writes its decisions (μ, τ, mode, diagnostic markers) into [`IpmData`].
//! The outer loop owns both and hands them to the controller once per
//! iteration.

use crate::barrier::MuMode;

/// Dimensions of the primal-dual iterate blocks.
///
/// Naming follows the usual NLP interior point layout: `x` primal variables,
/// `s` slacks for inequality constraints, `y_c`/`y_d` equality and
/// inequality multipliers, `z_l`/`z_u` bound multipliers on `x`, and
/// `v_l`/`v_u` bound multipliers on `s`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterateDims {
    pub n_x: usize,
    pub n_s: usize,
    pub n_y_c: usize,
    pub n_y_d: usize,
    pub n_z_l: usize,
    pub n_z_u: usize,
    pub n_v_l: usize,
    pub n_v_u: usize,
}

impl IterateDims {
    /// Number of rows in the dual infeasibility (x and s).
    #[inline]
    pub fn n_dual(&self) -> usize {
        self.n_x + self.n_s
    }

    /// Number of rows in the primal infeasibility (equality and inequality constraints).
    #[inline]
    pub fn n_primal(&self) -> usize {
        self.n_y_c + self.n_y_d
    }

    /// Total number of bound multipliers, which is also the number of
    /// complementarity products.
    #[inline]
    pub fn n_bounds(&self) -> usize {
        self.n_z_l + self.n_z_u + self.n_v_l + self.n_v_u
    }
}

/// Quantities computed by the outer loop for the current iterate.
///
/// Infeasibility and complementarity fields are 1-norms (unscaled sums).
#[derive(Debug, Clone, Default)]
pub struct IterateMeasures {
    pub dims: IterateDims,

    /// Outer iteration counter
    pub iter_count: usize,

    /// Objective value f(x)
    pub objective: f64,

    /// Constraint violation θ(x)
    pub constraint_violation: f64,

    /// ‖∇L‖₁ over x and s
    pub dual_inf: f64,

    /// ‖c(x)‖₁ + ‖d(x) - s‖₁
    pub primal_inf: f64,

    /// ‖complementarity products‖₁ (target μ = 0)
    pub complementarity: f64,

    /// Average complementarity product
    pub avrg_compl: f64,

    /// Smallest complementarity product
    pub min_compl: f64,

    /// Optimality error of the current barrier subproblem
    pub barrier_error: f64,

    /// Average complementarity at the affine-scaling trial point, if the
    /// outer loop computed one this iteration
    pub affine_avrg_compl: Option<f64>,
}

impl IterateMeasures {
    pub fn new(dims: IterateDims) -> Self {
        Self {
            dims,
            ..Default::default()
        }
    }

    /// Dual infeasibility averaged over its dimension.
    pub fn scaled_dual_inf(&self) -> f64 {
        scale_by_dim(self.dual_inf, self.dims.n_dual())
    }

    /// Primal infeasibility averaged over its dimension.
    pub fn scaled_primal_inf(&self) -> f64 {
        scale_by_dim(self.primal_inf, self.dims.n_primal())
    }

    /// Complementarity averaged over the number of bound multipliers.
    pub fn scaled_complementarity(&self) -> f64 {
        scale_by_dim(self.complementarity, self.dims.n_bounds())
    }
}

#[inline]
fn scale_by_dim(value: f64, dim: usize) -> f64 {
    if dim == 0 {
        0.0
    } else {
        value / dim as f64
    }
}

/// Mutable solver state written by the barrier update.
#[derive(Debug, Clone)]
pub struct IpmData {
    mu: f64,
    tau: f64,
    mode: MuMode,
    info: String,
}

impl IpmData {
    pub fn new(mu_init: f64, tau_init: f64) -> Self {
        Self {
            mu: mu_init,
            tau: tau_init,
            mode: MuMode::Free,
            info: String::new(),
        }
    }

    #[inline]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    #[inline]
    pub fn tau(&self) -> f64 {
        self.tau
    }

    #[inline]
    pub fn mode(&self) -> MuMode {
        self.mode
    }

    #[inline]
    pub fn free_mu_mode(&self) -> bool {
        self.mode == MuMode::Free
    }

    pub fn set_mu(&mut self, mu: f64) {
        self.mu = mu;
    }

    pub fn set_tau(&mut self, tau: f64) {
        self.tau = tau;
    }

    pub fn set_mode(&mut self, mode: MuMode) {
        self.mode = mode;
    }

    /// Diagnostic markers accumulated for the current iteration.
    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn append_info(&mut self, marker: &str) {
        self.info.push_str(marker);
    }

    /// Called by the outer loop when a new iteration starts.
    pub fn clear_info(&mut self) {
        self.info.clear();
    }
}

impl Default for IpmData {
    fn default() -> Self {
        Self::new(0.1, 0.99)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims() {
        let dims = IterateDims {
            n_x: 3,
            n_s: 2,
            n_y_c: 1,
            n_y_d: 2,
            n_z_l: 3,
            n_z_u: 0,
            n_v_l: 1,
            n_v_u: 1,
        };
        assert_eq!(dims.n_dual(), 5);
        assert_eq!(dims.n_primal(), 3);
        assert_eq!(dims.n_bounds(), 5);
    }

    #[test]
    fn test_scaled_measures_zero_dims() {
        let mut m = IterateMeasures::new(IterateDims { n_x: 4, ..Default::default() });
        m.dual_inf = 2.0;
        m.primal_inf = 0.0;
        m.complementarity = 0.0;
        assert_eq!(m.scaled_dual_inf(), 0.5);
        assert_eq!(m.scaled_primal_inf(), 0.0);
        assert_eq!(m.scaled_complementarity(), 0.0);
    }

    #[test]
    fn test_info_markers() {
        let mut data = IpmData::default();
        assert!(data.free_mu_mode());
        data.append_info("m");
        data.append_info("F");
        assert_eq!(data.info(), "mF");
        data.clear_info();
        assert_eq!(data.info(), "");
    }
}
