//! LOQO-style centering rule.
//!
//! Uses the spread of the complementarity products to pick the centering
//! parameter: a well-centered iterate (min ≈ average) gets σ ≈ 0, a badly
//! centered one gets σ up to 0.8.

use super::MuOracle;
use crate::data::IterateMeasures;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoqoMuOracle;

impl LoqoMuOracle {
    pub fn new() -> Self {
        Self
    }

    /// σ(ξ) = 0.1 · min(0.05 (1 - ξ) / ξ, 2)³ with ξ = min / average.
    pub fn centering(avrg_compl: f64, min_compl: f64) -> f64 {
        let xi = if avrg_compl > 0.0 {
            (min_compl / avrg_compl).min(1.0)
        } else {
            1.0
        };
        if xi <= 0.0 {
            return 0.1 * 2.0_f64.powi(3);
        }
        0.1 * (0.05 * (1.0 - xi) / xi).min(2.0).powi(3)
    }
}

impl MuOracle for LoqoMuOracle {
    fn name(&self) -> &'static str {
        "loqo"
    }

    fn calculate_mu(&mut self, iterate: &IterateMeasures) -> f64 {
        let avrg_compl = iterate.avrg_compl;
        let sigma = Self::centering(avrg_compl, iterate.min_compl);
        let mu = sigma * avrg_compl;
        log::trace!(
            "loqo oracle: avrg_compl={:.6e} min_compl={:.6e} sigma={:.6e} mu={:.6e}",
            avrg_compl,
            iterate.min_compl,
            sigma,
            mu
        );
        mu
    }
}
