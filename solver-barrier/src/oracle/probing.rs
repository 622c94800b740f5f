//! Mehrotra probing rule.
//!
//! σ = (μ_aff / μ)³ where μ_aff is the average complementarity at the
//! affine-scaling trial point. Unlike the predictor-corrector default the
//! result is not capped below one, since the nonmonotone update may want
//! to increase μ; the cap is the `sigma_max` option instead.

use super::MuOracle;
use crate::data::IterateMeasures;
use crate::error::{BarrierError, BarrierResult};
use crate::options::OptionsList;

#[derive(Debug, Clone, Copy)]
pub struct ProbingMuOracle {
    sigma_max: f64,
}

impl Default for ProbingMuOracle {
    fn default() -> Self {
        Self { sigma_max: 1e2 }
    }
}

impl ProbingMuOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sigma_max(&self) -> f64 {
        self.sigma_max
    }

    pub fn centering(&self, avrg_compl: f64, affine_avrg_compl: Option<f64>) -> f64 {
        let sigma = match affine_avrg_compl {
            Some(mu_aff) if mu_aff.is_finite() && mu_aff >= 0.0 && avrg_compl > 0.0 => {
                (mu_aff / avrg_compl).powi(3)
            }
            // No usable probing step: keep the current average
            _ => 1.0,
        };
        sigma.min(self.sigma_max)
    }
}

impl MuOracle for ProbingMuOracle {
    fn name(&self) -> &'static str {
        "probing"
    }

    fn initialize(&mut self, options: &OptionsList, prefix: &str) -> BarrierResult<()> {
        if let Some(v) = options.get_numeric("sigma_max", prefix)? {
            if v <= 0.0 || v.is_nan() {
                return Err(BarrierError::OracleInit {
                    oracle: self.name(),
                    reason: format!("sigma_max = {v} must be larger than 0"),
                });
            }
            self.sigma_max = v;
        }
        Ok(())
    }

    fn calculate_mu(&mut self, iterate: &IterateMeasures) -> f64 {
        let sigma = self.centering(iterate.avrg_compl, iterate.affine_avrg_compl);
        let mu = sigma * iterate.avrg_compl;
        log::trace!(
            "probing oracle: avrg_compl={:.6e} mu_aff={:?} sigma={:.6e} mu={:.6e}",
            iterate.avrg_compl,
            iterate.affine_avrg_compl,
            sigma,
            mu
        );
        mu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probing_cubes_ratio() {
        let oracle = ProbingMuOracle::new();
        let sigma = oracle.centering(1.0, Some(0.5));
        assert!((sigma - 0.125).abs() < 1e-15);
    }

    #[test]
    fn test_probing_caps_at_sigma_max() {
        let oracle = ProbingMuOracle::new();
        // ratio 10 -> 1000, capped at 100
        assert_eq!(oracle.centering(1.0, Some(10.0)), 100.0);
    }

    #[test]
    fn test_probing_without_affine_point() {
        let mut oracle = ProbingMuOracle::new();
        let mut m = IterateMeasures::default();
        m.avrg_compl = 0.3;
        assert!((oracle.calculate_mu(&m) - 0.3).abs() < 1e-15);

        m.affine_avrg_compl = Some(f64::NAN);
        assert!((oracle.calculate_mu(&m) - 0.3).abs() < 1e-15);
    }

    #[test]
    fn test_initialize_reads_sigma_max() {
        let mut oracle = ProbingMuOracle::new();
        let mut opts = OptionsList::new();
        opts.set_numeric("sigma_max", 0.9);
        oracle.initialize(&opts, "").unwrap();
        assert_eq!(oracle.sigma_max(), 0.9);

        opts.set_numeric("sigma_max", -1.0);
        assert!(matches!(
            oracle.initialize(&opts, ""),
            Err(BarrierError::OracleInit { oracle: "probing", .. })
        ));
    }
}
