//! Barrier parameter oracles.
//!
//! An oracle proposes a candidate μ from the current iterate. The
//! nonmonotone update decides whether to use the proposal and clips it to
//! its safeguards; oracles themselves apply no bounds beyond their own
//! formula.

pub mod loqo;
pub mod probing;

pub use loqo::LoqoMuOracle;
pub use probing::ProbingMuOracle;

use crate::data::IterateMeasures;
use crate::error::BarrierResult;
use crate::options::OptionsList;

/// Candidate μ provider.
pub trait MuOracle {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Read oracle-specific options. Called once before the first update.
    fn initialize(&mut self, _options: &OptionsList, _prefix: &str) -> BarrierResult<()> {
        Ok(())
    }

    /// Propose a new barrier parameter for the current iterate.
    fn calculate_mu(&mut self, iterate: &IterateMeasures) -> f64;
}
