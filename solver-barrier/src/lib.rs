//! Adaptive barrier parameter update for interior point NLP solvers.
//!
//! Once per outer iteration an interior point method has to pick the
//! barrier parameter μ and the fraction-to-boundary parameter τ. This crate
//! implements the nonmonotone free/fixed mode strategy:
//!
//! - In **free mode** a [`MuOracle`] proposes μ every iteration
//!   (e.g. [`oracle::LoqoMuOracle`], [`oracle::ProbingMuOracle`]).
//! - When the iterate stops making progress the update switches to
//!   **fixed mode**, holds μ at a safeguarded value and only decreases it
//!   monotonically once the barrier subproblem is solved well enough.
//! - Progress is measured either against a sliding window of scaled KKT
//!   residuals or against a dominance filter on (objective, violation).
//!
//! # Example
//!
//! ```
//! use solver_barrier::{
//!     IpmData, IterateDims, IterateMeasures, LineSearch, NonmonotoneMuUpdate,
//!     NonmonotoneSettings, UpdateOutcome,
//! };
//! use solver_barrier::oracle::LoqoMuOracle;
//!
//! struct NoMemory;
//! impl LineSearch for NoMemory {
//!     fn reset(&mut self) {}
//! }
//!
//! let settings = NonmonotoneSettings::default();
//! let mut update =
//!     NonmonotoneMuUpdate::new(&settings, Box::new(LoqoMuOracle::new()), None)?;
//!
//! let mut iterate = IterateMeasures::new(IterateDims { n_x: 2, n_z_l: 2, ..Default::default() });
//! iterate.dual_inf = 1.0;
//! iterate.complementarity = 0.4;
//! iterate.avrg_compl = 0.2;
//! iterate.min_compl = 0.1;
//!
//! let mut data = IpmData::new(0.1, 0.99);
//! let outcome = update.update_barrier_parameter(&iterate, &mut data, &mut NoMemory);
//! assert!(matches!(outcome, UpdateOutcome::Free { .. }));
//! assert!(data.mu() >= update.params().mu_min);
//! # Ok::<(), solver_barrier::BarrierError>(())
//! ```

#![warn(clippy::all)]

pub mod barrier;
pub mod data;
pub mod error;
pub mod line_search;
pub mod options;
pub mod oracle;
pub mod settings;

pub use barrier::{MuMode, NonmonotoneMuUpdate, UpdateOutcome};
pub use data::{IpmData, IterateDims, IterateMeasures};
pub use error::{BarrierError, BarrierResult};
pub use line_search::LineSearch;
pub use options::{OptionValue, OptionsList};
pub use oracle::MuOracle;
pub use settings::{Globalization, NonmonotoneParams, NonmonotoneSettings};
