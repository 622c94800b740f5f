//! Trace of the nonmonotone barrier update on a synthetic run.
//!
//! The outer loop is replaced by a toy model: each iteration the
//! complementarity products move toward the committed μ and the dual
//! infeasibility shrinks, except for a stretch of iterations where the
//! model stalls and the residual grows. The trace shows the update
//! switching to fixed mode during the stall and back to free mode once
//! progress resumes.
//!
//! Run with `RUST_LOG` unset; the example prints its own table.

use solver_barrier::oracle::LoqoMuOracle;
use solver_barrier::{
    IpmData, IterateDims, IterateMeasures, LineSearch, NonmonotoneMuUpdate, NonmonotoneSettings,
    UpdateOutcome,
};

#[derive(Default)]
struct ResetCounter(usize);

impl LineSearch for ResetCounter {
    fn reset(&mut self) {
        self.0 += 1;
    }
}

fn main() {
    println!("Nonmonotone mu update - synthetic trace");
    println!("=======================================");
    println!();

    let dims = IterateDims {
        n_x: 10,
        n_s: 4,
        n_y_c: 3,
        n_y_d: 4,
        n_z_l: 10,
        n_z_u: 2,
        n_v_l: 4,
        n_v_u: 0,
    };
    let n_compl = dims.n_bounds() as f64;

    let settings = NonmonotoneSettings::default()
        .with_tol(1e-8)
        .with_window(3, 0.9)
        .with_safeguard_factor(1e-2);

    let mut update = match NonmonotoneMuUpdate::new(&settings, Box::new(LoqoMuOracle::new()), None) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("setup failed: {e}");
            return;
        }
    };

    let mut data = IpmData::new(0.1, 0.99);
    let mut ls = ResetCounter::default();

    let mut avrg_compl: f64 = 1.0;
    let mut dual_inf: f64 = 50.0;
    let mut primal_inf: f64 = 20.0;

    println!(
        "{:>4} {:>12} {:>7} {:>12} {:>8} {:>5} {:>6}",
        "iter", "residual", "mode", "mu", "tau", "info", "resets"
    );

    for iter in 0..30 {
        let stalled = (8..13).contains(&iter);

        let mut it = IterateMeasures::new(dims);
        it.iter_count = iter;
        it.avrg_compl = avrg_compl;
        it.min_compl = 0.3 * avrg_compl;
        it.complementarity = avrg_compl * n_compl;
        it.dual_inf = dual_inf;
        it.primal_inf = primal_inf;
        it.barrier_error = (dual_inf / dims.n_dual() as f64).max(avrg_compl - data.mu());
        it.objective = 1.0 + dual_inf;
        it.constraint_violation = primal_inf;

        data.clear_info();
        let outcome = update.update_barrier_parameter(&it, &mut data, &mut ls);

        println!(
            "{:>4} {:>12.4e} {:>7} {:>12.4e} {:>8.5} {:>5} {:>6}",
            iter,
            solver_barrier::barrier::scaled_kkt_residual(&it),
            format!("{:?}", data.mode()),
            data.mu(),
            data.tau(),
            data.info(),
            ls.0,
        );

        if let UpdateOutcome::NoBounds = outcome {
            break;
        }

        // Toy response of the iterate to the new mu
        avrg_compl = 0.5 * avrg_compl + 0.5 * data.mu();
        if stalled {
            dual_inf *= 1.3;
            primal_inf *= 1.1;
        } else {
            dual_inf *= 0.4;
            primal_inf *= 0.5;
        }
    }
}
