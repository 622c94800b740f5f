//! Two-dimensional dominance filter on (objective, constraint violation).

/// Acceptance contract used by the filter-based globalization.
pub trait DominanceFilter {
    /// True if no stored entry dominates `(objective, violation)`.
    fn acceptable(&self, objective: f64, violation: f64) -> bool;

    /// Store a new entry tagged with the iteration it came from. The filter
    /// may drop entries the new one dominates.
    fn add_entry(&mut self, objective: f64, violation: f64, iteration: usize);
}

/// A stored filter point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterEntry {
    pub objective: f64,
    pub violation: f64,
    pub iteration: usize,
}

impl FilterEntry {
    /// The candidate is strictly better than this entry in at least one measure.
    #[inline]
    fn admits(&self, objective: f64, violation: f64) -> bool {
        objective < self.objective || violation < self.violation
    }

    /// This entry is no better than the candidate in both measures.
    #[inline]
    fn dominated_by(&self, objective: f64, violation: f64) -> bool {
        objective <= self.objective && violation <= self.violation
    }
}

/// Pareto filter keeping only mutually non-dominated entries.
#[derive(Debug, Clone, Default)]
pub struct ParetoFilter {
    entries: Vec<FilterEntry>,
}

impl ParetoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl DominanceFilter for ParetoFilter {
    fn acceptable(&self, objective: f64, violation: f64) -> bool {
        self.entries.iter().all(|e| e.admits(objective, violation))
    }

    fn add_entry(&mut self, objective: f64, violation: f64, iteration: usize) {
        let before = self.entries.len();
        self.entries.retain(|e| !e.dominated_by(objective, violation));
        let pruned = before - self.entries.len();
        self.entries.push(FilterEntry {
            objective,
            violation,
            iteration,
        });
        log::trace!(
            "filter: added ({:.6e}, {:.6e}) from iter {}, pruned {}, size {}",
            objective,
            violation,
            iteration,
            pruned,
            self.entries.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_accepts_everything() {
        let f = ParetoFilter::new();
        assert!(f.acceptable(1e30, 1e30));
    }

    #[test]
    fn test_dominated_point_rejected() {
        let mut f = ParetoFilter::new();
        f.add_entry(1.0, 1.0, 0);

        // Worse in both
        assert!(!f.acceptable(2.0, 2.0));
        // Equal in both is not strictly better anywhere
        assert!(!f.acceptable(1.0, 1.0));
        // Better objective, worse violation
        assert!(f.acceptable(0.5, 3.0));
        // Better violation, worse objective
        assert!(f.acceptable(3.0, 0.5));
    }

    #[test]
    fn test_must_pass_every_entry() {
        let mut f = ParetoFilter::new();
        f.add_entry(1.0, 5.0, 0);
        f.add_entry(5.0, 1.0, 1);

        // Beats the first entry on objective, but the second dominates it
        assert!(!f.acceptable(6.0, 2.0));
        assert!(f.acceptable(2.0, 2.0));
    }

    #[test]
    fn test_add_prunes_dominated() {
        let mut f = ParetoFilter::new();
        f.add_entry(3.0, 3.0, 0);
        f.add_entry(1.0, 5.0, 1);
        assert_eq!(f.len(), 2);

        // Dominates (3, 3) but not (1, 5)
        f.add_entry(2.0, 2.0, 2);
        assert_eq!(f.len(), 2);
        let iters: Vec<usize> = f.entries().iter().map(|e| e.iteration).collect();
        assert_eq!(iters, vec![1, 2]);

        f.clear();
        assert!(f.is_empty());
    }
}
