//! Sliding window of accepted residual values.

use std::collections::VecDeque;

/// Bounded FIFO of scaled KKT residuals at recently accepted iterates.
///
/// The oldest value is evicted when a push would exceed the capacity. A
/// capacity of zero is valid: the window then stays empty and never
/// reports sufficient progress once full (which it always is).
#[derive(Debug, Clone)]
pub struct ProgressWindow {
    refs: VecDeque<f64>,
    capacity: usize,
}

impl ProgressWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            refs: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.refs.len() >= self.capacity
    }

    /// Append a value, evicting the oldest entry if the window is full.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.is_full() {
            self.refs.pop_front();
        }
        self.refs.push_back(value);
    }

    /// Whether `value` makes sufficient progress.
    ///
    /// Until the window is full every value is accepted. Afterwards a value
    /// is accepted if it is at most `red_fact` times *some* stored entry;
    /// it does not have to beat all of them.
    pub fn accepts(&self, value: f64, red_fact: f64) -> bool {
        if !self.is_full() {
            return true;
        }
        self.refs.iter().any(|&r| value <= red_fact * r)
    }

    /// Smallest stored value, `None` if empty.
    pub fn min(&self) -> Option<f64> {
        self.refs.iter().copied().reduce(f64::min)
    }

    /// Largest stored value, `None` if empty.
    pub fn max(&self) -> Option<f64> {
        self.refs.iter().copied().reduce(f64::max)
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.refs.iter().copied()
    }

    pub fn clear(&mut self) {
        self.refs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_of(capacity: usize, values: &[f64]) -> ProgressWindow {
        let mut w = ProgressWindow::new(capacity);
        for &v in values {
            w.push(v);
        }
        w
    }

    #[test]
    fn test_fifo_eviction() {
        let w = window_of(3, &[10.0, 8.0, 6.0, 5.0]);
        assert_eq!(w.len(), 3);
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![8.0, 6.0, 5.0]);
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut w = ProgressWindow::new(2);
        for i in 0..10 {
            w.push(i as f64);
            assert!(w.len() <= 2);
        }
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![8.0, 9.0]);
    }

    #[test]
    fn test_accepts_against_any_entry() {
        let w = window_of(3, &[10.0, 8.0, 6.0]);
        // 5 <= 0.9 * 10
        assert!(w.accepts(5.0, 0.9));
        // 9.5 beats none of 9.0, 7.2, 5.4
        assert!(!w.accepts(9.5, 0.9));
        // 8.9 beats only the oldest
        assert!(w.accepts(8.9, 0.9));
    }

    #[test]
    fn test_accepts_until_full() {
        let capacity = 4;
        for k in 0..capacity {
            let values: Vec<f64> = (0..k).map(|i| 1e-3 * (i + 1) as f64).collect();
            let w = window_of(capacity, &values);
            assert!(!w.is_full());
            assert!(w.accepts(1e6, 0.5), "k = {k} should accept");
        }
    }

    #[test]
    fn test_zero_capacity() {
        let mut w = ProgressWindow::new(0);
        w.push(1.0);
        assert!(w.is_empty());
        assert!(w.is_full());
        assert!(!w.accepts(0.0, 0.9));
        assert_eq!(w.min(), None);
        assert_eq!(w.max(), None);
    }

    #[test]
    fn test_min_max() {
        let w = window_of(4, &[3.0, 1.0, 7.0, 2.0]);
        assert_eq!(w.min(), Some(1.0));
        assert_eq!(w.max(), Some(7.0));
    }
}
