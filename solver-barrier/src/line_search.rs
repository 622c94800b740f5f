//! Line search hook used by the barrier update.

/// The part of a line search the barrier update talks to.
///
/// Whenever μ or the mode changes, the merit function being globalized
/// changes with it, so the line search must forget any history it kept
/// (filter entries, watchdog state, reference values).
pub trait LineSearch {
    /// Drop all internal memory.
    fn reset(&mut self);
}

impl<T: LineSearch + ?Sized> LineSearch for &mut T {
    fn reset(&mut self) {
        (**self).reset();
    }
}

impl<T: LineSearch + ?Sized> LineSearch for Box<T> {
    fn reset(&mut self) {
        (**self).reset();
    }
}
