//! Step sequencer shared by the intake wizard and the readiness quiz.
//!
//! A sequencer owns a fixed, ordered catalogue of steps and a single
//! current-step pointer. The catalogue order drives the progress bar.

use std::fmt::Display;

use crate::error::FlowError;

/// Ordered catalogue of steps plus the current position within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequencer<S: 'static> {
    catalogue: &'static [S],
    current: S,
}

impl<S> StepSequencer<S>
where
    S: Copy + PartialEq + Display + 'static,
{
    /// Start on the first step of the catalogue.
    ///
    /// # Panics
    /// Panics if the catalogue is empty; catalogues are compile-time constants.
    pub fn new(catalogue: &'static [S]) -> Self {
        Self {
            catalogue,
            current: catalogue[0],
        }
    }

    /// Start on `step`, which must be a catalogue member.
    pub fn starting_at(catalogue: &'static [S], step: S) -> Result<Self, FlowError> {
        let mut seq = Self::new(catalogue);
        seq.set(step)?;
        Ok(seq)
    }

    pub fn current(&self) -> S {
        self.current
    }

    pub fn catalogue(&self) -> &'static [S] {
        self.catalogue
    }

    pub fn len(&self) -> usize {
        self.catalogue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogue.is_empty()
    }

    /// Position of the current step, or 0 when it is not in the catalogue.
    pub fn current_index(&self) -> usize {
        self.index_of(self.current).unwrap_or(0)
    }

    /// `round(100 * index / (len - 1))`.
    pub fn progress_percent(&self) -> u8 {
        let last = self.len().saturating_sub(1);
        if last == 0 {
            return 0;
        }
        let pct = (self.current_index() as f64 / last as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    /// Jump to `step`. Steps outside the catalogue are rejected and the
    /// pointer is left untouched.
    pub fn set(&mut self, step: S) -> Result<(), FlowError> {
        if self.index_of(step).is_none() {
            return Err(FlowError::UnknownStep(step.to_string()));
        }
        self.current = step;
        Ok(())
    }

    /// Move one step forward. Returns false on the last step.
    pub fn advance(&mut self) -> bool {
        let idx = self.current_index();
        match self.catalogue.get(idx + 1) {
            Some(next) => {
                self.current = *next;
                true
            }
            None => false,
        }
    }

    /// Move one step back. Returns false on the first step.
    pub fn retreat(&mut self) -> bool {
        let idx = self.current_index();
        if idx == 0 {
            return false;
        }
        self.current = self.catalogue[idx - 1];
        true
    }

    /// Jump to the catalogue entry at `index`, clamped to the last entry.
    pub fn set_index(&mut self, index: usize) {
        let idx = index.min(self.len() - 1);
        self.current = self.catalogue[idx];
    }

    /// Return to the first step.
    pub fn rewind(&mut self) {
        self.current = self.catalogue[0];
    }

    pub fn is_first(&self) -> bool {
        self.current_index() == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index() + 1 == self.len()
    }

    fn index_of(&self, step: S) -> Option<usize> {
        self.catalogue.iter().position(|s| *s == step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static STEPS: &[&str] = &["a", "b", "c", "d", "e"];

    #[test]
    fn starts_on_first_step() {
        let seq = StepSequencer::new(STEPS);
        assert_eq!(seq.current(), "a");
        assert_eq!(seq.current_index(), 0);
        assert_eq!(seq.progress_percent(), 0);
        assert!(seq.is_first());
    }

    #[test]
    fn progress_is_index_over_last() {
        let mut seq = StepSequencer::new(STEPS);
        seq.set("c").unwrap();
        assert_eq!(seq.progress_percent(), 50);
        seq.set("e").unwrap();
        assert_eq!(seq.progress_percent(), 100);
    }

    #[test]
    fn progress_rounds_to_nearest() {
        static THREE: &[u8] = &[0, 1, 2, 3];
        let mut seq = StepSequencer::new(THREE);
        seq.set(1).unwrap();
        // 1/3 = 33.33
        assert_eq!(seq.progress_percent(), 33);
        seq.set(2).unwrap();
        // 2/3 = 66.67
        assert_eq!(seq.progress_percent(), 67);
    }

    #[test]
    fn unknown_step_is_rejected_and_pointer_kept() {
        let mut seq = StepSequencer::new(STEPS);
        seq.set("b").unwrap();
        let err = seq.set("zzz").unwrap_err();
        assert_eq!(err, FlowError::UnknownStep("zzz".into()));
        assert_eq!(seq.current(), "b");
    }

    #[test]
    fn advance_and_retreat_stay_in_bounds() {
        let mut seq = StepSequencer::new(STEPS);
        assert!(!seq.retreat());
        for _ in 0..4 {
            assert!(seq.advance());
        }
        assert!(seq.is_last());
        assert!(!seq.advance());
        assert_eq!(seq.current(), "e");
        assert!(seq.retreat());
        assert_eq!(seq.current(), "d");
    }

    #[test]
    fn set_index_clamps() {
        let mut seq = StepSequencer::new(STEPS);
        seq.set_index(42);
        assert_eq!(seq.current(), "e");
        seq.rewind();
        assert_eq!(seq.current(), "a");
    }

    #[test]
    fn single_step_catalogue_has_zero_progress() {
        static ONE: &[&str] = &["only"];
        let seq = StepSequencer::new(ONE);
        assert_eq!(seq.progress_percent(), 0);
        assert!(seq.is_last());
    }
}
