//! Progress reporting for long-running reads.
//!
//! Readers never print on their own. They report a completion percentage to
//! a caller-supplied [`ProgressObserver`] at a fixed cadence of roughly every
//! 5% of records; what happens with it is up to the caller.

use log::info;

/// Receives completion percentages (0..=100) while a reader runs.
pub trait ProgressObserver {
    fn on_progress(&mut self, percent: u32);
}

impl<F: FnMut(u32)> ProgressObserver for F {
    fn on_progress(&mut self, percent: u32) {
        self(percent)
    }
}

/// Forwards progress to the `log` facade at info level.
#[derive(Clone, Debug)]
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new("Reading PMVS/CMVS")
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, percent: u32) {
        info!("{}: {}%", self.label, percent);
    }
}

/// Discards all progress notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _percent: u32) {}
}

/// Decides at which record counters a notification is due.
///
/// Notifications fire every `round(total / 20)` records (at least every
/// record), starting with record 0. An empty input never fires.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProgressCadence {
    total: usize,
    step: usize,
}

impl ProgressCadence {
    pub(crate) fn new(total: usize) -> Self {
        let step = (total as f64 / 20.0).round_ties_even() as usize;
        Self {
            total,
            step: step.max(1),
        }
    }

    /// Returns the percentage to report before reading record `counter`.
    pub(crate) fn percent_at(&self, counter: usize) -> Option<u32> {
        if self.total == 0 || counter % self.step != 0 {
            return None;
        }
        let percent = (counter as f64 * 100.0 / self.total as f64).round_ties_even();
        Some(percent as u32)
    }
}
