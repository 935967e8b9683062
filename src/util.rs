//! Pipeline stage timing.

use std::time::Instant;

/// RAII guard that logs a pipeline stage's wall time when dropped.
///
/// # Example
/// ```ignore
/// let _t = StageTimer::new("CullMinimalNodes");
/// // ... do work ...
/// // logs "CullMinimalNodes: 1.234ms" when _t is dropped
/// ```
pub struct StageTimer {
    stage: &'static str,
    start: Instant,
}

impl StageTimer {
    pub fn new(stage: &'static str) -> Self {
        log::trace!("{stage}...");
        Self {
            stage,
            start: Instant::now(),
        }
    }

    /// Elapsed time so far, in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        log::debug!("{}: {:.3}ms", self.stage, self.elapsed_ms());
    }
}
