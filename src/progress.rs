use tracing::info;

/// A sink for progress information of long running constructions such as the product
/// construction or minimization. Reporting is purely observational, a sink can never influence
/// the result of the computation it observes.
///
/// Every closure taking a stage name together with the current and the maximal size of the
/// work queue can be used as a sink.
pub trait Progress {
    /// Reports that the computation named `stage` currently has `pending` items of work queued,
    /// while the queue has held at most `peak` items so far. `total` is the number of objects
    /// (for example states) created so far.
    fn report(&mut self, stage: &str, pending: usize, peak: usize, total: usize);

    /// Signals that the computation named `stage` has finished and produced `total` objects.
    fn finish(&mut self, stage: &str, total: usize) {
        let _ = (stage, total);
    }
}

/// A [`Progress`] sink that discards everything it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _stage: &str, _pending: usize, _peak: usize, _total: usize) {}
}

/// A [`Progress`] sink that emits `tracing` events. To avoid flooding the subscriber, only every
/// `every`-th report is forwarded.
#[derive(Debug, Clone)]
pub struct TracingProgress {
    every: usize,
    seen: usize,
}

impl TracingProgress {
    /// Creates a sink that forwards every `every`-th report, an `every` of zero is treated as one.
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            seen: 0,
        }
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Progress for TracingProgress {
    fn report(&mut self, stage: &str, pending: usize, peak: usize, total: usize) {
        if self.seen % self.every == 0 {
            info!("{stage}: buffer {pending}/{peak}, total {total}");
        }
        self.seen += 1;
    }

    fn finish(&mut self, stage: &str, total: usize) {
        info!("{stage}: done with {total}");
        self.seen = 0;
    }
}

impl<F: FnMut(&str, usize, usize, usize)> Progress for F {
    fn report(&mut self, stage: &str, pending: usize, peak: usize, total: usize) {
        (self)(stage, pending, peak, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn tracing_progress_forwards_every_nth() {
        let mut progress = TracingProgress::new(0);
        assert_eq!(progress.every, 1);
        progress.report("stage", 1, 1, 1);
        progress.report("stage", 2, 2, 3);
        assert_eq!(progress.seen, 2);
        progress.finish("stage", 3);
        assert_eq!(progress.seen, 0);
    }

    #[test]
    fn closures_are_sinks() {
        let mut reports = vec![];
        let mut sink = |stage: &str, pending: usize, _peak: usize, _total: usize| {
            reports.push((stage.to_string(), pending))
        };
        sink.report("product", 3, 3, 1);
        sink.finish("product", 1);
        assert_eq!(reports, vec![("product".to_string(), 3)]);
    }
}
