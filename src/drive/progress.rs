//! Upload progress events
//!
//! Events go straight to a caller-supplied callback as they happen; nothing
//! is buffered or replayed.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Uploading,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    /// 0.0 ..= 100.0
    pub percent: f64,
}

/// Caller-supplied progress sink
pub type ProgressSink<'a> = &'a mut (dyn FnMut(ProgressEvent) + Send);

/// Wraps an optional sink for the duration of a single upload
///
/// Once an error has been reported the reporter goes quiet, so a caller never
/// sees progress after the terminal error event.
pub struct ProgressReporter<'a> {
    sink: Option<ProgressSink<'a>>,
    failed: bool,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: Option<ProgressSink<'a>>) -> Self {
        Self { sink, failed: false }
    }

    pub fn uploading(&mut self, percent: f64) {
        self.emit(ProgressStatus::Uploading, percent);
    }

    pub fn complete(&mut self) {
        self.emit(ProgressStatus::Complete, 100.0);
    }

    /// Report the terminal error event (at most once)
    pub fn error(&mut self) {
        self.emit(ProgressStatus::Error, 0.0);
        self.failed = true;
    }

    fn emit(&mut self, status: ProgressStatus, percent: f64) {
        if self.failed {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink(ProgressEvent {
                status,
                percent: percent.clamp(0.0, 100.0),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_goes_quiet_after_error() {
        let mut events = Vec::new();
        {
            let mut sink = |e: ProgressEvent| events.push(e);
            let mut reporter = ProgressReporter::new(Some(&mut sink));
            reporter.uploading(30.0);
            reporter.error();
            reporter.error();
            reporter.complete();
        }

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].status, ProgressStatus::Error);
        assert_eq!(events[1].percent, 0.0);
    }

    #[test]
    fn test_reporter_without_sink() {
        let mut reporter = ProgressReporter::new(None);
        reporter.uploading(50.0);
        reporter.complete();
    }
}
