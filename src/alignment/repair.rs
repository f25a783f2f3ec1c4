use crate::types::{round_ms, PhonemeTimestamp, WordTimestamp};

/// Minimum span length enforced after repair, in seconds.
pub const MIN_SPAN_SECONDS: f64 = 0.01;

/// Any record carrying a `[start, end)` time span.
pub trait TimedSpan {
    fn start(&self) -> f64;
    fn end(&self) -> f64;
    fn set_span(&mut self, start: f64, end: f64);
}

impl TimedSpan for WordTimestamp {
    fn start(&self) -> f64 {
        self.start
    }
    fn end(&self) -> f64 {
        self.end
    }
    fn set_span(&mut self, start: f64, end: f64) {
        self.start = start;
        self.end = end;
    }
}

impl TimedSpan for PhonemeTimestamp {
    fn start(&self) -> f64 {
        self.start
    }
    fn end(&self) -> f64 {
        self.end
    }
    fn set_span(&mut self, start: f64, end: f64) {
        self.start = start;
        self.end = end;
    }
}

/// Enforce strictly ordered, non-overlapping spans of at least
/// [`MIN_SPAN_SECONDS`].
///
/// Single left-to-right pass carrying the previous end forward as a floor for
/// the next start. Boundaries are only clamped upward; records are never
/// reordered or dropped. Idempotent: repairing a repaired sequence is a
/// no-op.
pub fn repair_spans<T: TimedSpan>(spans: &mut [T]) {
    let mut prev_end = 0.0f64;
    for span in spans.iter_mut() {
        let start = round_ms(span.start().max(prev_end));
        let end = round_ms(span.end().max(start + MIN_SPAN_SECONDS));
        span.set_span(start, end);
        prev_end = end;
    }
}
