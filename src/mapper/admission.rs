//! In-flight accounting for bounded admission.

use std::num::NonZeroUsize;

/// Sliding admission window: at most `limit` tasks in flight.
///
/// Owned by the collecting thread; tasks report completion over a channel
/// and the collector calls [`on_complete`](Self::on_complete), so the count
/// is an upper bound on what is actually running.
#[derive(Debug, Clone)]
pub struct AdmissionWindow {
    limit: NonZeroUsize,
    in_flight: usize,
    peak: usize,
    admitted: usize,
    closed: bool,
}

impl AdmissionWindow {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            limit,
            in_flight: 0,
            peak: 0,
            admitted: 0,
            closed: false,
        }
    }

    /// Claim a slot. Returns false when full or closed.
    pub fn try_admit(&mut self) -> bool {
        if self.closed || self.in_flight >= self.limit.get() {
            return false;
        }

        self.in_flight += 1;
        self.admitted += 1;
        self.peak = self.peak.max(self.in_flight);
        true
    }

    pub fn on_complete(&mut self) {
        debug_assert!(self.in_flight > 0, "completion without admission");
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Stop admitting; in-flight tasks still drain.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn admitted(&self) -> usize {
        self.admitted
    }

    pub fn limit(&self) -> NonZeroUsize {
        self.limit
    }
}
