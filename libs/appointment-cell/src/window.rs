use chrono::{DateTime, Duration, Utc};

/// Half-open time interval `[start, end)`.
///
/// Every scheduling comparison in the system goes through this type, so the
/// availability generator and the conflict check can never disagree on
/// boundary semantics: windows that merely touch do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window beginning at `start` and running for `duration_minutes`.
    pub fn starting_at(start: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(duration_minutes),
        }
    }

    /// True iff the two windows share any instant. Touching endpoints
    /// (`self.end == other.start`) do not count as overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True iff the instant falls inside the window. The start is included,
    /// the end is not.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_minutes()
    }
}
