//! Date-range overlap semantics
//!
//! Rental periods are closed intervals of calendar days. Two periods
//! conflict when they share at least one day, so a reservation ending on
//! day N and another starting on day N collide (no same-day handover).
//! Both the create path and the public probe use this single predicate.

use chrono::NaiveDate;

/// Closed-interval overlap test: `[a_start, a_end]` and `[b_start, b_end]`
/// intersect iff `a_start <= b_end && b_start <= a_end`.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}
