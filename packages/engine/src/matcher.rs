//! Rule schedule matching
//!
//! A rule applies to a query window when any of its time ranges overlaps the
//! window on a day the range is in force. Partial overlap is enough: any
//! intrusion into a restricted window makes the stay non-compliant.

use crate::types::{Blockface, ParkingRule, TimeRange};
use crate::window::{DaySlice, QueryWindow};

/// Check whether a single time range intersects any of the day slices.
///
/// Ranges with `start >= end` cannot be in force for any instant and never match.
/// An end of 23:59 reaches midnight (see [`TimeRange::end_seconds`]).
pub fn range_overlaps(range: &TimeRange, slices: &[DaySlice]) -> bool {
    let start = range.start_time.seconds();
    let end = range.end_seconds();
    if start >= end {
        tracing::debug!(
            start = %range.start_time,
            end = %range.end_time,
            "Skipping empty or reversed time range"
        );
        return false;
    }

    slices
        .iter()
        .any(|slice| range.applies_on(slice.day_of_week) && slice.overlaps(start, end))
}

/// Check whether a rule is in force at any point of the expanded window.
pub fn rule_applies(rule: &ParkingRule, slices: &[DaySlice]) -> bool {
    rule.time_ranges
        .iter()
        .any(|range| range_overlaps(range, slices))
}

/// Collect the rules of a blockface that apply to the window, in blockface order.
pub fn applicable_rules<'a>(blockface: &'a Blockface, window: &QueryWindow) -> Vec<&'a ParkingRule> {
    let slices = window.day_slices();
    blockface
        .rules
        .iter()
        .filter(|rule| rule_applies(rule, &slices))
        .collect()
}
