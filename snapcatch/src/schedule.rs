//! Expected-interval inference for cron-like task schedules
//!
//! The host is not continuously powered on, so a task's schedule cannot be
//! evaluated as "next firing time" — what matters is the expected spacing
//! between runs, so staleness can be judged against the newest snapshot.
//!
//! This is a heuristic with fixed precedence, not a cron-cycle solver.
//! Schedules constraining both day-of-month and day-of-week resolve by the
//! precedence below (day-of-week wins), and multi-value fields like `1,15`
//! count as constrained fixed values.

use crate::constants::intervals;
use crate::types::TaskSchedule;

/// Seconds expected between runs of a task. First match wins:
/// minute step, hour step, hourly wildcard, weekly, monthly, daily default.
pub fn expected_interval(schedule: &TaskSchedule) -> i64 {
    if let Some(step) = step_value(&schedule.minute) {
        return step * intervals::MINUTE;
    }
    if let Some(step) = step_value(&schedule.hour) {
        return step * intervals::HOUR;
    }
    if schedule.hour == "*" {
        return intervals::HOUR;
    }
    if schedule.dow != "*" {
        return intervals::WEEK;
    }
    if schedule.dom != "*" {
        return intervals::MONTH;
    }
    intervals::DAY
}

/// N of a `*/N` step expression, if the field is one.
fn step_value(field: &str) -> Option<i64> {
    let step = field.strip_prefix("*/")?;
    step.parse::<i64>().ok().filter(|n| *n > 0)
}
