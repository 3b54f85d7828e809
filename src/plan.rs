use serde::Serialize;

use crate::resolver::Recommendation;
use crate::strategy::{Strategy, ALL, SMOKE};

/// Seconds the selection is expected to take. `all` stands alone: its own
/// estimate replaces the sum of everything else.
pub fn estimated_secs(strategy: &Strategy, rec: &Recommendation) -> u64 {
    if rec.runs_all() {
        return strategy.suite(ALL).map(|s| s.estimated_secs).unwrap_or(0);
    }

    rec.suites()
        .iter()
        .filter_map(|tag| strategy.suite(tag))
        .map(|s| s.estimated_secs)
        .sum()
}

pub fn test_command(strategy: &Strategy, rec: &Recommendation) -> String {
    let runner = strategy.runner.as_str();

    if rec.runs_all() {
        return runner.to_string();
    }

    let patterns: Vec<&str> = rec
        .suites()
        .iter()
        .filter_map(|tag| strategy.suite(tag))
        .filter_map(|s| s.pattern.as_deref())
        .collect();

    match patterns.as_slice() {
        [] => format!("{runner} --grep @{SMOKE}"),
        [single] => format!("{runner} --grep {single}"),
        many => format!("{runner} --grep \"({})\"", many.join("|")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSavings {
    pub selected_secs: u64,
    pub baseline_secs: u64,
    pub saved_secs: i64,
    pub percent_saved: i64,
}

pub fn time_savings(strategy: &Strategy, rec: &Recommendation) -> TimeSavings {
    let selected_secs = estimated_secs(strategy, rec);
    let baseline_secs = strategy.baseline_secs;
    let saved_secs = baseline_secs as i64 - selected_secs as i64;

    let percent_saved = if baseline_secs == 0 {
        0
    } else {
        // Halves round toward +inf
        (saved_secs as f64 / baseline_secs as f64 * 100.0 + 0.5).floor() as i64
    };

    TimeSavings {
        selected_secs,
        baseline_secs,
        saved_secs,
        percent_saved,
    }
}
