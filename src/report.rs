use crossterm::style::{style, Attribute, Color, Stylize};
use serde::Serialize;

use crate::plan::{self, TimeSavings};
use crate::resolver::{Analysis, ChangeOrigin};
use crate::strategy::{Priority, Strategy, SuiteDescriptor, ALL};

const RULE_WIDTH: usize = 70;

const ALTERNATIVE_COMMANDS: &[(&str, &str)] = &[
    ("npx playwright test --grep @smoke", "5s - Quick sanity check"),
    ("npx playwright test --grep @critical", "40s - Critical tests only"),
    ("npx playwright test --grep @ui", "15s - UI tests"),
    ("npx playwright test --grep @logic", "30s - Logic tests"),
    ("npx playwright test --grep @integration", "60s - Full integration"),
];

const PROJECT_COMMANDS: &[&str] = &[
    "npx playwright test --project=ui-only",
    "npx playwright test --project=logic-only",
    "npx playwright test --project=integration-only",
];

#[derive(Debug, Clone, Copy)]
enum Tone {
    Plain,
    Bright,
    Green,
    Yellow,
    Cyan,
    Red,
}

struct Painter {
    color: bool,
    lines: Vec<String>,
}

impl Painter {
    fn new(color: bool) -> Self {
        Painter {
            color,
            lines: Vec::new(),
        }
    }

    fn line(&mut self, text: impl AsRef<str>, tone: Tone) {
        let text = text.as_ref();
        let painted = if self.color {
            match tone {
                Tone::Plain => text.to_string(),
                Tone::Bright => style(text).attribute(Attribute::Bold).to_string(),
                Tone::Green => style(text).with(Color::Green).to_string(),
                Tone::Yellow => style(text).with(Color::Yellow).to_string(),
                Tone::Cyan => style(text).with(Color::Cyan).to_string(),
                Tone::Red => style(text).with(Color::Red).to_string(),
            }
        } else {
            text.to_string()
        };
        self.lines.push(painted);
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn rule(&mut self) {
        self.line("=".repeat(RULE_WIDTH), Tone::Bright);
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Selected suites for display: `all` and unknown tags dropped, highest
/// priority first, selection order within a priority.
fn display_suites<'a>(strategy: &'a Strategy, analysis: &Analysis) -> Vec<&'a SuiteDescriptor> {
    let mut suites: Vec<&SuiteDescriptor> = analysis
        .recommendation
        .suites()
        .iter()
        .filter(|tag| tag.as_str() != ALL)
        .filter_map(|tag| strategy.suite(tag))
        .collect();
    suites.sort_by_key(|s| std::cmp::Reverse(s.priority));
    suites
}

pub fn render_text(strategy: &Strategy, analysis: &Analysis, color: bool) -> String {
    let mut p = Painter::new(color);
    let rec = &analysis.recommendation;

    p.blank();
    p.line(format!("╔{}╗", "═".repeat(RULE_WIDTH - 2)), Tone::Bright);
    p.line(
        format!(
            "║{:^width$}║",
            "SMART TEST MANAGER - Intelligent Test Selection",
            width = RULE_WIDTH - 2
        ),
        Tone::Bright,
    );
    p.line(format!("╚{}╝", "═".repeat(RULE_WIDTH - 2)), Tone::Bright);

    p.blank();
    match analysis.origin {
        ChangeOrigin::Arguments => p.line("Analyzing changed files:", Tone::Bright),
        ChangeOrigin::Git => p.line("Analyzing changed files (from git):", Tone::Bright),
        ChangeOrigin::None => p.line("No changed files to analyze.", Tone::Yellow),
    }
    for file in &analysis.files {
        p.line(format!("  - {file}"), Tone::Cyan);
    }

    p.blank();
    p.rule();
    p.line("SMART TEST MANAGER - RECOMMENDATIONS", Tone::Bright);
    p.rule();

    let suites = display_suites(strategy, analysis);
    p.blank();
    if rec.runs_all() {
        p.line("Recommendation: RUN ALL TESTS", Tone::Red);
        p.line(
            "Reason: Comprehensive changes detected or test files modified",
            Tone::Yellow,
        );
    } else {
        p.line(
            format!("Recommendation: Run {} test suite(s)", suites.len()),
            Tone::Green,
        );
        p.line(
            format!(
                "Estimated time: {} seconds",
                plan::estimated_secs(strategy, rec)
            ),
            Tone::Cyan,
        );
    }

    for suite in &suites {
        p.blank();
        p.line(&suite.name, Tone::Bright);
        p.line(format!("  Priority: {}", suite.priority), Tone::Yellow);
        p.line(format!("  Time: {}s", suite.estimated_secs), Tone::Cyan);
        p.line(format!("  Description: {}", suite.description), Tone::Plain);

        let reasons = rec.reasons(&suite.tag);
        if !reasons.is_empty() {
            p.line("  Why:", Tone::Green);
            for reason in reasons {
                p.line(format!("    - {reason}"), Tone::Green);
            }
        }
    }

    p.blank();
    p.rule();

    p.blank();
    p.line("Recommended command:", Tone::Bright);
    p.line(format!("  {}", plan::test_command(strategy, rec)), Tone::Green);

    p.blank();
    p.line("Alternative commands:", Tone::Bright);
    for (command, note) in ALTERNATIVE_COMMANDS {
        p.line(format!("  {command:<42}({note})"), Tone::Cyan);
    }

    p.blank();
    p.line("Project-specific runs:", Tone::Bright);
    for command in PROJECT_COMMANDS {
        p.line(format!("  {command}"), Tone::Cyan);
    }

    p.blank();
    p.rule();
    p.line("TEST OPTIMIZATION INSIGHTS", Tone::Bright);
    p.rule();

    let savings = plan::time_savings(strategy, rec);
    p.blank();
    p.line("Time Saved:", Tone::Green);
    p.line(
        format!(
            "  Running {}s of tests instead of {}s",
            savings.selected_secs, savings.baseline_secs
        ),
        Tone::Cyan,
    );
    p.line(
        format!(
            "  Time saved: {}s ({}%)",
            savings.saved_secs, savings.percent_saved
        ),
        Tone::Green,
    );

    p.finish()
}

#[derive(Debug, Serialize)]
struct JsonSuite<'a> {
    tag: &'a str,
    name: &'a str,
    priority: Priority,
    estimated_secs: u64,
    pattern: Option<&'a str>,
    reasons: &'a [String],
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    origin: ChangeOrigin,
    files: &'a [String],
    runs_all: bool,
    suites: Vec<JsonSuite<'a>>,
    estimated_secs: u64,
    command: String,
    savings: TimeSavings,
}

pub fn render_json(strategy: &Strategy, analysis: &Analysis) -> serde_json::Result<String> {
    let rec = &analysis.recommendation;

    let suites = rec
        .suites()
        .iter()
        .filter_map(|tag| strategy.suite(tag))
        .map(|s| JsonSuite {
            tag: &s.tag,
            name: &s.name,
            priority: s.priority,
            estimated_secs: s.estimated_secs,
            pattern: s.pattern.as_deref(),
            reasons: rec.reasons(&s.tag),
        })
        .collect();

    let report = JsonReport {
        origin: analysis.origin,
        files: &analysis.files,
        runs_all: rec.runs_all(),
        suites,
        estimated_secs: plan::estimated_secs(strategy, rec),
        command: plan::test_command(strategy, rec),
        savings: plan::time_savings(strategy, rec),
    };

    serde_json::to_string_pretty(&report)
}
