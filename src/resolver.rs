use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::strategy::{RuleKind, Strategy, ALL, INTEGRATION, SMOKE};
use crate::workspace::Workspace;

/// Selected suite tags plus the reasons each one was selected.
///
/// Tags keep their first-insertion order and are never duplicated. Reasons
/// accumulate in the order the changes were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    suites: Vec<String>,
    reasons: BTreeMap<String, Vec<String>>,
}

impl Recommendation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tag: &str, reason: impl Into<String>) {
        if !self.contains(tag) {
            self.suites.push(tag.to_string());
        }
        self.reasons
            .entry(tag.to_string())
            .or_default()
            .push(reason.into());
    }

    /// Replaces whatever reasons `tag` had so far.
    pub fn set(&mut self, tag: &str, reasons: Vec<String>) {
        if !self.contains(tag) {
            self.suites.push(tag.to_string());
        }
        self.reasons.insert(tag.to_string(), reasons);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.suites.iter().any(|s| s == tag)
    }

    pub fn suites(&self) -> &[String] {
        &self.suites
    }

    pub fn reasons(&self, tag: &str) -> &[String] {
        self.reasons.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn runs_all(&self) -> bool {
        self.contains(ALL)
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    Arguments,
    Git,
    /// Git produced nothing usable.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub origin: ChangeOrigin,
    pub files: Vec<String>,
    pub recommendation: Recommendation,
}

pub struct Resolver<'a> {
    strategy: &'a Strategy,
    workspace: &'a dyn Workspace,
}

impl<'a> Resolver<'a> {
    pub fn new(strategy: &'a Strategy, workspace: &'a dyn Workspace) -> Self {
        Resolver {
            strategy,
            workspace,
        }
    }

    /// Never fails: every path ends in a usable recommendation.
    pub fn analyze(&self, files: &[String]) -> Analysis {
        if !files.is_empty() {
            return Analysis {
                origin: ChangeOrigin::Arguments,
                files: files.to_vec(),
                recommendation: self.resolve(files),
            };
        }

        info!("No files specified, analyzing git changes");
        match self.workspace.changed_files() {
            Ok(changed) if changed.is_empty() => {
                info!("No uncommitted changes detected");
                Self::smoke_only("No changes detected")
            }
            Ok(changed) => Analysis {
                origin: ChangeOrigin::Git,
                recommendation: self.resolve(&changed),
                files: changed,
            },
            Err(e) => {
                warn!("Could not analyze git changes: {e}");
                Self::smoke_only("Git analysis failed")
            }
        }
    }

    fn smoke_only(reason: &str) -> Analysis {
        let mut recommendation = Recommendation::new();
        recommendation.add(SMOKE, reason);
        Analysis {
            origin: ChangeOrigin::None,
            files: Vec::new(),
            recommendation,
        }
    }

    pub fn resolve(&self, files: &[String]) -> Recommendation {
        let mut rec = Recommendation::new();

        for file in files {
            self.match_exact(file, &mut rec);
            self.match_extension(file, &mut rec);
            self.match_content(file, &mut rec);
        }

        let marker = self.strategy.test_file_marker.as_str();
        if !marker.is_empty() && files.iter().any(|f| f.contains(marker)) {
            debug!("Test files changed, selecting everything");
            rec.set(ALL, vec!["Test files modified".to_string()]);
        }

        if rec.is_empty() {
            debug!("No rule matched, using safe default");
            rec.add(SMOKE, "Safe default - verify app still works");
            rec.add(INTEGRATION, "Safe default - verify integrations");
        }

        rec
    }

    fn match_exact(&self, file: &str, rec: &mut Recommendation) {
        if let Some(rule) = self.strategy.rule(file) {
            for suite in &rule.suites {
                rec.add(suite, format!("{file} changed"));
            }
        }
    }

    fn match_extension(&self, file: &str, rec: &mut Recommendation) {
        let Some(ext) = extension(file) else {
            return;
        };
        if let Some(rule) = self.strategy.rule(&format!("*{ext}")) {
            for suite in &rule.suites {
                rec.add(suite, format!("{ext} file changed"));
            }
        }
    }

    /// Heuristic: a token rule fires when the changed file's text mentions the
    /// token anywhere. This is a substring search, not static analysis, so it
    /// misses renamed functions and fires on comments. Only tokens that look
    /// like task functions or the pending counter are considered.
    fn match_content(&self, file: &str, rec: &mut Recommendation) {
        let mut tokens = self
            .strategy
            .rules
            .iter()
            .filter(|r| r.kind() == RuleKind::Token && is_scannable_token(&r.key))
            .peekable();

        if tokens.peek().is_none() {
            return;
        }

        let Some(content) = self.workspace.read_file(file) else {
            return;
        };

        for rule in tokens {
            if content.contains(&rule.key) {
                for suite in &rule.suites {
                    rec.add(suite, format!("Function {} modified", rule.key));
                }
            }
        }
    }
}

fn is_scannable_token(token: &str) -> bool {
    token.contains("Task") || token.contains("pending")
}

/// Extension of the final path component, dot included. Dotfiles such as
/// `.env` have none.
pub fn extension(file: &str) -> Option<&str> {
    let base = file.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(file);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&base[idx..]),
    }
}
