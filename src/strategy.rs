use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const ALL: &str = "all";
pub const SMOKE: &str = "smoke";
pub const INTEGRATION: &str = "integration";

/// Environment variable that relocates the config directory.
pub const HOME_ENV: &str = "SMART_TEST_MANAGER_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// `*.vue`, `*.spec.ts`
    Extension,
    /// `app/app.vue`, `package.json`
    Path,
    /// A bare identifier such as a function name.
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRule {
    pub key: String,
    pub suites: Vec<String>,
}

impl ChangeRule {
    pub fn new(key: &str, suites: &[&str]) -> Self {
        ChangeRule {
            key: key.to_string(),
            suites: suites.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn kind(&self) -> RuleKind {
        if self.key.starts_with('*') {
            RuleKind::Extension
        } else if self.key.contains('/') || self.key.contains('.') {
            RuleKind::Path
        } else {
            RuleKind::Token
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteDescriptor {
    pub tag: String,
    pub name: String,
    /// Runner filter for this suite. `None` means "every test".
    pub pattern: Option<String>,
    pub estimated_secs: u64,
    pub priority: Priority,
    pub description: String,
}

impl SuiteDescriptor {
    fn new(
        tag: &str,
        name: &str,
        pattern: Option<&str>,
        estimated_secs: u64,
        priority: Priority,
        description: &str,
    ) -> Self {
        SuiteDescriptor {
            tag: tag.to_string(),
            name: name.to_string(),
            pattern: pattern.map(str::to_string),
            estimated_secs,
            priority,
            description: description.to_string(),
        }
    }
}

/// The static rule and suite tables. Loaded once and passed by reference to
/// everything that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub rules: Vec<ChangeRule>,
    pub suites: Vec<SuiteDescriptor>,
    #[serde(default = "default_runner")]
    pub runner: String,
    #[serde(default = "default_baseline_secs")]
    pub baseline_secs: u64,
    #[serde(default = "default_test_file_marker")]
    pub test_file_marker: String,
}

fn default_runner() -> String {
    "npx playwright test".to_string()
}

fn default_baseline_secs() -> u64 {
    120
}

fn default_test_file_marker() -> String {
    ".spec.ts".to_string()
}

impl Default for Strategy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Strategy {
    pub fn builtin() -> Self {
        let rules = vec![
            // UI
            ChangeRule::new("app/app.vue", &["ui", "integration"]),
            ChangeRule::new("app.vue", &["ui", "integration"]),
            ChangeRule::new("*.vue", &["ui", "integration"]),
            ChangeRule::new("*.css", &["ui"]),
            ChangeRule::new("tailwind.config.js", &["ui"]),
            // Logic
            ChangeRule::new("addTask", &["logic", "integration"]),
            ChangeRule::new("deleteTask", &["logic", "integration"]),
            ChangeRule::new("toggleTask", &["logic", "integration"]),
            ChangeRule::new("clearCompleted", &["logic", "integration"]),
            ChangeRule::new("clearAll", &["logic", "integration"]),
            ChangeRule::new("pendingTasks", &["logic", "counter", "integration"]),
            // Configuration
            ChangeRule::new("package.json", &["smoke"]),
            ChangeRule::new("playwright.config.ts", &["smoke"]),
            ChangeRule::new("nuxt.config.ts", &["smoke", "integration"]),
            // Tests
            ChangeRule::new("*.spec.ts", &["all"]),
        ];

        let suites = vec![
            SuiteDescriptor::new(
                SMOKE,
                "Smoke Tests",
                Some("@smoke"),
                5,
                Priority::Critical,
                "Quick sanity check - app loads and basic functionality works",
            ),
            SuiteDescriptor::new(
                "ui",
                "UI Component Tests",
                Some("@ui"),
                15,
                Priority::Medium,
                "Visual elements, layout, responsive design",
            ),
            SuiteDescriptor::new(
                "logic",
                "Business Logic Tests",
                Some("@logic"),
                30,
                Priority::High,
                "Core functionality, data manipulation, state management",
            ),
            SuiteDescriptor::new(
                "counter",
                "Counter Accuracy Tests",
                Some("@counter"),
                10,
                Priority::Medium,
                "Pending tasks counter computation and reactivity",
            ),
            SuiteDescriptor::new(
                INTEGRATION,
                "Integration Tests",
                Some("@integration"),
                60,
                Priority::Critical,
                "Complex workflows, state consistency, edge cases",
            ),
            SuiteDescriptor::new(
                ALL,
                "All Tests",
                None,
                120,
                Priority::Critical,
                "Complete test suite",
            ),
        ];

        Strategy {
            rules,
            suites,
            runner: default_runner(),
            baseline_secs: default_baseline_secs(),
            test_file_marker: default_test_file_marker(),
        }
    }

    pub fn suite(&self, tag: &str) -> Option<&SuiteDescriptor> {
        self.suites.iter().find(|s| s.tag == tag)
    }

    pub fn rule(&self, key: &str) -> Option<&ChangeRule> {
        self.rules.iter().find(|r| r.key == key)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for suite in &self.suites {
            if !seen.insert(suite.tag.as_str()) {
                anyhow::bail!("Duplicate suite tag '{}'", suite.tag);
            }
        }

        for required in [ALL, SMOKE, INTEGRATION] {
            if !seen.contains(required) {
                anyhow::bail!("Required suite '{}' is missing", required);
            }
        }

        if let Some(all) = self.suite(ALL) {
            if all.pattern.is_some() {
                anyhow::bail!("Suite '{}' must not have a pattern", ALL);
            }
        }

        for rule in &self.rules {
            for tag in &rule.suites {
                if !seen.contains(tag.as_str()) {
                    anyhow::bail!("Rule '{}' references unknown suite '{}'", rule.key, tag);
                }
            }
        }

        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read strategy file {}", path.display()))?;
        let strategy: Strategy = serde_json::from_str(&content)
            .with_context(|| format!("Invalid strategy file {}", path.display()))?;
        strategy.validate()?;
        Ok(strategy)
    }

    /// Explicit path wins; otherwise the default config path if it exists;
    /// otherwise the built-in tables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let path = Self::get_path()?;
        if path.exists() {
            log::debug!("Loading strategy from {}", path.display());
            Self::load_from(&path)
        } else {
            log::debug!("No strategy file at {}, using built-in", path.display());
            Ok(Self::builtin())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write strategy file {}", path.display()))?;
        Ok(())
    }

    pub fn get_path() -> Result<PathBuf> {
        if let Ok(home) = std::env::var(HOME_ENV) {
            return Ok(PathBuf::from(home)
                .join(".smart-test-manager")
                .join("strategy.json"));
        }

        let home = directories::UserDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?
            .home_dir()
            .to_path_buf();

        Ok(home.join(".smart-test-manager").join("strategy.json"))
    }
}
