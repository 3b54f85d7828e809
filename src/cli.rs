use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::warn;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::report;
use crate::resolver::{Analysis, Resolver};
use crate::strategy::Strategy;
use crate::workspace::GitWorkspace;

/// Pick the end-to-end test suites affected by a set of changed files.
#[derive(Parser)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Changed files to analyze (defaults to uncommitted git changes)
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Strategy file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Repository root used for git diff and file reads
    #[arg(short, long, default_value = ".")]
    pub repo: PathBuf,

    /// Print the recommendation as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the configured test suites
    Suites {
        /// Strategy file to use instead of the default location
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the built-in strategy to the config file for editing
    Init {
        /// Where to write the strategy (defaults to the config location)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing strategy file
        #[arg(short, long)]
        force: bool,
    },
}

/// Falls back to the built-in strategy when the configured one is unusable.
pub fn load_strategy(config: Option<&Path>) -> Strategy {
    match Strategy::load(config) {
        Ok(strategy) => strategy,
        Err(e) => {
            warn!("{e:#}");
            eprintln!("Warning: {e:#}");
            eprintln!("Using the built-in strategy");
            Strategy::builtin()
        }
    }
}

pub fn analyze(strategy: &Strategy, repo: &Path, files: &[String]) -> Analysis {
    let workspace = GitWorkspace::new(repo);
    Resolver::new(strategy, &workspace).analyze(files)
}

pub fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    let strategy = load_strategy(args.config.as_deref());
    let analysis = analyze(&strategy, &args.repo, &args.files);

    if args.json {
        println!("{}", report::render_json(&strategy, &analysis)?);
    } else {
        let color = color_enabled(
            args.no_color,
            std::env::var_os("NO_COLOR"),
            atty::is(atty::Stream::Stdout),
        );
        print!("{}", report::render_text(&strategy, &analysis, color));
    }

    Ok(())
}

/// Colors need a terminal and neither `--no-color` nor a non-empty `NO_COLOR`.
fn color_enabled(no_color_flag: bool, no_color_env: Option<OsString>, is_tty: bool) -> bool {
    let env_disabled = no_color_env.is_some_and(|v| !v.is_empty());
    is_tty && !no_color_flag && !env_disabled
}

pub fn handle_suites(config: Option<PathBuf>) -> Result<()> {
    let strategy = load_strategy(config.as_deref());

    println!(
        "{:<14} {:<26} {:<10} {:<8} {:<15}",
        "TAG", "NAME", "PRIORITY", "TIME", "PATTERN"
    );
    println!("{}", "-".repeat(77));

    for suite in &strategy.suites {
        let pattern = suite.pattern.as_deref().unwrap_or("(everything)");
        println!(
            "{:<14} {:<26} {:<10} {:<8} {:<15}",
            suite.tag,
            suite.name,
            suite.priority.to_string(),
            format!("{}s", suite.estimated_secs),
            pattern
        );
    }

    Ok(())
}

pub fn handle_init(config: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match config {
        Some(path) => path,
        None => Strategy::get_path()?,
    };

    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "Strategy file {} already exists (use --force to overwrite)",
            path.display()
        ));
    }

    Strategy::builtin().save_to(&path)?;
    println!("Strategy written to {}", path.display());

    Ok(())
}
