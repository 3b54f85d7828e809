use anyhow::Result;
use log::debug;
use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// What the resolver is allowed to see of the outside world.
pub trait Workspace {
    /// Uncommitted changes against the current checkpoint.
    fn changed_files(&self) -> Result<Vec<String>>;

    /// Best-effort read. `None` for anything missing or unreadable.
    fn read_file(&self, id: &str) -> Option<String>;
}

pub struct GitWorkspace {
    root: PathBuf,
    toplevel: OnceCell<Option<PathBuf>>,
}

impl GitWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GitWorkspace {
            root: root.into(),
            toplevel: OnceCell::new(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| anyhow::anyhow!("Git {} failed: {}", args[0], e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!("Git {} failed: {}", args[0], stderr.trim()));
        }

        Ok(output.stdout)
    }

    /// Top-level directory of the repository containing `root`. Paths from
    /// `git diff` are relative to it.
    fn toplevel(&self) -> Option<&Path> {
        self.toplevel
            .get_or_init(|| match self.git(&["rev-parse", "--show-toplevel"]) {
                Ok(stdout) => {
                    let dir = String::from_utf8_lossy(&stdout).trim().to_string();
                    (!dir.is_empty()).then(|| PathBuf::from(dir))
                }
                Err(e) => {
                    debug!("No repository top level for {}: {e}", self.root.display());
                    None
                }
            })
            .as_deref()
    }
}

impl Workspace for GitWorkspace {
    fn changed_files(&self) -> Result<Vec<String>> {
        debug!("Running git diff in {}", self.root.display());

        // -z disables core.quotePath escaping of non-ASCII names
        let stdout = self.git(&["diff", "-z", "--name-only", "HEAD"])?;
        Ok(parse_name_only(&String::from_utf8_lossy(&stdout)))
    }

    fn read_file(&self, id: &str) -> Option<String> {
        let mut candidates = vec![self.root.join(id)];
        if let Some(top) = self.toplevel() {
            candidates.push(top.join(id));
        }

        for path in &candidates {
            match fs::read_to_string(path) {
                Ok(content) => return Some(content),
                Err(e) => debug!("Skipping content scan of {}: {e}", path.display()),
            }
        }
        None
    }
}

/// Splits NUL-terminated `--name-only -z` output.
fn parse_name_only(stdout: &str) -> Vec<String> {
    stdout
        .split('\0')
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
