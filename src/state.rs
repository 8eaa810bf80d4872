use anyhow::{Context, Result, bail};
use declarative::{Scope, ScopeStatus};
use std::fs;
use std::path::{Path, PathBuf};

/// Summary of a persisted scope, for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSummary {
    pub name: String,
    pub status: ScopeStatus,
    pub resources: usize,
}

/// Persists scopes as JSON files under `<state_dir>/scopes/`
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    /// Create a store rooted at a state directory
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: state_dir.into(),
        }
    }

    /// Directory holding one file per scope
    pub fn scopes_dir(&self) -> PathBuf {
        self.root.join("scopes")
    }

    /// Path of a scope's file
    pub fn scope_file(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.scopes_dir().join(format!("{}.json", name)))
    }

    /// Whether a scope has been persisted
    pub fn exists(&self, name: &str) -> bool {
        self.scope_file(name).is_ok_and(|path| path.exists())
    }

    /// Load a persisted scope
    pub fn load(&self, name: &str) -> Result<Scope> {
        let path = self.scope_file(name)?;
        if !path.exists() {
            bail!("Scope '{}' not found (looked in {})", name, path.display());
        }
        read_scope(&path)
    }

    /// Load a scope, or start a new one if it was never saved
    pub fn load_or_new(&self, name: &str) -> Result<Scope> {
        if self.exists(name) {
            self.load(name)
        } else {
            log::debug!("Scope '{}' does not exist yet, starting fresh", name);
            validate_name(name)?;
            Ok(Scope::new(name))
        }
    }

    /// Save a scope to disk
    pub fn save(&self, scope: &Scope) -> Result<()> {
        let dir = self.scopes_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;

        let path = self.scope_file(scope.name())?;
        let content =
            serde_json::to_string_pretty(scope).context("Failed to serialize scope to JSON")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write scope file: {}", path.display()))?;

        log::debug!("Saved scope '{}' to {}", scope.name(), path.display());
        Ok(())
    }

    /// Remove a scope's file. Returns false if there was nothing to remove.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.scope_file(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove scope file: {}", path.display()))?;
        Ok(true)
    }

    /// Summaries of every persisted scope, sorted by name
    pub fn list(&self) -> Result<Vec<ScopeSummary>> {
        let dir = self.scopes_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read state directory: {}", dir.display()))?;

        let mut summaries = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match read_scope(&path) {
                Ok(scope) => summaries.push(ScopeSummary {
                    name: scope.name().to_string(),
                    status: scope.status(),
                    resources: scope.len(),
                }),
                Err(e) => log::warn!("Skipping unreadable scope file {}: {:#}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }
}

fn read_scope(path: &Path) -> Result<Scope> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scope file: {}", path.display()))?;
    let scope = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scope file: {}", path.display()))?;
    log::debug!("Loaded scope from {}", path.display());
    Ok(scope)
}

/// Scope names become file names, so keep them to a safe alphabet
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !name.starts_with('.');
    if !valid {
        bail!(
            "Invalid scope name '{}': use letters, digits, '-', '_' or '.'",
            name
        );
    }
    Ok(())
}
