//! Classpath expansion.
//!
//! A classpath is a `:`-separated list of directories, jars, or glob
//! patterns. Relative components are taken against the project root when one
//! is known, `~` expands to the home directory, and a `!` prefix removes the
//! component's matches from everything collected so far.

use std::path::{Path, PathBuf};

/// One expanded classpath member. Directories are scanned recursively for
/// Java sources; anything else is treated as a compiled archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClasspathEntry {
    Dir(PathBuf),
    Archive(PathBuf),
}

impl ClasspathEntry {
    pub fn from_path(path: PathBuf) -> Self {
        if path.is_dir() {
            ClasspathEntry::Dir(path)
        } else {
            ClasspathEntry::Archive(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::Dir(p) | ClasspathEntry::Archive(p) => p,
        }
    }
}

/// Render the entry list the way it is persisted in the cache record.
pub fn as_strings(entries: &[ClasspathEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.path().to_string_lossy().into_owned())
        .collect()
}

/// Expand a classpath specification into concrete paths, in collection order.
///
/// Bad glob patterns and unreadable matches are warned about and skipped; the
/// rest of the classpath still expands.
pub fn expand(spec: &str, project_root: Option<&Path>) -> Vec<PathBuf> {
    let mut collected: Vec<PathBuf> = Vec::new();

    for component in spec.split(':').filter(|c| !c.is_empty()) {
        let (negated, raw) = match component.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, component),
        };
        let pattern = normalize(raw, project_root);

        let matches = match glob::glob(&pattern.to_string_lossy()) {
            Ok(paths) => paths,
            Err(e) => {
                eprintln!("warning: bad classpath pattern {}: {}", raw, e);
                continue;
            }
        };
        for m in matches {
            match m {
                Ok(path) if negated => collected.retain(|p| p != &path),
                Ok(path) => collected.push(path),
                Err(e) => eprintln!("warning: skipping classpath match: {}", e),
            }
        }
    }

    collected
}

/// Expand `~` and anchor relative components under the project root.
fn normalize(component: &str, project_root: Option<&Path>) -> PathBuf {
    if component == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = component.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    let path = PathBuf::from(component);
    if path.is_relative() {
        if let Some(root) = project_root {
            return root.join(path);
        }
    }
    path
}
