//! Target resolution
//!
//! Builds the ordered list of URLs a run cycles through.

use crate::error::ResolveError;
use std::path::{Path, PathBuf};

/// Where the targets for a run come from, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct TargetSource {
    /// File of newline-separated URLs (`-f`)
    pub file: Option<PathBuf>,
    /// Single explicit URL (`-u`)
    pub url: Option<String>,
    /// Positional arguments; only the first one is used
    pub args: Vec<String>,
}

/// Ordered, non-empty list of target URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetList {
    urls: Vec<String>,
}

impl TargetList {
    /// Build a list from URLs, rejecting an empty one
    pub fn new(urls: Vec<String>) -> Result<Self, ResolveError> {
        if urls.is_empty() {
            return Err(ResolveError::MissingTarget);
        }
        Ok(Self { urls })
    }

    /// URL for job `index`, cycling through the list
    pub fn for_job(&self, index: usize) -> &str {
        &self.urls[index % self.urls.len()]
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

/// Resolve a target source. File beats `-u`, which beats the first positional argument.
pub fn resolve(source: &TargetSource) -> Result<TargetList, ResolveError> {
    if let Some(path) = source.file.as_deref().filter(|p| !p.as_os_str().is_empty()) {
        return TargetList::new(read_lines(path)?);
    }
    if let Some(url) = source.url.as_deref().filter(|u| !u.is_empty()) {
        return TargetList::new(vec![url.to_string()]);
    }
    match source.args.first() {
        Some(arg) => TargetList::new(vec![arg.clone()]),
        None => Err(ResolveError::MissingTarget),
    }
}

/// Read a URL file one line per target. Blank lines are kept as empty targets.
fn read_lines(path: &Path) -> Result<Vec<String>, ResolveError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ResolveError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}
