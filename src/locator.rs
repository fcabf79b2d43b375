use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::warn;
use regex::Regex;

use crate::error::{CccError, Result};

#[derive(Debug, Clone)]
pub struct StatementFile {
    pub path: PathBuf,
    pub modified: DateTime<Local>,
}

impl StatementFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Translate a shell glob (`*`, `?`) into an anchored regex.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| CccError::Other(format!("Invalid file pattern '{pattern}': {e}")))
}

/// Files in `dir` whose name matches `pattern`, oldest modification first.
pub fn file_table(dir: &Path, pattern: &str) -> Result<Vec<StatementFile>> {
    if !dir.is_dir() {
        return Err(CccError::NotADirectory(dir.to_path_buf()));
    }
    let re = glob_to_regex(pattern)?;
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        if !re.is_match(&name.to_string_lossy()) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        files.push(StatementFile {
            path,
            modified: DateTime::<Local>::from(modified),
        });
    }
    files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(files)
}

/// The most recently modified statement in `dir`.
pub fn latest_statement(dir: &Path, pattern: &str) -> Result<StatementFile> {
    let mut files = file_table(dir, pattern)?;
    let latest = files.pop().ok_or_else(|| CccError::NoStatement {
        dir: dir.to_path_buf(),
        pattern: pattern.to_string(),
    })?;
    if !files.is_empty() {
        warn!(
            "{} statements match '{pattern}'; processing latest file: {}",
            files.len() + 1,
            latest.file_name()
        );
    }
    Ok(latest)
}
