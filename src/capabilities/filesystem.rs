//! Default filesystem glob capability backed by the local machine.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use regex::Regex;
use walkdir::WalkDir;

use super::{FileEntry, FileGlobber};

/// Globber resolving patterns against the filesystem this process runs on.
///
/// Supports literal paths plus `?`, `*` (within one path component) and `**`
/// (across components). Unreadable entries are skipped with a warning rather
/// than aborting the whole expansion.
pub struct LocalFileSystem;

impl FileGlobber for LocalFileSystem {
    fn glob(&self, paths: &[String]) -> Result<Box<dyn Iterator<Item = FileEntry>>> {
        let mut entries = Vec::new();
        for pattern in paths {
            expand_pattern(pattern, &mut entries)?;
        }
        Ok(Box::new(entries.into_iter()))
    }
}

fn expand_pattern(pattern: &str, out: &mut Vec<FileEntry>) -> Result<()> {
    let normalized = pattern.replace('\\', "/");

    if !normalized.contains(['*', '?']) {
        let path = Path::new(&normalized);
        match path.symlink_metadata() {
            Ok(metadata) => out.push(file_entry(path, &metadata)),
            Err(e) => warn!("Skipping {}: {}", pattern, e),
        }
        return Ok(());
    }

    // Walk from the deepest literal prefix and match full paths against the
    // compiled pattern.
    let base = literal_prefix(&normalized);
    let matcher = glob_to_regex(&normalized)
        .with_context(|| format!("Invalid path pattern: {}", pattern))?;
    let root = if base.as_os_str().is_empty() { PathBuf::from(".") } else { base };
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let text = entry.path().to_string_lossy().replace('\\', "/");
        if !matcher.is_match(&text) {
            continue;
        }
        match entry.metadata() {
            Ok(metadata) => out.push(file_entry(entry.path(), &metadata)),
            Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
        }
    }
    Ok(())
}

/// Longest leading run of path components without glob metacharacters.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in pattern.split('/') {
        if component.contains(['*', '?']) {
            break;
        }
        if component.is_empty() {
            base.push("/");
        } else {
            base.push(component);
        }
    }
    base
}

/// Translate a glob pattern into an anchored regex over `/`-separated paths.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut expression = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    expression.push_str(".*");
                } else {
                    expression.push_str("[^/]*");
                }
            }
            '?' => expression.push_str("[^/]"),
            other => expression.push_str(&regex::escape(&other.to_string())),
        }
    }
    expression.push('$');
    Regex::new(&expression).map_err(Into::into)
}

fn file_entry(path: &Path, metadata: &Metadata) -> FileEntry {
    let modified = metadata
        .modified()
        .ok()
        .map(|time| DateTime::<Utc>::from(time).to_rfc3339())
        .unwrap_or_default();
    FileEntry {
        st_mode: mode_string(metadata),
        st_nlink: link_count(metadata),
        st_uid: owner(metadata),
        st_gid: group(metadata),
        st_size: metadata.len(),
        st_mtime: modified,
        filename: path.to_string_lossy().replace('\\', "/"),
    }
}

#[cfg(unix)]
fn mode_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    format!("{:o}", metadata.mode())
}

#[cfg(not(unix))]
fn mode_string(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        "readonly".to_string()
    } else {
        "writable".to_string()
    }
}

#[cfg(unix)]
fn link_count(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

#[cfg(not(unix))]
fn link_count(_metadata: &Metadata) -> u64 {
    1
}

#[cfg(unix)]
fn owner(metadata: &Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    metadata.uid().to_string()
}

#[cfg(not(unix))]
fn owner(_metadata: &Metadata) -> String {
    String::new()
}

#[cfg(unix)]
fn group(metadata: &Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    metadata.gid().to_string()
}

#[cfg(not(unix))]
fn group(_metadata: &Metadata) -> String {
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn path_string(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().replace('\\', "/")
    }

    #[test]
    fn literal_path_matches_one_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("syslog"), "content").unwrap();

        let entries: Vec<FileEntry> = LocalFileSystem
            .glob(&[path_string(&dir, "syslog")])
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].st_size, 7);
        assert!(entries[0].filename.ends_with("syslog"));
    }

    #[test]
    fn missing_literal_path_is_skipped() {
        let dir = TempDir::new().unwrap();
        let entries: Vec<FileEntry> = LocalFileSystem
            .glob(&[path_string(&dir, "no_such_file")])
            .unwrap()
            .collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn wildcard_matches_within_component() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.log"), "x").unwrap();
        fs::write(dir.path().join("b.log"), "x").unwrap();
        fs::write(dir.path().join("c.txt"), "x").unwrap();

        let mut entries: Vec<String> = LocalFileSystem
            .glob(&[path_string(&dir, "*.log")])
            .unwrap()
            .map(|e| e.filename)
            .collect();
        entries.sort();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("a.log"));
        assert!(entries[1].ends_with("b.log"));
    }

    #[test]
    fn double_star_crosses_components() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested/deep")).unwrap();
        fs::write(dir.path().join("nested/deep/hit.conf"), "x").unwrap();

        let entries: Vec<FileEntry> = LocalFileSystem
            .glob(&[path_string(&dir, "**/hit.conf")])
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn glob_translation_anchors_the_pattern() {
        let matcher = glob_to_regex("/var/log/*.log").unwrap();
        assert!(matcher.is_match("/var/log/syslog.log"));
        assert!(!matcher.is_match("/var/log/nested/deep.log"));
        assert!(!matcher.is_match("/var/log/syslog.log.1"));
    }
}
