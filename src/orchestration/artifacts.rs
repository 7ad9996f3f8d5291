//! Package artifacts in the working directory
//!
//! `dotnet pack ... -o .` drops `<Id>.<Version>.nupkg` (and `.snupkg` with symbols) next to
//! the run, so old files have to be cleared out before packing.

use lazy_static::lazy_static;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const PACKAGE_EXTENSION: &str = ".nupkg";
pub const SYMBOLS_EXTENSION: &str = ".snupkg";

lazy_static! {
    static ref PACKAGE_FILE: Regex = Regex::new(r"\.s?nupkg$").expect("valid package pattern");
}

/// A generated package file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    /// Absolute path
    pub path: PathBuf,
}

/// Package files found after `dotnet pack`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    dir: PathBuf,
    names: Vec<String>,
}

impl ArtifactSet {
    /// Scans `dir` (not recursively); names are sorted
    pub fn scan(dir: &Path) -> io::Result<Self> {
        Ok(Self {
            dir: std::path::absolute(dir)?,
            names: package_files(dir)?,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// First `.nupkg`
    pub fn primary(&self) -> Option<Artifact> {
        self.first_with(PACKAGE_EXTENSION)
    }

    /// First `.snupkg`
    pub fn symbols(&self) -> Option<Artifact> {
        self.first_with(SYMBOLS_EXTENSION)
    }

    fn first_with(&self, extension: &str) -> Option<Artifact> {
        self.names
            .iter()
            .find(|name| name.ends_with(extension))
            .map(|name| Artifact {
                file_name: name.clone(),
                path: self.dir.join(name),
            })
    }
}

/// Names of `*.nupkg` / `*.snupkg` files directly inside `dir`
pub fn package_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if PACKAGE_FILE.is_match(&name) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Deletes every package file directly inside `dir`, returning how many were removed
pub fn remove_stale_packages(dir: &Path) -> io::Result<usize> {
    let stale = package_files(dir)?;
    for name in &stale {
        tracing::debug!(file = %name, "removing stale package");
        std::fs::remove_file(dir.join(name))?;
    }
    Ok(stale.len())
}
