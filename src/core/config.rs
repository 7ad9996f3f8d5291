//! Configuration structures for publish-nuget
//!
//! An [`ActionConfig`] is built once at startup (see `config_loader`) and then passed by
//! reference to every stage of the pipeline.

use crate::security::FailureDetection;
use regex::Regex;
use secrecy::SecretString;
use std::path::{Path, PathBuf};

/// Root configuration object
#[derive(Debug)]
pub struct ActionConfig {
    /// Project file (`.csproj` / `.fsproj` / `.vbproj`) to build and pack
    pub project_file: Option<PathBuf>,

    /// Package id; derived from the project file name when absent
    pub package_name: Option<String>,

    /// File holding the version; defaults to the project file
    pub version_file: Option<PathBuf>,

    /// Multi-line pattern whose first group captures the version
    pub version_regex: Option<Regex>,

    /// Version to publish as-is, bypassing the version file
    pub version_static: Option<String>,

    /// Create and push a git tag after a successful push
    pub tag_commit: bool,

    /// Tag template, `*` is replaced by the version
    pub tag_format: Option<String>,

    /// API key for `dotnet nuget push`
    pub nuget_key: Option<SecretString>,

    /// Registry base URL (e.g. `https://api.nuget.org`)
    pub nuget_source: Option<String>,

    /// Also produce and push a `.snupkg`
    pub include_symbols: bool,

    /// Skip `dotnet build` before packing
    pub no_build: bool,

    /// GitHub Packages NuGet registry
    pub github: GithubRegistryConfig,

    /// How subprocess failures are detected
    pub failure_detection: FailureDetection,
}

/// GitHub Packages registry settings
#[derive(Debug, Default)]
pub struct GithubRegistryConfig {
    pub enabled: bool,
    pub namespace: Option<String>,
    pub username: Option<String>,
    pub token: Option<SecretString>,
}

impl ActionConfig {
    /// File the version is read from
    pub fn version_file(&self) -> Option<&Path> {
        self.version_file
            .as_deref()
            .or(self.project_file.as_deref())
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            project_file: None,
            package_name: None,
            version_file: None,
            version_regex: None,
            version_static: None,
            tag_commit: false,
            tag_format: None,
            nuget_key: None,
            nuget_source: None,
            include_symbols: false,
            no_build: false,
            github: GithubRegistryConfig::default(),
            failure_detection: FailureDetection::default(),
        }
    }
}
