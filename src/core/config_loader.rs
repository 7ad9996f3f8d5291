//! Environment loader for publish-nuget
//!
//! Every setting is looked up as `INPUT_<NAME>` first (how GitHub Actions passes inputs)
//! and then as plain `<NAME>`. Empty values count as unset.

use super::config::*;
use crate::core::error::PublishError;
use crate::security::FailureDetection;
use regex::{Regex, RegexBuilder};
use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Prefix GitHub Actions puts in front of action inputs
const INPUT_PREFIX: &str = "INPUT_";

/// Environment lookup with `INPUT_` fallback
struct EnvLookup<'a> {
    env: &'a HashMap<String, String>,
}

impl<'a> EnvLookup<'a> {
    fn raw(&self, key: &str) -> Option<&'a str> {
        self.env
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn get(&self, name: &str) -> Option<String> {
        self.raw(&format!("{}{}", INPUT_PREFIX, name))
            .or_else(|| self.raw(name))
            .map(str::to_string)
    }

    fn path(&self, name: &str) -> Option<PathBuf> {
        self.get(name).map(PathBuf::from)
    }

    fn secret(&self, name: &str) -> Option<SecretString> {
        self.get(name).map(|value| SecretString::new(value.into()))
    }

    /// Strict boolean: exactly `true` or `false`
    fn bool(&self, name: &str) -> Result<bool, PublishError> {
        match self.get(name).as_deref() {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(PublishError::config(format!(
                "{} must be `true` or `false` (got `{}`)",
                name, other
            ))),
            None => Err(PublishError::config(format!("{} is required", name))),
        }
    }

    /// Owner of the repository running the workflow
    fn repository_owner(&self) -> Option<String> {
        self.raw("GITHUB_REPOSITORY_OWNER")
            .map(str::to_string)
            .or_else(|| {
                self.raw("GITHUB_REPOSITORY")
                    .and_then(|repo| repo.split('/').next())
                    .filter(|owner| !owner.is_empty())
                    .map(str::to_string)
            })
    }
}

/// Compiles the version pattern in multi-line mode
///
/// `\r\n` counts as a line ending, so `$` and `.` behave the same on CRLF version files.
pub fn compile_version_regex(pattern: &str) -> Result<Regex, PublishError> {
    let regex = RegexBuilder::new(pattern)
        .multi_line(true)
        .crlf(true)
        .build()
        .map_err(|e| PublishError::config(format!("invalid VERSION_REGEX: {}", e)))?;

    if regex.captures_len() < 2 {
        return Err(PublishError::config(
            "VERSION_REGEX must contain a capture group for the version",
        ));
    }

    Ok(regex)
}

impl ActionConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, PublishError> {
        let env: HashMap<String, String> = env::vars().collect();
        Self::from_env_map(&env)
    }

    /// Load configuration from an explicit variable map
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self, PublishError> {
        let lookup = EnvLookup { env };

        let version_static = lookup.get("VERSION_STATIC");
        let version_regex = match lookup.get("VERSION_REGEX") {
            Some(pattern) => Some(compile_version_regex(&pattern)?),
            None if version_static.is_none() => {
                return Err(PublishError::config(
                    "VERSION_REGEX is required when VERSION_STATIC is not set",
                ));
            }
            None => None,
        };

        let tag_commit = lookup.bool("TAG_COMMIT")?;
        let tag_format = lookup.get("TAG_FORMAT");
        if tag_commit && tag_format.is_none() {
            return Err(PublishError::config(
                "TAG_FORMAT is required when TAG_COMMIT is enabled",
            ));
        }

        let include_symbols = lookup.bool("INCLUDE_SYMBOLS")?;
        let no_build = lookup.bool("NO_BUILD")?;

        let owner = lookup.repository_owner();
        let github = GithubRegistryConfig {
            enabled: lookup.bool("USE_GITHUB_NUGET_REGISTRY")?,
            namespace: lookup.get("GITHUB_NUGET_NAMESPACE").or_else(|| owner.clone()),
            username: lookup.get("GITHUB_NUGET_USERNAME").or(owner),
            token: lookup
                .secret("GITHUB_NUGET_TOKEN")
                .or_else(|| lookup.raw("GITHUB_TOKEN").map(|t| SecretString::new(t.into()))),
        };

        let nuget_source = lookup.get("NUGET_SOURCE");
        if nuget_source.is_none() && !github.enabled {
            return Err(PublishError::config(
                "NUGET_SOURCE is required unless USE_GITHUB_NUGET_REGISTRY is enabled",
            ));
        }

        let failure_detection = match lookup.get("FAILURE_DETECTION") {
            Some(value) => value.parse()?,
            None => FailureDetection::default(),
        };

        Ok(Self {
            project_file: lookup.path("PROJECT_FILE_PATH"),
            package_name: lookup.get("PACKAGE_NAME"),
            version_file: lookup.path("VERSION_FILE_PATH"),
            version_regex,
            version_static,
            tag_commit,
            tag_format,
            nuget_key: lookup.secret("NUGET_KEY"),
            nuget_source,
            include_symbols,
            no_build,
            github,
            failure_detection,
        })
    }
}
