//! Version Validator - SemVer check for resolved versions
//!
//! NuGet accepts versions that are not SemVer 2.0.0 (four-part versions such as
//! `1.2.3.4`, or leading zeros), so a failed check is reported, never enforced.
//!
//! # Example
//!
//! ```
//! use publish_nuget::validation::version_validator::VersionValidator;
//!
//! let validator = VersionValidator::new();
//! let result = validator.validate("1.2.3-beta.1");
//!
//! assert!(result.is_valid);
//! assert_eq!(result.prerelease.as_deref(), Some("beta.1"));
//! ```

use semver::Version;

/// Result of version validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionValidationResult {
    /// Whether the version is valid semver
    pub is_valid: bool,
    /// Validation error message (if any)
    pub error: Option<String>,
    /// Pre-release part (e.g., "alpha.1")
    pub prerelease: Option<String>,
}

/// Validator for semantic versioning
#[derive(Debug, Default)]
pub struct VersionValidator;

impl VersionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a version string
    pub fn validate(&self, version_str: &str) -> VersionValidationResult {
        match Version::parse(version_str) {
            Ok(version) => VersionValidationResult {
                is_valid: true,
                error: None,
                prerelease: if version.pre.is_empty() {
                    None
                } else {
                    Some(version.pre.to_string())
                },
            },
            Err(e) => VersionValidationResult {
                is_valid: false,
                error: Some(e.to_string()),
                prerelease: None,
            },
        }
    }
}
