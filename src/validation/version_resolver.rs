//! Version Resolver - decides which version is being published
//!
//! The version comes either from `VERSION_STATIC` or from the first capture group of
//! `VERSION_REGEX` applied to the version file.

use crate::core::config::ActionConfig;
use crate::core::error::PublishError;
use crate::validation::version_validator::VersionValidator;
use std::path::Path;
use tokio::fs;

/// Resolves the version for this run
///
/// The project file must exist; this is checked before anything else, even when a static
/// version is configured.
pub async fn resolve_version(config: &ActionConfig) -> Result<String, PublishError> {
    let project_file = config
        .project_file
        .as_deref()
        .ok_or_else(|| PublishError::not_found("project file not found"))?;
    if fs::metadata(project_file).await.is_err() {
        return Err(PublishError::not_found("project file not found"));
    }

    println!("Project Filepath: {}", project_file.display());

    let version = match config.version_static.as_deref() {
        Some(version) => version.to_string(),
        None => extract_from_file(config, project_file).await?,
    };

    println!("Version: {}", version);

    let check = VersionValidator::new().validate(&version);
    if !check.is_valid {
        println!(
            "##[warning]version {} is not SemVer 2.0.0 ({})",
            version,
            check.error.unwrap_or_default()
        );
    }

    Ok(version)
}

async fn extract_from_file(
    config: &ActionConfig,
    project_file: &Path,
) -> Result<String, PublishError> {
    let version_file = config.version_file().unwrap_or(project_file);

    if version_file != project_file && fs::metadata(version_file).await.is_err() {
        return Err(PublishError::not_found("version file not found"));
    }

    let regex = config.version_regex.as_ref().ok_or_else(|| {
        PublishError::config("VERSION_REGEX is required when VERSION_STATIC is not set")
    })?;

    println!("Version Filepath: {}", version_file.display());
    println!("Version Regex: {}", regex.as_str());

    let content = fs::read_to_string(version_file).await.map_err(|e| {
        PublishError::ExtractionError {
            message: format!(
                "unable to read version file {}: {}",
                version_file.display(),
                e
            ),
        }
    })?;

    extract_version(regex, &content)
}

/// First capture group of `regex` in `content`
pub fn extract_version(regex: &regex::Regex, content: &str) -> Result<String, PublishError> {
    regex
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|version| !version.is_empty())
        .ok_or_else(|| PublishError::ExtractionError {
            message: "unable to extract version info!".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config_loader::compile_version_regex;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Version>1.4.2</Version>
  </PropertyGroup>
</Project>
"#;

    const VERSION_PATTERN: &str = r"^\s*<Version>(.*)<\/Version>\s*$";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config_for(project_file: PathBuf) -> ActionConfig {
        ActionConfig {
            project_file: Some(project_file),
            version_regex: Some(compile_version_regex(VERSION_PATTERN).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_version_from_project_file() {
        let temp_dir = TempDir::new().unwrap();
        let project = write(&temp_dir, "Foo.Bar.csproj", CSPROJ);

        let version = resolve_version(&config_for(project)).await.unwrap();
        assert_eq!(version, "1.4.2");
    }

    #[tokio::test]
    async fn test_version_from_separate_file() {
        let temp_dir = TempDir::new().unwrap();
        let project = write(&temp_dir, "Foo.csproj", "<Project />");
        let props = write(&temp_dir, "Directory.Build.props", CSPROJ);

        let mut config = config_for(project);
        config.version_file = Some(props);

        assert_eq!(resolve_version(&config).await.unwrap(), "1.4.2");
    }

    #[tokio::test]
    async fn test_missing_project_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path().join("Missing.csproj"));

        let err = resolve_version(&config).await.unwrap_err();
        assert!(matches!(err, PublishError::NotFound { .. }));
        assert_eq!(err.to_string(), "project file not found");
    }

    #[tokio::test]
    async fn test_unset_project_file() {
        let err = resolve_version(&ActionConfig::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "project file not found");
    }

    #[tokio::test]
    async fn test_missing_project_file_checked_before_static_version() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_for(temp_dir.path().join("Missing.csproj"));
        config.version_static = Some("9.9.9".to_string());

        assert!(matches!(
            resolve_version(&config).await,
            Err(PublishError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_version_file() {
        let temp_dir = TempDir::new().unwrap();
        let project = write(&temp_dir, "Foo.csproj", CSPROJ);
        let mut config = config_for(project);
        config.version_file = Some(temp_dir.path().join("version.props"));

        let err = resolve_version(&config).await.unwrap_err();
        assert_eq!(err.to_string(), "version file not found");
    }

    #[tokio::test]
    async fn test_static_version_never_reads_version_file() {
        let temp_dir = TempDir::new().unwrap();
        let project = write(&temp_dir, "Foo.csproj", "<Project />");
        let mut config = config_for(project);
        config.version_file = Some(temp_dir.path().join("does-not-exist.props"));
        config.version_static = Some("3.0.0-rc.1".to_string());
        config.version_regex = None;

        assert_eq!(resolve_version(&config).await.unwrap(), "3.0.0-rc.1");
    }

    #[tokio::test]
    async fn test_no_match_is_extraction_error() {
        let temp_dir = TempDir::new().unwrap();
        let project = write(&temp_dir, "Foo.csproj", "<Project />");

        let err = resolve_version(&config_for(project)).await.unwrap_err();
        assert!(matches!(err, PublishError::ExtractionError { .. }));
    }

    #[tokio::test]
    async fn test_version_from_crlf_file() {
        let temp_dir = TempDir::new().unwrap();
        let project = write(&temp_dir, "Foo.csproj", "<Project />");
        let version_file = write(&temp_dir, "version.txt", "name=foo\r\nversion=1.4.2\r\n");
        let mut config = config_for(project);
        config.version_file = Some(version_file);
        config.version_regex = Some(compile_version_regex(r"^version=(.*)$").unwrap());

        assert_eq!(resolve_version(&config).await.unwrap(), "1.4.2");
    }

    #[tokio::test]
    async fn test_unreadable_version_file_is_extraction_error() {
        let temp_dir = TempDir::new().unwrap();
        let project = write(&temp_dir, "Foo.csproj", "<Project />");
        let props = temp_dir.path().join("version.props");
        std::fs::write(&props, [0x3c, 0xff, 0xfe, 0x3e]).unwrap();
        let mut config = config_for(project);
        config.version_file = Some(props);

        let err = resolve_version(&config).await.unwrap_err();
        assert!(matches!(err, PublishError::ExtractionError { .. }));
        assert!(err.to_string().contains("unable to read version file"));
    }

    #[test]
    fn test_extract_version_uses_first_group() {
        let regex = compile_version_regex(r"version = '(\d+\.\d+\.\d+)(-\w+)?'").unwrap();
        let content = "name = 'x'\nversion = '2.0.1-beta'\n";

        assert_eq!(extract_version(&regex, content).unwrap(), "2.0.1");
    }

    #[test]
    fn test_extract_version_takes_first_match() {
        let regex = compile_version_regex(r"^<Version>(.*)</Version>$").unwrap();
        let content = "<Version>1.0.0</Version>\n<Version>2.0.0</Version>";

        assert_eq!(extract_version(&regex, content).unwrap(), "1.0.0");
    }

    #[test]
    fn test_extract_version_rejects_empty_group() {
        let regex = compile_version_regex(r"<Version>(.*)</Version>").unwrap();

        assert!(matches!(
            extract_version(&regex, "<Version></Version>"),
            Err(PublishError::ExtractionError { .. })
        ));
    }
}
