//! GitHub Packages source registration
//!
//! When `USE_GITHUB_NUGET_REGISTRY` is on, the feed is switched to
//! `https://nuget.pkg.github.com/<namespace>` and registered with `dotnet nuget add source`
//! so that the following `push` can authenticate. This writes to the user's NuGet.Config.

use crate::core::config::ActionConfig;
use crate::core::error::PublishError;
use crate::security::{CommandRunner, SecureTokenManager};
use secrecy::{ExposeSecret, SecretString};

const GITHUB_NUGET_BASE: &str = "https://nuget.pkg.github.com";

/// Name the source is registered under
pub const GITHUB_SOURCE_NAME: &str = "github-nuget";

/// Feed the package is checked against and pushed to
#[derive(Debug, Clone, Default)]
pub struct RegistryTarget {
    /// Base URL, without `/v3/index.json`
    pub source: String,
    pub push_key: Option<SecretString>,
}

impl RegistryTarget {
    /// Target as configured, before any GitHub override
    pub fn from_config(config: &ActionConfig) -> Self {
        Self {
            source: config.nuget_source.clone().unwrap_or_default(),
            push_key: config.nuget_key.clone(),
        }
    }

    /// Service index `dotnet nuget push -s` points at
    pub fn push_index_url(&self) -> String {
        format!("{}/v3/index.json", self.source.trim_end_matches('/'))
    }
}

/// Registers the GitHub Packages feed when enabled, returning the effective target
pub async fn configure_github_source<R: CommandRunner + ?Sized>(
    config: &ActionConfig,
    runner: &R,
    tokens: &SecureTokenManager,
    mut target: RegistryTarget,
) -> Result<RegistryTarget, PublishError> {
    let github = &config.github;
    if !github.enabled {
        println!("GitHub NuGet registry is not enabled, skipping setup");
        return Ok(target);
    }

    let (Some(namespace), Some(username), Some(token)) = (
        github.namespace.as_deref(),
        github.username.as_deref(),
        github.token.as_ref(),
    ) else {
        return Err(PublishError::config(
            "GitHub NuGet registry is enabled but required parameters are missing",
        ));
    };

    target.source = format!("{}/{}", GITHUB_NUGET_BASE, namespace);
    target.push_key = Some(token.clone());

    let args: Vec<String> = vec![
        "nuget".into(),
        "add".into(),
        "source".into(),
        "--username".into(),
        username.to_string(),
        "--password".into(),
        token.expose_secret().to_string(),
        "--store-password-in-clear-text".into(),
        "--name".into(),
        GITHUB_SOURCE_NAME.into(),
        format!("{}/index.json", target.source),
    ];

    let output = runner.capture("dotnet", &args).await?;
    println!("{}", tokens.mask_tokens_in_string(&output.stdout));

    // the password is on the real command line, keep it out of the error
    let command = format!("dotnet nuget add source --name {}", GITHUB_SOURCE_NAME);
    config
        .failure_detection
        .check(&command, &output, true)
        .map_err(|e| e.masked(tokens))?;

    println!(
        "Added GitHub NuGet source: {} with username: {}",
        target.source, username
    );

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GithubRegistryConfig;
    use crate::security::FailureDetection;
    use crate::testing::FakeRunner;

    fn github_config(token: Option<&str>) -> ActionConfig {
        ActionConfig {
            nuget_source: Some("https://api.nuget.org".to_string()),
            nuget_key: Some(SecretString::new("configured-key".into())),
            github: GithubRegistryConfig {
                enabled: true,
                namespace: Some("octo-org".to_string()),
                username: Some("octocat".to_string()),
                token: token.map(|t| SecretString::new(t.into())),
            },
            ..Default::default()
        }
    }

    async fn configure(
        config: &ActionConfig,
        runner: &FakeRunner,
        tokens: &SecureTokenManager,
    ) -> Result<RegistryTarget, PublishError> {
        configure_github_source(config, runner, tokens, RegistryTarget::from_config(config)).await
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let config = ActionConfig {
            nuget_source: Some("https://api.nuget.org".to_string()),
            ..Default::default()
        };
        let runner = FakeRunner::new();
        let tokens = SecureTokenManager::new();

        let target = configure(&config, &runner, &tokens).await.unwrap();

        assert_eq!(target.source, "https://api.nuget.org");
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_parameters() {
        let config = github_config(None);
        let runner = FakeRunner::new();
        let tokens = SecureTokenManager::new();

        let err = configure(&config, &runner, &tokens).await.unwrap_err();

        assert!(matches!(err, PublishError::ConfigError { .. }));
        assert!(err.to_string().contains("required parameters are missing"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_registers_source_and_overrides_target() {
        let config = github_config(Some("ghp_token0123456789"));
        let runner = FakeRunner::new();
        let tokens = SecureTokenManager::new();

        let target = configure(&config, &runner, &tokens).await.unwrap();

        assert_eq!(target.source, "https://nuget.pkg.github.com/octo-org");
        assert_eq!(
            target.push_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("ghp_token0123456789".to_string())
        );
        assert_eq!(
            target.push_index_url(),
            "https://nuget.pkg.github.com/octo-org/v3/index.json"
        );
        assert_eq!(
            runner.calls(),
            vec![
                "dotnet nuget add source --username octocat --password ghp_token0123456789 \
                 --store-password-in-clear-text --name github-nuget \
                 https://nuget.pkg.github.com/octo-org/index.json"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_registration_is_toolchain_error() {
        let config = github_config(Some("ghp_token0123456789"));
        let runner = FakeRunner::new().respond("dotnet nuget add source", 1, "error: source exists");
        let tokens = SecureTokenManager::new();

        let err = configure(&config, &runner, &tokens).await.unwrap_err();

        assert!(matches!(err, PublishError::ToolchainError { .. }));
        assert_eq!(err.to_string(), "error: source exists");
    }

    #[tokio::test]
    async fn test_failed_registration_masks_token() {
        let config = github_config(Some("ghp_token0123456789"));
        let runner = FakeRunner::new().respond(
            "dotnet nuget add source",
            1,
            "error: bad credentials ghp_token0123456789 for octocat",
        );
        let mut tokens = SecureTokenManager::new();
        tokens.register(config.github.token.as_ref().unwrap());

        let err = configure(&config, &runner, &tokens).await.unwrap_err();

        assert!(!err.to_string().contains("ghp_token0123456789"));
        assert_eq!(err.to_string(), "error: bad credentials ghp...789 for octocat");
    }

    #[tokio::test]
    async fn test_output_pattern_detection_on_zero_exit() {
        let mut config = github_config(Some("ghp_token0123456789"));
        config.failure_detection = FailureDetection::OutputPattern;
        let runner = FakeRunner::new().respond("dotnet nuget add source", 0, "error: NU1301");
        let tokens = SecureTokenManager::new();

        assert!(configure(&config, &runner, &tokens).await.is_err());
    }
}
