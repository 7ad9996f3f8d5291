//! NuGetAction - main orchestrator for a publish run
//!
//! Resolve the version, set up the feed, ask the feed whether the version exists and,
//! if it does not, pack/push/tag. Every stage returns `PublishError` on failure and
//! nothing is retried. [`NuGetAction::execute`] writes the recorded outputs once `run`
//! returns, whichever way it returns.

use crate::core::config::ActionConfig;
use crate::core::error::PublishError;
use crate::core::outputs::ActionOutputs;
use crate::orchestration::packager::{PackOutcome, PackRequest, Packager};
use crate::orchestration::tagger::tag_commit;
use crate::registry::{FlatContainerClient, RegistryTarget, configure_github_source};
use crate::security::{CommandRunner, SecureTokenManager};
use crate::validation::resolve_version;
use std::path::{Path, PathBuf};

/// How a run ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The feed already has this version; nothing was done
    AlreadyPublished { package_name: String, version: String },
    /// New version, but no push key was configured
    SkippedNoKey { package_name: String, version: String },
    /// New version pushed, and tagged when enabled
    Published {
        package_name: String,
        version: String,
        package: String,
        symbols: Option<String>,
        tag: Option<String>,
    },
}

/// Package id from the project file name, dropping the last `.` segment
///
/// # Examples
///
/// ```
/// use publish_nuget::orchestration::action::derive_package_name;
/// use std::path::Path;
///
/// assert_eq!(
///     derive_package_name(Path::new("src/My.Package.Name.csproj")).as_deref(),
///     Some("My.Package.Name")
/// );
/// ```
pub fn derive_package_name(project_file: &Path) -> Option<String> {
    let file_name = project_file.file_name()?.to_string_lossy();
    let segments: Vec<&str> = file_name.split('.').collect();
    let name = segments[..segments.len() - 1].join(".");

    if name.is_empty() { None } else { Some(name) }
}

/// Publish pipeline bound to a configuration and a command runner
pub struct NuGetAction<'a, R: CommandRunner + ?Sized> {
    config: &'a ActionConfig,
    runner: &'a R,
    registry: FlatContainerClient,
    work_dir: PathBuf,
    tokens: SecureTokenManager,
}

impl<'a, R: CommandRunner + ?Sized> NuGetAction<'a, R> {
    pub fn new(config: &'a ActionConfig, runner: &'a R, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            runner,
            registry: FlatContainerClient::new(),
            work_dir: work_dir.into(),
            tokens: SecureTokenManager::new(),
        }
    }

    pub fn with_tokens(mut self, tokens: SecureTokenManager) -> Self {
        self.tokens = tokens;
        self
    }

    /// Package id this run publishes
    pub fn package_name(&self) -> Result<String, PublishError> {
        if let Some(name) = &self.config.package_name {
            return Ok(name.clone());
        }

        self.config
            .project_file
            .as_deref()
            .and_then(derive_package_name)
            .ok_or_else(|| {
                PublishError::config("unable to derive a package name from the project file")
            })
    }

    /// Runs the pipeline, then flushes whatever outputs were recorded, also on failure
    ///
    /// A run error takes precedence over a flush error.
    pub async fn execute(&self, mut outputs: ActionOutputs) -> Result<RunOutcome, PublishError> {
        let result = self.run(&mut outputs).await;
        let flushed = outputs.flush();

        match (result, flushed) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(flush_error)) => {
                tracing::warn!(error = %flush_error, "failed to write step outputs");
                Err(e)
            }
        }
    }

    pub async fn run(&self, outputs: &mut ActionOutputs) -> Result<RunOutcome, PublishError> {
        let version = resolve_version(self.config).await?;

        let target = configure_github_source(
            self.config,
            self.runner,
            &self.tokens,
            RegistryTarget::from_config(self.config),
        )
        .await?;

        let package_name = self.package_name()?;
        println!("Package Name: {}", package_name);

        let lookup = self.registry.lookup(&target.source, &package_name).await?;
        if !lookup.is_new_version(&version) {
            tracing::info!(%package_name, %version, "version already published");
            return Ok(RunOutcome::AlreadyPublished {
                package_name,
                version,
            });
        }

        println!("✨ found new version ({}) of {}", version, package_name);

        let project_file = self
            .config
            .project_file
            .as_deref()
            .ok_or_else(|| PublishError::not_found("project file not found"))?;

        let request = PackRequest {
            project_file,
            version: &version,
            include_symbols: self.config.include_symbols,
            no_build: self.config.no_build,
            target: &target,
            failure_detection: self.config.failure_detection,
        };

        let outcome = Packager::new(self.runner, &self.work_dir)
            .with_tokens(self.tokens.clone())
            .publish(&request, outputs)
            .await?;

        let (package, symbols) = match outcome {
            PackOutcome::SkippedNoKey => {
                return Ok(RunOutcome::SkippedNoKey {
                    package_name,
                    version,
                });
            }
            PackOutcome::Pushed { package, symbols } => (package, symbols),
        };

        let tag = match (self.config.tag_commit, self.config.tag_format.as_deref()) {
            (true, Some(template)) => Some(
                tag_commit(
                    self.runner,
                    self.config.failure_detection,
                    template,
                    &version,
                    outputs,
                )
                .await?,
            ),
            (true, None) => {
                return Err(PublishError::config(
                    "TAG_FORMAT is required when TAG_COMMIT is enabled",
                ));
            }
            (false, _) => None,
        };

        Ok(RunOutcome::Published {
            package_name,
            version,
            package,
            symbols,
            tag,
        })
    }
}
