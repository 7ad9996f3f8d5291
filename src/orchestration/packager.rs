//! Build, pack and push
//!
//! Runs only once the feed has been found not to contain the version. Stale package files
//! are always removed first; without a push key the step stops right after that.

use crate::core::error::PublishError;
use crate::core::outputs::ActionOutputs;
use crate::orchestration::artifacts::{ArtifactSet, remove_stale_packages};
use crate::registry::RegistryTarget;
use crate::security::command_executor::command_line;
use crate::security::{CommandRunner, FailureDetection, SecureTokenManager};
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};

/// Everything the pack/push step needs
#[derive(Debug)]
pub struct PackRequest<'a> {
    pub project_file: &'a Path,
    pub version: &'a str,
    pub include_symbols: bool,
    pub no_build: bool,
    pub target: &'a RegistryTarget,
    pub failure_detection: FailureDetection,
}

/// Result of the pack/push step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome {
    /// No push key; nothing was built or pushed
    SkippedNoKey,
    /// Packages pushed (or already there, `--skip-duplicate`)
    Pushed { package: String, symbols: Option<String> },
}

/// Runs `dotnet build` / `pack` / `nuget push` in a working directory
pub struct Packager<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    work_dir: PathBuf,
    tokens: SecureTokenManager,
}

impl<'a, R: CommandRunner + ?Sized> Packager<'a, R> {
    pub fn new(runner: &'a R, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            work_dir: work_dir.into(),
            tokens: SecureTokenManager::new(),
        }
    }

    /// Secrets to mask in the echoed push output
    pub fn with_tokens(mut self, tokens: SecureTokenManager) -> Self {
        self.tokens = tokens;
        self
    }

    pub async fn publish(
        &self,
        request: &PackRequest<'_>,
        outputs: &mut ActionOutputs,
    ) -> Result<PackOutcome, PublishError> {
        let removed = remove_stale_packages(&self.work_dir)?;
        tracing::debug!(removed, "stale packages removed");

        let Some(push_key) = request.target.push_key.as_ref() else {
            println!("##[warning]😢 NUGET_KEY not given");
            return Ok(PackOutcome::SkippedNoKey);
        };

        println!("NuGet Source: {}", request.target.source);

        let project = request.project_file.to_string_lossy().to_string();
        let version_property = format!("-p:PackageVersion={}", request.version);

        if !request.no_build {
            let args = strings(&[
                "build",
                "-c",
                "Release",
                version_property.as_str(),
                project.as_str(),
            ]);
            self.run_inherited(&args, request.failure_detection).await?;
        }

        let mut pack_args = strings(&["pack"]);
        if request.include_symbols {
            pack_args.extend(strings(&["--include-symbols", "-p:SymbolPackageFormat=snupkg"]));
        }
        pack_args.extend(strings(&[
            version_property.as_str(),
            "-c",
            "Release",
            project.as_str(),
            "-o",
            ".",
        ]));
        self.run_inherited(&pack_args, request.failure_detection).await?;

        let artifacts = ArtifactSet::scan(&self.work_dir)?;
        println!("Generated Package(s): {}", artifacts.names().join(", "));

        let push_source = request.target.push_index_url();
        let mut push_args = strings(&[
            "nuget",
            "push",
            "*.nupkg",
            "-s",
            push_source.as_str(),
            "-k",
            push_key.expose_secret(),
            "--skip-duplicate",
        ]);
        if !request.include_symbols {
            push_args.push("-n".to_string());
        }

        let output = self.runner.capture("dotnet", &push_args).await?;
        println!("{}", self.tokens.mask_tokens_in_string(&output.stdout));
        request
            .failure_detection
            .check("dotnet nuget push", &output, true)
            .map_err(|e| e.masked(&self.tokens))?;

        let package = artifacts
            .primary()
            .ok_or_else(|| PublishError::ToolchainError {
                command: "dotnet pack".to_string(),
                message: "dotnet pack did not produce a .nupkg file".to_string(),
            })?;
        outputs.set("PACKAGE_NAME", &package.file_name);
        outputs.set("PACKAGE_PATH", package.path.to_string_lossy());

        let symbols = artifacts.symbols();
        if let Some(symbols) = &symbols {
            outputs.set("SYMBOLS_PACKAGE_NAME", &symbols.file_name);
            outputs.set("SYMBOLS_PACKAGE_PATH", symbols.path.to_string_lossy());
        }

        Ok(PackOutcome::Pushed {
            package: package.file_name,
            symbols: symbols.map(|s| s.file_name),
        })
    }

    async fn run_inherited(
        &self,
        args: &[String],
        detection: FailureDetection,
    ) -> Result<(), PublishError> {
        let output = self.runner.inherit("dotnet", args).await?;
        detection.check(&command_line("dotnet", args), &output, false)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
