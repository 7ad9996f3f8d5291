//! publish-nuget CLI
//!
//! Publishes a NuGet package when its version is not on the feed yet. Configured through
//! environment variables (GitHub Action inputs).

use anyhow::{Context, Result};
use clap::Parser;
use publish_nuget::{
    ActionConfig, ActionOutputs, NuGetAction, PublishError, RunOutcome, SafeCommandExecutor,
    SecureTokenManager,
};
use std::path::PathBuf;
use std::process;

/// Publish a NuGet package on version change
#[derive(Parser)]
#[command(name = "publish-nuget")]
#[command(version)]
#[command(about = "Publish a NuGet package on version change", long_about = None)]
struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', long, value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// File step outputs are appended to
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
    output_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    publish_nuget::init_logging();

    match run(Cli::parse()).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            println!("##[error]😭 {:#}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    if let Some(dir) = &cli.working_dir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("cannot change into {}", dir.display()))?;
    }

    let outputs = ActionOutputs::new(cli.output_file.filter(|p| !p.as_os_str().is_empty()));

    match publish(outputs).await {
        Ok(outcome) => {
            report(&outcome);
            Ok(0)
        }
        Err(e) => {
            println!("##[error]😭 {}", e);
            for action in e.suggested_actions() {
                eprintln!("  - {}", action);
            }
            tracing::debug!(code = e.code(), error = ?e, "publish failed");
            Ok(1)
        }
    }
}

async fn publish(outputs: ActionOutputs) -> Result<RunOutcome, PublishError> {
    let config = ActionConfig::from_env()?;

    let mut tokens = SecureTokenManager::new();
    for secret in [config.nuget_key.as_ref(), config.github.token.as_ref()]
        .into_iter()
        .flatten()
    {
        tokens.register(secret);
    }

    let work_dir = std::env::current_dir()?;
    let executor = SafeCommandExecutor::new(&work_dir)?.with_tokens(tokens.clone());

    NuGetAction::new(&config, &executor, work_dir)
        .with_tokens(tokens)
        .execute(outputs)
        .await
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::AlreadyPublished {
            package_name,
            version,
        } => println!("✅ {} {} is already published", package_name, version),
        RunOutcome::SkippedNoKey {
            package_name,
            version,
        } => println!("⚠️  {} {} was not published", package_name, version),
        RunOutcome::Published {
            package_name,
            version,
            tag,
            ..
        } => {
            println!("✅ published {} {}", package_name, version);
            if let Some(tag) = tag {
                println!("🏷️  tagged {}", tag);
            }
        }
    }
}
