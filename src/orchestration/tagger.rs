//! Commit tagging after a successful push

use crate::core::error::PublishError;
use crate::core::outputs::ActionOutputs;
use crate::security::command_executor::command_line;
use crate::security::{CommandRunner, FailureDetection};

/// Tag name from `template`, replacing the first `*` with `version`
///
/// # Examples
///
/// ```
/// use publish_nuget::orchestration::tagger::tag_name;
///
/// assert_eq!(tag_name("v*", "2.3.0"), "v2.3.0");
/// assert_eq!(tag_name("release-*-*", "1.0"), "release-1.0-*");
/// ```
pub fn tag_name(template: &str, version: &str) -> String {
    template.replacen('*', version, 1)
}

/// Creates `tag` locally and pushes it to `origin`, recording the `VERSION` output
pub async fn tag_commit<R: CommandRunner + ?Sized>(
    runner: &R,
    detection: FailureDetection,
    template: &str,
    version: &str,
    outputs: &mut ActionOutputs,
) -> Result<String, PublishError> {
    let tag = tag_name(template, version);
    println!("✨ creating new tag {}", tag);

    for args in [
        vec!["tag".to_string(), tag.clone()],
        vec!["push".to_string(), "origin".to_string(), tag.clone()],
    ] {
        let output = runner.inherit("git", &args).await?;
        detection.check(&command_line("git", &args), &output, false)?;
    }

    outputs.set("VERSION", &tag);
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    #[test]
    fn test_tag_name_replaces_first_placeholder() {
        assert_eq!(tag_name("v*", "2.3.0"), "v2.3.0");
        assert_eq!(tag_name("*", "1.0.0"), "1.0.0");
        assert_eq!(tag_name("v*-*", "1.0.0"), "v1.0.0-*");
        assert_eq!(tag_name("latest", "1.0.0"), "latest");
    }

    #[tokio::test]
    async fn test_tag_commit_runs_git_and_sets_output() {
        let runner = FakeRunner::new();
        let mut outputs = ActionOutputs::new(None);

        let tag = tag_commit(
            &runner,
            FailureDetection::ExitStatus,
            "v*",
            "2.3.0",
            &mut outputs,
        )
        .await
        .unwrap();

        assert_eq!(tag, "v2.3.0");
        assert_eq!(
            runner.calls(),
            vec!["git tag v2.3.0", "git push origin v2.3.0"]
        );
        assert_eq!(outputs.lines(), &["VERSION=v2.3.0".to_string()]);
    }

    #[tokio::test]
    async fn test_existing_tag_fails_with_exit_status_detection() {
        let runner = FakeRunner::new().respond("git tag", 128, "");
        let mut outputs = ActionOutputs::new(None);

        let err = tag_commit(
            &runner,
            FailureDetection::ExitStatus,
            "v*",
            "2.3.0",
            &mut outputs,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PublishError::ToolchainError { .. }));
        assert_eq!(runner.calls(), vec!["git tag v2.3.0"]);
        assert!(outputs.lines().is_empty());
    }

    #[tokio::test]
    async fn test_exit_status_ignored_with_output_pattern_detection() {
        let runner = FakeRunner::new().respond("git tag", 128, "");
        let mut outputs = ActionOutputs::new(None);

        tag_commit(
            &runner,
            FailureDetection::OutputPattern,
            "v*",
            "2.3.0",
            &mut outputs,
        )
        .await
        .unwrap();

        assert_eq!(runner.calls().len(), 2);
    }
}
