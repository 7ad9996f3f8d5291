//! Orchestration layer for NuGet publishing
//!
//! The pipeline itself (`action`) and the stages it drives after the registry check.

pub mod action;
pub mod artifacts;
pub mod packager;
pub mod tagger;

pub use action::{NuGetAction, RunOutcome, derive_package_name};
pub use artifacts::{Artifact, ArtifactSet};
pub use packager::{PackOutcome, PackRequest, Packager};
pub use tagger::{tag_commit, tag_name};
