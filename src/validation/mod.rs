pub mod version_resolver;
pub mod version_validator;

pub use version_resolver::{extract_version, resolve_version};
pub use version_validator::{VersionValidationResult, VersionValidator};
