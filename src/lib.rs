pub mod core;
pub mod orchestration;
pub mod registry;
pub mod security;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::core::*;
pub use orchestration::{NuGetAction, RunOutcome};
pub use security::{
    CommandError, CommandRunner, FailureDetection, SafeCommandExecutor, SecureTokenManager,
};

/// Initialize diagnostic logging (stderr, `RUST_LOG` aware)
pub fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "publish_nuget=warn".into());

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
