pub mod config;
pub mod config_loader;
pub mod error;
pub mod outputs;

pub use config::*;
pub use config_loader::compile_version_regex;
pub use error::*;
pub use outputs::ActionOutputs;
