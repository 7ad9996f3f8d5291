pub mod flat_container;
pub mod github_source;

pub use flat_container::{FlatContainerClient, PackageIndex, RegistryLookup, index_url};
pub use github_source::{RegistryTarget, configure_github_source};
