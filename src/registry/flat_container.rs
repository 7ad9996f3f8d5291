//! Flat-container client - asks the feed which versions of a package exist
//!
//! NuGet v3 feeds expose `GET {base}/v3-flatcontainer/{id-lowercase}/index.json`, returning
//! `{"versions": [...]}`, or 404 for a package id that was never pushed.

use crate::core::error::PublishError;
use reqwest::StatusCode;
use serde::Deserialize;

const USER_AGENT: &str = concat!("publish-nuget/", env!("CARGO_PKG_VERSION"));

/// Flat-container `index.json` document
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PackageIndex {
    pub versions: Vec<String>,
}

/// What the feed knows about a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLookup {
    /// 404: the package id was never published
    PackageNotFound,
    /// 200: published versions, in feed order
    Published(PackageIndex),
}

impl RegistryLookup {
    /// True when `version` still has to be pushed (exact string match)
    pub fn is_new_version(&self, version: &str) -> bool {
        match self {
            Self::PackageNotFound => true,
            Self::Published(index) => !index.versions.iter().any(|v| v == version),
        }
    }
}

/// `{base}/v3-flatcontainer/{name-lowercase}/index.json`
///
/// # Examples
///
/// ```
/// use publish_nuget::registry::index_url;
///
/// assert_eq!(
///     index_url("https://api.nuget.org/v3", "MyPkg"),
///     "https://api.nuget.org/v3/v3-flatcontainer/mypkg/index.json"
/// );
/// ```
pub fn index_url(base: &str, package_name: &str) -> String {
    format!(
        "{}/v3-flatcontainer/{}/index.json",
        base.trim_end_matches('/'),
        package_name.to_lowercase()
    )
}

/// HTTP client for the flat-container endpoint
#[derive(Debug, Clone)]
pub struct FlatContainerClient {
    client: reqwest::Client,
}

impl Default for FlatContainerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatContainerClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Fetch the published versions of `package_name` from the feed at `base`
    ///
    /// Statuses other than 200 and 404 are reported as `NetworkError`.
    pub async fn lookup(
        &self,
        base: &str,
        package_name: &str,
    ) -> Result<RegistryLookup, PublishError> {
        let url = index_url(base, package_name);
        println!("Getting versions from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PublishError::network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                println!("404 response, assuming new package");
                Ok(RegistryLookup::PackageNotFound)
            }
            StatusCode::OK => {
                let index = response
                    .json::<PackageIndex>()
                    .await
                    .map_err(|e| PublishError::network(format!("invalid index.json: {}", e)))?;
                println!("Versions retrieved: {}", index.versions.join(","));
                Ok(RegistryLookup::Published(index))
            }
            status => Err(PublishError::network(format!(
                "unexpected response {} from {}",
                status, url
            ))),
        }
    }
}
