//! Fetching third-party resources from the network or a local mirror
//!
//! Remote is the normal mode. Pointing `SITEBUILD_RESOURCE_MIRROR` at a
//! directory switches to a local mirror where each resource is looked up by
//! its name, for offline builds and tests.

use super::manifest::ResourceSpec;
use crate::error::BuildError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use url::Url;

/// Environment variable selecting a local resource mirror
pub const MIRROR_ENV: &str = "SITEBUILD_RESOURCE_MIRROR";

/// Index of vendor imports written next to the vendor directory
pub const VENDOR_INDEX: &str = "_resources.scss";

/// Resource source - either the resource's own URL or a local mirror directory
#[derive(Debug, Clone)]
pub enum ResourceSource {
    Remote,
    Local(PathBuf),
}

impl ResourceSource {
    /// Remote unless the mirror environment variable is set
    pub fn from_env() -> Self {
        match std::env::var_os(MIRROR_ENV) {
            Some(dir) if !dir.is_empty() => Self::Local(PathBuf::from(dir)),
            _ => Self::Remote,
        }
    }
}

/// A resource that could not be populated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub name: String,
    pub message: String,
}

/// Outcome of populating a list of resources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub fetched: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<FetchFailure>,
}

/// Resource fetcher - handles retrieving files from remote URLs or a mirror
pub struct ResourceFetcher {
    source: ResourceSource,
    client: reqwest::Client,
}

impl ResourceFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: ResourceSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a fetcher honouring the mirror environment variable
    pub fn from_env(user_agent: &str) -> Self {
        Self::new(ResourceSource::from_env(), user_agent)
    }

    /// Fetch one resource's bytes
    pub async fn fetch(&self, resource: &ResourceSpec) -> Result<Vec<u8>> {
        match &self.source {
            ResourceSource::Remote => {
                let url = Url::parse(&resource.url)
                    .with_context(|| format!("Invalid resource URL: {}", resource.url))?;
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch {}", url))?;

                if !response.status().is_success() {
                    anyhow::bail!("Failed to fetch {}: HTTP {}", url, response.status());
                }

                Ok(response.bytes().await?.to_vec())
            }
            ResourceSource::Local(dir) => {
                let path = dir.join(&resource.name);
                fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read mirrored {}", path.display()))
            }
        }
    }

    /// Fetch every resource into `target_dir`
    ///
    /// Optional failures are reported in the returned [`FetchReport`]; a
    /// failed required resource aborts with [`BuildError::RequiredResource`].
    /// With `reuse`, resources already present are not fetched again.
    pub async fn populate(
        &self,
        resources: &[ResourceSpec],
        target_dir: &Path,
        reuse: bool,
    ) -> Result<FetchReport> {
        let mut report = FetchReport::default();

        for resource in resources {
            let target = target_dir.join(resource.destination());
            if reuse && target.is_file() {
                debug!(resource = %resource.name, "already present, not fetching");
                report.skipped.push(resource.name.clone());
                continue;
            }

            match self.fetch(resource).await {
                Ok(bytes) => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).await.with_context(|| {
                            format!("Failed to create directory: {}", parent.display())
                        })?;
                    }
                    fs::write(&target, &bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                    debug!(resource = %resource.name, bytes = bytes.len(), "populated");
                    report.fetched.push(resource.name.clone());
                }
                Err(e) if resource.required => {
                    return Err(BuildError::RequiredResource {
                        name: resource.name.clone(),
                        detail: format!("{:#}", e),
                    }
                    .into());
                }
                Err(e) => {
                    let message = if target.is_file() {
                        "Unable to update resource"
                    } else {
                        "Could not populate resource"
                    };
                    warn!(resource = %resource.name, url = %resource.url, error = %e, "{}", message);
                    report.failed.push(FetchFailure {
                        name: resource.name.clone(),
                        message: format!("{}: {} ({:#})", message, resource.name, e),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Refresh vendor stylesheet libraries and rewrite the import index
    ///
    /// The index at `<sass_dir>/_resources.scss` imports every vendor file;
    /// an import is commented out when its file could not be populated.
    pub async fn update_vendor(
        &self,
        resources: &[ResourceSpec],
        sass_dir: &Path,
        vendor_dir: &Path,
    ) -> Result<FetchReport> {
        let report = self.populate(resources, vendor_dir, false).await?;

        let vendor_rel = vendor_dir
            .strip_prefix(sass_dir)
            .unwrap_or(vendor_dir)
            .to_string_lossy()
            .replace('\\', "/");

        let mut index = String::new();
        for resource in resources {
            if !vendor_dir.join(resource.destination()).is_file() {
                index.push_str("//");
            }
            index.push_str(&format!(
                "@import \"{}/{}\";\n",
                vendor_rel,
                resource.destination()
            ));
        }

        let index_path = sass_dir.join(VENDOR_INDEX);
        fs::write(&index_path, index)
            .await
            .with_context(|| format!("Failed to write {}", index_path.display()))?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mirror_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn spec(name: &str) -> ResourceSpec {
        ResourceSpec::new(name, &format!("https://example.invalid/{}", name))
    }

    #[tokio::test]
    async fn test_populate_from_mirror() {
        let mirror = mirror_with(&[("bottle.py", "# bottle")]);
        let out = TempDir::new().unwrap();
        let fetcher =
            ResourceFetcher::new(ResourceSource::Local(mirror.path().to_path_buf()), "test");

        let report = fetcher
            .populate(&[spec("bottle.py").required()], out.path(), false)
            .await
            .unwrap();

        assert_eq!(report.fetched, vec!["bottle.py"]);
        assert_eq!(
            std::fs::read_to_string(out.path().join("bottle.py")).unwrap(),
            "# bottle"
        );
    }

    #[tokio::test]
    async fn test_optional_failure_is_reported_not_raised() {
        let mirror = mirror_with(&[]);
        let out = TempDir::new().unwrap();
        let fetcher =
            ResourceFetcher::new(ResourceSource::Local(mirror.path().to_path_buf()), "test");

        let report = fetcher
            .populate(&[spec("extra.js")], out.path(), false)
            .await
            .unwrap();

        assert!(report.fetched.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].message.starts_with("Could not populate resource"));
    }

    #[tokio::test]
    async fn test_required_failure_aborts() {
        let mirror = mirror_with(&[]);
        let out = TempDir::new().unwrap();
        let fetcher =
            ResourceFetcher::new(ResourceSource::Local(mirror.path().to_path_buf()), "test");

        let err = fetcher
            .populate(&[spec("bottle.py").required()], out.path(), false)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::RequiredResource { .. })
        ));
    }

    #[tokio::test]
    async fn test_reuse_skips_present_resources() {
        let mirror = mirror_with(&[("bottle.py", "new")]);
        let out = TempDir::new().unwrap();
        std::fs::write(out.path().join("bottle.py"), "old").unwrap();
        let fetcher =
            ResourceFetcher::new(ResourceSource::Local(mirror.path().to_path_buf()), "test");

        let report = fetcher
            .populate(&[spec("bottle.py")], out.path(), true)
            .await
            .unwrap();

        assert_eq!(report.skipped, vec!["bottle.py"]);
        assert_eq!(std::fs::read_to_string(out.path().join("bottle.py")).unwrap(), "old");
    }

    #[tokio::test]
    async fn test_failed_update_of_existing_file_is_distinguished() {
        let mirror = mirror_with(&[]);
        let out = TempDir::new().unwrap();
        std::fs::write(out.path().join("lib.scss"), "old").unwrap();
        let fetcher =
            ResourceFetcher::new(ResourceSource::Local(mirror.path().to_path_buf()), "test");

        let report = fetcher
            .populate(&[spec("lib.scss")], out.path(), false)
            .await
            .unwrap();

        assert!(report.failed[0].message.starts_with("Unable to update resource"));
    }

    #[tokio::test]
    async fn test_vendor_index_comments_out_missing() {
        let mirror = mirror_with(&[("_a_mixins.scss", "@mixin a {}")]);
        let sass = TempDir::new().unwrap();
        let vendor = sass.path().join("vendor");
        let fetcher =
            ResourceFetcher::new(ResourceSource::Local(mirror.path().to_path_buf()), "test");

        fetcher
            .update_vendor(
                &[spec("_a_mixins.scss"), spec("_b_mixins.scss")],
                sass.path(),
                &vendor,
            )
            .await
            .unwrap();

        let index = std::fs::read_to_string(sass.path().join(VENDOR_INDEX)).unwrap();
        assert_eq!(
            index,
            "@import \"vendor/_a_mixins.scss\";\n//@import \"vendor/_b_mixins.scss\";\n"
        );
    }

    #[test]
    fn test_invalid_remote_url_is_an_error() {
        let fetcher = ResourceFetcher::new(ResourceSource::Remote, "test");
        let resource = ResourceSpec::new("x", "not a url");
        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt.block_on(fetcher.fetch(&resource)).unwrap_err();
        assert!(err.to_string().contains("Invalid resource URL"));
    }
}
