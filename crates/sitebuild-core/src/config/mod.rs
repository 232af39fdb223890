//! Project configuration and per-run build options
//!
//! Configuration is an explicit value handed to each component. It comes
//! from an optional `sitebuild.yaml` in the project root; every field has
//! a default so a missing or partial file is fine.

pub mod generator;
pub mod version;

use crate::error::{BuildError, IoResultExt, Result};
use crate::resources::manifest::{default_site_resources, default_vendor_resources, ResourceSpec};
use crate::templates::BannerWidths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "sitebuild.yaml";

/// Directory name of the generated site under the output root
pub const SITE_DIR: &str = "www";

/// Source locations, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLayout {
    pub views: PathBuf,
    pub api_routes: PathBuf,
    pub sass: PathBuf,
    pub scripts: PathBuf,
    pub static_files: PathBuf,
    pub images: PathBuf,
    pub fonts: PathBuf,
    pub favicon: PathBuf,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            views: PathBuf::from("dev/views"),
            api_routes: PathBuf::from("dev/py/routes.py"),
            sass: PathBuf::from("dev/sass"),
            scripts: PathBuf::from("dev/js"),
            static_files: PathBuf::from("res/static"),
            images: PathBuf::from("res/img"),
            fonts: PathBuf::from("res/font"),
            favicon: PathBuf::from("res/favicon.svg"),
        }
    }
}

/// How stylesheet routes are declared in the server entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylesheetRoutes {
    /// One static route per compiled stylesheet
    #[default]
    PerFile,
    /// A single wildcard route serving every `.css` file
    Wildcard,
}

/// Contents of `sitebuild.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, used in generated doc strings
    pub name: String,

    /// Minimum sitebuild version this project expects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,

    pub layout: SiteLayout,

    pub banner: BannerWidths,

    pub stylesheet_routes: StylesheetRoutes,

    /// Upper bound on waiting for the stylesheet watcher's first outputs
    pub watch_timeout_secs: u64,

    /// Files fetched into the generated site
    pub resources: Vec<ResourceSpec>,

    /// Stylesheet libraries fetched into the vendor directory
    pub vendor_resources: Vec<ResourceSpec>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "untitled".to_string(),
            requires: None,
            layout: SiteLayout::default(),
            banner: BannerWidths::default(),
            stylesheet_routes: StylesheetRoutes::default(),
            watch_timeout_secs: 3,
            resources: default_site_resources(),
            vendor_resources: default_vendor_resources(),
        }
    }
}

impl ProjectConfig {
    /// Load `sitebuild.yaml` from a project root, falling back to defaults
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.is_file() {
            let name = project_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "untitled".to_string());
            return Ok(Self {
                name,
                ..Self::default()
            });
        }
        let content = std::fs::read_to_string(&path).at(&path)?;
        Self::parse(&content, &path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| BuildError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn watch_timeout(&self) -> Duration {
        Duration::from_secs(self.watch_timeout_secs)
    }

    /// Serialize for writing a fresh project's config file
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|source| BuildError::Config {
            path: PathBuf::from(CONFIG_FILE),
            source,
        })
    }
}

/// Options for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Project source root (holds `dev/` and `res/`)
    pub project_root: PathBuf,
    /// Directory that receives the `www` site tree
    pub output_root: PathBuf,
    /// Compressed assets and a zip package instead of live tooling
    pub deploy: bool,
    /// Keep an existing site tree and skip work already done
    pub reuse: bool,
    /// Launch the generated server after a development build
    pub serve: bool,
    /// Do not fetch remote resources
    pub skip_fetch: bool,
}

impl BuildOptions {
    pub fn new(project_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            output_root: output_root.into(),
            deploy: false,
            reuse: false,
            serve: false,
            skip_fetch: false,
        }
    }

    /// Output root when none is given: cwd for deployment, temp dir otherwise
    pub fn default_output_root(deploy: bool) -> PathBuf {
        if deploy {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::temp_dir()
        }
    }

    /// Root of the generated site tree
    pub fn site_root(&self) -> PathBuf {
        self.output_root.join(SITE_DIR)
    }

    /// Absolute location of a project source path
    pub fn source(&self, relative: &Path) -> PathBuf {
        self.project_root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults_and_dir_name() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("my-site");
        std::fs::create_dir(&project).unwrap();

        let config = ProjectConfig::load(&project).unwrap();
        assert_eq!(config.name, "my-site");
        assert_eq!(config.layout, SiteLayout::default());
        assert_eq!(config.banner.code_width, 80);
        assert_eq!(config.stylesheet_routes, StylesheetRoutes::PerFile);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let yaml = "name: blog\nstylesheet_routes: wildcard\nbanner:\n  code_width: 100\n";
        let config = ProjectConfig::parse(yaml, Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.name, "blog");
        assert_eq!(config.stylesheet_routes, StylesheetRoutes::Wildcard);
        assert_eq!(config.banner.code_width, 100);
        assert_eq!(config.banner.markup_width, 120);
        assert_eq!(config.watch_timeout_secs, 3);
        assert!(!config.resources.is_empty());
    }

    #[test]
    fn test_invalid_config_is_reported_with_path() {
        let err = ProjectConfig::parse("watch_timeout_secs: soon", Path::new("x/sitebuild.yaml"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
        assert!(err.to_string().contains("x/sitebuild.yaml"));
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let config = ProjectConfig {
            name: "demo".to_string(),
            ..ProjectConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        let parsed = ProjectConfig::parse(&yaml, Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_site_root_is_www_under_output() {
        let options = BuildOptions::new("/src/project", "/tmp/out");
        assert_eq!(options.site_root(), PathBuf::from("/tmp/out/www"));
        assert_eq!(
            options.source(Path::new("dev/views")),
            PathBuf::from("/src/project/dev/views")
        );
    }
}
