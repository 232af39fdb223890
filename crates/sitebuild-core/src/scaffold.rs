//! New project skeletons
//!
//! Creates the source layout a build expects, seeded with a default head,
//! index page, stylesheet entry point and config file.

use crate::config::{ProjectConfig, SiteLayout, CONFIG_FILE};
use crate::pipeline::stylesheet::MAIN_STYLESHEET;
use crate::templates::builtin::{DEFAULT_API_ROUTES, DEFAULT_HEAD, DEFAULT_INDEX};
use crate::templates::{render, Bindings, TemplateSpec};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const ROBOTS_TXT: &str = "User-agent: *\nDisallow:\n";

const VARIABLES_SCSS: &str = "// Global variables, imported before every other module\n";

/// Sass subdirectories the aggregator reads
const SASS_DIRS: [&str; 3] = ["modules", "partials", "vendor"];

/// What to create and where
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    /// Project name, also the folder name
    pub name: String,
    /// Directory the project folder is created in
    pub parent: PathBuf,
    /// Icon source copied to the layout's favicon location
    pub favicon: Option<PathBuf>,
    /// Extra files copied into the static resources
    pub resources: Vec<PathBuf>,
    /// Use an existing folder instead of failing
    pub proceed_if_exists: bool,
}

impl ScaffoldOptions {
    pub fn new(name: impl Into<String>, parent: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            favicon: None,
            resources: Vec::new(),
            proceed_if_exists: false,
        }
    }

    /// Folder the project is created in
    pub fn project_dir(&self) -> PathBuf {
        self.parent.join(&self.name)
    }
}

/// Create a new project, returning its folder
///
/// A failure after the folder was created removes it again; a folder that
/// already existed is left in place.
pub async fn scaffold(options: &ScaffoldOptions, cli_version: &str) -> Result<PathBuf> {
    if !options.parent.is_dir() {
        anyhow::bail!("Invalid path provided: {}", options.parent.display());
    }

    let project_dir = options.project_dir();
    let created = if project_dir.exists() {
        if !options.proceed_if_exists {
            anyhow::bail!(
                "Folder already exists at '{}' with the desired project name",
                project_dir.display()
            );
        }
        info!(path = %project_dir.display(), "using existing folder");
        false
    } else {
        fs::create_dir(&project_dir)
            .await
            .context("Could not create project folder")?;
        true
    };

    match populate(&project_dir, options, cli_version).await {
        Ok(()) => Ok(project_dir),
        Err(e) => {
            if created {
                if let Err(cleanup) = fs::remove_dir_all(&project_dir).await {
                    warn!(path = %project_dir.display(), error = %cleanup, "could not remove project folder");
                }
            }
            Err(e)
        }
    }
}

async fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    debug!(file = %path.display(), "created");
    Ok(())
}

async fn populate(project_dir: &Path, options: &ScaffoldOptions, cli_version: &str) -> Result<()> {
    let config = ProjectConfig {
        name: options.name.clone(),
        requires: Some(cli_version.to_string()),
        ..ProjectConfig::default()
    };
    let layout: &SiteLayout = &config.layout;

    for dir in [&layout.views, &layout.scripts, &layout.static_files, &layout.images, &layout.fonts] {
        fs::create_dir_all(project_dir.join(dir))
            .await
            .context("Could not build project directory structure")?;
    }

    let sass = project_dir.join(&layout.sass);
    for dir in SASS_DIRS {
        fs::create_dir_all(sass.join(dir))
            .await
            .context("Could not build sass project")?;
    }
    write(&sass.join(format!("{}.scss", MAIN_STYLESHEET)), "@import \"all\";\n").await?;
    write(&sass.join("modules/_variables.scss"), VARIABLES_SCSS).await?;

    let views = project_dir.join(&layout.views);
    write(&views.join("~head.tpl"), DEFAULT_HEAD).await?;
    let index = render(
        &TemplateSpec::new(DEFAULT_INDEX),
        &Bindings::new()
            .with("title", options.name.as_str())
            .with("description", ""),
    );
    write(&views.join("index.tpl"), &index).await?;

    let api_routes = render(
        &TemplateSpec::new(DEFAULT_API_ROUTES),
        &Bindings::new().with("name", options.name.as_str()),
    );
    write(&project_dir.join(&layout.api_routes), &api_routes).await?;

    let static_dir = project_dir.join(&layout.static_files);
    write(&static_dir.join("robots.txt"), ROBOTS_TXT).await?;
    write(&project_dir.join(CONFIG_FILE), &config.to_yaml()?).await?;

    if let Some(favicon) = &options.favicon {
        let target = project_dir.join(&layout.favicon);
        fs::copy(favicon, &target)
            .await
            .with_context(|| format!("Could not populate favicon: {}", favicon.display()))?;
    }

    for resource in &options.resources {
        let file_name = resource
            .file_name()
            .with_context(|| format!("Invalid resource path: {}", resource.display()))?;
        fs::copy(resource, static_dir.join(file_name))
            .await
            .with_context(|| format!("Could not populate resource: {}", resource.display()))?;
    }

    info!(path = %project_dir.display(), "project skeleton created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_scaffold_creates_layout() {
        let dir = TempDir::new().unwrap();
        let favicon = dir.path().join("icon.svg");
        std::fs::write(&favicon, "<svg/>").unwrap();
        let mut options = ScaffoldOptions::new("my-site", dir.path());
        options.favicon = Some(favicon);

        let project = scaffold(&options, "0.2.0").await.unwrap();

        for file in [
            "dev/views/~head.tpl",
            "dev/views/index.tpl",
            "dev/py/routes.py",
            "dev/sass/styles.scss",
            "dev/sass/modules/_variables.scss",
            "res/static/robots.txt",
            "res/favicon.svg",
            "sitebuild.yaml",
        ] {
            assert!(project.join(file).is_file(), "missing {}", file);
        }
        for dir in ["dev/js", "dev/sass/vendor", "dev/sass/partials", "res/img", "res/font"] {
            assert!(project.join(dir).is_dir(), "missing {}", dir);
        }

        let index = std::fs::read_to_string(project.join("dev/views/index.tpl")).unwrap();
        assert!(index.contains("title='my-site'"));
        let config = ProjectConfig::load(&project).unwrap();
        assert_eq!(config.name, "my-site");
        assert_eq!(config.requires.as_deref(), Some("0.2.0"));
    }

    #[tokio::test]
    async fn test_existing_folder_needs_permission() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("site")).unwrap();
        std::fs::write(dir.path().join("site/keep.txt"), "k").unwrap();

        let mut options = ScaffoldOptions::new("site", dir.path());
        let err = scaffold(&options, "0.2.0").await.unwrap_err();
        assert!(err.to_string().contains("Folder already exists"));

        options.proceed_if_exists = true;
        scaffold(&options, "0.2.0").await.unwrap();
        assert!(dir.path().join("site/keep.txt").is_file());
        assert!(dir.path().join("site/dev/views/index.tpl").is_file());
    }

    #[tokio::test]
    async fn test_failure_removes_created_folder() {
        let dir = TempDir::new().unwrap();
        let mut options = ScaffoldOptions::new("broken", dir.path());
        options.resources = vec![dir.path().join("does-not-exist.txt")];

        let err = scaffold(&options, "0.2.0").await.unwrap_err();
        assert!(format!("{:#}", err).contains("Could not populate resource"));
        assert!(!dir.path().join("broken").exists());
    }

    #[tokio::test]
    async fn test_failure_keeps_existing_folder() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("site")).unwrap();
        let mut options = ScaffoldOptions::new("site", dir.path());
        options.proceed_if_exists = true;
        options.favicon = Some(dir.path().join("missing.svg"));

        assert!(scaffold(&options, "0.2.0").await.is_err());
        assert!(dir.path().join("site").is_dir());
    }

    #[tokio::test]
    async fn test_invalid_parent_is_rejected() {
        let dir = TempDir::new().unwrap();
        let options = ScaffoldOptions::new("site", dir.path().join("nope"));
        let err = scaffold(&options, "0.2.0").await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid path provided"));
    }
}
