//! One complete site build: prepare, run the pipeline, fetch, assemble,
//! package or serve
//!
//! A fatal error after the site root was prepared removes the partial tree.
//! Background processes that were already started keep running.

use crate::assembler::{self, HEAD_TEMPLATE, SERVER_ENTRY};
use crate::config::version::check_compatibility;
use crate::config::{BuildOptions, ProjectConfig};
use crate::error::BuildError;
use crate::pipeline::{ResourcePipeline, Toolchain};
use crate::resources::{Archiver, FetchReport, ResourceFetcher, ZipArchiver};
use crate::templates::TemplateSet;
use crate::{CLI_VERSION, UPGRADE_COMMAND};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Archive name under the output root
pub const ARCHIVE_NAME: &str = "www.zip";

/// What a build produced
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub site_root: PathBuf,
    /// Number of generated route declarations
    pub routes: usize,
    pub fetch: FetchReport,
    /// Deployment archive, when one was written
    pub archive: Option<PathBuf>,
    /// Whether the generated server was launched
    pub served: bool,
    /// Recoverable problems, in the order they happened
    pub warnings: Vec<String>,
}

/// Build the site described by `config` into `options.site_root()`
pub async fn generate(
    options: &BuildOptions,
    config: &ProjectConfig,
    tools: Arc<Toolchain>,
    fetcher: &ResourceFetcher,
) -> Result<GenerationReport> {
    let site_root = options.site_root();
    ensure_outside_sources(&site_root, &options.project_root)?;
    assembler::prepare(&site_root, options.reuse)
        .with_context(|| format!("Could not prepare {}", site_root.display()))?;

    match build(options, config, tools, fetcher).await {
        Ok(report) => Ok(report),
        Err(e) => {
            assembler::cleanup(&site_root);
            Err(e)
        }
    }
}

/// Refuse a site root that is, or contains, the project being built
///
/// Preparing the site root deletes it, which would take the sources along.
fn ensure_outside_sources(site_root: &Path, project_root: &Path) -> Result<()> {
    let site = resolved(site_root);
    if resolved(project_root).starts_with(&site) {
        return Err(BuildError::InvalidDestination(site_root.to_path_buf()))
            .with_context(|| {
                format!(
                    "The site root {} would overwrite the project at {}",
                    site_root.display(),
                    project_root.display()
                )
            });
    }
    Ok(())
}

/// Canonical form of a path whose last component may not exist yet
fn resolved(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => resolved(parent).join(name),
        _ => path.to_path_buf(),
    }
}

async fn build(
    options: &BuildOptions,
    config: &ProjectConfig,
    tools: Arc<Toolchain>,
    fetcher: &ResourceFetcher,
) -> Result<GenerationReport> {
    let site_root = options.site_root();
    let mut report = GenerationReport {
        site_root: site_root.clone(),
        ..GenerationReport::default()
    };

    if let Some(required) = &config.requires {
        if let Some(warning) = check_compatibility(CLI_VERSION, required, UPGRADE_COMMAND) {
            warn!("{}", warning);
            report.warnings.push(warning);
        }
    }

    let templates = TemplateSet::new(config.banner);
    let generated = {
        let (config, options, templates, tools) =
            (config.clone(), options.clone(), templates.clone(), Arc::clone(&tools));
        // walks, external tools and the watcher poll all block
        tokio::task::spawn_blocking(move || {
            ResourcePipeline::new(&config, &options, &templates, &tools).run()
        })
        .await
        .context("Resource pipeline task did not complete")?
        .context("Could not generate site resources")?
    };
    report.routes = generated.routes.len();
    report.warnings.extend(generated.warnings.iter().cloned());

    if options.skip_fetch {
        info!("skipping remote resources");
    } else {
        report.fetch = fetcher
            .populate(&config.resources, &site_root, options.reuse)
            .await
            .context("Could not populate site resources")?;
        report
            .warnings
            .extend(report.fetch.failed.iter().map(|f| f.message.clone()));
    }

    let doc_string = format!("{} web server, generated by sitebuild {}", config.name, CLI_VERSION);
    let head_source = options.source(&config.layout.views).join(HEAD_TEMPLATE);
    assembler::assemble(&site_root, &head_source, &generated, &templates, &doc_string)
        .context("Could not assemble server entry")?;

    if options.deploy {
        let archive = ZipArchiver
            .archive(&site_root, &options.output_root.join(ARCHIVE_NAME))
            .context("Could not package site")?;
        report.archive = Some(archive);
    } else if options.serve {
        tools
            .launcher
            .spawn_detached(&tools.python, &[SERVER_ENTRY.to_string()], &site_root)
            .context("Could not start the development server")?;
        report.served = true;
    }

    info!(routes = report.routes, site = %site_root.display(), "site generated");
    Ok(report)
}
