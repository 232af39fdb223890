//! The resource pipeline: one generation run over every source category
//!
//! Steps run in a fixed order because later ones read what earlier ones
//! left in the site tree:
//!
//! 1. static files, images, fonts, scripts (copied and routed as-is)
//! 2. views (page routes plus the implicit root route)
//! 3. the icon family and the open-graph tags that reuse its preview image
//! 4. stylesheets (compiled, or watched in development)
//!
//! Every route lands in one [`RouteTable`], so a url or page-handler
//! collision anywhere in the run fails fast.

pub mod favicon;
pub mod head;
pub mod stylesheet;

pub use head::{HeadFragments, HeadSection};

use crate::config::generator::detect_python;
use crate::config::{BuildOptions, ProjectConfig};
use crate::error::{IoResultExt, Result};
use crate::manifest::{walk, Route, RouteSection, RouteTable};
use crate::runtime::{
    DetachedLauncher, IconPacker, InkscapeRasterizer, MagickPacker, ProcessLauncher, Rasterizer,
    SassCompiler, StylesheetCompiler,
};
use crate::templates::TemplateSet;
use std::path::Path;
use stylesheet::StylesheetJob;
use tracing::{info, warn};

/// Serving roots inside the site tree; also the copy destinations
pub const VIEWS_DIR: &str = "views";
pub const STATIC_DIR: &str = "static";
pub const IMAGES_DIR: &str = "static/img";
pub const FONTS_DIR: &str = "static/font";
pub const SCRIPTS_DIR: &str = "static/js";
pub const STYLESHEETS_DIR: &str = "static/css";
pub const FAVICON_DIR: &str = "static/favicon";

/// External collaborators a run shells out to
///
/// Shared with the blocking pipeline task, hence `Send + Sync`.
pub struct Toolchain {
    pub rasterizer: Box<dyn Rasterizer + Send + Sync>,
    pub packer: Box<dyn IconPacker + Send + Sync>,
    pub compiler: Box<dyn StylesheetCompiler + Send + Sync>,
    pub launcher: Box<dyn ProcessLauncher + Send + Sync>,
    /// Interpreter used for generated scripts
    pub python: String,
}

impl Toolchain {
    /// The installed command-line tools
    pub fn system() -> Self {
        Self {
            rasterizer: Box::new(InkscapeRasterizer),
            packer: Box::new(MagickPacker::detect()),
            compiler: Box::new(SassCompiler::default()),
            launcher: Box::new(DetachedLauncher),
            python: detect_python().to_string(),
        }
    }
}

/// Everything a run produced for the document assembler
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub routes: RouteTable,
    pub head: HeadFragments,
    /// Hand-written API routes, inserted verbatim
    pub api_routes: String,
    /// Recoverable problems, already logged
    pub warnings: Vec<String>,
}

impl Generated {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// One generation run over a project's sources
pub struct ResourcePipeline<'a> {
    config: &'a ProjectConfig,
    options: &'a BuildOptions,
    templates: &'a TemplateSet,
    tools: &'a Toolchain,
}

impl<'a> ResourcePipeline<'a> {
    pub fn new(
        config: &'a ProjectConfig,
        options: &'a BuildOptions,
        templates: &'a TemplateSet,
        tools: &'a Toolchain,
    ) -> Self {
        Self {
            config,
            options,
            templates,
            tools,
        }
    }

    /// Run every step into the prepared site root
    pub fn run(&self) -> Result<Generated> {
        let layout = &self.config.layout;
        let mut generated = Generated::default();

        info!("copying static resources");
        self.copy_category(&mut generated, RouteSection::Static, &layout.static_files, STATIC_DIR)?;
        self.copy_category(&mut generated, RouteSection::Image, &layout.images, IMAGES_DIR)?;
        self.copy_category(&mut generated, RouteSection::Font, &layout.fonts, FONTS_DIR)?;
        let scripts = self.options.source(&layout.scripts);
        if scripts.is_dir() {
            self.copy_category(&mut generated, RouteSection::Javascript, &layout.scripts, SCRIPTS_DIR)?;
        } else {
            generated.warn(format!(
                "No scripts directory at {}, skipping javascript routes",
                scripts.display()
            ));
        }

        info!("migrating views");
        self.migrate_views(&mut generated)?;
        self.read_api_routes(&mut generated)?;

        info!("generating favicon resources");
        self.generate_icons(&mut generated)?;
        self.open_graph(&mut generated);

        info!("generating stylesheets");
        self.generate_stylesheets(&mut generated)?;

        info!(routes = generated.routes.len(), "resource pipeline finished");
        Ok(generated)
    }

    fn copy_category(
        &self,
        generated: &mut Generated,
        section: RouteSection,
        source: &Path,
        destination: &str,
    ) -> Result<()> {
        let site_root = self.options.site_root();
        for entry in walk(&self.options.source(source), &site_root.join(destination))? {
            let entry = entry?;
            generated
                .routes
                .insert(section, Route::static_asset(&entry.relative_path, destination))?;
        }
        Ok(())
    }

    fn migrate_views(&self, generated: &mut Generated) -> Result<()> {
        let source = self.options.source(&self.config.layout.views);
        let destination = self.options.site_root().join(VIEWS_DIR);

        generated.routes.insert(RouteSection::Main, Route::root())?;
        for entry in walk(&source, &destination)? {
            let entry = entry?;
            generated
                .routes
                .insert(RouteSection::Main, Route::page(&entry.relative_path))?;
        }
        Ok(())
    }

    fn read_api_routes(&self, generated: &mut Generated) -> Result<()> {
        let path = self.options.source(&self.config.layout.api_routes);
        if path.is_file() {
            generated.api_routes = std::fs::read_to_string(&path).at(&path)?;
        } else {
            generated.warn(format!(
                "No API routes at {}, leaving that section empty",
                path.display()
            ));
        }
        Ok(())
    }

    fn generate_icons(&self, generated: &mut Generated) -> Result<()> {
        let source = self.options.source(&self.config.layout.favicon);
        if !source.is_file() {
            generated.warn(format!(
                "No favicon source at {}, skipping favicon generation",
                source.display()
            ));
            return Ok(());
        }

        let family = favicon::generate(
            &source,
            &self.options.site_root().join(FAVICON_DIR),
            FAVICON_DIR,
            self.options.reuse,
            self.tools.rasterizer.as_ref(),
            self.tools.packer.as_ref(),
        )?;
        generated.routes.extend(RouteSection::Favicon, family.routes)?;
        generated.head.set(HeadSection::FaviconResources, family.head);
        Ok(())
    }

    fn open_graph(&self, generated: &mut Generated) {
        let preview = favicon::preview_file();
        let has_preview = self
            .options
            .site_root()
            .join(FAVICON_DIR)
            .join(&preview)
            .is_file();
        let image = has_preview.then_some((preview.as_str(), favicon::PREVIEW_SIZE));
        generated
            .head
            .set(HeadSection::OpenGraph, head::open_graph(self.templates, image));
    }

    fn generate_stylesheets(&self, generated: &mut Generated) -> Result<()> {
        let sass_dir = self.options.source(&self.config.layout.sass);
        if !sass_dir.is_dir() {
            generated.warn(format!(
                "No sass directory at {}, skipping stylesheets",
                sass_dir.display()
            ));
            return Ok(());
        }

        let css_dir = self.options.site_root().join(STYLESHEETS_DIR);
        let output = StylesheetJob {
            sass_dir: &sass_dir,
            css_dir: &css_dir,
            root: STYLESHEETS_DIR,
            deploy: self.options.deploy,
            policy: self.config.stylesheet_routes,
            watch_timeout: self.config.watch_timeout(),
            python: &self.tools.python,
        }
        .run(
            self.templates,
            self.tools.compiler.as_ref(),
            self.tools.launcher.as_ref(),
        )?;

        generated.routes.extend(RouteSection::Stylesheet, output.routes)?;
        generated.head.set(HeadSection::StyleSheets, output.head);
        for warning in output.warnings {
            generated.warnings.push(warning);
        }
        Ok(())
    }
}
