//! Stylesheet aggregation, compilation and routes
//!
//! Top-level sass files that do not start with `_` are entry points. Files
//! under `modules/`, `vendor/` and `partials/` are pulled into `_all.scss`
//! so entry points only need one import. Deployment builds compile each
//! entry point compressed; development builds hand the entry points to a
//! detached watcher script and wait for its first outputs.

use super::head::link;
use crate::config::StylesheetRoutes;
use crate::error::{IoResultExt, Result};
use crate::manifest::{classify, Route};
use crate::runtime::{ProcessLauncher, StylesheetCompiler};
use crate::templates::{render_to_file, Bindings, TemplateSet};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Generated import aggregator, relative to the sass directory
pub const AGGREGATOR: &str = "_all.scss";

/// Generated development watcher, relative to the sass directory
pub const WATCH_SCRIPT: &str = "watch.py";

/// Entry point linked on every page
pub const MAIN_STYLESHEET: &str = "styles";

/// Handler for the wildcard stylesheet route
const WILDCARD_HANDLER: &str = "serve_stylesheets";

/// Mixin files must be imported before anything that uses them
static MIXIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mixins?$").expect("valid mixin pattern"));

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn is_sass(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ext == "scss" || ext == "sass"
        })
        .unwrap_or(false)
}

fn is_mixin(relative_path: &str) -> bool {
    let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    MIXIN_RE.is_match(&stem)
}

/// Routable sass files under `sass_dir/sub`, relative to `sass_dir`
fn sass_files(sass_dir: &Path, sub: &str) -> Result<Vec<String>> {
    let root = sass_dir.join(sub);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || classify(&entry.file_name().to_string_lossy(), entry.file_type().is_dir())
                    .route
        });
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_sass(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let relative = entry.path().strip_prefix(sass_dir).unwrap_or(entry.path());
        files.push(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        );
    }
    Ok(files)
}

/// Imports of the aggregator, in dependency order
pub fn aggregator_imports(sass_dir: &Path) -> Result<Vec<String>> {
    let vendor = sass_files(sass_dir, "vendor")?;
    let (vendor_mixins, vendor_rest): (Vec<String>, Vec<String>) =
        vendor.into_iter().partition(|f| is_mixin(f));

    let mut imports = sass_files(sass_dir, "modules")?;
    imports.extend(vendor_mixins);
    imports.extend(vendor_rest);
    imports.extend(sass_files(sass_dir, "partials")?);
    Ok(imports)
}

/// Write `_all.scss` into `sass_dir`
pub fn write_aggregator(sass_dir: &Path) -> Result<PathBuf> {
    let content: String = aggregator_imports(sass_dir)?
        .iter()
        .map(|path| format!("@import \"{}\";\n", path))
        .collect();
    let path = sass_dir.join(AGGREGATOR);
    std::fs::write(&path, content).at(&path)?;
    debug!(file = %path.display(), "wrote stylesheet aggregator");
    Ok(path)
}

/// A top-level stylesheet compiled to its own CSS file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Stem, also the CSS file name
    pub name: String,
    /// Source file name inside the sass directory
    pub file: String,
}

/// Entry points in `sass_dir`, sorted by name
pub fn entry_points(sass_dir: &Path) -> Result<Vec<EntryPoint>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(sass_dir).at(sass_dir)? {
        let entry = entry.at(sass_dir)?;
        let file = entry.file_name().to_string_lossy().into_owned();
        let is_file = entry.file_type().at(entry.path())?.is_file();
        if !is_file || file.starts_with('_') || !is_sass(&file) || !classify(&file, false).route {
            continue;
        }
        let name = Path::new(&file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());
        entries.push(EntryPoint { name, file });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn css_file(name: &str, deploy: bool) -> String {
    if deploy {
        format!("{}.min.css", name)
    } else {
        format!("{}.css", name)
    }
}

fn stylesheet_link(name: &str, deploy: bool) -> String {
    link(&format!(
        "href=\"/{}\" rel=\"stylesheet\" type=\"text/css\"",
        css_file(name, deploy)
    ))
}

/// Head links: the main stylesheet everywhere, the others per page
///
/// A page whose template name matches another entry point also gets that
/// entry point's stylesheet.
pub fn head(entries: &[EntryPoint], deploy: bool) -> String {
    let mut lines = Vec::new();
    if entries.iter().any(|e| e.name == MAIN_STYLESHEET) {
        lines.push(stylesheet_link(MAIN_STYLESHEET, deploy));
    }

    let others: Vec<String> = entries
        .iter()
        .filter(|e| e.name != MAIN_STYLESHEET)
        .map(|e| format!("'{}'", e.name))
        .collect();
    if !others.is_empty() {
        lines.push(format!("    % if template in [{}]:", others.join(", ")));
        lines.push(stylesheet_link("{{template}}", deploy));
        lines.push("    % end".to_string());
    }
    lines.join("\n")
}

/// Inputs for the stylesheet step of one run
pub struct StylesheetJob<'a> {
    pub sass_dir: &'a Path,
    pub css_dir: &'a Path,
    /// Serving root recorded in routes
    pub root: &'a str,
    pub deploy: bool,
    pub policy: StylesheetRoutes,
    pub watch_timeout: Duration,
    /// Interpreter for the watcher script
    pub python: &'a str,
}

/// Routes, head links and warnings from the stylesheet step
#[derive(Debug, Clone, Default)]
pub struct StylesheetOutput {
    pub routes: Vec<Route>,
    pub head: String,
    pub warnings: Vec<String>,
}

impl StylesheetJob<'_> {
    pub fn run(
        &self,
        templates: &TemplateSet,
        compiler: &dyn StylesheetCompiler,
        launcher: &dyn ProcessLauncher,
    ) -> Result<StylesheetOutput> {
        std::fs::create_dir_all(self.css_dir).at(self.css_dir)?;
        let entries = entry_points(self.sass_dir)?;
        let aggregator = write_aggregator(self.sass_dir)?;
        let mut output = StylesheetOutput::default();

        if self.deploy {
            for entry in &entries {
                let target = self.css_dir.join(css_file(&entry.name, true));
                compiler.compile(&self.sass_dir.join(&entry.file), &target, true)?;
                debug!(stylesheet = %entry.name, "compiled");
            }
            std::fs::remove_file(&aggregator).at(&aggregator)?;
        } else if entries.is_empty() {
            info!("no stylesheet entry points, not starting the watcher");
        } else {
            self.start_watcher(&entries, templates, compiler, launcher)?;
            output.warnings.extend(self.wait_for_outputs(&entries));
        }

        output.routes = self.routes()?;
        output.head = head(&entries, self.deploy);
        Ok(output)
    }

    fn start_watcher(
        &self,
        entries: &[EntryPoint],
        templates: &TemplateSet,
        compiler: &dyn StylesheetCompiler,
        launcher: &dyn ProcessLauncher,
    ) -> Result<()> {
        let script = self.sass_dir.join(WATCH_SCRIPT);
        let css_dir = self.css_dir.to_string_lossy().replace('\\', "/");
        render_to_file(
            &templates.watch_script,
            &Bindings::new()
                .with("sass", compiler.program())
                .with("css_dir", css_dir),
            &script,
        )?;

        let mut args = vec![WATCH_SCRIPT.to_string()];
        args.extend(entries.iter().map(|e| e.name.clone()));
        launcher.spawn_detached(self.python, &args, self.sass_dir)?;
        info!(stylesheets = entries.len(), "started stylesheet watcher");
        Ok(())
    }

    /// Poll for the watcher's first outputs; stragglers become warnings
    fn wait_for_outputs(&self, entries: &[EntryPoint]) -> Vec<String> {
        let expected: Vec<PathBuf> = entries
            .iter()
            .map(|e| self.css_dir.join(css_file(&e.name, false)))
            .collect();
        let deadline = Instant::now() + self.watch_timeout;

        while !expected.iter().all(|p| p.is_file()) && Instant::now() < deadline {
            std::thread::sleep(POLL_INTERVAL);
        }

        expected
            .iter()
            .filter(|p| !p.is_file())
            .map(|p| {
                warn!(file = %p.display(), "stylesheet not produced in time");
                format!(
                    "Stylesheet {} was not produced within {}s; it will not be routed",
                    p.display(),
                    self.watch_timeout.as_secs()
                )
            })
            .collect()
    }

    fn routes(&self) -> Result<Vec<Route>> {
        if self.policy == StylesheetRoutes::Wildcard {
            return Ok(vec![Route::pattern("css", WILDCARD_HANDLER, self.root)]);
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(self.css_dir).at(self.css_dir)? {
            let entry = entry.at(self.css_dir)?;
            if entry.file_type().at(entry.path())?.is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files
            .iter()
            .map(|file| Route::static_asset(file, self.root))
            .collect())
    }
}
