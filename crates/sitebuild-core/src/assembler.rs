//! Writing the generated documents into the site tree
//!
//! The server entry and the head template are rendered from the pipeline's
//! output and written over whatever is there; no merging. The head template
//! is the project's own `~head.tpl` when it has one, with its marker meta
//! tags swapped for the generated fragments.

use crate::error::{BuildError, IoResultExt, Result};
use crate::pipeline::{Generated, HeadFragments, HeadSection, VIEWS_DIR};
use crate::templates::builtin::DEFAULT_HEAD;
use crate::templates::{render, BannerWidths, Bindings, TemplateSet, TemplateSpec};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Server entry file name at the site root
pub const SERVER_ENTRY: &str = "app.py";

/// Head template name inside the views directory
pub const HEAD_TEMPLATE: &str = "~head.tpl";

/// Paths written by [`assemble`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub server_entry: PathBuf,
    pub head: PathBuf,
}

/// Make `site_root` ready for a run
///
/// An existing tree is deleted unless `reuse` is set. A path that is a
/// file, or the filesystem root, is refused.
pub fn prepare(site_root: &Path, reuse: bool) -> Result<()> {
    if site_root.is_file() || site_root.parent().is_none() {
        return Err(BuildError::InvalidDestination(site_root.to_path_buf()));
    }

    if site_root.exists() {
        if reuse {
            info!(path = %site_root.display(), "reusing existing site tree");
        } else {
            info!(path = %site_root.display(), "removing previous site tree");
            std::fs::remove_dir_all(site_root).at(site_root)?;
        }
    }
    std::fs::create_dir_all(site_root).at(site_root)
}

/// Best-effort removal of a partially generated tree
pub fn cleanup(site_root: &Path) {
    if !site_root.exists() {
        return;
    }
    match std::fs::remove_dir_all(site_root) {
        Ok(()) => info!(path = %site_root.display(), "removed partial site tree"),
        Err(e) => warn!(path = %site_root.display(), error = %e, "could not remove partial site tree"),
    }
}

/// Swap marker meta tags for banner + placeholder, or drop them when the
/// section has nothing to show
pub fn expand_head_markers(raw: &str, fragments: &HeadFragments) -> String {
    let mut lines = Vec::new();
    'lines: for line in raw.lines() {
        let mut line = line.to_string();
        for section in HeadSection::ALL {
            let marker = section.marker();
            if !line.contains(&marker) {
                continue;
            }
            if fragments.is_empty(section) {
                line = line.replace(&marker, "");
                if line.trim().is_empty() {
                    continue 'lines;
                }
            } else if line.trim() == marker {
                let indent = &line[..line.len() - line.trim_start().len()];
                line = format!(
                    "\n{}$wh{{{}}}\n${{{}}}",
                    indent,
                    section.label(),
                    section.placeholder()
                );
            } else {
                line = line.replace(
                    &marker,
                    &format!("$wh{{{}}}\n${{{}}}", section.label(), section.placeholder()),
                );
            }
        }
        lines.push(line);
    }

    let mut text = lines.join("\n");
    if raw.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Render the head template source against the generated fragments
pub fn render_head(raw: &str, fragments: &HeadFragments, widths: BannerWidths) -> String {
    let spec = TemplateSpec::with_widths(&expand_head_markers(raw, fragments), widths);
    let mut bindings = Bindings::new();
    fragments.bind(&mut bindings);
    render(&spec, &bindings)
}

/// Render the server entry with every route section and the API routes
pub fn render_server_entry(generated: &Generated, templates: &TemplateSet, doc_string: &str) -> String {
    let mut bindings = Bindings::new()
        .with("doc_string", doc_string)
        .with("api_routes", generated.api_routes.trim_end());
    generated.routes.bind_sections(templates, &mut bindings);
    render(&templates.server_entry, &bindings)
}

/// Write the server entry and head template into `site_root`
///
/// `head_source` is the project's head template; the built-in default is
/// used when it does not exist.
pub fn assemble(
    site_root: &Path,
    head_source: &Path,
    generated: &Generated,
    templates: &TemplateSet,
    doc_string: &str,
) -> Result<Assembled> {
    let server_entry = site_root.join(SERVER_ENTRY);
    let text = render_server_entry(generated, templates, doc_string);
    std::fs::write(&server_entry, text).at(&server_entry)?;
    debug!(file = %server_entry.display(), "wrote server entry");

    let raw = if head_source.is_file() {
        std::fs::read_to_string(head_source).at(head_source)?
    } else {
        debug!(path = %head_source.display(), "no head template, using default");
        DEFAULT_HEAD.to_string()
    };
    let head = site_root.join(VIEWS_DIR).join(HEAD_TEMPLATE);
    let text = render_head(&raw, &generated.head, templates.widths());
    if let Some(parent) = head.parent() {
        std::fs::create_dir_all(parent).at(parent)?;
    }
    std::fs::write(&head, text).at(&head)?;
    debug!(file = %head.display(), "wrote head template");

    Ok(Assembled { server_entry, head })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Route, RouteSection};
    use tempfile::TempDir;

    fn fragments(favicon: &str, og: &str, css: &str) -> HeadFragments {
        let mut f = HeadFragments::new();
        f.set(HeadSection::FaviconResources, favicon);
        f.set(HeadSection::OpenGraph, og);
        f.set(HeadSection::StyleSheets, css);
        f
    }

    #[test]
    fn test_prepare_refuses_file_and_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("www");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            prepare(&file, false),
            Err(BuildError::InvalidDestination(_))
        ));
        assert!(matches!(
            prepare(Path::new("/"), false),
            Err(BuildError::InvalidDestination(_))
        ));
    }

    #[test]
    fn test_prepare_regenerates_unless_reuse() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("www");
        std::fs::create_dir_all(site.join("static")).unwrap();
        std::fs::write(site.join("static/old.txt"), "old").unwrap();

        prepare(&site, true).unwrap();
        assert!(site.join("static/old.txt").exists());

        prepare(&site, false).unwrap();
        assert!(site.is_dir());
        assert!(!site.join("static").exists());
    }

    #[test]
    fn test_cleanup_removes_tree_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("www");
        std::fs::create_dir_all(site.join("views")).unwrap();
        cleanup(&site);
        assert!(!site.exists());
        cleanup(&site);
    }

    #[test]
    fn test_markers_become_banner_and_placeholder() {
        let raw = "<head>\n    <meta name=\"favicon_resources\">\n</head>\n";
        let text = expand_head_markers(raw, &fragments("<link>", "", ""));
        assert_eq!(
            text,
            "<head>\n\n    $wh{Favicon Resources}\n${favicon_resources}\n</head>\n"
        );
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let head = render_head(DEFAULT_HEAD, &fragments("", "", ""), BannerWidths::default());
        assert!(!head.contains("favicon_resources"));
        assert!(!head.contains("Favicon Resources"));
        assert!(!head.contains("${"));
        assert!(head.contains("<title>{{title}}</title>"));
    }

    #[test]
    fn test_head_renders_fragments_under_banners() {
        let head = render_head(
            DEFAULT_HEAD,
            &fragments("    <link rel=\"icon\">", "    <meta og>", "    <link css>"),
            BannerWidths::default(),
        );
        let banner = head
            .lines()
            .find(|l| l.contains("***** Favicon Resources"))
            .unwrap();
        assert_eq!(banner.trim_start().len(), 120);
        let icon = head.find("<link rel=\"icon\">").unwrap();
        let og = head.find("<meta og>").unwrap();
        let css = head.find("<link css>").unwrap();
        assert!(icon < og && og < css);
    }

    #[test]
    fn test_assemble_writes_both_documents() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("www");
        prepare(&site, false).unwrap();

        let mut generated = Generated::default();
        generated.routes.insert(RouteSection::Main, Route::root()).unwrap();
        generated.api_routes = "@post('/api/ping')\ndef ping():\n    return 'pong'\n".to_string();

        let templates = TemplateSet::default();
        let written = assemble(
            &site,
            &dir.path().join("missing/~head.tpl"),
            &generated,
            &templates,
            "demo",
        )
        .unwrap();

        let app = std::fs::read_to_string(&written.server_entry).unwrap();
        assert!(app.starts_with("\"\"\"\ndemo\n\"\"\""));
        assert!(app.contains("@route('/')\ndef load_root():"));
        assert!(app.contains("def ping():"));
        assert!(!app.contains("${"));
        assert!(written.head.ends_with("views/~head.tpl"));
        assert!(written.head.is_file());
    }

    #[test]
    fn test_assemble_overwrites_copied_head() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("www");
        std::fs::create_dir_all(site.join("views")).unwrap();
        std::fs::write(site.join("views/~head.tpl"), "stale").unwrap();
        let source = dir.path().join("~head.tpl");
        std::fs::write(&source, "<head><meta name=\"style_sheets\"></head>").unwrap();

        let mut generated = Generated::default();
        generated.head.set(HeadSection::StyleSheets, "<link css>");
        assemble(&site, &source, &generated, &TemplateSet::default(), "").unwrap();

        let head = std::fs::read_to_string(site.join("views/~head.tpl")).unwrap();
        assert!(head.starts_with("<head><!-- ***** Style Sheets"));
        assert!(head.contains("<link css></head>"));
    }
}
