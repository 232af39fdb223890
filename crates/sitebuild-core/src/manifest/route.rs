//! Route descriptors and the per-document route table

use crate::error::{BuildError, Result};
use crate::templates::{Bindings, TemplateSet, TemplateSpec};
use std::collections::HashMap;
use tracing::debug;

use super::naming;

/// Server-entry section a route is rendered into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteSection {
    Main,
    Static,
    Favicon,
    Image,
    Font,
    Stylesheet,
    Javascript,
}

impl RouteSection {
    pub const ALL: [RouteSection; 7] = [
        RouteSection::Main,
        RouteSection::Static,
        RouteSection::Favicon,
        RouteSection::Image,
        RouteSection::Font,
        RouteSection::Stylesheet,
        RouteSection::Javascript,
    ];

    /// Placeholder name in the server-entry template
    pub fn placeholder(&self) -> &'static str {
        match self {
            RouteSection::Main => "main_routes",
            RouteSection::Static => "static_routes",
            RouteSection::Favicon => "favicon_routes",
            RouteSection::Image => "image_routes",
            RouteSection::Font => "font_routes",
            RouteSection::Stylesheet => "css_routes",
            RouteSection::Javascript => "js_routes",
        }
    }
}

/// One generated route declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `route(url) -> renders(template)`
    Page {
        url_path: String,
        handler_name: String,
        template: String,
        source_file: String,
    },
    /// `route(url) -> serves(file, root)`
    Static {
        url_path: String,
        handler_name: String,
        file: String,
        root: String,
    },
    /// Wildcard static route, `pattern` is a bottle route rule
    Pattern {
        pattern: String,
        handler_name: String,
        root: String,
    },
}

impl Route {
    /// Page route for a view, from its `/`-separated path relative to the views dir
    pub fn page(relative_path: &str) -> Self {
        let url_path = naming::strip_path_extension(relative_path);
        Route::Page {
            handler_name: naming::page_handler_name(relative_path),
            template: url_path.clone(),
            url_path,
            source_file: relative_path.to_string(),
        }
    }

    /// The implicit site root, always rendering `index`
    pub fn root() -> Self {
        Route::Page {
            url_path: String::new(),
            handler_name: format!("{}root", naming::PAGE_PREFIX),
            template: "index".to_string(),
            source_file: "index".to_string(),
        }
    }

    /// Static route serving `file` (relative to `root`) at `url_path`
    pub fn static_file(url_path: &str, file: &str, root: &str) -> Self {
        Route::Static {
            url_path: url_path.to_string(),
            handler_name: naming::static_handler_name(url_path),
            file: file.to_string(),
            root: root.to_string(),
        }
    }

    /// Static route where the url is the file's path under `root`
    pub fn static_asset(relative_path: &str, root: &str) -> Self {
        Self::static_file(relative_path, relative_path, root)
    }

    /// Wildcard route for every file with `extension` under `root`
    pub fn pattern(extension: &str, handler_name: &str, root: &str) -> Self {
        Route::Pattern {
            pattern: format!("<filename:re:.*\\.{}>", extension),
            handler_name: handler_name.to_string(),
            root: root.to_string(),
        }
    }

    pub fn url_path(&self) -> &str {
        match self {
            Route::Page { url_path, .. } | Route::Static { url_path, .. } => url_path,
            Route::Pattern { pattern, .. } => pattern,
        }
    }

    pub fn handler_name(&self) -> &str {
        match self {
            Route::Page { handler_name, .. }
            | Route::Static { handler_name, .. }
            | Route::Pattern { handler_name, .. } => handler_name,
        }
    }

    fn rename(&mut self, name: String) {
        match self {
            Route::Page { handler_name, .. }
            | Route::Static { handler_name, .. }
            | Route::Pattern { handler_name, .. } => *handler_name = name,
        }
    }

    /// What produced the route, used in collision messages
    pub fn origin(&self) -> String {
        match self {
            Route::Page { source_file, .. } => source_file.clone(),
            Route::Static { file, root, .. } => format!("{}/{}", root, file),
            Route::Pattern { pattern, root, .. } => format!("{}/{}", root, pattern),
        }
    }

    /// Template and bindings that render this route's declaration
    pub fn to_item(&self, templates: &TemplateSet) -> (TemplateSpec, Bindings) {
        match self {
            Route::Page {
                url_path,
                handler_name,
                template,
                ..
            } => (
                templates.page_route.clone(),
                Bindings::new()
                    .with("path", url_path.as_str())
                    .with("handler_name", handler_name.as_str())
                    .with("template", template.as_str()),
            ),
            Route::Static {
                url_path,
                handler_name,
                file,
                root,
            } => (
                templates.static_route.clone(),
                Bindings::new()
                    .with("path", url_path.as_str())
                    .with("handler_name", handler_name.as_str())
                    .with("file", file.as_str())
                    .with("root", root.as_str()),
            ),
            Route::Pattern {
                pattern,
                handler_name,
                root,
            } => (
                templates.pattern_route.clone(),
                Bindings::new()
                    .with("pattern", pattern.as_str())
                    .with("handler_name", handler_name.as_str())
                    .with("root", root.as_str()),
            ),
        }
    }
}

/// Every route of one generated server entry, with uniqueness enforced
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<(RouteSection, Route)>,
    handlers: HashMap<String, usize>,
    urls: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route, failing fast on a url collision
    ///
    /// Page handler names must be unique as derived. Static and pattern
    /// handlers are never referenced by name, so a clash there is resolved
    /// with a numeric suffix.
    pub fn insert(&mut self, section: RouteSection, mut route: Route) -> Result<()> {
        if let Some(&idx) = self.urls.get(route.url_path()) {
            return Err(BuildError::DuplicateUrlPath {
                url: route.url_path().to_string(),
                first: self.routes[idx].1.origin(),
                second: route.origin(),
            });
        }
        if let Some(&idx) = self.handlers.get(route.handler_name()) {
            if matches!(route, Route::Page { .. }) {
                return Err(BuildError::DuplicateHandlerName {
                    name: route.handler_name().to_string(),
                    first: self.routes[idx].1.origin(),
                    second: route.origin(),
                });
            }
            let name = self.free_handler_name(route.handler_name());
            debug!(url = %route.url_path(), handler = %name, "handler name taken, suffixed");
            route.rename(name);
        }

        let idx = self.routes.len();
        self.handlers.insert(route.handler_name().to_string(), idx);
        self.urls.insert(route.url_path().to_string(), idx);
        self.routes.push((section, route));
        Ok(())
    }

    fn free_handler_name(&self, base: &str) -> String {
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|name| !self.handlers.contains_key(name))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn extend(
        &mut self,
        section: RouteSection,
        routes: impl IntoIterator<Item = Route>,
    ) -> Result<()> {
        for route in routes {
            self.insert(section, route)?;
        }
        Ok(())
    }

    /// Routes of one section, in insertion order
    pub fn section(&self, section: RouteSection) -> impl Iterator<Item = &Route> {
        self.routes
            .iter()
            .filter(move |(s, _)| *s == section)
            .map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Bind every section's rendered declarations into `bindings`
    pub fn bind_sections(&self, templates: &TemplateSet, bindings: &mut Bindings) {
        for section in RouteSection::ALL {
            let items: Vec<(TemplateSpec, Bindings)> = self
                .section(section)
                .map(|route| route.to_item(templates))
                .collect();
            bindings.insert(section.placeholder(), items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::render;

    #[test]
    fn test_page_route_fields() {
        let route = Route::page("test/my-page.tpl");
        match route {
            Route::Page {
                url_path,
                handler_name,
                template,
                source_file,
            } => {
                assert_eq!(url_path, "test/my-page");
                assert_eq!(handler_name, "load_my_page");
                assert_eq!(template, "test/my-page");
                assert_eq!(source_file, "test/my-page.tpl");
            }
            other => panic!("unexpected route {:?}", other),
        }
    }

    #[test]
    fn test_root_route_is_distinct_from_index() {
        let mut table = RouteTable::new();
        table.insert(RouteSection::Main, Route::root()).unwrap();
        table
            .insert(RouteSection::Main, Route::page("index.tpl"))
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_handler_fails_fast() {
        let mut table = RouteTable::new();
        table
            .insert(RouteSection::Main, Route::page("about.tpl"))
            .unwrap();
        let err = table
            .insert(RouteSection::Main, Route::page("blog/about.tpl"))
            .unwrap_err();
        match err {
            BuildError::DuplicateHandlerName {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "load_about");
                assert_eq!(first, "about.tpl");
                assert_eq!(second, "blog/about.tpl");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_static_handler_clash_gets_suffix() {
        let mut table = RouteTable::new();
        for file in ["img/logo.png", "img-logo.png", "img_logo.png"] {
            table
                .insert(RouteSection::Static, Route::static_asset(file, "static"))
                .unwrap();
        }
        let handlers: Vec<&str> = table
            .section(RouteSection::Static)
            .map(Route::handler_name)
            .collect();
        assert_eq!(
            handlers,
            vec!["serve_img_logo_png", "serve_img_logo_png_2", "serve_img_logo_png_3"]
        );
    }

    #[test]
    fn test_suffix_skips_names_already_taken() {
        let mut table = RouteTable::new();
        for file in ["a.png", "a-png-2", "a_png"] {
            table
                .insert(RouteSection::Static, Route::static_asset(file, "static"))
                .unwrap();
        }
        let handlers: Vec<&str> = table
            .section(RouteSection::Static)
            .map(Route::handler_name)
            .collect();
        assert_eq!(handlers, vec!["serve_a_png", "serve_a_png_2", "serve_a_png_3"]);
    }

    #[test]
    fn test_duplicate_url_fails_fast() {
        let mut table = RouteTable::new();
        table
            .insert(
                RouteSection::Static,
                Route::static_file("logo.png", "logo.png", "static"),
            )
            .unwrap();
        let err = table
            .insert(
                RouteSection::Image,
                Route::Static {
                    url_path: "logo.png".to_string(),
                    handler_name: "serve_other".to_string(),
                    file: "logo.png".to_string(),
                    root: "static/img".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateUrlPath { .. }));
    }

    #[test]
    fn test_page_route_renders_declaration() {
        let templates = TemplateSet::default();
        let (spec, bindings) = Route::page("about.tpl").to_item(&templates);
        let text = render(&spec, &bindings);
        assert_eq!(
            text,
            "@route('/about')\ndef load_about():\n    \
             return template('about', request=request, template='about')\n"
        );
    }

    #[test]
    fn test_static_route_renders_declaration() {
        let templates = TemplateSet::default();
        let route = Route::static_file("apple-touch-icon.png", "apple-touch-icon-57x57.png", "static/favicon");
        let (spec, bindings) = route.to_item(&templates);
        let text = render(&spec, &bindings);
        assert!(text.starts_with("@get('/apple-touch-icon.png')\ndef serve_apple_touch_icon_png():"));
        assert!(text.contains("static_file('apple-touch-icon-57x57.png', root='static/favicon')"));
    }

    #[test]
    fn test_pattern_route_renders_declaration() {
        let templates = TemplateSet::default();
        let (spec, bindings) = Route::pattern("css", "serve_stylesheets", "static/css").to_item(&templates);
        let text = render(&spec, &bindings);
        assert!(text.starts_with("@get('/<filename:re:.*\\.css>')\ndef serve_stylesheets(filename):"));
    }

    #[test]
    fn test_sections_keep_insertion_order() {
        let mut table = RouteTable::new();
        table
            .extend(
                RouteSection::Image,
                ["b.png", "a.png", "c.png"].map(|f| Route::static_asset(f, "static/img")),
            )
            .unwrap();
        let urls: Vec<&str> = table.section(RouteSection::Image).map(Route::url_path).collect();
        assert_eq!(urls, vec!["b.png", "a.png", "c.png"]);
        assert_eq!(table.section(RouteSection::Font).count(), 0);
    }
}
