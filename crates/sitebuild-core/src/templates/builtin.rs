//! Templates shipped with the generator

use super::spec::{BannerWidths, TemplateSpec};

pub const SERVER_ENTRY: &str = include_str!("../../templates/app.py.tpl");
pub const PAGE_ROUTE: &str = include_str!("../../templates/page_route.tpl");
pub const STATIC_ROUTE: &str = include_str!("../../templates/static_route.tpl");
pub const PATTERN_ROUTE: &str = include_str!("../../templates/pattern_route.tpl");
pub const WATCH_SCRIPT: &str = include_str!("../../templates/watch.py.tpl");
pub const DEFAULT_HEAD: &str = include_str!("../../templates/head.tpl");
pub const DEFAULT_INDEX: &str = include_str!("../../templates/index.tpl");
pub const DEFAULT_API_ROUTES: &str = include_str!("../../templates/routes.py.tpl");
pub const OPEN_GRAPH: &str = include_str!("../../templates/open_graph.tpl");
pub const OPEN_GRAPH_IMAGE: &str = include_str!("../../templates/og_image.tpl");

/// Every template the pipeline renders, built once per run
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub server_entry: TemplateSpec,
    pub page_route: TemplateSpec,
    pub static_route: TemplateSpec,
    pub pattern_route: TemplateSpec,
    pub watch_script: TemplateSpec,
    pub open_graph: TemplateSpec,
    pub open_graph_image: TemplateSpec,
    widths: BannerWidths,
}

impl TemplateSet {
    pub fn new(widths: BannerWidths) -> Self {
        let build = |raw: &str| TemplateSpec::with_widths(raw, widths);
        Self {
            server_entry: build(SERVER_ENTRY),
            page_route: build(PAGE_ROUTE),
            static_route: build(STATIC_ROUTE),
            pattern_route: build(PATTERN_ROUTE),
            watch_script: build(WATCH_SCRIPT),
            open_graph: build(OPEN_GRAPH),
            open_graph_image: build(OPEN_GRAPH_IMAGE),
            widths,
        }
    }

    /// Banner widths these templates were expanded with
    pub fn widths(&self) -> BannerWidths {
        self.widths
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::new(BannerWidths::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_entry_sections() {
        let set = TemplateSet::default();
        let names: Vec<&str> = set
            .server_entry
            .placeholders()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(
            names,
            vec![
                "api_routes",
                "css_routes",
                "doc_string",
                "favicon_routes",
                "font_routes",
                "image_routes",
                "js_routes",
                "main_routes",
                "static_routes",
            ]
        );
    }

    #[test]
    fn test_server_entry_banners_expanded() {
        let set = TemplateSet::default();
        let text = set.server_entry.raw_text();
        assert!(text.contains("##### MAIN SITE ROUTES #"));
        assert!(text.contains("### Favicon Routes #"));
        assert!(!text.contains("$ph{"));
        assert!(!text.contains("$sh{"));
    }

    #[test]
    fn test_route_templates_have_handler_placeholder() {
        let set = TemplateSet::default();
        for spec in [&set.page_route, &set.static_route, &set.pattern_route] {
            assert!(spec.placeholders().contains("handler_name"));
        }
    }
}
