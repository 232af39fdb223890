//! Head-document fragments produced by the pipeline

use crate::templates::{render, Bindings, TemplateSet};
use std::collections::BTreeMap;

/// Named block of the head template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadSection {
    FaviconResources,
    OpenGraph,
    StyleSheets,
}

impl HeadSection {
    pub const ALL: [HeadSection; 3] = [
        HeadSection::FaviconResources,
        HeadSection::OpenGraph,
        HeadSection::StyleSheets,
    ];

    /// Placeholder name the section is bound to
    pub fn placeholder(&self) -> &'static str {
        match self {
            HeadSection::FaviconResources => "favicon_resources",
            HeadSection::OpenGraph => "open_graph",
            HeadSection::StyleSheets => "style_sheets",
        }
    }

    /// Banner label written above the section
    pub fn label(&self) -> &'static str {
        match self {
            HeadSection::FaviconResources => "Favicon Resources",
            HeadSection::OpenGraph => "Open Graph",
            HeadSection::StyleSheets => "Style Sheets",
        }
    }

    /// Meta tag marking where the section goes in a hand-written head
    pub fn marker(&self) -> String {
        format!("<meta name=\"{}\">", self.placeholder())
    }
}

/// Head fragments keyed by section; a missing entry means an empty block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadFragments(BTreeMap<HeadSection, String>);

impl HeadFragments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: HeadSection, fragment: impl Into<String>) {
        self.0.insert(section, fragment.into());
    }

    /// Fragment text, empty when the section produced nothing
    pub fn get(&self, section: HeadSection) -> &str {
        self.0.get(&section).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self, section: HeadSection) -> bool {
        self.get(section).trim().is_empty()
    }

    /// Bind every section into `bindings` under its placeholder name
    pub fn bind(&self, bindings: &mut Bindings) {
        for section in HeadSection::ALL {
            bindings.insert(section.placeholder(), self.get(section));
        }
    }
}

/// One `<link>` line, indented for the head template
pub(crate) fn link(attributes: &str) -> String {
    format!("    <link {}>", attributes)
}

/// Open-graph meta tags, with image tags when a preview image exists
pub fn open_graph(templates: &TemplateSet, image: Option<(&str, u32)>) -> String {
    let og_image = match image {
        Some((file, size)) => render(
            &templates.open_graph_image,
            &Bindings::new()
                .with("image", file)
                .with("size", size.to_string()),
        ),
        None => String::new(),
    };
    let text = render(
        &templates.open_graph,
        &Bindings::new().with("og_image", og_image.trim_end()),
    );
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_and_labels() {
        assert_eq!(
            HeadSection::FaviconResources.marker(),
            "<meta name=\"favicon_resources\">"
        );
        assert_eq!(HeadSection::StyleSheets.label(), "Style Sheets");
    }

    #[test]
    fn test_missing_fragment_is_empty() {
        let mut fragments = HeadFragments::new();
        assert!(fragments.is_empty(HeadSection::OpenGraph));
        fragments.set(HeadSection::OpenGraph, "  \n");
        assert!(fragments.is_empty(HeadSection::OpenGraph));
        fragments.set(HeadSection::OpenGraph, "<meta>");
        assert_eq!(fragments.get(HeadSection::OpenGraph), "<meta>");
    }

    #[test]
    fn test_open_graph_without_image() {
        let text = open_graph(&TemplateSet::default(), None);
        assert!(text.contains("og:title"));
        assert!(!text.contains("og:image"));
        assert!(text.lines().all(|l| !l.trim().is_empty()));
    }

    #[test]
    fn test_open_graph_with_image() {
        let text = open_graph(&TemplateSet::default(), Some(("favicon-300x300.png", 300)));
        assert!(text.contains("<meta property=\"og:image:width\" content=\"300\">"));
        assert!(text.contains("http://{{url}}/favicon-300x300.png"));
        let title = text.find("og:title").unwrap();
        let image = text.find("og:image:type").unwrap();
        let description = text.find("og:description").unwrap();
        assert!(title < image && image < description);
    }

    #[test]
    fn test_bind_fills_every_section() {
        let mut fragments = HeadFragments::new();
        fragments.set(HeadSection::StyleSheets, "<link>");
        let mut bindings = Bindings::new();
        fragments.bind(&mut bindings);
        assert!(bindings.get("favicon_resources").is_some());
        assert!(bindings.get("style_sheets").is_some());
    }
}
