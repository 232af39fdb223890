//! Identifier derivation for generated route handlers
//!
//! Handler names must be legal Python identifiers and unique within one
//! generated server entry. Derivation is purely textual; uniqueness is
//! enforced by [`RouteTable`](super::route::RouteTable).
//!
//! - `about.tpl` → `load_about`
//! - `blog/my-first-post.tpl` → `load_my_first_post`
//! - `favicon-16x16.png` (static) → `serve_favicon_16x16_png`

/// Prefix for page handlers
pub const PAGE_PREFIX: &str = "load_";

/// Prefix for static-file handlers
pub const STATIC_PREFIX: &str = "serve_";

/// Replace every character that is not `[A-Za-z0-9_]` with `_`
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Final segment of a `/`-separated path
pub fn file_name(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

/// Strip the last extension from a name (`a.b.tpl` → `a.b`, `.hidden` stays)
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Strip the extension from the final segment but keep the directories
pub fn strip_path_extension(relative_path: &str) -> String {
    match relative_path.rfind('/') {
        Some(slash) => format!(
            "{}/{}",
            &relative_path[..slash],
            strip_extension(&relative_path[slash + 1..])
        ),
        None => strip_extension(relative_path).to_string(),
    }
}

/// Handler name for a page route derived from a view's relative path
pub fn page_handler_name(relative_path: &str) -> String {
    format!(
        "{}{}",
        PAGE_PREFIX,
        sanitize(strip_extension(file_name(relative_path)))
    )
}

/// Handler name for a static route derived from its whole URL path
pub fn static_handler_name(url_path: &str) -> String {
    format!("{}{}", STATIC_PREFIX, sanitize(url_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_handler_uses_final_segment() {
        assert_eq!(page_handler_name("index.tpl"), "load_index");
        assert_eq!(page_handler_name("test/testing/testing.tpl"), "load_testing");
    }

    #[test]
    fn test_page_handler_replaces_hyphens() {
        assert_eq!(page_handler_name("my-first-post.tpl"), "load_my_first_post");
    }

    #[test]
    fn test_page_handler_replaces_other_illegal_chars() {
        assert_eq!(page_handler_name("a.b c@d.tpl"), "load_a_b_c_d");
        assert_eq!(page_handler_name("café.tpl"), "load_caf_");
    }

    #[test]
    fn test_leading_digit_is_still_legal_after_prefix() {
        assert_eq!(page_handler_name("404.tpl"), "load_404");
    }

    #[test]
    fn test_static_handler_uses_whole_url() {
        assert_eq!(
            static_handler_name("favicon-16x16.png"),
            "serve_favicon_16x16_png"
        );
        assert_eq!(static_handler_name("docs/a.pdf"), "serve_docs_a_pdf");
    }

    #[test]
    fn test_strip_extension_edge_cases() {
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_extension(".htaccess"), ".htaccess");
        assert_eq!(strip_extension("README"), "README");
    }

    #[test]
    fn test_strip_path_extension_keeps_directories() {
        assert_eq!(strip_path_extension("test/test.tpl"), "test/test");
        assert_eq!(strip_path_extension("about.tpl"), "about");
    }

    #[test]
    fn test_same_basename_collides() {
        // collisions are detected by the route table, not here
        assert_eq!(
            page_handler_name("about.tpl"),
            page_handler_name("blog/about.tpl")
        );
    }
}
