//! Template values and banner macro expansion
//!
//! Raw template text may contain three banner macros, expanded once when a
//! [`TemplateSpec`] is built:
//!
//! - `$ph{Label}` - primary banner for code files (three lines, upper-cased)
//! - `$sh{Label}` - secondary, single-line banner for code files
//! - `$wh{Label}` - HTML comment banner for markup files
//!
//! Every banner line is exactly as wide as the configured width for its
//! kind, as long as the label fits.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

static MACRO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(ph|sh|wh)\{([^}\n]*)\}").expect("valid macro pattern"));

pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder pattern")
});

/// Banner widths for code and markup templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerWidths {
    pub code_width: usize,
    pub markup_width: usize,
}

impl Default for BannerWidths {
    fn default() -> Self {
        Self {
            code_width: 80,
            markup_width: 120,
        }
    }
}

/// `#####` rule with the upper-cased label, framed by full-width rules
pub fn primary_header(label: &str, width: usize) -> String {
    let rule = "#".repeat(width);
    let fill = "#".repeat(width.saturating_sub(label.chars().count() + 7));
    format!(
        "\n\n{rule}\n##### {} {fill}\n{rule}\n",
        label.to_uppercase()
    )
}

/// Single `###` line with the label as written
pub fn secondary_header(label: &str, width: usize) -> String {
    let fill = "#".repeat(width.saturating_sub(label.chars().count() + 5));
    format!("\n### {label} {fill}")
}

/// HTML comment banner
pub fn markup_header(label: &str, width: usize) -> String {
    let fill = "*".repeat(width.saturating_sub(label.chars().count() + 16));
    format!("<!-- ***** {label} {fill} -->")
}

/// Expand every well-formed banner macro; malformed ones stay verbatim
pub fn expand_macros(raw: &str, widths: BannerWidths) -> String {
    MACRO_RE
        .replace_all(raw, |caps: &Captures| {
            let label = &caps[2];
            match &caps[1] {
                "ph" => primary_header(label, widths.code_width),
                "sh" => secondary_header(label, widths.code_width),
                _ => markup_header(label, widths.markup_width),
            }
        })
        .into_owned()
}

/// An immutable template: macro-expanded text plus its placeholder names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    raw_text: Arc<str>,
    placeholders: Arc<BTreeSet<String>>,
}

impl TemplateSpec {
    /// Build a template with the default banner widths
    pub fn new(raw: &str) -> Self {
        Self::with_widths(raw, BannerWidths::default())
    }

    /// Build a template, expanding banner macros with the given widths
    pub fn with_widths(raw: &str, widths: BannerWidths) -> Self {
        let text = expand_macros(raw, widths);
        let placeholders = PLACEHOLDER_RE
            .captures_iter(&text)
            .map(|caps| caps[1].to_string())
            .collect();
        Self {
            raw_text: Arc::from(text),
            placeholders: Arc::new(placeholders),
        }
    }

    /// Macro-expanded text, placeholders still in place
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Names of every `${name}` placeholder in the template
    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }
}
