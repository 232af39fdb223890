//! Placeholder substitution
//!
//! Substitution is safe: placeholders without a binding are left as they
//! are, so a template can be rendered in several passes.

use super::spec::{TemplateSpec, PLACEHOLDER_RE};
use crate::error::{IoResultExt, Result};
use regex::Captures;
use std::collections::HashMap;
use std::path::Path;

/// Value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    /// Sub-templates rendered in order and joined with newlines
    List(Vec<(TemplateSpec, Bindings)>),
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<(TemplateSpec, Bindings)>> for Value {
    fn from(items: Vec<(TemplateSpec, Bindings)>) -> Self {
        Value::List(items)
    }
}

/// Placeholder name to value mapping for one render call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(HashMap<String, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn resolve(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::List(items) => items
            .iter()
            .map(|(spec, bindings)| render(spec, bindings))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Substitute bound placeholders; unbound ones stay verbatim
pub fn render(template: &TemplateSpec, bindings: &Bindings) -> String {
    if bindings.is_empty() {
        return template.raw_text().to_string();
    }

    // resolve each bound list once, even if its placeholder repeats
    let resolved: HashMap<&str, String> = template
        .placeholders()
        .iter()
        .filter_map(|name| bindings.get(name).map(|v| (name.as_str(), resolve(v))))
        .collect();

    PLACEHOLDER_RE
        .replace_all(template.raw_text(), |caps: &Captures| {
            match resolved.get(&caps[1]) {
                Some(text) => text.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Render and write to `path`, replacing any previous content
pub fn render_to_file(template: &TemplateSpec, bindings: &Bindings, path: &Path) -> Result<()> {
    let text = render(template, bindings);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).at(parent)?;
    }
    std::fs::write(path, text).at(path)
}
