//! Template values, banner macros, and placeholder rendering
//!
//! Rendering happens in two explicit passes: banner macros are expanded
//! when a [`TemplateSpec`] is built, placeholders are substituted by
//! [`render`].

pub mod builtin;
pub mod render;
pub mod spec;

pub use builtin::TemplateSet;
pub use render::{render, render_to_file, Bindings, Value};
pub use spec::{expand_macros, BannerWidths, TemplateSpec};
