//! Sitebuild Core - project scaffolding and static site generation for
//! bottle web projects
//!
//! A project keeps its sources under `dev/` and `res/`. A build walks those
//! sources, copies them into a `www` site tree and writes a bottle server
//! entry with one route per page and per static file, plus a head template
//! with favicon, open-graph and stylesheet tags.
//!
//! # Architecture
//!
//! - **Leaf rules** - [`manifest::filter`] (the `!`/`~` markers) and
//!   [`manifest::naming`] (handler names)
//! - **Manifest builder** - [`manifest::walk`], a copying directory walk
//! - **Template renderer** - [`templates`], banner macros and placeholders
//! - **Resource pipeline** - [`pipeline::ResourcePipeline`], every category
//!   in order, plus icons and stylesheets
//! - **Document assembler** - [`assembler`], writes the rendered documents
//! - **Orchestration** - [`generate()`] and [`scaffold()`], async entry
//!   points used by the CLI
//!
//! External tools sit behind the traits in [`runtime`] so the pipeline can
//! run against fakes.
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts module

pub mod assembler;
pub mod config;
pub mod error;
pub mod generate;
pub mod manifest;
pub mod pipeline;
pub mod resources;
pub mod runtime;
pub mod scaffold;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{BuildOptions, ProjectConfig, SiteLayout, StylesheetRoutes};
pub use error::{BuildError, Result};
pub use generate::{generate, GenerationReport};
pub use manifest::{Route, RouteSection, RouteTable};
pub use pipeline::{Generated, HeadFragments, HeadSection, ResourcePipeline, Toolchain};
pub use scaffold::{scaffold, ScaffoldOptions};

/// CLI version - recorded in new projects and checked against `requires`
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How to get a newer CLI
pub const UPGRADE_COMMAND: &str = "cargo install sitebuild --force";

/// User agent for remote resource requests
pub const USER_AGENT: &str = concat!("sitebuild/", env!("CARGO_PKG_VERSION"));
