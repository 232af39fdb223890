//! Source discovery and route manifests
//!
//! This module provides:
//! - The prefix-marker inclusion filter (`!` and `~`)
//! - Handler name derivation for generated routes
//! - The copying directory walk that feeds route generation
//! - Route descriptors and the uniqueness-enforcing route table

pub mod copier;
pub mod filter;
pub mod naming;
pub mod route;

pub use copier::{collect_routable, walk, Walk};
pub use filter::{classify, Inclusion, PathEntry};
pub use route::{Route, RouteSection, RouteTable};
