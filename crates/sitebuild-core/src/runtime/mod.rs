//! External tool detection and invocation
//!
//! This module provides:
//! - Availability checks for inkscape, ImageMagick, sass and Python
//! - The collaborator traits the pipeline calls, with command-backed implementations

pub mod check;
pub mod tool;

pub use check::{check_tool, check_tools, Tool, ToolInfo};
pub use tool::{
    DetachedLauncher, IconPacker, InkscapeRasterizer, MagickPacker, ProcessLauncher, Rasterizer,
    SassCompiler, StylesheetCompiler, ToolManager, tool_manager,
};
