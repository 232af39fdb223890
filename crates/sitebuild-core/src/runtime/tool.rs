//! External tools the generator shells out to
//!
//! Each collaborator is a small trait so the pipeline can run against real
//! binaries or in-process fakes:
//!
//! - [`Rasterizer`] - vector icon to PNG at a given size (inkscape)
//! - [`IconPacker`] - PNG renditions to one multi-resolution ICO (ImageMagick)
//! - [`StylesheetCompiler`] - sass entry point to CSS (dart-sass)
//! - [`ProcessLauncher`] - fire-and-forget background processes

use super::check::Tool;
use crate::error::{BuildError, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Renders a vector image to a PNG of the given size
pub trait Rasterizer {
    fn rasterize(&self, source: &Path, output: &Path, width: u32, height: u32) -> Result<()>;
}

/// Combines PNG renditions into one `.ico` file
pub trait IconPacker {
    fn pack(&self, pngs: &[PathBuf], output: &Path) -> Result<()>;
}

/// Compiles one stylesheet entry point
pub trait StylesheetCompiler {
    fn compile(&self, entry: &Path, output: &Path, compressed: bool) -> Result<()>;

    /// Program name used by generated watcher scripts
    fn program(&self) -> &str;
}

/// Starts processes the generator never waits for
pub trait ProcessLauncher {
    fn spawn_detached(&self, program: &str, args: &[String], cwd: &Path) -> Result<()>;
}

/// Run a tool to completion, mapping launch and exit failures
fn run_tool(tool: &'static str, command: &mut Command) -> Result<()> {
    debug!(tool, command = ?command, "running");
    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|source| BuildError::ToolUnavailable { tool, source })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(BuildError::ToolFailed {
        tool,
        detail: if stderr.is_empty() {
            format!("exit code {}", output.status.code().unwrap_or(-1))
        } else {
            stderr
        },
    })
}

/// Inkscape 1.x command line export
#[derive(Debug, Clone, Default)]
pub struct InkscapeRasterizer;

impl Rasterizer for InkscapeRasterizer {
    fn rasterize(&self, source: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
        run_tool(
            "inkscape",
            Command::new("inkscape")
                .arg("--export-type=png")
                .arg(format!("--export-filename={}", output.display()))
                .arg("-w")
                .arg(width.to_string())
                .arg("-h")
                .arg(height.to_string())
                .arg(source),
        )
    }
}

/// ImageMagick, either the v7 `magick` binary or the legacy `convert`
#[derive(Debug, Clone)]
pub struct MagickPacker {
    program: &'static str,
}

impl MagickPacker {
    /// Prefer `magick`, fall back to `convert`
    pub fn detect() -> Self {
        let program = if imagemagick_tool().is_installed() {
            "magick"
        } else {
            "convert"
        };
        Self { program }
    }
}

impl IconPacker for MagickPacker {
    fn pack(&self, pngs: &[PathBuf], output: &Path) -> Result<()> {
        run_tool("imagemagick", Command::new(self.program).args(pngs).arg(output))
    }
}

/// dart-sass command line compiler
#[derive(Debug, Clone)]
pub struct SassCompiler {
    program: String,
}

impl Default for SassCompiler {
    fn default() -> Self {
        Self {
            program: "sass".to_string(),
        }
    }
}

impl StylesheetCompiler for SassCompiler {
    fn compile(&self, entry: &Path, output: &Path, compressed: bool) -> Result<()> {
        let mut command = Command::new(&self.program);
        if compressed {
            command.arg("--style=compressed").arg("--no-source-map");
        }
        run_tool("sass", command.arg(entry).arg(output))
    }

    fn program(&self) -> &str {
        &self.program
    }
}

/// Spawns background processes detached from the generator's terminal
#[derive(Debug, Clone, Default)]
pub struct DetachedLauncher;

impl ProcessLauncher for DetachedLauncher {
    fn spawn_detached(&self, program: &str, args: &[String], cwd: &Path) -> Result<()> {
        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // own process group, so Ctrl+C in the generator's terminal does not reach it
            command.process_group(0);
        }

        let tool: &'static str = "background process";
        let child = command
            .spawn()
            .map_err(|source| BuildError::ToolUnavailable { tool, source })?;
        debug!(program, pid = child.id(), "launched detached");
        Ok(())
    }
}

/// Configuration for a CLI tool
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Name of the tool binary (e.g., "sass")
    pub name: &'static str,
    /// Display name for user-facing messages
    pub display_name: &'static str,
    /// Where to get it
    pub install_hint: &'static str,
    /// URL to the documentation
    pub docs_url: &'static str,
}

/// Manager for checking CLI tools
pub struct ToolManager {
    config: ToolConfig,
}

impl ToolManager {
    /// Create a new tool manager with the given configuration
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Get the tool configuration
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Check if the tool is installed and available in PATH
    pub fn is_installed(&self) -> bool {
        Command::new("which")
            .arg(self.config.name)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Open the tool's documentation in the default browser
    pub fn open_docs(&self) -> anyhow::Result<()> {
        println!(
            "{}",
            format!(
                "Opening {} documentation in your browser...",
                self.config.display_name
            )
            .cyan()
        );
        open::that(self.config.docs_url)?;
        Ok(())
    }
}

/// Pre-configured tool manager for inkscape
pub fn inkscape_tool() -> ToolManager {
    ToolManager::new(ToolConfig {
        name: "inkscape",
        display_name: "Inkscape",
        install_hint: "install from https://inkscape.org",
        docs_url: "https://inkscape.org/doc/inkscape-man.html",
    })
}

/// Pre-configured tool manager for ImageMagick
pub fn imagemagick_tool() -> ToolManager {
    ToolManager::new(ToolConfig {
        name: "magick",
        display_name: "ImageMagick",
        install_hint: "install from https://imagemagick.org",
        docs_url: "https://imagemagick.org/script/command-line-processing.php",
    })
}

/// Pre-configured tool manager for dart-sass
pub fn sass_tool() -> ToolManager {
    ToolManager::new(ToolConfig {
        name: "sass",
        display_name: "Sass",
        install_hint: "install from https://sass-lang.com/install",
        docs_url: "https://sass-lang.com/documentation/cli/dart-sass",
    })
}

/// Pre-configured tool manager for the Python interpreter
pub fn python_tool() -> ToolManager {
    ToolManager::new(ToolConfig {
        name: crate::config::generator::detect_python(),
        display_name: "Python 3",
        install_hint: "install from https://python.org",
        docs_url: "https://docs.python.org/3/",
    })
}

/// Tool manager for a checked tool
pub fn tool_manager(tool: Tool) -> ToolManager {
    match tool {
        Tool::Inkscape => inkscape_tool(),
        Tool::ImageMagick => imagemagick_tool(),
        Tool::Sass => sass_tool(),
        Tool::Python => python_tool(),
    }
}
