//! Availability checks for the external tools a build shells out to

use anyhow::Result;
use std::fmt;
use std::process::Command;

/// External tools used by the resource pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Inkscape,
    ImageMagick,
    Sass,
    Python,
}

impl Tool {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Inkscape => "Inkscape",
            Tool::ImageMagick => "ImageMagick",
            Tool::Sass => "Sass",
            Tool::Python => "Python 3",
        }
    }

    /// Binaries probed in order; the first that answers wins
    fn candidates(&self) -> &'static [&'static str] {
        match self {
            Tool::Inkscape => &["inkscape"],
            Tool::ImageMagick => &["magick", "convert"],
            Tool::Sass => &["sass"],
            Tool::Python => &["python3", "python"],
        }
    }

    fn install_hint(&self) -> &'static str {
        match self {
            Tool::Inkscape => "Inkscape (install from https://inkscape.org)",
            Tool::ImageMagick => "ImageMagick (install from https://imagemagick.org)",
            Tool::Sass => "Sass (install from https://sass-lang.com/install)",
            Tool::Python => "Python 3 (install from https://python.org)",
        }
    }

    /// Tools a build needs, given its mode and whether an icon source exists
    pub fn required_for(deploy: bool, has_icon: bool) -> Vec<Tool> {
        let mut tools = vec![Tool::Sass];
        if !deploy {
            tools.push(Tool::Python);
        }
        if has_icon {
            tools.push(Tool::Inkscape);
            tools.push(Tool::ImageMagick);
        }
        tools
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: &'static str,
    pub binary: Option<&'static str>,
    pub version: Option<String>,
    pub available: bool,
}

/// Probe one binary with `--version`
fn probe(binary: &str) -> Option<String> {
    match Command::new(binary).arg("--version").output() {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            // python 2 prints its version on stderr
            let text = if stdout.trim().is_empty() {
                String::from_utf8_lossy(&out.stderr).into_owned()
            } else {
                stdout.into_owned()
            };
            Some(text.lines().next().unwrap_or_default().trim().to_string())
        }
        _ => None,
    }
}

/// Check if a tool is available under any of its binary names
pub fn check_tool(tool: Tool) -> ToolInfo {
    for binary in tool.candidates() {
        if let Some(version) = probe(binary) {
            return ToolInfo {
                name: tool.display_name(),
                binary: Some(binary),
                version: Some(version),
                available: true,
            };
        }
    }
    ToolInfo {
        name: tool.display_name(),
        binary: None,
        version: None,
        available: false,
    }
}

/// Check tools; tools in `advisory` get availability reported but don't cause failure.
pub fn check_tools(required: &[Tool], advisory: &[Tool]) -> Result<Vec<ToolInfo>> {
    check_with(required, advisory, check_tool)
}

fn check_with(
    tools: &[Tool],
    advisory: &[Tool],
    probe_tool: impl Fn(Tool) -> ToolInfo,
) -> Result<Vec<ToolInfo>> {
    let mut results = Vec::new();
    let mut missing = Vec::new();

    let mut seen = Vec::new();
    for &tool in tools.iter().chain(advisory) {
        if seen.contains(&tool) {
            continue;
        }
        seen.push(tool);

        let info = probe_tool(tool);
        // a tool listed as required stays required even if also advisory
        if info.available || !tools.contains(&tool) {
            results.push(info);
        } else {
            missing.push(tool.install_hint());
        }
    }

    if !missing.is_empty() {
        anyhow::bail!(
            "Missing required tools:\n{}",
            missing
                .iter()
                .map(|m| format!("  - {}", m))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    Ok(results)
}
