//! Charm-style CLI prompts using cliclack

use crate::config::{BuildOptions, ProjectConfig};
use crate::generate::{generate, GenerationReport};
use crate::pipeline::Toolchain;
use crate::resources::fetcher::FetchReport;
use crate::resources::ResourceFetcher;
use crate::runtime::{check, tool_manager, Tool};
use crate::scaffold::{scaffold, ScaffoldOptions};
use crate::{CLI_VERSION, USER_AGENT};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Vendor libraries live here, relative to the sass directory
const VENDOR_DIR: &str = "vendor";

/// Arguments for the new command
#[derive(Debug, Clone, Default)]
pub struct NewArgs {
    /// Project name
    pub name: Option<String>,

    /// Directory the project folder is created in
    pub path: Option<PathBuf>,

    /// Icon source for the project
    pub favicon: Option<PathBuf>,

    /// Extra static resources
    pub resources: Vec<PathBuf>,

    /// Do not fetch vendor stylesheet libraries
    pub skip_fetch: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Arguments for the build command
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    /// Project root (defaults to the current directory)
    pub project: Option<PathBuf>,

    /// Output root that receives the `www` tree
    pub path: Option<PathBuf>,

    pub deploy: bool,
    pub reuse: bool,
    pub serve: bool,
    pub skip_fetch: bool,

    /// Skip the external tool check
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

fn absolute(path: Option<&Path>) -> PathBuf {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match path {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => current_dir.join(p),
        None => current_dir,
    }
}

fn confirm(message: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(cliclack::confirm(message).initial_value(true).interact()?)
}

/// Create a new project with interactive prompts
pub async fn run_new(args: NewArgs) -> Result<()> {
    cliclack::intro("sitebuild new")?;

    let name = match args.name {
        Some(name) => name,
        None if args.yes => "untitled".to_string(),
        None => cliclack::input("Project name")
            .placeholder("untitled")
            .default_input("untitled")
            .interact()?,
    };

    let mut options = ScaffoldOptions::new(name, absolute(args.path.as_deref()));
    options.favicon = args.favicon.as_deref().map(|p| absolute(Some(p)));
    options.resources = args.resources.iter().map(|p| absolute(Some(p.as_path()))).collect();

    let project_dir = options.project_dir();
    if project_dir.exists() {
        cliclack::log::warning(format!(
            "Folder already exists at '{}' with the desired project name",
            project_dir.display()
        ))?;
        if !confirm("Use this folder for the project?", args.yes)? {
            anyhow::bail!("Setup cancelled.");
        }
        options.proceed_if_exists = true;
    }

    let spinner = cliclack::spinner();
    spinner.start("Creating project...");
    let project_dir = match scaffold(&options, CLI_VERSION).await {
        Ok(dir) => dir,
        Err(e) => {
            spinner.stop("Could not create project");
            return Err(e);
        }
    };
    spinner.stop(format!("Created project in {}", project_dir.display()));

    if args.skip_fetch {
        cliclack::log::info("Skipping vendor stylesheet libraries")?;
    } else {
        update_vendor(&project_dir).await?;
    }

    println!();
    println!("  Next steps");
    println!();
    println!("  1.  cd {}", project_dir.display());
    println!("  2.  sitebuild build --serve");

    cliclack::outro("Happy building!")?;
    Ok(())
}

/// Refresh vendor stylesheet libraries for the project in `project`
pub async fn run_vendor(project: Option<PathBuf>) -> Result<()> {
    cliclack::intro("sitebuild vendor")?;
    let project_dir = absolute(project.as_deref());
    update_vendor(&project_dir).await?;
    cliclack::outro("Vendor libraries updated")?;
    Ok(())
}

/// Vendor fetch failures never stop the caller
async fn update_vendor(project_dir: &Path) -> Result<()> {
    let config = ProjectConfig::load(project_dir)?;
    let sass_dir = project_dir.join(&config.layout.sass);
    let fetcher = ResourceFetcher::from_env(USER_AGENT);

    let spinner = cliclack::spinner();
    spinner.start("Fetching stylesheet libraries...");
    match fetcher
        .update_vendor(&config.vendor_resources, &sass_dir, &sass_dir.join(VENDOR_DIR))
        .await
    {
        Ok(report) => {
            spinner.stop(format!(
                "Fetched {} of {} stylesheet libraries",
                report.fetched.len(),
                config.vendor_resources.len()
            ));
            log_fetch_failures(&report)?;
        }
        Err(e) => {
            spinner.stop("Could not update stylesheet libraries");
            cliclack::log::warning(format!("{:#}", e))?;
        }
    }
    Ok(())
}

fn log_fetch_failures(report: &FetchReport) -> Result<()> {
    for failure in &report.failed {
        cliclack::log::warning(&failure.message)?;
    }
    Ok(())
}

/// Build the site with interactive prompts
pub async fn run_build(args: BuildArgs) -> Result<()> {
    cliclack::intro("sitebuild build")?;

    let project_root = absolute(args.project.as_deref());
    let config = ProjectConfig::load(&project_root)?;
    let output_root = match &args.path {
        Some(path) => absolute(Some(path.as_path())),
        None => BuildOptions::default_output_root(args.deploy),
    };

    let mut options = BuildOptions::new(&project_root, output_root);
    options.deploy = args.deploy;
    options.reuse = args.reuse;
    options.serve = args.serve;
    options.skip_fetch = args.skip_fetch;

    if args.skip_tool_check {
        cliclack::log::info("Skipping tool check")?;
    } else {
        let has_icon = options.source(&config.layout.favicon).is_file();
        check_tools(options.deploy, has_icon, args.yes)?;
    }

    let site_root = options.site_root();
    if site_root.exists() && !options.reuse {
        cliclack::log::warning(format!(
            "{} already exists and will be regenerated",
            site_root.display()
        ))?;
        if !confirm("Delete it and continue?", args.yes)? {
            anyhow::bail!("Build cancelled.");
        }
    }

    let tools = Arc::new(Toolchain::system());
    let fetcher = ResourceFetcher::from_env(USER_AGENT);

    let spinner = cliclack::spinner();
    spinner.start("Generating site...");
    let report = match generate(&options, &config, tools, &fetcher).await {
        Ok(report) => report,
        Err(e) => {
            spinner.stop("Generation failed");
            return Err(e);
        }
    };
    spinner.stop(format!(
        "Generated {} routes in {}",
        report.routes,
        report.site_root.display()
    ));

    print_summary(&report)
}

fn check_tools(deploy: bool, has_icon: bool, yes: bool) -> Result<()> {
    let required = Tool::required_for(deploy, has_icon);
    let advisory: Vec<Tool> = [Tool::Inkscape, Tool::ImageMagick, Tool::Sass, Tool::Python]
        .into_iter()
        .filter(|t| !required.contains(t))
        .collect();

    let spinner = cliclack::spinner();
    spinner.start("Checking tools...");

    match check::check_tools(&required, &advisory) {
        Ok(tools) => {
            let info: Vec<String> = tools
                .iter()
                .map(|t| {
                    if t.available {
                        format!("{} ({})", t.name, t.version.as_deref().unwrap_or("unknown"))
                    } else {
                        format!("{} (not installed)", t.name)
                    }
                })
                .collect();
            spinner.stop(format!("Detected tools: {}", info.join(", ")));
            Ok(())
        }
        Err(e) => {
            spinner.stop("Missing tools");
            cliclack::log::error(format!("{}", e))?;
            if !yes {
                offer_docs(&required)?;
            }
            anyhow::bail!("Please install the missing tools and try again.");
        }
    }
}

fn offer_docs(required: &[Tool]) -> Result<()> {
    for &tool in required {
        if check::check_tool(tool).available {
            continue;
        }
        let manager = tool_manager(tool);
        let open: bool = cliclack::confirm(format!(
            "Open {} documentation ({})?",
            manager.config().display_name,
            manager.config().docs_url
        ))
        .initial_value(false)
        .interact()?;
        if open {
            manager.open_docs()?;
        } else {
            cliclack::log::info(format!(
                "{}: {}",
                manager.config().display_name,
                manager.config().install_hint
            ))?;
        }
    }
    Ok(())
}

fn print_summary(report: &GenerationReport) -> Result<()> {
    for warning in &report.warnings {
        cliclack::log::warning(warning)?;
    }
    if !report.fetch.fetched.is_empty() {
        cliclack::log::info(format!("Fetched {}", report.fetch.fetched.join(", ")))?;
    }
    if let Some(archive) = &report.archive {
        cliclack::log::success(format!("Packaged {}", archive.display()))?;
    }
    if report.served {
        cliclack::log::info("Development server started on http://127.0.0.1:8080")?;
    }

    cliclack::outro("Done!")?;
    Ok(())
}
