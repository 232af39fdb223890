use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::Colorize;
use sitebuild_core::tui::{self, BuildArgs, NewArgs};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sitebuild")]
#[command(about = "Scaffold and generate bottle web projects")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project skeleton
    New(NewCommand),
    /// Generate the site tree for a project
    Build(BuildCommand),
    /// Refresh vendor stylesheet libraries
    Vendor(VendorCommand),
}

#[derive(ClapArgs, Debug)]
pub struct NewCommand {
    /// Name of the project
    #[arg(default_value = "untitled")]
    pub name: String,

    /// Directory the project folder is created in
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Image used as the favicon source (a square SVG works best)
    #[arg(short, long)]
    pub favicon: Option<PathBuf>,

    /// Additional resources copied into the static files
    #[arg(short, long, num_args = 1..)]
    pub resources: Vec<PathBuf>,

    /// Do not fetch vendor stylesheet libraries
    #[arg(long = "skip-fetch")]
    pub skip_fetch: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(ClapArgs, Debug)]
pub struct BuildCommand {
    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long)]
    pub project: Option<PathBuf>,

    /// Output directory for the www tree (cwd when deploying, temp dir otherwise)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Compile compressed assets and package the site
    #[arg(short, long)]
    pub deploy: bool,

    /// Reuse an existing site tree and already generated resources
    #[arg(short, long)]
    pub reuse: bool,

    /// Start the generated server after a development build
    #[arg(long)]
    pub serve: bool,

    /// Do not fetch remote resources
    #[arg(long = "skip-fetch")]
    pub skip_fetch: bool,

    /// Skip the external tool check
    #[arg(long = "skip-tool-check")]
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(ClapArgs, Debug)]
pub struct VendorCommand {
    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long)]
    pub project: Option<PathBuf>,
}

/// Initialize tracing (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn print_failure(error: &anyhow::Error) {
    eprintln!();
    eprintln!("{}", "*******BUILD FAILED*******".red().bold());
    eprintln!("{}", error);
    let causes: Vec<String> = error.chain().skip(1).map(|c| c.to_string()).collect();
    if !causes.is_empty() {
        eprintln!("Error: {}", causes.join(": "));
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::New(cmd) => {
            tui::run_new(NewArgs {
                name: Some(cmd.name),
                path: cmd.path,
                favicon: cmd.favicon,
                resources: cmd.resources,
                skip_fetch: cmd.skip_fetch,
                yes: cmd.yes,
            })
            .await
        }
        Command::Build(cmd) => {
            tui::run_build(BuildArgs {
                project: cmd.project,
                path: cmd.path,
                deploy: cmd.deploy,
                reuse: cmd.reuse,
                serve: cmd.serve,
                skip_fetch: cmd.skip_fetch,
                skip_tool_check: cmd.skip_tool_check,
                yes: cmd.yes,
            })
            .await
        }
        Command::Vendor(cmd) => tui::run_vendor(cmd.project).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_failure(&e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_flags() {
        let cli = Cli::parse_from(["sitebuild", "-vv", "build", "-d", "-r", "-C", "site", "-y"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Build(cmd) => {
                assert!(cmd.deploy && cmd.reuse && cmd.yes);
                assert!(!cmd.serve);
                assert_eq!(cmd.project, Some(PathBuf::from("site")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_new_defaults_name() {
        let cli = Cli::parse_from(["sitebuild", "new", "-r", "a.txt", "b.txt"]);
        match cli.command {
            Command::New(cmd) => {
                assert_eq!(cmd.name, "untitled");
                assert_eq!(cmd.resources.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
