//! Version comparison between the CLI and a project's `requires` field

use anyhow::Result;
use semver::Version;

/// Compare CLI version against the version a project requires
/// Returns a warning message if the CLI is older than the project expects
pub fn check_compatibility(
    cli_version: &str,
    required_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    // unparseable versions can't be compared, no warning
    let cli_ver = parse_version(cli_version).ok()?;
    let required_ver = parse_version(required_version).ok()?;

    if cli_ver < required_ver {
        Some(format!(
            "This project was generated for sitebuild {} or newer.\n\
             You are running version {}.\n\
             Consider updating: {}",
            required_version, cli_version, upgrade_command
        ))
    } else {
        None
    }
}

/// Parse version string, handling a leading 'v'
pub fn parse_version(version_str: &str) -> Result<Version> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPGRADE: &str = "cargo install sitebuild --force";

    #[test]
    fn test_cli_older_than_project() {
        let warning = check_compatibility("0.1.0", "0.2.0", UPGRADE);
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_as_project() {
        assert!(check_compatibility("0.2.0", "0.2.0", UPGRADE).is_none());
    }

    #[test]
    fn test_cli_newer_than_project() {
        assert!(check_compatibility("0.3.0", "v0.2.0", UPGRADE).is_none());
    }

    #[test]
    fn test_invalid_versions() {
        assert!(check_compatibility("invalid", "0.1.0", UPGRADE).is_none());
        assert!(check_compatibility("0.1.0", "soon", UPGRADE).is_none());
    }
}
