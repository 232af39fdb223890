//! Prefix-marker inclusion rules for source entries
//!
//! - `!name` - never copied, never routed (directories prune their subtree)
//! - `~name` - files only: copied, but not registered as a route

/// Marker that excludes an entry from copying and routing
pub const EXCLUDE_MARKER: char = '!';

/// Marker that keeps a file out of the route table while still copying it
pub const COPY_ONLY_MARKER: char = '~';

/// Names that are skipped regardless of markers
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];
const IGNORED_DIRS: &[&str] = &[".sass-cache"];

/// Outcome of the inclusion filter for one path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inclusion {
    pub copy: bool,
    pub route: bool,
}

impl Inclusion {
    const NONE: Inclusion = Inclusion {
        copy: false,
        route: false,
    };
    const ALL: Inclusion = Inclusion {
        copy: true,
        route: true,
    };
    const COPY_ONLY: Inclusion = Inclusion {
        copy: true,
        route: false,
    };
}

/// Decide whether an entry is copied and/or routed, from its base name alone
pub fn classify(name: &str, is_dir: bool) -> Inclusion {
    if name.starts_with(EXCLUDE_MARKER) {
        return Inclusion::NONE;
    }

    if is_dir {
        if IGNORED_DIRS.contains(&name) {
            return Inclusion::NONE;
        }
        // `~` has no meaning for directories
        return Inclusion::ALL;
    }

    if IGNORED_FILES.contains(&name) {
        return Inclusion::NONE;
    }
    if name.starts_with(COPY_ONLY_MARKER) {
        return Inclusion::COPY_ONLY;
    }
    Inclusion::ALL
}

/// A walked entry, classified by the inclusion filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Path relative to the walked source directory, always `/`-separated
    pub relative_path: String,
    pub is_directory: bool,
    pub exclude_from_copy: bool,
    pub exclude_from_route: bool,
}

impl PathEntry {
    pub fn new(relative_path: impl Into<String>, is_directory: bool) -> Self {
        let relative_path = relative_path.into();
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str());
        let inclusion = classify(name, is_directory);
        Self {
            exclude_from_copy: !inclusion.copy,
            exclude_from_route: !inclusion.route,
            relative_path,
            is_directory,
        }
    }

    /// Final path segment
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}
