//! Source directory walking with inclusion filtering and copy-on-walk

use super::filter::{classify, PathEntry};
use crate::error::{BuildError, IoResultExt, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Lazy walk over one source directory
///
/// Every included file is copied to the mirrored location under the
/// destination as the walk reaches it, unless a file already exists there.
/// Only routable files are yielded.
pub struct Walk {
    source: PathBuf,
    destination: PathBuf,
    entries: Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>,
}

/// Walk `source`, copying into `destination`, yielding routable entries
pub fn walk(source: &Path, destination: &Path) -> Result<Walk> {
    if !source.is_dir() {
        return Err(BuildError::io(
            source,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "source directory does not exist",
            ),
        ));
    }
    std::fs::create_dir_all(destination).at(destination)?;

    // excluded directories are pruned before descending
    let entries = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || {
                let name = entry.file_name().to_string_lossy();
                let inclusion = classify(&name, entry.file_type().is_dir());
                inclusion.copy || inclusion.route
            }
        });

    Ok(Walk {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        entries: Box::new(entries),
    })
}

/// Walk to completion, returning routable relative paths
pub fn collect_routable(source: &Path, destination: &Path) -> Result<Vec<String>> {
    walk(source, destination)?
        .map(|entry| entry.map(|e| e.relative_path))
        .collect()
}

impl Walk {
    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.source).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Copy one file into the destination tree; existing files are kept
    fn copy_entry(&self, entry: &DirEntry, relative: &str) -> Result<()> {
        let target = self.destination.join(relative);
        if target.exists() {
            debug!(file = %relative, "keeping existing destination file");
            return Ok(());
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).at(parent)?;
        }
        std::fs::copy(entry.path(), &target).at(entry.path())?;
        debug!(file = %relative, to = %target.display(), "copied");
        Ok(())
    }
}

impl Iterator for Walk {
    type Item = Result<PathEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(BuildError::Walk(e))),
            };
            if entry.file_type().is_dir() {
                continue;
            }

            let relative = self.relative(entry.path());
            let path_entry = PathEntry::new(relative, false);

            if !path_entry.exclude_from_copy {
                if let Err(e) = self.copy_entry(&entry, &path_entry.relative_path) {
                    return Some(Err(e));
                }
            }
            if !path_entry.exclude_from_route {
                return Some(Ok(path_entry));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn file_set(root: &Path) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_walk_yields_sorted_relative_paths() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "b.tpl", "b");
        touch(src.path(), "a.tpl", "a");
        touch(src.path(), "blog/post.tpl", "p");

        let paths = collect_routable(src.path(), dst.path()).unwrap();
        assert_eq!(paths, vec!["a.tpl", "b.tpl", "blog/post.tpl"]);
        assert_eq!(fs::read_to_string(dst.path().join("blog/post.tpl")).unwrap(), "p");
    }

    #[test]
    fn test_excluded_directory_is_pruned() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "!private/secret.txt", "s");
        touch(src.path(), "!private/deeper/more.txt", "m");
        touch(src.path(), "public.txt", "p");

        let paths = collect_routable(src.path(), dst.path()).unwrap();
        assert_eq!(paths, vec!["public.txt"]);
        assert!(!dst.path().join("!private").exists());
    }

    #[test]
    fn test_excluded_file_not_copied() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "!draft.tpl", "d");

        assert!(collect_routable(src.path(), dst.path()).unwrap().is_empty());
        assert!(!dst.path().join("!draft.tpl").exists());
    }

    #[test]
    fn test_copy_only_file_copied_not_yielded() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "~shared.partial", "shared");
        touch(src.path(), "index.tpl", "i");

        let paths = collect_routable(src.path(), dst.path()).unwrap();
        assert_eq!(paths, vec!["index.tpl"]);
        assert!(dst.path().join("~shared.partial").is_file());
    }

    #[test]
    fn test_existing_destination_file_not_overwritten() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "logo.png", "new");
        touch(dst.path(), "logo.png", "kept");

        let paths = collect_routable(src.path(), dst.path()).unwrap();
        assert_eq!(paths, vec!["logo.png"]);
        assert_eq!(fs::read_to_string(dst.path().join("logo.png")).unwrap(), "kept");
    }

    #[test]
    fn test_second_walk_is_idempotent() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "a/b/c.txt", "c");
        touch(src.path(), "~x.txt", "x");

        let first = collect_routable(src.path(), dst.path()).unwrap();
        let files_after_first = file_set(dst.path());
        let second = collect_routable(src.path(), dst.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(files_after_first, file_set(dst.path()));
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dst = TempDir::new().unwrap();
        let err = walk(&dst.path().join("nope"), dst.path()).err().unwrap();
        assert!(matches!(err, BuildError::Io { .. }));
    }

    #[test]
    fn test_walk_is_lazy() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "a.txt", "a");
        touch(src.path(), "b.txt", "b");

        let mut walker = walk(src.path(), dst.path()).unwrap();
        let first = walker.next().unwrap().unwrap();
        assert_eq!(first.relative_path, "a.txt");
        assert!(dst.path().join("a.txt").exists());
        assert!(!dst.path().join("b.txt").exists());
    }
}
