//! Deployment packaging

use crate::error::{BuildError, IoResultExt, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Packs a directory into a single archive
pub trait Archiver {
    /// Archive `source_dir` into `output`, entries prefixed with the directory name
    fn archive(&self, source_dir: &Path, output: &Path) -> Result<PathBuf>;
}

/// Deflate-compressed zip archives
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn archive(&self, source_dir: &Path, output: &Path) -> Result<PathBuf> {
        if output.starts_with(source_dir) {
            return Err(BuildError::InvalidDestination(output.to_path_buf()));
        }

        let prefix = source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file = File::create(output).at(output)?;
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut files = 0usize;
        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(source_dir)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let name = if rel.is_empty() {
                prefix.clone()
            } else if prefix.is_empty() {
                rel
            } else {
                format!("{}/{}", prefix, rel)
            };

            if entry.file_type().is_dir() {
                if !name.is_empty() {
                    zip.add_directory(format!("{}/", name), options)?;
                }
                continue;
            }

            let content = std::fs::read(entry.path()).at(entry.path())?;
            zip.start_file(name, options)?;
            zip.write_all(&content).at(output)?;
            files += 1;
        }

        zip.finish()?;
        info!(files, archive = %output.display(), "packaged site");
        Ok(output.to_path_buf())
    }
}
