//! Reader over a directory of the local filesystem.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::{Opened, Reader, SourceError};
use crate::manifest::FileEntry;
use crate::util::path::{clean, escapes};

/// Reads manifest sources relative to a root directory.
///
/// Sources are always resolved beneath the root: a leading `/` is ignored and
/// sources that climb above the root with `..` are refused.
#[derive(Debug, Clone)]
pub struct FilesystemReader {
  root: PathBuf,
}

impl FilesystemReader {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Map a manifest source onto the host filesystem.
  fn resolve(&self, source: &str) -> Result<PathBuf, SourceError> {
    if escapes(source) {
      return Err(SourceError::InvalidPath(source.to_string()));
    }
    let relative = clean(source);
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() || relative == "." {
      Ok(self.root.clone())
    } else {
      Ok(self.root.join(relative))
    }
  }
}

impl Reader for FilesystemReader {
  fn open_path(&self, entry: &FileEntry) -> Result<Opened, SourceError> {
    let path = self.resolve(&entry.source)?;

    let meta = fs::metadata(&path).map_err(|e| match e.kind() {
      ErrorKind::NotFound => SourceError::NotFound(entry.source.clone()),
      _ => SourceError::Open {
        path: path.clone(),
        source: e,
      },
    })?;

    if meta.is_dir() {
      return Ok(Opened::Directory);
    }

    let file = fs::File::open(&path).map_err(|e| SourceError::Open { path, source: e })?;
    Ok(Opened::File(Box::new(file)))
  }

  fn list_dir_files(&self, path: &str) -> Result<Vec<FileEntry>, SourceError> {
    let base = self.resolve(path)?;
    if !base.exists() {
      return Err(SourceError::NotFound(path.to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&base).follow_links(true).sort_by_file_name() {
      let entry = entry.map_err(|e| SourceError::Walk {
        path: base.clone(),
        source: e,
      })?;
      if entry.file_type().is_dir() {
        continue;
      }

      let relative = entry.path().strip_prefix(&base).unwrap_or(entry.path());
      let source = descendant_source(path, &relative.to_string_lossy());
      debug!(source = %source, "listed source file");
      files.push(FileEntry::new(source, ""));
    }

    Ok(files)
  }
}

/// Spell a descendant of `parent` the same way `parent` was spelled.
fn descendant_source(parent: &str, relative: &str) -> String {
  if relative.is_empty() {
    return parent.to_string();
  }
  let parent = parent.trim_end_matches('/');
  format!("{}/{}", parent, relative)
}
