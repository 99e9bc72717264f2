//! Writer that stages sources into a local directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Opened, Reader, SourceError, SourceStream, Writer};
use crate::build::cancel::CancelToken;
use crate::manifest::FileEntry;
use crate::util::path::clean;

/// Copies reader content into `root`, which becomes the package build root.
#[derive(Debug, Clone)]
pub struct DirWriter {
  root: PathBuf,
}

impl DirWriter {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Copy every file beneath a source directory.
  ///
  /// When the entry carries a destination, the entry's source prefix on each
  /// descendant is replaced by that destination.
  fn copy_directory(&self, reader: &dyn Reader, entry: &FileEntry, cancel: &CancelToken) -> Result<(), SourceError> {
    let prefix = entry.source.trim_end_matches('/');
    let children = reader.list_dir_files(&entry.source)?;
    debug!(source = %entry.source, files = children.len(), "copying directory");

    for mut child in children {
      cancel.check()?;

      if !entry.destination.is_empty() {
        let suffix = child.source.strip_prefix(prefix).unwrap_or(&child.source);
        child.destination = format!("{}{}", entry.destination, suffix);
      }

      match reader.open_path(&child)? {
        Opened::File(stream) => self.copy_file(stream, &child)?,
        Opened::Directory => return Err(SourceError::UnexpectedDirectory(child.source)),
      }
    }

    Ok(())
  }

  /// Stream one source into the staging directory.
  ///
  /// The stream is consumed, so it is closed exactly once whatever the
  /// outcome.
  fn copy_file(&self, mut stream: SourceStream, entry: &FileEntry) -> Result<(), SourceError> {
    let dest = self.resolve(entry.target())?;

    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).map_err(|e| SourceError::CreateDir {
        path: parent.to_path_buf(),
        source: e,
      })?;
    }

    let mut file = fs::File::create(&dest).map_err(|e| SourceError::CreateFile {
      path: dest.clone(),
      source: e,
    })?;
    let bytes = io::copy(&mut stream, &mut file).map_err(|e| SourceError::Copy {
      path: dest.clone(),
      source: e,
    })?;

    debug!(dest = %dest.display(), bytes, "staged file");
    Ok(())
  }

  /// Resolve a manifest target to a path strictly inside the staging root.
  fn resolve(&self, target: &str) -> Result<PathBuf, SourceError> {
    let root = clean(&self.root.to_string_lossy());
    let resolved = PathBuf::from(clean(&format!("{}/{}", root, clean(target))));
    let root = PathBuf::from(root);

    if resolved == root || !resolved.starts_with(&root) {
      return Err(SourceError::AccessViolation { path: resolved, root });
    }
    Ok(resolved)
  }
}

impl Writer for DirWriter {
  fn copy_paths(&self, reader: &dyn Reader, files: &[FileEntry], cancel: &CancelToken) -> Result<(), SourceError> {
    if self.root.as_os_str().is_empty() {
      return Err(SourceError::NoStagingRoot);
    }

    info!(root = %self.root.display(), entries = files.len(), "staging sources");

    for entry in files {
      cancel.check()?;

      if entry.is_dir_sentinel() {
        continue;
      }

      match reader.open_path(entry)? {
        Opened::Directory => self.copy_directory(reader, entry, cancel)?,
        Opened::File(stream) => self.copy_file(stream, entry)?,
      }
    }

    Ok(())
  }

  fn path(&self) -> &Path {
    &self.root
  }
}
