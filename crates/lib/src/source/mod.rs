//! Source readers and writers.
//!
//! A [`Reader`] is a view over wherever manifest sources live: it opens a
//! path or lists the files beneath a directory. A [`Writer`] materializes
//! reader content into a staging directory that later serves as the package
//! build root.

mod dir_writer;
mod fs_reader;

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::build::cancel::{CancelToken, Interrupted};
use crate::manifest::FileEntry;

pub use dir_writer::DirWriter;
pub use fs_reader::FilesystemReader;

/// A readable source stream. Dropping it closes the underlying handle.
pub type SourceStream = Box<dyn Read + Send>;

/// Outcome of opening a source path.
pub enum Opened {
  /// The path is a regular file; read its content from the stream.
  File(SourceStream),
  /// The path is a directory; list it with [`Reader::list_dir_files`].
  Directory,
}

impl std::fmt::Debug for Opened {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Opened::File(_) => write!(f, "File(..)"),
      Opened::Directory => write!(f, "Directory"),
    }
  }
}

/// Errors raised while reading sources or writing the staging directory.
#[derive(Debug, Error)]
pub enum SourceError {
  #[error("no staging directory set")]
  NoStagingRoot,

  #[error("source path not found: {0}")]
  NotFound(String),

  #[error("source path escapes the source root: {0}")]
  InvalidPath(String),

  #[error("access violation: {} resolves outside {}", path.display(), root.display())]
  AccessViolation { path: PathBuf, root: PathBuf },

  #[error("expected a file but found a directory: {0}")]
  UnexpectedDirectory(String),

  #[error("failed to open {}: {source}", path.display())]
  Open { path: PathBuf, source: std::io::Error },

  #[error("failed to list {}: {source}", path.display())]
  Walk { path: PathBuf, source: walkdir::Error },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to create file {}: {source}", path.display())]
  CreateFile { path: PathBuf, source: std::io::Error },

  #[error("failed to copy data stream to {}: {source}", path.display())]
  Copy { path: PathBuf, source: std::io::Error },

  #[error(transparent)]
  Interrupted(#[from] Interrupted),
}

impl SourceError {
  /// Returns true if a resolved destination left the staging root.
  pub fn is_access_violation(&self) -> bool {
    matches!(self, SourceError::AccessViolation { .. })
  }
}

/// Read access to the files a manifest refers to.
pub trait Reader {
  /// Open the entry's source path.
  ///
  /// Directories are reported as [`Opened::Directory`], never as an error.
  fn open_path(&self, entry: &FileEntry) -> Result<Opened, SourceError>;

  /// List every file beneath `path`, recursively, in a stable order.
  ///
  /// Directory entries themselves are not included. Each returned entry's
  /// `source` is the full descendant path, spelled relative to `path` the way
  /// `path` itself was spelled; `destination` is left empty.
  fn list_dir_files(&self, path: &str) -> Result<Vec<FileEntry>, SourceError>;
}

/// Write access to a staging directory.
pub trait Writer {
  /// Copy every entry from `reader` into the staging directory, in order.
  fn copy_paths(&self, reader: &dyn Reader, files: &[FileEntry], cancel: &CancelToken) -> Result<(), SourceError>;

  /// The staging directory root.
  fn path(&self) -> &Path;
}
