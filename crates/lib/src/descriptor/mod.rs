//! Build-root directory planning.
//!
//! Before a package descriptor is rendered, every file entry is classified
//! against the staged build root:
//!
//! - a directory sentinel, or an entry whose target already exists as a
//!   staged directory, becomes a [`Instruction::CreateDir`] (plus a
//!   [`Instruction::CopyTree`] for real directories) and its target is
//!   recorded in the directory set
//! - any other entry records its parent directory in the set
//!
//! The set deduplicates, so each directory is created once no matter how
//! many entries share it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::manifest::{FileEntry, Manifest};
use crate::util::path::{clean, dirname};

/// One step the external builder must perform before packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
  /// Create `destination` beneath the build root.
  CreateDir { destination: String },

  /// Copy the staged tree at `from` into `destination`.
  CopyTree { from: PathBuf, destination: String },
}

/// Directory work derived from a manifest and its staged build root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorPlan {
  /// Per-entry instructions, in manifest order.
  pub instructions: Vec<Instruction>,
  /// Every directory that must exist, cleaned and deduplicated.
  pub directories: BTreeSet<String>,
}

impl DescriptorPlan {
  pub fn from_manifest(manifest: &Manifest, staging_root: &Path) -> Self {
    let mut plan = Self::default();

    for component in manifest.all_components() {
      for entry in &component.files {
        plan.add_entry(entry, staging_root);
      }
    }

    debug!(
      instructions = plan.instructions.len(),
      directories = plan.directories.len(),
      "planned build root"
    );
    plan
  }

  fn add_entry(&mut self, entry: &FileEntry, staging_root: &Path) {
    if entry.is_dir_sentinel() {
      if entry.destination.is_empty() {
        warn!(source = %entry.source, "directory entry without destination, skipping");
        return;
      }
      let destination = clean(&entry.destination);
      self.instructions.push(Instruction::CreateDir {
        destination: destination.clone(),
      });
      self.directories.insert(destination);
      return;
    }

    let target = clean(entry.target());
    if staged_path(staging_root, &target).is_dir() {
      self.instructions.push(Instruction::CreateDir {
        destination: target.clone(),
      });
      self.instructions.push(Instruction::CopyTree {
        from: staged_path(staging_root, &clean(&entry.source)),
        destination: target.clone(),
      });
      self.directories.insert(target);
    } else {
      self.directories.insert(dirname(&target));
    }
  }
}

/// Where a cleaned manifest path lives inside the staging root.
fn staged_path(staging_root: &Path, path: &str) -> PathBuf {
  match path.trim_start_matches('/') {
    "" | "." => staging_root.to_path_buf(),
    relative => staging_root.join(relative),
  }
}
