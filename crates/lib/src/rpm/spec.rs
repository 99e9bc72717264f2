//! RPM spec file rendering.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use super::RpmError;
use crate::consts::DEFAULT_DOWNLOAD_URL;
use crate::descriptor::{DescriptorPlan, Instruction};
use crate::manifest::{Component, FileEntry, Manifest};
use crate::template;
use crate::util::path::clean;
use crate::version::Version;

/// The spec file template.
pub const SPEC_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/rpm.spec"));

/// Render the spec file for `manifest` against a staged build root.
///
/// The manifest is cloned and defaulted before rendering; the caller's copy is
/// left untouched.
pub fn render_spec(manifest: &Manifest, version: &Version, staging_root: &Path) -> Result<String, RpmError> {
  if manifest.component.files.is_empty() {
    return Err(RpmError::NoFiles);
  }

  let mut manifest = manifest.clone();
  manifest.ensure_defaults();
  if manifest.url.is_empty() {
    manifest.url = DEFAULT_DOWNLOAD_URL.to_string();
  }

  let plan = DescriptorPlan::from_manifest(&manifest, staging_root);
  let main = &manifest.component;

  let mut values = BTreeMap::new();
  values.insert("name", main.name.clone());
  values.insert("version", version.version.clone());
  values.insert("release", version.release.clone());
  values.insert("summary", main.summary.clone());
  values.insert("license", main.license.clone());
  values.insert("url", manifest.url.clone());
  values.insert("preamble", preamble(main));
  values.insert("description", main.description.clone());
  values.insert("subpackages", subpackages(&manifest));
  values.insert("prep", prep(&plan));
  values.insert("files", files_section(&main.files));
  values.insert("subpackage_files", subpackage_files(&manifest));

  Ok(template::render(SPEC_TEMPLATE, &values)?)
}

/// Write rendered spec text to a fresh temporary file and return its path.
pub fn write_spec(text: &str) -> Result<PathBuf, RpmError> {
  let mut file = tempfile::Builder::new()
    .prefix("rpmbuilder-")
    .suffix(".spec")
    .tempfile()
    .map_err(|e| RpmError::WriteSpec { source: e })?;
  file
    .write_all(text.as_bytes())
    .map_err(|e| RpmError::WriteSpec { source: e })?;

  let (_, path) = file.keep().map_err(|e| RpmError::WriteSpec { source: e.error })?;
  info!(path = %path.display(), "wrote RPM spec file");
  Ok(path)
}

/// A manifest path spelled relative to `%{buildroot}`.
///
/// The build root itself (`/` or `.`) renders as the empty string.
fn buildroot_path(path: &str) -> String {
  match clean(path).trim_start_matches('/') {
    "" | "." => String::new(),
    relative => format!("/{}", relative),
  }
}

/// An absolute install path for the `%files` list.
fn install_path(path: &str) -> String {
  let path = buildroot_path(path);
  if path.is_empty() { "/".to_string() } else { path }
}

fn preamble(component: &Component) -> String {
  let mut out = String::new();
  if !component.requires.is_empty() {
    out.push_str(&format!("Requires: {}\n", component.requires_string()));
  }
  if component.no_deps {
    out.push_str("AutoReqProv: no\n");
  }
  out
}

fn subpackages(manifest: &Manifest) -> String {
  let mut out = String::new();
  for component in &manifest.components {
    let summary = if component.summary.is_empty() {
      &manifest.component.summary
    } else {
      &component.summary
    };
    let license = if component.license.is_empty() {
      &manifest.component.license
    } else {
      &component.license
    };

    out.push_str(&format!("\n%package -n {}\n", component.name));
    out.push_str(&format!("Summary: {}\n", summary));
    out.push_str(&format!("License: {}\n", license));
    out.push_str(&preamble(component));
    out.push_str(&format!("\n%description -n {}\n{}\n", component.name, component.description));
  }
  out
}

fn prep(plan: &DescriptorPlan) -> String {
  let mut out = String::new();

  for instruction in &plan.instructions {
    match instruction {
      Instruction::CreateDir { destination } => {
        out.push_str(&format!("%{{__mkdir_p}} {}\n", in_buildroot(destination)));
      }
      Instruction::CopyTree { from, destination } => {
        out.push_str(&format!(
          "%{{__cp}} -rL {}/* {} || :\n",
          shell_quote(&from.display().to_string()),
          in_buildroot(destination)
        ));
      }
    }
  }

  // `/` and `.` both name the build root
  let directories: BTreeSet<String> = plan.directories.iter().map(|d| buildroot_path(d)).collect();
  for dir in &directories {
    out.push_str(&format!("%{{__mkdir_p}} {} || exit 111\n", shell_quote(&format!("%{{buildroot}}{}", dir))));
  }

  out
}

fn in_buildroot(path: &str) -> String {
  shell_quote(&format!("%{{buildroot}}{}", buildroot_path(path)))
}

/// Double-quote `word` for the `%prep` shell, leaving rpm macros expandable.
fn shell_quote(word: &str) -> String {
  let mut quoted = String::with_capacity(word.len() + 2);
  quoted.push('"');
  for c in word.chars() {
    if matches!(c, '"' | '\\' | '$' | '`') {
      quoted.push('\\');
    }
    quoted.push(c);
  }
  quoted.push('"');
  quoted
}

fn file_line(entry: &FileEntry) -> Option<String> {
  let attr = format!("%attr({}, {}, {})", entry.mode, entry.uid, entry.gid);
  if entry.is_dir_sentinel() {
    if entry.destination.is_empty() {
      return None;
    }
    return Some(format!("{} %dir {}", attr, install_path(&entry.destination)));
  }
  Some(format!("{} {}", attr, install_path(entry.target())))
}

fn files_section(files: &[FileEntry]) -> String {
  files.iter().filter_map(file_line).collect::<Vec<_>>().join("\n")
}

fn subpackage_files(manifest: &Manifest) -> String {
  let mut out = String::new();
  for component in &manifest.components {
    out.push_str(&format!("\n%files -n {}\n", component.name));
    out.push_str(&files_section(&component.files));
    out.push('\n');
  }
  out
}
