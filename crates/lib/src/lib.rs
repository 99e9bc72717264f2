//! baggr-lib: Core types and logic for baggr
//!
//! baggr turns a declarative package manifest into native OS packages:
//! - `Manifest`: components, metadata and source-to-destination file mappings
//! - `source`: readers over the source tree and the staging writer
//! - `descriptor`: build-root directory planning for the package recipe
//! - `version`: explicit or computed package versions
//! - `worker`: one package builder per package type (currently RPM)
//! - `Engine`: drives a build from manifest to artifacts

pub mod build;
pub mod consts;
pub mod descriptor;
pub mod engine;
pub mod exec;
pub mod manifest;
pub mod rpm;
pub mod source;
pub mod template;
pub mod util;
pub mod version;
pub mod worker;
