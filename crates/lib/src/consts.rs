//! Crate-wide constants.

pub const APP_NAME: &str = "baggr";

/// File entry source that means "create an empty directory at the destination".
pub const DIR_SENTINEL: &str = "%DIR%";

/// Value used for mode, uid and gid when the manifest leaves them empty.
pub const DEFAULT_ATTR: &str = "-";

/// Release used when neither the options nor the manifest set one.
pub const DEFAULT_RELEASE: &str = "0";

/// URL rendered into descriptors for manifests without one.
pub const DEFAULT_DOWNLOAD_URL: &str = "http://www.ulabs.uservers.net/no-url";

pub const DEFAULT_TARGET_ARCH: &str = "noarch";

pub const DEFAULT_RPMBUILD: &str = "rpmbuild";

/// Environment variable overriding the rpmbuild executable.
pub const RPMBUILD_ENV: &str = "BAGGR_RPMBUILD";
