use anyhow::Result;

use baggr_lib::consts::APP_NAME;
use baggr_lib::worker::REGISTERED_TYPES;

use crate::output::{OutputFormat, print_info, print_json, print_stat};

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let version = env!("CARGO_PKG_VERSION");

  if output.is_json() {
    return print_json(&serde_json::json!({
      "name": APP_NAME,
      "version": version,
      "package_types": REGISTERED_TYPES,
    }));
  }

  print_info(&format!("{} {}", APP_NAME, version));
  print_stat("Package types", &REGISTERED_TYPES.join(", "));
  Ok(())
}
