//! Lexical path helpers.
//!
//! Manifest paths are slash-separated strings regardless of host, so these
//! helpers work on `&str` and never touch the filesystem.

/// Return the shortest lexically equivalent form of `path`.
///
/// - repeated slashes collapse to one
/// - `.` segments are dropped
/// - `..` removes the preceding segment; at the root of a rooted path it is
///   dropped, in a relative path it is kept
/// - an empty result becomes `.`
///
/// ```
/// use baggr_lib::util::path::clean;
///
/// assert_eq!(clean("/a/./b/../c//"), "/a/c");
/// assert_eq!(clean("/../etc"), "/etc");
/// assert_eq!(clean("../x"), "../x");
/// assert_eq!(clean(""), ".");
/// ```
pub fn clean(path: &str) -> String {
  if path.is_empty() {
    return ".".to_string();
  }

  let rooted = path.starts_with('/');
  let mut parts: Vec<&str> = Vec::new();

  for part in path.split('/') {
    match part {
      "" | "." => {}
      ".." => {
        if parts.last().is_some_and(|p| *p != "..") {
          parts.pop();
        } else if !rooted {
          parts.push("..");
        }
      }
      other => parts.push(other),
    }
  }

  let joined = parts.join("/");
  if rooted {
    format!("/{}", joined)
  } else if joined.is_empty() {
    ".".to_string()
  } else {
    joined
  }
}

/// Return all but the last element of `path`, cleaned.
///
/// A path without a slash has `.` as its directory.
pub fn dirname(path: &str) -> String {
  match path.rfind('/') {
    Some(idx) => clean(&path[..=idx]),
    None => ".".to_string(),
  }
}

/// Returns true if the cleaned `path` climbs above its starting point.
pub fn escapes(path: &str) -> bool {
  let cleaned = clean(path);
  cleaned == ".." || cleaned.starts_with("../")
}
