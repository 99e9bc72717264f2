//! Placeholder substitution for descriptor templates.
//!
//! Templates are plain text with `$${key}` placeholders. Every placeholder
//! must be bound to a value; unknown keys are an error rather than being left
//! in the output.
//!
//! # Shell Variables
//!
//! Single `$` characters pass through unchanged, so RPM macros like `%{name}`
//! and shell variables like `$RPM_BUILD_ROOT` need no escaping.
//!
//! # Escaping
//!
//! Use `$$$` before `{` to produce a literal `$${` sequence.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use baggr_lib::template::render;
//!
//! let mut values = BTreeMap::new();
//! values.insert("name", "hello".to_string());
//!
//! let out = render("Name: $${name} in $RPM_BUILD_ROOT", &values).unwrap();
//! assert_eq!(out, "Name: hello in $RPM_BUILD_ROOT");
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

/// A segment of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no placeholders)
  Literal(String),

  /// A placeholder key to be substituted
  Placeholder(String),
}

/// Errors that can occur while parsing or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("empty placeholder at position {0}")]
  Empty(usize),

  #[error("no value bound for placeholder: {0}")]
  Unbound(String),
}

/// Parse template text into literal and placeholder segments.
pub fn parse(input: &str) -> Result<Vec<Segment>, TemplateError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    if !matches!(chars.peek(), Some((_, '$'))) {
      literal.push('$');
      continue;
    }
    chars.next(); // second $

    match chars.peek() {
      Some((_, '$')) => {
        chars.next(); // third $
        if matches!(chars.peek(), Some((_, '{'))) {
          chars.next();
          literal.push_str("$${");
        } else {
          literal.push_str("$$$");
        }
      }
      Some((_, '{')) => {
        chars.next();

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let mut key = String::new();
        let mut found_close = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            found_close = true;
            break;
          }
          key.push(c);
        }

        if !found_close {
          return Err(TemplateError::Unclosed(pos));
        }
        let key = key.trim();
        if key.is_empty() {
          return Err(TemplateError::Empty(pos));
        }
        segments.push(Segment::Placeholder(key.to_string()));
      }
      _ => literal.push_str("$$"),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Render a template, substituting every placeholder from `values`.
pub fn render(input: &str, values: &BTreeMap<&str, String>) -> Result<String, TemplateError> {
  let segments = parse(input)?;
  let mut out = String::with_capacity(input.len());

  for segment in &segments {
    match segment {
      Segment::Literal(text) => out.push_str(text),
      Segment::Placeholder(key) => {
        let value = values
          .get(key.as_str())
          .ok_or_else(|| TemplateError::Unbound(key.clone()))?;
        out.push_str(value);
      }
    }
  }

  Ok(out)
}
