//! The `;KEY=V1,V2` argument list between a property name and its value.

use serde::Serialize;

use crate::{
  error::{Error, Result},
  registry::{BareFlags, Syntax},
};

/// A parsed property argument (parameter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Argument {
  /// Upper-cased argument name, e.g. `TYPE`, `LANGUAGE`, `X-FOO`.
  pub name:   String,
  pub values: Vec<String>,
  /// Written as a legacy bare flag (`;HOME`) rather than `KEY=VALUE`.
  pub bare:   bool,
}

impl Argument {
  pub fn new(name: &str, values: Vec<String>) -> Self {
    Self { name: name.to_ascii_uppercase(), values, bare: false }
  }

  pub fn single(name: &str, value: impl Into<String>) -> Self {
    Self::new(name, vec![value.into()])
  }

  /// First value, if any.
  pub fn value(&self) -> Option<&str> {
    self.values.first().map(String::as_str)
  }

  pub fn is(&self, name: &str) -> bool { self.name.eq_ignore_ascii_case(name) }

  /// Render as `KEY=V1,V2` (or just the token for a bare flag under a
  /// syntax that still accepts them).
  pub fn to_wire(&self, syntax: &Syntax) -> String {
    if self.bare && syntax.bare_flags != BareFlags::Rejected {
      return self.values.join(",");
    }
    let values: Vec<String> =
      self.values.iter().map(|v| quote_if_needed(v)).collect();
    format!("{}={}", self.name, values.join(","))
  }
}

/// Reserved argument names with a dedicated meaning.
pub const TYPE: &str = "TYPE";
pub const VALUE: &str = "VALUE";
pub const ENCODING: &str = "ENCODING";
pub const ALTID: &str = "ALTID";
pub const CHARSET: &str = "CHARSET";

/// Legacy bare tokens that are not `TYPE` values.
fn bare_token_key(token: &str) -> &'static str {
  match token.to_ascii_uppercase().as_str() {
    "BASE64" | "B" | "QUOTED-PRINTABLE" | "8BIT" | "7BIT" => ENCODING,
    "INLINE" | "URL" | "URI" | "CONTENT-ID" | "CID" => VALUE,
    _ => TYPE,
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse the argument segment of a content line (everything after the first
/// `;` of the name part, up to the value colon).
pub fn parse_arguments(segment: &str, syntax: &Syntax) -> Result<Vec<Argument>> {
  let mut arguments = Vec::new();
  for piece in split_outside_quotes(segment, ';') {
    if piece.is_empty() {
      continue;
    }
    match piece.split_once('=') {
      Some((key, raw_values)) => {
        let key = key.trim();
        if key.is_empty() {
          return Err(Error::malformed_argument(piece, "empty argument name"));
        }
        let values = split_outside_quotes(raw_values, ',')
          .into_iter()
          .map(unquote)
          .collect::<Result<Vec<_>>>()
          .map_err(|_| Error::malformed_argument(piece, "unbalanced quotes"))?;
        arguments.push(Argument::new(key, values));
      }
      None => {
        if syntax.bare_flags == BareFlags::Rejected {
          return Err(Error::malformed_argument(
            piece,
            "bare arguments are not allowed in this version",
          ));
        }
        let token = piece.trim();
        arguments.push(Argument {
          name:   bare_token_key(token).to_string(),
          values: vec![token.to_string()],
          bare:   true,
        });
      }
    }
  }
  Ok(arguments)
}

/// Split `s` on `delimiter` outside of double quotes and backslash escapes.
pub(crate) fn split_outside_quotes(s: &str, delimiter: char) -> Vec<&str> {
  let mut result = Vec::new();
  let mut start = 0usize;
  let mut in_quotes = false;
  let mut escaped = false;
  for (i, c) in s.char_indices() {
    if escaped {
      escaped = false;
      continue;
    }
    match c {
      '\\' => escaped = true,
      '"' => in_quotes = !in_quotes,
      c if c == delimiter && !in_quotes => {
        result.push(&s[start..i]);
        start = i + c.len_utf8();
      }
      _ => {}
    }
  }
  result.push(&s[start..]);
  result
}

fn unquote(value: &str) -> Result<String> {
  let value = value.trim();
  match (value.starts_with('"'), value.ends_with('"') && value.len() > 1) {
    (true, true) => Ok(value[1..value.len() - 1].to_string()),
    (false, _) if !value.contains('"') => Ok(value.to_string()),
    _ => Err(Error::malformed_argument(value, "unbalanced quotes")),
  }
}

fn quote_if_needed(value: &str) -> String {
  if value.contains([':', ';', ',']) {
    format!("\"{value}\"")
  } else {
    value.to_string()
  }
}

// ─── Building ────────────────────────────────────────────────────────────────

/// Join arguments into the `;A=1;B=2` form that follows the property name.
pub fn build_arguments(arguments: &[Argument], syntax: &Syntax) -> String {
  let mut out = String::new();
  for argument in arguments {
    out.push(';');
    out.push_str(&argument.to_wire(syntax));
  }
  out
}
