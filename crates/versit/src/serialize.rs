//! Component serializer.
//!
//! Writes `BEGIN`/`VERSION`, then every collection in insertion order, then
//! children, then `END`. Lines are folded at 75 octets; quoted-printable
//! values use `=` soft breaks instead.

use serde::Deserialize;

use crate::{
  argument::{Argument, CHARSET, ENCODING, build_arguments},
  component::{Component, ComponentKind},
  key::Category,
  part::join_values,
  property::Property,
  registry::{self, BareFlags, PartType, Syntax},
  text::{
    MAX_LINE_OCTETS, encode_quoted_printable, escape, escape_keep_newlines,
    fold_line,
  },
};

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
  #[default]
  Crlf,
  Lf,
}

impl LineEnding {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Crlf => "\r\n",
      Self::Lf => "\n",
    }
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
  /// Run [`Component::validate`] before writing.
  pub validate:    bool,
  pub line_ending: LineEnding,
}

// ─── Writer ──────────────────────────────────────────────────────────────────

/// Serialize `component` and its children. Never fails; validation is the
/// caller's business.
pub fn write_component(
  component: &Component,
  line_ending: LineEnding,
) -> String {
  let mut writer = Writer { out: String::new(), eol: line_ending.as_str() };
  writer.component(component);
  writer.out
}

struct Writer {
  out: String,
  eol: &'static str,
}

/// How the value part of a line is encoded on the wire.
enum Encoded {
  Plain(String),
  QuotedPrintable {
    text:      String,
    /// Non-ASCII octets were escaped, so the charset must be declared.
    non_ascii: bool,
  },
}

impl Writer {
  fn push(&mut self, logical: &str) {
    self.out.push_str(&fold_line(logical, MAX_LINE_OCTETS, " ", self.eol));
    self.out.push_str(self.eol);
  }

  /// Quoted-printable lines break with a trailing `=` and no indent.
  fn push_quoted_printable(&mut self, logical: &str) {
    let soft_break = format!("={}", self.eol);
    let folded = fold_line(logical, MAX_LINE_OCTETS - 1, "", &soft_break);
    self.out.push_str(&folded);
    self.out.push_str(self.eol);
  }

  fn component(&mut self, component: &Component) {
    let kind = &component.kind;
    let version = component.version;
    let syntax = registry::syntax(component.family(), version);

    self.push(&format!("BEGIN:{}", kind.name()));
    if kind.is_root() {
      self.push(&format!("VERSION:{version}"));
    }

    let store = &component.store;
    for (key, properties) in &store.strings {
      let Some(entry) = entry_for(component, Category::String(*key)) else {
        continue;
      };
      for property in properties {
        let escaped = entry.escapes(&property.value_type);
        let encoded = encode_text(&property.value, escaped, syntax);
        self.property(
          entry.prefix,
          property,
          Some(entry),
          encoded,
          Vec::new(),
          syntax,
        );
      }
    }

    for (key, properties) in &store.integers {
      let Some(entry) = entry_for(component, Category::Integer(*key)) else {
        continue;
      };
      for property in properties {
        let encoded = Encoded::Plain(property.value.to_string());
        self.property(
          entry.prefix,
          property,
          Some(entry),
          encoded,
          Vec::new(),
          syntax,
        );
      }
    }

    for (key, properties) in &store.parts {
      let Some(entry) = entry_for(component, Category::Part(*key)) else {
        continue;
      };
      for property in properties {
        let ctx =
          property.context(entry.prefix, component.family(), version, syntax);
        let encoded = Encoded::Plain(property.value.to_value(&ctx));
        let implied = property.value.arguments(&ctx);
        self.property(
          entry.prefix,
          property,
          Some(entry),
          encoded,
          implied,
          syntax,
        );
      }
    }

    for properties in store.extensions.values() {
      for property in properties {
        let encoded = Encoded::Plain(join_values(&property.value.values));
        self.property(
          &property.value.name,
          property,
          None,
          encoded,
          Vec::new(),
          syntax,
        );
      }
    }

    for properties in store.extras.values() {
      for property in properties {
        let encoded = Encoded::Plain(join_values(&property.value.values));
        self.property(
          &property.value.name,
          property,
          None,
          encoded,
          Vec::new(),
          syntax,
        );
      }
    }

    for child in component.children() {
      if *kind == ComponentKind::Card && child.kind == ComponentKind::Card {
        self.push("AGENT:");
      }
      self.component(child);
    }

    self.push(&format!("END:{}", kind.name()));
  }

  fn property<V>(
    &mut self,
    prefix: &str,
    property: &Property<V>,
    entry: Option<&PartType>,
    value: Encoded,
    implied: Vec<Argument>,
    syntax: &Syntax,
  ) {
    let mut line = String::new();
    if let Some(group) = &property.group {
      line.push_str(group);
      line.push('.');
    }
    line.push_str(prefix);

    if let Some(alt_id) = property.alt_id {
      line.push_str(&format!(";ALTID={alt_id}"));
    }

    let default_type = entry.and_then(|e| e.default_type);
    let implicit = match default_type {
      Some(default) => property.types.len() == 1 && property.types[0] == default,
      None => property.types.is_empty(),
    };
    if !implicit {
      line.push_str(&types_segment(&property.types, syntax));
    }

    let default_value = entry.map_or("text", |e| e.default_value);
    if !property.value_type.eq_ignore_ascii_case(default_value) {
      line.push_str(&format!(";VALUE={}", property.value_type));
    }

    line.push_str(&build_arguments(&property.arguments, syntax));
    line.push_str(&build_arguments(&implied, syntax));

    match value {
      Encoded::Plain(value) => {
        line.push(':');
        line.push_str(&value);
        self.push(&line);
      }
      Encoded::QuotedPrintable { text, non_ascii } => {
        let mut arguments = Vec::new();
        if non_ascii {
          arguments.push(Argument::single(CHARSET, "UTF-8"));
        }
        arguments.push(Argument {
          name:   ENCODING.to_string(),
          values: vec!["QUOTED-PRINTABLE".to_string()],
          bare:   syntax.bare_flags == BareFlags::Preferred,
        });
        line.push_str(&build_arguments(&arguments, syntax));
        line.push(':');
        line.push_str(&text);
        self.push_quoted_printable(&line);
      }
    }
  }
}

fn entry_for(
  component: &Component,
  category: Category,
) -> Option<&'static PartType> {
  let entry =
    registry::reverse_lookup(category, component.version, &component.kind);
  if entry.is_none() {
    tracing::debug!(
      ?category,
      version = %component.version,
      "dropping property with no entry for this version"
    );
  }
  entry
}

/// Multi-line text goes out quoted-printable where the version expects it.
/// Values with their own grammar (URIs, recurrence rules) are written as
/// stored.
fn encode_text(value: &str, escaped: bool, syntax: &Syntax) -> Encoded {
  if syntax.quoted_printable && value.contains('\n') {
    let text = if escaped {
      encode_quoted_printable(&escape_keep_newlines(value))
    } else {
      encode_quoted_printable(value)
    };
    return Encoded::QuotedPrintable { text, non_ascii: !value.is_ascii() };
  }
  if escaped {
    Encoded::Plain(escape(value))
  } else {
    Encoded::Plain(value.to_string())
  }
}

fn types_segment(types: &[String], syntax: &Syntax) -> String {
  if types.is_empty() {
    return String::new();
  }
  if syntax.bare_flags == BareFlags::Preferred {
    return types.iter().map(|t| format!(";{t}")).collect();
  }
  let joined = types.join(",");
  if syntax.lowercase_types {
    format!(";TYPE={}", joined.to_ascii_lowercase())
  } else {
    format!(";TYPE={joined}")
  }
}
