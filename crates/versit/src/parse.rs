//! Content-line and document parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ unfold_numbered()       → Vec<(line number, logical line)>
//!          └─ Reader               → nested BEGIN/END blocks
//!               └─ process_line()    → registry lookup → typed store

use std::{borrow::Cow, path::Path};

use serde::Deserialize;

use crate::{
  argument::{
    ALTID, Argument, CHARSET, ENCODING, TYPE, VALUE, parse_arguments,
  },
  component::{Component, ComponentKind},
  error::{Error, Result},
  part::{IanaNameInfo, XNameInfo},
  property::{Property, ValueContext},
  registry::{self, Resolved, Shape, Syntax},
  text::{
    decode_quoted_printable_as, split_and_unescape, unescape, unfold_numbered,
  },
  version::Version,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// What to do with a content line that fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
  /// Abort with the first error.
  #[default]
  Strict,
  /// Log the error, drop the line and carry on.
  Lenient,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
  pub policy: ParsePolicy,
}

impl ParseOptions {
  pub fn lenient() -> Self { Self { policy: ParsePolicy::Lenient } }
}

// ─── Content lines ───────────────────────────────────────────────────────────

/// One logical line split into its parts. Nothing is unescaped yet.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ContentLine<'a> {
  pub group:     Option<&'a str>,
  pub name:      &'a str,
  /// Everything between the name and the value colon, without the leading
  /// `;`.
  pub arguments: &'a str,
  pub value:     &'a str,
}

/// Find the first `:` that is not inside a double-quoted argument value.
fn find_unquoted_colon(s: &str) -> Option<usize> {
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ':' if !in_quotes => return Some(i),
      _ => {}
    }
  }
  None
}

fn is_name_char(c: char) -> bool { c.is_ascii_alphanumeric() || c == '-' }

pub(crate) fn parse_content_line(line: &str) -> Result<ContentLine<'_>> {
  let malformed = || Error::MalformedContentLine(line.to_string());

  let colon = find_unquoted_colon(line).ok_or_else(malformed)?;
  let head = &line[..colon];
  let value = &line[colon + 1..];

  let (qualified, arguments) = head.split_once(';').unwrap_or((head, ""));
  let (group, name) = match qualified.rsplit_once('.') {
    Some((group, name)) => (Some(group), name),
    None => (None, qualified),
  };

  if name.is_empty() || !name.chars().all(is_name_char) {
    return Err(malformed());
  }
  if let Some(group) = group {
    if group.split('.').any(|g| g.is_empty() || !g.chars().all(is_name_char))
    {
      return Err(malformed());
    }
  }

  Ok(ContentLine { group, name, arguments, value })
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Arguments with a dedicated meaning, pulled out of the argument list.
#[derive(Default)]
struct Reserved {
  types:      Vec<String>,
  value_type: Option<String>,
  encoding:   Option<String>,
  alt_id:     Option<u32>,
  rest:       Vec<Argument>,
}

fn split_reserved(
  arguments: Vec<Argument>,
  syntax: &Syntax,
  version: Version,
) -> Result<Reserved> {
  let mut reserved = Reserved::default();
  for argument in arguments {
    match argument.name.as_str() {
      TYPE => reserved.types.extend(
        argument
          .values
          .iter()
          .flat_map(|v| v.split(','))
          .map(|t| t.trim().to_ascii_uppercase())
          .filter(|t| !t.is_empty()),
      ),
      VALUE => {
        reserved.value_type = argument.value().map(str::to_ascii_lowercase);
      }
      ENCODING => {
        reserved.encoding = argument.value().map(str::to_ascii_uppercase);
      }
      ALTID => {
        if !syntax.alt_id {
          return Err(Error::VersionMismatch {
            subject: ALTID.to_string(),
            version: version.to_string(),
          });
        }
        let raw = argument.value().unwrap_or_default();
        let id = raw
          .trim()
          .parse()
          .map_err(|_| Error::malformed_argument(raw, "ALTID must be a number"))?;
        reserved.alt_id = Some(id);
      }
      _ => reserved.rest.push(argument),
    }
  }
  Ok(reserved)
}

/// Put an unconsumed `ENCODING` back so the line re-serializes unchanged.
fn keep_encoding(mut arguments: Vec<Argument>, encoding: Option<String>) -> Vec<Argument> {
  if let Some(encoding) = encoding {
    arguments.push(Argument::single(ENCODING, encoding));
  }
  arguments
}

/// Parse one unfolded content line and store it on `component`.
pub(crate) fn process_line(component: &mut Component, line: &str) -> Result<()> {
  let content = parse_content_line(line)?;
  let version = component.version;
  let family = component.family();
  let syntax = registry::syntax(family, version);

  let resolved = registry::lookup(content.name, version, &component.kind)?;
  let Reserved { types, value_type, mut encoding, alt_id, mut rest } =
    split_reserved(parse_arguments(content.arguments, syntax)?, syntax, version)?;

  let mut raw = Cow::Borrowed(content.value);
  match encoding.as_deref() {
    Some("QUOTED-PRINTABLE") => {
      // The decoded text is Unicode; its source charset no longer applies.
      let charset = rest
        .iter()
        .position(|a| a.is(CHARSET))
        .map(|i| rest.remove(i));
      let charset = charset.as_ref().and_then(Argument::value);
      raw = Cow::Owned(
        decode_quoted_printable_as(&raw, charset).replace("\r\n", "\n"),
      );
      encoding = None;
    }
    Some("8BIT" | "7BIT") => encoding = None,
    _ => {}
  }

  let group = content.group.map(str::to_string);
  let component_name = component.kind.name().to_string();

  let entry = match resolved {
    Resolved::Extension => {
      component.store.insert_extension(Property {
        group,
        alt_id,
        types,
        value_type: value_type.unwrap_or_else(|| "text".into()),
        arguments: keep_encoding(rest, encoding),
        value: XNameInfo {
          name:   content.name.to_string(),
          values: split_and_unescape(&raw, ','),
        },
      });
      return Ok(());
    }
    Resolved::Iana => {
      component.store.insert_extra(Property {
        group,
        alt_id,
        types,
        value_type: value_type.unwrap_or_else(|| "text".into()),
        arguments: keep_encoding(rest, encoding),
        value: IanaNameInfo {
          name:   content.name.to_ascii_uppercase(),
          values: split_and_unescape(&raw, ','),
        },
      });
      return Ok(());
    }
    Resolved::Known(entry) => entry,
  };

  let types = if types.is_empty() {
    entry.default_type.map(|t| vec![t.to_string()]).unwrap_or_default()
  } else {
    types
  };
  let value_type =
    value_type.unwrap_or_else(|| entry.default_value.to_string());
  let names = (entry.prefix, component_name.as_str());

  match entry.shape {
    Shape::String(key) => {
      let value = if entry.escapes(&value_type) {
        unescape(&raw)
      } else {
        raw.into_owned()
      };
      let property = Property {
        group,
        alt_id,
        types,
        value_type,
        arguments: keep_encoding(rest, encoding),
        value,
      };
      component
        .store
        .insert_string(key, property, entry.cardinality, names)
    }
    Shape::Integer(key) => {
      let value = raw.trim().parse::<i64>().map_err(|_| {
        Error::malformed_value(entry.prefix, format!("{raw:?} is not an integer"))
      })?;
      let property = Property {
        group,
        alt_id,
        types,
        value_type,
        arguments: keep_encoding(rest, encoding),
        value,
      };
      component
        .store
        .insert_integer(key, property, entry.cardinality, names)
    }
    Shape::Part(key, parser) => {
      let ctx = ValueContext {
        property: entry.prefix,
        family,
        version,
        syntax,
        types: &types,
        value_type: &value_type,
        encoding: encoding.as_deref(),
        arguments: &rest,
      };
      let value = parser(&raw, &ctx)?;
      let property = Property {
        group,
        alt_id,
        types,
        value_type,
        arguments: rest,
        value,
      };
      component.store.insert_part(key, property, entry.cardinality, names)
    }
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

type Line = (usize, String);

enum Marker<'a> {
  Begin(&'a str),
  End(&'a str),
}

fn marker(line: &str) -> Option<Marker<'_>> {
  let (name, value) = line.split_once(':')?;
  if name.eq_ignore_ascii_case("BEGIN") {
    Some(Marker::Begin(value.trim()))
  } else if name.eq_ignore_ascii_case("END") {
    Some(Marker::End(value.trim()))
  } else {
    None
  }
}

fn version_value(line: &str) -> Option<&str> {
  let (name, value) = line.split_once(':')?;
  name.eq_ignore_ascii_case("VERSION").then(|| value.trim())
}

fn at((number, line): &Line, source: Error) -> Error {
  Error::AtLine {
    number: *number,
    line:   line.clone(),
    source: Box::new(source),
  }
}

/// Walks a slice of logical lines, building components.
struct Reader<'a> {
  lines:   &'a [Line],
  pos:     usize,
  options: ParseOptions,
}

impl<'a> Reader<'a> {
  fn new(lines: &'a [Line], options: ParseOptions) -> Self {
    Self { lines, pos: 0, options }
  }

  fn next(&mut self) -> Option<&'a Line> {
    let line = self.lines.get(self.pos)?;
    self.pos += 1;
    Some(line)
  }

  fn peek(&self) -> Option<&'a Line> { self.lines.get(self.pos) }

  /// Apply the parse policy to a recoverable error.
  fn recover(&self, error: Error) -> Result<()> {
    match self.options.policy {
      ParsePolicy::Strict => Err(error),
      ParsePolicy::Lenient => {
        tracing::warn!(error = %error, "skipping unparsable content");
        Ok(())
      }
    }
  }

  /// Read a single top-level object and require nothing after it.
  fn read_document(&mut self) -> Result<Component> {
    let component = self.read_root()?;
    match self.next() {
      Some(trailing) => Err(at(
        trailing,
        Error::MalformedContentLine("content after the closing END".into()),
      )),
      None => Ok(component),
    }
  }

  fn read_root(&mut self) -> Result<Component> {
    let begin = self.next().ok_or(Error::MissingEnvelope)?;
    let kind = match marker(&begin.1) {
      Some(Marker::Begin(name)) => ComponentKind::from_name(name),
      _ => return Err(at(begin, Error::MissingEnvelope)),
    };
    if !kind.is_root() {
      return Err(at(begin, Error::MissingEnvelope));
    }
    self.read_component(kind, None, begin)
  }

  /// Find this object's own `VERSION`, skipping over nested blocks.
  fn scan_version(&self, kind: &ComponentKind) -> Result<Version> {
    let mut depth = 0usize;
    for (_, line) in &self.lines[self.pos..] {
      match marker(line) {
        Some(Marker::Begin(_)) => depth += 1,
        Some(Marker::End(_)) if depth == 0 => break,
        Some(Marker::End(_)) => depth -= 1,
        None if depth == 0 => {
          if let Some(value) = version_value(line) {
            return Version::parse(value).ok_or_else(|| {
              Error::UnsupportedVersion {
                component: kind.name().to_string(),
                version:   value.to_string(),
              }
            });
          }
        }
        None => {}
      }
    }
    Err(Error::MissingVersion { component: kind.name().to_string() })
  }

  /// Consume lines up to and including the `END` that closes the block
  /// whose `BEGIN` was just read.
  fn skip_block(&mut self, begin: &Line) -> Result<()> {
    let mut depth = 0usize;
    while let Some((_, line)) = self.next() {
      match marker(line) {
        Some(Marker::Begin(_)) => depth += 1,
        Some(Marker::End(_)) if depth == 0 => return Ok(()),
        Some(Marker::End(_)) => depth -= 1,
        None => {}
      }
    }
    Err(at(begin, Error::MissingEnvelope))
  }

  /// A 2.1 `AGENT:` line with no value introduces the nested card that
  /// follows it.
  fn is_agent_marker(&self, component: &Component, line: &str) -> bool {
    if component.kind != ComponentKind::Card
      || !registry::syntax(component.family(), component.version).nested_agents
    {
      return false;
    }
    let Ok(content) = parse_content_line(line) else {
      return false;
    };
    content.name.eq_ignore_ascii_case("AGENT")
      && content.value.trim().is_empty()
      && matches!(
        self.peek().and_then(|(_, next)| marker(next)),
        Some(Marker::Begin(name)) if name.eq_ignore_ascii_case("VCARD")
      )
  }

  fn read_component(
    &mut self,
    kind: ComponentKind,
    inherited: Option<Version>,
    begin: &Line,
  ) -> Result<Component> {
    let version = match inherited {
      Some(version) if !kind.is_root() => version,
      _ => self.scan_version(&kind).map_err(|e| at(begin, e))?,
    };
    let mut component =
      Component::new(kind, version).map_err(|e| at(begin, e))?;
    tracing::debug!(
      component = component.kind.name(),
      %version,
      line = begin.0,
      "opened component"
    );

    while let Some(current) = self.next() {
      let line = current.1.as_str();
      match marker(line) {
        Some(Marker::End(name)) => {
          if ComponentKind::from_name(name) != component.kind {
            return Err(at(current, Error::MissingEnvelope));
          }
          tracing::debug!(component = component.kind.name(), "closed component");
          return Ok(component);
        }
        Some(Marker::Begin(name)) => {
          let child_kind = ComponentKind::from_name(name);
          if !component.kind.accepts_child(&child_kind, version) {
            self.recover(at(current, Error::InvalidNesting {
              parent: component.kind.name().to_string(),
              child:  child_kind.name().to_string(),
            }))?;
            self.skip_block(current)?;
            continue;
          }
          let child = self.read_component(child_kind, Some(version), current)?;
          if let Err(e) = component.add_child(child) {
            self.recover(at(current, e))?;
          }
        }
        None => {
          if component.kind.is_root() && version_value(line).is_some() {
            continue;
          }
          if self.is_agent_marker(&component, line) {
            continue;
          }
          if let Err(e) = component.process(line) {
            self.recover(at(current, e))?;
          }
        }
      }
    }

    Err(at(begin, Error::MissingEnvelope))
  }
}

/// Split a stream into top-level `BEGIN`/`END` blocks. Lines outside any
/// block are ignored; an unterminated block runs to the end of input.
fn split_blocks(lines: &[Line]) -> Vec<&[Line]> {
  let mut blocks = Vec::new();
  let mut depth = 0usize;
  let mut start = None;
  for (i, (_, line)) in lines.iter().enumerate() {
    match marker(line) {
      Some(Marker::Begin(_)) => {
        if depth == 0 {
          start = Some(i);
        }
        depth += 1;
      }
      Some(Marker::End(_)) if depth > 0 => {
        depth -= 1;
        if depth == 0 {
          if let Some(s) = start.take() {
            blocks.push(&lines[s..=i]);
          }
        }
      }
      _ => {}
    }
  }
  if let Some(s) = start {
    blocks.push(&lines[s..]);
  }
  blocks
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Parse exactly one vCard or vCalendar object, strictly.
pub fn parse(text: &str) -> Result<Component> {
  parse_with(text, &ParseOptions::default())
}

pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Component> {
  let lines = unfold_numbered(text);
  Reader::new(&lines, *options).read_document()
}

/// Parse every top-level object in a stream. A failure in one object does
/// not affect the others.
pub fn parse_many(text: &str) -> Vec<Result<Component>> {
  parse_many_with(text, &ParseOptions::default())
}

pub fn parse_many_with(
  text: &str,
  options: &ParseOptions,
) -> Vec<Result<Component>> {
  let lines = unfold_numbered(text);
  split_blocks(&lines)
    .into_iter()
    .map(|block| Reader::new(block, *options).read_document())
    .collect()
}

/// Read and parse a file holding exactly one object.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Component> {
  let text = std::fs::read_to_string(path)?;
  parse(&text)
}
