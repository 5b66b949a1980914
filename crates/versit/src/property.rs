//! A single property instance and the context its payload is parsed in.

use serde::Serialize;

use crate::{
  argument::Argument,
  registry::Syntax,
  version::{Family, Version},
};

/// One property instance: shared metadata plus a payload of type `V`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property<V> {
  /// Group prefix, e.g. `item1` or `work.home`.
  pub group:      Option<String>,
  /// `ALTID` group; instances sharing one are alternative renderings.
  pub alt_id:     Option<u32>,
  /// Upper-cased `TYPE` tags in input order.
  pub types:      Vec<String>,
  /// Lower-cased `VALUE` type, or the registry default.
  pub value_type: String,
  /// Every other argument, kept for round-tripping.
  pub arguments:  Vec<Argument>,
  pub value:      V,
}

impl<V> Property<V> {
  pub fn has_type(&self, tag: &str) -> bool {
    self.types.iter().any(|t| t.eq_ignore_ascii_case(tag))
  }

  pub fn argument(&self, name: &str) -> Option<&Argument> {
    self.arguments.iter().find(|a| a.is(name))
  }

  /// Context for parsing or rendering this instance's payload.
  pub(crate) fn context<'a>(
    &'a self,
    property: &'a str,
    family: Family,
    version: Version,
    syntax: &'static Syntax,
  ) -> ValueContext<'a> {
    ValueContext {
      property,
      family,
      version,
      syntax,
      types: &self.types,
      value_type: &self.value_type,
      encoding: None,
      arguments: &self.arguments,
    }
  }
}

/// Everything a payload parser may consult besides the raw value.
#[derive(Debug, Clone, Copy)]
pub struct ValueContext<'a> {
  /// Property name, for error messages.
  pub property:   &'a str,
  pub family:     Family,
  pub version:    Version,
  pub syntax:     &'static Syntax,
  pub types:      &'a [String],
  pub value_type: &'a str,
  /// Upper-cased `ENCODING` token still to be applied, if any.
  pub encoding:   Option<&'a str>,
  pub arguments:  &'a [Argument],
}

impl ValueContext<'_> {
  pub fn value_type_is(&self, candidates: &[&str]) -> bool {
    candidates
      .iter()
      .any(|c| c.eq_ignore_ascii_case(self.value_type))
  }
}
