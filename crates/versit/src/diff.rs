//! Structural diff between two components.
//!
//! Property instances are matched by identity-space key and position; nested
//! components are matched by position. The result lists what would have to
//! be added, replaced or removed to turn `old` into `new`.

use std::{fmt, hash::Hash};

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
  component::Component,
  key::Category,
  property::Property,
  registry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
  Added,
  Removed,
  Changed,
}

/// One differing property instance or component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
  /// Slash-separated location, e.g. `VCALENDAR/VEVENT[0]/SUMMARY[0]`.
  pub path:   String,
  pub change: Change,
}

impl fmt::Display for Difference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = match self.change {
      Change::Added => '+',
      Change::Removed => '-',
      Change::Changed => '~',
    };
    write!(f, "{sign} {}", self.path)
  }
}

/// Compute the differences between `old` and `new`. Empty when they are
/// equal.
pub fn diff(old: &Component, new: &Component) -> Vec<Difference> {
  let mut out = Vec::new();
  diff_component(old.kind.name(), old, new, &mut out);
  out
}

fn diff_component(
  path: &str,
  old: &Component,
  new: &Component,
  out: &mut Vec<Difference>,
) {
  if old.kind != new.kind {
    out.push(Difference { path: path.to_string(), change: Change::Changed });
    return;
  }
  if old.version != new.version {
    out.push(Difference {
      path:   format!("{path}/VERSION"),
      change: Change::Changed,
    });
  }

  let prefix = |category: Category, fallback: String| {
    registry::reverse_lookup(category, new.version, &new.kind)
      .map(|entry| entry.prefix.to_string())
      .unwrap_or(fallback)
  };

  let (a, b) = (&old.store, &new.store);
  diff_map(path, &a.strings, &b.strings, out, |k| {
    prefix(Category::String(*k), k.to_string())
  });
  diff_map(path, &a.integers, &b.integers, out, |k| {
    prefix(Category::Integer(*k), k.to_string())
  });
  diff_map(path, &a.parts, &b.parts, out, |k| {
    prefix(Category::Part(*k), k.to_string())
  });
  diff_map(path, &a.extensions, &b.extensions, out, |k| k.to_uppercase());
  diff_map(path, &a.extras, &b.extras, out, |k| k.to_uppercase());

  let count = old.children().len().max(new.children().len());
  for i in 0..count {
    match (old.children().get(i), new.children().get(i)) {
      (Some(a), Some(b)) => {
        let child_path = format!("{path}/{}[{i}]", b.kind.name());
        diff_component(&child_path, a, b, out);
      }
      (Some(a), None) => out.push(Difference {
        path:   format!("{path}/{}[{i}]", a.kind.name()),
        change: Change::Removed,
      }),
      (None, Some(b)) => out.push(Difference {
        path:   format!("{path}/{}[{i}]", b.kind.name()),
        change: Change::Added,
      }),
      (None, None) => {}
    }
  }
}

fn diff_map<K, V>(
  path: &str,
  old: &IndexMap<K, Vec<Property<V>>>,
  new: &IndexMap<K, Vec<Property<V>>>,
  out: &mut Vec<Difference>,
  name: impl Fn(&K) -> String,
) where
  K: Hash + Eq,
  V: PartialEq,
{
  let empty = Vec::new();
  let keys = old.keys().chain(new.keys().filter(|k| !old.contains_key(*k)));
  for key in keys {
    let before = old.get(key).unwrap_or(&empty);
    let after = new.get(key).unwrap_or(&empty);
    let label = name(key);
    for i in 0..before.len().max(after.len()) {
      let change = match (before.get(i), after.get(i)) {
        (Some(a), Some(b)) if a == b => continue,
        (Some(_), Some(_)) => Change::Changed,
        (Some(_), None) => Change::Removed,
        (None, Some(_)) => Change::Added,
        (None, None) => continue,
      };
      out.push(Difference { path: format!("{path}/{label}[{i}]"), change });
    }
  }
}
