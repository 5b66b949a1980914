//! The five typed collections every component owns.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
  error::{Error, Result},
  key::{Cardinality, IntegerKey, PartKey, StringKey},
  part::{IanaNameInfo, PartValue, XNameInfo},
  property::Property,
};

/// Keyed, insertion-ordered property collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyStore {
  pub strings:    IndexMap<StringKey, Vec<Property<String>>>,
  pub integers:   IndexMap<IntegerKey, Vec<Property<i64>>>,
  pub parts:      IndexMap<PartKey, Vec<Property<PartValue>>>,
  /// `X-` properties keyed by the first-seen spelling of their name.
  pub extensions: IndexMap<String, Vec<Property<XNameInfo>>>,
  /// Unregistered IANA tokens, keyed like `extensions`.
  pub extras:     IndexMap<String, Vec<Property<IanaNameInfo>>>,
}

/// Whether `incoming` may join `slot` under `cardinality`.
///
/// A single-valued slot accepts further instances only when every instance,
/// old and new, carries an `ALTID`.
fn admits<V>(
  slot: &[Property<V>],
  incoming: &Property<V>,
  cardinality: Cardinality,
) -> bool {
  !cardinality.is_single()
    || slot.is_empty()
    || (incoming.alt_id.is_some() && slot.iter().all(|p| p.alt_id.is_some()))
}

fn insert<K: Hash + Eq, V>(
  map: &mut IndexMap<K, Vec<Property<V>>>,
  key: K,
  property: Property<V>,
  cardinality: Cardinality,
  names: (&str, &str),
) -> Result<()> {
  let slot = map.entry(key).or_default();
  if !admits(slot, &property, cardinality) {
    let (property, component) = names;
    return Err(Error::CardinalityViolation {
      property:  property.to_string(),
      component: component.to_string(),
    });
  }
  slot.push(property);
  Ok(())
}

fn remove<K: Hash + Eq, V>(
  map: &mut IndexMap<K, Vec<Property<V>>>,
  key: &K,
  index: usize,
) -> bool {
  let Some(slot) = map.get_mut(key) else {
    return false;
  };
  if index >= slot.len() {
    return false;
  }
  slot.remove(index);
  if slot.is_empty() {
    map.shift_remove(key);
  }
  true
}

/// Find the stored spelling of an open-ended name, case-insensitively.
fn open_key<V>(map: &IndexMap<String, V>, name: &str) -> Option<String> {
  map.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned()
}

impl PropertyStore {
  pub fn is_empty(&self) -> bool {
    self.strings.is_empty()
      && self.integers.is_empty()
      && self.parts.is_empty()
      && self.extensions.is_empty()
      && self.extras.is_empty()
  }

  pub(crate) fn insert_string(
    &mut self,
    key: StringKey,
    property: Property<String>,
    cardinality: Cardinality,
    names: (&str, &str),
  ) -> Result<()> {
    insert(&mut self.strings, key, property, cardinality, names)
  }

  pub(crate) fn insert_integer(
    &mut self,
    key: IntegerKey,
    property: Property<i64>,
    cardinality: Cardinality,
    names: (&str, &str),
  ) -> Result<()> {
    insert(&mut self.integers, key, property, cardinality, names)
  }

  pub(crate) fn insert_part(
    &mut self,
    key: PartKey,
    property: Property<PartValue>,
    cardinality: Cardinality,
    names: (&str, &str),
  ) -> Result<()> {
    insert(&mut self.parts, key, property, cardinality, names)
  }

  pub(crate) fn insert_extension(&mut self, property: Property<XNameInfo>) {
    let key = open_key(&self.extensions, &property.value.name)
      .unwrap_or_else(|| property.value.name.clone());
    self.extensions.entry(key).or_default().push(property);
  }

  pub(crate) fn insert_extra(&mut self, property: Property<IanaNameInfo>) {
    let key = open_key(&self.extras, &property.value.name)
      .unwrap_or_else(|| property.value.name.clone());
    self.extras.entry(key).or_default().push(property);
  }

  pub fn extension(&self, name: &str) -> &[Property<XNameInfo>] {
    self
      .extensions
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_slice())
      .unwrap_or_default()
  }

  pub fn extra(&self, name: &str) -> &[Property<IanaNameInfo>] {
    self
      .extras
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_slice())
      .unwrap_or_default()
  }

  pub(crate) fn remove_string(&mut self, key: StringKey, index: usize) -> bool {
    remove(&mut self.strings, &key, index)
  }

  pub(crate) fn remove_integer(
    &mut self,
    key: IntegerKey,
    index: usize,
  ) -> bool {
    remove(&mut self.integers, &key, index)
  }

  pub(crate) fn remove_part(&mut self, key: PartKey, index: usize) -> bool {
    remove(&mut self.parts, &key, index)
  }

  pub(crate) fn remove_extension(&mut self, name: &str, index: usize) -> bool {
    match open_key(&self.extensions, name) {
      Some(key) => remove(&mut self.extensions, &key, index),
      None => false,
    }
  }

  pub(crate) fn remove_extra(&mut self, name: &str, index: usize) -> bool {
    match open_key(&self.extras, name) {
      Some(key) => remove(&mut self.extras, &key, index),
      None => false,
    }
  }
}
