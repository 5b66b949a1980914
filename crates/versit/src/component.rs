//! The recursive container aggregate: a card, a calendar, or one of the
//! calendar's nested components.

use std::path::Path;

use serde::Serialize;

use crate::{
  argument::{Argument, VALUE, build_arguments},
  error::{Error, Result},
  key::{Category, IntegerKey, PartKey, StringKey},
  part::{AgentInfo, FromPart, IanaNameInfo, PartValue, XNameInfo},
  property::Property,
  registry::{self, PartType, Scope},
  serialize::{SaveOptions, write_component},
  store::PropertyStore,
  text::escape,
  version::{Family, Version},
};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Which `BEGIN:` marker a component is wrapped in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentKind {
  Card,
  Calendar,
  Event,
  Todo,
  Journal,
  FreeBusy,
  TimeZone,
  Standard,
  Daylight,
  Alarm,
  /// Any other (usually `X-`) component, by upper-cased name.
  Other(String),
}

impl ComponentKind {
  pub fn from_name(name: &str) -> Self {
    match name.trim().to_ascii_uppercase().as_str() {
      "VCARD" => Self::Card,
      "VCALENDAR" => Self::Calendar,
      "VEVENT" => Self::Event,
      "VTODO" => Self::Todo,
      "VJOURNAL" => Self::Journal,
      "VFREEBUSY" => Self::FreeBusy,
      "VTIMEZONE" => Self::TimeZone,
      "STANDARD" => Self::Standard,
      "DAYLIGHT" => Self::Daylight,
      "VALARM" => Self::Alarm,
      other => Self::Other(other.to_string()),
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Self::Card => "VCARD",
      Self::Calendar => "VCALENDAR",
      Self::Event => "VEVENT",
      Self::Todo => "VTODO",
      Self::Journal => "VJOURNAL",
      Self::FreeBusy => "VFREEBUSY",
      Self::TimeZone => "VTIMEZONE",
      Self::Standard => "STANDARD",
      Self::Daylight => "DAYLIGHT",
      Self::Alarm => "VALARM",
      Self::Other(name) => name,
    }
  }

  pub fn family(&self) -> Family {
    match self {
      Self::Card => Family::Card,
      _ => Family::Calendar,
    }
  }

  pub fn scope(&self) -> Scope {
    match self {
      Self::Card => Scope::CARD,
      Self::Calendar => Scope::CALENDAR,
      Self::Event => Scope::EVENT,
      Self::Todo => Scope::TODO,
      Self::Journal => Scope::JOURNAL,
      Self::FreeBusy => Scope::FREEBUSY,
      Self::TimeZone => Scope::TIMEZONE,
      Self::Standard => Scope::STANDARD,
      Self::Daylight => Scope::DAYLIGHT,
      Self::Alarm => Scope::ALARM,
      Self::Other(_) => Scope::OTHER,
    }
  }

  /// Top-level objects carry their own `VERSION` line.
  pub fn is_root(&self) -> bool { matches!(self, Self::Card | Self::Calendar) }

  /// Whether `child` may be nested directly inside this kind.
  pub fn accepts_child(&self, child: &ComponentKind, version: Version) -> bool {
    use ComponentKind::*;
    match (self, child) {
      (Card, Card) => registry::syntax(Family::Card, version).nested_agents,
      (Card, _) | (_, Card | Calendar) => false,
      (Calendar, Event | Todo | Other(_)) => true,
      (Calendar, Journal | FreeBusy | TimeZone)
      | (Event | Todo, Alarm)
      | (TimeZone, Standard | Daylight) => {
        registry::syntax(Family::Calendar, version).ical_components
      }
      (_, Other(_)) | (Other(_), _) => true,
      _ => false,
    }
  }

  /// Position among siblings when serialized.
  fn rank(&self) -> u8 {
    match self {
      Self::Event => 0,
      Self::Todo => 1,
      Self::Journal => 2,
      Self::FreeBusy => 3,
      Self::TimeZone => 4,
      Self::Standard => 5,
      Self::Daylight => 6,
      Self::Alarm => 7,
      Self::Card => 8,
      Self::Calendar | Self::Other(_) => 9,
    }
  }
}

// ─── Component ───────────────────────────────────────────────────────────────

/// A parsed object: its typed property collections plus nested components.
///
/// Children are kept in serialization order (events, todos, journals,
/// free-busy, time zones, observances, alarms, agents, other), so two
/// components compare equal regardless of the order their children arrived
/// in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
  pub kind:            ComponentKind,
  pub version:         Version,
  pub(crate) store:    PropertyStore,
  pub(crate) children: Vec<Component>,
}

impl Component {
  /// An empty component bound to `version`.
  pub fn new(kind: ComponentKind, version: Version) -> Result<Self> {
    if !kind.family().supports(version) {
      return Err(Error::UnsupportedVersion {
        component: kind.name().to_string(),
        version:   version.to_string(),
      });
    }
    Ok(Self {
      kind,
      version,
      store: PropertyStore::default(),
      children: Vec::new(),
    })
  }

  pub fn card(version: Version) -> Result<Self> {
    Self::new(ComponentKind::Card, version)
  }

  pub fn calendar(version: Version) -> Result<Self> {
    Self::new(ComponentKind::Calendar, version)
  }

  pub fn family(&self) -> Family { self.kind.family() }

  pub fn store(&self) -> &PropertyStore { &self.store }

  /// Feed one unfolded content line through the dispatcher.
  pub fn process(&mut self, line: &str) -> Result<()> {
    crate::parse::process_line(self, line)
  }

  fn applies(&self, category: Category) -> bool {
    registry::reverse_lookup(category, self.version, &self.kind).is_some()
  }

  fn entry_for(&self, category: Category) -> Result<&'static PartType> {
    registry::reverse_lookup(category, self.version, &self.kind).ok_or_else(
      || Error::VersionMismatch {
        subject: format!("{category:?} in {}", self.kind.name()),
        version: self.version.to_string(),
      },
    )
  }

  fn prefix_for(&self, category: Category) -> Result<&'static str> {
    self.entry_for(category).map(|entry| entry.prefix)
  }

  // ─── Getters ───

  pub fn strings(&self, key: StringKey) -> &[Property<String>] {
    if !self.applies(Category::String(key)) {
      return &[];
    }
    self.store.strings.get(&key).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn string_values(&self, key: StringKey) -> Vec<&str> {
    self.strings(key).iter().map(|p| p.value.as_str()).collect()
  }

  /// First value of a string property.
  pub fn string(&self, key: StringKey) -> Option<&str> {
    self.strings(key).first().map(|p| p.value.as_str())
  }

  pub fn integers(&self, key: IntegerKey) -> &[Property<i64>] {
    if !self.applies(Category::Integer(key)) {
      return &[];
    }
    self.store.integers.get(&key).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn integer_values(&self, key: IntegerKey) -> Vec<i64> {
    self.integers(key).iter().map(|p| p.value).collect()
  }

  pub fn integer(&self, key: IntegerKey) -> Option<i64> {
    self.integers(key).first().map(|p| p.value)
  }

  pub fn parts(&self, key: PartKey) -> &[Property<PartValue>] {
    if !self.applies(Category::Part(key)) {
      return &[];
    }
    self.store.parts.get(&key).map(Vec::as_slice).unwrap_or_default()
  }

  /// Payloads of `key` that are of type `T`.
  pub fn part_values<T: FromPart>(&self, key: PartKey) -> Vec<&T> {
    self
      .parts(key)
      .iter()
      .filter_map(|p| T::from_part(&p.value))
      .collect()
  }

  /// Every payload of type `T`, across all keys, in insertion order.
  pub fn parts_array<T: FromPart>(&self) -> Vec<&T> {
    self
      .store
      .parts
      .iter()
      .filter(|(key, _)| self.applies(Category::Part(**key)))
      .flat_map(|(_, props)| props.iter())
      .filter_map(|p| T::from_part(&p.value))
      .collect()
  }

  pub fn extension_parts(&self, name: &str) -> &[Property<XNameInfo>] {
    self.store.extension(name)
  }

  /// Every `X-` property, in insertion order.
  pub fn extension_parts_array(&self) -> Vec<&XNameInfo> {
    self
      .store
      .extensions
      .values()
      .flatten()
      .map(|p| &p.value)
      .collect()
  }

  pub fn extra_parts(&self, name: &str) -> &[Property<IanaNameInfo>] {
    self.store.extra(name)
  }

  // ─── Adders ───
  //
  // Each builds a content line and re-enters the dispatcher, so values added
  // through the API are validated exactly like parsed ones.

  fn synthesize(
    &mut self,
    prefix: &str,
    value: &str,
    group: Option<&str>,
    arguments: &[Argument],
  ) -> Result<()> {
    let syntax = registry::syntax(self.family(), self.version);
    let group = group.map(|g| format!("{g}.")).unwrap_or_default();
    let line = format!(
      "{group}{prefix}{}:{value}",
      build_arguments(arguments, syntax)
    );
    self.process(&line)
  }

  pub fn add_string(
    &mut self,
    key: StringKey,
    value: &str,
    group: Option<&str>,
    arguments: &[Argument],
  ) -> Result<()> {
    let entry = self.entry_for(Category::String(key))?;
    let value_type = arguments
      .iter()
      .find(|a| a.is(VALUE))
      .and_then(Argument::value)
      .unwrap_or(entry.default_value);
    if entry.escapes(value_type) {
      self.synthesize(entry.prefix, &escape(value), group, arguments)
    } else {
      self.synthesize(entry.prefix, value, group, arguments)
    }
  }

  pub fn add_integer(
    &mut self,
    key: IntegerKey,
    value: i64,
    group: Option<&str>,
    arguments: &[Argument],
  ) -> Result<()> {
    let prefix = self.prefix_for(Category::Integer(key))?;
    self.synthesize(prefix, &value.to_string(), group, arguments)
  }

  /// Add a structured property from its raw (escaped) wire value.
  pub fn add_part(
    &mut self,
    key: PartKey,
    raw_value: &str,
    group: Option<&str>,
    arguments: &[Argument],
  ) -> Result<()> {
    let prefix = self.prefix_for(Category::Part(key))?;
    self.synthesize(prefix, raw_value, group, arguments)
  }

  pub fn add_extension(
    &mut self,
    name: &str,
    values: &[&str],
    group: Option<&str>,
    arguments: &[Argument],
  ) -> Result<()> {
    if !name.to_ascii_uppercase().starts_with("X-") {
      return Err(Error::UnknownProperty(name.to_string()));
    }
    let value = values.iter().map(|v| escape(v)).collect::<Vec<_>>().join(",");
    self.synthesize(name, &value, group, arguments)
  }

  // ─── Deleters ───

  pub fn delete_string(&mut self, key: StringKey, index: usize) -> bool {
    self.applies(Category::String(key)) && self.store.remove_string(key, index)
  }

  pub fn delete_integer(&mut self, key: IntegerKey, index: usize) -> bool {
    self.applies(Category::Integer(key))
      && self.store.remove_integer(key, index)
  }

  pub fn delete_part(&mut self, key: PartKey, index: usize) -> bool {
    self.applies(Category::Part(key)) && self.store.remove_part(key, index)
  }

  pub fn delete_extension(&mut self, name: &str, index: usize) -> bool {
    self.store.remove_extension(name, index)
  }

  pub fn delete_extra(&mut self, name: &str, index: usize) -> bool {
    self.store.remove_extra(name, index)
  }

  // ─── Children ───

  pub fn children(&self) -> &[Component] { &self.children }

  /// Nest `child`, keeping siblings in serialization order.
  pub fn add_child(&mut self, child: Component) -> Result<()> {
    if !self.kind.accepts_child(&child.kind, self.version) {
      return Err(Error::InvalidNesting {
        parent: self.kind.name().to_string(),
        child:  child.kind.name().to_string(),
      });
    }
    if !child.kind.is_root() && child.version != self.version {
      return Err(Error::VersionMismatch {
        subject: child.kind.name().to_string(),
        version: self.version.to_string(),
      });
    }
    let rank = child.kind.rank();
    let at = self
      .children
      .iter()
      .position(|c| c.kind.rank() > rank)
      .unwrap_or(self.children.len());
    self.children.insert(at, child);
    Ok(())
  }

  pub fn delete_child(&mut self, index: usize) -> bool {
    if index >= self.children.len() {
      return false;
    }
    self.children.remove(index);
    true
  }

  pub fn children_of<'a>(
    &'a self,
    kind: &'a ComponentKind,
  ) -> impl Iterator<Item = &'a Component> + 'a {
    self.children.iter().filter(move |c| &c.kind == kind)
  }

  fn children_vec(&self, kind: ComponentKind) -> Vec<&Component> {
    self.children.iter().filter(|c| c.kind == kind).collect()
  }

  pub fn events(&self) -> Vec<&Component> {
    self.children_vec(ComponentKind::Event)
  }

  pub fn todos(&self) -> Vec<&Component> {
    self.children_vec(ComponentKind::Todo)
  }

  pub fn journals(&self) -> Vec<&Component> {
    self.children_vec(ComponentKind::Journal)
  }

  pub fn free_busy(&self) -> Vec<&Component> {
    self.children_vec(ComponentKind::FreeBusy)
  }

  pub fn time_zones(&self) -> Vec<&Component> {
    self.children_vec(ComponentKind::TimeZone)
  }

  pub fn standards(&self) -> Vec<&Component> {
    self.children_vec(ComponentKind::Standard)
  }

  pub fn daylights(&self) -> Vec<&Component> {
    self.children_vec(ComponentKind::Daylight)
  }

  pub fn alarms(&self) -> Vec<&Component> {
    self.children_vec(ComponentKind::Alarm)
  }

  pub fn others(&self) -> Vec<&Component> {
    self
      .children
      .iter()
      .filter(|c| matches!(c.kind, ComponentKind::Other(_)))
      .collect()
  }

  /// Embedded agent cards, whether nested (2.1) or inline `AGENT` values.
  pub fn agents(&self) -> Vec<&Component> {
    let mut agents = self.children_vec(ComponentKind::Card);
    for agent in self.part_values::<AgentInfo>(PartKey::Agent) {
      if let AgentInfo::Card(card) = agent {
        agents.push(card.as_ref());
      }
    }
    agents
  }

  // ─── Validation and output ───

  /// Check required fields and cross-field constraints, recursively.
  pub fn validate(&self) -> Result<()> { crate::validate::validate(self) }

  /// Serialize with CRLF line endings, validating first if asked.
  pub fn save_to_string(&self, validate: bool) -> Result<String> {
    self.save_with(&SaveOptions { validate, ..SaveOptions::default() })
  }

  pub fn save_with(&self, options: &SaveOptions) -> Result<String> {
    if options.validate {
      self.validate()?;
    }
    Ok(write_component(self, options.line_ending))
  }

  pub fn save_to_file(
    &self,
    path: impl AsRef<Path>,
    options: &SaveOptions,
  ) -> Result<()> {
    let text = self.save_with(options)?;
    std::fs::write(path, text)?;
    Ok(())
  }
}
