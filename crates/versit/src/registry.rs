//! Version-aware part-type registry.
//!
//! One static table maps a property prefix, family and version range to the
//! property's identity, shape, cardinality and defaults. Every
//! version-dependent branch in the parser, serializer and validator consults
//! this module; nothing else compares versions to decide property shape.

use crate::{
  component::ComponentKind,
  error::{Error, Result},
  key::{Cardinality, Category, IntegerKey, PartKey, StringKey},
  part::{
    AddressInfo, AgentInfo, BlobInfo, CalAddressInfo, ClientPidMapInfo,
    DateInfo, DateListInfo, DateTimeInfo, DurationInfo, FreeBusyInfo,
    GenderInfo, GeoInfo, ImppInfo, NameInfo, OrganizationInfo, PartParser,
    RequestStatusInfo, TelephoneInfo, TextListInfo, TimeZoneInfo, TriggerInfo,
    UtcOffsetInfo, parse_as,
  },
  version::{Family, Version, VersionRange},
};

// ─── Scopes ──────────────────────────────────────────────────────────────────

/// Set of component kinds a registry entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope(u16);

impl Scope {
  pub const CARD: Scope = Scope(1 << 0);
  pub const CALENDAR: Scope = Scope(1 << 1);
  pub const EVENT: Scope = Scope(1 << 2);
  pub const TODO: Scope = Scope(1 << 3);
  pub const JOURNAL: Scope = Scope(1 << 4);
  pub const FREEBUSY: Scope = Scope(1 << 5);
  pub const TIMEZONE: Scope = Scope(1 << 6);
  pub const STANDARD: Scope = Scope(1 << 7);
  pub const DAYLIGHT: Scope = Scope(1 << 8);
  pub const ALARM: Scope = Scope(1 << 9);
  pub const OTHER: Scope = Scope(1 << 10);

  pub const fn with(self, other: Scope) -> Scope { Scope(self.0 | other.0) }

  pub const fn contains(self, other: Scope) -> bool {
    self.0 & other.0 == other.0
  }
}

const ET: Scope = Scope::EVENT.with(Scope::TODO);
const ETJ: Scope = ET.with(Scope::JOURNAL);
const COMPONENTS: Scope = ETJ.with(Scope::FREEBUSY);
const OBSERVANCE: Scope = Scope::STANDARD.with(Scope::DAYLIGHT);

// ─── Entries ─────────────────────────────────────────────────────────────────

/// Shape of the payload a registry entry produces.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
  String(StringKey),
  Integer(IntegerKey),
  Part(PartKey, PartParser),
}

/// One row of the registry.
#[derive(Debug, Clone, Copy)]
pub struct PartType {
  pub prefix:        &'static str,
  pub family:        Family,
  pub shape:         Shape,
  pub versions:      VersionRange,
  pub scope:         Scope,
  pub cardinality:   Cardinality,
  pub default_type:  Option<&'static str>,
  pub default_value: &'static str,
  /// TEXT-style backslash escaping applies when the value type is `text`.
  pub escaped:       bool,
}

impl PartType {
  const fn new(prefix: &'static str, family: Family, shape: Shape) -> Self {
    Self {
      prefix,
      family,
      shape,
      versions: match family {
        Family::Card => CARD_ALL,
        Family::Calendar => CAL_ALL,
      },
      scope: match family {
        Family::Card => Scope::CARD,
        Family::Calendar => ETJ,
      },
      cardinality: Cardinality::MayBeOne,
      default_type: None,
      default_value: "text",
      escaped: true,
    }
  }

  const fn versions(mut self, versions: VersionRange) -> Self {
    self.versions = versions;
    self
  }

  const fn scope(mut self, scope: Scope) -> Self {
    self.scope = scope;
    self
  }

  const fn many(mut self) -> Self {
    self.cardinality = Cardinality::MayBeMany;
    self
  }

  const fn cardinality(mut self, cardinality: Cardinality) -> Self {
    self.cardinality = cardinality;
    self
  }

  const fn default_type(mut self, default_type: &'static str) -> Self {
    self.default_type = Some(default_type);
    self
  }

  const fn value(mut self, default_value: &'static str) -> Self {
    self.default_value = default_value;
    self
  }

  /// The value has its own grammar and goes over the wire unescaped.
  const fn raw(mut self) -> Self {
    self.escaped = false;
    self
  }

  /// Whether a value of `value_type` is backslash-escaped on the wire.
  pub fn escapes(&self, value_type: &str) -> bool {
    self.escaped && value_type.eq_ignore_ascii_case("text")
  }

  pub fn category(&self) -> Category {
    match self.shape {
      Shape::String(key) => Category::String(key),
      Shape::Integer(key) => Category::Integer(key),
      Shape::Part(key, _) => Category::Part(key),
    }
  }
}

const CARD_ALL: VersionRange =
  VersionRange::between(Version::VCARD_21, Version::VCARD_40);
const CARD_21: VersionRange = VersionRange::only(Version::VCARD_21);
const CARD_30: VersionRange = VersionRange::only(Version::VCARD_30);
const CARD_40: VersionRange = VersionRange::only(Version::VCARD_40);
const CARD_UP_TO_30: VersionRange =
  VersionRange::between(Version::VCARD_21, Version::VCARD_30);
const CARD_FROM_30: VersionRange =
  VersionRange::between(Version::VCARD_30, Version::VCARD_40);
const CAL_ALL: VersionRange =
  VersionRange::between(Version::VCALENDAR_10, Version::VCALENDAR_20);
const CAL_10: VersionRange = VersionRange::only(Version::VCALENDAR_10);
const CAL_20: VersionRange = VersionRange::only(Version::VCALENDAR_20);

const fn card_string(prefix: &'static str, key: StringKey) -> PartType {
  PartType::new(prefix, Family::Card, Shape::String(key))
}

const fn card_part(
  prefix: &'static str,
  key: PartKey,
  parser: PartParser,
) -> PartType {
  PartType::new(prefix, Family::Card, Shape::Part(key, parser))
}

const fn cal_string(prefix: &'static str, key: StringKey) -> PartType {
  PartType::new(prefix, Family::Calendar, Shape::String(key))
}

const fn cal_integer(prefix: &'static str, key: IntegerKey) -> PartType {
  PartType::new(prefix, Family::Calendar, Shape::Integer(key))
}

const fn cal_part(
  prefix: &'static str,
  key: PartKey,
  parser: PartParser,
) -> PartType {
  PartType::new(prefix, Family::Calendar, Shape::Part(key, parser))
}

static TABLE: &[PartType] = &[
  // ── vCard strings ──
  card_string("FN", StringKey::FullName)
    .versions(CARD_UP_TO_30)
    .cardinality(Cardinality::ShouldBeOne),
  card_string("FN", StringKey::FullName)
    .versions(CARD_40)
    .cardinality(Cardinality::ShouldBeMany),
  card_string("KIND", StringKey::Kind).versions(CARD_40),
  card_string("MAILER", StringKey::Mailer).versions(CARD_UP_TO_30),
  card_string("PRODID", StringKey::ProductId).versions(CARD_FROM_30),
  card_string("SORT-STRING", StringKey::SortString).versions(CARD_30),
  card_string("CLASS", StringKey::Class).versions(CARD_30),
  card_string("UID", StringKey::Uid),
  card_string("NOTE", StringKey::Note).many(),
  card_string("URL", StringKey::Url).many().value("uri"),
  card_string("SOURCE", StringKey::Source)
    .versions(CARD_FROM_30)
    .many()
    .value("uri"),
  card_string("PROFILE", StringKey::Profile).versions(CARD_30),
  card_string("NAME", StringKey::Name).versions(CARD_30),
  card_string("TITLE", StringKey::Title).many(),
  card_string("ROLE", StringKey::Role).many(),
  card_string("EMAIL", StringKey::Email)
    .versions(CARD_UP_TO_30)
    .many()
    .default_type("INTERNET"),
  card_string("EMAIL", StringKey::Email).versions(CARD_40).many(),
  card_string("LABEL", StringKey::Label).versions(CARD_UP_TO_30).many(),
  card_string("XML", StringKey::Xml).versions(CARD_40).many(),
  card_string("FBURL", StringKey::FreeBusyUrl)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_string("CALURI", StringKey::CalendarUri)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_string("CALADRURI", StringKey::CalendarAddressUri)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_string("MEMBER", StringKey::Member)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_string("RELATED", StringKey::Related)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_string("LANG", StringKey::Language)
    .versions(CARD_40)
    .many()
    .value("language-tag"),
  // ── vCard parts ──
  card_part("N", PartKey::Name, parse_as::<NameInfo>),
  card_part("ADR", PartKey::Address, parse_as::<AddressInfo>).many(),
  card_part("ORG", PartKey::Organization, parse_as::<OrganizationInfo>)
    .versions(CARD_UP_TO_30),
  card_part("ORG", PartKey::Organization, parse_as::<OrganizationInfo>)
    .versions(CARD_40)
    .many(),
  card_part("GEO", PartKey::Geo, parse_as::<GeoInfo>).versions(CARD_UP_TO_30),
  card_part("GEO", PartKey::Geo, parse_as::<GeoInfo>)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_part("TEL", PartKey::Telephone, parse_as::<TelephoneInfo>)
    .versions(CARD_21)
    .many()
    .default_type("VOICE"),
  card_part("TEL", PartKey::Telephone, parse_as::<TelephoneInfo>)
    .versions(CARD_30)
    .many()
    .default_type("VOICE")
    .value("phone-number"),
  card_part("TEL", PartKey::Telephone, parse_as::<TelephoneInfo>)
    .versions(CARD_40)
    .many(),
  card_part("NICKNAME", PartKey::Nickname, parse_as::<TextListInfo>)
    .versions(CARD_FROM_30)
    .many(),
  card_part("CATEGORIES", PartKey::Categories, parse_as::<TextListInfo>)
    .versions(CARD_FROM_30)
    .many(),
  card_part("PHOTO", PartKey::Photo, parse_as::<BlobInfo>)
    .versions(CARD_21)
    .many()
    .value("inline"),
  card_part("PHOTO", PartKey::Photo, parse_as::<BlobInfo>)
    .versions(CARD_30)
    .many()
    .value("binary"),
  card_part("PHOTO", PartKey::Photo, parse_as::<BlobInfo>)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_part("LOGO", PartKey::Logo, parse_as::<BlobInfo>)
    .versions(CARD_21)
    .many()
    .value("inline"),
  card_part("LOGO", PartKey::Logo, parse_as::<BlobInfo>)
    .versions(CARD_30)
    .many()
    .value("binary"),
  card_part("LOGO", PartKey::Logo, parse_as::<BlobInfo>)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_part("SOUND", PartKey::Sound, parse_as::<BlobInfo>)
    .versions(CARD_21)
    .many()
    .value("inline"),
  card_part("SOUND", PartKey::Sound, parse_as::<BlobInfo>)
    .versions(CARD_30)
    .many()
    .value("binary"),
  card_part("SOUND", PartKey::Sound, parse_as::<BlobInfo>)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_part("KEY", PartKey::Key, parse_as::<BlobInfo>)
    .versions(CARD_21)
    .many()
    .value("inline"),
  card_part("KEY", PartKey::Key, parse_as::<BlobInfo>)
    .versions(CARD_30)
    .many()
    .value("binary"),
  card_part("KEY", PartKey::Key, parse_as::<BlobInfo>)
    .versions(CARD_40)
    .many()
    .value("uri"),
  card_part("BDAY", PartKey::Birthday, parse_as::<DateInfo>)
    .versions(CARD_UP_TO_30)
    .value("date"),
  card_part("BDAY", PartKey::Birthday, parse_as::<DateInfo>)
    .versions(CARD_40)
    .value("date-and-or-time"),
  card_part("ANNIVERSARY", PartKey::Anniversary, parse_as::<DateInfo>)
    .versions(CARD_40)
    .value("date-and-or-time"),
  card_part("REV", PartKey::Revision, parse_as::<DateInfo>)
    .versions(CARD_UP_TO_30)
    .value("date-time"),
  card_part("REV", PartKey::Revision, parse_as::<DateInfo>)
    .versions(CARD_40)
    .value("timestamp"),
  card_part("GENDER", PartKey::Gender, parse_as::<GenderInfo>)
    .versions(CARD_40),
  card_part("TZ", PartKey::TimeZone, parse_as::<TimeZoneInfo>)
    .versions(CARD_UP_TO_30)
    .value("utc-offset"),
  card_part("TZ", PartKey::TimeZone, parse_as::<TimeZoneInfo>)
    .versions(CARD_40)
    .many(),
  card_part("IMPP", PartKey::Impp, parse_as::<ImppInfo>)
    .versions(CARD_FROM_30)
    .many()
    .value("uri"),
  card_part("AGENT", PartKey::Agent, parse_as::<AgentInfo>)
    .versions(CARD_21)
    .many()
    .value("inline"),
  card_part("AGENT", PartKey::Agent, parse_as::<AgentInfo>)
    .versions(CARD_30)
    .many()
    .value("vcard"),
  card_part("CLIENTPIDMAP", PartKey::ClientPidMap, parse_as::<ClientPidMapInfo>)
    .versions(CARD_40)
    .many(),
  // ── vCalendar strings ──
  cal_string("PRODID", StringKey::ProductId).scope(Scope::CALENDAR),
  cal_string("METHOD", StringKey::Method)
    .versions(CAL_20)
    .scope(Scope::CALENDAR),
  cal_string("CALSCALE", StringKey::CalendarScale)
    .versions(CAL_20)
    .scope(Scope::CALENDAR),
  cal_string("TZ", StringKey::TimeZone)
    .versions(CAL_10)
    .scope(Scope::CALENDAR)
    .raw(),
  cal_string("DAYLIGHT", StringKey::Daylight)
    .versions(CAL_10)
    .scope(Scope::CALENDAR)
    .many()
    .raw(),
  cal_string("UID", StringKey::Uid).scope(COMPONENTS),
  cal_string("SUMMARY", StringKey::Summary).scope(ETJ.with(Scope::ALARM)),
  cal_string("DESCRIPTION", StringKey::Description)
    .scope(ET.with(Scope::ALARM)),
  cal_string("DESCRIPTION", StringKey::Description)
    .scope(Scope::JOURNAL)
    .many(),
  cal_string("LOCATION", StringKey::Location).scope(ET),
  cal_string("STATUS", StringKey::Status),
  cal_string("CLASS", StringKey::Class),
  cal_string("TRANSP", StringKey::Transparency).scope(Scope::EVENT),
  cal_string("COMMENT", StringKey::Comment)
    .versions(CAL_20)
    .scope(COMPONENTS.with(OBSERVANCE))
    .many(),
  cal_string("CONTACT", StringKey::Contact)
    .versions(CAL_20)
    .scope(COMPONENTS)
    .many(),
  cal_string("URL", StringKey::Url).scope(COMPONENTS).value("uri"),
  cal_string("ACTION", StringKey::Action)
    .versions(CAL_20)
    .scope(Scope::ALARM),
  cal_string("TZID", StringKey::TimeZoneId)
    .versions(CAL_20)
    .scope(Scope::TIMEZONE),
  cal_string("TZURL", StringKey::TimeZoneUrl)
    .versions(CAL_20)
    .scope(Scope::TIMEZONE)
    .value("uri"),
  cal_string("TZNAME", StringKey::TimeZoneName)
    .versions(CAL_20)
    .scope(OBSERVANCE)
    .many(),
  cal_string("RRULE", StringKey::RecurrenceRule)
    .versions(CAL_10)
    .scope(ET)
    .many()
    .raw(),
  cal_string("RRULE", StringKey::RecurrenceRule)
    .versions(CAL_20)
    .scope(ETJ.with(OBSERVANCE))
    .many()
    .value("recur"),
  cal_string("EXRULE", StringKey::ExceptionRule).many().value("recur"),
  cal_string("RELATED-TO", StringKey::RelatedTo).many(),
  cal_string("AALARM", StringKey::AudioAlarm)
    .versions(CAL_10)
    .scope(ET)
    .many()
    .raw(),
  cal_string("DALARM", StringKey::DisplayAlarm)
    .versions(CAL_10)
    .scope(ET)
    .many()
    .raw(),
  cal_string("MALARM", StringKey::MailAlarm)
    .versions(CAL_10)
    .scope(ET)
    .many()
    .raw(),
  cal_string("PALARM", StringKey::ProcedureAlarm)
    .versions(CAL_10)
    .scope(ET)
    .many()
    .raw(),
  // ── vCalendar integers ──
  cal_integer("PRIORITY", IntegerKey::Priority)
    .scope(ET)
    .value("integer"),
  cal_integer("PERCENT-COMPLETE", IntegerKey::PercentComplete)
    .versions(CAL_20)
    .scope(Scope::TODO)
    .value("integer"),
  cal_integer("SEQUENCE", IntegerKey::Sequence).value("integer"),
  cal_integer("RNUM", IntegerKey::RecurrenceCount)
    .versions(CAL_10)
    .scope(ET)
    .value("integer"),
  cal_integer("REPEAT", IntegerKey::Repeat)
    .versions(CAL_20)
    .scope(Scope::ALARM)
    .value("integer"),
  // ── vCalendar parts ──
  cal_part("DTSTART", PartKey::DateStart, parse_as::<DateTimeInfo>)
    .scope(ETJ.with(Scope::FREEBUSY).with(OBSERVANCE))
    .value("date-time"),
  cal_part("DTEND", PartKey::DateEnd, parse_as::<DateTimeInfo>)
    .scope(Scope::EVENT.with(Scope::FREEBUSY))
    .value("date-time"),
  cal_part("DUE", PartKey::Due, parse_as::<DateTimeInfo>)
    .scope(Scope::TODO)
    .value("date-time"),
  cal_part("DTSTAMP", PartKey::DateStamp, parse_as::<DateTimeInfo>)
    .versions(CAL_20)
    .scope(COMPONENTS)
    .value("date-time"),
  cal_part("DCREATED", PartKey::Created, parse_as::<DateTimeInfo>)
    .versions(CAL_10)
    .scope(ET)
    .value("date-time"),
  cal_part("CREATED", PartKey::Created, parse_as::<DateTimeInfo>)
    .versions(CAL_20)
    .value("date-time"),
  cal_part("LAST-MODIFIED", PartKey::LastModified, parse_as::<DateTimeInfo>)
    .scope(ETJ.with(Scope::TIMEZONE))
    .value("date-time"),
  cal_part("COMPLETED", PartKey::Completed, parse_as::<DateTimeInfo>)
    .scope(Scope::TODO)
    .value("date-time"),
  cal_part("RECURRENCE-ID", PartKey::RecurrenceId, parse_as::<DateTimeInfo>)
    .versions(CAL_20)
    .value("date-time"),
  cal_part("DURATION", PartKey::Duration, parse_as::<DurationInfo>)
    .versions(CAL_20)
    .scope(ET.with(Scope::FREEBUSY).with(Scope::ALARM))
    .value("duration"),
  cal_part("TRIGGER", PartKey::Trigger, parse_as::<TriggerInfo>)
    .versions(CAL_20)
    .scope(Scope::ALARM)
    .value("duration"),
  cal_part("ATTENDEE", PartKey::Attendee, parse_as::<CalAddressInfo>)
    .versions(CAL_10)
    .scope(ET)
    .many(),
  cal_part("ATTENDEE", PartKey::Attendee, parse_as::<CalAddressInfo>)
    .versions(CAL_20)
    .scope(COMPONENTS.with(Scope::ALARM))
    .many()
    .value("cal-address"),
  cal_part("ORGANIZER", PartKey::Organizer, parse_as::<CalAddressInfo>)
    .versions(CAL_20)
    .scope(COMPONENTS)
    .value("cal-address"),
  cal_part("ATTACH", PartKey::Attach, parse_as::<BlobInfo>)
    .scope(ETJ.with(Scope::ALARM))
    .many()
    .value("uri"),
  cal_part("CATEGORIES", PartKey::Categories, parse_as::<TextListInfo>)
    .many(),
  cal_part("RESOURCES", PartKey::Resources, parse_as::<TextListInfo>)
    .scope(ET)
    .many(),
  cal_part("GEO", PartKey::Geo, parse_as::<GeoInfo>)
    .scope(ET)
    .value("float"),
  cal_part("EXDATE", PartKey::ExceptionDates, parse_as::<DateListInfo>)
    .scope(ETJ.with(OBSERVANCE))
    .many()
    .value("date-time"),
  cal_part("RDATE", PartKey::RecurrenceDates, parse_as::<DateListInfo>)
    .scope(ETJ.with(OBSERVANCE))
    .many()
    .value("date-time"),
  cal_part("FREEBUSY", PartKey::FreeBusy, parse_as::<FreeBusyInfo>)
    .versions(CAL_20)
    .scope(Scope::FREEBUSY)
    .many()
    .value("period"),
  cal_part(
    "REQUEST-STATUS",
    PartKey::RequestStatus,
    parse_as::<RequestStatusInfo>,
  )
  .versions(CAL_20)
  .scope(COMPONENTS)
  .many(),
  cal_part("TZOFFSETFROM", PartKey::TimeZoneOffsetFrom, parse_as::<UtcOffsetInfo>)
    .versions(CAL_20)
    .scope(OBSERVANCE)
    .value("utc-offset"),
  cal_part("TZOFFSETTO", PartKey::TimeZoneOffsetTo, parse_as::<UtcOffsetInfo>)
    .versions(CAL_20)
    .scope(OBSERVANCE)
    .value("utc-offset"),
];

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Result of resolving a property name against a component.
#[derive(Debug, Clone, Copy)]
pub enum Resolved {
  Known(&'static PartType),
  /// Vendor `X-` property.
  Extension,
  /// Unregistered token kept in the free-form extras map.
  Iana,
}

/// Resolve `prefix` for a component of `kind` bound to `version`.
///
/// Fails with [`Error::VersionMismatch`] when the prefix is registered for the
/// family but not for `version`, and with [`Error::UnknownProperty`] when the
/// version accepts only `X-` extensions.
pub fn lookup(
  prefix: &str,
  version: Version,
  kind: &ComponentKind,
) -> Result<Resolved> {
  let upper = prefix.to_ascii_uppercase();
  if upper.starts_with("X-") {
    return Ok(Resolved::Extension);
  }

  let family = kind.family();
  let name = upper.as_str();
  let rows = || {
    TABLE
      .iter()
      .filter(move |e| e.family == family && e.prefix == name)
  };
  if let Some(entry) = rows()
    .find(|e| e.versions.accepts(version) && e.scope.contains(kind.scope()))
  {
    return Ok(Resolved::Known(entry));
  }
  if rows().next().is_some() && !rows().any(|e| e.versions.accepts(version)) {
    return Err(Error::VersionMismatch {
      subject: upper,
      version: version.to_string(),
    });
  }

  if syntax(family, version).iana_tokens
    || matches!(kind, ComponentKind::Other(_))
  {
    Ok(Resolved::Iana)
  } else {
    Err(Error::UnknownProperty(upper))
  }
}

/// Find the entry that serializes `category` for a component of `kind`.
pub fn reverse_lookup(
  category: Category,
  version: Version,
  kind: &ComponentKind,
) -> Option<&'static PartType> {
  let family = kind.family();
  TABLE.iter().find(|e| {
    e.family == family
      && e.category() == category
      && e.versions.accepts(version)
      && e.scope.contains(kind.scope())
  })
}

/// Find the entry for a known prefix regardless of scope, used by the
/// validator to name required properties.
pub(crate) fn category_of(
  prefix: &str,
  family: Family,
  version: Version,
) -> Option<Category> {
  TABLE
    .iter()
    .find(|e| {
      e.family == family && e.prefix == prefix && e.versions.accepts(version)
    })
    .map(PartType::category)
}

// ─── Syntax ──────────────────────────────────────────────────────────────────

/// Whether legacy bare-flag arguments (`;HOME`) are understood and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BareFlags {
  Rejected,
  Accepted,
  /// Accepted on input and used on output.
  Preferred,
}

/// Version-dependent textual rules.
#[derive(Debug)]
pub struct Syntax {
  pub geo_separator:    char,
  /// GEO is a `geo:` URI rather than two bare floats.
  pub geo_uri:          bool,
  pub bare_flags:       BareFlags,
  pub alt_id:           bool,
  /// `ENCODING` token for inline blobs; `None` means `data:` URIs.
  pub inline_encoding:  Option<&'static str>,
  pub lowercase_types:  bool,
  /// Multi-line text is written quoted-printable instead of `\n` escaped.
  pub quoted_printable: bool,
  /// Unregistered non-`X-` names go to the extras map instead of failing.
  pub iana_tokens:      bool,
  pub list_separator:   char,
  /// Cards may nest whole agent cards with `BEGIN:VCARD`.
  pub nested_agents:    bool,
  /// Structured values may drop trailing empty components.
  pub pad_structured:   bool,
  /// VJOURNAL, VFREEBUSY, VTIMEZONE and VALARM exist.
  pub ical_components:  bool,
}

static CARD_21_SYNTAX: Syntax = Syntax {
  geo_separator:    ';',
  geo_uri:          false,
  bare_flags:       BareFlags::Preferred,
  alt_id:           false,
  inline_encoding:  Some("BASE64"),
  lowercase_types:  false,
  quoted_printable: true,
  iana_tokens:      false,
  list_separator:   ',',
  nested_agents:    true,
  pad_structured:   true,
  ical_components:  false,
};

static CARD_30_SYNTAX: Syntax = Syntax {
  geo_separator:    ';',
  geo_uri:          false,
  bare_flags:       BareFlags::Accepted,
  alt_id:           false,
  inline_encoding:  Some("b"),
  lowercase_types:  false,
  quoted_printable: false,
  iana_tokens:      true,
  list_separator:   ',',
  nested_agents:    false,
  pad_structured:   true,
  ical_components:  false,
};

static CARD_40_SYNTAX: Syntax = Syntax {
  geo_separator:    ',',
  geo_uri:          true,
  bare_flags:       BareFlags::Rejected,
  alt_id:           true,
  inline_encoding:  None,
  lowercase_types:  true,
  quoted_printable: false,
  iana_tokens:      true,
  list_separator:   ',',
  nested_agents:    false,
  pad_structured:   false,
  ical_components:  false,
};

static CAL_10_SYNTAX: Syntax = Syntax {
  geo_separator:    ';',
  geo_uri:          false,
  bare_flags:       BareFlags::Preferred,
  alt_id:           false,
  inline_encoding:  Some("BASE64"),
  lowercase_types:  false,
  quoted_printable: true,
  iana_tokens:      false,
  list_separator:   ';',
  nested_agents:    false,
  pad_structured:   false,
  ical_components:  false,
};

static CAL_20_SYNTAX: Syntax = Syntax {
  geo_separator:    ',',
  geo_uri:          false,
  bare_flags:       BareFlags::Rejected,
  alt_id:           false,
  inline_encoding:  Some("BASE64"),
  lowercase_types:  false,
  quoted_printable: false,
  iana_tokens:      true,
  list_separator:   ',',
  nested_agents:    false,
  pad_structured:   false,
  ical_components:  true,
};

/// Textual rules for `family` at `version`. Unknown versions fall back to the
/// newest rules of the family.
pub fn syntax(family: Family, version: Version) -> &'static Syntax {
  match (family, version) {
    (Family::Card, Version::VCARD_21) => &CARD_21_SYNTAX,
    (Family::Card, Version::VCARD_30) => &CARD_30_SYNTAX,
    (Family::Card, _) => &CARD_40_SYNTAX,
    (Family::Calendar, Version::VCALENDAR_10) => &CAL_10_SYNTAX,
    (Family::Calendar, _) => &CAL_20_SYNTAX,
  }
}

// ─── Required fields ─────────────────────────────────────────────────────────

/// Prefixes a component of `kind` must carry at `version`. `has_method` is
/// whether the enclosing calendar declares a `METHOD`.
pub fn required_fields(
  kind: &ComponentKind,
  version: Version,
  has_method: bool,
) -> Vec<&'static str> {
  let modern = version == Version::VCALENDAR_20;
  match kind {
    ComponentKind::Card => match version {
      Version::VCARD_21 => vec!["N"],
      Version::VCARD_30 => vec!["N", "FN"],
      _ => vec!["FN"],
    },
    ComponentKind::Calendar if modern => vec!["PRODID"],
    ComponentKind::Event if modern && has_method => vec!["UID", "DTSTAMP"],
    ComponentKind::Event if modern => vec!["UID", "DTSTAMP", "DTSTART"],
    ComponentKind::Todo | ComponentKind::Journal | ComponentKind::FreeBusy
      if modern =>
    {
      vec!["UID", "DTSTAMP"]
    }
    ComponentKind::TimeZone if modern => vec!["TZID"],
    ComponentKind::Standard | ComponentKind::Daylight if modern => {
      vec!["DTSTART", "TZOFFSETFROM", "TZOFFSETTO"]
    }
    ComponentKind::Alarm if modern => vec!["ACTION", "TRIGGER"],
    _ => Vec::new(),
  }
}

/// Extra prefixes an alarm needs for a given `ACTION` value.
pub fn alarm_action_fields(action: &str) -> &'static [&'static str] {
  match action.to_ascii_uppercase().as_str() {
    "DISPLAY" => &["DESCRIPTION"],
    "EMAIL" => &["DESCRIPTION", "SUMMARY", "ATTENDEE"],
    _ => &[],
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  fn known(prefix: &str, version: Version, kind: ComponentKind) -> PartType {
    match lookup(prefix, version, &kind).unwrap() {
      Resolved::Known(entry) => *entry,
      other => panic!("{prefix} resolved to {other:?}"),
    }
  }

  #[test]
  fn cardinality_follows_version() {
    let fn30 = known("FN", Version::VCARD_30, ComponentKind::Card);
    let fn40 = known("fn", Version::VCARD_40, ComponentKind::Card);
    assert!(fn30.cardinality.is_single());
    assert!(!fn40.cardinality.is_single());
  }

  #[test]
  fn defaults_follow_version() {
    let photo21 = known("PHOTO", Version::VCARD_21, ComponentKind::Card);
    let photo40 = known("PHOTO", Version::VCARD_40, ComponentKind::Card);
    assert_eq!(photo21.default_value, "inline");
    assert_eq!(photo40.default_value, "uri");
    let tel = known("TEL", Version::VCARD_30, ComponentKind::Card);
    assert_eq!(tel.default_type, Some("VOICE"));
  }

  #[test]
  fn x_names_are_extensions() {
    assert!(matches!(
      lookup("X-CUSTOM", Version::VCARD_21, &ComponentKind::Card),
      Ok(Resolved::Extension)
    ));
  }

  #[test]
  fn unknown_tokens_depend_on_version() {
    assert!(matches!(
      lookup("FOO", Version::VCARD_30, &ComponentKind::Card),
      Ok(Resolved::Iana)
    ));
    assert!(matches!(
      lookup("FOO", Version::VCARD_21, &ComponentKind::Card),
      Err(Error::UnknownProperty(_))
    ));
  }

  #[test]
  fn registered_prefix_outside_its_versions_is_a_mismatch() {
    assert!(matches!(
      lookup("KIND", Version::VCARD_30, &ComponentKind::Card),
      Err(Error::VersionMismatch { .. })
    ));
  }

  #[test]
  fn scope_separates_component_kinds() {
    let journal =
      known("DESCRIPTION", Version::VCALENDAR_20, ComponentKind::Journal);
    let event =
      known("DESCRIPTION", Version::VCALENDAR_20, ComponentKind::Event);
    assert!(!journal.cardinality.is_single());
    assert!(event.cardinality.is_single());
    assert!(matches!(
      lookup("TZOFFSETTO", Version::VCALENDAR_20, &ComponentKind::Event),
      Ok(Resolved::Iana)
    ));
  }

  #[test]
  fn reverse_lookup_renames_per_version() {
    let created = Category::Part(PartKey::Created);
    let v1 =
      reverse_lookup(created, Version::VCALENDAR_10, &ComponentKind::Event)
        .unwrap();
    let v2 =
      reverse_lookup(created, Version::VCALENDAR_20, &ComponentKind::Event)
        .unwrap();
    assert_eq!(v1.prefix, "DCREATED");
    assert_eq!(v2.prefix, "CREATED");
  }

  #[test]
  fn every_part_key_is_registered() {
    for key in PartKey::iter() {
      assert!(
        TABLE.iter().any(|e| e.category() == Category::Part(key)),
        "{key} has no registry entry"
      );
    }
    for key in StringKey::iter() {
      assert!(
        TABLE.iter().any(|e| e.category() == Category::String(key)),
        "{key} has no registry entry"
      );
    }
    for key in IntegerKey::iter() {
      assert!(
        TABLE.iter().any(|e| e.category() == Category::Integer(key)),
        "{key} has no registry entry"
      );
    }
  }

  #[test]
  fn no_duplicate_rows() {
    for (i, a) in TABLE.iter().enumerate() {
      for b in &TABLE[i + 1..] {
        let overlap = a.family == b.family
          && a.prefix == b.prefix
          && a.versions.min <= b.versions.max
          && b.versions.min <= a.versions.max
          && (a.scope.0 & b.scope.0) != 0;
        assert!(!overlap, "{} registered twice", a.prefix);
      }
    }
  }

  #[test]
  fn only_text_values_are_escaped() {
    let summary =
      known("SUMMARY", Version::VCALENDAR_20, ComponentKind::Event);
    let rule = known("RRULE", Version::VCALENDAR_20, ComponentKind::Event);
    let legacy_rule =
      known("RRULE", Version::VCALENDAR_10, ComponentKind::Event);
    let related = known("RELATED", Version::VCARD_40, ComponentKind::Card);
    assert!(summary.escapes(summary.default_value));
    assert!(!rule.escapes(rule.default_value));
    assert!(!legacy_rule.escapes(legacy_rule.default_value));
    assert!(!related.escapes(related.default_value));
    assert!(related.escapes("TEXT"));
  }

  #[test]
  fn required_fields_depend_on_method() {
    let with =
      required_fields(&ComponentKind::Event, Version::VCALENDAR_20, true);
    let without =
      required_fields(&ComponentKind::Event, Version::VCALENDAR_20, false);
    assert!(!with.contains(&"DTSTART"));
    assert!(without.contains(&"DTSTART"));
  }
}
