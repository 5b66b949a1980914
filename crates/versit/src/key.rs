//! Closed property identities, one enum per identity space.
//!
//! The wire name of a key depends on the family and version, so keys carry no
//! prefix themselves; [`registry::reverse_lookup`](crate::registry) maps them
//! back.

use serde::Serialize;

/// Single-valued textual properties.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  strum::Display,
  strum::EnumIter,
)]
pub enum StringKey {
  // vCard
  FullName,
  Kind,
  Mailer,
  SortString,
  Note,
  Source,
  Profile,
  Name,
  Title,
  Role,
  Email,
  Label,
  Xml,
  FreeBusyUrl,
  CalendarUri,
  CalendarAddressUri,
  Member,
  Related,
  Language,

  // Shared
  ProductId,
  Class,
  Uid,
  Url,

  // vCalendar
  Method,
  CalendarScale,
  Summary,
  Description,
  Location,
  Status,
  Transparency,
  Comment,
  Contact,
  Action,
  TimeZoneId,
  TimeZoneUrl,
  TimeZoneName,
  RecurrenceRule,
  ExceptionRule,
  RelatedTo,
  TimeZone,
  Daylight,
  AudioAlarm,
  DisplayAlarm,
  MailAlarm,
  ProcedureAlarm,
}

/// Numeric scalar properties.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  strum::Display,
  strum::EnumIter,
)]
pub enum IntegerKey {
  Priority,
  PercentComplete,
  Sequence,
  Repeat,
  /// vCalendar 1.0 `RNUM`: how many times the rule repeats.
  RecurrenceCount,
}

/// Properties with a structured payload (see [`PartValue`](crate::part::PartValue)).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  strum::Display,
  strum::EnumIter,
)]
pub enum PartKey {
  // vCard
  Name,
  Address,
  Organization,
  Telephone,
  Nickname,
  Photo,
  Logo,
  Sound,
  Key,
  Birthday,
  Anniversary,
  Revision,
  Gender,
  TimeZone,
  Impp,
  Agent,
  ClientPidMap,

  // Shared
  Geo,
  Categories,

  // vCalendar
  DateStart,
  DateEnd,
  Due,
  DateStamp,
  Created,
  LastModified,
  Completed,
  RecurrenceId,
  Duration,
  Trigger,
  Attendee,
  Organizer,
  Attach,
  Resources,
  ExceptionDates,
  RecurrenceDates,
  FreeBusy,
  RequestStatus,
  TimeZoneOffsetFrom,
  TimeZoneOffsetTo,
}

/// Which identity space a registry entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
  String(StringKey),
  Integer(IntegerKey),
  Part(PartKey),
}

/// How many instances of a property one component may hold.
///
/// The `Should*` variants are advisory; insertion only distinguishes single
/// from many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cardinality {
  MayBeOne,
  ShouldBeOne,
  MayBeMany,
  ShouldBeMany,
}

impl Cardinality {
  pub fn is_single(self) -> bool {
    matches!(self, Self::MayBeOne | Self::ShouldBeOne)
  }
}
