//! Dates, date-times, durations, UTC offsets and the list payloads built from
//! them.
//!
//! Values are read in either the basic (`20240105T101500Z`) or extended
//! (`2024-01-05T10:15:00Z`) ISO 8601 form and always written in basic form.

use chrono::{
  DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
  TimeZone, Utc,
};
use serde::Serialize;

use super::PartInfo;
use crate::{
  error::{Error, Result},
  property::ValueContext,
  text::{escape, unescape},
};

// ─── Moments ─────────────────────────────────────────────────────────────────

/// A date, a floating local date-time, or a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum DateTimeInfo {
  Date(NaiveDate),
  Floating(NaiveDateTime),
  Utc(DateTime<Utc>),
}

impl DateTimeInfo {
  /// Parse a date or date-time. Explicit offsets are normalised to UTC.
  pub fn parse(s: &str) -> Option<Self> {
    let s = s.trim();
    let (date, time) = match s.split_once(['T', 't']) {
      Some((date, time)) => (date, Some(time)),
      None => (s, None),
    };
    let date = parse_date(date)?;
    let Some(time) = time else {
      return Some(Self::Date(date));
    };

    let (clock, offset) = split_offset(time)?;
    let naive = date.and_time(parse_clock(clock)?);
    match offset {
      Offset::Floating => Some(Self::Floating(naive)),
      Offset::Utc => Some(Self::Utc(Utc.from_utc_datetime(&naive))),
      Offset::Fixed(seconds) => {
        let zone = FixedOffset::east_opt(seconds)?;
        let local = zone.from_local_datetime(&naive).single()?;
        Some(Self::Utc(local.with_timezone(&Utc)))
      }
    }
  }

  pub fn date(&self) -> NaiveDate {
    match self {
      Self::Date(date) => *date,
      Self::Floating(dt) => dt.date(),
      Self::Utc(dt) => dt.date_naive(),
    }
  }

  pub fn is_date(&self) -> bool { matches!(self, Self::Date(_)) }
}

impl std::fmt::Display for DateTimeInfo {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Date(date) => write!(f, "{}", date.format("%Y%m%d")),
      Self::Floating(dt) => write!(f, "{}", dt.format("%Y%m%dT%H%M%S")),
      Self::Utc(dt) => write!(f, "{}", dt.format("%Y%m%dT%H%M%SZ")),
    }
  }
}

impl PartInfo for DateTimeInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    Self::parse(raw).ok_or_else(|| not_a(ctx, raw, "date-time"))
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String { self.to_string() }
}

fn not_a(ctx: &ValueContext<'_>, raw: &str, what: &str) -> Error {
  Error::malformed_value(ctx.property, format!("{raw:?} is not a valid {what}"))
}

fn digits(s: &str) -> Option<u32> {
  if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  s.parse().ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
  let compact = s.replace('-', "");
  if compact.len() != 8 || !compact.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  NaiveDate::from_ymd_opt(
    digits(&compact[..4])? as i32,
    digits(&compact[4..6])?,
    digits(&compact[6..])?,
  )
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
  let compact = s.replace(':', "");
  // Fractional seconds are accepted and dropped.
  let compact = compact.split(['.', ',']).next().unwrap_or_default();
  if !compact.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  match compact.len() {
    4 => NaiveTime::from_hms_opt(
      digits(&compact[..2])?,
      digits(&compact[2..])?,
      0,
    ),
    6 => NaiveTime::from_hms_opt(
      digits(&compact[..2])?,
      digits(&compact[2..4])?,
      digits(&compact[4..])?,
    ),
    _ => None,
  }
}

enum Offset {
  Floating,
  Utc,
  Fixed(i32),
}

fn split_offset(time: &str) -> Option<(&str, Offset)> {
  if let Some(clock) = time.strip_suffix(['Z', 'z']) {
    return Some((clock, Offset::Utc));
  }
  match time.rfind(['+', '-']) {
    Some(at) => {
      let seconds = parse_offset(&time[at..])?;
      Some((&time[..at], Offset::Fixed(seconds)))
    }
    None => Some((time, Offset::Floating)),
  }
}

/// Parse `+HHMM`, `+HH:MM`, `+HH` or `+HHMMSS` into signed seconds.
fn parse_offset(s: &str) -> Option<i32> {
  let (sign, rest) = match s.as_bytes().first()? {
    b'+' => (1, &s[1..]),
    b'-' => (-1, &s[1..]),
    _ => return None,
  };
  let compact = rest.replace(':', "");
  if !compact.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  let (hours, minutes, seconds) = match compact.len() {
    2 => (digits(&compact)?, 0, 0),
    4 => (digits(&compact[..2])?, digits(&compact[2..])?, 0),
    6 => (
      digits(&compact[..2])?,
      digits(&compact[2..4])?,
      digits(&compact[4..])?,
    ),
    _ => return None,
  };
  if hours > 23 || minutes > 59 || seconds > 59 {
    return None;
  }
  Some(sign * (hours * 3600 + minutes * 60 + seconds) as i32)
}

// ─── vCard dates ─────────────────────────────────────────────────────────────

/// `BDAY`, `ANNIVERSARY`, `REV`: a full moment, a reduced-precision date, or
/// free text under `VALUE=text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum DateInfo {
  Moment(DateTimeInfo),
  Partial {
    year:  Option<i32>,
    month: Option<u32>,
    day:   Option<u32>,
  },
  Text(String),
}

impl DateInfo {
  fn parse_partial(s: &str) -> Option<Self> {
    let valid_month = |m: u32| (1..=12).contains(&m);
    let valid_day = |d: u32| (1..=31).contains(&d);

    if let Some(day) = s.strip_prefix("---") {
      let day = digits(day).filter(|d| valid_day(*d) && day.len() == 2)?;
      return Some(Self::Partial { year: None, month: None, day: Some(day) });
    }
    if let Some(rest) = s.strip_prefix("--") {
      let month = digits(rest.get(..2)?).filter(|m| valid_month(*m))?;
      let day = match rest.get(2..) {
        Some("") | None => None,
        Some(d) => {
          let d = digits(d.trim_start_matches('-')).filter(|d| valid_day(*d))?;
          Some(d)
        }
      };
      return Some(Self::Partial { year: None, month: Some(month), day });
    }
    match s.len() {
      4 => Some(Self::Partial {
        year:  Some(digits(s)? as i32),
        month: None,
        day:   None,
      }),
      7 if s.as_bytes()[4] == b'-' => Some(Self::Partial {
        year:  Some(digits(s.get(..4)?)? as i32),
        month: Some(digits(s.get(5..)?).filter(|m| valid_month(*m))?),
        day:   None,
      }),
      9 if s.get(4..7) == Some("---") => Some(Self::Partial {
        year:  Some(digits(s.get(..4)?)? as i32),
        month: None,
        day:   Some(digits(s.get(7..)?).filter(|d| valid_day(*d))?),
      }),
      _ => None,
    }
  }
}

impl PartInfo for DateInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    if ctx.value_type_is(&["text"]) {
      return Ok(Self::Text(unescape(raw)));
    }
    let raw = raw.trim();
    Self::parse_partial(raw)
      .or_else(|| DateTimeInfo::parse(raw).map(Self::Moment))
      .ok_or_else(|| not_a(ctx, raw, "date"))
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    match self {
      Self::Moment(moment) => moment.to_string(),
      Self::Text(text) => escape(text),
      Self::Partial { year, month, day } => match (year, month, day) {
        (Some(y), Some(m), Some(d)) => format!("{y:04}{m:02}{d:02}"),
        (Some(y), Some(m), None) => format!("{y:04}-{m:02}"),
        (Some(y), None, Some(d)) => format!("{y:04}---{d:02}"),
        (Some(y), None, None) => format!("{y:04}"),
        (None, Some(m), Some(d)) => format!("--{m:02}{d:02}"),
        (None, Some(m), None) => format!("--{m:02}"),
        (None, None, Some(d)) => format!("---{d:02}"),
        (None, None, None) => String::new(),
      },
    }
  }
}

// ─── Durations ───────────────────────────────────────────────────────────────

/// An ISO 8601 duration such as `-P1DT2H` or `P2W`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DurationInfo {
  pub negative: bool,
  pub weeks:    u32,
  pub days:     u32,
  pub hours:    u32,
  pub minutes:  u32,
  pub seconds:  u32,
}

impl DurationInfo {
  pub fn parse(s: &str) -> Option<Self> {
    let s = s.trim();
    let (negative, rest) = match s.as_bytes().first()? {
      b'-' => (true, &s[1..]),
      b'+' => (false, &s[1..]),
      _ => (false, s),
    };
    let rest = rest.strip_prefix(['P', 'p'])?;

    let mut duration = Self { negative, ..Self::default() };
    let mut in_time = false;
    let mut seen_component = false;
    let mut number = String::new();
    for c in rest.chars() {
      match c.to_ascii_uppercase() {
        'T' if number.is_empty() && !in_time => in_time = true,
        d if d.is_ascii_digit() => number.push(d),
        designator => {
          let value = digits(&number)?;
          number.clear();
          let slot = match (designator, in_time) {
            ('W', false) => &mut duration.weeks,
            ('D', false) => &mut duration.days,
            ('H', true) => &mut duration.hours,
            ('M', true) => &mut duration.minutes,
            ('S', true) => &mut duration.seconds,
            _ => return None,
          };
          *slot = value;
          seen_component = true;
        }
      }
    }
    (number.is_empty() && seen_component).then_some(duration)
  }

  /// Signed length of the duration.
  pub fn to_delta(&self) -> TimeDelta {
    let seconds = i64::from(self.weeks) * 7 * 86_400
      + i64::from(self.days) * 86_400
      + i64::from(self.hours) * 3_600
      + i64::from(self.minutes) * 60
      + i64::from(self.seconds);
    TimeDelta::seconds(if self.negative { -seconds } else { seconds })
  }
}

impl std::fmt::Display for DurationInfo {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.negative {
      f.write_str("-")?;
    }
    f.write_str("P")?;
    if self.weeks > 0 {
      write!(f, "{}W", self.weeks)?;
    }
    if self.days > 0 {
      write!(f, "{}D", self.days)?;
    }
    let has_time = self.hours > 0 || self.minutes > 0 || self.seconds > 0;
    if has_time || (self.weeks == 0 && self.days == 0) {
      f.write_str("T")?;
    }
    if self.hours > 0 {
      write!(f, "{}H", self.hours)?;
    }
    if self.minutes > 0 {
      write!(f, "{}M", self.minutes)?;
    }
    if self.seconds > 0 || (!has_time && self.weeks == 0 && self.days == 0) {
      write!(f, "{}S", self.seconds)?;
    }
    Ok(())
  }
}

impl PartInfo for DurationInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    Self::parse(raw).ok_or_else(|| not_a(ctx, raw, "duration"))
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String { self.to_string() }
}

// ─── Offsets ─────────────────────────────────────────────────────────────────

/// `TZOFFSETFROM`, `TZOFFSETTO`: a signed offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UtcOffsetInfo {
  pub seconds: i32,
}

impl UtcOffsetInfo {
  /// `+HHMM[SS]`, or `+HH:MM[:SS]` when `extended`.
  pub fn format(&self, extended: bool) -> String {
    let sign = if self.seconds < 0 { '-' } else { '+' };
    let total = self.seconds.unsigned_abs();
    let (h, m, s) = (total / 3600, total % 3600 / 60, total % 60);
    let sep = if extended { ":" } else { "" };
    if s == 0 {
      format!("{sign}{h:02}{sep}{m:02}")
    } else {
      format!("{sign}{h:02}{sep}{m:02}{sep}{s:02}")
    }
  }

  pub fn to_fixed_offset(&self) -> Option<FixedOffset> {
    FixedOffset::east_opt(self.seconds)
  }
}

impl PartInfo for UtcOffsetInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    parse_offset(raw.trim())
      .map(|seconds| Self { seconds })
      .ok_or_else(|| not_a(ctx, raw, "UTC offset"))
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String { self.format(false) }
}

/// vCard `TZ`: an offset, or a zone name / URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum TimeZoneInfo {
  Offset(UtcOffsetInfo),
  Text(String),
}

impl PartInfo for TimeZoneInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    if ctx.value_type_is(&["utc-offset"]) {
      return UtcOffsetInfo::from_value(raw, ctx).map(Self::Offset);
    }
    if ctx.value_type_is(&["uri"]) {
      return Ok(Self::Text(raw.to_string()));
    }
    Ok(Self::Text(unescape(raw)))
  }

  fn to_value(&self, ctx: &ValueContext<'_>) -> String {
    match self {
      Self::Offset(offset) => offset.format(true),
      Self::Text(uri) if ctx.value_type_is(&["uri"]) => uri.clone(),
      Self::Text(text) => escape(text),
    }
  }
}

// ─── Triggers ────────────────────────────────────────────────────────────────

/// `TRIGGER`: an offset from the related start/end, or an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum TriggerInfo {
  Relative(DurationInfo),
  Absolute(DateTime<Utc>),
}

impl PartInfo for TriggerInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    if ctx.value_type_is(&["date-time"]) {
      return match DateTimeInfo::parse(raw) {
        Some(DateTimeInfo::Utc(instant)) => Ok(Self::Absolute(instant)),
        _ => Err(not_a(ctx, raw, "UTC date-time")),
      };
    }
    DurationInfo::from_value(raw, ctx).map(Self::Relative)
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    match self {
      Self::Relative(duration) => duration.to_string(),
      Self::Absolute(instant) => DateTimeInfo::Utc(*instant).to_string(),
    }
  }
}

// ─── Periods and lists ───────────────────────────────────────────────────────

/// A period of time: `start/end` or `start/duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
  pub start: DateTimeInfo,
  pub end:   PeriodEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum PeriodEnd {
  End(DateTimeInfo),
  Duration(DurationInfo),
}

impl Period {
  pub fn parse(s: &str) -> Option<Self> {
    let (start, end) = s.trim().split_once('/')?;
    let start = DateTimeInfo::parse(start)?;
    let end = if end.trim_start_matches(['+', '-']).starts_with(['P', 'p']) {
      PeriodEnd::Duration(DurationInfo::parse(end)?)
    } else {
      PeriodEnd::End(DateTimeInfo::parse(end)?)
    };
    Some(Self { start, end })
  }
}

impl std::fmt::Display for Period {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.end {
      PeriodEnd::End(end) => write!(f, "{}/{}", self.start, end),
      PeriodEnd::Duration(duration) => write!(f, "{}/{}", self.start, duration),
    }
  }
}

fn parse_list<T>(
  raw: &str,
  separator: char,
  parse: impl Fn(&str) -> Option<T>,
  ctx: &ValueContext<'_>,
  what: &str,
) -> Result<Vec<T>> {
  raw
    .split(separator)
    .filter(|item| !item.trim().is_empty())
    .map(|item| parse(item).ok_or_else(|| not_a(ctx, item, what)))
    .collect()
}

fn join_list<T: std::fmt::Display>(items: &[T], separator: char) -> String {
  items
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(&separator.to_string())
}

/// `EXDATE`, `RDATE`: a list of moments, or of periods under `VALUE=PERIOD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum DateListInfo {
  Dates(Vec<DateTimeInfo>),
  Periods(Vec<Period>),
}

impl PartInfo for DateListInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    let separator = ctx.syntax.list_separator;
    if ctx.value_type_is(&["period"]) {
      return parse_list(raw, separator, Period::parse, ctx, "period")
        .map(Self::Periods);
    }
    parse_list(raw, separator, DateTimeInfo::parse, ctx, "date-time")
      .map(Self::Dates)
  }

  fn to_value(&self, ctx: &ValueContext<'_>) -> String {
    let separator = ctx.syntax.list_separator;
    match self {
      Self::Dates(dates) => join_list(dates, separator),
      Self::Periods(periods) => join_list(periods, separator),
    }
  }
}

/// `FREEBUSY`: busy periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FreeBusyInfo {
  pub periods: Vec<Period>,
}

impl PartInfo for FreeBusyInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    let periods = parse_list(raw, ',', Period::parse, ctx, "period")?;
    Ok(Self { periods })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    join_list(&self.periods, ',')
  }
}
