//! Structured property payloads.
//!
//! Each payload type implements [`PartInfo`]: a parser from the raw (still
//! escaped) value and a renderer back to it, both given the
//! [`ValueContext`] of the property. The registry stores
//! [`parse_as::<T>`](parse_as) as the parser for every structured entry.

mod blob;
mod datetime;
mod structured;
mod text;

pub use blob::{AgentInfo, BlobInfo};
pub use datetime::{
  DateInfo, DateListInfo, DateTimeInfo, DurationInfo, FreeBusyInfo, Period,
  PeriodEnd, TimeZoneInfo, TriggerInfo, UtcOffsetInfo,
};
use serde::Serialize;
pub use structured::{
  AddressInfo, ClientPidMapInfo, GenderInfo, GeoInfo, NameInfo,
  OrganizationInfo, RequestStatusInfo,
};
pub use text::{CalAddressInfo, ImppInfo, TelephoneInfo, TextListInfo};

use crate::{argument::Argument, error::Result, property::ValueContext};

/// A structured payload type.
pub trait PartInfo: Sized {
  /// Parse from the raw value as it appears after the colon.
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self>;

  /// Render back to the raw value for `ctx.version`.
  fn to_value(&self, ctx: &ValueContext<'_>) -> String;

  /// Arguments implied by the payload itself (e.g. a blob's `ENCODING`).
  fn arguments(&self, _ctx: &ValueContext<'_>) -> Vec<Argument> { Vec::new() }
}

/// Access to one variant of [`PartValue`].
pub trait FromPart {
  fn from_part(part: &PartValue) -> Option<&Self>;
}

/// Registry parser signature for structured entries.
pub type PartParser = fn(&str, &ValueContext<'_>) -> Result<PartValue>;

/// Parse `raw` as `T` and wrap it.
pub fn parse_as<T>(raw: &str, ctx: &ValueContext<'_>) -> Result<PartValue>
where
  T: PartInfo + Into<PartValue>,
{
  T::from_value(raw, ctx).map(Into::into)
}

macro_rules! part_values {
  ($($variant:ident($info:ty)),* $(,)?) => {
    /// Payload of a structured property.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(tag = "kind", content = "data", rename_all = "snake_case")]
    pub enum PartValue {
      $($variant($info),)*
    }

    impl PartValue {
      pub fn to_value(&self, ctx: &ValueContext<'_>) -> String {
        match self {
          $(Self::$variant(info) => info.to_value(ctx),)*
        }
      }

      pub fn arguments(&self, ctx: &ValueContext<'_>) -> Vec<Argument> {
        match self {
          $(Self::$variant(info) => info.arguments(ctx),)*
        }
      }
    }

    $(
      impl From<$info> for PartValue {
        fn from(info: $info) -> Self { Self::$variant(info) }
      }

      impl FromPart for $info {
        fn from_part(part: &PartValue) -> Option<&Self> {
          match part {
            PartValue::$variant(info) => Some(info),
            #[allow(unreachable_patterns)]
            _ => None,
          }
        }
      }
    )*
  };
}

part_values! {
  Name(NameInfo),
  Address(AddressInfo),
  Organization(OrganizationInfo),
  Geo(GeoInfo),
  Telephone(TelephoneInfo),
  TextList(TextListInfo),
  Blob(BlobInfo),
  Date(DateInfo),
  DateTime(DateTimeInfo),
  Gender(GenderInfo),
  TimeZone(TimeZoneInfo),
  Impp(ImppInfo),
  Agent(AgentInfo),
  ClientPidMap(ClientPidMapInfo),
  Duration(DurationInfo),
  Trigger(TriggerInfo),
  CalAddress(CalAddressInfo),
  DateList(DateListInfo),
  FreeBusy(FreeBusyInfo),
  RequestStatus(RequestStatusInfo),
  UtcOffset(UtcOffsetInfo),
}

// ─── Open-ended properties ───────────────────────────────────────────────────

/// Payload of a vendor `X-` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XNameInfo {
  /// Property name with its original casing.
  pub name:   String,
  /// Comma-separated sub-values, unescaped.
  pub values: Vec<String>,
}

/// Payload of an unregistered IANA-token property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IanaNameInfo {
  pub name:   String,
  pub values: Vec<String>,
}

/// Render comma-separated sub-values back to their escaped form.
pub(crate) fn join_values(values: &[String]) -> String {
  values
    .iter()
    .map(|v| crate::text::escape(v))
    .collect::<Vec<_>>()
    .join(",")
}
