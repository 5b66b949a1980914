//! Single-field payloads: telephone numbers, text lists and URI-like
//! addresses.

use serde::Serialize;

use super::PartInfo;
use crate::{
  error::{Error, Result},
  property::ValueContext,
  text::{escape, split_and_unescape, unescape},
};

fn require_scheme(raw: &str, ctx: &ValueContext<'_>) -> Result<()> {
  match raw.split_once(':') {
    Some((scheme, _))
      if !scheme.is_empty()
        && scheme
          .chars()
          .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
    {
      Ok(())
    }
    _ => Err(Error::malformed_value(
      ctx.property,
      format!("{raw:?} is not a URI"),
    )),
  }
}

// ─── Telephone ───────────────────────────────────────────────────────────────

/// `TEL`: a phone number, or a `tel:` URI under `VALUE=uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelephoneInfo {
  pub number: String,
}

impl TelephoneInfo {
  /// The number with any `tel:` scheme removed.
  pub fn plain(&self) -> &str {
    self.number.strip_prefix("tel:").unwrap_or(&self.number)
  }
}

impl PartInfo for TelephoneInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    if ctx.value_type_is(&["uri"]) {
      require_scheme(raw, ctx)?;
      return Ok(Self { number: raw.to_string() });
    }
    Ok(Self { number: unescape(raw) })
  }

  fn to_value(&self, ctx: &ValueContext<'_>) -> String {
    if ctx.value_type_is(&["uri"]) {
      self.number.clone()
    } else {
      escape(&self.number)
    }
  }
}

// ─── Text lists ──────────────────────────────────────────────────────────────

/// `NICKNAME`, `CATEGORIES`, `RESOURCES`: a list of text values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextListInfo {
  pub values: Vec<String>,
}

impl PartInfo for TextListInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    Ok(Self {
      values: split_and_unescape(raw, ctx.syntax.list_separator),
    })
  }

  fn to_value(&self, ctx: &ValueContext<'_>) -> String {
    let separator = ctx.syntax.list_separator.to_string();
    self
      .values
      .iter()
      .map(|v| escape(v))
      .collect::<Vec<_>>()
      .join(&separator)
  }
}

// ─── IMPP ────────────────────────────────────────────────────────────────────

/// `IMPP`: an instant-messaging URI such as `xmpp:alice@example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImppInfo {
  pub uri: String,
}

impl ImppInfo {
  pub fn scheme(&self) -> &str {
    self.uri.split_once(':').map(|(s, _)| s).unwrap_or_default()
  }
}

impl PartInfo for ImppInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    require_scheme(raw, ctx)?;
    Ok(Self { uri: raw.to_string() })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String { self.uri.clone() }
}

// ─── Calendar user address ───────────────────────────────────────────────────

/// `ATTENDEE`, `ORGANIZER`: a calendar user address, usually `mailto:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalAddressInfo {
  pub address: String,
}

impl CalAddressInfo {
  /// The address with a `mailto:` scheme removed.
  pub fn email(&self) -> &str {
    match self.address.get(..7) {
      Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => {
        &self.address[7..]
      }
      _ => &self.address,
    }
  }
}

impl PartInfo for CalAddressInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    if ctx.value_type_is(&["cal-address", "uri"]) {
      require_scheme(raw, ctx)?;
    }
    Ok(Self { address: raw.to_string() })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String { self.address.clone() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    registry::syntax,
    version::{Family, Version},
  };

  fn ctx(
    family: Family,
    version: Version,
    value_type: &'static str,
  ) -> ValueContext<'static> {
    ValueContext {
      property: "TEST",
      family,
      version,
      syntax: syntax(family, version),
      types: &[],
      value_type,
      encoding: None,
      arguments: &[],
    }
  }

  #[test]
  fn text_list_separator_follows_version() {
    let v1 = ctx(Family::Calendar, Version::VCALENDAR_10, "text");
    let v2 = ctx(Family::Calendar, Version::VCALENDAR_20, "text");
    let list = TextListInfo::from_value("APPOINTMENT;EDUCATION", &v1).unwrap();
    assert_eq!(list.values, vec!["APPOINTMENT", "EDUCATION"]);
    assert_eq!(list.to_value(&v1), "APPOINTMENT;EDUCATION");
    assert_eq!(list.to_value(&v2), "APPOINTMENT,EDUCATION");
  }

  #[test]
  fn telephone_uri_requires_scheme() {
    let c = ctx(Family::Card, Version::VCARD_40, "uri");
    let tel = TelephoneInfo::from_value("tel:+1-555-555-5555", &c).unwrap();
    assert_eq!(tel.plain(), "+1-555-555-5555");
    assert!(TelephoneInfo::from_value("+1 555", &c).is_err());

    let text = ctx(Family::Card, Version::VCARD_40, "text");
    assert!(TelephoneInfo::from_value("+1 555", &text).is_ok());
  }

  #[test]
  fn impp_must_be_a_uri() {
    let c = ctx(Family::Card, Version::VCARD_40, "uri");
    let impp = ImppInfo::from_value("xmpp:alice@example.com", &c).unwrap();
    assert_eq!(impp.scheme(), "xmpp");
    assert!(ImppInfo::from_value("alice", &c).is_err());
  }

  #[test]
  fn cal_address_scheme_depends_on_value_type() {
    let v2 = ctx(Family::Calendar, Version::VCALENDAR_20, "cal-address");
    let attendee =
      CalAddressInfo::from_value("MAILTO:bob@example.com", &v2).unwrap();
    assert_eq!(attendee.email(), "bob@example.com");
    assert!(CalAddressInfo::from_value("bob@example.com", &v2).is_err());

    let v1 = ctx(Family::Calendar, Version::VCALENDAR_10, "text");
    assert!(CalAddressInfo::from_value("bob@example.com", &v1).is_ok());
  }
}
