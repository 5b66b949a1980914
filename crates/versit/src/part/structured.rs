//! Positional composite payloads: name, address, organization, geo and the
//! smaller `;`-separated records.

use serde::Serialize;

use super::PartInfo;
use crate::{
  error::{Error, Result},
  property::ValueContext,
  text::{escape, split_and_unescape},
};

fn join_fields(fields: &[&str]) -> String {
  fields.iter().map(|f| escape(f)).collect::<Vec<_>>().join(";")
}

// ─── Name ────────────────────────────────────────────────────────────────────

/// `N`: family; given; additional; prefixes; suffixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameInfo {
  pub family_name:        String,
  pub given_name:         String,
  pub additional_names:   String,
  pub honorific_prefixes: String,
  pub honorific_suffixes: String,
}

impl PartInfo for NameInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    let mut fields = split_and_unescape(raw, ';');
    let count = fields.len();
    if count > 5 || (count < 5 && !ctx.syntax.pad_structured) {
      return Err(Error::malformed_value(
        ctx.property,
        format!("expected 5 components, found {count}"),
      ));
    }
    fields.resize(5, String::new());
    let mut fields = fields.into_iter();
    let mut next = || fields.next().unwrap_or_default();
    Ok(Self {
      family_name:        next(),
      given_name:         next(),
      additional_names:   next(),
      honorific_prefixes: next(),
      honorific_suffixes: next(),
    })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    join_fields(&[
      &self.family_name,
      &self.given_name,
      &self.additional_names,
      &self.honorific_prefixes,
      &self.honorific_suffixes,
    ])
  }
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// `ADR`: the seven positional address components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressInfo {
  pub post_office_box:  String,
  pub extended_address: String,
  pub street_address:   String,
  pub locality:         String,
  pub region:           String,
  pub postal_code:      String,
  pub country:          String,
}

impl PartInfo for AddressInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    let fields = split_and_unescape(raw, ';');
    let Ok(
      [
        post_office_box,
        extended_address,
        street_address,
        locality,
        region,
        postal_code,
        country,
      ],
    ) = <[String; 7]>::try_from(fields)
    else {
      return Err(Error::malformed_value(
        ctx.property,
        "expected 7 address components",
      ));
    };
    Ok(Self {
      post_office_box,
      extended_address,
      street_address,
      locality,
      region,
      postal_code,
      country,
    })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    join_fields(&[
      &self.post_office_box,
      &self.extended_address,
      &self.street_address,
      &self.locality,
      &self.region,
      &self.postal_code,
      &self.country,
    ])
  }
}

// ─── Organization ────────────────────────────────────────────────────────────

/// `ORG`: organization name followed by any number of unit names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizationInfo {
  pub name:  String,
  pub units: Vec<String>,
}

impl PartInfo for OrganizationInfo {
  fn from_value(raw: &str, _ctx: &ValueContext<'_>) -> Result<Self> {
    let mut fields = split_and_unescape(raw, ';').into_iter();
    Ok(Self {
      name:  fields.next().unwrap_or_default(),
      units: fields.collect(),
    })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    let mut fields = vec![escape(&self.name)];
    fields.extend(self.units.iter().map(|u| escape(u)));
    fields.join(";")
  }
}

// ─── Geo ─────────────────────────────────────────────────────────────────────

/// `GEO`: latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GeoInfo {
  pub latitude:  f64,
  pub longitude: f64,
}

impl PartInfo for GeoInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    let (body, separator) = match raw.get(..4) {
      Some(scheme) if scheme.eq_ignore_ascii_case("geo:") => {
        // Drop URI parameters such as `;u=10`.
        let body = &raw[4..];
        (body.split(';').next().unwrap_or_default(), ',')
      }
      _ if ctx.syntax.geo_uri && ctx.value_type_is(&["uri"]) => {
        return Err(Error::malformed_value(ctx.property, "expected a geo: URI"));
      }
      _ => (raw, ctx.syntax.geo_separator),
    };

    let coordinates: Vec<&str> = body.split(separator).collect();
    let [latitude, longitude] = coordinates.as_slice() else {
      return Err(Error::malformed_value(
        ctx.property,
        format!("expected two coordinates separated by {separator:?}"),
      ));
    };
    let parse = |s: &str| {
      s.trim().parse::<f64>().map_err(|_| {
        Error::malformed_value(ctx.property, format!("{s:?} is not a number"))
      })
    };
    let geo = Self {
      latitude:  parse(latitude)?,
      longitude: parse(longitude)?,
    };
    if !(-90.0..=90.0).contains(&geo.latitude)
      || !(-180.0..=180.0).contains(&geo.longitude)
    {
      return Err(Error::malformed_value(
        ctx.property,
        "coordinates out of range",
      ));
    }
    Ok(geo)
  }

  fn to_value(&self, ctx: &ValueContext<'_>) -> String {
    if ctx.syntax.geo_uri && ctx.value_type_is(&["uri"]) {
      format!("geo:{},{}", self.latitude, self.longitude)
    } else {
      format!(
        "{}{}{}",
        self.latitude, ctx.syntax.geo_separator, self.longitude
      )
    }
  }
}

// ─── Gender ──────────────────────────────────────────────────────────────────

/// `GENDER`: optional sex letter and free-form identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenderInfo {
  /// One of `M`, `F`, `O`, `N`, `U`.
  pub sex:      Option<char>,
  pub identity: Option<String>,
}

impl PartInfo for GenderInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    let mut fields = split_and_unescape(raw, ';').into_iter();
    let sex = fields.next().unwrap_or_default();
    let sex = match sex.to_ascii_uppercase().as_str() {
      "" => None,
      s @ ("M" | "F" | "O" | "N" | "U") => s.chars().next(),
      other => {
        return Err(Error::malformed_value(
          ctx.property,
          format!("{other:?} is not a sex value"),
        ));
      }
    };
    let identity = fields.next().filter(|s| !s.is_empty());
    Ok(Self { sex, identity })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    let sex = self.sex.map(String::from).unwrap_or_default();
    match &self.identity {
      Some(identity) => format!("{sex};{}", escape(identity)),
      None => sex,
    }
  }
}

// ─── CLIENTPIDMAP ────────────────────────────────────────────────────────────

/// `CLIENTPIDMAP`: source identifier and the URI it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientPidMapInfo {
  pub id:  u32,
  pub uri: String,
}

impl PartInfo for ClientPidMapInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    let (id, uri) = raw.split_once(';').ok_or_else(|| {
      Error::malformed_value(ctx.property, "expected `id;uri`")
    })?;
    let id = id.trim().parse().map_err(|_| {
      Error::malformed_value(ctx.property, format!("{id:?} is not an id"))
    })?;
    Ok(Self { id, uri: uri.to_string() })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    format!("{};{}", self.id, self.uri)
  }
}

// ─── REQUEST-STATUS ──────────────────────────────────────────────────────────

/// `REQUEST-STATUS`: status code, description and optional extra data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestStatusInfo {
  pub code:        String,
  pub description: String,
  pub data:        Option<String>,
}

impl PartInfo for RequestStatusInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    let fields = split_and_unescape(raw, ';');
    let (code, description, data) = match fields.as_slice() {
      [code, description] => (code, description, None),
      [code, description, data] => (code, description, Some(data.clone())),
      _ => {
        return Err(Error::malformed_value(
          ctx.property,
          "expected `code;description[;data]`",
        ));
      }
    };
    let well_formed = code
      .split('.')
      .all(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
      return Err(Error::malformed_value(
        ctx.property,
        format!("{code:?} is not a status code"),
      ));
    }
    Ok(Self {
      code: code.clone(),
      description: description.clone(),
      data,
    })
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    let mut out = format!("{};{}", self.code, escape(&self.description));
    if let Some(data) = &self.data {
      out.push(';');
      out.push_str(&escape(data));
    }
    out
  }
}
