//! Binary payloads (`PHOTO`, `LOGO`, `SOUND`, `KEY`, `ATTACH`) and embedded
//! agent cards.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Serialize, Serializer};

use super::PartInfo;
use crate::{
  argument::{Argument, ENCODING, TYPE},
  component::{Component, ComponentKind},
  error::{Error, Result},
  property::ValueContext,
  registry::BareFlags,
  serialize::{LineEnding, write_component},
  text::{escape, unescape},
};

const URI_VALUE_TYPES: &[&str] = &["uri", "url", "content-id", "cid"];

/// Legacy `TYPE` tokens for inline blobs and the media types they name.
const MEDIA_TYPES: &[(&str, &str)] = &[
  ("JPEG", "image/jpeg"),
  ("PNG", "image/png"),
  ("GIF", "image/gif"),
  ("BMP", "image/bmp"),
  ("TIFF", "image/tiff"),
  ("WAVE", "audio/wav"),
  ("MP3", "audio/mpeg"),
  ("OGG", "audio/ogg"),
  ("X509", "application/pkix-cert"),
  ("PGP", "application/pgp-keys"),
];

fn media_type_for(token: &str) -> Option<String> {
  MEDIA_TYPES
    .iter()
    .find(|(t, _)| t.eq_ignore_ascii_case(token))
    .map(|(_, media)| media.to_string())
    .or_else(|| token.contains('/').then(|| token.to_ascii_lowercase()))
}

fn type_token_for(media_type: &str) -> String {
  MEDIA_TYPES
    .iter()
    .find(|(_, media)| media.eq_ignore_ascii_case(media_type))
    .map(|(token, _)| token.to_string())
    .unwrap_or_else(|| {
      let subtype = media_type.rsplit('/').next().unwrap_or(media_type);
      subtype.to_ascii_uppercase()
    })
}

fn as_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(&STANDARD.encode(data))
}

// ─── Blobs ───────────────────────────────────────────────────────────────────

/// A binary payload carried inline or referenced by URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum BlobInfo {
  Inline {
    #[serde(serialize_with = "as_base64")]
    data:       Vec<u8>,
    /// Media type from a `data:` URI; older versions carry it in `TYPE`.
    media_type: Option<String>,
  },
  Uri {
    uri: String,
  },
}

impl BlobInfo {
  /// Open the payload for reading.
  ///
  /// Inline data and `data:` URIs are decoded in memory and `file:` URIs are
  /// read fully from disk. Any other URI fails with [`Error::ExternalBlob`].
  pub fn stream(&self) -> Result<Cursor<Vec<u8>>> {
    match self {
      Self::Inline { data, .. } => Ok(Cursor::new(data.clone())),
      Self::Uri { uri } => {
        if let Some((data, _)) = decode_data_uri(uri)? {
          return Ok(Cursor::new(data));
        }
        let Some(path) = file_uri_path(uri) else {
          return Err(Error::ExternalBlob(uri.clone()));
        };
        Ok(Cursor::new(std::fs::read(path)?))
      }
    }
  }
}

fn has_scheme<'a>(uri: &'a str, scheme: &str) -> Option<&'a str> {
  let head = uri.get(..scheme.len())?;
  head.eq_ignore_ascii_case(scheme).then(|| &uri[scheme.len()..])
}

fn file_uri_path(uri: &str) -> Option<&str> {
  let rest = has_scheme(uri, "file://")?;
  Some(rest.strip_prefix("localhost").unwrap_or(rest))
}

/// Decode `data:[media-type][;base64],payload`. `Ok(None)` when `uri` is not a
/// data URI.
fn decode_data_uri(uri: &str) -> Result<Option<(Vec<u8>, Option<String>)>> {
  let Some(rest) = has_scheme(uri, "data:") else {
    return Ok(None);
  };
  let Some((header, payload)) = rest.split_once(',') else {
    return Ok(None);
  };
  let (media_type, data) = match header.strip_suffix(";base64") {
    Some(media_type) => (media_type, STANDARD.decode(strip_whitespace(payload))?),
    None => (header, payload.as_bytes().to_vec()),
  };
  let media_type = (!media_type.is_empty()).then(|| media_type.to_string());
  Ok(Some((data, media_type)))
}

fn strip_whitespace(s: &str) -> String {
  s.chars().filter(|c| !c.is_whitespace()).collect()
}

impl PartInfo for BlobInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    if let Some(encoding) = ctx.encoding {
      if ctx.syntax.inline_encoding.is_none() {
        return Err(Error::VersionMismatch {
          subject: format!("{ENCODING}={encoding}"),
          version: ctx.version.to_string(),
        });
      }
      return match encoding {
        "BASE64" | "B" => Ok(Self::Inline {
          data:       STANDARD.decode(strip_whitespace(raw))?,
          media_type: ctx.types.iter().find_map(|t| media_type_for(t)),
        }),
        other => Err(Error::malformed_value(
          ctx.property,
          format!("unsupported encoding {other}"),
        )),
      };
    }

    if let Some((data, media_type)) = decode_data_uri(raw)? {
      return Ok(Self::Inline { data, media_type });
    }
    if ctx.value_type_is(URI_VALUE_TYPES) {
      return Ok(Self::Uri { uri: raw.to_string() });
    }
    Ok(Self::Inline { data: raw.as_bytes().to_vec(), media_type: None })
  }

  fn to_value(&self, ctx: &ValueContext<'_>) -> String {
    match self {
      Self::Uri { uri } => uri.clone(),
      Self::Inline { data, media_type } => {
        let encoded = STANDARD.encode(data);
        match ctx.syntax.inline_encoding {
          Some(_) => encoded,
          None => format!(
            "data:{};base64,{encoded}",
            media_type.as_deref().unwrap_or_default()
          ),
        }
      }
    }
  }

  /// Versions with an `ENCODING` token carry the media type in `TYPE`.
  fn arguments(&self, ctx: &ValueContext<'_>) -> Vec<Argument> {
    let (Self::Inline { media_type, .. }, Some(token)) =
      (self, ctx.syntax.inline_encoding)
    else {
      return Vec::new();
    };
    let bare = ctx.syntax.bare_flags == BareFlags::Preferred;
    let mut arguments = Vec::new();
    if let Some(media_type) = media_type {
      if ctx.types.is_empty() {
        arguments.push(Argument {
          name: TYPE.to_string(),
          values: vec![type_token_for(media_type)],
          bare,
        });
      }
    }
    arguments.push(Argument {
      name: ENCODING.to_string(),
      values: vec![token.to_string()],
      bare,
    });
    arguments
  }
}

// ─── Agents ──────────────────────────────────────────────────────────────────

/// `AGENT`: a URI reference or an embedded vCard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum AgentInfo {
  Uri(String),
  Card(Box<Component>),
}

impl PartInfo for AgentInfo {
  fn from_value(raw: &str, ctx: &ValueContext<'_>) -> Result<Self> {
    if ctx.value_type_is(URI_VALUE_TYPES) {
      return Ok(Self::Uri(raw.to_string()));
    }
    let text = unescape(raw);
    if text.trim().is_empty() {
      return Err(Error::malformed_value(ctx.property, "empty agent"));
    }
    let card = crate::parse(&text).map_err(|e| {
      Error::malformed_value(ctx.property, format!("embedded vCard: {e}"))
    })?;
    if card.kind != ComponentKind::Card {
      return Err(Error::malformed_value(
        ctx.property,
        format!("embedded {} is not a vCard", card.kind.name()),
      ));
    }
    Ok(Self::Card(Box::new(card)))
  }

  fn to_value(&self, _ctx: &ValueContext<'_>) -> String {
    match self {
      Self::Uri(uri) => uri.clone(),
      Self::Card(card) => {
        let text = write_component(card, LineEnding::Lf);
        escape(text.trim_end_matches('\n'))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Read;

  use super::*;
  use crate::{
    registry::syntax,
    version::{Family, Version},
  };

  fn ctx(
    version: Version,
    value_type: &'static str,
    encoding: Option<&'static str>,
  ) -> ValueContext<'static> {
    ValueContext {
      property: "PHOTO",
      family: Family::Card,
      version,
      syntax: syntax(Family::Card, version),
      types: &[],
      value_type,
      encoding,
      arguments: &[],
    }
  }

  #[test]
  fn base64_inline_under_vcard_3() {
    let c = ctx(Version::VCARD_30, "binary", Some("B"));
    let blob = BlobInfo::from_value("aGVs\nbG8=", &c).unwrap();
    let mut out = String::new();
    blob.stream().unwrap().read_to_string(&mut out).unwrap();
    assert_eq!(out, "hello");
    assert_eq!(blob.to_value(&c), "aGVsbG8=");
    assert_eq!(blob.arguments(&c)[0].values, vec!["b"]);
  }

  #[test]
  fn media_type_travels_in_type_under_vcard_3() {
    let v4 = ctx(Version::VCARD_40, "uri", None);
    let blob =
      BlobInfo::from_value("data:image/png;base64,aGVsbG8=", &v4).unwrap();

    let v3 = ctx(Version::VCARD_30, "binary", None);
    let args = blob.arguments(&v3);
    assert_eq!(args[0].name, "TYPE");
    assert_eq!(args[0].values, vec!["PNG"]);
    assert_eq!(args[1].values, vec!["b"]);

    let types = vec!["PNG".to_string()];
    let reread = ValueContext {
      types: &types,
      encoding: Some("B"),
      ..v3
    };
    let again = BlobInfo::from_value(&blob.to_value(&v3), &reread).unwrap();
    assert_eq!(again, blob);
    assert!(again.arguments(&reread).iter().all(|a| a.name != "TYPE"));
  }

  #[test]
  fn data_uri_under_vcard_4() {
    let c = ctx(Version::VCARD_40, "uri", None);
    let blob = BlobInfo::from_value("data:image/png;base64,aGVsbG8=", &c)
      .unwrap();
    assert_eq!(
      blob,
      BlobInfo::Inline {
        data:       b"hello".to_vec(),
        media_type: Some("image/png".into()),
      }
    );
    assert_eq!(blob.to_value(&c), "data:image/png;base64,aGVsbG8=");
    assert!(blob.arguments(&c).is_empty());
  }

  #[test]
  fn encoding_argument_rejected_under_vcard_4() {
    let c = ctx(Version::VCARD_40, "uri", Some("BASE64"));
    let err = BlobInfo::from_value("aGVsbG8=", &c).unwrap_err();
    assert!(matches!(err, Error::VersionMismatch { .. }));
  }

  #[test]
  fn remote_uri_is_external() {
    let c = ctx(Version::VCARD_30, "uri", None);
    let blob =
      BlobInfo::from_value("http://example.com/me.jpg", &c).unwrap();
    assert!(matches!(blob.stream(), Err(Error::ExternalBlob(_))));
  }

  #[test]
  fn file_uri_is_read_from_disk() {
    let path = std::env::temp_dir().join("versit-blob-test.bin");
    std::fs::write(&path, b"bytes").unwrap();
    let blob = BlobInfo::Uri { uri: format!("file://{}", path.display()) };
    let mut out = Vec::new();
    blob.stream().unwrap().read_to_end(&mut out).unwrap();
    assert_eq!(out, b"bytes");
    std::fs::remove_file(path).unwrap();
  }

  #[test]
  fn bare_encoding_flag_under_vcard_21() {
    let c = ctx(Version::VCARD_21, "inline", Some("BASE64"));
    let blob = BlobInfo::from_value("aGVsbG8=", &c).unwrap();
    let args = blob.arguments(&c);
    assert!(args[0].bare);
    assert_eq!(args[0].values, vec!["BASE64"]);
  }
}
