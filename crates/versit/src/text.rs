//! Delimiter, escape and folding utilities shared by the parser and the
//! serializer.
//!
//! These are pure functions; none of them knows about versions. Callers pick
//! the delimiter (e.g. the GEO separator) from the registry's
//! [`Syntax`](crate::registry::Syntax).

/// Maximum physical line length in octets.
pub const MAX_LINE_OCTETS: usize = 75;

// ─── Escaping ────────────────────────────────────────────────────────────────

/// Reverse backslash escapes: `\\`, `\,`, `\;`, `\:` and `\n` / `\N`.
/// Unknown escapes are kept verbatim.
pub fn unescape(raw: &str) -> String {
  let mut result = String::with_capacity(raw.len());
  let mut chars = raw.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      result.push(c);
      continue;
    }
    match chars.next() {
      Some('n' | 'N') => result.push('\n'),
      Some(c @ ('\\' | ',' | ';' | ':')) => result.push(c),
      Some(other) => {
        result.push('\\');
        result.push(other);
      }
      None => result.push('\\'),
    }
  }
  result
}

/// Escape a text value: `\`, `,`, `;` and line breaks.
pub fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      ',' => out.push_str("\\,"),
      ';' => out.push_str("\\;"),
      '\n' => out.push_str("\\n"),
      '\r' => {}
      other => out.push(other),
    }
  }
  out
}

/// Like [`escape`] but leaves line breaks alone, for values that are about to
/// be quoted-printable encoded.
pub fn escape_keep_newlines(s: &str) -> String {
  s.replace('\\', "\\\\")
    .replace(',', "\\,")
    .replace(';', "\\;")
}

/// Split `raw` on every `delimiter` that is not preceded by a backslash
/// escape. Segments are returned still escaped; empty segments are kept so
/// positional sub-fields keep their meaning.
pub fn split_unescaped(raw: &str, delimiter: char) -> Vec<&str> {
  let mut parts = Vec::new();
  let mut start = 0usize;
  let mut escaped = false;
  for (i, c) in raw.char_indices() {
    if escaped {
      escaped = false;
    } else if c == '\\' {
      escaped = true;
    } else if c == delimiter {
      parts.push(&raw[start..i]);
      start = i + c.len_utf8();
    }
  }
  parts.push(&raw[start..]);
  parts
}

/// [`split_unescaped`] followed by [`unescape`] on every segment.
pub fn split_and_unescape(raw: &str, delimiter: char) -> Vec<String> {
  split_unescaped(raw, delimiter)
    .into_iter()
    .map(unescape)
    .collect()
}

// ─── Folding ─────────────────────────────────────────────────────────────────

/// Break `content` into physical lines of at most `first_width` octets
/// (continuations are `first_width` octets including `indent`), joined by
/// `line_ending` followed by `indent`. No trailing line ending is added.
///
/// Splits only on UTF-8 character boundaries.
pub fn fold_line(
  content: &str,
  first_width: usize,
  indent: &str,
  line_ending: &str,
) -> String {
  if content.len() <= first_width {
    return content.to_string();
  }

  let mut result = String::with_capacity(content.len() + content.len() / 24);
  let mut current = 0usize;
  let mut limit = first_width;
  for c in content.chars() {
    let len = c.len_utf8();
    if current + len > limit && current > 0 {
      result.push_str(line_ending);
      result.push_str(indent);
      current = indent.len();
      limit = first_width.max(indent.len() + 4);
    }
    result.push(c);
    current += len;
  }
  result
}

/// Join folded physical lines into logical lines.
///
/// Accepts CRLF or bare LF. A physical line beginning with a space or tab
/// continues the previous one (the single whitespace character is dropped).
/// A quoted-printable line ending in a soft break (`=`) swallows the next
/// physical line. Empty lines are dropped.
pub fn unfold_lines(text: &str) -> Vec<String> {
  unfold_numbered(text).into_iter().map(|(_, line)| line).collect()
}

/// [`unfold_lines`], pairing each logical line with the 1-based number of the
/// physical line it starts on.
pub fn unfold_numbered(text: &str) -> Vec<(usize, String)> {
  let mut lines: Vec<(usize, String)> = Vec::new();
  let mut soft_break = false;

  for (index, raw) in text.split('\n').enumerate() {
    let line = raw.strip_suffix('\r').unwrap_or(raw);

    if soft_break {
      if let Some((_, last)) = lines.last_mut() {
        last.pop();
        last.push_str(line);
        soft_break = is_quoted_printable(last) && last.ends_with('=');
        continue;
      }
    }

    if let Some(rest) = line.strip_prefix([' ', '\t']) {
      if let Some((_, last)) = lines.last_mut() {
        last.push_str(rest);
        soft_break = is_quoted_printable(last) && last.ends_with('=');
      }
      continue;
    }

    if line.is_empty() {
      continue;
    }

    soft_break = is_quoted_printable(line) && line.ends_with('=');
    lines.push((index + 1, line.to_string()));
  }

  lines
}

/// Whether the name/argument part of a content line declares
/// `QUOTED-PRINTABLE` encoding.
fn is_quoted_printable(line: &str) -> bool {
  let head = line.split(':').next().unwrap_or_default();
  head.to_ascii_uppercase().contains("QUOTED-PRINTABLE")
}

// ─── Quoted-printable ────────────────────────────────────────────────────────

/// Decode quoted-printable UTF-8 text (`=XX` octets, `=` soft breaks
/// already removed by [`unfold_lines`]). Invalid sequences are kept
/// literally.
pub fn decode_quoted_printable(s: &str) -> String {
  decode_quoted_printable_as(s, None)
}

/// Like [`decode_quoted_printable`], reading the octets in `charset`.
/// ISO-8859-1 and US-ASCII are mapped directly; anything else is read as
/// UTF-8.
pub fn decode_quoted_printable_as(s: &str, charset: Option<&str>) -> String {
  let octets = quoted_printable_octets(s);
  match charset.map(str::to_ascii_uppercase).as_deref() {
    Some("ISO-8859-1" | "ISO_8859-1" | "LATIN1" | "US-ASCII") => {
      octets.iter().map(|&b| char::from(b)).collect()
    }
    _ => String::from_utf8_lossy(&octets).into_owned(),
  }
}

fn quoted_printable_octets(s: &str) -> Vec<u8> {
  let bytes = s.as_bytes();
  let mut result: Vec<u8> = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] == b'=' && i + 2 < bytes.len() {
      if let (Some(hi), Some(lo)) =
        (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
      {
        result.push((hi << 4) | lo);
        i += 3;
        continue;
      }
    }
    result.push(bytes[i]);
    i += 1;
  }
  result
}

fn hex_value(b: u8) -> Option<u8> {
  (b as char).to_digit(16).map(|d| d as u8)
}

/// Encode text as quoted-printable. Line breaks become `=0D=0A`; `=`,
/// control characters and non-ASCII octets are hex-escaped.
pub fn encode_quoted_printable(s: &str) -> String {
  let mut out = String::with_capacity(s.len() * 3 / 2);
  for b in s.bytes() {
    match b {
      b'\n' => out.push_str("=0D=0A"),
      b'\r' => {}
      b'=' => out.push_str("=3D"),
      b' '..=b'~' => out.push(b as char),
      other => out.push_str(&format!("={other:02X}")),
    }
  }
  out
}
