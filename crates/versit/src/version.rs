//! Format versions and format families.

use std::fmt;

use serde::Serialize;

/// The format family an object belongs to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Family {
  #[strum(to_string = "vCard")]
  Card,
  #[strum(to_string = "vCalendar")]
  Calendar,
}

impl Family {
  /// Whether objects of this family can be bound to `version`.
  pub fn supports(self, version: Version) -> bool {
    match self {
      Self::Card => matches!(
        version,
        Version::VCARD_21 | Version::VCARD_30 | Version::VCARD_40
      ),
      Self::Calendar => {
        matches!(version, Version::VCALENDAR_10 | Version::VCALENDAR_20)
      }
    }
  }
}

/// A `major.minor` format version as written on the `VERSION` line.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub struct Version {
  pub major: u8,
  pub minor: u8,
}

impl Version {
  pub const VCARD_21: Version = Version::new(2, 1);
  pub const VCARD_30: Version = Version::new(3, 0);
  pub const VCARD_40: Version = Version::new(4, 0);
  pub const VCALENDAR_10: Version = Version::new(1, 0);
  pub const VCALENDAR_20: Version = Version::new(2, 0);

  pub const fn new(major: u8, minor: u8) -> Self { Self { major, minor } }

  /// Parse the value of a `VERSION` line, e.g. `"3.0"`.
  pub fn parse(s: &str) -> Option<Self> {
    let (major, minor) = s.trim().split_once('.')?;
    Some(Self {
      major: major.parse().ok()?,
      minor: minor.parse().ok()?,
    })
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}", self.major, self.minor)
  }
}

/// An inclusive range of versions a registry entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
  pub min: Version,
  pub max: Version,
}

impl VersionRange {
  pub const fn between(min: Version, max: Version) -> Self {
    Self { min, max }
  }

  pub const fn only(version: Version) -> Self { Self::between(version, version) }

  pub fn accepts(&self, version: Version) -> bool {
    self.min <= version && version <= self.max
  }
}
