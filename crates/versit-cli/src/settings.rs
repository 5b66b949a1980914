//! File and environment settings.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use versit::{LineEnding, ParsePolicy};

/// Shape of `versit.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub policy:      ParsePolicy,
  /// Validate before `check` succeeds and before `fmt` writes.
  pub validate:    bool,
  pub line_ending: LineEnding,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      policy:      ParsePolicy::Strict,
      validate:    true,
      line_ending: LineEnding::Crlf,
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then overlay `VERSIT_*` variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("VERSIT"))
      .build()
      .context("failed to read config file")?;
    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}
