//! `versit`: check, reformat and inspect vCard and vCalendar files.
//!
//! # Usage
//!
//! ```text
//! versit check contacts.vcf calendar.ics
//! versit fmt --lf --output clean.vcf contacts.vcf
//! versit dump calendar.ics
//! versit diff old.vcf new.vcf
//! ```
//!
//! Settings are read from `versit.toml` (or `--config`) and `VERSIT_*`
//! environment variables; command-line flags override both.

mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use versit::{Component, ParseOptions, SaveOptions};

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "versit", about = "vCard and vCalendar toolkit")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "versit.toml")]
  config: PathBuf,

  /// Skip unparsable lines instead of failing.
  #[arg(long, global = true)]
  lenient: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Parse (and validate) every object in the given files.
  Check {
    files: Vec<PathBuf>,

    /// Only parse; do not run structural validation.
    #[arg(long)]
    no_validate: bool,
  },
  /// Re-serialize a file in canonical form.
  Fmt {
    file: PathBuf,

    /// Write here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Use bare LF line endings.
    #[arg(long)]
    lf: bool,
  },
  /// Print the parsed objects as JSON.
  Dump { file: PathBuf },
  /// List property-level differences between two single-object files.
  Diff { old: PathBuf, new: PathBuf },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;
  if cli.lenient {
    settings.policy = versit::ParsePolicy::Lenient;
  }

  match cli.command {
    Command::Check { files, no_validate } => {
      if no_validate {
        settings.validate = false;
      }
      check(&files, &settings)
    }
    Command::Fmt { file, output, lf } => {
      if lf {
        settings.line_ending = versit::LineEnding::Lf;
      }
      fmt(&file, output.as_deref(), &settings)
    }
    Command::Dump { file } => dump(&file, &settings),
    Command::Diff { old, new } => diff(&old, &new),
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

fn read_objects(path: &Path, settings: &Settings) -> Result<Vec<Component>> {
  let text = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  let options = ParseOptions { policy: settings.policy };
  versit::parse_many_with(&text, &options)
    .into_iter()
    .enumerate()
    .map(|(i, result)| {
      result.with_context(|| format!("{}: object #{}", path.display(), i + 1))
    })
    .collect()
}

fn check(files: &[PathBuf], settings: &Settings) -> Result<()> {
  let options = ParseOptions { policy: settings.policy };
  let mut failures = 0usize;

  for path in files {
    let text = std::fs::read_to_string(path)
      .with_context(|| format!("reading {}", path.display()))?;
    let results = versit::parse_many_with(&text, &options);
    if results.is_empty() {
      tracing::warn!(file = %path.display(), "no BEGIN/END objects found");
    }

    for (i, result) in results.into_iter().enumerate() {
      let outcome = result.and_then(|component| {
        if settings.validate {
          component.validate()?;
        }
        Ok(component)
      });
      match outcome {
        Ok(component) => tracing::info!(
          file = %path.display(),
          object = i + 1,
          kind = component.kind.name(),
          version = %component.version,
          "ok"
        ),
        Err(error) => {
          failures += 1;
          tracing::error!(
            file = %path.display(),
            object = i + 1,
            %error,
            "invalid"
          );
        }
      }
    }
  }

  if failures > 0 {
    bail!("{failures} object(s) failed");
  }
  Ok(())
}

fn fmt(path: &Path, output: Option<&Path>, settings: &Settings) -> Result<()> {
  let objects = read_objects(path, settings)?;
  let options = SaveOptions {
    validate:    settings.validate,
    line_ending: settings.line_ending,
  };

  if let (Some(output), [single]) = (output, objects.as_slice()) {
    single
      .save_to_file(output, &options)
      .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(file = %output.display(), "written");
    return Ok(());
  }

  let mut text = String::new();
  for (i, component) in objects.iter().enumerate() {
    let saved = component
      .save_with(&options)
      .with_context(|| format!("object #{}", i + 1))?;
    text.push_str(&saved);
  }

  match output {
    Some(output) => {
      std::fs::write(output, text)
        .with_context(|| format!("writing {}", output.display()))?;
      tracing::info!(file = %output.display(), objects = objects.len(), "written");
    }
    None => print!("{text}"),
  }
  Ok(())
}

fn dump(path: &Path, settings: &Settings) -> Result<()> {
  let objects = read_objects(path, settings)?;
  let json = serde_json::to_string_pretty(&objects)
    .context("failed to serialise objects")?;
  println!("{json}");
  Ok(())
}

fn diff(old: &Path, new: &Path) -> Result<()> {
  let before = versit::parse_file(old)
    .with_context(|| format!("parsing {}", old.display()))?;
  let after = versit::parse_file(new)
    .with_context(|| format!("parsing {}", new.display()))?;

  let differences = versit::diff(&before, &after);
  if differences.is_empty() {
    tracing::info!("no differences");
  }
  for difference in differences {
    println!("{difference}");
  }
  Ok(())
}
