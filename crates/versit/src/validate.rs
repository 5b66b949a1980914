//! On-demand structural checks: required fields per component kind and a few
//! cross-field rules. Never mutates and never runs during parsing.

use crate::{
  component::{Component, ComponentKind},
  error::{Error, Result},
  key::{Category, IntegerKey, PartKey, StringKey},
  registry::{self, alarm_action_fields, required_fields},
};

/// Validate `component` and every nested component.
pub(crate) fn validate(component: &Component) -> Result<()> {
  let has_method = component.kind == ComponentKind::Calendar
    && component.string(StringKey::Method).is_some();
  validate_node(component, has_method)
}

fn validate_node(component: &Component, has_method: bool) -> Result<()> {
  let mut missing: Vec<String> =
    required_fields(&component.kind, component.version, has_method)
      .into_iter()
      .filter(|prefix| !has_property(component, prefix))
      .map(str::to_string)
      .collect();

  if component.kind == ComponentKind::Alarm {
    if let Some(action) = component.string(StringKey::Action) {
      missing.extend(
        alarm_action_fields(action)
          .iter()
          .filter(|prefix| !has_property(component, prefix))
          .map(|prefix| prefix.to_string()),
      );
    }
  }

  if !missing.is_empty() {
    return Err(Error::MissingRequiredField {
      component: component.kind.name().to_string(),
      fields:    missing,
    });
  }

  check_constraints(component)?;

  for child in component.children() {
    validate_node(child, has_method)?;
  }
  Ok(())
}

fn has_property(component: &Component, prefix: &str) -> bool {
  match registry::category_of(prefix, component.family(), component.version) {
    Some(Category::String(key)) => !component.strings(key).is_empty(),
    Some(Category::Integer(key)) => !component.integers(key).is_empty(),
    Some(Category::Part(key)) => !component.parts(key).is_empty(),
    None => false,
  }
}

fn violation(component: &Component, reason: impl Into<String>) -> Error {
  Error::ConstraintViolation {
    component: component.kind.name().to_string(),
    reason:    reason.into(),
  }
}

fn check_range(
  component: &Component,
  key: IntegerKey,
  name: &str,
  range: std::ops::RangeInclusive<i64>,
) -> Result<()> {
  for value in component.integer_values(key) {
    if !range.contains(&value) {
      return Err(violation(
        component,
        format!(
          "{name} {value} is outside {}..={}",
          range.start(),
          range.end()
        ),
      ));
    }
  }
  Ok(())
}

fn exclusive(
  component: &Component,
  a: (PartKey, &str),
  b: (PartKey, &str),
) -> Result<()> {
  if !component.parts(a.0).is_empty() && !component.parts(b.0).is_empty() {
    return Err(violation(
      component,
      format!("{} and {} are mutually exclusive", a.1, b.1),
    ));
  }
  Ok(())
}

fn check_constraints(component: &Component) -> Result<()> {
  check_range(component, IntegerKey::Priority, "PRIORITY", 0..=9)?;
  check_range(
    component,
    IntegerKey::PercentComplete,
    "PERCENT-COMPLETE",
    0..=100,
  )?;

  match component.kind {
    ComponentKind::Event => exclusive(
      component,
      (PartKey::DateEnd, "DTEND"),
      (PartKey::Duration, "DURATION"),
    ),
    ComponentKind::Todo => exclusive(
      component,
      (PartKey::Due, "DUE"),
      (PartKey::Duration, "DURATION"),
    ),
    ComponentKind::Alarm => check_alarm(component),
    ComponentKind::TimeZone => {
      if component.standards().is_empty() && component.daylights().is_empty()
      {
        return Err(violation(
          component,
          "needs at least one STANDARD or DAYLIGHT",
        ));
      }
      Ok(())
    }
    _ => Ok(()),
  }
}

fn check_alarm(component: &Component) -> Result<()> {
  let repeat = component.integer(IntegerKey::Repeat).unwrap_or(0);
  if repeat < 0 {
    return Err(violation(component, format!("REPEAT {repeat} is negative")));
  }
  if repeat > 0 && component.parts(PartKey::Duration).is_empty() {
    return Err(violation(component, "REPEAT requires DURATION"));
  }

  let audio = component
    .string(StringKey::Action)
    .is_some_and(|a| a.eq_ignore_ascii_case("AUDIO"));
  if audio && component.parts(PartKey::Attach).len() > 1 {
    return Err(violation(component, "AUDIO alarms carry at most one ATTACH"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse;

  fn calendar(body: &str) -> Component {
    let text = format!(
      "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//versit//test//EN\r\n\
       {body}END:VCALENDAR\r\n"
    );
    parse(&text).unwrap()
  }

  const EVENT_HEAD: &str =
    "BEGIN:VEVENT\r\nUID:1\r\nDTSTAMP:20240101T000000Z\r\n\
     DTSTART:20240102T100000Z\r\n";

  #[test]
  fn cards_require_name_fields_per_version() {
    let card =
      parse("BEGIN:VCARD\r\nVERSION:3.0\r\nFN:J\r\nEND:VCARD\r\n").unwrap();
    match card.validate().unwrap_err() {
      Error::MissingRequiredField { fields, .. } => assert_eq!(fields, ["N"]),
      other => panic!("unexpected {other:?}"),
    }

    let card =
      parse("BEGIN:VCARD\r\nVERSION:4.0\r\nFN:J\r\nEND:VCARD\r\n").unwrap();
    assert!(card.validate().is_ok());
  }

  #[test]
  fn calendar_root_requires_prodid() {
    let cal = parse("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n")
      .unwrap();
    assert!(matches!(
      cal.validate(),
      Err(Error::MissingRequiredField { .. })
    ));
  }

  #[test]
  fn method_relaxes_event_dtstart() {
    let body = "BEGIN:VEVENT\r\nUID:1\r\nDTSTAMP:20240101T000000Z\r\n\
                END:VEVENT\r\n";
    match calendar(body).validate().unwrap_err() {
      Error::MissingRequiredField { component, fields } => {
        assert_eq!(component, "VEVENT");
        assert_eq!(fields, ["DTSTART"]);
      }
      other => panic!("unexpected {other:?}"),
    }
    let with_method = calendar(&format!("METHOD:REQUEST\r\n{body}"));
    assert!(with_method.validate().is_ok());
  }

  #[test]
  fn alarm_needs_action_and_trigger() {
    let body = format!(
      "{EVENT_HEAD}BEGIN:VALARM\r\nACTION:AUDIO\r\nEND:VALARM\r\nEND:VEVENT\r\n"
    );
    match calendar(&body).validate().unwrap_err() {
      Error::MissingRequiredField { component, fields } => {
        assert_eq!(component, "VALARM");
        assert_eq!(fields, ["TRIGGER"]);
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn display_alarm_needs_description() {
    let body = format!(
      "{EVENT_HEAD}BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-PT15M\r\n\
       END:VALARM\r\nEND:VEVENT\r\n"
    );
    match calendar(&body).validate().unwrap_err() {
      Error::MissingRequiredField { fields, .. } => {
        assert_eq!(fields, ["DESCRIPTION"])
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn repeat_requires_duration() {
    let body = format!(
      "{EVENT_HEAD}BEGIN:VALARM\r\nACTION:AUDIO\r\nTRIGGER:-PT15M\r\n\
       REPEAT:2\r\nEND:VALARM\r\nEND:VEVENT\r\n"
    );
    assert!(matches!(
      calendar(&body).validate(),
      Err(Error::ConstraintViolation { .. })
    ));
  }

  #[test]
  fn ranges_and_exclusive_pairs() {
    let body = format!("{EVENT_HEAD}PRIORITY:12\r\nEND:VEVENT\r\n");
    assert!(matches!(
      calendar(&body).validate(),
      Err(Error::ConstraintViolation { .. })
    ));

    let body = format!(
      "{EVENT_HEAD}DTEND:20240102T110000Z\r\nDURATION:PT1H\r\nEND:VEVENT\r\n"
    );
    assert!(matches!(
      calendar(&body).validate(),
      Err(Error::ConstraintViolation { .. })
    ));

    let body = "BEGIN:VTODO\r\nUID:2\r\nDTSTAMP:20240101T000000Z\r\n\
                PERCENT-COMPLETE:101\r\nEND:VTODO\r\n";
    assert!(matches!(
      calendar(body).validate(),
      Err(Error::ConstraintViolation { .. })
    ));
  }

  #[test]
  fn time_zone_needs_an_observance() {
    let body = "BEGIN:VTIMEZONE\r\nTZID:Europe/Paris\r\nEND:VTIMEZONE\r\n";
    assert!(matches!(
      calendar(body).validate(),
      Err(Error::ConstraintViolation { .. })
    ));

    let body = "BEGIN:VTIMEZONE\r\nTZID:Europe/Paris\r\nBEGIN:STANDARD\r\n\
                DTSTART:19701025T030000\r\nTZOFFSETFROM:+0200\r\n\
                TZOFFSETTO:+0100\r\nEND:STANDARD\r\nEND:VTIMEZONE\r\n";
    assert!(calendar(body).validate().is_ok());
  }
}
