//! End-to-end scenarios: parse, mutate, validate, save, re-parse.

use std::io::Read;

use crate::{
  Argument, Component, ComponentKind, Error, LineEnding, ParseOptions,
  SaveOptions, Version, diff,
  key::{IntegerKey, PartKey, StringKey},
  parse, parse_file, parse_many, parse_with,
  part::{
    AddressInfo, AgentInfo, BlobInfo, CalAddressInfo, DateInfo, GeoInfo,
    NameInfo, TriggerInfo,
  },
};

/// Save, re-parse and require an equal tree.
fn assert_round_trip(component: &Component) {
  let text = component.save_to_string(false).unwrap();
  let reparsed = parse(&text).unwrap();
  assert!(
    diff(component, &reparsed).is_empty(),
    "differences: {:?}\n{text}",
    diff(component, &reparsed)
  );
  assert_eq!(&reparsed, component);
}

// ─── Cards ───────────────────────────────────────────────────────────────────

#[test]
fn minimal_vcard_scenario() {
  let text = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:John Doe\r\nN:Doe;John;;;\r\n\
              END:VCARD\r\n";
  let card = parse(text).unwrap();
  assert_eq!(card.string_values(StringKey::FullName), vec!["John Doe"]);
  assert_eq!(card.parts_array::<NameInfo>()[0].given_name, "John");
  assert_eq!(card.parts_array::<NameInfo>()[0].family_name, "Doe");
  assert!(card.validate().is_ok());
  assert_round_trip(&card);
}

#[test]
fn escaped_text_unescapes_and_re_escapes() {
  let text = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:x\r\n\
              NOTE:Hello\\, World\\nLine2\r\nEND:VCARD\r\n";
  let card = parse(text).unwrap();
  assert_eq!(card.string(StringKey::Note), Some("Hello, World\nLine2"));
  let saved = card.save_to_string(false).unwrap();
  assert!(saved.contains("NOTE:Hello\\, World\\nLine2\r\n"), "{saved}");
}

#[test]
fn address_fields_are_positional() {
  let text = "BEGIN:VCARD\r\nVERSION:3.0\r\nN:D;J;;;\r\nFN:J D\r\n\
              ADR;TYPE=HOME:;;123 Main St;Springfield;IL;62704;USA\r\n\
              END:VCARD\r\n";
  let card = parse(text).unwrap();
  let adr = card.part_values::<AddressInfo>(PartKey::Address)[0];
  assert_eq!(adr, &AddressInfo {
    post_office_box:  String::new(),
    extended_address: String::new(),
    street_address:   "123 Main St".into(),
    locality:         "Springfield".into(),
    region:           "IL".into(),
    postal_code:      "62704".into(),
    country:          "USA".into(),
  });
  assert!(card.parts(PartKey::Address)[0].has_type("home"));

  let short = text.replace(";62704;USA", "");
  let err = parse(&short).unwrap_err();
  assert!(matches!(err.root_cause(), Error::MalformedValue { .. }));
}

#[test]
fn cardinality_and_alt_ids() {
  let mut card = Component::card(Version::VCARD_30).unwrap();
  card.add_string(StringKey::FullName, "One", None, &[]).unwrap();
  let err = card
    .add_string(StringKey::FullName, "Two", None, &[])
    .unwrap_err();
  assert!(matches!(err, Error::CardinalityViolation { .. }));

  let mut card = Component::card(Version::VCARD_40).unwrap();
  card
    .add_part(PartKey::Birthday, "19900315", None, &[Argument::single(
      "ALTID", "1",
    )])
    .unwrap();
  card
    .add_part(PartKey::Birthday, "circa 1990", None, &[
      Argument::single("ALTID", "2"),
      Argument::single("VALUE", "text"),
    ])
    .unwrap();
  let birthdays = card.part_values::<DateInfo>(PartKey::Birthday);
  assert_eq!(birthdays.len(), 2);
  assert_eq!(birthdays[1], &DateInfo::Text("circa 1990".into()));
  assert_round_trip(&card);

  let err = card.add_part(PartKey::Birthday, "2000", None, &[]).unwrap_err();
  assert!(matches!(err, Error::CardinalityViolation { .. }));
}

#[test]
fn vcard_21_round_trip() {
  let mut card = Component::card(Version::VCARD_21).unwrap();
  card.add_part(PartKey::Name, "Doe;John", None, &[]).unwrap();
  card.add_string(StringKey::FullName, "John Doe", None, &[]).unwrap();
  card
    .add_part(PartKey::Telephone, "+1 555 0100", None, &[Argument::single(
      "TYPE", "HOME",
    )])
    .unwrap();
  card
    .add_string(StringKey::Email, "john@example.com", Some("item1"), &[])
    .unwrap();
  card
    .add_string(StringKey::Note, "first line\nsecond line", None, &[])
    .unwrap();
  card
    .add_part(PartKey::Photo, "aGVsbG8=", None, &[
      Argument::single("ENCODING", "BASE64"),
      Argument::single("TYPE", "JPEG"),
    ])
    .unwrap();
  card
    .add_part(PartKey::Geo, "37.386013;-122.082932", None, &[])
    .unwrap();
  card
    .add_extension("X-Custom", &["one", "two"], None, &[])
    .unwrap();

  assert_eq!(card.strings(StringKey::Email)[0].types, vec!["INTERNET"]);
  let saved = card.save_to_string(true).unwrap();
  assert!(saved.contains("TEL;HOME:+1 555 0100\r\n"), "{saved}");
  assert!(saved.contains("PHOTO;JPEG;BASE64:aGVsbG8=\r\n"), "{saved}");
  assert!(saved.contains("NOTE;QUOTED-PRINTABLE:"), "{saved}");
  assert_round_trip(&card);
}

#[test]
fn vcard_40_round_trip() {
  let mut card = Component::card(Version::VCARD_40).unwrap();
  card
    .add_string(StringKey::FullName, "Jane Doe", None, &[
      Argument::single("ALTID", "1"),
      Argument::single("LANGUAGE", "en"),
    ])
    .unwrap();
  card
    .add_string(StringKey::FullName, "ジェーン", None, &[
      Argument::single("ALTID", "1"),
      Argument::single("LANGUAGE", "ja"),
    ])
    .unwrap();
  card.add_part(PartKey::Name, "Doe;Jane;;;", None, &[]).unwrap();
  card.add_string(StringKey::Kind, "individual", None, &[]).unwrap();
  card.add_part(PartKey::Birthday, "--0315", None, &[]).unwrap();
  card.add_part(PartKey::Gender, "F", None, &[]).unwrap();
  card
    .add_part(PartKey::Geo, "geo:37.386013,-122.082932", None, &[])
    .unwrap();
  card
    .add_part(PartKey::Photo, "data:image/png;base64,aGVsbG8=", None, &[])
    .unwrap();
  card.add_part(PartKey::Categories, "work,friends", None, &[]).unwrap();
  card.add_part(PartKey::Revision, "20240101T120000Z", None, &[]).unwrap();
  card
    .add_string(StringKey::Email, "jane@example.com", None, &[
      Argument::single("TYPE", "WORK"),
      Argument::single("PREF", "1"),
    ])
    .unwrap();
  card
    .add_part(PartKey::Impp, "xmpp:jane@example.com", None, &[])
    .unwrap();

  let saved = card.save_to_string(true).unwrap();
  assert!(saved.contains("EMAIL;TYPE=work;PREF=1:jane@example.com"), "{saved}");
  assert!(saved.contains("GEO:geo:37.386013,-122.082932"), "{saved}");

  let geo = card.parts_array::<GeoInfo>()[0];
  assert_eq!(geo.latitude, 37.386013);
  assert_round_trip(&card);
}

#[test]
fn vcard_40_rejects_legacy_syntax() {
  let text = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:x\r\nTEL;HOME:+1\r\nEND:VCARD\r\n";
  let err = parse(text).unwrap_err();
  assert!(matches!(err.root_cause(), Error::MalformedArgument { .. }));

  let text = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:x\r\n\
              PHOTO;ENCODING=b:aGVsbG8=\r\nEND:VCARD\r\n";
  let err = parse(text).unwrap_err();
  assert!(matches!(err.root_cause(), Error::VersionMismatch { .. }));
}

#[test]
fn inline_agent_under_vcard_30() {
  let text = "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Boss;Big;;;\r\nFN:Big Boss\r\n\
              AGENT:BEGIN:VCARD\\nVERSION:3.0\\nN:Aide\\;Little\\;\\;\\;\\n\
              FN:Little Aide\\nEND:VCARD\r\nEND:VCARD\r\n";
  let card = parse(text).unwrap();
  let agents = card.agents();
  assert_eq!(agents.len(), 1);
  assert_eq!(agents[0].string(StringKey::FullName), Some("Little Aide"));
  assert!(matches!(
    card.part_values::<AgentInfo>(PartKey::Agent)[0],
    AgentInfo::Card(_)
  ));
  assert_round_trip(&card);
}

#[test]
fn nested_agent_under_vcard_21() {
  let text = "BEGIN:VCARD\r\nVERSION:2.1\r\nN:Boss;Big\r\nAGENT:\r\n\
              BEGIN:VCARD\r\nVERSION:2.1\r\nN:Aide;Little\r\n\
              TEL;WORK:+1 555 0199\r\nEND:VCARD\r\nEND:VCARD\r\n";
  let card = parse(text).unwrap();
  let agent = card.agents()[0];
  assert_eq!(agent.parts(PartKey::Telephone)[0].types, vec!["WORK"]);
  assert_round_trip(&card);
}

#[test]
fn blobs_stream_their_bytes() {
  let text = "BEGIN:VCARD\r\nVERSION:3.0\r\nN:D;J;;;\r\nFN:J\r\n\
              PHOTO;ENCODING=b;TYPE=JPEG:aGVsbG8=\r\n\
              LOGO;VALUE=uri:http://example.com/logo.png\r\nEND:VCARD\r\n";
  let card = parse(text).unwrap();
  let photo = card.part_values::<BlobInfo>(PartKey::Photo)[0];
  let mut bytes = Vec::new();
  photo.stream().unwrap().read_to_end(&mut bytes).unwrap();
  assert_eq!(bytes, b"hello");

  let logo = card.part_values::<BlobInfo>(PartKey::Logo)[0];
  assert!(matches!(logo.stream(), Err(Error::ExternalBlob(_))));
  assert_round_trip(&card);
}

#[test]
fn extension_round_trip_keeps_casing_and_values() {
  let text = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:x\r\nX-Custom-Field:a,b,c\r\n\
              END:VCARD\r\n";
  let card = parse(text).unwrap();
  let extensions = card.extension_parts_array();
  assert_eq!(extensions[0].name, "X-Custom-Field");
  assert_eq!(extensions[0].values, vec!["a", "b", "c"]);
  let saved = card.save_to_string(false).unwrap();
  assert!(saved.contains("X-Custom-Field:a,b,c\r\n"), "{saved}");
  assert_round_trip(&card);
}

#[test]
fn getters_hide_properties_outside_the_version() {
  let text = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:x\r\nKIND:org\r\nEND:VCARD\r\n";
  let mut card = parse(text).unwrap();
  assert_eq!(card.string(StringKey::Kind), Some("org"));
  card.version = Version::VCARD_30;
  assert_eq!(card.string(StringKey::Kind), None);
  let saved = card.save_to_string(false).unwrap();
  assert!(!saved.contains("KIND"), "{saved}");
}

// ─── Calendars ───────────────────────────────────────────────────────────────

const CAL_HEAD: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//versit//test//EN\r\n";

#[test]
fn geo_separator_follows_calendar_version() {
  let event = |version: &str, geo: &str| {
    format!(
      "BEGIN:VCALENDAR\r\nVERSION:{version}\r\nBEGIN:VEVENT\r\nGEO:{geo}\r\n\
       END:VEVENT\r\nEND:VCALENDAR\r\n"
    )
  };

  let old = parse(&event("1.0", "1.1;2.2")).unwrap();
  let geo = old.events()[0].part_values::<GeoInfo>(PartKey::Geo)[0];
  assert_eq!((geo.latitude, geo.longitude), (1.1, 2.2));

  let err = parse(&event("1.0", "40.7128,-74.0060")).unwrap_err();
  assert!(matches!(err.root_cause(), Error::MalformedValue { .. }));

  let new = parse(&event("2.0", "40.7128,-74.0060")).unwrap();
  let geo = new.events()[0].part_values::<GeoInfo>(PartKey::Geo)[0];
  assert_eq!(geo.longitude, -74.0060);
}

#[test]
fn event_with_alarm_scenario() {
  let text = format!(
    "{CAL_HEAD}BEGIN:VEVENT\r\nUID:evt-1\r\nDTSTAMP:20240101T000000Z\r\n\
     DTSTART:20240102T100000Z\r\nDTEND:20240102T110000Z\r\n\
     SUMMARY:Lunch\\, with team\r\nPRIORITY:5\r\n\
     ATTENDEE;CN=\"Smith: Alice\";ROLE=REQ-PARTICIPANT:mailto:alice@example.com\r\n\
     EXDATE:20240109T100000Z,20240116T100000Z\r\n\
     BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-PT15M\r\n\
     DESCRIPTION:Reminder\r\nEND:VALARM\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
  );
  let calendar = parse(&text).unwrap();
  let event = calendar.events()[0];
  assert_eq!(event.string(StringKey::Summary), Some("Lunch, with team"));
  assert_eq!(event.integer(IntegerKey::Priority), Some(5));
  let attendee = &event.parts(PartKey::Attendee)[0];
  assert_eq!(attendee.argument("CN").and_then(Argument::value), Some(
    "Smith: Alice"
  ));
  assert_eq!(
    event.part_values::<CalAddressInfo>(PartKey::Attendee)[0].email(),
    "alice@example.com"
  );

  let alarm = event.alarms()[0];
  assert!(matches!(
    alarm.part_values::<TriggerInfo>(PartKey::Trigger)[0],
    TriggerInfo::Relative(d) if d.negative && d.minutes == 15
  ));
  assert!(calendar.validate().is_ok());
  assert_round_trip(&calendar);

  let broken = text.replace("ACTION:DISPLAY\r\n", "");
  let calendar = parse(&broken).unwrap();
  match calendar.validate().unwrap_err() {
    Error::MissingRequiredField { component, fields } => {
      assert_eq!(component, "VALARM");
      assert_eq!(fields, ["ACTION"]);
    }
    other => panic!("unexpected {other:?}"),
  }
  assert!(calendar.save_to_string(true).is_err());
  assert!(calendar.save_to_string(false).is_ok());
}

#[test]
fn calendar_built_through_the_api() {
  let mut calendar = Component::calendar(Version::VCALENDAR_20).unwrap();
  calendar
    .add_string(StringKey::ProductId, "-//versit//api//EN", None, &[])
    .unwrap();

  let mut todo =
    Component::new(ComponentKind::Todo, Version::VCALENDAR_20).unwrap();
  todo.add_string(StringKey::Uid, "todo-1", None, &[]).unwrap();
  todo.add_part(PartKey::DateStamp, "20240101T000000Z", None, &[]).unwrap();
  todo.add_part(PartKey::Due, "20240201", None, &[Argument::single(
    "VALUE", "date",
  )])
  .unwrap();
  todo.add_integer(IntegerKey::PercentComplete, 40, None, &[]).unwrap();
  todo.add_part(PartKey::Categories, "home,chores", None, &[]).unwrap();
  calendar.add_child(todo).unwrap();

  let mut zone =
    Component::new(ComponentKind::TimeZone, Version::VCALENDAR_20)
      .unwrap();
  zone.add_string(StringKey::TimeZoneId, "Europe/Paris", None, &[]).unwrap();
  let mut standard =
    Component::new(ComponentKind::Standard, Version::VCALENDAR_20)
      .unwrap();
  standard
    .add_part(PartKey::DateStart, "19701025T030000", None, &[])
    .unwrap();
  standard
    .add_part(PartKey::TimeZoneOffsetFrom, "+0200", None, &[])
    .unwrap();
  standard
    .add_part(PartKey::TimeZoneOffsetTo, "+0100", None, &[])
    .unwrap();
  zone.add_child(standard).unwrap();
  calendar.add_child(zone).unwrap();

  assert!(calendar.validate().is_ok());
  assert_eq!(calendar.todos().len(), 1);
  assert_eq!(calendar.time_zones()[0].standards().len(), 1);
  assert_round_trip(&calendar);
}

#[test]
fn vcalendar_10_round_trip() {
  let text = "BEGIN:VCALENDAR\r\nVERSION:1.0\r\nPRODID:-//versit//old//EN\r\n\
              BEGIN:VEVENT\r\nDTSTART:19960918T143000Z\r\n\
              DTEND:19960920T220000Z\r\nSUMMARY:Meeting\r\n\
              DESCRIPTION;ENCODING=QUOTED-PRINTABLE:Agenda=0D=0A1. Budget\r\n\
              DCREATED:19960901T000000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
  let calendar = parse(text).unwrap();
  let event = calendar.events()[0];
  assert_eq!(event.string(StringKey::Description), Some("Agenda\n1. Budget"));
  assert_eq!(event.parts(PartKey::Created).len(), 1);

  let saved = calendar.save_to_string(false).unwrap();
  assert!(saved.contains("DCREATED:19960901T000000Z"), "{saved}");
  assert!(saved.contains("DESCRIPTION;QUOTED-PRINTABLE:Agenda=0D=0A"), "{saved}");
  assert_round_trip(&calendar);
}

#[test]
fn published_icalendar_sample_is_written_back_unchanged() {
  let text = "BEGIN:VCALENDAR\r\n\
              PRODID:-//xyz Corp//NONSGML PDA Calendar Version 1.0//EN\r\n\
              VERSION:2.0\r\nBEGIN:VEVENT\r\nDTSTAMP:19960704T120000Z\r\n\
              UID:uid1@example.com\r\nORGANIZER:mailto:jsmith@example.com\r\n\
              DTSTART:19960918T143000Z\r\nDTEND:19960920T220000Z\r\n\
              STATUS:CONFIRMED\r\nCATEGORIES:CONFERENCE\r\n\
              SUMMARY:Networld+Interop Conference\r\n\
              RRULE:FREQ=YEARLY;BYMONTH=9;BYDAY=3WE\r\n\
              URL:http://www.example.com/cal?a=1,2;b=3\r\n\
              END:VEVENT\r\nEND:VCALENDAR\r\n";
  let calendar = parse(text).unwrap();
  assert!(calendar.validate().is_ok());
  let event = calendar.events()[0];
  assert_eq!(
    event.string(StringKey::RecurrenceRule),
    Some("FREQ=YEARLY;BYMONTH=9;BYDAY=3WE")
  );

  let saved = calendar.save_to_string(true).unwrap();
  for line in text.split("\r\n").filter(|l| !l.is_empty()) {
    assert!(saved.contains(&format!("{line}\r\n")), "{line} missing:\n{saved}");
  }
  assert_round_trip(&calendar);
}

#[test]
fn api_built_rules_and_uris_are_written_verbatim() {
  let mut calendar = Component::calendar(Version::VCALENDAR_20).unwrap();
  calendar.add_string(StringKey::ProductId, "-//x//y", None, &[]).unwrap();
  let mut event =
    Component::new(ComponentKind::Event, Version::VCALENDAR_20).unwrap();
  event
    .add_string(StringKey::RecurrenceRule, "FREQ=DAILY;COUNT=5", None, &[])
    .unwrap();
  event
    .add_string(StringKey::Url, "http://x.org/?q=a,b;c", None, &[])
    .unwrap();
  event
    .add_string(StringKey::Summary, "a, b; c", None, &[])
    .unwrap();
  assert_eq!(event.string(StringKey::Url), Some("http://x.org/?q=a,b;c"));
  calendar.add_child(event).unwrap();

  let saved = calendar.save_to_string(false).unwrap();
  assert!(saved.contains("\r\nRRULE:FREQ=DAILY;COUNT=5\r\n"), "{saved}");
  assert!(saved.contains("\r\nURL:http://x.org/?q=a,b;c\r\n"), "{saved}");
  assert!(saved.contains("\r\nSUMMARY:a\\, b\\; c\r\n"), "{saved}");
  assert_round_trip(&calendar);
}

#[test]
fn vcalendar_10_recurrence_and_alarm_values() {
  let text = "BEGIN:VCALENDAR\r\nVERSION:1.0\r\n\
              BEGIN:VEVENT\r\nDTSTART:19960401T073000Z\r\n\
              RRULE:W1 MO #3\r\nRNUM:3\r\n\
              AALARM:19960401T072500Z;PT5M;2;file:///bell.wav\r\n\
              END:VEVENT\r\nEND:VCALENDAR\r\n";
  let calendar = parse(text).unwrap();
  let event = calendar.events()[0];
  assert_eq!(event.integer(IntegerKey::RecurrenceCount), Some(3));
  assert_eq!(
    event.string(StringKey::AudioAlarm),
    Some("19960401T072500Z;PT5M;2;file:///bell.wav")
  );
  assert!(calendar.validate().is_ok());

  let saved = calendar.save_to_string(false).unwrap();
  assert!(saved.contains("\r\nRNUM:3\r\n"), "{saved}");
  assert!(
    saved.contains("\r\nAALARM:19960401T072500Z;PT5M;2;file:///bell.wav\r\n"),
    "{saved}"
  );
  assert_round_trip(&calendar);
}

#[test]
fn vcalendar_10_rejects_alarm_blocks() {
  let text = "BEGIN:VCALENDAR\r\nVERSION:1.0\r\nBEGIN:VEVENT\r\n\
              DTSTART:19960401T073000Z\r\nBEGIN:VALARM\r\n\
              TRIGGER:-PT5M\r\nEND:VALARM\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
  let err = parse(text).unwrap_err();
  assert!(matches!(err.root_cause(), Error::InvalidNesting { .. }), "{err}");

  let calendar = parse_with(text, &ParseOptions::lenient()).unwrap();
  assert!(calendar.events()[0].alarms().is_empty());
  assert!(calendar.validate().is_ok());
}

#[test]
fn latin1_quoted_printable_in_vcard_21() {
  let text = "BEGIN:VCARD\r\nVERSION:2.1\r\nN:M=FCller;J\r\n\
              NOTE;CHARSET=ISO-8859-1;ENCODING=QUOTED-PRINTABLE:Caf=E9\r\n\
              END:VCARD\r\n";
  let card = parse(text).unwrap();
  let note = &card.strings(StringKey::Note)[0];
  assert_eq!(note.value, "Café");
  assert!(note.argument("CHARSET").is_none());
  assert_eq!(card.parts_array::<NameInfo>()[0].family_name, "M=FCller");

  let saved = card.save_to_string(false).unwrap();
  assert!(saved.contains("NOTE:Café\r\n"), "{saved}");
  assert_round_trip(&card);
}

// ─── Documents and files ─────────────────────────────────────────────────────

#[test]
fn parse_many_reads_every_object() {
  let text = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Alice\r\nEND:VCARD\r\n\
              BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Bob\r\nGEO:bad\r\nEND:VCARD\r\n\
              BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
  let results = parse_many(text);
  assert_eq!(results.len(), 3);
  assert!(results[0].is_ok());
  assert!(results[1].is_err());
  assert!(results[2].is_ok());
}

#[test]
fn lenient_parse_keeps_good_lines() {
  let text = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Bob\r\nGEO:bad\r\n\
              NOTE:kept\r\nEND:VCARD\r\n";
  let card = parse_with(text, &ParseOptions::lenient()).unwrap();
  assert_eq!(card.string(StringKey::Note), Some("kept"));
  assert!(card.parts(PartKey::Geo).is_empty());
}

#[test]
fn save_and_parse_file() {
  let path = std::env::temp_dir().join("versit-e2e.ics");
  let text = format!(
    "{CAL_HEAD}BEGIN:VJOURNAL\r\nUID:j\r\nDTSTAMP:20240101T000000Z\r\n\
     DESCRIPTION:one\r\nDESCRIPTION:two\r\nEND:VJOURNAL\r\nEND:VCALENDAR\r\n"
  );
  let calendar = parse(&text).unwrap();
  calendar
    .save_to_file(&path, &SaveOptions {
      validate:    true,
      line_ending: LineEnding::Lf,
    })
    .unwrap();
  let written = std::fs::read_to_string(&path).unwrap();
  assert!(!written.contains('\r'));
  let reread = parse_file(&path).unwrap();
  assert_eq!(reread, calendar);
  assert_eq!(reread.journals()[0].string_values(StringKey::Description), vec![
    "one", "two"
  ]);
  std::fs::remove_file(path).unwrap();
}

#[test]
fn json_view_of_a_card() {
  let card = parse(
    "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Alice\r\nN:A;Alice;;;\r\nEND:VCARD\r\n",
  )
  .unwrap();
  let json = serde_json::to_value(&card).unwrap();
  assert_eq!(json["kind"], "Card");
  assert_eq!(json["version"]["major"], 4);
  assert_eq!(json["store"]["strings"]["FullName"][0]["value"], "Alice");
  assert_eq!(
    json["store"]["parts"]["Name"][0]["value"]["data"]["given_name"],
    "Alice"
  );
}
