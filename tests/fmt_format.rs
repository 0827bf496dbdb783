//! Template parsing and record rendering.

use sinklog::fmt::{
    DEFAULT_TEMPLATE, FormatSegment, FormatTemplate, Formatter, MARSHAL_PLACEHOLDER, Placeholder,
    TemplateError,
};
use sinklog::{Error, Level, ParsedLine, Record, Site};

fn fixed(level: Level, value: &str) -> Record {
    let site = Site::new("app::net").function("connect").line(42);
    Record::new(level, site, value).with_timestamp("Mon Jan  2 15:04:05 2006")
}

#[test]
fn default_template_renders_every_field() {
    let record = fixed(Level::Info, "hello");
    let line = Formatter::default().render(&record).unwrap();
    assert_eq!(
        line,
        "level=[INFO];func=[name: connect, line: 42, package:app::net];value=[hello];date=[Mon Jan  2 15:04:05 2006];"
    );
}

#[test]
fn custom_template() {
    let formatter = Formatter::new("{LEVEL} {PACKAGE}:{LINE} {VALUE}");
    let line = formatter.render(&fixed(Level::Error, "boom")).unwrap();
    assert_eq!(line, "ERROR app::net:42 boom");
}

#[test]
fn unknown_placeholder_is_rejected() {
    assert_eq!(
        FormatTemplate::try_parse("{LEVEL} {MSG}"),
        Err(TemplateError::UnknownPlaceholder("MSG".to_string()))
    );
}

#[test]
fn unclosed_brace_is_rejected() {
    assert_eq!(
        FormatTemplate::try_parse("value={VALUE"),
        Err(TemplateError::Unclosed(6))
    );
}

#[test]
fn invalid_template_falls_back_to_default() {
    let fallback = FormatTemplate::parse_or_default("{NOPE}");
    let default = FormatTemplate::try_parse(DEFAULT_TEMPLATE).unwrap();
    assert_eq!(fallback, default);

    let formatter = Formatter::new("{oops");
    let line = formatter.render(&fixed(Level::Info, "x")).unwrap();
    assert!(line.starts_with("level=[INFO];"));
}

#[test]
fn segments_split_literals_and_placeholders() {
    let template = FormatTemplate::try_parse("[{LEVEL}]").unwrap();
    assert_eq!(
        template.segments(),
        &[
            FormatSegment::Literal("[".to_string()),
            FormatSegment::Placeholder(Placeholder::Level),
            FormatSegment::Literal("]".to_string()),
        ]
    );
}

#[test]
fn structured_values_render_as_compact_json() {
    #[derive(serde::Serialize)]
    struct Login<'a> {
        user: &'a str,
        attempts: u32,
    }

    let record = Record::new(
        Level::Info,
        Site::default(),
        &Login {
            user: "ada",
            attempts: 3,
        },
    );
    let line = Formatter::new("{VALUE}").render(&record).unwrap();
    assert_eq!(line, r#"{"user":"ada","attempts":3}"#);
}

#[test]
fn default_site_renders_placeholders() {
    let record = Record::new(Level::Info, Site::default(), "v");
    let formatter = Formatter::new("{FUNC}|{LINE}|{PACKAGE}");
    let line = formatter.render(&record.with_timestamp("now")).unwrap();
    assert_eq!(line, "undefined func|-1|undefined package");
}

#[test]
fn empty_payload_without_date_is_escalated() {
    let record = Record::new(Level::Info, Site::default(), &());
    let record = record.with_timestamp("");
    let escalation = Formatter::default().render(&record).unwrap_err();
    assert!(matches!(escalation.error, Error::EmptyValue));
    assert!(escalation.line.contains("value=[]"));
}

#[test]
fn empty_payload_with_date_renders() {
    let record = Record::new(Level::Info, Site::default(), &Option::<u8>::None);
    let line = Formatter::default().render(&record).unwrap();
    assert!(line.contains("value=[];"));
}

#[test]
fn rendered_line_parses_back() {
    let record = fixed(Level::Panic, "disk [sda] gone");
    let line = Formatter::default().render(&record).unwrap();
    let parsed = ParsedLine::parse(&line).unwrap();

    assert_eq!(parsed.level, Level::Panic);
    assert_eq!(parsed.func, "connect");
    assert_eq!(parsed.line, 42);
    assert_eq!(parsed.package, "app::net");
    assert_eq!(parsed.value, "disk [sda] gone");
    assert_eq!(parsed.date, record.timestamp());
    assert_eq!(parsed.error, None);
}

#[test]
fn escalated_line_parses_error() {
    let line = "level=[ERROR];func=[name: f, line: -1, package:p];value=[marshal error];date=[d];error=[marshal error: bad];";
    let parsed = ParsedLine::parse(line).unwrap();
    assert_eq!(parsed.value, MARSHAL_PLACEHOLDER);
    assert_eq!(parsed.line, -1);
    assert_eq!(parsed.error.as_deref(), Some("marshal error: bad"));
}

#[test]
fn foreign_line_does_not_parse() {
    assert!(ParsedLine::parse("[INFO] something else").is_none());
}
