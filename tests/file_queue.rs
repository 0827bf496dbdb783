//! Queued file sink: per-key workers, ordering, backpressure and shutdown.

use sinklog::route::{console, file_queue};
use sinklog::{ConsoleWriter, Error, Logger, ParsedLine, Site};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(ToString::to_string)
        .collect()
}

fn values(path: &Path) -> Vec<String> {
    read_lines(path)
        .iter()
        .map(|line| ParsedLine::parse(line).unwrap().value)
        .collect()
}

#[test]
fn three_records_land_in_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");

    let logger = Logger::builder()
        .file_queue()
        .file("a", path_str(&path))
        .done()
        .build()
        .unwrap();

    for value in ["one", "two", "three"] {
        logger.info_to(Site::new("app"), value, &[file_queue("a")]);
    }
    let report = logger.shutdown();

    assert!(report.is_clean());
    assert_eq!(report.written, 3);
    assert_eq!(values(&path), vec!["one", "two", "three"]);
}

#[test]
fn fifo_per_key_under_load() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.log");
    let b = tmp.path().join("b.log");

    let logger = Logger::builder()
        .file_queue()
        .capacity(8)
        .file("a", path_str(&a))
        .file("b", path_str(&b))
        .done()
        .build()
        .unwrap();

    for i in 0..200 {
        logger.info_to(Site::default(), &i, &[file_queue("a"), file_queue("b")]);
    }
    logger.shutdown();

    let expected: Vec<String> = (0..200).map(|i| i.to_string()).collect();
    assert_eq!(values(&a), expected);
    assert_eq!(values(&b), expected);
}

#[test]
fn full_queue_blocks_instead_of_dropping() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("slow.log");

    let logger = Logger::builder()
        .file_queue()
        .capacity(1)
        .file("slow", path_str(&path))
        .done()
        .build()
        .unwrap();

    for i in 0..50 {
        logger.info_to(Site::default(), &i, &[file_queue("slow")]);
    }
    let report = logger.shutdown_within(Duration::from_secs(30));

    assert_eq!(report.written, 50);
    assert_eq!(report.undelivered, 0);
    assert_eq!(read_lines(&path).len(), 50);
}

#[test]
fn zero_timeout_accounts_for_every_line() {
    let tmp = TempDir::new().unwrap();
    let (writer, _capture) = ConsoleWriter::capture();

    let logger = Logger::builder()
        .console_writer(writer)
        .file_queue()
        .file("a", path_str(&tmp.path().join("a.log")))
        .done()
        .build()
        .unwrap();

    for i in 0..1000 {
        logger.info_to(Site::default(), &i, &[file_queue("a")]);
    }
    let report = logger.shutdown_within(Duration::ZERO);

    assert_eq!(report.timed_out, vec!["a"]);
    assert!(report.undelivered > 0);
    assert!(!report.is_clean());
    assert_eq!(report.written + report.failed + report.undelivered, 1000);
}

#[test]
fn unknown_key_writes_one_console_line_and_no_file() {
    let tmp = TempDir::new().unwrap();
    let (writer, capture) = ConsoleWriter::capture();

    let logger = Logger::builder()
        .console_writer(writer)
        .file_queue()
        .file("a", path_str(&tmp.path().join("a.log")))
        .done()
        .build()
        .unwrap();

    logger.info_to(Site::default(), "lost", &[file_queue("b")]);
    logger.shutdown();

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("value=[lost]"));
    assert!(lines[0].contains("error=[unknown file key: 'b'];"));
    assert!(!tmp.path().join("b.log").exists());
    assert!(!tmp.path().join("a.log").exists());
}

#[test]
fn explicit_route_without_key_is_escalated() {
    let tmp = TempDir::new().unwrap();
    let (writer, capture) = ConsoleWriter::capture();

    let logger = Logger::builder()
        .console_writer(writer)
        .file_queue()
        .file("a", path_str(&tmp.path().join("a.log")))
        .done()
        .build()
        .unwrap();

    let keyless = sinklog::Selector::new(sinklog::Target::FileQueue);
    logger.info_to(Site::new("a"), "x", &[keyless]);

    assert!(capture.contents().contains("error=[missing file key];"));
}

#[test]
fn registering_same_key_twice_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let path = path_str(&tmp.path().join("a.log"));

    let logger = Logger::builder()
        .file_queue()
        .file("a", path.as_str())
        .done()
        .build()
        .unwrap();

    assert!(!logger.register_queue_file("a", &path).unwrap());
    let sink = logger.file_queue().unwrap();
    assert_eq!(sink.worker_count(), 1);
    assert_eq!(sink.file_count(), 1);
}

#[test]
fn same_key_with_other_path_is_rejected() {
    let tmp = TempDir::new().unwrap();

    let logger = Logger::builder().file_queue().done().build().unwrap();
    logger
        .register_queue_file("a", &path_str(&tmp.path().join("a.log")))
        .unwrap();

    let err = logger
        .register_queue_file("a", &path_str(&tmp.path().join("other.log")))
        .unwrap_err();
    match err {
        Error::DuplicateKey { key, .. } => assert_eq!(key, "a"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(logger.file_queue().unwrap().worker_count(), 1);
}

#[test]
fn duplicate_key_fails_build() {
    let tmp = TempDir::new().unwrap();
    let result = Logger::builder()
        .file_queue()
        .file("a", path_str(&tmp.path().join("1.log")))
        .file("a", path_str(&tmp.path().join("2.log")))
        .done()
        .build();
    assert!(matches!(result, Err(Error::DuplicateKey { .. })));
}

#[test]
fn files_registered_later_get_their_own_worker() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.log");
    let b = tmp.path().join("b.log");

    let logger = Logger::builder()
        .file_queue()
        .file("a", path_str(&a))
        .done()
        .build()
        .unwrap();

    logger.info_to(Site::default(), "first", &[file_queue("a")]);
    assert!(logger.register_queue_file("b", &path_str(&b)).unwrap());
    logger.info_to(Site::default(), "second", &[file_queue("a"), file_queue("b")]);
    logger.shutdown();

    assert_eq!(values(&a), vec!["first", "second"]);
    assert_eq!(values(&b), vec!["second"]);
}

#[test]
fn register_without_queue_sink_is_an_error() {
    let logger = Logger::builder().build().unwrap();
    assert!(matches!(
        logger.register_queue_file("a", "/tmp/a.log"),
        Err(Error::SinkNotConfigured("file-queue"))
    ));
}

#[test]
fn records_after_shutdown_are_escalated() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let (writer, capture) = ConsoleWriter::capture();

    let logger = Logger::builder()
        .console_writer(writer)
        .file_queue()
        .file("a", path_str(&path))
        .done()
        .build()
        .unwrap();

    logger.info_to(Site::default(), "kept", &[file_queue("a")]);
    let report = logger.shutdown();
    assert_eq!(report.written, 1);
    assert!(logger.file_queue().unwrap().is_closed());

    logger.info_to(Site::default(), "late", &[file_queue("a")]);
    assert!(capture.contents().contains("error=[sink is shut down];"));
    assert!(matches!(
        logger.register_queue_file("b", &path_str(&tmp.path().join("b.log"))),
        Err(Error::SinkClosed)
    ));

    assert_eq!(logger.shutdown(), sinklog::ShutdownReport::default());
    assert_eq!(values(&path), vec!["kept"]);
}

#[test]
fn open_failure_is_escalated_and_worker_keeps_going() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-dir").join("a.log");
    let (writer, capture) = ConsoleWriter::capture();

    let logger = Logger::builder()
        .console_writer(writer)
        .file_queue()
        .file("a", path_str(&missing))
        .done()
        .build()
        .unwrap();

    logger.info_to(Site::default(), "first", &[file_queue("a")]);
    logger.info_to(Site::default(), "second", &[file_queue("a")]);
    let report = logger.shutdown();

    assert_eq!(report.failed, 2);
    assert_eq!(report.written, 0);
    let lines = capture.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("value=[first]"));
    assert!(lines[0].contains("error=[open error on"));
    assert!(lines[1].contains("value=[second]"));
}

#[test]
fn console_and_file_from_one_call() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let (writer, capture) = ConsoleWriter::capture();

    let logger = Logger::builder()
        .console_writer(writer)
        .file_queue()
        .file("a", path_str(&path))
        .done()
        .build()
        .unwrap();

    logger.error_to(Site::default(), "both", &[console(), file_queue("a")]);
    logger.shutdown();

    assert_eq!(capture.lines().len(), 1);
    assert_eq!(values(&path), vec!["both"]);
}

#[test]
fn pending_drops_to_zero_after_drain() {
    let tmp = TempDir::new().unwrap();
    let logger = Logger::builder()
        .file_queue()
        .file("a", path_str(&tmp.path().join("a.log")))
        .done()
        .build()
        .unwrap();

    for i in 0..20 {
        logger.info_to(Site::default(), &i, &[file_queue("a")]);
    }
    logger.shutdown();
    assert_eq!(logger.file_queue().unwrap().pending(), 0);
}
