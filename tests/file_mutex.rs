//! Serialized file sink: synchronous writes, key resolution and concurrency.

use serde::ser::{Error as _, Serialize, Serializer};
use sinklog::route::{Dispatch, file_mutex};
use sinklog::{ConsoleWriter, Logger, ParsedLine, Site};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

struct Refuses;

impl Serialize for Refuses {
    fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("no json for you"))
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn write_is_visible_when_call_returns() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("m.log");

    let logger = Logger::builder()
        .file_mutex()
        .file("m", path_str(&path))
        .done()
        .build()
        .unwrap();

    logger.info_to(Site::new("app"), "now", &[file_mutex("m")]);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.ends_with('\n'));
    let parsed = ParsedLine::parse(content.trim_end()).unwrap();
    assert_eq!(parsed.value, "now");
}

#[test]
fn marshal_failure_leaves_file_untouched() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("m.log");
    let (writer, capture) = ConsoleWriter::capture();

    let logger = Logger::builder()
        .console_writer(writer)
        .file_mutex()
        .file("m", path_str(&path))
        .done()
        .build()
        .unwrap();

    logger.error_to(Site::default(), &Refuses, &[file_mutex("m")]);

    assert!(!path.exists());
    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("error=[marshal error: no json for you];"));
}

#[test]
fn appends_to_existing_content() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("m.log");
    fs::write(&path, "previous\n").unwrap();

    let logger = Logger::builder()
        .file_mutex()
        .template("{VALUE}")
        .file("m", path_str(&path))
        .done()
        .build()
        .unwrap();

    logger.info_to(Site::default(), "next", &[file_mutex("m")]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous\nnext\n");
}

#[test]
fn package_routing_picks_longest_key() {
    let tmp = TempDir::new().unwrap();
    let short = tmp.path().join("app.log");
    let long = tmp.path().join("db.log");

    let logger = Logger::builder()
        .package("app")
        .file_mutex(Dispatch::Inline, path_str(&short))
        .done()
        .package("app::db")
        .file_mutex(Dispatch::Inline, path_str(&long))
        .done()
        .build()
        .unwrap();

    logger.info(Site::new("app::db::pool"), "pooled");
    logger.info(Site::new("app::http"), "served");

    let long_content = fs::read_to_string(&long).unwrap();
    let short_content = fs::read_to_string(&short).unwrap();
    assert!(long_content.contains("value=[pooled]"));
    assert!(!long_content.contains("served"));
    assert!(short_content.contains("value=[served]"));
    assert!(!short_content.contains("pooled"));
}

#[test]
fn concurrent_writers_never_interleave() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("shared.log");

    let logger = Arc::new(
        Logger::builder()
            .file_mutex()
            .template("{VALUE}")
            .file("shared", path_str(&path))
            .done()
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..50 {
                    let value = format!("thread-{t}-line-{i}-{}", "x".repeat(64));
                    logger.info_to(Site::default(), &value, &[file_mutex("shared")]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 400);
    for line in lines {
        assert!(line.starts_with("thread-") && line.len() > 64);
    }
}

#[test]
fn two_keys_may_share_a_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("both.log");

    let logger = Logger::builder()
        .file_mutex()
        .template("{VALUE}")
        .file("x", path_str(&path))
        .file("y", path_str(&path))
        .done()
        .build()
        .unwrap();

    logger.info_to(Site::default(), "from-x", &[file_mutex("x")]);
    logger.info_to(Site::default(), "from-y", &[file_mutex("y")]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "from-x\nfrom-y\n");
    assert_eq!(logger.file_mutex().unwrap().file_count(), 2);
}
