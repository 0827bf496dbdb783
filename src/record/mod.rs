//! One logging event plus the call-site context it was issued from.
//!
//! The payload is serialized when the record is built, so every later stage
//! (routing, queueing, escalation) has a renderable value even if serialization
//! failed.

use crate::level::Level;
use chrono::Local;
use serde::Serialize;

/// `Mon Jan  2 15:04:05 2006` layout.
pub const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

const UNKNOWN_FUNCTION: &str = "undefined func";
const UNKNOWN_PACKAGE: &str = "undefined package";

/// Call-site context supplied by the caller instead of discovered from the stack.
///
/// Package routing matches against [`Site::package`], so a logger-scoped site
/// (one per module) is enough to drive per-package configuration. The
/// [`site!`](crate::site) macro fills package and line from the invocation point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    package: String,
    function: String,
    line: Option<u32>,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            package: UNKNOWN_PACKAGE.to_string(),
            function: UNKNOWN_FUNCTION.to_string(),
            line: None,
        }
    }
}

impl Site {
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    #[must_use]
    pub const fn line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package
    }

    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function
    }

    /// `-1` when the caller gave no line, matching the rendered `line:` field.
    #[must_use]
    pub fn line_string(&self) -> String {
        match self.line {
            Some(line) => line.to_string(),
            None => "-1".to_string(),
        }
    }
}

/// Builds a [`Site`] for the current module and line, optionally naming the function.
///
/// ```
/// let site = sinklog::site!("handler");
/// assert_eq!(site.function_name(), "handler");
/// assert_eq!(site.package_name(), module_path!());
/// ```
#[macro_export]
macro_rules! site {
    () => {
        $crate::Site::new(module_path!()).line(line!())
    };
    ($function:expr) => {
        $crate::Site::new(module_path!())
            .function($function)
            .line(line!())
    };
}

/// Serialized form of the caller's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Strings render verbatim, everything else as compact JSON.
    Value(String),
    /// The value serialized to `null`.
    Empty,
    /// Serialization failed; holds the serializer's message.
    Invalid(String),
}

impl Payload {
    /// Serializes `value` through `serde_json` without ever failing.
    pub fn capture<T: Serialize + ?Sized>(value: &T) -> Self {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => return Self::Invalid(e.to_string()),
        };
        if json == "null" {
            return Self::Empty;
        }
        // Strings lose their quotes and escapes; field order of structs is kept.
        if json.starts_with('"')
            && let Ok(s) = serde_json::from_str::<String>(&json)
        {
            return Self::Value(s);
        }
        Self::Value(json)
    }
}

/// Immutable once dispatched; the consuming builder methods exist for the
/// window between construction and the logging call.
#[derive(Debug, Clone)]
pub struct Record {
    payload: Payload,
    level: Level,
    timestamp: String,
    site: Site,
    explicit_routing: bool,
}

impl Record {
    /// Stamps the record with the local time.
    pub fn new<T: Serialize + ?Sized>(level: Level, site: Site, value: &T) -> Self {
        Self {
            payload: Payload::capture(value),
            level,
            timestamp: Local::now().format(DATE_FORMAT).to_string(),
            site,
            explicit_routing: false,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Marks the record as routed by caller-supplied selectors rather than by package.
    #[must_use]
    pub const fn with_explicit_routing(mut self, explicit: bool) -> Self {
        self.explicit_routing = explicit;
        self
    }

    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[must_use]
    pub const fn site(&self) -> &Site {
        &self.site
    }

    #[must_use]
    pub const fn is_explicit_routing(&self) -> bool {
        self.explicit_routing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serializer;
    use std::collections::BTreeMap;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    #[test]
    fn strings_are_not_quoted() {
        let expected = Payload::Value("hello".to_string());
        assert_eq!(Payload::capture("hello"), expected);
    }

    #[test]
    fn structures_become_compact_json() {
        let mut map = BTreeMap::new();
        map.insert("id", 7);
        let expected = Payload::Value(r#"{"id":7}"#.to_string());
        assert_eq!(Payload::capture(&map), expected);
    }

    #[test]
    fn unit_is_empty() {
        assert_eq!(Payload::capture(&()), Payload::Empty);
        assert_eq!(Payload::capture(&None::<u8>), Payload::Empty);
    }

    #[test]
    fn serializer_failure_is_captured() {
        let Payload::Invalid(msg) = Payload::capture(&Unserializable) else {
            panic!("expected invalid payload");
        };
        assert!(msg.contains("refused"));
    }

    #[test]
    fn site_defaults_render_placeholders() {
        let site = Site::default();
        assert_eq!(site.function_name(), "undefined func");
        assert_eq!(site.package_name(), "undefined package");
        assert_eq!(site.line_string(), "-1");
    }

    #[test]
    fn site_macro_captures_module() {
        let site = crate::site!("probe");
        assert_eq!(site.package_name(), module_path!());
        assert_eq!(site.function_name(), "probe");
        assert_ne!(site.line_string(), "-1");
    }
}
