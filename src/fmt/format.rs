//! Line templates such as
//! `level=[{LEVEL}];func=[name: {FUNC}, line: {LINE}, package:{PACKAGE}];value=[{VALUE}];date=[{DATE}];`.
//!
//! Parsed once at sink construction and rendered for every record.

use std::fmt;

/// Template every sink falls back to when its configured template does not parse.
pub const DEFAULT_TEMPLATE: &str = concat!(
    "level=[{LEVEL}];func=[name: {FUNC}, line: {LINE}, package:{PACKAGE}];",
    "value=[{VALUE}];date=[{DATE}];"
);

/// Closed set of substitution tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Level,
    Func,
    Line,
    Package,
    Value,
    Date,
}

impl Placeholder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Level => "LEVEL",
            Self::Func => "FUNC",
            Self::Line => "LINE",
            Self::Package => "PACKAGE",
            Self::Value => "VALUE",
            Self::Date => "DATE",
        }
    }

    pub const ALL: &'static [Self] = &[
        Self::Level,
        Self::Func,
        Self::Line,
        Self::Package,
        Self::Value,
        Self::Date,
    ];

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ph| ph.as_str() == name)
    }
}

/// Parsing into segments once avoids re-scanning the template on every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Why a template was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `{NAME}` where `NAME` is not a known placeholder.
    UnknownPlaceholder(String),
    /// `{` without a matching `}`.
    Unclosed(usize),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPlaceholder(name) => write!(f, "unknown placeholder: {{{name}}}"),
            Self::Unclosed(pos) => write!(f, "unclosed brace at {pos}"),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Pre-parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    segments: Vec<FormatSegment>,
}

impl FormatTemplate {
    /// Strict parse: any unknown placeholder or stray `{` rejects the template.
    ///
    /// # Errors
    /// Returns the first problem found, scanning left to right.
    pub fn try_parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let chars: Vec<char> = template.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] == '{' {
                let Some(end) = chars[i..].iter().position(|&c| c == '}') else {
                    return Err(TemplateError::Unclosed(i));
                };
                let end = i + end;
                let name: String = chars[i + 1..end].iter().collect();
                let Some(ph) = Placeholder::from_name(&name) else {
                    return Err(TemplateError::UnknownPlaceholder(name));
                };

                if !current.is_empty() {
                    segments.push(FormatSegment::Literal(std::mem::take(&mut current)));
                }
                segments.push(FormatSegment::Placeholder(ph));
                i = end + 1;
                continue;
            }

            current.push(chars[i]);
            i += 1;
        }

        if !current.is_empty() {
            segments.push(FormatSegment::Literal(current));
        }

        Ok(Self { segments })
    }

    /// Lenient parse used by sink construction: a bad template degrades to
    /// [`DEFAULT_TEMPLATE`] instead of failing the builder.
    #[must_use]
    pub fn parse_or_default(template: &str) -> Self {
        Self::try_parse(template).unwrap_or_default()
    }

    #[must_use]
    pub fn segments(&self) -> &[FormatSegment] {
        &self.segments
    }

    #[must_use]
    pub fn render(&self, values: &FormatValues) -> String {
        let mut result = String::new();

        for segment in &self.segments {
            match segment {
                FormatSegment::Literal(s) => result.push_str(s),
                FormatSegment::Placeholder(ph) => {
                    let value = match ph {
                        Placeholder::Level => &values.level,
                        Placeholder::Func => &values.func,
                        Placeholder::Line => &values.line,
                        Placeholder::Package => &values.package,
                        Placeholder::Value => &values.value,
                        Placeholder::Date => &values.date,
                    };
                    result.push_str(value);
                }
            }
        }

        result
    }
}

impl Default for FormatTemplate {
    fn default() -> Self {
        let segments = vec![
            FormatSegment::Literal("level=[".to_string()),
            FormatSegment::Placeholder(Placeholder::Level),
            FormatSegment::Literal("];func=[name: ".to_string()),
            FormatSegment::Placeholder(Placeholder::Func),
            FormatSegment::Literal(", line: ".to_string()),
            FormatSegment::Placeholder(Placeholder::Line),
            FormatSegment::Literal(", package:".to_string()),
            FormatSegment::Placeholder(Placeholder::Package),
            FormatSegment::Literal("];value=[".to_string()),
            FormatSegment::Placeholder(Placeholder::Value),
            FormatSegment::Literal("];date=[".to_string()),
            FormatSegment::Placeholder(Placeholder::Date),
            FormatSegment::Literal("];".to_string()),
        ];
        Self { segments }
    }
}

/// Typed value bag: one field per placeholder.
#[derive(Debug, Clone, Default)]
pub struct FormatValues {
    pub level: String,
    pub func: String,
    pub line: String,
    pub package: String,
    pub value: String,
    pub date: String,
}

impl FormatValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn func(mut self, func: impl Into<String>) -> Self {
        self.func = func.into();
        self
    }

    #[must_use]
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.line = line.into();
        self
    }

    #[must_use]
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }
}
