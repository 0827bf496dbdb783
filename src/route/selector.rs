use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Sink kinds a selector can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Console,
    FileQueue,
    FileMutex,
}

impl Target {
    /// Names used in config files and in `SinkNotConfigured` errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::FileQueue => "file-queue",
            Self::FileMutex => "file-mutex",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "console" => Ok(Self::Console),
            "file-queue" | "queue" | "file-multi" => Ok(Self::FileQueue),
            "file-mutex" | "mutex" => Ok(Self::FileMutex),
            _ => Err(Error::InvalidSelector(s.to_string())),
        }
    }
}

/// Where the sink's `add` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dispatch {
    /// On the calling thread, before the logging call returns.
    #[default]
    Inline,
    /// On a new thread; completion is observable through [`Dispatched`](super::Dispatched).
    Detached,
}

/// One sink choice for one logging call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    target: Target,
    dispatch: Dispatch,
    key: Option<String>,
}

impl Selector {
    #[must_use]
    pub const fn new(target: Target) -> Self {
        Self {
            target,
            dispatch: Dispatch::Inline,
            key: None,
        }
    }

    /// Runs this selector on its own thread.
    #[must_use]
    pub const fn detached(mut self) -> Self {
        self.dispatch = Dispatch::Detached;
        self
    }

    #[must_use]
    pub const fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub const fn target(&self) -> Target {
        self.target
    }

    #[must_use]
    pub const fn dispatch_mode(&self) -> Dispatch {
        self.dispatch
    }

    #[must_use]
    pub fn file_key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

/// Console, inline.
#[must_use]
pub const fn console() -> Selector {
    Selector::new(Target::Console)
}

/// Queued file sink, inline enqueue to `key`.
#[must_use]
pub fn file_queue(key: impl Into<String>) -> Selector {
    Selector::new(Target::FileQueue).key(key)
}

/// Serialized file sink, inline write to `key`.
#[must_use]
pub fn file_mutex(key: impl Into<String>) -> Selector {
    Selector::new(Target::FileMutex).key(key)
}
