use super::selector::{Dispatch, Selector, Target};
use crate::error::Error;
use crate::internal;
use crate::record::Record;
use crate::sink::{ConsoleSink, FileMutexSink, FileQueueSink, Sink, longest_match};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// What happens to a package-routed record whose package matches no route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedPolicy {
    /// Discard silently (opt-in logging).
    #[default]
    Drop,
    /// Send it to the console sink.
    Console,
    /// Escalate an `Unrouted` error line to the console.
    FailLoud,
}

impl UnmatchedPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Console => "console",
            Self::FailLoud => "fail",
        }
    }
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnmatchedPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" | "ignore" => Ok(Self::Drop),
            "console" | "default" => Ok(Self::Console),
            "fail" | "fail-loud" | "loud" => Ok(Self::FailLoud),
            other => Err(Error::InvalidPolicy(other.to_string())),
        }
    }
}

/// Package-name substring → ordered selectors. Read-only once the logger is built.
#[derive(Debug, Clone, Default)]
pub struct PackageRoutes {
    routes: BTreeMap<String, Vec<Selector>>,
}

impl PackageRoutes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the package's selector list, keeping installation order.
    pub fn push(&mut self, package: impl Into<String>, selector: Selector) {
        self.routes
            .entry(package.into())
            .or_default()
            .push(selector);
    }

    /// Longest route name contained in `package`; ties go to the
    /// lexicographically smallest name.
    #[must_use]
    pub fn resolve(&self, package: &str) -> Option<(&str, &[Selector])> {
        let name = longest_match(package, self.routes.keys().map(String::as_str))?;
        self.routes
            .get_key_value(name)
            .map(|(name, selectors)| (name.as_str(), selectors.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Join handles of the detached writes one logging call started.
///
/// Dropping it leaves the writes running (fire-and-forget); [`Dispatched::wait`]
/// blocks until they finish.
#[derive(Debug, Default)]
pub struct Dispatched {
    handles: Vec<JoinHandle<()>>,
}

impl Dispatched {
    #[must_use]
    pub fn detached_count(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }

    /// Returns how many detached writes panicked.
    pub fn wait(self) -> usize {
        self.handles
            .into_iter()
            .map(JoinHandle::join)
            .filter(Result::is_err)
            .count()
    }

    pub(crate) fn merge(&mut self, other: Self) {
        self.handles.extend(other.handles);
    }
}

/// Resolves records to sinks and runs each sink inline or detached.
#[derive(Debug)]
pub struct Router {
    console: Arc<ConsoleSink>,
    file_queue: Option<Arc<FileQueueSink>>,
    file_mutex: Option<Arc<FileMutexSink>>,
    routes: PackageRoutes,
    unmatched: UnmatchedPolicy,
}

impl Router {
    #[must_use]
    pub const fn new(
        console: Arc<ConsoleSink>,
        file_queue: Option<Arc<FileQueueSink>>,
        file_mutex: Option<Arc<FileMutexSink>>,
        routes: PackageRoutes,
        unmatched: UnmatchedPolicy,
    ) -> Self {
        Self {
            console,
            file_queue,
            file_mutex,
            routes,
            unmatched,
        }
    }

    #[must_use]
    pub fn console(&self) -> &ConsoleSink {
        &self.console
    }

    #[must_use]
    pub fn file_queue(&self) -> Option<&FileQueueSink> {
        self.file_queue.as_deref()
    }

    #[must_use]
    pub fn file_mutex(&self) -> Option<&FileMutexSink> {
        self.file_mutex.as_deref()
    }

    #[must_use]
    pub const fn routes(&self) -> &PackageRoutes {
        &self.routes
    }

    #[must_use]
    pub const fn unmatched(&self) -> UnmatchedPolicy {
        self.unmatched
    }

    /// Explicit routing when `selectors` is non-empty, package routing otherwise.
    pub fn dispatch(&self, record: Record, selectors: &[Selector]) -> Dispatched {
        if selectors.is_empty() {
            return self.dispatch_package(&record.with_explicit_routing(false));
        }
        let record = record.with_explicit_routing(true);
        let mut dispatched = Dispatched::default();
        for selector in selectors {
            dispatched.merge(self.invoke(&record, selector));
        }
        dispatched
    }

    fn dispatch_package(&self, record: &Record) -> Dispatched {
        let package = record.site().package_name();
        if let Some((name, selectors)) = self.routes.resolve(package) {
            internal::trace("ROUTER", &format!("Package {package} matched route {name}"));
            let mut dispatched = Dispatched::default();
            for selector in selectors {
                dispatched.merge(self.invoke(record, selector));
            }
            return dispatched;
        }

        match self.unmatched {
            UnmatchedPolicy::Drop => {
                internal::trace("ROUTER", &format!("No route for {package}, dropped"));
                Dispatched::default()
            }
            UnmatchedPolicy::Console => {
                let console = Arc::clone(&self.console) as Arc<dyn Sink>;
                run(Dispatch::Inline, console, record, None)
            }
            UnmatchedPolicy::FailLoud => {
                let basic = self.console.basic();
                basic.error_output(
                    &basic.best_effort_line(record),
                    &Error::Unrouted(package.to_string()),
                );
                Dispatched::default()
            }
        }
    }

    fn invoke(&self, record: &Record, selector: &Selector) -> Dispatched {
        let sink: Option<Arc<dyn Sink>> = match selector.target() {
            Target::Console => Some(Arc::clone(&self.console) as Arc<dyn Sink>),
            Target::FileQueue => self
                .file_queue
                .as_ref()
                .map(|s| Arc::clone(s) as Arc<dyn Sink>),
            Target::FileMutex => self
                .file_mutex
                .as_ref()
                .map(|s| Arc::clone(s) as Arc<dyn Sink>),
        };
        let key = selector.file_key().map(ToString::to_string);

        if let Some(sink) = sink {
            return run(selector.dispatch_mode(), sink, record, key);
        }

        // Degrade to the console, then report the missing sink.
        let dispatched = run(
            selector.dispatch_mode(),
            Arc::clone(&self.console) as Arc<dyn Sink>,
            record,
            None,
        );
        let basic = self.console.basic();
        basic.error_output(
            &basic.best_effort_line(record),
            &Error::SinkNotConfigured(selector.target().as_str()),
        );
        dispatched
    }
}

fn run(
    dispatch: Dispatch,
    sink: Arc<dyn Sink>,
    record: &Record,
    key: Option<String>,
) -> Dispatched {
    match dispatch {
        Dispatch::Inline => {
            sink.add(record, key.as_deref());
            Dispatched::default()
        }
        Dispatch::Detached => {
            let owned = record.clone();
            let spawned = thread::Builder::new()
                .name(format!("sinklog-{}", sink.name()))
                .spawn({
                    let sink = Arc::clone(&sink);
                    let key = key.clone();
                    move || sink.add(&owned, key.as_deref())
                });
            match spawned {
                Ok(handle) => Dispatched {
                    handles: vec![handle],
                },
                Err(e) => {
                    internal::warn("ROUTER", &format!("Spawn failed, running inline: {e}"));
                    sink.add(record, key.as_deref());
                    Dispatched::default()
                }
            }
        }
    }
}
