//! Which sinks a record goes to.
//!
//! Callers either name sinks per call with [`Selector`]s (explicit routing) or
//! leave the choice to the package routing table built into the logger.

mod router;
mod selector;

pub use router::{Dispatched, PackageRoutes, Router, UnmatchedPolicy};
pub use selector::{Dispatch, Selector, Target, console, file_mutex, file_queue};
