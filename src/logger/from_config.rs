//! Logger construction from a [`Config`].

use super::{Logger, LoggerBuilder};
use crate::config::{Config, RouteConfig};
use crate::error::Error;
use crate::internal;
use crate::route::{Dispatch, Target};

impl Logger {
    /// Loads the default config file and builds from it.
    ///
    /// # Errors
    /// Config loading errors, then anything [`Logger::from_config`] returns.
    pub fn from_default_config() -> Result<Self, Error> {
        let config = Config::load()?;
        Self::from_config(&config)
    }

    /// Also initializes internal diagnostics from `general.diagnostics` if
    /// nothing initialized them earlier.
    ///
    /// # Errors
    /// `InvalidSelector` for an unknown route sink, a file route without a
    /// path or with an empty one, plus everything [`LoggerBuilder::build`] returns.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        internal::init_with_config(config);
        internal::debug("LOGGER", "Building logger from config");

        let mut builder = LoggerBuilder::new()
            .unmatched(config.parse_unmatched())
            .shutdown_timeout(config.shutdown_timeout())
            .console()
            .template(config.console.template.as_str())
            .done();

        if config.wants_queue() {
            let mut queue = builder
                .file_queue()
                .template(config.queue.template.as_str())
                .capacity(config.queue.capacity);
            for (key, path) in &config.queue.files {
                queue = queue.file(key.as_str(), path.as_str());
            }
            builder = queue.done();
        }

        if config.wants_mutex() {
            let mut mutex = builder
                .file_mutex()
                .template(config.mutex.template.as_str());
            for (key, path) in &config.mutex.files {
                mutex = mutex.file(key.as_str(), path.as_str());
            }
            builder = mutex.done();
        }

        for (package, routes) in &config.packages {
            let mut installer = builder.package(package.as_str());
            for route in routes {
                installer = install(installer, package, route)?;
            }
            builder = installer.done();
        }

        builder.build()
    }
}

fn install(
    installer: super::PackageBuilder,
    package: &str,
    route: &RouteConfig,
) -> Result<super::PackageBuilder, Error> {
    let target: Target = route.sink.parse()?;
    let dispatch = if route.detached {
        Dispatch::Detached
    } else {
        Dispatch::Inline
    };
    internal::debug(
        "LOGGER",
        &format!("Route {package} -> {target} ({dispatch:?})"),
    );

    let path = route.path.as_deref().unwrap_or_default();
    if target != Target::Console && path.is_empty() {
        let message = format!("{target} route for '{package}' needs a path");
        return Err(Error::InvalidSelector(message));
    }
    Ok(match target {
        Target::Console => installer.console(dispatch),
        Target::FileQueue => installer.file_queue(dispatch, path),
        Target::FileMutex => installer.file_mutex(dispatch, path),
    })
}
