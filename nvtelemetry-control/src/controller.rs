use nvtelemetry_core::{Catalog, ServiceDirectory, TaskDirectory};

use crate::sink::LogSink;

/// Discovery and transition entry point.
///
/// Holds the adapters and the log sink it reports through; the operations
/// themselves live in [`crate::discovery`] and [`crate::transition`].
pub struct Controller<'a> {
    pub(crate) tasks: &'a dyn TaskDirectory,
    pub(crate) services: &'a dyn ServiceDirectory,
    pub(crate) sink: &'a dyn LogSink,
    pub(crate) catalog: Catalog,
}

impl<'a> Controller<'a> {
    /// Controller over the built-in NVIDIA catalog.
    pub fn new(
        tasks: &'a dyn TaskDirectory,
        services: &'a dyn ServiceDirectory,
        sink: &'a dyn LogSink,
    ) -> Self {
        Self {
            tasks,
            services,
            sink,
            catalog: Catalog::nvidia(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
