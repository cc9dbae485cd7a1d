//! Backend selection by path.
//!
//! The registry is an ordered list of backends scanned linearly. The first
//! backend whose probe accepts a path wins, so registration order breaks
//! ties between formats that claim the same files.
//!
//! ```ignore
//! use gridio::core::{FormatRegistry, ResolveHint};
//!
//! let registry = FormatRegistry::with_defaults().with(MyFormat::default());
//! let backend = registry.resolve("scan.vtk", ResolveHint::Read)?;
//! let info = backend.read_image_information("scan.vtk".as_ref())?;
//! ```

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use super::FormatBackend;
use crate::util::{Error, Result};
use crate::vtk::VtkImageIO;

static GLOBAL: OnceLock<FormatRegistry> = OnceLock::new();

/// Which capability probe decides whether a backend claims a path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolveHint {
    /// The file exists and will be read: use `can_read`
    #[default]
    Read,
    /// The file will be written: use `can_write`
    Write,
    /// Either probe may accept
    Any,
}

/// Ordered collection of format backends.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    backends: Vec<Arc<dyn FormatBackend>>,
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(VtkImageIO::default());
        registry
    }

    /// Append a backend. Earlier registrations take precedence.
    pub fn register(&mut self, backend: impl FormatBackend + 'static) -> &mut Self {
        self.register_shared(Arc::new(backend))
    }

    /// Append an already shared backend.
    pub fn register_shared(&mut self, backend: Arc<dyn FormatBackend>) -> &mut Self {
        trace!(backend = backend.name(), position = self.backends.len(), "registering format backend");
        self.backends.push(backend);
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, backend: impl FormatBackend + 'static) -> Self {
        self.register(backend);
        self
    }

    /// Registered backends, in registration order.
    pub fn backends(&self) -> &[Arc<dyn FormatBackend>] {
        &self.backends
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Return the first backend whose probe accepts `path`.
    pub fn resolve(&self, path: impl AsRef<Path>, hint: ResolveHint) -> Result<Arc<dyn FormatBackend>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyPath);
        }
        for backend in &self.backends {
            let accepted = match hint {
                ResolveHint::Read => backend.can_read(path),
                ResolveHint::Write => backend.can_write(path),
                ResolveHint::Any => backend.can_write(path) || backend.can_read(path),
            };
            trace!(backend = backend.name(), path = %path.display(), ?hint, accepted, "probed backend");
            if accepted {
                return Ok(Arc::clone(backend));
            }
        }
        Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }

    /// Process-wide registry.
    ///
    /// Initialised with [`with_defaults`](Self::with_defaults) on first use
    /// unless [`install`](Self::install) ran earlier. It is never mutated
    /// afterwards, so readers need no locking.
    pub fn global() -> &'static FormatRegistry {
        GLOBAL.get_or_init(Self::with_defaults)
    }

    /// Make `registry` the process-wide registry.
    ///
    /// Must run during initialisation, before the first call to
    /// [`global`](Self::global); otherwise the registry is handed back.
    pub fn install(registry: FormatRegistry) -> std::result::Result<(), FormatRegistry> {
        GLOBAL.set(registry)
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.backends.iter().map(|b| b.name()))
            .finish()
    }
}
