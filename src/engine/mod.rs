//! Mosaic computation behind the worker boundary
//!
//! The orchestrator only sees the [`Engine`] and [`EngineFactory`] traits.
//! One engine instance lives inside each worker and is discarded with it.

/// Palette transfer and equalization
pub mod color;
/// Image decoding, fitting and rendering helpers
pub mod imaging;
/// Cell-to-tile distance metrics
pub mod metrics;
/// Built-in engine implementation
pub mod photomosaic;
/// Assignment solvers
pub mod solvers;

use crate::io::error::EngineError;
use crate::protocol::{BuildRequest, EngineOutput};

pub use photomosaic::{PhotomosaicEngine, PhotomosaicFactory};

/// A computation engine that turns one request into a mosaic
pub trait Engine {
    /// Build the mosaic for a request
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be fulfilled. The engine must
    /// remain usable for later requests after returning an error.
    fn build(&mut self, request: &BuildRequest) -> Result<EngineOutput, EngineError>;
}

/// Creates a fresh engine inside each newly spawned worker
pub trait EngineFactory: Send + Sync + 'static {
    /// Construct and initialize an engine
    ///
    /// # Errors
    ///
    /// Returns an error if initialization fails; the worker reports this as a
    /// structural fault
    fn create(&self) -> Result<Box<dyn Engine>, EngineError>;
}

impl<F> EngineFactory for F
where
    F: Fn() -> Result<Box<dyn Engine>, EngineError> + Send + Sync + 'static,
{
    fn create(&self) -> Result<Box<dyn Engine>, EngineError> {
        self()
    }
}
