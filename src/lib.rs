//! Photomosaic build orchestration around a replaceable background worker
//!
//! A [`selection::SelectionState`] collects the master image, the tile pool and
//! the grid options. The [`orchestrator::Orchestrator`] validates it, sends an
//! immutable request to a worker thread running an [`engine::Engine`], and
//! turns the reply into a [`orchestrator::BuildResult`]. Engine errors keep the
//! worker; worker crashes replace it.

#![forbid(unsafe_code)]

/// Mosaic engine boundary and the built-in photomosaic engine
pub mod engine;
/// Grid geometry, aspect locking and output sizing
pub mod geometry;
/// Input/output operations, configuration, logging and error handling
pub mod io;
/// Build state machine and worker recovery
pub mod orchestrator;
/// Blueprint layout for rendering front ends
pub mod presentation;
/// Request and reply messages exchanged with the worker
pub mod protocol;
/// User images and build options
pub mod selection;
/// Worker thread lifecycle
pub mod worker;

pub use io::error::{BuildError, EngineError, MosaicError, Result};
