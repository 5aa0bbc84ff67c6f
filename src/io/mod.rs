/// Command-line parsing and the file-driven build runner
pub mod cli;
/// Defaults, limits and file naming constants
pub mod configuration;
/// Error types for validation, the engine boundary and file operations
pub mod error;
/// Image file input and artifact output
pub mod image;
/// Tracing subscriber setup
pub mod logging;
/// Terminal spinner for in-flight builds
pub mod progress;
