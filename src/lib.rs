//! # artifact-collector
//!
//! A cross-platform validator and collector for declarative forensic
//! artifact definitions.
//!
//! ## Overview
//!
//! Artifact definitions are small YAML documents describing what data to
//! collect from a machine: file globs, query results, or groups of other
//! artifacts. This crate validates those definitions into strongly-typed
//! objects, stores them in a registry, and executes them against pluggable
//! collection capabilities, producing a deduplicated, OS-filtered, lazily
//! evaluated stream of uniformly-shaped result records.
//!
//! ## Features
//!
//! - **Schema-driven validation**: every definition and source is checked
//!   against a declarative field table, with defaults, kind checks and
//!   cross-field derivation handled by one generic routine
//! - **Best-effort loading**: one malformed definition never aborts a bulk
//!   load; it is logged and skipped
//! - **Recursive artifact groups**: group sources expand other artifacts,
//!   with revisit guards that also neutralize reference cycles
//! - **Platform gating**: definitions and individual sources are filtered
//!   against the target platform at two nesting levels
//! - **Pluggable capabilities**: query execution, filesystem globbing and
//!   condition evaluation are injected traits with usable defaults
//! - **Lossless export**: every result bundle serializes to a canonical
//!   machine-readable shape
//!
//! ## Usage
//!
//! ```no_run
//! use artifact_collector::capabilities::Capabilities;
//! use artifact_collector::collectors::Collector;
//! use artifact_collector::definitions::Registry;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut registry = Registry::new();
//! registry.load_yaml_file(std::path::Path::new("definitions.yaml"))?;
//!
//! let collector = Collector::new(registry, None, Capabilities::default())?;
//! let names = vec!["BrowserHistory".to_string()];
//! for row in collector.collect(&names) {
//!     println!("{:?}", row?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`schema`]: The generic field-schema validator
//! - [`definitions`]: Platforms, sources, artifact definitions, registry
//! - [`collectors`]: The traversal engine producing the result stream
//! - [`capabilities`]: Injected collection capabilities and their defaults
//! - [`models`]: Result shapes and the canonical export representation
//! - [`errors`]: The error taxonomy
//! - [`utils`]: Collection summary export
//! - [`constants`]: Definition format vocabulary

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Injected collection capabilities and their default implementations
pub mod capabilities;

/// The traversal engine executing artifacts against capabilities
pub mod collectors;

/// Definition format vocabulary and enumerated sets
pub mod constants;

/// Platforms, source variants, artifact definitions and the registry
pub mod definitions;

/// Error taxonomy for validation, loading and collection
pub mod errors;

/// Result shapes produced by collection runs
pub mod models;

/// Generic field-schema validation
pub mod schema;

/// Collection summary export
pub mod utils;
