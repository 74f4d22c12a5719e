//! Capability interfaces the collector consumes.
//!
//! The traversal engine never talks to a query engine or the filesystem
//! directly; it goes through these narrow traits. The bundled defaults make
//! the standalone binary usable, and tests inject fakes.

mod conditions;
mod filesystem;
mod query;

pub use conditions::AlwaysTrue;
pub use filesystem::LocalFileSystem;
pub use query::NullQueryExecutor;

use anyhow::Result;
use serde_json::Value;

use crate::schema::RawMap;

/// Rows produced by a query-execution capability.
pub type QueryRows = Box<dyn Iterator<Item = RawMap>>;

/// Executes engine queries on behalf of query sources.
pub trait QueryExecutor {
    fn execute(&self, query: &str, parameters: &[Value]) -> Result<QueryRows>;
}

/// Descriptive record for one file matched by a glob capability.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub st_mode: String,
    pub st_nlink: u64,
    pub st_uid: String,
    pub st_gid: String,
    pub st_size: u64,
    pub st_mtime: String,
    pub filename: String,
}

impl FileEntry {
    /// Row shape consumed by file sources.
    pub fn into_row(self) -> RawMap {
        let mut row = RawMap::new();
        row.insert("st_mode".into(), Value::String(self.st_mode));
        row.insert("st_nlink".into(), Value::from(self.st_nlink));
        row.insert("st_uid".into(), Value::String(self.st_uid));
        row.insert("st_gid".into(), Value::String(self.st_gid));
        row.insert("st_size".into(), Value::from(self.st_size));
        row.insert("st_mtime".into(), Value::String(self.st_mtime));
        row.insert("filename".into(), Value::String(self.filename));
        row
    }
}

/// Expands path patterns into matched file records.
pub trait FileGlobber {
    fn glob(&self, paths: &[String]) -> Result<Box<dyn Iterator<Item = FileEntry>>>;
}

/// Evaluates per-artifact conditional predicates.
///
/// No predicate language ships with this crate; the default [`AlwaysTrue`]
/// evaluator accepts every artifact. Hosts with an expression engine inject
/// their own implementation here.
pub trait ConditionEvaluator {
    fn evaluate(&self, conditions: &[Value]) -> bool;
}

/// Capability handles one collector instance works with.
pub struct Capabilities {
    pub query: Box<dyn QueryExecutor>,
    pub filesystem: Box<dyn FileGlobber>,
    pub conditions: Box<dyn ConditionEvaluator>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            query: Box::new(NullQueryExecutor),
            filesystem: Box::new(LocalFileSystem),
            conditions: Box::new(AlwaysTrue),
        }
    }
}
