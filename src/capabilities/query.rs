//! Default query capability.

use anyhow::{bail, Result};
use serde_json::Value;

use super::{QueryExecutor, QueryRows};

/// Placeholder executor that rejects every query.
///
/// The core ships no query engine; a definition with query sources can only
/// be collected once the host injects a real executor.
pub struct NullQueryExecutor;

impl QueryExecutor for NullQueryExecutor {
    fn execute(&self, query: &str, _parameters: &[Value]) -> Result<QueryRows> {
        bail!("no query engine attached, cannot execute {:?}", query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_every_query() {
        assert!(NullQueryExecutor.execute("select 1", &[]).is_err());
    }
}
