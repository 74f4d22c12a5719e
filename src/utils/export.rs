//! Machine-readable collection summaries.

use anyhow::{Context, Result};
use serde_json::json;
use uuid::Uuid;

use crate::models::ArtifactResult;

/// Render the JSON summary of one collection run.
///
/// Carries a unique collection id and host metadata alongside the full
/// export shape of every artifact result, so downstream tooling can
/// reconstruct the run losslessly.
pub fn create_collection_summary(
    hostname: &str,
    timestamp: &str,
    requested_artifacts: &[String],
    results: &[ArtifactResult],
) -> Result<String> {
    let summary = json!({
        "collection_id": Uuid::new_v4().to_string(),
        "hostname": hostname,
        "collection_timestamp": timestamp,
        "requested_artifacts": requested_artifacts,
        "result_count": results.len(),
        "results": results,
    });

    serde_json::to_string_pretty(&summary).context("Failed to serialize collection summary")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnSpec, ColumnType};
    use crate::schema::RawMap;
    use serde_json::Value;

    #[test]
    fn summary_embeds_results_in_export_shape() {
        let mut result = ArtifactResult::new(
            "X",
            "file_information",
            vec![ColumnSpec { name: "filename".into(), kind: ColumnType::Text }],
        );
        let mut row = RawMap::new();
        row.insert("filename".into(), Value::String("/etc/hosts".into()));
        result.add_result(row);

        let summary = create_collection_summary(
            "workstation-01",
            "2024-01-15T14:30:52Z",
            &["X".to_string()],
            &[result.clone()],
        )
        .unwrap();

        let parsed: Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(parsed["hostname"], "workstation-01");
        assert_eq!(parsed["result_count"], 1);
        assert!(!parsed["collection_id"].as_str().unwrap().is_empty());

        let embedded: ArtifactResult =
            serde_json::from_value(parsed["results"][0].clone()).unwrap();
        assert_eq!(embedded, result);
    }
}
