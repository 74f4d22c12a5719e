//! Global constants for the artifact-collector application.
//!
//! This module centralizes the definition format vocabulary so the closed
//! key set, the platform-independent type tags and the label vocabulary
//! live in one place.

/// Source type tag for query-engine backed sources.
pub const TYPE_INDICATOR_QUERY: &str = "engine-query";

/// Source type tag for file glob sources.
pub const TYPE_INDICATOR_FILE: &str = "file";

/// Source type tag for artifact group sources.
pub const TYPE_INDICATOR_ARTIFACT_GROUP: &str = "artifact-group";

/// Result type tag attached to file source output.
pub const FILE_INFORMATION: &str = "file_information";

/// The closed set of keys allowed at the top level of an artifact definition.
pub const TOP_LEVEL_KEYS: &[&str] = &[
    "name",
    "doc",
    "labels",
    "sources",
    "supported_os",
    "conditions",
    "returned_types",
    "provides",
    "urls",
];

/// Known label vocabulary. Definitions may carry labels outside this set;
/// those are kept but recorded as undefined for strict coverage checks.
pub const LABELS: &[&str] = &[
    "Antivirus",
    "Authentication",
    "Browser",
    "Cloud",
    "Cloud Storage",
    "Configuration Files",
    "Execution",
    "External Media",
    "KnowledgeBase",
    "Logs",
    "Memory",
    "Network",
    "Processes",
    "Software",
    "System",
    "Users",
];
