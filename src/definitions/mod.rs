// Re-export all items from the submodules
mod artifact;
mod defaults;
mod platform;
mod registry;
mod source;

pub use artifact::ArtifactDefinition;
pub use defaults::STARTER_DEFINITIONS;
pub use platform::Platform;
pub use registry::{parse_documents, Registry};
pub use source::{FileSource, GroupSource, QuerySource, Source};
