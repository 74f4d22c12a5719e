//! The traversal engine: expands artifact names into a lazy result stream.

use std::cell::RefCell;
use std::collections::HashSet;
use std::iter;

use log::debug;

use crate::capabilities::Capabilities;
use crate::definitions::{Platform, Registry};
use crate::errors::CollectError;
use crate::models::OutputRow;

/// Lazy stream of output rows; nothing runs until the consumer pulls, and a
/// consumer that stops pulling stops all further work.
pub type RowStream<'a> = Box<dyn Iterator<Item = Result<OutputRow, CollectError>> + 'a>;

/// Executes artifact definitions against capability providers.
///
/// Each collector owns its registry snapshot and visited set, so concurrent
/// runs are independent by construction.
pub struct Collector {
    registry: Registry,
    platform: Platform,
    seen: RefCell<HashSet<String>>,
    capabilities: Capabilities,
}

impl Collector {
    /// Build a collector. With no explicit platform the host OS is probed;
    /// hosts outside the enumerated set fail with `EnvironmentUndetermined`.
    pub fn new(
        registry: Registry,
        platform: Option<Platform>,
        capabilities: Capabilities,
    ) -> Result<Self, CollectError> {
        let platform = match platform {
            Some(platform) => platform,
            None => Platform::current().ok_or(CollectError::EnvironmentUndetermined)?,
        };
        Ok(Collector {
            registry,
            platform,
            seen: RefCell::new(HashSet::new()),
            capabilities,
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Expand one artifact into its slice of the output stream.
    ///
    /// Re-entry on a name already visited in this run yields nothing; that
    /// guard is also what keeps group references acyclic, so a cycle is
    /// simply not re-expanded rather than reported.
    pub fn collect_artifact<'c>(&'c self, artifact_name: &str) -> RowStream<'c> {
        if !self.seen.borrow_mut().insert(artifact_name.to_string()) {
            return Box::new(iter::empty());
        }

        let definition = match self.registry.get(artifact_name) {
            Some(definition) => definition,
            None => {
                let missing = CollectError::NotFound(artifact_name.to_string());
                return Box::new(iter::once(Err(missing)));
            }
        };

        // This artifact is not for us.
        if !definition.supported_os.contains(&self.platform) {
            debug!(
                "Skipping artifact {}: supported OS {:?}, but we are {}",
                definition.name, definition.supported_os, self.platform
            );
            return Box::new(iter::empty());
        }

        if !self.capabilities.conditions.evaluate(&definition.conditions) {
            debug!("Skipping artifact {}: conditions not met", definition.name);
            return Box::new(iter::empty());
        }

        let divider = iter::once(Ok(OutputRow::Divider {
            divider: format!("Artifact: {}", definition.name),
        }));

        // A source that does not support the current platform ends processing
        // of this artifact's remaining sources as well, not just itself.
        let platform = self.platform;
        let gate_name = definition.name.clone();
        let apply_name = definition.name.clone();
        let rows = definition
            .sources
            .iter()
            .take_while(move |source| {
                let supported = source.supports(platform);
                if !supported {
                    debug!(
                        "Skipping artifact {}: source does not support {}",
                        gate_name, platform
                    );
                }
                supported
            })
            .flat_map(move |source| source.apply(&apply_name, self));

        Box::new(divider.chain(rows))
    }

    /// Collect several artifacts in request order with a fresh visited set.
    pub fn collect<'c>(&'c self, artifact_names: &'c [String]) -> RowStream<'c> {
        self.seen.borrow_mut().clear();
        Box::new(
            artifact_names
                .iter()
                .flat_map(move |name| self.collect_artifact(name)),
        )
    }
}
