// Re-export all items from the submodules
mod collector;

pub use collector::{Collector, RowStream};
