// Re-export all items from the submodules
mod export;

pub use export::create_collection_summary;
