//! Graph store: Neo4j client, in-memory store and the shared models

pub mod client;
mod impl_graph_store;
pub mod memory;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use memory::MemoryGraphStore;
pub use models::*;
pub use traits::GraphStore;
