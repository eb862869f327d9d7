//! GraphStore trait definition
//!
//! Defines the abstract interface the analytics engine and the persistence
//! commands need from a graph database. Every read is scoped by a graph name:
//! an implementation must never let a traversal leave that scope.
//!
//! Implemented by `Neo4jClient` and by the in-memory `MemoryGraphStore`.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Abstract interface for scoped graph database operations.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Analytics primitives (read-only)
    // ========================================================================

    /// Number of distinct relationships touching `node_id`, in either direction.
    async fn count_degree(&self, node_id: &str, scope: &str) -> Result<u64>;

    /// Number of matches of a typed traversal pattern.
    async fn count_pattern_matches(&self, pattern: &PathPattern, scope: &str) -> Result<u64>;

    /// Mean shortest-path hop count from `node_id` to every peer it can reach.
    /// `None` when nothing is reachable.
    async fn average_path_length(&self, node_id: &str, scope: &str) -> Result<Option<f64>>;

    /// Every node reachable from `node_id` (excluding itself), sorted by id.
    async fn reachable_set(&self, node_id: &str, scope: &str) -> Result<Vec<String>>;

    /// All node ids of the scope, sorted lexicographically.
    async fn all_nodes(&self, scope: &str) -> Result<Vec<String>>;

    /// Display label of every node of the scope, keyed by id.
    async fn node_labels(&self, scope: &str) -> Result<HashMap<String, String>>;

    /// One shortest undirected path, with the relationship labels along it.
    /// `None` when the target cannot be reached.
    async fn shortest_path(
        &self,
        source_id: &str,
        target_id: &str,
        scope: &str,
    ) -> Result<Option<GraphPath>>;

    /// Whether `node_id` exists in the scope
    async fn node_exists(&self, node_id: &str, scope: &str) -> Result<bool>;

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Replace the scope `name` with the contents of `graph`.
    ///
    /// Prior nodes, relationships and metadata of that scope are removed first;
    /// the graph is validated before anything is written.
    async fn save_graph(&self, name: &str, description: &str, graph: &WorkingGraph)
        -> Result<GraphMeta>;

    /// Metadata of every saved graph, newest first
    async fn list_graphs(&self) -> Result<Vec<GraphMeta>>;

    /// Read a saved scope back. `None` if nothing was ever saved under `name`.
    async fn load_graph(&self, name: &str) -> Result<Option<GraphSnapshot>>;
}
