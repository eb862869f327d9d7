//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;
use std::collections::HashMap;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    // ========================================================================
    // Analytics primitives
    // ========================================================================

    async fn count_degree(&self, node_id: &str, scope: &str) -> anyhow::Result<u64> {
        self.count_degree(node_id, scope).await
    }

    async fn count_pattern_matches(
        &self,
        pattern: &PathPattern,
        scope: &str,
    ) -> anyhow::Result<u64> {
        self.count_pattern_matches(pattern, scope).await
    }

    async fn average_path_length(
        &self,
        node_id: &str,
        scope: &str,
    ) -> anyhow::Result<Option<f64>> {
        self.average_path_length(node_id, scope).await
    }

    async fn reachable_set(&self, node_id: &str, scope: &str) -> anyhow::Result<Vec<String>> {
        self.reachable_set(node_id, scope).await
    }

    async fn all_nodes(&self, scope: &str) -> anyhow::Result<Vec<String>> {
        self.all_nodes(scope).await
    }

    async fn node_labels(&self, scope: &str) -> anyhow::Result<HashMap<String, String>> {
        self.node_labels(scope).await
    }

    async fn shortest_path(
        &self,
        source_id: &str,
        target_id: &str,
        scope: &str,
    ) -> anyhow::Result<Option<GraphPath>> {
        self.shortest_path(source_id, target_id, scope).await
    }

    async fn node_exists(&self, node_id: &str, scope: &str) -> anyhow::Result<bool> {
        self.node_exists(node_id, scope).await
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    async fn save_graph(
        &self,
        name: &str,
        description: &str,
        graph: &WorkingGraph,
    ) -> anyhow::Result<GraphMeta> {
        self.save_graph(name, description, graph).await
    }

    async fn list_graphs(&self) -> anyhow::Result<Vec<GraphMeta>> {
        self.list_graphs().await
    }

    async fn load_graph(&self, name: &str) -> anyhow::Result<Option<GraphSnapshot>> {
        self.load_graph(name).await
    }
}
