//! Neo4j client for scoped knowledge graphs
//!
//! Every query filters nodes *and* relationships on `graph_name`, so a
//! traversal can never leak into another scope even if a stray cross-scope
//! relationship were present.

use super::models::*;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use neo4rs::{query, Graph, Query};
use std::collections::HashMap;
use std::sync::Arc;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        // Initialize schema
        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize indexes used by the scoped lookups
    async fn init_schema(&self) -> Result<()> {
        let statements = [
            "CREATE INDEX kg_node_scope IF NOT EXISTS FOR (n:KGNode) ON (n.graph_name)",
            "CREATE INDEX kg_node_scope_id IF NOT EXISTS FOR (n:KGNode) ON (n.graph_name, n.id)",
            "CREATE INDEX graph_meta_name IF NOT EXISTS FOR (m:GraphMeta) ON (m.name)",
        ];

        for statement in statements {
            if let Err(e) = self.graph.run(query(statement)).await {
                tracing::warn!("Failed to create index: {} ({})", statement, e);
            }
        }

        Ok(())
    }

    /// Execute a parameterized Cypher query and collect every row (internal use only)
    pub(crate) async fn execute_with_params(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a query expected to return a single row
    async fn execute_single(&self, q: Query) -> Result<Option<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        Ok(result.next().await?)
    }

    // ========================================================================
    // Analytics primitives
    // ========================================================================

    /// Count distinct relationships incident to a node (undirected)
    pub async fn count_degree(&self, node_id: &str, scope: &str) -> Result<u64> {
        let q = query(
            r#"
            MATCH (n:KGNode {id: $id, graph_name: $scope})
            OPTIONAL MATCH (n)-[r:RELATED {graph_name: $scope}]-(:KGNode {graph_name: $scope})
            RETURN count(DISTINCT r) AS degree
            "#,
        )
        .param("id", node_id)
        .param("scope", scope);

        match self.execute_single(q).await? {
            Some(row) => Ok(row.get::<i64>("degree")?.max(0) as u64),
            None => Ok(0),
        }
    }

    /// Count matches of a typed traversal pattern
    pub async fn count_pattern_matches(&self, pattern: &PathPattern, scope: &str) -> Result<u64> {
        let q = match pattern {
            // Relationship uniqueness within one MATCH path keeps r1 and r2 distinct.
            PathPattern::TwoHopThrough(node_id) => query(
                r#"
                MATCH (a:KGNode {graph_name: $scope})-[r1:RELATED {graph_name: $scope}]-
                      (n:KGNode {id: $id, graph_name: $scope})
                      -[r2:RELATED {graph_name: $scope}]-(b:KGNode {graph_name: $scope})
                WHERE a <> b AND a <> n AND b <> n
                RETURN count(*) AS matches
                "#,
            )
            .param("id", node_id.as_str())
            .param("scope", scope),
        };

        match self.execute_single(q).await? {
            Some(row) => Ok(row.get::<i64>("matches")?.max(0) as u64),
            None => Ok(0),
        }
    }

    /// Average shortest-path hop count to every reachable peer
    pub async fn average_path_length(&self, node_id: &str, scope: &str) -> Result<Option<f64>> {
        let q = query(
            r#"
            MATCH (n:KGNode {id: $id, graph_name: $scope})
            MATCH (other:KGNode {graph_name: $scope})
            WHERE other <> n
            MATCH p = shortestPath((n)-[:RELATED*]-(other))
            WHERE all(r IN relationships(p) WHERE r.graph_name = $scope)
            RETURN avg(length(p)) AS avg_distance
            "#,
        )
        .param("id", node_id)
        .param("scope", scope);

        // avg() over zero rows yields a null
        match self.execute_single(q).await? {
            Some(row) => Ok(row.get::<Option<f64>>("avg_distance")?),
            None => Ok(None),
        }
    }

    /// All nodes reachable from `node_id` through any number of hops, found
    /// with one shortestPath per candidate peer
    pub async fn reachable_set(&self, node_id: &str, scope: &str) -> Result<Vec<String>> {
        let q = query(
            r#"
            MATCH (n:KGNode {id: $id, graph_name: $scope})
            MATCH (other:KGNode {graph_name: $scope})
            WHERE other <> n
            MATCH p = shortestPath((n)-[:RELATED*]-(other))
            WHERE all(r IN relationships(p) WHERE r.graph_name = $scope)
            RETURN other.id AS id
            ORDER BY id
            "#,
        )
        .param("id", node_id)
        .param("scope", scope);

        let rows = self.execute_with_params(q).await?;
        rows.iter()
            .map(|row| row.get::<String>("id").map_err(Into::into))
            .collect()
    }

    /// All node ids in the scope, lexicographically ordered
    pub async fn all_nodes(&self, scope: &str) -> Result<Vec<String>> {
        let q = query(
            r#"
            MATCH (n:KGNode {graph_name: $scope})
            RETURN n.id AS id
            ORDER BY id
            "#,
        )
        .param("scope", scope);

        let rows = self.execute_with_params(q).await?;
        rows.iter()
            .map(|row| row.get::<String>("id").map_err(Into::into))
            .collect()
    }

    /// Display labels of every node in the scope
    pub async fn node_labels(&self, scope: &str) -> Result<HashMap<String, String>> {
        let q = query(
            r#"
            MATCH (n:KGNode {graph_name: $scope})
            RETURN n.id AS id, coalesce(n.label, n.id) AS label
            "#,
        )
        .param("scope", scope);

        let rows = self.execute_with_params(q).await?;
        rows.iter()
            .map(|row| Ok((row.get::<String>("id")?, row.get::<String>("label")?)))
            .collect()
    }

    /// One shortest undirected path between two nodes
    pub async fn shortest_path(
        &self,
        source_id: &str,
        target_id: &str,
        scope: &str,
    ) -> Result<Option<GraphPath>> {
        // shortestPath() refuses identical endpoints
        if source_id == target_id {
            return Ok(self
                .node_exists(source_id, scope)
                .await?
                .then(|| GraphPath::single(source_id)));
        }

        let q = query(
            r#"
            MATCH (s:KGNode {id: $source, graph_name: $scope})
            MATCH (t:KGNode {id: $target, graph_name: $scope})
            MATCH p = shortestPath((s)-[:RELATED*]-(t))
            WHERE all(r IN relationships(p) WHERE r.graph_name = $scope)
            RETURN [x IN nodes(p) | x.id] AS path_nodes,
                   [r IN relationships(p) | coalesce(r.label, '')] AS path_edges
            "#,
        )
        .param("source", source_id)
        .param("target", target_id)
        .param("scope", scope);

        match self.execute_single(q).await? {
            Some(row) => Ok(Some(GraphPath {
                nodes: row.get::<Vec<String>>("path_nodes")?,
                edges: row.get::<Vec<String>>("path_edges")?,
            })),
            None => Ok(None),
        }
    }

    /// Check node membership in a scope
    pub async fn node_exists(&self, node_id: &str, scope: &str) -> Result<bool> {
        let q = query(
            r#"
            MATCH (n:KGNode {id: $id, graph_name: $scope})
            RETURN count(n) AS found
            "#,
        )
        .param("id", node_id)
        .param("scope", scope);

        match self.execute_single(q).await? {
            Some(row) => Ok(row.get::<i64>("found")? > 0),
            None => Ok(false),
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Replace a scope with a working graph, in one transaction
    pub async fn save_graph(
        &self,
        name: &str,
        description: &str,
        graph: &WorkingGraph,
    ) -> Result<GraphMeta> {
        graph.validate(name)?;

        let meta = GraphMeta {
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
        };

        let mut queries: Vec<Query> = Vec::with_capacity(3 + graph.nodes.len() + graph.edges.len());

        queries.push(
            query("MATCH (n:KGNode {graph_name: $name}) DETACH DELETE n").param("name", name),
        );
        queries.push(query("MATCH (m:GraphMeta {name: $name}) DELETE m").param("name", name));
        queries.push(
            query(
                r#"
                CREATE (meta:GraphMeta {
                    name: $name,
                    description: $description,
                    created_date: $created_date,
                    node_count: $node_count,
                    edge_count: $edge_count
                })
                "#,
            )
            .param("name", name)
            .param("description", description)
            .param("created_date", meta.created_at.to_rfc3339())
            .param("node_count", meta.node_count as i64)
            .param("edge_count", meta.edge_count as i64),
        );

        for node in &graph.nodes {
            queries.push(
                query(
                    r#"
                    CREATE (n:KGNode {
                        id: $id,
                        label: $label,
                        color: $color,
                        graph_name: $graph_name
                    })
                    "#,
                )
                .param("id", node.id.as_str())
                .param("label", node.label.as_str())
                .param("color", node.color.as_str())
                .param("graph_name", name),
            );
        }

        for edge in &graph.edges {
            queries.push(
                query(
                    r#"
                    MATCH (source:KGNode {id: $source_id, graph_name: $graph_name})
                    MATCH (target:KGNode {id: $target_id, graph_name: $graph_name})
                    CREATE (source)-[:RELATED {label: $label, graph_name: $graph_name}]->(target)
                    "#,
                )
                .param("source_id", edge.source.as_str())
                .param("target_id", edge.target.as_str())
                .param("label", edge.label.as_str())
                .param("graph_name", name),
            );
        }

        let mut txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to open save transaction")?;
        txn.run_queries(queries)
            .await
            .with_context(|| format!("Failed to write graph '{}'", name))?;
        txn.commit().await?;

        tracing::info!(
            "Saved graph '{}' ({} nodes, {} edges)",
            name,
            meta.node_count,
            meta.edge_count
        );

        Ok(meta)
    }

    /// List saved graph metadata, newest first
    pub async fn list_graphs(&self) -> Result<Vec<GraphMeta>> {
        let q = query(
            r#"
            MATCH (meta:GraphMeta)
            RETURN meta.name AS name, meta.description AS description,
                   meta.created_date AS created_date, meta.node_count AS node_count,
                   meta.edge_count AS edge_count
            ORDER BY meta.created_date DESC
            "#,
        );

        let rows = self.execute_with_params(q).await?;
        rows.iter().map(row_to_graph_meta).collect()
    }

    /// Load nodes, relationships and metadata of a saved scope
    pub async fn load_graph(&self, name: &str) -> Result<Option<GraphSnapshot>> {
        let meta_q = query(
            r#"
            MATCH (meta:GraphMeta {name: $name})
            RETURN meta.name AS name, meta.description AS description,
                   meta.created_date AS created_date, meta.node_count AS node_count,
                   meta.edge_count AS edge_count
            "#,
        )
        .param("name", name);
        let meta = match self.execute_single(meta_q).await? {
            Some(row) => Some(row_to_graph_meta(&row)?),
            None => None,
        };

        let nodes_q = query(
            r#"
            MATCH (n:KGNode {graph_name: $name})
            RETURN n.id AS id, n.label AS label, n.color AS color
            ORDER BY id
            "#,
        )
        .param("name", name);
        let nodes = self
            .execute_with_params(nodes_q)
            .await?
            .iter()
            .map(|row| {
                Ok(KgNode {
                    id: row.get("id")?,
                    label: row.get::<String>("label").unwrap_or_default(),
                    color: row.get::<String>("color").unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if meta.is_none() && nodes.is_empty() {
            return Ok(None);
        }

        let edges_q = query(
            r#"
            MATCH (source:KGNode {graph_name: $name})-[r:RELATED {graph_name: $name}]->(target:KGNode {graph_name: $name})
            RETURN source.id AS source, target.id AS target, r.label AS label
            ORDER BY source, target, label
            "#,
        )
        .param("name", name);
        let edges = self
            .execute_with_params(edges_q)
            .await?
            .iter()
            .map(|row| {
                Ok(KgEdge {
                    source: row.get("source")?,
                    target: row.get("target")?,
                    label: row.get::<String>("label").unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(GraphSnapshot { meta, nodes, edges }))
    }
}

fn row_to_graph_meta(row: &neo4rs::Row) -> Result<GraphMeta> {
    let created_date: String = row.get("created_date")?;
    let created_at = DateTime::parse_from_rfc3339(&created_date)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid created_date '{}'", created_date))?;

    Ok(GraphMeta {
        name: row.get("name")?,
        description: row.get::<String>("description").unwrap_or_default(),
        created_at,
        node_count: row.get::<i64>("node_count").unwrap_or(0).max(0) as usize,
        edge_count: row.get::<i64>("edge_count").unwrap_or(0).max(0) as usize,
    })
}
