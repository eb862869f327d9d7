//! In-memory implementation of GraphStore.
//!
//! Each saved scope is held as its own `petgraph` undirected graph, so scope
//! isolation is structural: a traversal simply has nothing outside its scope
//! to walk into. Used by the test suites and by the CLI's `--in-memory` mode.

use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

// ============================================================================
// ScopedGraph: petgraph wrapper with ID mapping
// ============================================================================

/// Undirected graph of one scope with `id ↔ NodeIndex` mapping.
#[derive(Debug, Clone, Default)]
pub struct ScopedGraph {
    pub graph: UnGraph<KgNode, String>,
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl ScopedGraph {
    /// Build from a validated working graph.
    pub fn from_working(working: &WorkingGraph) -> Self {
        let mut graph = UnGraph::with_capacity(working.node_count(), working.edge_count());
        let mut id_to_index = HashMap::with_capacity(working.node_count());

        for node in &working.nodes {
            let idx = graph.add_node(node.clone());
            id_to_index.insert(node.id.clone(), idx);
        }
        for edge in &working.edges {
            if let (Some(&s), Some(&t)) = (id_to_index.get(&edge.source), id_to_index.get(&edge.target))
            {
                graph.add_edge(s, t, edge.label.clone());
            }
        }

        Self { graph, id_to_index }
    }

    pub fn get_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    fn id_of(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].id
    }

    /// Incident edges of `idx` as `(edge id, other endpoint)`, each edge once.
    fn incident(&self, idx: NodeIndex) -> Vec<(usize, NodeIndex)> {
        let mut seen = HashSet::new();
        self.graph
            .edges(idx)
            .filter(|e| seen.insert(e.id()))
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (e.id().index(), other)
            })
            .collect()
    }

    /// Hop distance to every node reachable from `idx`, including `idx` itself at 0.
    fn distances_from(&self, idx: NodeIndex) -> HashMap<NodeIndex, usize> {
        petgraph::algo::dijkstra(&self.graph, idx, None, |_| 1usize)
    }

    fn to_snapshot(&self, meta: &GraphMeta) -> GraphSnapshot {
        let mut nodes: Vec<KgNode> = self.graph.node_weights().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<KgEdge> = self
            .graph
            .edge_references()
            .map(|e| KgEdge {
                source: self.id_of(e.source()).to_string(),
                target: self.id_of(e.target()).to_string(),
                label: e.weight().clone(),
            })
            .collect();
        edges.sort_by(|a, b| {
            (&a.source, &a.target, &a.label).cmp(&(&b.source, &b.target, &b.label))
        });

        GraphSnapshot {
            meta: Some(meta.clone()),
            nodes,
            edges,
        }
    }
}

struct StoredGraph {
    meta: GraphMeta,
    graph: ScopedGraph,
}

// ============================================================================
// MemoryGraphStore
// ============================================================================

/// In-memory GraphStore keyed by scope name.
#[derive(Default)]
pub struct MemoryGraphStore {
    scopes: RwLock<HashMap<String, StoredGraph>>,
}

impl MemoryGraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn count_degree(&self, node_id: &str, scope: &str) -> Result<u64> {
        let scopes = self.scopes.read().await;
        let degree = scopes
            .get(scope)
            .and_then(|s| s.graph.get_index(node_id).map(|idx| s.graph.incident(idx).len()))
            .unwrap_or(0);
        Ok(degree as u64)
    }

    async fn count_pattern_matches(&self, pattern: &PathPattern, scope: &str) -> Result<u64> {
        let scopes = self.scopes.read().await;
        let Some(stored) = scopes.get(scope) else {
            return Ok(0);
        };

        match pattern {
            PathPattern::TwoHopThrough(node_id) => {
                let Some(n) = stored.graph.get_index(node_id) else {
                    return Ok(0);
                };
                let incident = stored.graph.incident(n);
                let mut matches = 0u64;
                for (e1, a) in &incident {
                    for (e2, b) in &incident {
                        if e1 != e2 && a != b && *a != n && *b != n {
                            matches += 1;
                        }
                    }
                }
                Ok(matches)
            }
        }
    }

    async fn average_path_length(&self, node_id: &str, scope: &str) -> Result<Option<f64>> {
        let scopes = self.scopes.read().await;
        let Some(stored) = scopes.get(scope) else {
            return Ok(None);
        };
        let Some(idx) = stored.graph.get_index(node_id) else {
            return Ok(None);
        };

        let distances: Vec<usize> = stored
            .graph
            .distances_from(idx)
            .into_iter()
            .filter(|(other, _)| *other != idx)
            .map(|(_, d)| d)
            .collect();

        if distances.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            distances.iter().sum::<usize>() as f64 / distances.len() as f64,
        ))
    }

    async fn reachable_set(&self, node_id: &str, scope: &str) -> Result<Vec<String>> {
        let scopes = self.scopes.read().await;
        let Some(stored) = scopes.get(scope) else {
            return Ok(vec![]);
        };
        let Some(start) = stored.graph.get_index(node_id) else {
            return Ok(vec![]);
        };

        let g = &stored.graph.graph;
        let mut bfs = Bfs::new(g, start);
        let mut reached = Vec::new();
        while let Some(idx) = bfs.next(g) {
            if idx != start {
                reached.push(stored.graph.id_of(idx).to_string());
            }
        }
        reached.sort();
        Ok(reached)
    }

    async fn all_nodes(&self, scope: &str) -> Result<Vec<String>> {
        let scopes = self.scopes.read().await;
        let mut ids: Vec<String> = scopes
            .get(scope)
            .map(|s| s.graph.id_to_index.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    async fn node_labels(&self, scope: &str) -> Result<HashMap<String, String>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .get(scope)
            .map(|s| {
                s.graph
                    .graph
                    .node_weights()
                    .map(|n| (n.id.clone(), n.label.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn shortest_path(
        &self,
        source_id: &str,
        target_id: &str,
        scope: &str,
    ) -> Result<Option<GraphPath>> {
        let scopes = self.scopes.read().await;
        let Some(stored) = scopes.get(scope) else {
            return Ok(None);
        };
        let (Some(s), Some(t)) = (
            stored.graph.get_index(source_id),
            stored.graph.get_index(target_id),
        ) else {
            return Ok(None);
        };

        let g = &stored.graph.graph;
        let Some((_, indices)) = petgraph::algo::astar(g, s, |n| n == t, |_| 1usize, |_| 0) else {
            return Ok(None);
        };

        // Parallel relationships: any one of them labels the hop
        let edges = indices
            .windows(2)
            .filter_map(|pair| g.find_edge(pair[0], pair[1]))
            .map(|e| g[e].clone())
            .collect();
        let nodes = indices
            .iter()
            .map(|&idx| stored.graph.id_of(idx).to_string())
            .collect();

        Ok(Some(GraphPath { nodes, edges }))
    }

    async fn node_exists(&self, node_id: &str, scope: &str) -> Result<bool> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .get(scope)
            .is_some_and(|s| s.graph.id_to_index.contains_key(node_id)))
    }

    async fn save_graph(
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

        self.scopes.write().await.insert(
            name.to_string(),
            StoredGraph {
                meta: meta.clone(),
                graph: ScopedGraph::from_working(graph),
            },
        );
        tracing::debug!(
            "Saved graph '{}' in memory ({} nodes, {} edges)",
            name,
            meta.node_count,
            meta.edge_count
        );

        Ok(meta)
    }

    async fn list_graphs(&self) -> Result<Vec<GraphMeta>> {
        let scopes = self.scopes.read().await;
        let mut metas: Vec<GraphMeta> = scopes.values().map(|s| s.meta.clone()).collect();
        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(metas)
    }

    async fn load_graph(&self, name: &str) -> Result<Option<GraphSnapshot>> {
        let scopes = self.scopes.read().await;
        Ok(scopes.get(name).map(|s| s.graph.to_snapshot(&s.meta)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> WorkingGraph {
        let mut g = WorkingGraph::new();
        for id in ["A", "B", "C"] {
            g.upsert_node(KgNode::new(id, id, "#ccc"));
        }
        g.add_edge(KgEdge::new("A", "B", "knows"));
        g.add_edge(KgEdge::new("B", "C", "knows"));
        g
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let store = MemoryGraphStore::new();
        store.save_graph("one", "", &path_graph()).await.unwrap();

        let mut other = WorkingGraph::new();
        other.upsert_node(KgNode::new("A", "A elsewhere", ""));
        store.save_graph("two", "", &other).await.unwrap();

        assert_eq!(store.count_degree("A", "one").await.unwrap(), 1);
        assert_eq!(store.count_degree("A", "two").await.unwrap(), 0);
        assert!(store.reachable_set("A", "two").await.unwrap().is_empty());
        assert!(!store.node_exists("B", "two").await.unwrap());
        assert_eq!(store.all_nodes("missing").await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_two_hop_counts_both_directions() {
        let store = MemoryGraphStore::new();
        store.save_graph("g", "", &path_graph()).await.unwrap();

        let middle = PathPattern::TwoHopThrough("B".into());
        let end = PathPattern::TwoHopThrough("A".into());
        assert_eq!(store.count_pattern_matches(&middle, "g").await.unwrap(), 2);
        assert_eq!(store.count_pattern_matches(&end, "g").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_parallel_edges_are_distinct_relationships() {
        let store = MemoryGraphStore::new();
        let mut g = path_graph();
        g.add_edge(KgEdge::new("B", "A", "knows_back"));
        store.save_graph("g", "", &g).await.unwrap();

        assert_eq!(store.count_degree("A", "g").await.unwrap(), 2);
        assert_eq!(store.count_degree("B", "g").await.unwrap(), 3);
        // a-B-b with a = A through either of two edges, b = C: 2 paths each way
        let middle = PathPattern::TwoHopThrough("B".into());
        assert_eq!(store.count_pattern_matches(&middle, "g").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_average_path_length() {
        let store = MemoryGraphStore::new();
        store.save_graph("g", "", &path_graph()).await.unwrap();

        assert_eq!(store.average_path_length("B", "g").await.unwrap(), Some(1.0));
        assert_eq!(store.average_path_length("A", "g").await.unwrap(), Some(1.5));
        assert_eq!(store.average_path_length("Z", "g").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_shortest_path_and_unreachable() {
        let store = MemoryGraphStore::new();
        let mut g = path_graph();
        g.upsert_node(KgNode::new("D", "D", ""));
        store.save_graph("g", "", &g).await.unwrap();

        let path = store.shortest_path("C", "A", "g").await.unwrap().unwrap();
        assert_eq!(path.nodes, vec!["C", "B", "A"]);
        assert_eq!(path.edges, vec!["knows", "knows"]);
        assert_eq!(store.shortest_path("A", "D", "g").await.unwrap(), None);
        assert_eq!(
            store.shortest_path("B", "B", "g").await.unwrap(),
            Some(GraphPath::single("B"))
        );
    }

    #[tokio::test]
    async fn test_shortest_path_carries_relationship_labels() {
        let store = MemoryGraphStore::new();
        let mut g = WorkingGraph::new();
        for id in ["car", "engine", "piston"] {
            g.upsert_node(KgNode::new(id, id, ""));
        }
        g.add_edge(KgEdge::new("car", "engine", "has_part"));
        g.add_edge(KgEdge::new("piston", "engine", "part_of"));
        store.save_graph("g", "", &g).await.unwrap();

        let path = store.shortest_path("car", "piston", "g").await.unwrap().unwrap();
        assert_eq!(path.nodes, vec!["car", "engine", "piston"]);
        assert_eq!(path.edges, vec!["has_part", "part_of"]);
        assert_eq!(path.hops(), 2);
    }

    #[tokio::test]
    async fn test_node_labels_are_scoped() {
        let store = MemoryGraphStore::new();
        store.save_graph("one", "", &path_graph()).await.unwrap();

        let mut other = WorkingGraph::new();
        other.upsert_node(KgNode::new("A", "A elsewhere", ""));
        store.save_graph("two", "", &other).await.unwrap();

        let labels = store.node_labels("two").await.unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels["A"], "A elsewhere");
        assert_eq!(store.node_labels("one").await.unwrap()["C"], "C");
        assert!(store.node_labels("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_self_loop() {
        let store = MemoryGraphStore::new();
        let mut g = path_graph();
        g.add_edge(KgEdge::new("B", "B", "self"));

        let err = store.save_graph("loop", "", &g).await.unwrap_err();
        assert!(err.to_string().contains("itself"));
        assert!(store.load_graph("loop").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_scope() {
        let store = MemoryGraphStore::new();
        store.save_graph("g", "first", &path_graph()).await.unwrap();

        let mut smaller = WorkingGraph::new();
        smaller.upsert_node(KgNode::new("Z", "Z", ""));
        store.save_graph("g", "second", &smaller).await.unwrap();

        assert_eq!(store.all_nodes("g").await.unwrap(), vec!["Z".to_string()]);
        let graphs = store.list_graphs().await.unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].description, "second");
        assert_eq!(graphs[0].node_count, 1);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_graph() {
        let store = MemoryGraphStore::new();
        let mut g = WorkingGraph::new();
        g.add_edge(KgEdge::new("x", "y", "r"));
        assert!(store.save_graph("bad", "", &g).await.is_err());
        assert!(store.load_graph("bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_graph_roundtrip_ordering() {
        let store = MemoryGraphStore::new();
        store
            .save_graph("sample", "demo", &WorkingGraph::sample())
            .await
            .unwrap();

        let snapshot = store.load_graph("sample").await.unwrap().unwrap();
        assert_eq!(snapshot.nodes.len(), 15);
        assert_eq!(snapshot.edges.len(), 20);
        assert_eq!(snapshot.nodes[0].id, "ai");
        assert_eq!(snapshot.meta.unwrap().description, "demo");
    }
}
