//! Test helper factories
//!
//! Small graph shapes with known analytics, and a helper seeding them into an
//! in-memory store.
#![allow(dead_code)]

use crate::neo4j::{GraphStore, KgEdge, KgNode, MemoryGraphStore, WorkingGraph};

/// Build a working graph from node ids and undirected `(a, b)` pairs.
pub fn graph_of(nodes: &[&str], edges: &[(&str, &str)]) -> WorkingGraph {
    let mut g = WorkingGraph::new();
    for id in nodes {
        g.upsert_node(KgNode::new(*id, id.to_uppercase(), "#97C2FC"));
    }
    for (source, target) in edges {
        g.add_edge(KgEdge::new(*source, *target, "related_to"));
    }
    g
}

/// A – B – C
pub fn path_abc() -> WorkingGraph {
    graph_of(&["A", "B", "C"], &[("A", "B"), ("B", "C")])
}

/// X, Y with no relationship
pub fn isolated_pair() -> WorkingGraph {
    graph_of(&["X", "Y"], &[])
}

/// Complete graph K_n over ids `n0 .. n{n-1}`
pub fn complete_graph(n: usize) -> WorkingGraph {
    let ids: Vec<String> = (0..n).map(|i| format!("n{}", i)).collect();
    let mut g = WorkingGraph::new();
    for id in &ids {
        g.upsert_node(KgNode::new(id.clone(), id.clone(), ""));
    }
    for i in 0..n {
        for j in (i + 1)..n {
            g.add_edge(KgEdge::new(ids[i].clone(), ids[j].clone(), "linked"));
        }
    }
    g
}

/// `center` connected to `leaf_0 .. leaf_{n-1}`
pub fn star_graph(n_leaves: usize) -> WorkingGraph {
    let mut g = WorkingGraph::new();
    g.upsert_node(KgNode::new("center", "Center", ""));
    for i in 0..n_leaves {
        let id = format!("leaf_{}", i);
        g.upsert_node(KgNode::new(id.clone(), id.clone(), ""));
        g.add_edge(KgEdge::new("center", id, "has"));
    }
    g
}

/// Two disconnected pieces: a–b–c and x–y, plus the isolated node `q`
pub fn two_components_and_singleton() -> WorkingGraph {
    graph_of(
        &["a", "b", "c", "x", "y", "q"],
        &[("a", "b"), ("b", "c"), ("x", "y")],
    )
}

/// Seed an in-memory store with one graph under `name`.
pub async fn seeded_store(name: &str, graph: &WorkingGraph) -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    store
        .save_graph(name, "test graph", graph)
        .await
        .expect("seed graph");
    store
}
