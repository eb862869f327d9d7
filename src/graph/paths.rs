//! Path analysis: point-to-point shortest paths and whole-scope path statistics.

use crate::neo4j::GraphStore;

use super::error::{AnalyticsError, AnalyticsResult};
use super::models::{PathOutcome, PathSummary, ShortestPath};

/// Shortest undirected path between two nodes of a scope.
///
/// Unknown ids fail with `NotFound`; identical ids give the one-node path;
/// disconnected nodes give `PathOutcome::NoPath`.
pub async fn shortest_path(
    store: &dyn GraphStore,
    scope: &str,
    source: &str,
    target: &str,
) -> AnalyticsResult<ShortestPath> {
    for node_id in [source, target] {
        if !store.node_exists(node_id, scope).await? {
            return Err(AnalyticsError::NotFound {
                node_id: node_id.to_string(),
                scope: scope.to_string(),
            });
        }
    }

    let outcome = if source == target {
        PathOutcome::Found {
            nodes: vec![source.to_string()],
            edges: vec![],
        }
    } else {
        match store.shortest_path(source, target, scope).await? {
            Some(path) => PathOutcome::Found {
                nodes: path.nodes,
                edges: path.edges,
            },
            None => PathOutcome::NoPath,
        }
    };

    Ok(ShortestPath {
        source: source.to_string(),
        target: target.to_string(),
        outcome,
    })
}

/// Path statistics over every unordered pair `a < b` of the scope.
///
/// Pairs in different components are counted in `total_pairs` only.
pub async fn path_summary(store: &dyn GraphStore, scope: &str) -> AnalyticsResult<PathSummary> {
    let nodes = store.all_nodes(scope).await?;
    path_summary_over(store, scope, &nodes).await
}

/// Path statistics over the pairs of `nodes`, already listed from the scope.
pub async fn path_summary_over(
    store: &dyn GraphStore,
    scope: &str,
    nodes: &[String],
) -> AnalyticsResult<PathSummary> {
    let node_count = nodes.len();
    let total_pairs = node_count * node_count.saturating_sub(1) / 2;

    let mut lengths: Vec<usize> = Vec::new();
    for a in nodes {
        // reachable_set is sorted, and only partners after `a` are counted
        for b in store.reachable_set(a, scope).await? {
            if b.as_str() <= a.as_str() {
                continue;
            }
            if let Some(path) = store.shortest_path(a, &b, scope).await? {
                lengths.push(path.hops());
            }
        }
    }

    let connected_pairs = lengths.len();
    let avg_path_length = if connected_pairs > 0 {
        Some(lengths.iter().sum::<usize>() as f64 / connected_pairs as f64)
    } else {
        None
    };
    let density = if total_pairs > 0 {
        connected_pairs as f64 / total_pairs as f64
    } else {
        0.0
    };

    Ok(PathSummary {
        node_count,
        total_pairs,
        connected_pairs,
        avg_path_length,
        min_path_length: lengths.iter().copied().min(),
        max_path_length: lengths.iter().copied().max(),
        density,
    })
}

// ============================================================================
// Tests
// ============================================================================
