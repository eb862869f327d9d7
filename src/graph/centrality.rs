//! Centrality measures computed through store queries.
//!
//! - **Degree**: distinct incident relationships per node.
//! - **Betweenness (approximation)**: number of 2-hop paths `a–n–b` with `n`
//!   in the middle. Both traversal directions count, so each unordered pair of
//!   distinct neighbours contributes 2. This is a local proxy, not Brandes
//!   betweenness: it ignores every path longer than two hops.
//! - **Closeness (approximation)**: `1 / mean distance` to the peers a node
//!   can reach; 0 for nodes that reach nothing. Disconnected peers are left
//!   out of the mean instead of counting as infinitely far.
//!
//! Every result list is sorted by score descending, then node id ascending.

use crate::neo4j::{GraphStore, PathPattern};
use std::collections::HashMap;

use super::error::AnalyticsResult;
use super::models::{rank_scores, CentralityRow, NodeScore};

/// Degree of every node in the scope.
pub async fn degree_centrality(
    store: &dyn GraphStore,
    scope: &str,
) -> AnalyticsResult<Vec<NodeScore<u64>>> {
    let nodes = store.all_nodes(scope).await?;
    degree_centrality_over(store, scope, &nodes).await
}

/// Degree of each of `nodes`, already listed from the scope.
pub async fn degree_centrality_over(
    store: &dyn GraphStore,
    scope: &str,
    nodes: &[String],
) -> AnalyticsResult<Vec<NodeScore<u64>>> {
    let mut scores = Vec::with_capacity(nodes.len());
    for node_id in nodes {
        let degree = store.count_degree(node_id, scope).await?;
        scores.push(NodeScore::new(node_id.clone(), degree));
    }
    rank_scores(&mut scores);
    Ok(scores)
}

/// Two-hop betweenness approximation of every node in the scope.
pub async fn betweenness_centrality(
    store: &dyn GraphStore,
    scope: &str,
) -> AnalyticsResult<Vec<NodeScore<u64>>> {
    let nodes = store.all_nodes(scope).await?;
    betweenness_centrality_over(store, scope, &nodes).await
}

pub async fn betweenness_centrality_over(
    store: &dyn GraphStore,
    scope: &str,
    nodes: &[String],
) -> AnalyticsResult<Vec<NodeScore<u64>>> {
    let mut scores = Vec::with_capacity(nodes.len());
    for node_id in nodes {
        let pattern = PathPattern::TwoHopThrough(node_id.clone());
        let matches = store.count_pattern_matches(&pattern, scope).await?;
        scores.push(NodeScore::new(node_id.clone(), matches));
    }
    rank_scores(&mut scores);
    Ok(scores)
}

/// Mean-distance closeness approximation of every node in the scope.
pub async fn closeness_centrality(
    store: &dyn GraphStore,
    scope: &str,
) -> AnalyticsResult<Vec<NodeScore<f64>>> {
    let nodes = store.all_nodes(scope).await?;
    closeness_centrality_over(store, scope, &nodes).await
}

pub async fn closeness_centrality_over(
    store: &dyn GraphStore,
    scope: &str,
    nodes: &[String],
) -> AnalyticsResult<Vec<NodeScore<f64>>> {
    let mut scores = Vec::with_capacity(nodes.len());
    for node_id in nodes {
        let avg_distance = store.average_path_length(node_id, scope).await?;
        scores.push(NodeScore::new(node_id.clone(), closeness_from(avg_distance)));
    }
    rank_scores(&mut scores);
    Ok(scores)
}

/// All three scores per node with its label, in degree order.
pub async fn centrality_overview(
    store: &dyn GraphStore,
    scope: &str,
) -> AnalyticsResult<Vec<CentralityRow>> {
    let nodes = store.all_nodes(scope).await?;
    centrality_overview_over(store, scope, &nodes).await
}

pub async fn centrality_overview_over(
    store: &dyn GraphStore,
    scope: &str,
    nodes: &[String],
) -> AnalyticsResult<Vec<CentralityRow>> {
    let degree = degree_centrality_over(store, scope, nodes).await?;
    let betweenness: HashMap<String, u64> = betweenness_centrality_over(store, scope, nodes)
        .await?
        .into_iter()
        .map(|s| (s.node_id, s.score))
        .collect();
    let closeness: HashMap<String, f64> = closeness_centrality_over(store, scope, nodes)
        .await?
        .into_iter()
        .map(|s| (s.node_id, s.score))
        .collect();
    let mut labels = store.node_labels(scope).await?;

    Ok(degree
        .into_iter()
        .map(|d| CentralityRow {
            label: labels
                .remove(&d.node_id)
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| d.node_id.clone()),
            betweenness: betweenness.get(&d.node_id).copied().unwrap_or(0),
            closeness: closeness.get(&d.node_id).copied().unwrap_or(0.0),
            degree: d.score,
            node_id: d.node_id,
        })
        .collect())
}

/// Reciprocal of the mean distance; 0 when there is nothing to average.
fn closeness_from(avg_distance: Option<f64>) -> f64 {
    match avg_distance {
        Some(avg) if avg > 0.0 && avg.is_finite() => 1.0 / avg,
        _ => 0.0,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neo4j::{MemoryGraphStore, WorkingGraph};
    use crate::test_helpers::*;

    fn as_map<T: Copy>(scores: &[NodeScore<T>]) -> HashMap<&str, T> {
        scores.iter().map(|s| (s.node_id.as_str(), s.score)).collect()
    }

    #[tokio::test]
    async fn test_degree_path_graph() {
        let store = seeded_store("g", &path_abc()).await;
        let degree = degree_centrality(&store, "g").await.unwrap();

        let order: Vec<&str> = degree.iter().map(|s| s.node_id.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        let map = as_map(&degree);
        assert_eq!(map["A"], 1);
        assert_eq!(map["B"], 2);
        assert_eq!(map["C"], 1);
    }

    #[tokio::test]
    async fn test_degree_sum_is_twice_edge_count() {
        let graph = WorkingGraph::sample();
        let store = seeded_store("sample", &graph).await;
        let degree = degree_centrality(&store, "sample").await.unwrap();

        let total: u64 = degree.iter().map(|s| s.score).sum();
        assert_eq!(total, 2 * graph.edge_count() as u64);
        assert_eq!(degree[0].node_id, "ai");
    }

    #[tokio::test]
    async fn test_betweenness_star_center() {
        let store = seeded_store("star", &star_graph(5)).await;
        let bc = betweenness_centrality(&store, "star").await.unwrap();

        // 5 leaves → 5 * 4 ordered leaf pairs through the center
        assert_eq!(bc[0].node_id, "center");
        assert_eq!(bc[0].score, 20);
        assert!(bc[1..].iter().all(|s| s.score == 0));
    }

    #[tokio::test]
    async fn test_betweenness_triangle_counts_adjacent_endpoints() {
        let triangle = graph_of(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let store = seeded_store("tri", &triangle).await;
        let bc = betweenness_centrality(&store, "tri").await.unwrap();
        assert!(bc.iter().all(|s| s.score == 2));
        let order: Vec<&str> = bc.iter().map(|s| s.node_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_closeness_path_graph() {
        let store = seeded_store("g", &path_abc()).await;
        let cc = closeness_centrality(&store, "g").await.unwrap();

        let map = as_map(&cc);
        assert!((map["B"] - 1.0).abs() < 1e-9);
        assert!((map["A"] - 1.0 / 1.5).abs() < 1e-9);
        assert_eq!(cc[0].node_id, "B");
    }

    #[tokio::test]
    async fn test_closeness_isolated_nodes_are_zero() {
        let store = seeded_store("pair", &isolated_pair()).await;
        let cc = closeness_centrality(&store, "pair").await.unwrap();
        assert_eq!(cc.len(), 2);
        assert!(cc.iter().all(|s| s.score == 0.0));
    }

    #[tokio::test]
    async fn test_empty_scope_yields_empty_lists() {
        let store = MemoryGraphStore::new();
        assert!(degree_centrality(&store, "nothing").await.unwrap().is_empty());
        assert!(betweenness_centrality(&store, "nothing").await.unwrap().is_empty());
        assert!(closeness_centrality(&store, "nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_node_scores_zero() {
        let store = seeded_store("solo", &graph_of(&["only"], &[])).await;
        let overview = centrality_overview(&store, "solo").await.unwrap();
        assert_eq!(
            overview,
            vec![CentralityRow {
                node_id: "only".into(),
                label: "ONLY".into(),
                degree: 0,
                betweenness: 0,
                closeness: 0.0,
            }]
        );
    }

    #[tokio::test]
    async fn test_overview_follows_degree_order() {
        let store = seeded_store("g", &path_abc()).await;
        let overview = centrality_overview(&store, "g").await.unwrap();

        assert_eq!(overview.len(), 3);
        assert_eq!(overview[0].node_id, "B");
        assert_eq!(overview[0].betweenness, 2);
        assert_eq!(overview[1].node_id, "A");
        assert_eq!(overview[1].betweenness, 0);
    }

    #[tokio::test]
    async fn test_overview_carries_labels() {
        let store = seeded_store("vehicle", &WorkingGraph::vehicle_lifecycle()).await;
        let overview = centrality_overview(&store, "vehicle").await.unwrap();

        assert_eq!(overview.len(), 30);
        assert_eq!(overview[0].node_id, "vehicle");
        assert_eq!(overview[0].label, "Vehicle");
        assert_eq!(overview[0].degree, 9);
        assert!(overview.iter().all(|r| !r.label.is_empty()));
    }

    #[tokio::test]
    async fn test_unlabelled_node_falls_back_to_id() {
        let mut g = WorkingGraph::new();
        g.upsert_node(crate::neo4j::KgNode::new("bare", "", ""));
        let store = seeded_store("g", &g).await;
        let overview = centrality_overview(&store, "g").await.unwrap();
        assert_eq!(overview[0].label, "bare");
    }

    #[tokio::test]
    async fn test_over_variants_only_score_given_nodes() {
        let store = seeded_store("g", &path_abc()).await;
        let nodes = vec!["A".to_string(), "B".to_string()];
        let degree = degree_centrality_over(&store, "g", &nodes).await.unwrap();
        let order: Vec<&str> = degree.iter().map(|s| s.node_id.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_closeness_from_sentinels() {
        assert_eq!(closeness_from(None), 0.0);
        assert_eq!(closeness_from(Some(0.0)), 0.0);
        assert_eq!(closeness_from(Some(-1.0)), 0.0);
        assert_eq!(closeness_from(Some(2.0)), 0.5);
    }
}
