//! Graph analytics data models.
//!
//! ## Output types (analytics)
//! - [`NodeScore`]: one node with one metric value (degree, betweenness, closeness)
//! - [`CentralityRow`]: all three centrality scores for one node
//! - [`ComponentInfo`] / [`CommunityResult`]: community detection output
//! - [`ShortestPath`] / [`PathOutcome`]: point-to-point path query
//! - [`PathSummary`]: aggregate path statistics for a whole scope
//!
//! ## Configuration
//! - [`AnalyticsConfig`]: resource bounds for the analytics engine

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Duration;

// ============================================================================
// Centrality
// ============================================================================

/// A metric value attached to one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeScore<T> {
    pub node_id: String,
    pub score: T,
}

impl<T> NodeScore<T> {
    pub fn new(node_id: impl Into<String>, score: T) -> Self {
        Self {
            node_id: node_id.into(),
            score,
        }
    }
}

/// Sort scores descending, ties broken by node id ascending.
pub fn rank_scores<T: PartialOrd>(scores: &mut [NodeScore<T>]) {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
}

/// Combined centrality scores for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityRow {
    pub node_id: String,
    /// Display label, falls back to the id
    pub label: String,
    /// Number of incident relationships
    pub degree: u64,
    /// Count of 2-hop paths with this node in the middle (approximation)
    pub betweenness: u64,
    /// Reciprocal of the mean distance to reachable peers (approximation)
    pub closeness: f64,
}

// ============================================================================
// Communities
// ============================================================================

/// How a community assignment was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityMethod {
    /// Connected components found through reachability queries
    Reachability,
    /// Buckets keyed on the first character of the node id, used above the
    /// reachability limit
    InitialLetterFallback,
}

/// One community (connected component or fallback bucket).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Lexicographically smallest member id
    pub id: String,
    pub size: usize,
    /// Member ids, sorted
    pub members: Vec<String>,
}

/// Output of community detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityResult {
    pub method: CommunityMethod,
    /// node id → community id
    pub assignments: BTreeMap<String, String>,
    /// node id → display label
    pub labels: BTreeMap<String, String>,
    /// Ranked by size descending, then id ascending
    pub components: Vec<ComponentInfo>,
}

impl CommunityResult {
    pub fn community_count(&self) -> usize {
        self.components.len()
    }

    /// Display label of a member, or its id when unlabelled.
    pub fn label_of<'a>(&'a self, node_id: &'a str) -> &'a str {
        self.labels
            .get(node_id)
            .map(String::as_str)
            .filter(|l| !l.is_empty())
            .unwrap_or(node_id)
    }

    pub fn largest_size(&self) -> Option<usize> {
        self.components.iter().map(|c| c.size).max()
    }

    /// Mean community size; `None` for an empty graph.
    pub fn mean_size(&self) -> Option<f64> {
        if self.components.is_empty() {
            return None;
        }
        Some(self.assignments.len() as f64 / self.components.len() as f64)
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Outcome of a point-to-point path query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathOutcome {
    /// Node ids from source to target, both included, and the labels of
    /// the relationships between them
    Found {
        nodes: Vec<String>,
        edges: Vec<String>,
    },
    /// Both nodes exist but are not connected
    NoPath,
}

/// A shortest path between two named nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortestPath {
    pub source: String,
    pub target: String,
    pub outcome: PathOutcome,
}

impl ShortestPath {
    /// Number of hops, `None` when there is no path.
    pub fn hops(&self) -> Option<usize> {
        match &self.outcome {
            PathOutcome::Found { edges, .. } => Some(edges.len()),
            PathOutcome::NoPath => None,
        }
    }
}

/// Shortest-path statistics over all unordered node pairs of a scope.
///
/// Averages and extremes cover connected pairs only and are `None` when no
/// pair is connected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSummary {
    pub node_count: usize,
    pub total_pairs: usize,
    pub connected_pairs: usize,
    pub avg_path_length: Option<f64>,
    pub min_path_length: Option<usize>,
    pub max_path_length: Option<usize>,
    /// connected_pairs / total_pairs, 0 with fewer than 2 nodes
    pub density: f64,
}

// ============================================================================
// Configuration
// ============================================================================

/// Resource bounds for analytics calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Largest scope (in nodes) the whole-graph analyses will run on
    pub max_nodes: usize,
    /// Above this many nodes, community detection uses the fallback grouping
    pub community_reachability_limit: usize,
    /// Wall-clock limit for one analysis call
    pub timeout_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_nodes: 1000,
            community_reachability_limit: 1000,
            timeout_secs: 30,
        }
    }
}

impl AnalyticsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_scores_ties_by_id() {
        let mut scores = vec![
            NodeScore::new("c", 1u64),
            NodeScore::new("a", 1u64),
            NodeScore::new("b", 3u64),
        ];
        rank_scores(&mut scores);
        let order: Vec<&str> = scores.iter().map(|s| s.node_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_shortest_path_hops() {
        let trivial = ShortestPath {
            source: "a".into(),
            target: "a".into(),
            outcome: PathOutcome::Found {
                nodes: vec!["a".into()],
                edges: vec![],
            },
        };
        assert_eq!(trivial.hops(), Some(0));

        let two = ShortestPath {
            source: "a".into(),
            target: "c".into(),
            outcome: PathOutcome::Found {
                nodes: vec!["a".into(), "b".into(), "c".into()],
                edges: vec!["knows".into(), "likes".into()],
            },
        };
        assert_eq!(two.hops(), Some(2));

        let none = ShortestPath {
            source: "a".into(),
            target: "b".into(),
            outcome: PathOutcome::NoPath,
        };
        assert_eq!(none.hops(), None);
    }

    #[test]
    fn test_community_stats_on_empty_result() {
        let result = CommunityResult {
            method: CommunityMethod::Reachability,
            assignments: BTreeMap::new(),
            labels: BTreeMap::new(),
            components: vec![],
        };
        assert_eq!(result.community_count(), 0);
        assert_eq!(result.largest_size(), None);
        assert_eq!(result.mean_size(), None);
    }

    #[test]
    fn test_label_of_falls_back_to_id() {
        let result = CommunityResult {
            method: CommunityMethod::Reachability,
            assignments: BTreeMap::from([("a".into(), "a".into()), ("b".into(), "a".into())]),
            labels: BTreeMap::from([("a".into(), "Alpha".into()), ("b".into(), String::new())]),
            components: vec![],
        };
        assert_eq!(result.label_of("a"), "Alpha");
        assert_eq!(result.label_of("b"), "b");
        assert_eq!(result.label_of("z"), "z");
    }
}
