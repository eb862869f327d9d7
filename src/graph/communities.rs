//! Community detection.
//!
//! Communities are connected components: for each node not yet assigned,
//! `reachable_set(n) ∪ {n}` forms its component. A component is identified by
//! its lexicographically smallest member, so the assignment does not depend on
//! visitation order and repeated runs on an unchanged scope agree.
//!
//! Above the reachability limit the per-node variable-length traversals get
//! too expensive and detection falls back to grouping nodes by the first
//! character of their id (A–E, F–J, K–O, P–T, everything else).

use crate::neo4j::GraphStore;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::error::AnalyticsResult;
use super::models::{CommunityMethod, CommunityResult, ComponentInfo};

/// Detect communities of a scope.
pub async fn detect_communities(
    store: &dyn GraphStore,
    scope: &str,
    reachability_limit: usize,
) -> AnalyticsResult<CommunityResult> {
    let nodes = store.all_nodes(scope).await?;
    detect_communities_over(store, scope, &nodes, reachability_limit).await
}

/// Detect communities among `nodes`, already listed from the scope.
pub async fn detect_communities_over(
    store: &dyn GraphStore,
    scope: &str,
    nodes: &[String],
    reachability_limit: usize,
) -> AnalyticsResult<CommunityResult> {
    let mut result = if nodes.len() > reachability_limit {
        tracing::warn!(
            "Graph '{}' has {} nodes (limit {}), using initial-letter grouping",
            scope,
            nodes.len(),
            reachability_limit
        );
        fallback_communities(nodes)
    } else {
        let mut assigned: HashSet<String> = HashSet::with_capacity(nodes.len());
        let mut groups: Vec<BTreeSet<String>> = Vec::new();

        for node_id in nodes {
            if assigned.contains(node_id) {
                continue;
            }
            let mut members: BTreeSet<String> =
                store.reachable_set(node_id, scope).await?.into_iter().collect();
            members.insert(node_id.clone());

            assigned.extend(members.iter().cloned());
            groups.push(members);
        }
        build_result(CommunityMethod::Reachability, groups)
    };

    if !nodes.is_empty() {
        result.labels = store
            .node_labels(scope)
            .await?
            .into_iter()
            .filter(|(id, _)| result.assignments.contains_key(id))
            .collect();
    }
    Ok(result)
}

/// Deterministic grouping that needs no traversal at all.
pub fn fallback_communities(nodes: &[String]) -> CommunityResult {
    let mut buckets: BTreeMap<u8, BTreeSet<String>> = BTreeMap::new();
    for node_id in nodes {
        buckets
            .entry(initial_bucket(node_id))
            .or_default()
            .insert(node_id.clone());
    }
    build_result(
        CommunityMethod::InitialLetterFallback,
        buckets.into_values().collect(),
    )
}

/// Bucket of a node id keyed on its first character (case-insensitive).
fn initial_bucket(node_id: &str) -> u8 {
    match node_id.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('A'..='E') => 0,
        Some('F'..='J') => 1,
        Some('K'..='O') => 2,
        Some('P'..='T') => 3,
        _ => 4,
    }
}

/// Name each group after its smallest member and rank by size desc, id asc.
fn build_result(method: CommunityMethod, groups: Vec<BTreeSet<String>>) -> CommunityResult {
    let mut assignments = BTreeMap::new();
    let mut components: Vec<ComponentInfo> = groups
        .into_iter()
        .filter_map(|members| {
            let id = members.iter().next()?.clone();
            for member in &members {
                assignments.insert(member.clone(), id.clone());
            }
            Some(ComponentInfo {
                id,
                size: members.len(),
                members: members.into_iter().collect(),
            })
        })
        .collect();

    components.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.id.cmp(&b.id)));

    CommunityResult {
        method,
        assignments,
        labels: BTreeMap::new(),
        components,
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

    #[tokio::test]
    async fn test_path_graph_single_component() {
        let store = seeded_store("g", &path_abc()).await;
        let result = detect_communities(&store, "g", 100).await.unwrap();

        assert_eq!(result.method, CommunityMethod::Reachability);
        assert_eq!(result.community_count(), 1);
        assert_eq!(result.components[0].id, "A");
        assert_eq!(result.components[0].size, 3);
        assert!(result.assignments.values().all(|c| c == "A"));
    }

    #[tokio::test]
    async fn test_isolated_pair_two_singletons() {
        let store = seeded_store("pair", &isolated_pair()).await;
        let result = detect_communities(&store, "pair", 100).await.unwrap();

        assert_eq!(result.community_count(), 2);
        assert_eq!(result.assignments["X"], "X");
        assert_eq!(result.assignments["Y"], "Y");
        assert_eq!(result.largest_size(), Some(1));
    }

    #[tokio::test]
    async fn test_components_ranked_and_partition_nodes() {
        let store = seeded_store("g", &two_components_and_singleton()).await;
        let result = detect_communities(&store, "g", 100).await.unwrap();

        let ranked: Vec<(&str, usize)> = result
            .components
            .iter()
            .map(|c| (c.id.as_str(), c.size))
            .collect();
        assert_eq!(ranked, vec![("a", 3), ("x", 2), ("q", 1)]);

        // Each node in exactly one component
        let total: usize = result.components.iter().map(|c| c.size).sum();
        assert_eq!(total, 6);
        assert_eq!(result.assignments.len(), 6);
        for component in &result.components {
            for member in &component.members {
                assert_eq!(result.assignments[member], component.id);
            }
        }
        assert_eq!(result.mean_size(), Some(2.0));
    }

    #[tokio::test]
    async fn test_detection_is_deterministic() {
        let store = seeded_store("sample", &WorkingGraph::sample()).await;
        let first = detect_communities(&store, "sample", 100).await.unwrap();
        let second = detect_communities(&store, "sample", 100).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.community_count(), 1);
        assert_eq!(first.components[0].id, "ai");
    }

    #[tokio::test]
    async fn test_membership_carries_labels() {
        let store = seeded_store("g", &two_components_and_singleton()).await;
        let result = detect_communities(&store, "g", 100).await.unwrap();
        assert_eq!(result.labels.len(), 6);
        assert_eq!(result.label_of("x"), "X");

        let fallback = detect_communities(&store, "g", 3).await.unwrap();
        assert_eq!(fallback.label_of("q"), "Q");
    }

    #[tokio::test]
    async fn test_empty_scope() {
        let store = MemoryGraphStore::new();
        let result = detect_communities(&store, "none", 100).await.unwrap();
        assert!(result.components.is_empty());
        assert!(result.assignments.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_above_limit() {
        let store = seeded_store("g", &two_components_and_singleton()).await;
        let result = detect_communities(&store, "g", 3).await.unwrap();

        assert_eq!(result.method, CommunityMethod::InitialLetterFallback);
        // a, b, c → A–E; q → P–T; x, y → other
        let ranked: Vec<(&str, usize)> = result
            .components
            .iter()
            .map(|c| (c.id.as_str(), c.size))
            .collect();
        assert_eq!(ranked, vec![("a", 3), ("x", 2), ("q", 1)]);
    }

    #[test]
    fn test_initial_bucket() {
        assert_eq!(initial_bucket("apple"), 0);
        assert_eq!(initial_bucket("Gamma"), 1);
        assert_eq!(initial_bucket("ml"), 2);
        assert_eq!(initial_bucket("Tech"), 3);
        assert_eq!(initial_bucket("zeta"), 4);
        assert_eq!(initial_bucket("42"), 4);
        assert_eq!(initial_bucket(""), 4);
    }
}
