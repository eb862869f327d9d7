//! Analytics engine: the single entry point for callers.
//!
//! `AnalyticsEngine` wraps the centrality, community and path modules behind
//! one trait so the CLI (and any other consumer) can hold an
//! `Arc<dyn AnalyticsEngine>`. The concrete `GraphAnalyticsEngine` adds the
//! resource bounds from [`AnalyticsConfig`]:
//!
//! 1. **Size guard**: betweenness, closeness, the centrality overview and the
//!    path summary refuse scopes above `max_nodes`.
//! 2. **Time budget**: every call runs under `tokio::time::timeout`.
//!
//! Store failures pass through as `AnalyticsError::StoreUnavailable`.

use crate::neo4j::GraphStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use super::assembler::{self, AnalysisReport, ResultTable};
use super::centrality;
use super::communities;
use super::error::{AnalyticsError, AnalyticsResult};
use super::models::{
    AnalyticsConfig, CentralityRow, CommunityResult, NodeScore, PathSummary, ShortestPath,
};
use super::paths;

// ============================================================================
// Requests
// ============================================================================

/// One analysis a caller can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisRequest {
    Degree,
    Betweenness,
    Closeness,
    Centrality,
    Communities,
    ShortestPath { source: String, target: String },
    PathSummary,
}

impl AnalysisRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            AnalysisRequest::Degree => "degree_centrality",
            AnalysisRequest::Betweenness => "betweenness_centrality",
            AnalysisRequest::Closeness => "closeness_centrality",
            AnalysisRequest::Centrality => "centrality_overview",
            AnalysisRequest::Communities => "communities",
            AnalysisRequest::ShortestPath { .. } => "shortest_path",
            AnalysisRequest::PathSummary => "path_summary",
        }
    }
}

// ============================================================================
// Trait
// ============================================================================

/// Analytics engine trait.
///
/// Every method takes the graph scope to analyse. An empty scope is never an
/// error: the typed methods return empty results, and [`analyze`] returns a
/// report with `empty_graph` set and no tables.
///
/// [`analyze`]: AnalyticsEngine::analyze
#[async_trait]
pub trait AnalyticsEngine: Send + Sync {
    /// Degree per node, descending.
    async fn degree_centrality(&self, scope: &str) -> AnalyticsResult<Vec<NodeScore<u64>>>;

    /// Two-hop betweenness approximation per node, descending.
    async fn betweenness_centrality(&self, scope: &str) -> AnalyticsResult<Vec<NodeScore<u64>>>;

    /// Closeness approximation per node, descending.
    async fn closeness_centrality(&self, scope: &str) -> AnalyticsResult<Vec<NodeScore<f64>>>;

    /// All three centrality scores per node, in degree order.
    async fn centrality_overview(&self, scope: &str) -> AnalyticsResult<Vec<CentralityRow>>;

    async fn communities(&self, scope: &str) -> AnalyticsResult<CommunityResult>;

    async fn shortest_path(
        &self,
        scope: &str,
        source: &str,
        target: &str,
    ) -> AnalyticsResult<ShortestPath>;

    async fn path_summary(&self, scope: &str) -> AnalyticsResult<PathSummary>;

    /// Run one request and assemble its tables.
    async fn analyze(
        &self,
        scope: &str,
        request: &AnalysisRequest,
    ) -> AnalyticsResult<AnalysisReport>;
}

// ============================================================================
// Concrete implementation
// ============================================================================

/// Analytics engine backed by a `GraphStore`. Holds no mutable state.
pub struct GraphAnalyticsEngine {
    store: Arc<dyn GraphStore>,
    config: AnalyticsConfig,
}

impl GraphAnalyticsEngine {
    pub fn new(store: Arc<dyn GraphStore>, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Run `fut` under the configured time budget.
    async fn bounded<T, F>(&self, operation: &'static str, scope: &str, fut: F) -> AnalyticsResult<T>
    where
        F: Future<Output = AnalyticsResult<T>> + Send,
    {
        let limit = self.config.timeout();
        let started = std::time::Instant::now();
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => {
                tracing::debug!(
                    "{} on '{}' finished in {}ms",
                    operation,
                    scope,
                    started.elapsed().as_millis()
                );
                result
            }
            Err(_) => {
                tracing::warn!("{} on '{}' timed out after {:?}", operation, scope, limit);
                Err(AnalyticsError::Timeout {
                    operation,
                    scope: scope.to_string(),
                    limit_ms: limit.as_millis() as u64,
                })
            }
        }
    }

    /// Refuse scopes above `max_nodes`.
    fn ensure_within_limit(&self, scope: &str, node_count: usize) -> AnalyticsResult<()> {
        if node_count > self.config.max_nodes {
            return Err(AnalyticsError::GraphTooLarge {
                scope: scope.to_string(),
                node_count,
                limit: self.config.max_nodes,
            });
        }
        Ok(())
    }

    /// List the scope once, then apply the size guard when asked to.
    async fn scope_nodes(&self, scope: &str, guarded: bool) -> AnalyticsResult<Vec<String>> {
        let nodes = self.store.all_nodes(scope).await?;
        if guarded {
            self.ensure_within_limit(scope, nodes.len())?;
        }
        Ok(nodes)
    }

    /// Tables for one request over an already listed, non-empty scope.
    async fn tables_for(
        &self,
        scope: &str,
        request: &AnalysisRequest,
        nodes: &[String],
    ) -> AnalyticsResult<Vec<ResultTable>> {
        let store = self.store.as_ref();
        let tables = match request {
            AnalysisRequest::Degree => {
                let scores = centrality::degree_centrality_over(store, scope, nodes).await?;
                vec![assembler::integer_score_table(
                    "Degree centrality",
                    "degree_centrality",
                    &scores,
                )]
            }
            AnalysisRequest::Betweenness => {
                self.ensure_within_limit(scope, nodes.len())?;
                let scores = centrality::betweenness_centrality_over(store, scope, nodes).await?;
                vec![assembler::integer_score_table(
                    "Betweenness centrality (2-hop approximation)",
                    "betweenness_centrality",
                    &scores,
                )]
            }
            AnalysisRequest::Closeness => {
                self.ensure_within_limit(scope, nodes.len())?;
                let scores = centrality::closeness_centrality_over(store, scope, nodes).await?;
                vec![assembler::float_score_table(
                    "Closeness centrality (approximation)",
                    "closeness_centrality",
                    &scores,
                )]
            }
            AnalysisRequest::Centrality => {
                self.ensure_within_limit(scope, nodes.len())?;
                let rows = centrality::centrality_overview_over(store, scope, nodes).await?;
                let mut tables = vec![assembler::centrality_table(&rows)];
                tables.extend(assembler::key_insights_table(&rows));
                tables
            }
            AnalysisRequest::Communities => {
                let result = communities::detect_communities_over(
                    store,
                    scope,
                    nodes,
                    self.config.community_reachability_limit,
                )
                .await?;
                assembler::community_tables(&result)
            }
            AnalysisRequest::ShortestPath { source, target } => {
                let path = paths::shortest_path(store, scope, source, target).await?;
                vec![assembler::shortest_path_table(&path)]
            }
            AnalysisRequest::PathSummary => {
                self.ensure_within_limit(scope, nodes.len())?;
                let summary = paths::path_summary_over(store, scope, nodes).await?;
                vec![assembler::path_summary_table(&summary)]
            }
        };
        Ok(tables)
    }
}

#[async_trait]
impl AnalyticsEngine for GraphAnalyticsEngine {
    async fn degree_centrality(&self, scope: &str) -> AnalyticsResult<Vec<NodeScore<u64>>> {
        self.bounded("degree_centrality", scope, async {
            let nodes = self.scope_nodes(scope, false).await?;
            centrality::degree_centrality_over(self.store.as_ref(), scope, &nodes).await
        })
        .await
    }

    async fn betweenness_centrality(&self, scope: &str) -> AnalyticsResult<Vec<NodeScore<u64>>> {
        self.bounded("betweenness_centrality", scope, async {
            let nodes = self.scope_nodes(scope, true).await?;
            centrality::betweenness_centrality_over(self.store.as_ref(), scope, &nodes).await
        })
        .await
    }

    async fn closeness_centrality(&self, scope: &str) -> AnalyticsResult<Vec<NodeScore<f64>>> {
        self.bounded("closeness_centrality", scope, async {
            let nodes = self.scope_nodes(scope, true).await?;
            centrality::closeness_centrality_over(self.store.as_ref(), scope, &nodes).await
        })
        .await
    }

    async fn centrality_overview(&self, scope: &str) -> AnalyticsResult<Vec<CentralityRow>> {
        self.bounded("centrality_overview", scope, async {
            let nodes = self.scope_nodes(scope, true).await?;
            centrality::centrality_overview_over(self.store.as_ref(), scope, &nodes).await
        })
        .await
    }

    async fn communities(&self, scope: &str) -> AnalyticsResult<CommunityResult> {
        self.bounded("communities", scope, async {
            let nodes = self.scope_nodes(scope, false).await?;
            communities::detect_communities_over(
                self.store.as_ref(),
                scope,
                &nodes,
                self.config.community_reachability_limit,
            )
            .await
        })
        .await
    }

    async fn shortest_path(
        &self,
        scope: &str,
        source: &str,
        target: &str,
    ) -> AnalyticsResult<ShortestPath> {
        self.bounded(
            "shortest_path",
            scope,
            paths::shortest_path(self.store.as_ref(), scope, source, target),
        )
        .await
    }

    async fn path_summary(&self, scope: &str) -> AnalyticsResult<PathSummary> {
        self.bounded("path_summary", scope, async {
            let nodes = self.scope_nodes(scope, true).await?;
            paths::path_summary_over(self.store.as_ref(), scope, &nodes).await
        })
        .await
    }

    async fn analyze(
        &self,
        scope: &str,
        request: &AnalysisRequest,
    ) -> AnalyticsResult<AnalysisReport> {
        self.bounded(request.operation(), scope, async {
            let nodes = self.scope_nodes(scope, false).await?;
            if nodes.is_empty() {
                tracing::info!("Graph '{}' is empty, skipping {}", scope, request.operation());
                return Ok(AnalysisReport::empty(scope));
            }

            tracing::info!(
                "Running {} on '{}' ({} nodes)",
                request.operation(),
                scope,
                nodes.len()
            );
            let tables = self.tables_for(scope, request, &nodes).await?;
            Ok(AnalysisReport::new(scope, nodes.len(), tables))
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
