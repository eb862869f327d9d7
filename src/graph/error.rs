//! Errors surfaced by the analytics engine.

/// Failure of an analytics call.
///
/// An empty graph is never an error: every analysis returns a well-defined
/// empty result for it.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// A node named by the caller does not exist in the scope
    #[error("node '{node_id}' not found in graph '{scope}'")]
    NotFound { node_id: String, scope: String },

    /// The scope is above the configured node limit for this analysis
    #[error("graph '{scope}' has {node_count} nodes, above the analysis limit of {limit}")]
    GraphTooLarge {
        scope: String,
        node_count: usize,
        limit: usize,
    },

    /// The analysis call ran past its time budget
    #[error("{operation} on graph '{scope}' exceeded {limit_ms}ms")]
    Timeout {
        operation: &'static str,
        scope: String,
        limit_ms: u64,
    },

    /// The store failed; passed through unchanged
    #[error(transparent)]
    StoreUnavailable(#[from] anyhow::Error),
}

pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;
