//! Knowledge-graph analytics.
//!
//! Every analysis is computed through [`GraphStore`](crate::neo4j::GraphStore)
//! queries scoped by graph name; nothing is cached between calls.
//!
//! ## Architecture
//!
//! ```text
//! GraphStore (Neo4j / in-memory)
//!        │
//!        ├──► centrality   degree, 2-hop betweenness, closeness
//!        ├──► communities  reachability components / initial-letter fallback
//!        └──► paths        shortest path, path summary
//!                 │
//!             assembler ──► AnalysisReport (tables, empty-graph flag)
//!                 │
//!     AnalyticsEngine (size guard + timeout)
//! ```
//!
//! ## Modules
//!
//! - [`models`]: Result and configuration types
//! - [`error`]: `AnalyticsError`
//! - [`centrality`], [`communities`], [`paths`]: the analyses
//! - [`assembler`]: tables for presentation
//! - [`engine`]: `AnalyticsEngine` trait and `GraphAnalyticsEngine`

pub mod assembler;
pub mod centrality;
pub mod communities;
pub mod engine;
pub mod error;
pub mod models;
pub mod paths;

// Re-export primary types for convenience
pub use assembler::{AnalysisReport, Cell, ResultTable, MISSING_PLACEHOLDER};
pub use engine::{AnalysisRequest, AnalyticsEngine, GraphAnalyticsEngine};
pub use error::{AnalyticsError, AnalyticsResult};
pub use models::{
    AnalyticsConfig, CentralityRow, CommunityMethod, CommunityResult, ComponentInfo, NodeScore,
    PathOutcome, PathSummary, ShortestPath,
};
