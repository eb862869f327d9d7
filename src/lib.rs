//! Knowledge Graph Analytics
//!
//! Analytics over named knowledge graphs stored in Neo4j:
//! - Degree, two-hop betweenness and closeness centrality
//! - Community detection through reachability
//! - Shortest paths and whole-graph path statistics
//! - Save / list / load of named graphs, with an in-memory store for tests and demos

pub mod graph;
pub mod neo4j;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use graph::{AnalyticsConfig, AnalyticsEngine, GraphAnalyticsEngine};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub neo4j: Neo4jYamlConfig,
    pub analytics: AnalyticsConfig,
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "password".into(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub analytics: AnalyticsConfig,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path);
        let analytics = yaml.analytics;

        // 2. Build Config with env var overrides
        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            analytics: AnalyticsConfig {
                max_nodes: env_parse("ANALYTICS_MAX_NODES").unwrap_or(analytics.max_nodes),
                community_reachability_limit: env_parse("ANALYTICS_COMMUNITY_LIMIT")
                    .unwrap_or(analytics.community_reachability_limit),
                timeout_secs: env_parse("ANALYTICS_TIMEOUT_SECS")
                    .unwrap_or(analytics.timeout_secs),
            },
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Parse a numeric env var; unset or malformed values count as absent.
fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid number", var, raw);
            None
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn neo4j::GraphStore>,
    pub engine: Arc<dyn AnalyticsEngine>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and build the analytics engine on top of it
    pub async fn new(config: Config) -> Result<Self> {
        let store = Arc::new(
            neo4j::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );
        Ok(Self::with_store(store, config))
    }

    /// State over an in-memory store (nothing persists past the process)
    pub fn in_memory(config: Config) -> Self {
        Self::with_store(Arc::new(neo4j::MemoryGraphStore::new()), config)
    }

    pub fn with_store(store: Arc<dyn neo4j::GraphStore>, config: Config) -> Self {
        let engine = Arc::new(GraphAnalyticsEngine::new(
            store.clone(),
            config.analytics.clone(),
        ));
        Self {
            store,
            engine,
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
