//! kg-analytics - command-line front end
//!
//! Saves, lists and loads named knowledge graphs and runs analytics on them.
//! Output is JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kg_analytics::graph::{AnalysisRequest, AnalyticsEngine};
use kg_analytics::neo4j::{GraphStore, WorkingGraph};
use kg_analytics::{AppState, Config};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Name the sample graph is stored under when none is given
const SAMPLE_GRAPH_NAME: &str = "sample";

/// Name the vehicle demo graph is seeded under in `--in-memory` mode
const VEHICLE_GRAPH_NAME: &str = "vehicle";

#[derive(Parser)]
#[command(name = "kg-analytics")]
#[command(about = "Knowledge graph analytics over Neo4j")]
struct Cli {
    /// Path to a YAML config file (defaults to ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a process-local in-memory store seeded with both demo graphs
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved graphs, newest first
    List,

    /// Save a working graph from a JSON file under a name
    Save {
        /// JSON file with `nodes` and `edges`
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Save one of the built-in demo graphs
    Sample {
        #[arg(short, long, default_value = SAMPLE_GRAPH_NAME)]
        name: String,

        /// Which demo graph to save
        #[arg(short, long, value_enum, default_value = "technology")]
        kind: SampleKind,
    },

    /// Print a saved graph
    Show { name: String },

    /// Run one analysis on a saved graph
    Analyze {
        name: String,

        #[arg(value_enum)]
        kind: AnalysisKind,
    },

    /// Shortest path between two nodes of a saved graph
    Path {
        name: String,
        source: String,
        target: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SampleKind {
    /// AI, ML and data science topics (15 nodes)
    Technology,
    /// Stages, parties and parts of a vehicle's life (30 nodes)
    VehicleLifecycle,
}

impl SampleKind {
    fn graph(self) -> WorkingGraph {
        match self {
            SampleKind::Technology => WorkingGraph::sample(),
            SampleKind::VehicleLifecycle => WorkingGraph::vehicle_lifecycle(),
        }
    }

    fn description(self) -> &'static str {
        match self {
            SampleKind::Technology => "Sample technology graph",
            SampleKind::VehicleLifecycle => "Vehicle lifecycle graph",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AnalysisKind {
    Degree,
    Betweenness,
    Closeness,
    Centrality,
    Communities,
    PathSummary,
}

impl From<AnalysisKind> for AnalysisRequest {
    fn from(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::Degree => AnalysisRequest::Degree,
            AnalysisKind::Betweenness => AnalysisRequest::Betweenness,
            AnalysisKind::Closeness => AnalysisRequest::Closeness,
            AnalysisKind::Centrality => AnalysisRequest::Centrality,
            AnalysisKind::Communities => AnalysisRequest::Communities,
            AnalysisKind::PathSummary => AnalysisRequest::PathSummary,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kg_analytics=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_yaml_and_env(cli.config.as_deref())?;

    let state = if cli.in_memory {
        let state = AppState::in_memory(config);
        for (name, kind) in [
            (SAMPLE_GRAPH_NAME, SampleKind::Technology),
            (VEHICLE_GRAPH_NAME, SampleKind::VehicleLifecycle),
        ] {
            state
                .store
                .save_graph(name, kind.description(), &kind.graph())
                .await?;
        }
        tracing::info!(
            "Using in-memory store with graphs '{}' and '{}'",
            SAMPLE_GRAPH_NAME,
            VEHICLE_GRAPH_NAME
        );
        state
    } else {
        let state = AppState::new(config).await?;
        tracing::info!("Connected to Neo4j at {}", state.config.neo4j_uri);
        state
    };

    match cli.command {
        Commands::List => print_json(&state.store.list_graphs().await?),
        Commands::Save {
            file,
            name,
            description,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let graph: WorkingGraph = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid graph JSON in {}", file.display()))?;
            let meta = state.store.save_graph(&name, &description, &graph).await?;
            print_json(&meta)
        }
        Commands::Sample { name, kind } => {
            let meta = state
                .store
                .save_graph(&name, kind.description(), &kind.graph())
                .await?;
            print_json(&meta)
        }
        Commands::Show { name } => match state.store.load_graph(&name).await? {
            Some(snapshot) => print_json(&snapshot),
            None => anyhow::bail!("Graph '{}' not found", name),
        },
        Commands::Analyze { name, kind } => {
            let report = state.engine.analyze(&name, &kind.into()).await?;
            if report.empty_graph {
                tracing::warn!("Graph '{}' has no nodes", name);
            }
            print_json(&report)
        }
        Commands::Path {
            name,
            source,
            target,
        } => {
            let request = AnalysisRequest::ShortestPath { source, target };
            print_json(&state.engine.analyze(&name, &request).await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
