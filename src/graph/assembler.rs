//! Result assembler.
//!
//! Turns module outputs into titled tables of typed cells for a presentation
//! layer. Row order is exactly the order the module produced. A missing
//! numeric value becomes [`Cell::Missing`], rendered as [`MISSING_PLACEHOLDER`]
//! so it can never be mistaken for a zero.

use serde::{Serialize, Serializer};
use std::fmt;

use super::models::{
    CentralityRow, CommunityMethod, CommunityResult, NodeScore, PathOutcome, PathSummary,
    ShortestPath,
};

/// Text shown in place of an absent number.
pub const MISSING_PLACEHOLDER: &str = "N/A";

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(u64),
    Float(f64),
    Missing,
}

impl Cell {
    fn from_opt_float(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Cell::Float(v),
            _ => Cell::Missing,
        }
    }

    fn from_opt_int(value: Option<usize>) -> Self {
        value.map_or(Cell::Missing, |v| Cell::Integer(v as u64))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{:.4}", v),
            Cell::Missing => write!(f, "{}", MISSING_PLACEHOLDER),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Integer(v) => serializer.serialize_u64(*v),
            Cell::Float(v) => serializer.serialize_f64(*v),
            Cell::Missing => serializer.serialize_str(MISSING_PLACEHOLDER),
        }
    }
}

/// A titled table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    fn new(title: &str, columns: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }
}

/// Everything a caller needs to render one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub graph_name: String,
    /// True when the scope holds no nodes; `tables` is then empty
    pub empty_graph: bool,
    pub node_count: usize,
    pub tables: Vec<ResultTable>,
}

impl AnalysisReport {
    /// Report for a scope without nodes; no analytics were run.
    pub fn empty(graph_name: &str) -> Self {
        Self {
            graph_name: graph_name.to_string(),
            empty_graph: true,
            node_count: 0,
            tables: vec![],
        }
    }

    pub fn new(graph_name: &str, node_count: usize, tables: Vec<ResultTable>) -> Self {
        Self {
            graph_name: graph_name.to_string(),
            empty_graph: node_count == 0,
            node_count,
            tables,
        }
    }
}

// ============================================================================
// Per-module tables
// ============================================================================

/// Table for an integer per-node metric (degree, betweenness).
pub fn integer_score_table(title: &str, metric: &str, scores: &[NodeScore<u64>]) -> ResultTable {
    let mut table = ResultTable::new(title, &["node_id", metric]);
    for s in scores {
        table.push(vec![Cell::Text(s.node_id.clone()), Cell::Integer(s.score)]);
    }
    table
}

/// Table for a floating-point per-node metric (closeness).
pub fn float_score_table(title: &str, metric: &str, scores: &[NodeScore<f64>]) -> ResultTable {
    let mut table = ResultTable::new(title, &["node_id", metric]);
    for s in scores {
        table.push(vec![
            Cell::Text(s.node_id.clone()),
            Cell::from_opt_float(Some(s.score)),
        ]);
    }
    table
}

pub fn centrality_table(rows: &[CentralityRow]) -> ResultTable {
    let mut table = ResultTable::new(
        "Centrality",
        &[
            "node_id",
            "label",
            "degree_centrality",
            "betweenness_centrality",
            "closeness_centrality",
        ],
    );
    for r in rows {
        table.push(vec![
            Cell::Text(r.node_id.clone()),
            Cell::Text(r.label.clone()),
            Cell::Integer(r.degree),
            Cell::Integer(r.betweenness),
            Cell::from_opt_float(Some(r.closeness)),
        ]);
    }
    table
}

/// Headline nodes of a centrality overview: the most connected node (first in
/// degree order) and the strongest broker (highest betweenness, ties by id).
/// `None` when there are no rows.
pub fn key_insights_table(rows: &[CentralityRow]) -> Option<ResultTable> {
    let most_connected = rows.first()?;
    let broker = rows.iter().min_by(|a, b| {
        b.betweenness
            .cmp(&a.betweenness)
            .then_with(|| a.node_id.cmp(&b.node_id))
    })?;

    let mut table = ResultTable::new("Key insights", &["insight", "node_id", "label", "score"]);
    for (insight, row, score) in [
        ("most_connected", most_connected, most_connected.degree),
        ("most_important_broker", broker, broker.betweenness),
    ] {
        table.push(vec![
            Cell::Text(insight.to_string()),
            Cell::Text(row.node_id.clone()),
            Cell::Text(row.label.clone()),
            Cell::Integer(score),
        ]);
    }
    Some(table)
}

/// Membership table (ordered by community rank, then node id) and a
/// per-community summary table.
pub fn community_tables(result: &CommunityResult) -> Vec<ResultTable> {
    let method = match result.method {
        CommunityMethod::Reachability => "reachability",
        CommunityMethod::InitialLetterFallback => "initial_letter_fallback",
    };

    let mut members = ResultTable::new(
        "Community membership",
        &["node_id", "label", "community_id"],
    );
    let mut sizes = ResultTable::new("Communities", &["community_id", "size"]);
    for component in &result.components {
        sizes.push(vec![
            Cell::Text(component.id.clone()),
            Cell::Integer(component.size as u64),
        ]);
        for member in &component.members {
            members.push(vec![
                Cell::Text(member.clone()),
                Cell::Text(result.label_of(member).to_string()),
                Cell::Text(component.id.clone()),
            ]);
        }
    }

    let mut stats = ResultTable::new(
        "Community statistics",
        &["method", "total_communities", "largest_community", "average_size"],
    );
    stats.push(vec![
        Cell::Text(method.to_string()),
        Cell::Integer(result.community_count() as u64),
        Cell::from_opt_int(result.largest_size()),
        Cell::from_opt_float(result.mean_size()),
    ]);

    vec![members, sizes, stats]
}

pub fn shortest_path_table(path: &ShortestPath) -> ResultTable {
    let mut table = ResultTable::new(
        "Shortest path",
        &["source", "target", "hops", "path", "relationships"],
    );
    let (route, relationships) = match &path.outcome {
        PathOutcome::Found { nodes, edges } => {
            (Cell::Text(nodes.join(" -> ")), Cell::Text(edges.join(" -> ")))
        }
        PathOutcome::NoPath => (Cell::Text("no path".to_string()), Cell::Missing),
    };
    table.push(vec![
        Cell::Text(path.source.clone()),
        Cell::Text(path.target.clone()),
        Cell::from_opt_int(path.hops()),
        route,
        relationships,
    ]);
    table
}

pub fn path_summary_table(summary: &PathSummary) -> ResultTable {
    let mut table = ResultTable::new(
        "Path summary",
        &[
            "node_count",
            "connected_pairs",
            "avg_path_length",
            "min_path_length",
            "max_path_length",
            "density",
        ],
    );
    table.push(vec![
        Cell::Integer(summary.node_count as u64),
        Cell::Integer(summary.connected_pairs as u64),
        Cell::from_opt_float(summary.avg_path_length),
        Cell::from_opt_int(summary.min_path_length),
        Cell::from_opt_int(summary.max_path_length),
        Cell::Float(summary.density),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::models::ComponentInfo;
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_is_distinct_from_zero() {
        assert_eq!(Cell::Missing.to_string(), "N/A");
        assert_eq!(Cell::Integer(0).to_string(), "0");
        assert_eq!(serde_json::to_value(Cell::Missing).unwrap(), "N/A");
        assert_eq!(serde_json::to_value(Cell::Integer(0)).unwrap(), 0);
    }

    #[test]
    fn test_non_finite_float_becomes_missing() {
        assert_eq!(Cell::from_opt_float(Some(f64::NAN)), Cell::Missing);
        assert_eq!(Cell::from_opt_float(None), Cell::Missing);
        assert_eq!(Cell::from_opt_float(Some(0.0)), Cell::Float(0.0));
    }

    #[test]
    fn test_summary_table_nulls() {
        let summary = PathSummary {
            node_count: 2,
            total_pairs: 1,
            connected_pairs: 0,
            avg_path_length: None,
            min_path_length: None,
            max_path_length: None,
            density: 0.0,
        };
        let table = path_summary_table(&summary);
        assert_eq!(
            table.rows[0],
            vec![
                Cell::Integer(2),
                Cell::Integer(0),
                Cell::Missing,
                Cell::Missing,
                Cell::Missing,
                Cell::Float(0.0),
            ]
        );
    }

    #[test]
    fn test_score_table_preserves_order() {
        let scores = vec![NodeScore::new("b", 5u64), NodeScore::new("a", 1u64)];
        let table = integer_score_table("Degree", "degree_centrality", &scores);
        assert_eq!(table.columns, vec!["node_id", "degree_centrality"]);
        assert_eq!(table.rows[0][0], Cell::Text("b".into()));
        assert_eq!(table.rows[1][0], Cell::Text("a".into()));
    }

    #[test]
    fn test_no_path_row() {
        let path = ShortestPath {
            source: "X".into(),
            target: "Y".into(),
            outcome: PathOutcome::NoPath,
        };
        let table = shortest_path_table(&path);
        assert_eq!(table.rows[0][2], Cell::Missing);
        assert_eq!(table.rows[0][3], Cell::Text("no path".into()));
        assert_eq!(table.rows[0][4], Cell::Missing);
    }

    #[test]
    fn test_path_row_lists_relationships() {
        let path = ShortestPath {
            source: "car".into(),
            target: "piston".into(),
            outcome: PathOutcome::Found {
                nodes: vec!["car".into(), "engine".into(), "piston".into()],
                edges: vec!["has_part".into(), "part_of".into()],
            },
        };
        let table = shortest_path_table(&path);
        assert_eq!(table.columns[4], "relationships");
        assert_eq!(table.rows[0][2], Cell::Integer(2));
        assert_eq!(table.rows[0][3], Cell::Text("car -> engine -> piston".into()));
        assert_eq!(table.rows[0][4], Cell::Text("has_part -> part_of".into()));
    }

    fn row(node_id: &str, label: &str, degree: u64, betweenness: u64) -> CentralityRow {
        CentralityRow {
            node_id: node_id.into(),
            label: label.into(),
            degree,
            betweenness,
            closeness: 0.5,
        }
    }

    #[test]
    fn test_centrality_table_has_labels() {
        let table = centrality_table(&[row("ai", "Artificial Intelligence", 6, 22)]);
        assert_eq!(table.columns[1], "label");
        assert_eq!(table.rows[0][1], Cell::Text("Artificial Intelligence".into()));
        assert_eq!(table.rows[0][2], Cell::Integer(6));
    }

    #[test]
    fn test_key_insights_pick_hub_and_broker() {
        let rows = vec![
            row("hub", "Hub", 5, 4),
            row("b2", "Bridge two", 2, 6),
            row("b1", "Bridge one", 2, 6),
        ];
        let table = key_insights_table(&rows).unwrap();
        assert_eq!(table.columns, vec!["insight", "node_id", "label", "score"]);
        assert_eq!(
            table.rows[0],
            vec![
                Cell::Text("most_connected".into()),
                Cell::Text("hub".into()),
                Cell::Text("Hub".into()),
                Cell::Integer(5),
            ]
        );
        assert_eq!(
            table.rows[1],
            vec![
                Cell::Text("most_important_broker".into()),
                Cell::Text("b1".into()),
                Cell::Text("Bridge one".into()),
                Cell::Integer(6),
            ]
        );
        assert!(key_insights_table(&[]).is_none());
    }

    #[test]
    fn test_community_tables() {
        let result = CommunityResult {
            method: CommunityMethod::Reachability,
            assignments: BTreeMap::from([
                ("a".to_string(), "a".to_string()),
                ("b".to_string(), "a".to_string()),
                ("z".to_string(), "z".to_string()),
            ]),
            labels: BTreeMap::from([("a".to_string(), "Alpha".to_string())]),
            components: vec![
                ComponentInfo {
                    id: "a".into(),
                    size: 2,
                    members: vec!["a".into(), "b".into()],
                },
                ComponentInfo {
                    id: "z".into(),
                    size: 1,
                    members: vec!["z".into()],
                },
            ],
        };
        let tables = community_tables(&result);
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].rows[0][1], Cell::Text("Alpha".into()));
        assert_eq!(tables[0].rows[1][1], Cell::Text("b".into()));
        assert_eq!(tables[0].rows[1][2], Cell::Text("a".into()));
        assert_eq!(tables[1].rows[0][1], Cell::Integer(2));
        assert_eq!(tables[2].rows[0][3], Cell::Float(1.5));
    }

    #[test]
    fn test_empty_report_flag() {
        let report = AnalysisReport::empty("nothing");
        assert!(report.empty_graph);
        assert!(report.tables.is_empty());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["empty_graph"], true);
    }
}
