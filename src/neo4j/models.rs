//! Neo4j graph models for scoped knowledge graphs
//!
//! Every `KGNode` and `RELATED` relationship carries a `graph_name` property
//! (the scope tag). A `GraphMeta` node records what was saved under that name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Stored entities
// ============================================================================

/// An entity of a knowledge graph (`:KGNode`).
///
/// The scope tag is not part of the struct: it is supplied by the store call
/// that reads or writes the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KgNode {
    pub id: String,
    pub label: String,
    /// Presentation-only colour (e.g. `#4ECDC4`)
    #[serde(default)]
    pub color: String,
}

impl KgNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// A relationship between two entities (`:RELATED`).
///
/// Stored with a source → target orientation; analytics treat it as undirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KgEdge {
    pub source: String,
    pub target: String,
    pub label: String,
}

impl KgEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }
}

/// Metadata recorded for a saved graph (`:GraphMeta`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMeta {
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Full contents of one scope as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub meta: Option<GraphMeta>,
    pub nodes: Vec<KgNode>,
    pub edges: Vec<KgEdge>,
}

/// One shortest path as read from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPath {
    /// Node ids, endpoints included
    pub nodes: Vec<String>,
    /// Relationship labels, `edges[i]` joining `nodes[i]` and `nodes[i + 1]`
    pub edges: Vec<String>,
}

impl GraphPath {
    pub fn single(node_id: impl Into<String>) -> Self {
        Self {
            nodes: vec![node_id.into()],
            edges: vec![],
        }
    }

    pub fn hops(&self) -> usize {
        self.edges.len()
    }
}

// ============================================================================
// Traversal patterns
// ============================================================================

/// Closed set of traversal patterns a store knows how to count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Length-2 paths `a–node–b` with `a ≠ b` and neither endpoint equal to
    /// `node`. Each direction of traversal counts as its own match.
    TwoHopThrough(String),
}

// ============================================================================
// Working graph (caller-owned, pre-save)
// ============================================================================

/// Reasons a working graph cannot be saved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphValidationError {
    #[error("graph name must not be empty")]
    EmptyName,
    #[error("node id must not be empty")]
    EmptyNodeId,
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),
    #[error("relationship from '{0}' to itself")]
    SelfLoop(String),
    #[error("edge {from} -> {to} references unknown node '{missing}'")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },
}

/// Mutable set of nodes and edges a caller edits before saving it as a scope.
///
/// The analytics core never sees this type; it only reads what was saved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkingGraph {
    #[serde(default)]
    pub nodes: Vec<KgNode>,
    #[serde(default)]
    pub edges: Vec<KgEdge>,
}

impl WorkingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or update label and colour of an existing node with the same id.
    pub fn upsert_node(&mut self, node: KgNode) {
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    pub fn add_edge(&mut self, edge: KgEdge) {
        self.edges.push(edge);
    }

    /// Remove a node together with every edge touching it.
    /// Returns `false` if no such node existed.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        true
    }

    /// Remove every edge `source -> target` carrying `label`. Returns how many were removed.
    pub fn remove_edge(&mut self, source: &str, target: &str, label: &str) -> usize {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.source == source && e.target == target && e.label == label));
        before - self.edges.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check the invariants a scope must satisfy once saved.
    pub fn validate(&self, graph_name: &str) -> Result<(), GraphValidationError> {
        if graph_name.trim().is_empty() {
            return Err(GraphValidationError::EmptyName);
        }

        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.id.is_empty() {
                return Err(GraphValidationError::EmptyNodeId);
            }
            if !ids.insert(node.id.as_str()) {
                return Err(GraphValidationError::DuplicateNode(node.id.clone()));
            }
        }

        for edge in &self.edges {
            if edge.source == edge.target {
                return Err(GraphValidationError::SelfLoop(edge.source.clone()));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(GraphValidationError::DanglingEdge {
                        from: edge.source.clone(),
                        to: edge.target.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// The technology landscape graph used for demos: 15 entities, 20 relationships.
    pub fn sample() -> Self {
        let nodes = [
            ("tech", "Technology", "#FF6B6B"),
            ("ai", "Artificial Intelligence", "#4ECDC4"),
            ("ml", "Machine Learning", "#45B7D1"),
            ("nlp", "Natural Language Processing", "#96CEB4"),
            ("cv", "Computer Vision", "#FFEAA7"),
            ("robotics", "Robotics", "#DDA0DD"),
            ("data", "Data Science", "#98D8C8"),
            ("python", "Python", "#F7DC6F"),
            ("tensorflow", "TensorFlow", "#AED6F1"),
            ("pytorch", "PyTorch", "#F8BBD9"),
            ("research", "Research", "#D2B4DE"),
            ("industry", "Industry", "#A9DFBF"),
            ("healthcare", "Healthcare", "#F9E79F"),
            ("finance", "Finance", "#FAD7A0"),
            ("education", "Education", "#ABEBC6"),
        ];
        let edges = [
            ("tech", "ai", "encompasses"),
            ("ai", "ml", "includes"),
            ("ai", "nlp", "includes"),
            ("ai", "cv", "includes"),
            ("ai", "robotics", "enables"),
            ("ml", "data", "requires"),
            ("ml", "python", "implemented_in"),
            ("ml", "tensorflow", "uses"),
            ("ml", "pytorch", "uses"),
            ("nlp", "python", "implemented_in"),
            ("cv", "python", "implemented_in"),
            ("ai", "research", "drives"),
            ("ai", "industry", "transforms"),
            ("ai", "healthcare", "applied_in"),
            ("ai", "finance", "applied_in"),
            ("ai", "education", "applied_in"),
            ("data", "healthcare", "analyzed_in"),
            ("data", "finance", "analyzed_in"),
            ("python", "data", "processes"),
            ("research", "industry", "influences"),
        ];

        Self::from_tuples(&nodes, &edges)
    }

    /// Vehicle lifecycle graph: stages, stakeholders, components and
    /// documents of a vehicle. 30 entities, 47 relationships.
    pub fn vehicle_lifecycle() -> Self {
        let nodes = [
            ("vehicle", "Vehicle", "#FF6B6B"),
            ("design", "Design Phase", "#4ECDC4"),
            ("manufacturing", "Manufacturing", "#45B7D1"),
            ("assembly", "Assembly", "#96CEB4"),
            ("testing", "Quality Testing", "#FFEAA7"),
            ("delivery", "Delivery", "#DDA0DD"),
            ("registration", "Registration", "#98D8C8"),
            ("operation", "Operation", "#F7DC6F"),
            ("maintenance", "Maintenance", "#AED6F1"),
            ("inspection", "Inspection", "#F8BBD9"),
            ("repair", "Repair", "#D2B4DE"),
            ("recall", "Recall", "#A9DFBF"),
            ("disposal", "End-of-Life", "#F9E79F"),
            ("manufacturer", "Manufacturer", "#FAD7A0"),
            ("dealer", "Dealer", "#ABEBC6"),
            ("owner", "Owner", "#F5B7B1"),
            ("service_center", "Service Center", "#AED6F1"),
            ("regulator", "Regulator", "#D5A6BD"),
            ("insurer", "Insurance Company", "#A9CCE3"),
            ("recycler", "Recycler", "#A3E4D7"),
            ("engine", "Engine", "#F8C471"),
            ("transmission", "Transmission", "#BB8FCE"),
            ("brakes", "Brakes", "#85C1E9"),
            ("electronics", "Electronics", "#82E0AA"),
            ("body", "Body", "#F7DC6F"),
            ("vin", "VIN", "#D7BDE2"),
            ("service_record", "Service Records", "#A2D9CE"),
            ("warranty", "Warranty", "#F9E79F"),
            ("manual", "Owner Manual", "#FADBD8"),
            ("compliance", "Compliance Data", "#D1F2EB"),
        ];
        let edges = [
            ("design", "manufacturing", "leads_to"),
            ("manufacturing", "assembly", "leads_to"),
            ("assembly", "testing", "leads_to"),
            ("testing", "delivery", "leads_to"),
            ("delivery", "registration", "leads_to"),
            ("registration", "operation", "leads_to"),
            ("operation", "maintenance", "requires"),
            ("maintenance", "inspection", "includes"),
            ("inspection", "repair", "may_require"),
            ("operation", "disposal", "eventually_leads_to"),
            ("vehicle", "design", "starts_with"),
            ("vehicle", "vin", "identified_by"),
            ("vehicle", "engine", "contains"),
            ("vehicle", "transmission", "contains"),
            ("vehicle", "brakes", "contains"),
            ("vehicle", "electronics", "contains"),
            ("vehicle", "body", "contains"),
            ("manufacturer", "design", "responsible_for"),
            ("manufacturer", "manufacturing", "responsible_for"),
            ("manufacturer", "assembly", "responsible_for"),
            ("manufacturer", "warranty", "provides"),
            ("manufacturer", "manual", "creates"),
            ("manufacturer", "recall", "initiates"),
            ("dealer", "delivery", "handles"),
            ("dealer", "registration", "assists_with"),
            ("owner", "vehicle", "owns"),
            ("owner", "operation", "responsible_for"),
            ("owner", "maintenance", "schedules"),
            ("owner", "insurer", "contracts_with"),
            ("service_center", "maintenance", "performs"),
            ("service_center", "repair", "performs"),
            ("service_center", "service_record", "maintains"),
            ("regulator", "inspection", "mandates"),
            ("regulator", "compliance", "monitors"),
            ("regulator", "recall", "orders"),
            ("insurer", "vehicle", "covers"),
            ("recycler", "disposal", "handles"),
            ("engine", "maintenance", "requires"),
            ("transmission", "maintenance", "requires"),
            ("brakes", "inspection", "subject_to"),
            ("electronics", "testing", "validated_during"),
            ("service_record", "maintenance", "documents"),
            ("service_record", "repair", "documents"),
            ("warranty", "repair", "covers"),
            ("manual", "operation", "guides"),
            ("compliance", "testing", "verified_during"),
            ("compliance", "inspection", "checked_during"),
        ];

        Self::from_tuples(&nodes, &edges)
    }

    fn from_tuples(nodes: &[(&str, &str, &str)], edges: &[(&str, &str, &str)]) -> Self {
        Self {
            nodes: nodes
                .iter()
                .map(|(id, label, color)| KgNode::new(*id, *label, *color))
                .collect(),
            edges: edges
                .iter()
                .map(|(s, t, l)| KgEdge::new(*s, *t, *l))
                .collect(),
        }
    }
}
