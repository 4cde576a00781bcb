//! Stable JSON forms for graphs and routes.
//!
//! The wire layout is pinned for golden-file testing, so it goes through
//! dedicated document types instead of deriving off the in-memory
//! structs: a graph is an object mapping each vertex key to its outgoing
//! edge array, a route is the path plus per-step amounts. Vertex
//! metadata and execution-time estimates are not part of the wire form;
//! deserialization reconstructs default execution times per edge kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builder::TokenGraph;
use super::types::{Edge, EdgeKind, LiquidityPool, RouteResult, RouteStep, TokenKey, TokenNode};
use crate::errors::GraphError;

#[derive(Debug, Serialize, Deserialize)]
struct EdgeDoc {
    kind: String,
    target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rate: Option<f64>,
    gas: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bridge_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    liquidity: Option<LiquidityPool>,
}

#[derive(Debug, Serialize)]
struct StepDoc {
    from: String,
    to: String,
    kind: &'static str,
    weight: f64,
    input_amount: f64,
    output_amount: f64,
    edge: EdgeDoc,
}

#[derive(Debug, Serialize)]
struct RouteDoc {
    path: Vec<String>,
    total_weight: f64,
    estimated_output: f64,
    steps: Vec<StepDoc>,
}

type GraphDoc = BTreeMap<String, Vec<EdgeDoc>>;

fn edge_doc(edge: &Edge) -> EdgeDoc {
    match &edge.kind {
        EdgeKind::Swap { pool, rate } => EdgeDoc {
            kind: "swap".into(),
            target: edge.target.to_string(),
            rate: *rate,
            gas: edge.gas,
            bridge_fee: None,
            time_delay: None,
            liquidity: pool.clone(),
        },
        EdgeKind::Bridge {
            fee_fraction,
            time_delay_s,
        } => EdgeDoc {
            kind: "bridge".into(),
            target: edge.target.to_string(),
            rate: None,
            gas: edge.gas,
            bridge_fee: Some(*fee_fraction),
            time_delay: Some(*time_delay_s),
            liquidity: None,
        },
    }
}

fn edge_from_doc(doc: EdgeDoc) -> Result<Edge, GraphError> {
    let target = TokenKey::parse(&doc.target)
        .ok_or_else(|| GraphError::MalformedDocument(format!("bad vertex key {}", doc.target)))?;
    match doc.kind.as_str() {
        "swap" => Ok(Edge {
            target,
            kind: EdgeKind::Swap {
                pool: doc.liquidity,
                rate: doc.rate,
            },
            gas: doc.gas,
            exec_time_ms: super::types::DEFAULT_SWAP_TIME_MS,
        }),
        "bridge" => {
            let fee = doc.bridge_fee.ok_or_else(|| {
                GraphError::MalformedDocument(format!(
                    "bridge edge to {} is missing bridge_fee",
                    doc.target
                ))
            })?;
            Ok(Edge::bridge(target, fee, doc.time_delay.unwrap_or(0.0), doc.gas))
        }
        other => Err(GraphError::MalformedDocument(format!(
            "unknown edge kind {other}"
        ))),
    }
}

impl TokenGraph {
    /// Serialize to the stable JSON form: vertex key -> outgoing edges.
    /// Keys are emitted in sorted order so output is reproducible.
    pub fn to_json(&self) -> Value {
        let mut doc = GraphDoc::new();
        for key in self.keys() {
            let edges = self.neighbors(key).map(edge_doc).collect();
            doc.insert(key.to_string(), edges);
        }
        serde_json::to_value(doc).unwrap_or(Value::Null)
    }

    /// Rebuild a graph from the stable JSON form. The resulting graph
    /// passes the same validation as one built by hand; vertex metadata
    /// is not carried on the wire and comes back empty.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        let doc: GraphDoc = serde_json::from_str(text)
            .map_err(|err| GraphError::MalformedDocument(err.to_string()))?;

        let mut graph = TokenGraph::new();
        for key_text in doc.keys() {
            let key = TokenKey::parse(key_text).ok_or_else(|| {
                GraphError::MalformedDocument(format!("bad vertex key {key_text}"))
            })?;
            graph.add_vertex(TokenNode::new(key))?;
        }
        for (key_text, edges) in doc {
            // Key parsed above.
            let source = TokenKey::parse(&key_text)
                .ok_or_else(|| GraphError::MalformedDocument(format!("bad vertex key {key_text}")))?;
            for edge in edges {
                graph.add_edge(&source, edge_from_doc(edge)?)?;
            }
        }
        Ok(graph)
    }
}

impl RouteResult {
    /// Serialize to the stable JSON route form.
    pub fn to_json(&self) -> Value {
        let doc = RouteDoc {
            path: self.path.iter().map(TokenKey::to_string).collect(),
            total_weight: self.total_weight,
            estimated_output: self.estimated_output,
            steps: self.steps.iter().map(step_doc).collect(),
        };
        serde_json::to_value(doc).unwrap_or(Value::Null)
    }
}

fn step_doc(step: &RouteStep) -> StepDoc {
    StepDoc {
        from: step.from.to_string(),
        to: step.to.to_string(),
        kind: step.edge.kind_label(),
        weight: step.weight,
        input_amount: step.input_amount,
        output_amount: step.output_amount,
        edge: edge_doc(&step.edge),
    }
}
