//! Turning backend results into display nodes and edges.
//!
//! Node ids stay unique: a relationship whose id is already displayed keeps
//! the existing node untouched. Edges are rebuilt from scratch on every
//! relationships fetch and never reference a missing node.

use std::collections::HashSet;

use crate::api::{Business, BusinessRelationships, Relationship};
use crate::components::force_graph::{EdgeData, GraphEdge, GraphNode, NodeData};

/// The searched business is drawn larger and in orange.
pub const SUBJECT_NODE_SIZE: f64 = 12.0;
pub const SUBJECT_NODE_COLOR: &str = "#ff7f0e";
/// Related businesses.
pub const RELATED_NODE_SIZE: f64 = 7.0;
pub const RELATED_NODE_COLOR: &str = "#1f77b4";

/// Node for the searched business.
pub fn subject_node(business: &Business) -> GraphNode {
	GraphNode {
		id: business.id.clone(),
		label: business.name.clone(),
		size: SUBJECT_NODE_SIZE,
		color: SUBJECT_NODE_COLOR.into(),
		data: Some(NodeData {
			category: business.category.clone(),
		}),
	}
}

/// Node for the business on the far end of `rel`.
pub fn related_node(rel: &Relationship) -> GraphNode {
	GraphNode {
		id: rel.id.clone(),
		label: rel.name.clone(),
		size: RELATED_NODE_SIZE,
		color: RELATED_NODE_COLOR.into(),
		data: Some(NodeData {
			category: rel.category.clone(),
		}),
	}
}

/// Edge from the subject to `rel`'s business, labelled `"{type} ({volume})"`.
pub fn relationship_edge(subject_id: &str, rel: &Relationship) -> GraphEdge {
	GraphEdge {
		id: format!("{}-{}", subject_id, rel.id),
		source: subject_id.to_string(),
		target: rel.id.clone(),
		// f64's Display drops the fraction of integral values: "5000", "12.5"
		label: format!("{} ({})", rel.kind, rel.transaction_volume),
		width: None,
		color: None,
		data: Some(EdgeData {
			kind: rel.kind.clone(),
			volume: rel.transaction_volume,
		}),
	}
}

/// Appends a related node for every relationship id not yet in `nodes`.
/// Returns how many nodes were added.
pub fn merge_relationship_nodes(nodes: &mut Vec<GraphNode>, incoming: &BusinessRelationships) -> usize {
	let mut seen: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
	let before = nodes.len();
	for rel in &incoming.relationships {
		if seen.insert(rel.id.clone()) {
			nodes.push(related_node(rel));
		}
	}
	nodes.len() - before
}

/// One edge per relationship, from the subject to the related business.
pub fn relationship_edges(incoming: &BusinessRelationships) -> Vec<GraphEdge> {
	incoming
		.relationships
		.iter()
		.map(|rel| relationship_edge(&incoming.id, rel))
		.collect()
}

/// Drops edges with an endpoint outside `nodes` and fills in display defaults.
pub fn sanitize_edges(nodes: &[GraphNode], edges: Vec<GraphEdge>) -> Vec<GraphEdge> {
	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	edges
		.into_iter()
		.filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
		.map(|mut e| {
			e.width = Some(e.width_or_default());
			e.color = Some(e.color_or_default().to_string());
			e
		})
		.collect()
}
