//! The controller's state record and the events that move it.
//!
//! All mutation goes through [`GraphState::apply`]. Events produced by async
//! work carry the sequence number of the search that issued them; anything
//! from an older search is dropped so a slow response can't overwrite a newer
//! graph.

use log::{debug, warn};

use super::reconcile::{merge_relationship_nodes, relationship_edges, sanitize_edges, subject_node};
use crate::api::{Business, BusinessRelationships};
use crate::components::force_graph::{GraphData, GraphEdge, GraphNode};
use crate::error::SearchError;

/// Something that happened to the graph view. `seq` names the search an
/// event belongs to.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchEvent {
	/// A validated search is about to hit the network.
	Started {
		/// Search this event belongs to.
		seq: u64,
	},
	/// The subject business was found; the graph restarts from it.
	BusinessFetched {
		/// Search this event belongs to.
		seq: u64,
		/// The lookup result.
		business: Business,
	},
	/// The subject's relationships arrived; the search is done.
	RelationshipsFetched {
		/// Search this event belongs to.
		seq: u64,
		/// The subject and its outbound links.
		relationships: BusinessRelationships,
	},
	/// Either fetch failed; the search is done.
	Failed {
		/// Search this event belongs to.
		seq: u64,
		/// What went wrong.
		error: SearchError,
	},
	/// The search never started, e.g. an input was empty.
	Rejected(SearchError),
	/// The user removed a node.
	NodeRemoved {
		/// Id of the removed node.
		id: String,
	},
}

impl SearchEvent {
	fn seq(&self) -> Option<u64> {
		match self {
			Self::Started { seq }
			| Self::BusinessFetched { seq, .. }
			| Self::RelationshipsFetched { seq, .. }
			| Self::Failed { seq, .. } => Some(*seq),
			Self::Rejected(_) | Self::NodeRemoved { .. } => None,
		}
	}
}

/// What the graph view shows, plus the search bookkeeping behind it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphState {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	busy: bool,
	error: Option<String>,
	seq: u64,
}

impl GraphState {
	/// Displayed nodes; the subject business comes first.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Displayed edges. Both endpoints are always in [`Self::nodes`].
	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	/// True from `Started` until the search finishes or fails.
	pub fn busy(&self) -> bool {
		self.busy
	}

	/// The single user-visible error, if any.
	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	/// Sequence number to hand to the next `Started` event.
	pub fn next_seq(&self) -> u64 {
		self.seq + 1
	}

	/// Snapshot for the canvas.
	pub fn graph_data(&self) -> GraphData {
		GraphData {
			nodes: self.nodes.clone(),
			edges: self.edges.clone(),
		}
	}

	/// Applies one event. Returns `false` when the event was stale and ignored.
	pub fn apply(&mut self, event: SearchEvent) -> bool {
		if let Some(seq) = event.seq() {
			if let SearchEvent::Started { .. } = event {
				if seq <= self.seq {
					warn!("ignoring out-of-order search start {seq} (current {})", self.seq);
					return false;
				}
			} else if seq != self.seq {
				debug!("discarding result of stale search {seq} (current {})", self.seq);
				return false;
			}
		}

		match event {
			SearchEvent::Started { seq } => {
				self.seq = seq;
				self.busy = true;
				self.error = None;
			}
			SearchEvent::BusinessFetched { business, .. } => {
				self.nodes = vec![subject_node(&business)];
				self.set_edges(Vec::new());
			}
			SearchEvent::RelationshipsFetched { relationships, .. } => {
				merge_relationship_nodes(&mut self.nodes, &relationships);
				self.set_edges(relationship_edges(&relationships));
				self.busy = false;
			}
			SearchEvent::Failed { error, .. } => {
				self.error = Some(error.to_string());
				self.busy = false;
			}
			SearchEvent::Rejected(error) => {
				self.error = Some(error.to_string());
			}
			SearchEvent::NodeRemoved { id } => {
				self.nodes.retain(|n| n.id != id);
				let edges = std::mem::take(&mut self.edges);
				self.set_edges(edges);
			}
		}
		true
	}

	fn set_edges(&mut self, edges: Vec<GraphEdge>) {
		self.edges = sanitize_edges(&self.nodes, edges);
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::api::Relationship;
	use crate::error::FetchError;

	fn acme() -> Business {
		Business {
			id: "b1".into(),
			name: "Acme Corp".into(),
			category: "Technology".into(),
		}
	}

	fn acme_relationships(rels: &[(&str, &str, f64)]) -> BusinessRelationships {
		BusinessRelationships {
			id: "b1".into(),
			name: "Acme Corp".into(),
			category: "Technology".into(),
			relationships: rels
				.iter()
				.map(|(id, kind, volume)| Relationship {
					id: (*id).into(),
					kind: (*kind).into(),
					transaction_volume: *volume,
					name: format!("Business {id}"),
					category: "Retail".into(),
				})
				.collect(),
		}
	}

	fn run(state: &mut GraphState, rels: BusinessRelationships) -> u64 {
		let seq = state.next_seq();
		assert!(state.apply(SearchEvent::Started { seq }));
		assert!(state.apply(SearchEvent::BusinessFetched { seq, business: acme() }));
		assert!(state.apply(SearchEvent::RelationshipsFetched {
			seq,
			relationships: rels,
		}));
		seq
	}

	fn assert_edges_consistent(state: &GraphState) {
		let ids: HashSet<_> = state.nodes().iter().map(|n| n.id.as_str()).collect();
		for edge in state.edges() {
			assert!(ids.contains(edge.source.as_str()), "dangling source {}", edge.id);
			assert!(ids.contains(edge.target.as_str()), "dangling target {}", edge.id);
		}
	}

	#[test]
	fn acme_beta_scenario() {
		let mut state = GraphState::default();
		run(&mut state, acme_relationships(&[("b2", "supplier", 5000.0)]));

		let ids: Vec<_> = state.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["b1", "b2"]);
		assert_eq!(state.edges().len(), 1);
		let edge = &state.edges()[0];
		assert_eq!(
			(edge.id.as_str(), edge.source.as_str(), edge.target.as_str(), edge.label.as_str()),
			("b1-b2", "b1", "b2", "supplier (5000)")
		);
		assert!(!state.busy());
		assert_eq!(state.error(), None);
	}

	#[test]
	fn subject_is_committed_before_relationships() {
		let mut state = GraphState::default();
		let seq = state.next_seq();
		state.apply(SearchEvent::Started { seq });
		state.apply(SearchEvent::BusinessFetched { seq, business: acme() });

		assert_eq!(state.nodes().len(), 1);
		assert!(state.edges().is_empty());
		assert!(state.busy());
	}

	#[test]
	fn empty_relationships_keep_only_subject() {
		let mut state = GraphState::default();
		run(&mut state, acme_relationships(&[("b2", "supplier", 1.0)]));
		run(&mut state, acme_relationships(&[]));

		assert_eq!(state.nodes().len(), 1);
		assert_eq!(state.nodes()[0].id, "b1");
		assert!(state.edges().is_empty());
	}

	#[test]
	fn failure_leaves_graph_untouched() {
		let mut state = GraphState::default();
		run(&mut state, acme_relationships(&[("b2", "supplier", 1.0)]));
		let before = state.graph_data();

		let seq = state.next_seq();
		state.apply(SearchEvent::Started { seq });
		assert!(state.busy());
		state.apply(SearchEvent::Failed {
			seq,
			error: FetchError::Status {
				status: 500,
				reason: "Internal Server Error".into(),
			}
			.into(),
		});

		assert_eq!(state.graph_data(), before);
		assert_eq!(state.error(), Some("HTTP 500: Internal Server Error"));
		assert!(!state.busy());
	}

	#[test]
	fn next_search_clears_error() {
		let mut state = GraphState::default();
		state.apply(SearchEvent::Rejected(SearchError::Validation("name is required".into())));
		assert_eq!(state.error(), Some("name is required"));

		let seq = state.next_seq();
		state.apply(SearchEvent::Started { seq });
		assert_eq!(state.error(), None);
	}

	#[test]
	fn duplicate_ids_collapse_to_one_node() {
		let mut state = GraphState::default();
		run(
			&mut state,
			acme_relationships(&[("b2", "supplier", 1.0), ("b3", "client", 2.0), ("b2", "partner", 3.0)]),
		);

		assert_eq!(state.nodes().len(), 3);
		// one edge per relationship, duplicates included
		assert_eq!(state.edges().len(), 3);
		assert_edges_consistent(&state);
	}

	#[test]
	fn repeated_search_is_idempotent() {
		let rels = acme_relationships(&[("b2", "supplier", 5000.0), ("b3", "client", 10.0)]);
		let mut state = GraphState::default();
		run(&mut state, rels.clone());
		let first = state.graph_data();
		run(&mut state, rels);
		assert_eq!(state.graph_data(), first);
	}

	#[test]
	fn stale_results_are_discarded() {
		let mut state = GraphState::default();
		let old = state.next_seq();
		state.apply(SearchEvent::Started { seq: old });
		state.apply(SearchEvent::BusinessFetched { seq: old, business: acme() });

		let new = state.next_seq();
		state.apply(SearchEvent::Started { seq: new });

		assert!(!state.apply(SearchEvent::RelationshipsFetched {
			seq: old,
			relationships: acme_relationships(&[("b9", "supplier", 1.0)]),
		}));
		assert!(!state.apply(SearchEvent::Failed {
			seq: old,
			error: FetchError::Network("reset".into()).into(),
		}));
		assert!(state.nodes().iter().all(|n| n.id != "b9"));
		assert!(state.busy());
		assert_eq!(state.error(), None);
	}

	#[test]
	fn out_of_order_start_is_ignored() {
		let mut state = GraphState::default();
		state.apply(SearchEvent::Started { seq: 2 });
		assert!(!state.apply(SearchEvent::Started { seq: 1 }));
		assert_eq!(state.next_seq(), 3);
	}

	#[test]
	fn removing_node_drops_its_edges() {
		let mut state = GraphState::default();
		run(&mut state, acme_relationships(&[("b2", "supplier", 1.0), ("b3", "client", 2.0)]));

		state.apply(SearchEvent::NodeRemoved { id: "b2".into() });
		assert_eq!(state.nodes().len(), 2);
		assert_eq!(state.edges().len(), 1);
		assert_eq!(state.edges()[0].target, "b3");

		state.apply(SearchEvent::NodeRemoved { id: "b1".into() });
		assert!(state.edges().is_empty());
		assert_edges_consistent(&state);
	}
}
