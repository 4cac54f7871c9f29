use crate::components::force_graph::GraphNode;

/// Decides when the canvas should re-fit its camera.
///
/// Fires once per distinct non-empty node-id set. The fit itself is deferred
/// by the canvas until its layout is ready.
#[derive(Clone, Debug, Default)]
pub struct FitTrigger {
	last_ids: Vec<String>,
}

impl FitTrigger {
	/// Records the current nodes; true when a fit should be requested.
	pub fn observe(&mut self, nodes: &[GraphNode]) -> bool {
		let changed = nodes.len() != self.last_ids.len()
			|| nodes.iter().zip(&self.last_ids).any(|(n, id)| &n.id != id);
		if !changed {
			return false;
		}
		self.last_ids = nodes.iter().map(|n| n.id.clone()).collect();
		!self.last_ids.is_empty()
	}
}
