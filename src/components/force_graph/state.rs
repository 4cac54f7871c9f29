use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::GraphData;

/// Minimum pick radius in world units, so small nodes stay clickable.
pub const MIN_HIT_RADIUS: f64 = 8.0;
/// Distance at which new nodes are seeded around the first node.
const SEED_RADIUS: f64 = 100.0;
/// Zoom limits for wheel input.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Fitting never zooms in past this, so a lone node isn't blown up.
const MAX_FIT_ZOOM: f64 = 2.0;
const FIT_PADDING: f64 = 40.0;

/// The layout counts as ready after this many ticks regardless of motion.
const SETTLE_TICKS: u32 = 60;
/// ...or earlier, once no node moves more than `SETTLE_STEP` per tick.
const MIN_SETTLE_TICKS: u32 = 5;
const SETTLE_STEP: f64 = 0.5;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: String,
	pub radius: f64,
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub label: String,
	pub width: f64,
	pub color: String,
	/// Position among the edges joining the same pair of nodes, so their
	/// labels can be stacked instead of drawn on top of each other.
	pub slot: usize,
}

impl EdgeInfo {
	pub fn is_loop(&self) -> bool {
		self.source == self.target
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

/// Axis-aligned box in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// Tracks how far the simulation has come since the last data load.
#[derive(Clone, Debug)]
struct LayoutProgress {
	ticks: u32,
	max_step: f64,
}

impl Default for LayoutProgress {
	fn default() -> Self {
		Self {
			ticks: 0,
			max_step: f64::INFINITY,
		}
	}
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeInfo>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	layout: LayoutProgress,
	fit_pending: bool,
}

fn simulation() -> ForceGraph<NodeInfo, ()> {
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
}

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: simulation(),
			edges: Vec::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			layout: LayoutProgress::default(),
			fit_pending: false,
		};
		state.load(data);
		state
	}

	/// Replaces the simulated graph. Nodes already on screen keep their
	/// position; new ones are seeded on a circle around the first node.
	/// Edges with an unknown endpoint are skipped. A node linked to itself
	/// keeps its edge for drawing but gets no spring in the simulation.
	pub fn load(&mut self, data: &GraphData) {
		let mut previous: HashMap<String, (f32, f32)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(node.data.user_data.id.clone(), (node.x(), node.y()));
		});

		let anchor = data
			.nodes
			.first()
			.and_then(|n| previous.get(&n.id).copied())
			.unwrap_or((0.0, 0.0));
		let fresh = data
			.nodes
			.iter()
			.filter(|n| !previous.contains_key(&n.id))
			.count();

		let mut graph = simulation();
		let mut id_to_idx = HashMap::new();
		let mut seeded = 0;
		for (i, node) in data.nodes.iter().enumerate() {
			let (x, y) = match previous.get(&node.id) {
				Some(&pos) => pos,
				None if i == 0 => anchor,
				None => {
					let angle = (seeded as f64) * 2.0 * PI / fresh.max(1) as f64;
					seeded += 1;
					(
						anchor.0 + (SEED_RADIUS * angle.cos()) as f32,
						anchor.1 + (SEED_RADIUS * angle.sin()) as f32,
					)
				}
			};

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: node.color.clone(),
					radius: node.size,
				},
			});
			id_to_idx.insert(node.id.as_str(), idx);
		}

		let mut edges = Vec::new();
		let mut pair_counts: HashMap<(DefaultNodeIdx, DefaultNodeIdx), usize> = HashMap::new();
		for edge in &data.edges {
			if let (Some(&src), Some(&tgt)) = (
				id_to_idx.get(edge.source.as_str()),
				id_to_idx.get(edge.target.as_str()),
			) {
				// the simulation borrows both endpoints mutably per spring
				if src != tgt {
					graph.add_edge(src, tgt, EdgeData::default());
				}
				let count = pair_counts.entry((src.min(tgt), src.max(tgt))).or_default();
				edges.push(EdgeInfo {
					source: src,
					target: tgt,
					label: edge.label.clone(),
					width: edge.width_or_default(),
					color: edge.color_or_default().to_string(),
					slot: *count,
				});
				*count += 1;
			}
		}

		self.graph = graph;
		self.edges = edges;
		self.drag = DragState::default();
		self.hover = HoverState::default();
		self.layout = LayoutProgress::default();
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	pub fn radii(&self) -> HashMap<DefaultNodeIdx, f64> {
		let mut radii = HashMap::new();
		self.graph.visit_nodes(|node| {
			radii.insert(node.index(), node.data.user_data.radius);
		});
		radii
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// world-space, scales with zoom like nodes
			let hit = node.data.user_data.radius.max(MIN_HIT_RADIUS);
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// keep the old highlight around so it can fade out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Advances one animation frame: simulation, hover fade and any pending fit.
	pub fn frame(&mut self, dt: f32) {
		self.tick(dt);
		if self.fit_pending && self.is_layout_ready() {
			self.fit_pending = false;
			self.fit_view();
		}
	}

	pub fn tick(&mut self, dt: f32) {
		let before = self.positions();
		self.graph.update(dt);

		let mut max_step: f64 = 0.0;
		self.graph.visit_nodes(|node| {
			if let Some(&(x, y)) = before.get(&node.index()) {
				let (dx, dy) = (node.x() as f64 - x, node.y() as f64 - y);
				max_step = max_step.max((dx * dx + dy * dy).sqrt());
			}
		});
		self.layout.ticks = self.layout.ticks.saturating_add(1);
		self.layout.max_step = max_step;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Whether the layout has settled enough for framing to be meaningful.
	pub fn is_layout_ready(&self) -> bool {
		self.layout.ticks >= SETTLE_TICKS
			|| (self.layout.ticks >= MIN_SETTLE_TICKS && self.layout.max_step < SETTLE_STEP)
	}

	/// Asks for a fit once the layout is ready.
	pub fn request_fit(&mut self) {
		self.fit_pending = true;
	}

	pub fn node_bounds(&self) -> Option<Bounds> {
		let mut bounds: Option<Bounds> = None;
		self.graph.visit_nodes(|node| {
			let (x, y, r) = (node.x() as f64, node.y() as f64, node.data.user_data.radius);
			let b = bounds.get_or_insert(Bounds {
				min_x: x - r,
				min_y: y - r,
				max_x: x + r,
				max_y: y + r,
			});
			b.min_x = b.min_x.min(x - r);
			b.min_y = b.min_y.min(y - r);
			b.max_x = b.max_x.max(x + r);
			b.max_y = b.max_y.max(y + r);
		});
		bounds
	}

	/// Centers all nodes in the viewport. No-op on an empty graph.
	pub fn fit_view(&mut self) {
		if let Some(bounds) = self.node_bounds() {
			self.transform = fit_transform(bounds, self.width, self.height);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Transform that centers `bounds` in a `width` x `height` viewport.
pub fn fit_transform(bounds: Bounds, width: f64, height: f64) -> ViewTransform {
	let (bw, bh) = (
		(bounds.max_x - bounds.min_x).max(1.0),
		(bounds.max_y - bounds.min_y).max(1.0),
	);
	let (avail_w, avail_h) = (
		(width - 2.0 * FIT_PADDING).max(1.0),
		(height - 2.0 * FIT_PADDING).max(1.0),
	);
	let k = (avail_w / bw).min(avail_h / bh).clamp(MIN_ZOOM, MAX_FIT_ZOOM);
	let (cx, cy) = (
		(bounds.min_x + bounds.max_x) / 2.0,
		(bounds.min_y + bounds.max_y) / 2.0,
	);
	ViewTransform {
		x: width / 2.0 - cx * k,
		y: height / 2.0 - cy * k,
		k,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::{GraphEdge, GraphNode};

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.into(),
			size: 5.0,
			color: "#1f77b4".into(),
			data: None,
		}
	}

	fn edge(source: &str, target: &str) -> GraphEdge {
		GraphEdge {
			id: format!("{source}-{target}"),
			source: source.into(),
			target: target.into(),
			label: "supplier (1)".into(),
			width: None,
			color: None,
			data: None,
		}
	}

	fn data(nodes: &[&str], edges: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: nodes.iter().map(|id| node(id)).collect(),
			edges: edges.iter().map(|(s, t)| edge(s, t)).collect(),
		}
	}

	fn node_count(state: &ForceGraphState) -> usize {
		let mut count = 0;
		state.graph.visit_nodes(|_| count += 1);
		count
	}

	fn position_of(state: &ForceGraphState, id: &str) -> (f32, f32) {
		let mut pos = None;
		state.graph.visit_nodes(|n| {
			if n.data.user_data.id == id {
				pos = Some((n.x(), n.y()));
			}
		});
		pos.unwrap()
	}

	#[test]
	fn skips_edges_with_unknown_endpoints() {
		let state = ForceGraphState::new(&data(&["a", "b"], &[("a", "b"), ("a", "zz")]), 800.0, 600.0);
		assert_eq!(node_count(&state), 2);
		assert_eq!(state.edges.len(), 1);
		assert_eq!(state.edges[0].width, 1.5);
	}

	#[test]
	fn reload_keeps_existing_positions() {
		let mut state = ForceGraphState::new(&data(&["a"], &[]), 800.0, 600.0);
		for _ in 0..10 {
			state.tick(0.016);
		}
		let before = position_of(&state, "a");

		state.load(&data(&["a", "b", "c"], &[("a", "b"), ("a", "c")]));
		assert_eq!(node_count(&state), 3);
		assert_eq!(position_of(&state, "a"), before);
		assert_ne!(position_of(&state, "b"), position_of(&state, "c"));
	}

	#[test]
	fn neighbours_follow_edges() {
		let mut state = ForceGraphState::new(&data(&["a", "b", "c"], &[("a", "b")]), 800.0, 600.0);
		let idx = |id: &str| {
			let mut found = None;
			state.graph.visit_nodes(|n| {
				if n.data.user_data.id == id {
					found = Some(n.index());
				}
			});
			found.unwrap()
		};
		let (a, b, c) = (idx("a"), idx("b"), idx("c"));
		state.set_hover(Some(a));
		assert!(state.is_highlighted(b));
		assert!(!state.is_highlighted(c));
	}

	#[test]
	fn fit_transform_centers_bounds() {
		let bounds = Bounds {
			min_x: -100.0,
			min_y: -50.0,
			max_x: 300.0,
			max_y: 150.0,
		};
		let t = fit_transform(bounds, 880.0, 680.0);
		// 800/400 and 600/200 -> limited by width, then capped
		assert_eq!(t.k, 2.0);
		assert_eq!(t.x, 440.0 - 100.0 * 2.0);
		assert_eq!(t.y, 340.0 - 50.0 * 2.0);
	}

	#[test]
	fn fit_transform_zooms_out_for_wide_graphs() {
		let bounds = Bounds {
			min_x: 0.0,
			min_y: 0.0,
			max_x: 3200.0,
			max_y: 100.0,
		};
		let t = fit_transform(bounds, 880.0, 680.0);
		assert_eq!(t.k, 0.25);
		assert_eq!(t.x, 440.0 - 1600.0 * 0.25);
	}

	#[test]
	fn requested_fit_waits_for_layout() {
		let mut state = ForceGraphState::new(&data(&["a", "b"], &[("a", "b")]), 800.0, 600.0);
		state.request_fit();
		state.frame(0.016);
		assert!(state.fit_pending);

		let mut frames = 1;
		while state.fit_pending {
			state.frame(0.016);
			frames += 1;
			assert!(frames <= SETTLE_TICKS, "fit never applied");
		}

		let b = state.node_bounds().unwrap();
		let (cx, cy) = ((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0);
		let t = &state.transform;
		assert!((cx * t.k + t.x - 400.0).abs() < 1e-6);
		assert!((cy * t.k + t.y - 300.0).abs() < 1e-6);
	}

	#[test]
	fn self_loops_are_drawn_but_not_simulated() {
		let mut state = ForceGraphState::new(
			&data(&["b1", "b2"], &[("b1", "b1"), ("b1", "b2")]),
			800.0,
			600.0,
		);
		for _ in 0..SETTLE_TICKS {
			state.frame(0.016);
		}
		assert_eq!(state.edges.len(), 2);
		assert!(state.edges[0].is_loop());
		assert!(!state.edges[1].is_loop());
		assert!(state.positions().values().all(|(x, y)| x.is_finite() && y.is_finite()));
	}

	#[test]
	fn relationship_back_to_subject_survives_frames() {
		use crate::api::{Business, BusinessRelationships, Relationship};
		use crate::graph::{GraphState, SearchEvent};

		let mut graph = GraphState::default();
		let seq = graph.next_seq();
		graph.apply(SearchEvent::Started { seq });
		graph.apply(SearchEvent::BusinessFetched {
			seq,
			business: Business {
				id: "b1".into(),
				name: "Acme".into(),
				category: "Retail".into(),
			},
		});
		graph.apply(SearchEvent::RelationshipsFetched {
			seq,
			relationships: BusinessRelationships {
				id: "b1".into(),
				name: "Acme".into(),
				category: "Retail".into(),
				relationships: vec![Relationship {
					id: "b1".into(),
					name: "Acme".into(),
					category: "Retail".into(),
					kind: "subsidiary".into(),
					transaction_volume: 5.0,
				}],
			},
		});

		let mut state = ForceGraphState::new(&graph.graph_data(), 800.0, 600.0);
		assert_eq!(state.edges.len(), 1);
		for _ in 0..10 {
			state.frame(0.016);
		}
		assert_eq!(node_count(&state), 1);
	}

	#[test]
	fn parallel_edges_get_distinct_label_slots() {
		let state = ForceGraphState::new(
			&data(&["a", "b", "c"], &[("a", "b"), ("b", "a"), ("a", "b"), ("a", "c")]),
			800.0,
			600.0,
		);
		let slots: Vec<usize> = state.edges.iter().map(|e| e.slot).collect();
		assert_eq!(slots, vec![0, 1, 2, 0]);
	}

	#[test]
	fn fit_on_empty_graph_is_noop() {
		let mut state = ForceGraphState::new(&GraphData::default(), 800.0, 600.0);
		let before = state.transform.clone();
		state.fit_view();
		assert_eq!(state.transform, before);
		assert!(state.node_bounds().is_none());
	}
}
