/// Width applied to edges that don't set one.
pub const DEFAULT_EDGE_WIDTH: f64 = 1.5;
/// Color applied to edges that don't set one.
pub const DEFAULT_EDGE_COLOR: &str = "rgba(100, 180, 255, 0.6)";

/// A display-ready vertex. `size` is the drawn radius in world units.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Business id; unique within a [`GraphData`].
	pub id: String,
	/// Text drawn beside the node.
	pub label: String,
	pub size: f64,
	/// Any CSS color.
	pub color: String,
	pub data: Option<NodeData>,
}

/// Domain payload carried by a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeData {
	/// Business category.
	pub category: String,
}

/// A display-ready edge between two node ids.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	/// `"{source}-{target}"`.
	pub id: String,
	/// Id of the node the edge starts at.
	pub source: String,
	/// Id of the node the edge ends at. May equal `source`.
	pub target: String,
	/// Text drawn at the middle of the edge.
	pub label: String,
	/// Stroke width; [`DEFAULT_EDGE_WIDTH`] when unset.
	pub width: Option<f64>,
	/// Stroke color; [`DEFAULT_EDGE_COLOR`] when unset.
	pub color: Option<String>,
	pub data: Option<EdgeData>,
}

/// Domain payload carried by an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeData {
	/// Relationship type, e.g. `supplier`.
	pub kind: String,
	/// Transaction volume of the relationship.
	pub volume: f64,
}

impl GraphEdge {
	/// Width to draw with: the set width if positive, else the default.
	pub fn width_or_default(&self) -> f64 {
		self.width.filter(|w| *w > 0.0).unwrap_or(DEFAULT_EDGE_WIDTH)
	}

	/// Color to draw with: the set color if non-empty, else the default.
	pub fn color_or_default(&self) -> &str {
		self.color
			.as_deref()
			.filter(|c| !c.is_empty())
			.unwrap_or(DEFAULT_EDGE_COLOR)
	}
}

/// Everything the canvas draws.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// The first node anchors the layout.
	pub nodes: Vec<GraphNode>,
	/// Drawn beneath the nodes.
	pub edges: Vec<GraphEdge>,
}
