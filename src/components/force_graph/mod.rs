//! Force-directed graph canvas.

mod component;
mod render;
mod state;
mod types;

pub use component::{ForceGraphCanvas, ForceGraphHandle};
pub use types::{DEFAULT_EDGE_COLOR, DEFAULT_EDGE_WIDTH, EdgeData, GraphData, GraphEdge, GraphNode, NodeData};
