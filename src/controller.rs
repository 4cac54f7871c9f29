//! The graph view controller: owns the [`GraphState`] signal and drives
//! searches against the backend.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;

use crate::api::ApiClient;
use crate::components::force_graph::GraphData;
use crate::config::AppConfig;
use crate::graph::{GraphState, SearchEvent};
use crate::search::{run_search, start_search};

/// Copyable handle shared by the page and the search panel.
#[derive(Clone, Copy)]
pub struct GraphController {
	state: RwSignal<GraphState>,
	api: StoredValue<ApiClient>,
}

impl GraphController {
	/// Empty graph, talking to the backend named in `config`.
	pub fn new(config: &AppConfig) -> Self {
		Self {
			state: RwSignal::new(GraphState::default()),
			api: StoredValue::new(ApiClient::new(config)),
		}
	}

	/// Starts a search; any search still in flight becomes stale.
	pub fn search(&self, name: &str, category: &str) {
		let Some((query, seq)) = self
			.state
			.try_update(|s| start_search(s, name, category))
			.flatten()
		else {
			return;
		};
		let (state, api) = (self.state, self.api);
		spawn_local(async move {
			let Some(api) = api.try_get_value() else {
				return;
			};
			run_search(&api, &query, seq, move |event| {
				// a disposed signal means the view was torn down
				state.try_update(|s| s.apply(event)).unwrap_or_else(|| {
					debug!("search {seq}: view gone, dropping result");
					false
				})
			})
			.await;
		});
	}

	/// Drops a node and every edge touching it.
	pub fn remove_node(&self, id: String) {
		self.state.update(|s| {
			s.apply(SearchEvent::NodeRemoved { id });
		});
	}

	/// True while a search is in flight.
	pub fn busy(&self) -> Signal<bool> {
		let state = self.state;
		Signal::derive(move || state.with(GraphState::busy))
	}

	/// Last search error, cleared by the next successful fetch.
	pub fn error(&self) -> Signal<Option<String>> {
		let state = self.state;
		Signal::derive(move || state.with(|s| s.error().map(str::to_string)))
	}

	/// Id of the first displayed node, the one "remove" acts on.
	pub fn first_node_id(&self) -> Signal<Option<String>> {
		let state = self.state;
		Signal::derive(move || state.with(|s| s.nodes().first().map(|n| n.id.clone())))
	}

	/// Memoized so busy/error flips don't make the canvas reload.
	pub fn graph_data(&self) -> Signal<GraphData> {
		let state = self.state;
		Memo::new(move |_| state.with(GraphState::graph_data)).into()
	}
}
