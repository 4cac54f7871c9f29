use leptos::prelude::*;
use log::debug;

use crate::components::force_graph::{ForceGraphCanvas, ForceGraphHandle};
use crate::components::search_panel::SearchPanel;
use crate::config::AppConfig;
use crate::controller::GraphController;
use crate::graph::FitTrigger;

/// Graph view: search panel over a fullscreen force-directed canvas.
#[component]
pub fn Home() -> impl IntoView {
	let config = AppConfig::from_build_env();
	debug!("backend at {}", config.api_base_url);

	let controller = GraphController::new(&config);
	let graph_data = controller.graph_data();
	let graph_handle = ForceGraphHandle::new();

	// re-frame the camera whenever a different set of nodes is shown
	let mut fit_trigger = FitTrigger::default();
	Effect::new(move |_| {
		if graph_data.with(|d| fit_trigger.observe(&d.nodes)) && !graph_handle.request_fit() {
			debug!("fit requested before the canvas mounted");
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas data=graph_data handle=graph_handle fullscreen=true />
				<div class="graph-overlay">
					<h1>"Business Relationships"</h1>
					<p class="subtitle">"Search a business to see who it trades with. Drag nodes to reposition, scroll to zoom."</p>
				</div>
				<SearchPanel controller=controller />
				<button
					class="fit-view"
					type="button"
					on:click=move |_| {
						graph_handle.fit_view();
					}
				>
					"Fit view"
				</button>
			</div>
		</ErrorBoundary>
	}
}
