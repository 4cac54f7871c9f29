//! Search form and status readout.

use leptos::prelude::*;

use crate::controller::GraphController;

/// Name and category inputs, the search button, and the busy/error readout.
#[component]
pub fn SearchPanel(
	/// Receives searches and node removals.
	controller: GraphController,
) -> impl IntoView {
	let name = RwSignal::new(String::new());
	let category = RwSignal::new(String::new());
	let (busy, error, first_node) = (
		controller.busy(),
		controller.error(),
		controller.first_node_id(),
	);

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		controller.search(&name.get_untracked(), &category.get_untracked());
	};

	view! {
		<form class="search-panel" on:submit=on_submit>
			<input
				type="text"
				placeholder="Business name"
				prop:value=move || name.get()
				on:input=move |ev| name.set(event_target_value(&ev))
			/>
			<input
				type="text"
				placeholder="Category"
				prop:value=move || category.get()
				on:input=move |ev| category.set(event_target_value(&ev))
			/>
			<button type="submit">"Search business"</button>
			{move || {
				first_node
					.get()
					.map(|id| {
						let label = format!("Remove node {id}");
						view! {
							<button
								type="button"
								disabled=move || busy.get()
								on:click=move |_| controller.remove_node(id.clone())
							>
								{label}
							</button>
						}
					})
			}}
			<Show when=move || busy.get()>
				<p class="busy">"Searching..."</p>
			</Show>
			{move || error.get().map(|e| view! { <p class="error">{e}</p> })}
		</form>
	}
}
