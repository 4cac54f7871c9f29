use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="graph-overlay">
			<h1>"Page not found"</h1>
			<p class="subtitle">
				<a href="/">"Back to the graph"</a>
			</p>
		</div>
	}
}
