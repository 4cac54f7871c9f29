//! Search orchestration: validate input, fetch the business, then its
//! relationships, reporting each step as a [`SearchEvent`].

use log::{error, info};

use crate::api::BusinessApi;
use crate::error::SearchError;
use crate::graph::{GraphState, SearchEvent};

/// A validated pair of search inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
	name: String,
	category: String,
}

impl SearchQuery {
	/// Both fields are required; surrounding whitespace is dropped.
	///
	/// ```
	/// use business_graph_viewer::search::SearchQuery;
	///
	/// let query = SearchQuery::new(" Acme Corp ", "Technology").unwrap();
	/// assert_eq!((query.name(), query.category()), ("Acme Corp", "Technology"));
	/// assert!(SearchQuery::new("Acme Corp", "  ").is_err());
	/// ```
	pub fn new(name: &str, category: &str) -> Result<Self, SearchError> {
		let (name, category) = (name.trim(), category.trim());
		match (name.is_empty(), category.is_empty()) {
			(true, true) => Err(SearchError::Validation(
				"Business name and category are required".into(),
			)),
			(true, false) => Err(SearchError::Validation("Business name is required".into())),
			(false, true) => Err(SearchError::Validation("Category is required".into())),
			(false, false) => Ok(Self {
				name: name.to_string(),
				category: category.to_string(),
			}),
		}
	}

	/// Trimmed business name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Trimmed category.
	pub fn category(&self) -> &str {
		&self.category
	}
}

/// Validates the inputs and marks a new search as started.
///
/// Returns the query and its sequence number, or `None` after recording a
/// validation error. Must run synchronously with the click so two quick
/// searches never share a sequence number.
pub fn start_search(state: &mut GraphState, name: &str, category: &str) -> Option<(SearchQuery, u64)> {
	match SearchQuery::new(name, category) {
		Ok(query) => {
			let seq = state.next_seq();
			state.apply(SearchEvent::Started { seq });
			info!("search {seq}: {:?} in {:?}", query.name, query.category);
			Some((query, seq))
		}
		Err(e) => {
			state.apply(SearchEvent::Rejected(e));
			None
		}
	}
}

/// Performs the two fetches of search `seq`.
///
/// `dispatch` applies an event and returns whether it landed; once it
/// returns `false` (a newer search started, or the view is gone) nothing
/// further is requested.
pub async fn run_search<A, D>(api: &A, query: &SearchQuery, seq: u64, mut dispatch: D)
where
	A: BusinessApi,
	D: FnMut(SearchEvent) -> bool,
{
	let business = match api.find_business(&query.name, &query.category).await {
		Ok(business) => business,
		Err(e) => {
			error!("search {seq}: business lookup failed: {e}");
			dispatch(SearchEvent::Failed { seq, error: e.into() });
			return;
		}
	};

	let id = business.id.clone();
	if !dispatch(SearchEvent::BusinessFetched { seq, business }) {
		return;
	}

	match api.relationships(&id).await {
		Ok(relationships) => {
			info!(
				"search {seq}: {} has {} relationships",
				id,
				relationships.relationships.len()
			);
			dispatch(SearchEvent::RelationshipsFetched { seq, relationships });
		}
		Err(e) => {
			error!("search {seq}: relationships of {id} failed: {e}");
			dispatch(SearchEvent::Failed { seq, error: e.into() });
		}
	}
}
