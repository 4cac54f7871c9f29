//! HTTP client for the business backend.
//!
//! Requests go through the browser's `fetch`, bounded by an `AbortController`
//! armed with a timer.

use log::debug;
use serde::de::DeserializeOwned;
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response, Window};

use super::models::{Business, BusinessRelationships};
use crate::config::AppConfig;
use crate::error::FetchError;

/// The two read endpoints the viewer consumes.
#[allow(async_fn_in_trait)]
pub trait BusinessApi {
	/// `GET /businesses?name=..&category=..`
	async fn find_business(&self, name: &str, category: &str) -> Result<Business, FetchError>;

	/// `GET /businesses/{id}/relationships`
	async fn relationships(&self, business_id: &str) -> Result<BusinessRelationships, FetchError>;
}

/// [`BusinessApi`] over the browser's `fetch`.
#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: Url,
	timeout_ms: u32,
}

impl ApiClient {
	/// Client for the backend and timeout named in `config`.
	pub fn new(config: &AppConfig) -> Self {
		Self {
			base_url: config.api_base_url.clone(),
			timeout_ms: config.request_timeout_ms,
		}
	}

	/// Lookup URL with `name` and `category` query-encoded.
	pub fn business_url(&self, name: &str, category: &str) -> Result<Url, FetchError> {
		let mut url = self.endpoint(&["businesses"])?;
		url.query_pairs_mut()
			.append_pair("name", name)
			.append_pair("category", category);
		Ok(url)
	}

	/// Relationships URL; `business_id` is encoded as one path segment.
	pub fn relationships_url(&self, business_id: &str) -> Result<Url, FetchError> {
		self.endpoint(&["businesses", business_id, "relationships"])
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
		debug!("GET {url}");
		let body = fetch_text(url.as_str(), self.timeout_ms).await?;
		decode(&body)
	}
}

impl BusinessApi for ApiClient {
	async fn find_business(&self, name: &str, category: &str) -> Result<Business, FetchError> {
		self.get(self.business_url(name, category)?).await
	}

	async fn relationships(&self, business_id: &str) -> Result<BusinessRelationships, FetchError> {
		self.get(self.relationships_url(business_id)?).await
	}
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
	serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

async fn fetch_text(url: &str, timeout_ms: u32) -> Result<String, FetchError> {
	let window = web_sys::window().ok_or_else(|| FetchError::Network("no window".into()))?;
	let controller = AbortController::new().map_err(|e| FetchError::Network(js_message(&e)))?;
	let signal = controller.signal();

	let init = RequestInit::new();
	init.set_method("GET");
	init.set_mode(RequestMode::Cors);
	init.set_signal(Some(&signal));
	let request = Request::new_with_str_and_init(url, &init)
		.map_err(|e| FetchError::InvalidUrl(js_message(&e)))?;

	let abort: Closure<dyn FnMut()> = Closure::once(move || controller.abort());
	let timer = window
		.set_timeout_with_callback_and_timeout_and_arguments_0(
			abort.as_ref().unchecked_ref(),
			timeout_ms.min(i32::MAX as u32) as i32,
		)
		.map_err(|e| FetchError::Network(js_message(&e)))?;

	let result = read_response(&window, &request).await;
	window.clear_timeout_with_handle(timer);
	drop(abort);

	match result {
		Err(_) if signal.aborted() => Err(FetchError::Timeout { millis: timeout_ms }),
		other => other,
	}
}

async fn read_response(window: &Window, request: &Request) -> Result<String, FetchError> {
	let value = JsFuture::from(window.fetch_with_request(request))
		.await
		.map_err(|e| FetchError::Network(js_message(&e)))?;
	let response: Response = value
		.dyn_into()
		.map_err(|_| FetchError::Network("fetch did not resolve to a Response".into()))?;

	if !response.ok() {
		return Err(FetchError::Status {
			status: response.status(),
			reason: response.status_text(),
		});
	}

	let text = response
		.text()
		.map_err(|e| FetchError::Network(js_message(&e)))?;
	JsFuture::from(text)
		.await
		.map_err(|e| FetchError::Network(js_message(&e)))?
		.as_string()
		.ok_or_else(|| FetchError::Decode("body is not text".into()))
}

fn js_message(value: &JsValue) -> String {
	value
		.dyn_ref::<js_sys::Error>()
		.map(|e| String::from(e.message()))
		.or_else(|| value.as_string())
		.unwrap_or_else(|| format!("{value:?}"))
}
