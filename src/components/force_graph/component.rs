use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::{ForceGraphState, MAX_ZOOM, MIN_ZOOM};
use super::types::GraphData;

const FRAME_DT: f32 = 0.016;

/// Shared access to a mounted [`ForceGraphCanvas`], for camera control from
/// outside the component. Calls made before the canvas mounts are dropped.
#[derive(Clone, Copy)]
pub struct ForceGraphHandle {
	state: StoredValue<Option<ForceGraphState>, LocalStorage>,
}

impl Default for ForceGraphHandle {
	fn default() -> Self {
		Self::new()
	}
}

impl ForceGraphHandle {
	/// A handle not yet bound to a canvas.
	pub fn new() -> Self {
		Self {
			state: StoredValue::new_local(None),
		}
	}

	/// Runs `f` on the simulation if the canvas is mounted.
	fn with_state<U>(&self, f: impl FnOnce(&mut ForceGraphState) -> U) -> Option<U> {
		self.state.try_update_value(|s| s.as_mut().map(f)).flatten()
	}

	/// Fits all nodes into view right away.
	pub fn fit_view(&self) -> bool {
		self.with_state(ForceGraphState::fit_view).is_some()
	}

	/// Fits all nodes into view once the layout has settled.
	pub fn request_fit(&self) -> bool {
		self.with_state(ForceGraphState::request_fit).is_some()
	}
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Unregisters the resize listener and releases both frame callbacks. The
/// animation closure may be the caller; wasm-bindgen defers freeing it until
/// the running call returns.
fn detach(resize: &SharedClosure, animate: &SharedClosure) {
	unlisten_resize(resize);
	animate.borrow_mut().take();
}

fn unlisten_resize(resize: &SharedClosure) {
	if let (Some(cb), Some(window)) = (resize.borrow_mut().take(), web_sys::window()) {
		let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	}
}

/// Canvas that lays out and draws `data`, with drag, pan, zoom and hover.
/// With `fullscreen` it fills the window and follows resizes; otherwise it
/// takes `width`/`height` or its parent's size.
#[component]
pub fn ForceGraphCanvas(
	/// Graph to draw; reloading keeps the positions of known nodes.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Lets the parent move the camera.
	#[prop(optional)]
	handle: Option<ForceGraphHandle>,
	/// Fill the window.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width in pixels.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height in pixels.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let graph = handle.unwrap_or_default();
	let animate_init: SharedClosure = Rc::new(RefCell::new(None));
	let resize_cb_init: SharedClosure = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};
		let initial = ForceGraphState::new(&data.get_untracked(), w, h);
		graph.state.try_update_value(|s| *s = Some(initial));

		unlisten_resize(&resize_cb_init);
		if fullscreen {
			let canvas_resize = canvas.clone();
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				graph.with_state(|s| s.resize(nw, nh));
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (animate_inner, resize_inner) = (animate_init.clone(), resize_cb_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			// stop the loop once the canvas leaves the document or the owner is gone
			let drawn = graph.with_state(|s| {
				s.frame(FRAME_DT);
				render::render(s, &ctx);
			});
			if drawn.is_none() || !canvas.is_connected() {
				debug!("force graph canvas detached, stopping animation");
				detach(&resize_inner, &animate_inner);
				return;
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	Effect::new(move |_| {
		let data = data.get();
		graph.with_state(|s| s.load(&data));
	});

	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};

		graph.with_state(|s| {
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag.active = true;
				s.drag.node_idx = Some(idx);
				s.drag.start_x = x;
				s.drag.start_y = y;
				s.graph.visit_nodes(|node| {
					if node.index() == idx {
						s.drag.node_start_x = node.x();
						s.drag.node_start_y = node.y();
					}
				});
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		});
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};

		graph.with_state(|s| {
			if !s.drag.active {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
			}

			if s.drag.active {
				if let Some(idx) = s.drag.node_idx {
					let (dx, dy) = (
						(x - s.drag.start_x) / s.transform.k,
						(y - s.drag.start_y) / s.transform.k,
					);
					let (nx, ny) = (
						s.drag.node_start_x + dx as f32,
						s.drag.node_start_y + dy as f32,
					);
					s.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			}
		});
	};

	let on_mouseup = move |_: MouseEvent| {
		graph.with_state(|s| {
			s.drag.active = false;
			s.drag.node_idx = None;
			s.pan.active = false;
		});
	};

	let on_mouseleave = move |_: MouseEvent| {
		graph.with_state(|s| {
			s.drag.active = false;
			s.drag.node_idx = None;
			s.pan.active = false;
			s.set_hover(None);
		});
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};

		graph.with_state(|s| {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
			let ratio = new_k / s.transform.k;
			s.transform.x = x - (x - s.transform.x) * ratio;
			s.transform.y = y - (y - s.transform.y) * ratio;
			s.transform.k = new_k;
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn handle_goes_inert_once_its_owner_is_disposed() {
		let owner = Owner::new();
		let handle = owner.with(ForceGraphHandle::new);
		assert!(!handle.fit_view());

		let state = ForceGraphState::new(&GraphData::default(), 800.0, 600.0);
		handle.state.try_update_value(|s| *s = Some(state));
		assert!(handle.fit_view());
		assert!(handle.request_fit());

		// the frame loop reads this as its signal to unregister and stop
		owner.cleanup();
		assert!(!handle.fit_view());
		assert!(!handle.request_fit());
	}
}
