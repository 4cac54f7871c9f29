use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_highlight = state.has_active_highlight();
	let positions = state.positions();
	let radii = state.radii();

	for edge in &state.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};

		let is_highlighted =
			has_highlight && state.is_highlighted(edge.source) && state.is_highlighted(edge.target);
		// t=0: every edge at full alpha; t=1: highlighted edges full, others faded
		let (alpha, width) = if !has_highlight || is_highlighted {
			(1.0, edge.width / k * (1.0 + 0.3 * t))
		} else {
			(1.0 - 0.75 * t, edge.width / k * (1.0 - 0.3 * t))
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&edge.color);
		ctx.set_line_width(width);
		ctx.begin_path();

		let (lx, ly) = if edge.is_loop() {
			// small ring above the node
			let r = radii.get(&edge.source).copied().unwrap_or(0.0).max(4.0);
			let (cx, cy) = (x1, y1 - r * 1.6);
			let _ = ctx.arc(cx, cy, r * 0.9, 0.0, 2.0 * PI);
			ctx.stroke();
			(cx, cy - r * 0.9)
		} else {
			let (dx, dy) = (x2 - x1, y2 - y1);
			if (dx * dx + dy * dy).sqrt() < 0.001 {
				continue;
			}
			ctx.move_to(x1, y1);
			ctx.line_to(x2, y2);
			ctx.stroke();
			((x1 + x2) / 2.0, (y1 + y2) / 2.0)
		};

		if !edge.label.is_empty() {
			draw_edge_label(ctx, &edge.label, lx, ly, edge.slot, k, alpha);
		}
	}
	ctx.set_global_alpha(1.0);
}

/// Draws `label` centered on (`x`, `y`). Labels of parallel edges are stacked
/// one row apart by `slot`.
fn draw_edge_label(
	ctx: &CanvasRenderingContext2d,
	label: &str,
	x: f64,
	y: f64,
	slot: usize,
	k: f64,
	alpha: f64,
) {
	let font_size = 9.0 / k.max(0.5);
	ctx.set_font(&format!("{}px sans-serif", font_size));
	let text_width = ctx.measure_text(label).map(|m| m.width()).unwrap_or(0.0);
	let pad = 2.0 / k.max(0.5);
	let y = y + slot as f64 * (font_size + 2.0 * pad);

	// knock out the line behind the text
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(
		x - text_width / 2.0 - pad,
		y - font_size / 2.0 - pad,
		text_width + 2.0 * pad,
		font_size + 2.0 * pad,
	);
	ctx.set_fill_style_str(&format!("rgba(200, 220, 255, {})", alpha * 0.9));
	let _ = ctx.fill_text(label, x - text_width / 2.0, y + font_size / 3.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, info.radius * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		if !info.label.is_empty() {
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(&info.label, x + radius + 3.0, y + 3.0);
		}
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(info.radius * (1.0 + 0.35 * t), info.radius * (1.8 + 1.2 * t))
		} else if is_neighbor {
			(info.radius * (1.0 + 0.2 * t), info.radius * (1.4 + 0.6 * t))
		} else {
			(info.radius, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		if !info.label.is_empty() {
			ctx.set_fill_style_str("white");
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(&info.label, x + radius + 3.0, y + 3.0);
		}
	});
}
