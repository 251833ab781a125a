use std::f64::consts::PI;

use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use waystone_shared::scene::PATH_DASH;
use waystone_shared::DrawCommand;

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

fn set_dash(ctx: &CanvasRenderingContext2d, dashed: bool) {
    let segments = Array::new();
    if dashed {
        for length in PATH_DASH {
            segments.push(&JsValue::from_f64(length));
        }
    }
    let _ = ctx.set_line_dash(&segments);
}

pub fn replay(ctx: &CanvasRenderingContext2d, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::Clear { width, height } => {
                ctx.clear_rect(0.0, 0.0, *width, *height);
            }
            DrawCommand::Line { from, to, style } => {
                ctx.set_stroke_style_str(style.color);
                ctx.set_line_width(style.width);
                ctx.set_line_cap(if style.round_caps { "round" } else { "butt" });
                set_dash(ctx, style.dashed);
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                ctx.stroke();
            }
            DrawCommand::Marker {
                center,
                radius,
                fill,
                outline,
            } => {
                set_dash(ctx, false);
                ctx.set_fill_style_str(fill);
                ctx.set_stroke_style_str(outline);
                ctx.set_line_width(1.0);
                ctx.begin_path();
                let _ = ctx.arc(center.x, center.y, *radius, 0.0, PI * 2.0);
                ctx.fill();
                ctx.stroke();
            }
        }
    }
}
