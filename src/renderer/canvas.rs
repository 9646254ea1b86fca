//! Canvas2D executor for scene draw lists

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::scene::DrawCommand;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx })
    }

    pub fn draw(&self, commands: &[DrawCommand]) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        for command in commands {
            match command {
                DrawCommand::Clear { size } => {
                    ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
                }
                DrawCommand::Rect { pos, size, color } => {
                    ctx.set_fill_style_str(&color.to_css());
                    ctx.fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => {
                    ctx.begin_path();
                    ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU)?;
                    if let Some(fill) = fill {
                        ctx.set_fill_style_str(&fill.to_css());
                        ctx.fill();
                    }
                    if let Some((color, width)) = stroke {
                        ctx.set_stroke_style_str(&color.to_css());
                        ctx.set_line_width(*width as f64);
                        ctx.stroke();
                    }
                }
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    width,
                    dashed,
                } => {
                    if *dashed {
                        let pattern = js_sys::Array::of2(&5.0.into(), &5.0.into());
                        ctx.set_line_dash(&pattern)?;
                    }
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.line_to(to.x as f64, to.y as f64);
                    ctx.set_stroke_style_str(&color.to_css());
                    ctx.set_line_width(*width as f64);
                    ctx.stroke();
                    if *dashed {
                        ctx.set_line_dash(&js_sys::Array::new())?;
                    }
                }
                DrawCommand::Text {
                    pos,
                    text,
                    size,
                    align,
                    color,
                } => {
                    ctx.set_fill_style_str(&color.to_css());
                    ctx.set_font(&format!("{}px Arial", size));
                    ctx.set_text_align(align.as_str());
                    ctx.fill_text(text, pos.x as f64, pos.y as f64)?;
                }
            }
        }
        Ok(())
    }
}
