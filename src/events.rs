use crate::dom;
use crate::handles::{EventListener, Handles, WebHandle};
use crate::input::MouseState;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Shared input written by listeners and read once per frame.
#[derive(Clone, Default)]
pub struct InputCells {
    pub mouse: Rc<Cell<MouseState>>,
    pub scroll_px: Rc<Cell<f32>>,
    /// Set by pointermove; the frame loop turns it into a hover test.
    pub hover_pending: Rc<Cell<bool>>,
}

pub fn wire_input_handlers(
    canvas: &web::HtmlCanvasElement,
    handles: &Handles,
    cells: &InputCells,
) -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let window_target: &web::EventTarget = window.as_ref();
    let canvas_target: &web::EventTarget = canvas.as_ref();
    let mut lifetime = handles.borrow_mut();

    // Pointer move: canvas pixels for parallax and hover picking
    {
        let canvas = canvas.clone();
        let mouse = cells.mouse.clone();
        let hover = cells.hover_pending.clone();
        let l = EventListener::new(canvas_target, "pointermove", move |ev: web::Event| {
            if let Some(pe) = ev.dyn_ref::<web::PointerEvent>() {
                let p = dom::pointer_canvas_px(pe, &canvas);
                mouse.set(MouseState {
                    x: p.x,
                    y: p.y,
                    inside: true,
                });
                hover.set(true);
            }
        })?;
        lifetime.register(WebHandle::Listener(l));
    }

    {
        let mouse = cells.mouse.clone();
        let l = EventListener::new(canvas_target, "pointerleave", move |_ev: web::Event| {
            let mut m = mouse.get();
            m.inside = false;
            mouse.set(m);
        })?;
        lifetime.register(WebHandle::Listener(l));
    }

    {
        let scroll = cells.scroll_px.clone();
        let l = EventListener::new(window_target, "scroll", move |_ev: web::Event| {
            if let Some(w) = web::window() {
                scroll.set(w.scroll_y().unwrap_or(0.0) as f32);
            }
        })?;
        lifetime.register(WebHandle::Listener(l));
    }

    // Keep the backing store matched to CSS size * devicePixelRatio
    dom::sync_canvas_backing_size(canvas);
    {
        let canvas = canvas.clone();
        let l = EventListener::new(window_target, "resize", move |_ev: web::Event| {
            dom::sync_canvas_backing_size(&canvas);
        })?;
        lifetime.register(WebHandle::Listener(l));
    }
    Ok(())
}
