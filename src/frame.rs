use crate::events::InputCells;
use crate::handles::{RafCallback, RafLoop};
use crate::input;
use crate::overlay::LoaderOverlay;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys as web;
use zodiac_core::{Camera, FrameInput, RevealController};
use zodiac_render::{GpuContext, Renderer};

pub struct FrameContext {
    pub controller: RevealController,
    pub renderer: Option<Renderer>,
    pub overlay: Option<LoaderOverlay>,
    pub canvas: web::HtmlCanvasElement,
    pub input: InputCells,
    pub last_ms: Option<f64>,
}

impl FrameContext {
    /// Advance one animation frame. Returns false once nothing is left to animate.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let dt_sec = input::frame_dt_sec(self.last_ms, now_ms);
        self.last_ms = Some(now_ms);

        let w = self.canvas.width();
        let h = self.canvas.height();
        let mouse = self.input.mouse.get();

        if self.input.hover_pending.replace(false) && mouse.inside {
            let camera = match &self.renderer {
                Some(r) => r.camera().clone(),
                None => Camera::looking_at_origin(w.max(1) as f32 / h.max(1) as f32),
            };
            let (ro, rd) = camera.screen_ray(mouse.x, mouse.y, w as f32, h as f32);
            if let Some((ci, vi)) = self.controller.hover(ro, rd, now_ms) {
                log::debug!("[constellation] pulse {}:{}", ci, vi);
            }
        }

        let out = self.controller.tick(
            now_ms,
            FrameInput {
                dt_sec,
                pointer_ndc: input::mouse_ndc(&mouse, w as f32, h as f32),
                scroll_px: self.input.scroll_px.get(),
            },
        );

        if let Some(overlay) = &mut self.overlay {
            overlay.set_progress(out.progress);
            if let Some(i) = out.phase_changed {
                if let Some(phase) = self.controller.phases().get(i) {
                    overlay.set_phase(phase);
                }
            }
            overlay.set_opacity(out.overlay_opacity);
            if out.completed {
                overlay.hide();
            }
        }

        if let Some(r) = &mut self.renderer {
            r.resize_if_needed(w, h);
            match r.render(&out, &self.controller, now_ms, dt_sec) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => r.reconfigure(),
                Err(e) => log::error!("[gpu] render error: {:?}", e),
            }
        }
        out.running
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> anyhow::Result<GpuContext> {
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    GpuContext::request(&instance, surface, canvas.width(), canvas.height()).await
}

/// Start the requestAnimationFrame loop.
///
/// `loaded` is raised from inside the controller's completion callback; the
/// JS `on_loaded` is invoked here after the frame borrow ends, so the page
/// may unmount from within it.
pub fn start_loop(
    ctx: Rc<RefCell<FrameContext>>,
    loaded: Rc<Cell<bool>>,
    on_loaded: Rc<RefCell<Option<js_sys::Function>>>,
) -> RafLoop {
    let callback: RafCallback = Rc::new(RefCell::new(None));
    let request_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let cancelled = Rc::new(Cell::new(false));

    let cb_slot = callback.clone();
    let id_slot = request_id.clone();
    let cancel_flag = cancelled.clone();
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        id_slot.set(None);
        if cancel_flag.get() {
            return;
        }
        let running = match ctx.try_borrow_mut() {
            Ok(mut c) => c.frame(ts),
            Err(_) => true,
        };
        if loaded.replace(false) {
            let cb = on_loaded.borrow_mut().take();
            if let Some(f) = cb {
                if let Err(e) = f.call0(&JsValue::NULL) {
                    log::error!("[loader] on_loaded threw: {:?}", e);
                }
            }
        }
        if running {
            RafLoop::request(&cb_slot, &id_slot, &cancel_flag);
        } else {
            log::info!("[loader] animation finished; frame loop stopped");
        }
    }) as Box<dyn FnMut(f64)>));

    RafLoop::request(&callback, &request_id, &cancelled);
    RafLoop {
        callback,
        request_id,
        cancelled,
    }
}
