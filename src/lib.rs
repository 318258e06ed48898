#![cfg(target_arch = "wasm32")]
use crate::constants::CANVAS_ID;
use crate::events::InputCells;
use crate::frame::FrameContext;
use crate::handles::{Handles, WebHandle};
use crate::overlay::LoaderOverlay;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use zodiac_core::{Lifetime, RevealConfig, RevealController};
use zodiac_render::Renderer;

mod constants;
mod contact;
mod dom;
mod events;
mod frame;
mod handles;
mod input;
mod overlay;

thread_local! {
    // Loader started from `start()`; replaced by any explicit `mount`
    static AUTO_MOUNT: RefCell<Option<LoaderHandle>> = const { RefCell::new(None) };
    // Page-level listeners (the contact form); independent of any loader mount
    static PAGE_HANDLES: RefCell<Option<Handles>> = const { RefCell::new(None) };
}

struct Mounted {
    ctx: Rc<RefCell<FrameContext>>,
    on_loaded: Rc<RefCell<Option<js_sys::Function>>>,
}

/// A mounted loader. Dropping it (or `free()` from JS) unmounts.
#[wasm_bindgen]
pub struct LoaderHandle {
    handles: Handles,
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl LoaderHandle {
    /// Stop the frame loop, remove every listener and timer, and release the
    /// GPU resources. A pending `on_loaded` is never called afterwards.
    pub fn unmount(&mut self) {
        let Some(m) = self.mounted.take() else { return };
        m.on_loaded.borrow_mut().take();
        match self.handles.try_borrow_mut() {
            Ok(mut l) => l.release_all(),
            Err(_) => log::error!("[loader] unmount while handles are busy"),
        }
        match m.ctx.try_borrow_mut() {
            Ok(mut c) => {
                c.controller.unmount();
                c.renderer = None;
                if let Some(o) = &c.overlay {
                    o.hide();
                }
            }
            Err(_) => log::error!("[loader] unmount while a frame is running"),
        };
        log::debug!(
            "[loader] {} handles outstanding after unmount",
            self.outstanding_handles()
        );
    }

    pub fn outstanding_handles(&self) -> usize {
        self.handles.try_borrow().map_or(0, |l| l.outstanding())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn progress(&self) -> f32 {
        self.mounted
            .as_ref()
            .and_then(|m| m.ctx.try_borrow().ok().map(|c| c.controller.progress()))
            .unwrap_or(0.0)
    }

    /// Replace the constellation dataset with `[{ "name", "points" }]` JSON.
    pub fn set_constellations(&mut self, json: &str) -> Result<(), JsValue> {
        let Some(m) = &self.mounted else {
            return Err(JsValue::from_str("loader is not mounted"));
        };
        let list = RevealConfig::constellations_from_json(json).map_err(to_js)?;
        let mut c = m
            .ctx
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("loader is busy"))?;
        c.controller.replace_constellations(list).map_err(to_js)?;
        let FrameContext {
            controller,
            renderer,
            ..
        } = &mut *c;
        if let Some(r) = renderer {
            r.rebuild_constellations(controller.sequencer().constellations());
        }
        log::info!(
            "[constellation] dataset replaced ({} figures)",
            controller.sequencer().constellations().len()
        );
        Ok(())
    }
}

impl Drop for LoaderHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("zodiac-web starting");

    let Some(document) = dom::window_document() else {
        return Ok(());
    };
    wire_page(&document);
    if let Some(canvas) = document.get_element_by_id(CANVAS_ID) {
        let config_json = canvas.get_attribute("data-config");
        match mount_inner(CANVAS_ID, config_json, None) {
            Ok(h) => AUTO_MOUNT.with(|m| *m.borrow_mut() = Some(h)),
            Err(e) => log::error!("[loader] auto-mount failed: {:?}", e),
        }
    }
    Ok(())
}

/// Wire page-level behaviour once. Loader mounts come and go without
/// touching these handles.
fn wire_page(document: &web_sys::Document) {
    if PAGE_HANDLES.with(|p| p.borrow().is_some()) {
        return;
    }
    let page: Handles = Rc::new(RefCell::new(Lifetime::new()));
    if let Err(e) = contact::wire_contact_form(document, &page) {
        log::error!("[contact] wiring failed: {:?}", e);
    }
    PAGE_HANDLES.with(|p| *p.borrow_mut() = Some(page));
}

/// Mount a loader on `canvas_id`. `config_json` is merged over the preset it
/// names (`{"preset": "hero_backdrop", ...}`); `on_loaded` is called once the
/// exit fade has finished.
#[wasm_bindgen]
pub fn mount(
    canvas_id: &str,
    config_json: Option<String>,
    on_loaded: Option<js_sys::Function>,
) -> Result<LoaderHandle, JsValue> {
    // an explicit mount takes over from the automatic one
    let auto = AUTO_MOUNT.with(|m| m.borrow_mut().take());
    drop(auto);
    mount_inner(canvas_id, config_json, on_loaded).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

fn mount_inner(
    canvas_id: &str,
    config_json: Option<String>,
    on_loaded: Option<js_sys::Function>,
) -> anyhow::Result<LoaderHandle> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::canvas_by_id(&document, canvas_id)?;

    let config = match config_json.as_deref() {
        Some(json) => RevealConfig::from_json(json)?,
        None => RevealConfig::default(),
    };
    let loaded = Rc::new(Cell::new(false));
    let loaded_flag = loaded.clone();
    let on_complete: Box<dyn FnOnce()> = Box::new(move || loaded_flag.set(true));
    let show_overlay = config.show_overlay;
    let mut controller = RevealController::new(config, Some(on_complete))?;
    controller.start(dom::now_ms());

    let handles: Handles = Rc::new(RefCell::new(Lifetime::new()));
    let input = InputCells::default();
    events::wire_input_handlers(&canvas, &handles, &input)?;

    let ctx = Rc::new(RefCell::new(FrameContext {
        controller,
        renderer: None,
        overlay: show_overlay.then(|| LoaderOverlay::find(&document)),
        canvas: canvas.clone(),
        input,
        last_ms: None,
    }));
    let on_loaded = Rc::new(RefCell::new(on_loaded));
    let raf = frame::start_loop(ctx.clone(), loaded, on_loaded.clone());
    handles.borrow_mut().register(WebHandle::Raf(raf));

    // WebGPU comes up asynchronously; until then (or without it) the DOM
    // overlay still runs progress, phases and completion
    let ctx_gpu = Rc::downgrade(&ctx);
    spawn_local(async move {
        match frame::init_gpu(&canvas).await {
            Ok(gpu) => {
                let Some(ctx) = ctx_gpu.upgrade() else { return };
                let Ok(mut c) = ctx.try_borrow_mut() else { return };
                if c.controller.is_unmounted() {
                    return;
                }
                let renderer = Renderer::new(gpu, &c.controller);
                c.renderer = Some(renderer);
            }
            Err(e) => log::error!("[gpu] WebGPU init error, continuing without starfield: {:?}", e),
        }
    });

    log::info!("[loader] mounted on #{}", canvas_id);
    Ok(LoaderHandle {
        handles,
        mounted: Some(Mounted { ctx, on_loaded }),
    })
}
