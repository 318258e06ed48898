//! Browser resources owned by a mount's [`Lifetime`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;
use zodiac_core::{HandleId, Lifetime, Release};

pub type Handles = Rc<RefCell<Lifetime<WebHandle>>>;

pub type RafCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A self-rescheduling requestAnimationFrame loop.
pub struct RafLoop {
    pub callback: RafCallback,
    pub request_id: Rc<Cell<Option<i32>>>,
    pub cancelled: Rc<Cell<bool>>,
}

impl RafLoop {
    /// Queue the next frame unless the loop was released.
    pub fn request(callback: &RafCallback, request_id: &Cell<Option<i32>>, cancelled: &Cell<bool>) {
        if cancelled.get() {
            return;
        }
        let Some(w) = web::window() else { return };
        if let Some(cb) = callback.borrow().as_ref() {
            match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(id) => request_id.set(Some(id)),
                Err(e) => log::error!("[loader] requestAnimationFrame failed: {:?}", e),
            }
        }
    }
}

pub struct EventListener {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl EventListener {
    pub fn new(
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!(format!("addEventListener({}) failed: {:?}", event, e)))?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

pub struct Timeout {
    pub id: i32,
    pub closure: Closure<dyn FnMut()>,
}

pub enum WebHandle {
    Raf(RafLoop),
    Listener(EventListener),
    Timeout(Timeout),
}

/// Closures may be released from inside their own invocation (an unmount
/// triggered by the completion callback, a timer forgetting itself), so the
/// JS function is freed on a later microtask.
fn drop_later<T: 'static>(value: T) {
    spawn_local(async move {
        drop(value);
    });
}

impl Release for WebHandle {
    fn release(self) {
        match self {
            WebHandle::Raf(raf) => {
                raf.cancelled.set(true);
                if let (Some(id), Some(w)) = (raf.request_id.take(), web::window()) {
                    _ = w.cancel_animation_frame(id);
                }
                // breaks the closure's reference back to its own slot
                let closure = raf.callback.borrow_mut().take();
                drop_later(closure);
            }
            WebHandle::Listener(l) => {
                _ = l
                    .target
                    .remove_event_listener_with_callback(l.event, l.closure.as_ref().unchecked_ref());
                drop_later(l.closure);
            }
            WebHandle::Timeout(t) => {
                if let Some(w) = web::window() {
                    w.clear_timeout_with_handle(t.id);
                }
                drop_later(t.closure);
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            WebHandle::Raf(_) => "raf".to_string(),
            WebHandle::Listener(l) => format!("listener:{}", l.event),
            WebHandle::Timeout(t) => format!("timeout:{}", t.id),
        }
    }
}

/// Arm a one-shot timer owned by `handles`. The handle is forgotten once it
/// fires so the count of outstanding handles stays accurate.
pub fn set_timeout(
    handles: &Handles,
    delay_ms: f64,
    mut f: impl FnMut() + 'static,
) -> Option<HandleId> {
    let w = web::window()?;
    let slot: Rc<Cell<Option<HandleId>>> = Rc::new(Cell::new(None));
    let slot_cb = slot.clone();
    let handles_cb = Rc::downgrade(handles);
    let closure = Closure::wrap(Box::new(move || {
        if let (Some(handles), Some(id)) = (handles_cb.upgrade(), slot_cb.get()) {
            let fired = handles.borrow_mut().forget(id);
            drop_later(fired);
        }
        f();
    }) as Box<dyn FnMut()>);
    let delay = delay_ms.max(0.0).ceil().min(i32::MAX as f64) as i32;
    match w.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        delay,
    ) {
        Ok(id) => {
            let hid = handles
                .borrow_mut()
                .register(WebHandle::Timeout(Timeout { id, closure }));
            slot.set(Some(hid));
            Some(hid)
        }
        Err(e) => {
            log::error!("[loader] setTimeout failed: {:?}", e);
            None
        }
    }
}
