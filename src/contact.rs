use crate::constants::*;
use crate::dom;
use crate::handles::{set_timeout, EventListener, Handles, WebHandle};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys as web;
use zodiac_core::contact::{ContactForm, FormController, FormState, SimulatedSubmitter};
use zodiac_core::{HandleId, Lifetime};

type SharedForm = Rc<RefCell<FormController<SimulatedSubmitter>>>;

fn field_value(form: &web::HtmlFormElement, name: &str) -> String {
    let selector = format!("[name=\"{}\"]", name);
    let Ok(Some(el)) = form.query_selector(&selector) else {
        return String::new();
    };
    if let Some(input) = el.dyn_ref::<web::HtmlInputElement>() {
        return input.value();
    }
    if let Some(area) = el.dyn_ref::<web::HtmlTextAreaElement>() {
        return area.value();
    }
    String::new()
}

fn read_form(form: &web::HtmlFormElement) -> ContactForm {
    ContactForm {
        name: field_value(form, "name"),
        email: field_value(form, "email"),
        subject: field_value(form, "subject"),
        message: field_value(form, "message"),
    }
}

fn show_status(status: Option<&web::HtmlElement>, state: &FormState) {
    let Some(el) = status else { return };
    let text = match state {
        FormState::Idle => String::new(),
        FormState::Submitting { .. } => STATUS_SUBMITTING.to_string(),
        FormState::Success { .. } => STATUS_SUCCESS.to_string(),
        FormState::Error { reason, .. } => format!("{}{}", STATUS_ERROR_PREFIX, reason),
    };
    dom::set_text(el, &text);
    _ = el.set_attribute("data-state", state.key());
}

#[derive(Clone)]
struct FormWiring {
    handles: Weak<RefCell<Lifetime<WebHandle>>>,
    controller: SharedForm,
    status: Option<web::HtmlElement>,
    /// At most one timer is armed per form.
    pending: Rc<Cell<Option<HandleId>>>,
}

/// Arm a timer for the controller's next deadline; each firing advances the
/// state and re-arms until the form is idle again.
fn schedule_next(wiring: FormWiring) {
    let Some(handles) = wiring.handles.upgrade() else { return };
    if let Some(old) = wiring.pending.take() {
        handles.borrow_mut().release(old);
    }
    let Some(deadline) = wiring.controller.borrow().next_deadline() else { return };
    let delay = deadline - dom::now_ms();
    let w = wiring.clone();
    let id = set_timeout(&handles, delay, move || {
        w.pending.set(None);
        let changed = w.controller.borrow_mut().tick(dom::now_ms());
        if changed {
            show_status(w.status.as_ref(), w.controller.borrow().state());
        }
        schedule_next(w.clone());
    });
    wiring.pending.set(id);
}

/// Wire the contact form's submit event to a simulated submission.
/// Returns Ok(false) when the page has no contact form.
pub fn wire_contact_form(document: &web::Document, handles: &Handles) -> anyhow::Result<bool> {
    let Some(form) = dom::element_by_id::<web::HtmlFormElement>(document, CONTACT_FORM_ID) else {
        return Ok(false);
    };
    let status: Option<web::HtmlElement> = dom::element_by_id(document, CONTACT_STATUS_ID);
    let wiring = FormWiring {
        handles: Rc::downgrade(handles),
        controller: Rc::new(RefCell::new(FormController::new(
            SimulatedSubmitter::default(),
        ))),
        status,
        pending: Rc::new(Cell::new(None)),
    };

    let form_el = form.clone();
    let target: &web::EventTarget = form.as_ref();
    let l = EventListener::new(target, "submit", move |ev: web::Event| {
        ev.prevent_default();
        let submission = read_form(&form_el);
        let result = {
            let mut ctl = wiring.controller.borrow_mut();
            let was_in_flight = matches!(ctl.state(), FormState::Submitting { .. });
            let submitted = ctl
                .submit(&submission, dom::now_ms())
                .map(|s| (was_in_flight, s.clone()));
            submitted
        };
        match result {
            Ok((was_in_flight, state)) => {
                show_status(wiring.status.as_ref(), &state);
                if !was_in_flight {
                    schedule_next(wiring.clone());
                }
            }
            Err(e) => {
                log::info!("[contact] rejected: {}", e);
                if let Some(el) = &wiring.status {
                    dom::set_text(el, &format!("{}{}", STATUS_ERROR_PREFIX, e));
                    _ = el.set_attribute("data-state", "invalid");
                }
            }
        }
    })?;
    handles.borrow_mut().register(WebHandle::Listener(l));
    log::info!("[contact] form wired");
    Ok(true)
}
