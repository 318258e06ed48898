use crate::constants::*;
use crate::dom;
use crate::input;
use web_sys as web;
use zodiac_core::Phase;

/// The DOM half of the loading screen: progress bar, percent readout and
/// phase label. Elements the page does not provide are skipped.
pub struct LoaderOverlay {
    root: Option<web::HtmlElement>,
    bar: Option<web::HtmlElement>,
    percent: Option<web::HtmlElement>,
    label: Option<web::HtmlElement>,
    icon: Option<web::HtmlElement>,
    last_percent: String,
    last_opacity: f32,
}

impl LoaderOverlay {
    pub fn find(document: &web::Document) -> Self {
        let overlay = Self {
            root: dom::element_by_id(document, LOADER_ROOT_ID),
            bar: dom::element_by_id(document, PROGRESS_FILL_ID),
            percent: dom::element_by_id(document, PERCENT_ID),
            label: dom::element_by_id(document, PHASE_LABEL_ID),
            icon: dom::element_by_id(document, PHASE_ICON_ID),
            last_percent: String::new(),
            last_opacity: -1.0,
        };
        if overlay.root.is_none() {
            log::debug!("[loader] no #{} element; overlay updates skipped", LOADER_ROOT_ID);
        }
        if let Some(root) = &overlay.root {
            _ = root.class_list().remove_1(HIDDEN_CLASS);
        }
        overlay
    }

    pub fn set_progress(&mut self, progress: f32) {
        let text = input::percent_label(progress);
        if text == self.last_percent {
            return;
        }
        if let Some(bar) = &self.bar {
            dom::set_style(bar, "width", &format!("{:.2}%", progress.clamp(0.0, 100.0)));
        }
        if let Some(el) = &self.percent {
            dom::set_text(el, &text);
        }
        self.last_percent = text;
    }

    pub fn set_phase(&self, phase: &Phase) {
        if let Some(el) = &self.label {
            dom::set_text(el, &phase.label);
        }
        if let Some(el) = &self.icon {
            dom::set_text(el, input::glyph_for_icon(&phase.icon));
            _ = el.set_attribute("data-icon", &phase.icon);
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        if (opacity - self.last_opacity).abs() < 1e-3 {
            return;
        }
        if let Some(root) = &self.root {
            dom::set_style(root, "opacity", &format!("{:.3}", opacity.clamp(0.0, 1.0)));
        }
        self.last_opacity = opacity;
    }

    pub fn hide(&self) {
        if let Some(root) = &self.root {
            _ = root.class_list().add_1(HIDDEN_CLASS);
            // fallback for pages without the CSS class
            dom::set_style(root, "display", "none");
        }
    }
}
