//! Browser document surface (feature `web`)
//!
//! `WebDocument` drives a real page through `web-sys`, so the form and table
//! renderers work unchanged in the browser:
//!
//! ```rust,ignore
//! use formdeck::dom::web::WebDocument;
//! use formdeck::table::{TableCallbacks, TableRenderer};
//!
//! let doc = WebDocument::from_window().ok_or("no document")?;
//! let mut table = TableRenderer::new(&doc, "table", TableCallbacks::new())?;
//! table.render(&records);
//! ```
//!
//! Listener closures live in a registry shared by every clone of the
//! handle. Removing a listener unregisters it from its element before the
//! closure is dropped; dropping the last handle unregisters the rest.

use super::event::ListenerId;
use super::slots::Slots;
use super::surface::{Surface, SurfaceEvent};
use super::EventKind;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement,
    HtmlTextAreaElement,
};

/// A DOM event as seen by renderer listeners
pub struct WebEvent(web_sys::Event);

impl WebEvent {
    pub fn raw(&self) -> &web_sys::Event {
        &self.0
    }
}

impl SurfaceEvent for WebEvent {
    fn prevent_default(&self) {
        self.0.prevent_default();
    }

    fn stop_propagation(&self) {
        self.0.stop_propagation();
    }
}

struct WebListener {
    target: Element,
    kind: EventKind,
    callback: Closure<dyn Fn(web_sys::Event)>,
}

impl WebListener {
    fn detach(&self) {
        let result = self
            .target
            .remove_event_listener_with_callback(&self.kind.to_string(), self.callback.as_ref().unchecked_ref());
        if let Err(e) = result {
            tracing::warn!("Failed to detach {} listener: {:?}", self.kind, e);
        }
    }
}

#[derive(Default)]
struct Registry {
    listeners: Slots<WebListener>,
}

impl Drop for Registry {
    fn drop(&mut self) {
        for listener in self.listeners.values() {
            listener.detach();
        }
    }
}

/// Handle to a browser `Document`
#[derive(Clone)]
pub struct WebDocument {
    document: web_sys::Document,
    registry: Rc<RefCell<Registry>>,
}

/// Non-owning `WebDocument` handle for use inside listeners
#[derive(Clone)]
pub struct WeakWebDocument {
    document: web_sys::Document,
    registry: Weak<RefCell<Registry>>,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            registry: Rc::default(),
        }
    }

    /// The current window's document, if there is one
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    /// Listeners registered through this handle and still attached
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

impl std::fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDocument")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn log_failure<T>(op: &str, result: Result<T, wasm_bindgen::JsValue>) {
    if let Err(e) = result {
        tracing::warn!("DOM {} failed: {:?}", op, e);
    }
}

impl Surface for WebDocument {
    type Node = Element;
    type Event = WebEvent;
    type Weak = WeakWebDocument;

    fn downgrade(&self) -> WeakWebDocument {
        WeakWebDocument {
            document: self.document.clone(),
            registry: Rc::downgrade(&self.registry),
        }
    }

    fn upgrade(weak: &WeakWebDocument) -> Option<Self> {
        weak.registry.upgrade().map(|registry| WebDocument {
            document: weak.document.clone(),
            registry,
        })
    }

    fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn first_by_class(&self, class: &str) -> Option<Element> {
        self.document.get_elements_by_class_name(class).item(0)
    }

    fn create_element(&self, tag: &str) -> Element {
        // only rejects invalid tag names; surfaced to the JS caller
        match self.document.create_element(tag) {
            Ok(element) => element,
            Err(e) => wasm_bindgen::throw_val(e),
        }
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        log_failure("appendChild", parent.append_child(child));
    }

    fn insert_before(&self, parent: &Element, child: &Element, reference: &Element) {
        let before: Option<&web_sys::Node> = if reference.parent_element().as_ref() == Some(parent) {
            Some(reference.as_ref())
        } else {
            None
        };
        log_failure("insertBefore", parent.insert_before(child, before));
    }

    fn remove_node(&self, node: &Element) {
        node.remove();
    }

    fn clear_children(&self, node: &Element) {
        while let Some(child) = node.first_child() {
            if let Err(e) = node.remove_child(&child) {
                tracing::warn!("DOM removeChild failed: {:?}", e);
                break;
            }
        }
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        log_failure("setAttribute", node.set_attribute(name, value));
    }

    fn get_attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn add_class(&self, node: &Element, class: &str) {
        log_failure("classList.add", node.class_list().add_1(class));
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            log_failure("style.setProperty", el.style().set_property(property, value));
        }
    }

    fn value(&self, node: &Element) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn set_value(&self, node: &Element, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        }
    }

    fn checked(&self, node: &Element) -> bool {
        node.dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::checked)
            .unwrap_or(false)
    }

    fn set_checked(&self, node: &Element, checked: bool) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_checked(checked);
        }
    }

    fn add_listener<F>(&self, node: &Element, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&WebEvent) + 'static,
    {
        let callback = Closure::wrap(Box::new(move |event: web_sys::Event| handler(&WebEvent(event)))
            as Box<dyn Fn(web_sys::Event)>);
        log_failure(
            "addEventListener",
            node.add_event_listener_with_callback(&kind.to_string(), callback.as_ref().unchecked_ref()),
        );

        ListenerId(self.registry.borrow_mut().listeners.insert(WebListener {
            target: node.clone(),
            kind,
            callback,
        }))
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.registry.borrow_mut().listeners.remove(id.0);
        match removed {
            Some(listener) => {
                listener.detach();
                true
            }
            None => false,
        }
    }

    fn request_submit(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            log_failure("requestSubmit", form.request_submit());
        }
    }

    fn request_reset(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn reset_form(&self, form: &Element) {
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return;
        };
        let controls = form.elements();
        for i in 0..controls.length() {
            let Some(control) = controls.item(i) else {
                continue;
            };
            if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
                match input.type_().as_str() {
                    "checkbox" | "radio" => input.set_checked(input.default_checked()),
                    _ => input.set_value(&input.default_value()),
                }
            } else if let Some(area) = control.dyn_ref::<HtmlTextAreaElement>() {
                area.set_value(&area.default_value());
            } else if let Some(select) = control.dyn_ref::<HtmlSelectElement>() {
                reset_select(select);
            }
        }
    }

    fn scroll_to_top(&self) {
        if let Some(window) = web_sys::window() {
            window.scroll_to_with_x_and_y(0.0, 0.0);
        }
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }
}

/// Select the `selected`-attribute option, or the first one
fn reset_select(select: &HtmlSelectElement) {
    let mut any_default = false;
    for i in 0..select.length() {
        if let Some(option) = select.item(i).and_then(|o| o.dyn_into::<HtmlOptionElement>().ok()) {
            let default = option.default_selected();
            option.set_selected(default);
            any_default |= default;
        }
    }
    if !any_default && select.length() > 0 {
        select.set_selected_index(0);
    }
}
