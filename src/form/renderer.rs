//! Field renderer
//!
//! Turns a list of `FieldDescriptor`s into a `<form>` inside a container
//! element and keeps an internal key→value map in step with the controls.
//! Rendering goes through the `Surface` port; `Document` is the default.

use crate::dom::{Document, EventKind, ListenerId, Surface, SurfaceEvent};
use crate::form::descriptor::{sanitize_descriptors, FieldDescriptor, FieldType};
use crate::form::error::{FormError, FormResult};
use crate::form::notice::{Notice, NoticeKind};
use crate::record::{Record, UserId};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub type SubmitCallback = Box<dyn Fn(Record)>;
pub type ResetCallback = Box<dyn Fn()>;

/// Caller hooks for submit and reset
#[derive(Default)]
pub struct FormCallbacks {
    on_submit: Option<SubmitCallback>,
    on_reset: Option<ResetCallback>,
}

impl FormCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: called with the extracted record on submit
    pub fn on_submit(mut self, callback: impl Fn(Record) + 'static) -> Self {
        self.on_submit = Some(Box::new(callback));
        self
    }

    /// Builder method: called after the form is reset
    pub fn on_reset(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_reset = Some(Box::new(callback));
        self
    }
}

/// Presentation settings for a rendered form
#[derive(Debug, Clone)]
pub struct FormOptions {
    /// Class given to controls whose descriptor sets none
    pub default_class: String,
    /// Class of the `<form>` element
    pub form_class: String,
    /// How long a notice stays up
    pub notice_duration_ms: u64,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            default_class: "form-control".to_string(),
            form_class: "dynamic-form".to_string(),
            notice_duration_ms: 3000,
        }
    }
}

enum Control<N> {
    /// input, textarea or select
    Single(N),
    /// checkbox/radio inputs in option order
    Group(Vec<N>),
    Button(N),
}

struct BoundField<N> {
    descriptor: FieldDescriptor,
    control: Control<N>,
}

/// State reachable from listeners
struct FormShared<S: Surface> {
    doc: S::Weak,
    form: S::Node,
    fields: Vec<BoundField<S::Node>>,
    state: RefCell<Map<String, Value>>,
    editing: RefCell<Option<UserId>>,
    callbacks: FormCallbacks,
}

impl<S: Surface> FormShared<S> {
    fn read_field(&self, doc: &S, field: &BoundField<S::Node>) -> Option<Value> {
        match &field.control {
            Control::Button(_) => None,
            Control::Single(node) => Some(Value::String(doc.value(node))),
            Control::Group(inputs) => {
                let mut checked = inputs
                    .iter()
                    .filter(|n| doc.checked(n))
                    .map(|n| doc.value(n))
                    .filter(|v| !v.is_empty());

                if field.descriptor.field_type == FieldType::Checkbox {
                    Some(Value::Array(checked.map(Value::String).collect()))
                } else {
                    Some(Value::String(checked.next().unwrap_or_default()))
                }
            }
        }
    }

    fn sync_field(&self, idx: usize) {
        let Some(doc) = S::upgrade(&self.doc) else {
            return;
        };
        let field = &self.fields[idx];
        if let Some(value) = self.read_field(&doc, field) {
            self.state
                .borrow_mut()
                .insert(field.descriptor.key.clone(), value);
        }
    }

    fn sync_all(&self, doc: &S) {
        let mut state = self.state.borrow_mut();
        for field in &self.fields {
            if let Some(value) = self.read_field(doc, field) {
                state.insert(field.descriptor.key.clone(), value);
            }
        }
    }

    fn extract(&self, doc: &S) -> Record {
        let mut record = Record::new();
        for field in &self.fields {
            if let Some(value) = self.read_field(doc, field) {
                record.insert(field.descriptor.key.clone(), value);
            }
        }
        record
    }

    fn handle_submit(&self, event: &S::Event) {
        event.prevent_default();
        let Some(doc) = S::upgrade(&self.doc) else {
            return;
        };

        let mut record = self.extract(&doc);
        let editing = self.editing.borrow().clone();
        if let Some(id) = editing {
            record.set_user_id(id);
        }
        tracing::debug!("Form submitted with {} fields", record.len());

        if let Some(callback) = &self.callbacks.on_submit {
            callback(record);
        }

        doc.reset_form(&self.form);
        *self.editing.borrow_mut() = None;
        self.sync_all(&doc);
    }

    fn handle_reset(&self, event: &S::Event) {
        event.prevent_default();
        let Some(doc) = S::upgrade(&self.doc) else {
            return;
        };

        doc.reset_form(&self.form);
        *self.editing.borrow_mut() = None;
        self.sync_all(&doc);

        if let Some(callback) = &self.callbacks.on_reset {
            callback();
        }
    }
}

/// A rendered, live form
pub struct FieldRenderer<S: Surface = Document> {
    doc: S,
    container: S::Node,
    shared: Rc<FormShared<S>>,
    hidden: Vec<FieldDescriptor>,
    listeners: Vec<ListenerId>,
    notices: Vec<Notice<S::Node>>,
    options: FormOptions,
    destroyed: bool,
}

impl<S: Surface> FieldRenderer<S> {
    /// Render `descriptors` into the element with id `container_id`
    pub fn new(
        doc: &S,
        container_id: &str,
        descriptors: Vec<FieldDescriptor>,
        callbacks: FormCallbacks,
    ) -> FormResult<Self> {
        Self::with_options(doc, container_id, descriptors, callbacks, FormOptions::default())
    }

    /// Render from a JSON descriptor list
    pub fn from_json(
        doc: &S,
        container_id: &str,
        json: &str,
        callbacks: FormCallbacks,
        options: FormOptions,
    ) -> FormResult<Self> {
        let descriptors = crate::form::descriptor::parse_descriptors(json)?;
        Self::with_options(doc, container_id, descriptors, callbacks, options)
    }

    pub fn with_options(
        doc: &S,
        container_id: &str,
        descriptors: Vec<FieldDescriptor>,
        callbacks: FormCallbacks,
        options: FormOptions,
    ) -> FormResult<Self> {
        if container_id.trim().is_empty() {
            return Err(FormError::EmptyContainerId);
        }
        let container = doc
            .get_element_by_id(container_id)
            .ok_or_else(|| FormError::ContainerNotFound(container_id.to_string()))?;

        if descriptors.is_empty() {
            return Err(FormError::NoFields);
        }
        let descriptors = sanitize_descriptors(descriptors);
        if descriptors.is_empty() {
            return Err(FormError::NoValidFields);
        }

        let form = doc.create_element("form");
        doc.add_class(&form, &options.form_class);
        doc.append_child(&container, &form);

        let mut fields = Vec::new();
        let mut hidden = Vec::new();
        for descriptor in descriptors {
            if descriptor.field_type == FieldType::Hidden {
                hidden.push(descriptor);
                continue;
            }
            let control = build_control(doc, &form, &descriptor, &options);
            fields.push(BoundField {
                descriptor,
                control,
            });
        }

        let shared = Rc::new(FormShared {
            doc: doc.downgrade(),
            form,
            fields,
            state: RefCell::new(Map::new()),
            editing: RefCell::new(None),
            callbacks,
        });
        shared.sync_all(doc);

        let listeners = bind_listeners(doc, &shared);
        tracing::debug!(
            "Rendered form into {:?}: {} controls, {} hidden",
            container_id,
            shared.fields.len(),
            hidden.len()
        );

        Ok(Self {
            doc: doc.clone(),
            container,
            shared,
            hidden,
            listeners,
            notices: Vec::new(),
            options,
            destroyed: false,
        })
    }

    /// Snapshot of the live key→value map
    pub fn form_state(&self) -> Map<String, Value> {
        self.shared.state.borrow().clone()
    }

    pub fn value_of(&self, key: &str) -> Option<Value> {
        self.shared.state.borrow().get(key).cloned()
    }

    pub fn is_editing(&self) -> bool {
        self.shared.editing.borrow().is_some()
    }

    pub fn editing_id(&self) -> Option<UserId> {
        self.shared.editing.borrow().clone()
    }

    pub fn cancel_edit(&self) {
        *self.shared.editing.borrow_mut() = None;
    }

    /// Load `data` into the controls and enter editing mode
    ///
    /// `data` must carry a `userId`; the next submit re-attaches it.
    pub fn update_form_data(&mut self, data: &Record) -> FormResult<()> {
        if self.destroyed {
            tracing::warn!("Ignoring form data for a destroyed form");
            return Err(FormError::Destroyed);
        }
        let Some(id) = data.user_id() else {
            tracing::error!("Cannot edit record: userId is missing");
            self.show_notice("Cannot edit a record without a userId", NoticeKind::Error);
            return Err(FormError::MissingUserId);
        };

        *self.shared.editing.borrow_mut() = Some(id);

        for field in &self.shared.fields {
            let Some(value) = data.get(&field.descriptor.key) else {
                continue;
            };

            match &field.control {
                Control::Single(node) => self.doc.set_value(node, &value_to_text(value)),
                Control::Group(inputs) if field.descriptor.field_type == FieldType::Checkbox => {
                    let wanted = value_to_list(value);
                    for input in inputs {
                        let on = wanted.contains(&self.doc.value(input));
                        self.doc.set_checked(input, on);
                    }
                }
                Control::Group(inputs) => {
                    let wanted = value_to_text(value);
                    for input in inputs {
                        let on = self.doc.value(input) == wanted;
                        self.doc.set_checked(input, on);
                    }
                }
                Control::Button(_) => {}
            }
        }

        self.shared.sync_all(&self.doc);
        Ok(())
    }

    /// Fire a submit, as if the user pressed the submit button
    pub fn submit(&self) {
        if !self.destroyed {
            self.doc.request_submit(&self.shared.form);
        }
    }

    /// Fire a reset, as if the user pressed the reset button
    pub fn reset(&self) {
        if !self.destroyed {
            self.doc.request_reset(&self.shared.form);
        }
    }

    /// Number of rendered controls (a checkbox/radio group counts once)
    pub fn control_count(&self) -> usize {
        self.shared.fields.len()
    }

    /// Nodes rendered for `key`
    pub fn controls(&self, key: &str) -> Vec<S::Node> {
        self.shared
            .fields
            .iter()
            .filter(|f| f.descriptor.key == key)
            .flat_map(|f| match &f.control {
                Control::Single(n) | Control::Button(n) => vec![n.clone()],
                Control::Group(inputs) => inputs.clone(),
            })
            .collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.shared.fields.iter().map(|f| &f.descriptor)
    }

    pub fn hidden_fields(&self) -> &[FieldDescriptor] {
        &self.hidden
    }

    pub fn form_element(&self) -> S::Node {
        self.shared.form.clone()
    }

    pub fn container(&self) -> S::Node {
        self.container.clone()
    }

    /// Show a timed message above the form
    pub fn show_notice(&mut self, message: &str, kind: NoticeKind) -> Option<S::Node> {
        self.show_notice_at(message, kind, Utc::now())
    }

    /// Like `show_notice`, timed from `now`; a destroyed form shows nothing
    pub fn show_notice_at(&mut self, message: &str, kind: NoticeKind, now: DateTime<Utc>) -> Option<S::Node> {
        if self.destroyed {
            return None;
        }
        let node = self.doc.create_element("div");
        self.doc.add_class(&node, "form-message");
        self.doc.add_class(&node, kind.as_class());
        self.doc.set_attribute(&node, "role", "alert");
        self.doc.set_text(&node, message);
        self.doc.insert_before(&self.container, &node, &self.shared.form);

        let ttl = Duration::milliseconds(self.options.notice_duration_ms as i64);
        self.notices.push(Notice::new(node.clone(), kind, message, now, ttl));
        Some(node)
    }

    /// Remove notices whose time is up; returns how many went
    pub fn clear_expired_notices(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.notices.len();
        let doc = &self.doc;
        self.notices.retain(|notice| {
            if notice.is_expired(now) {
                doc.remove_node(&notice.node);
                false
            } else {
                true
            }
        });
        before - self.notices.len()
    }

    pub fn notices(&self) -> &[Notice<S::Node>] {
        &self.notices
    }

    /// Detach all listeners and empty the container; safe to call twice
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for id in self.listeners.drain(..) {
            self.doc.remove_listener(id);
        }
        self.doc.clear_children(&self.container);
        self.notices.clear();
        *self.shared.editing.borrow_mut() = None;
        self.destroyed = true;
        tracing::debug!("Form destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// HTML of everything rendered in the container
    pub fn to_html(&self) -> String {
        self.doc.inner_html(&self.container)
    }
}

impl<S: Surface> std::fmt::Debug for FieldRenderer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRenderer")
            .field("controls", &self.shared.fields.len())
            .field("hidden", &self.hidden.len())
            .field("editing", &self.editing_id())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

fn bind_listeners<S: Surface>(doc: &S, shared: &Rc<FormShared<S>>) -> Vec<ListenerId> {
    let mut listeners = Vec::new();

    for (idx, field) in shared.fields.iter().enumerate() {
        let targets: Vec<(&S::Node, EventKind)> = match &field.control {
            Control::Single(node) if field.descriptor.field_type == FieldType::Select => {
                vec![(node, EventKind::Change)]
            }
            Control::Single(node) => vec![(node, EventKind::Input)],
            Control::Group(inputs) => inputs.iter().map(|n| (n, EventKind::Change)).collect(),
            Control::Button(_) => Vec::new(),
        };

        for (node, kind) in targets {
            let shared = Rc::clone(shared);
            listeners.push(doc.add_listener(node, kind, move |_: &S::Event| shared.sync_field(idx)));
        }
    }

    let on_submit = Rc::clone(shared);
    listeners.push(doc.add_listener(&shared.form, EventKind::Submit, move |e: &S::Event| {
        on_submit.handle_submit(e)
    }));

    let on_reset = Rc::clone(shared);
    listeners.push(doc.add_listener(&shared.form, EventKind::Reset, move |e: &S::Event| {
        on_reset.handle_reset(e)
    }));

    listeners
}

fn build_control<S: Surface>(
    doc: &S,
    form: &S::Node,
    descriptor: &FieldDescriptor,
    options: &FormOptions,
) -> Control<S::Node> {
    let key = descriptor.key.as_str();
    let is_group = matches!(descriptor.field_type, FieldType::Checkbox | FieldType::Radio);

    let parent = match &descriptor.label {
        Some(text) => {
            let group = doc.create_element("div");
            doc.add_class(&group, "form-group");
            let label = doc.create_element("label");
            if !is_group {
                doc.set_attribute(&label, "for", &control_id(descriptor));
            }
            doc.set_text(&label, text);
            doc.append_child(&group, &label);
            doc.append_child(form, &group);
            group
        }
        None => form.clone(),
    };

    let default = descriptor.value.as_ref().map(value_to_text).unwrap_or_default();
    // an explicit value wins over a `value` attribute
    let seeded = match &descriptor.value {
        Some(_) => default.clone(),
        None => descriptor.attr.get("value").and_then(attr_text).unwrap_or_default(),
    };

    let (root, control) = match descriptor.field_type {
        FieldType::Textarea => {
            let area = doc.create_element("textarea");
            doc.set_attribute(&area, "id", &control_id(descriptor));
            apply_attrs(doc, &area, &descriptor.attr, &options.default_class);
            doc.set_attribute(&area, "name", key);
            doc.set_text(&area, &seeded);
            doc.set_value(&area, &seeded);
            (area.clone(), Control::Single(area))
        }
        FieldType::Select => {
            let select = doc.create_element("select");
            doc.set_attribute(&select, "id", &control_id(descriptor));
            apply_attrs(doc, &select, &descriptor.attr, &options.default_class);
            doc.set_attribute(&select, "name", key);

            for opt in &descriptor.options {
                let option = doc.create_element("option");
                doc.set_attribute(&option, "value", &opt.value);
                if let Some(attr) = &opt.attr {
                    if let Some(id) = &attr.id {
                        doc.set_attribute(&option, "id", id);
                    }
                    if let Some(class) = &attr.class_name {
                        doc.set_attribute(&option, "class", class);
                    }
                }
                if opt.value == seeded {
                    doc.set_attribute(&option, "selected", "");
                }
                doc.set_text(&option, opt.display_label());
                doc.append_child(&select, &option);
            }

            let initial = if descriptor.options.iter().any(|o| o.value == seeded) {
                seeded.clone()
            } else {
                descriptor.options.first().map(|o| o.value.clone()).unwrap_or_default()
            };
            doc.set_value(&select, &initial);
            (select.clone(), Control::Single(select))
        }
        FieldType::Checkbox | FieldType::Radio => {
            let group = doc.create_element("div");
            apply_attrs(doc, &group, &descriptor.attr, "");
            doc.add_class(&group, "choice-group");

            let defaults = descriptor.value.as_ref().map(value_to_list).unwrap_or_default();
            let mut inputs = Vec::with_capacity(descriptor.options.len());

            for (i, opt) in descriptor.options.iter().enumerate() {
                let item = doc.create_element("div");
                doc.add_class(&item, "choice-item");

                let input = doc.create_element("input");
                let attr = opt.attr.clone().unwrap_or_default();
                let id = attr.id.unwrap_or_else(|| format!("{}-{}", key, i));
                doc.set_attribute(&input, "type", &descriptor.field_type.to_string());
                doc.set_attribute(&input, "name", key);
                doc.set_attribute(&input, "id", &id);
                doc.set_attribute(&input, "value", &opt.value);
                doc.set_attribute(
                    &input,
                    "class",
                    attr.class_name.as_deref().unwrap_or("form-check-input"),
                );
                if defaults.contains(&opt.value) {
                    doc.set_attribute(&input, "checked", "");
                    doc.set_checked(&input, true);
                }

                let label = doc.create_element("label");
                doc.set_attribute(&label, "for", &id);
                doc.set_text(&label, opt.display_label());

                doc.append_child(&item, &input);
                doc.append_child(&item, &label);
                doc.append_child(&group, &item);
                inputs.push(input);
            }
            (group, Control::Group(inputs))
        }
        FieldType::Submit | FieldType::Reset => {
            let button = doc.create_element("button");
            doc.set_attribute(&button, "id", &control_id(descriptor));
            apply_attrs(doc, &button, &descriptor.attr, "btn");
            doc.set_attribute(&button, "type", &descriptor.field_type.to_string());
            doc.set_attribute(&button, "name", key);
            let text = if default.is_empty() {
                descriptor.field_type.action_word().unwrap_or_default().to_string()
            } else {
                default.clone()
            };
            doc.set_text(&button, &text);
            (button.clone(), Control::Button(button))
        }
        _ => {
            let input = doc.create_element("input");
            doc.set_attribute(&input, "id", &control_id(descriptor));
            apply_attrs(doc, &input, &descriptor.attr, &options.default_class);
            doc.set_attribute(&input, "type", descriptor.field_type.input_type().unwrap_or("text"));
            doc.set_attribute(&input, "name", key);
            if !default.is_empty() {
                doc.set_attribute(&input, "value", &default);
            }
            doc.set_value(&input, &seeded);
            (input.clone(), Control::Single(input))
        }
    };

    doc.set_attribute(&root, "data-field", key);
    doc.append_child(&parent, &root);
    control
}

fn control_id(descriptor: &FieldDescriptor) -> String {
    descriptor
        .attr
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| descriptor.key.clone())
}

/// Attribute text for a scalar; `None` means the attribute is omitted
///
/// Booleans follow HTML semantics: `true` sets an empty attribute, `false`
/// omits it.
fn attr_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some(String::new()),
        _ => None,
    }
}

/// Copy descriptor attributes onto `node`
///
/// `name` belongs to the key and inline `on*` handlers are never copied.
fn apply_attrs<S: Surface>(doc: &S, node: &S::Node, attrs: &Map<String, Value>, default_class: &str) {
    let mut has_class = false;

    for (name, value) in attrs {
        let name = if name == "className" { "class" } else { name.as_str() };

        if name.eq_ignore_ascii_case("name") {
            continue;
        }
        let inline_handler = name.len() > 2
            && name.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"));
        if inline_handler {
            tracing::warn!("Ignoring inline handler attribute {:?}", name);
            continue;
        }

        let Some(text) = attr_text(value) else {
            if !matches!(value, Value::Bool(false)) {
                tracing::warn!("Ignoring non-scalar attribute {:?}", name);
            }
            continue;
        };

        if name == "class" {
            has_class = true;
        }
        doc.set_attribute(node, name, &text);
    }

    if !has_class && !default_class.is_empty() {
        doc.add_class(node, default_class);
    }
}

/// Render a field value as control text
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_to_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Membership list for checkbox values; a scalar counts as one item
fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        other => vec![value_to_text(other)],
    }
}
