//! Document Surface
//!
//! An in-memory element tree that the form and table renderers draw into.
//! It plays the part of the browser document: elements with attributes,
//! styles and live `value`/`checked` properties, event listeners with
//! bubbling, and the browser's default actions for clicks on toggles and
//! submit/reset buttons.
//!
//! `Document` is a cheap `Rc` handle. Listener handlers run after the tree
//! borrow is released, so a handler may freely read or mutate the document.
//! Handlers that need the document should hold a `WeakDocument` to avoid a
//! reference cycle through the listener table.
//!
//! The renderers only see the `Surface` trait, which `Document` implements;
//! `web::WebDocument` (feature `web`) implements it over a browser page.
//!
//! # Example
//!
//! ```rust
//! use formdeck::dom::{Document, EventKind};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let doc = Document::new();
//! let button = doc.create_element("button");
//! doc.append_child(doc.body(), button);
//!
//! let clicks = Rc::new(Cell::new(0));
//! let counter = clicks.clone();
//! doc.add_listener(button, EventKind::Click, move |_| counter.set(counter.get() + 1));
//!
//! doc.click(button);
//! assert_eq!(clicks.get(), 1);
//! ```

mod event;
mod html;
mod slots;
mod surface;
#[cfg(feature = "web")]
pub mod web;

pub use event::{Event, EventKind, ListenerId};
pub use html::{escape_attr, escape_text};
pub use slots::SlotKey;
pub use surface::{Surface, SurfaceEvent};

use event::{Handler, Listener};
use slots::Slots;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::{Rc, Weak};

/// Handle to a node in a `Document`
///
/// Slots of removed nodes are reused, but a handle to a removed node never
/// resolves again, not even to the node that took its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(SlotKey);

pub(crate) struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub value: String,
    pub checked: bool,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            styles: BTreeMap::new(),
            value: String::new(),
            checked: false,
        }
    }

    fn input_type(&self) -> &str {
        self.attrs.get("type").map(String::as_str).unwrap_or("text")
    }

    /// Checkbox or radio input
    pub fn is_toggle(&self) -> bool {
        self.tag == "input" && matches!(self.input_type(), "checkbox" | "radio")
    }
}

pub(crate) enum NodeData {
    Element(Element),
    Text(String),
}

pub(crate) struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

pub(crate) struct Tree {
    nodes: Slots<Node>,
    listeners: Slots<Listener>,
    body: NodeId,
    scroll_requests: usize,
}

impl Tree {
    fn new() -> Self {
        let mut nodes = Slots::new();
        let body = NodeId(nodes.insert(Node {
            data: NodeData::Element(Element::new("body")),
            parent: None,
            children: Vec::new(),
        }));
        Self {
            nodes,
            listeners: Slots::new(),
            body,
            scroll_requests: 0,
        }
    }

    fn insert(&mut self, data: NodeData) -> NodeId {
        NodeId(self.nodes.insert(Node {
            data,
            parent: None,
            children: Vec::new(),
        }))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.node_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        match &node.data {
            NodeData::Text(text) => text.clone(),
            NodeData::Element(_) => node
                .children
                .iter()
                .map(|&c| self.text_content(c))
                .collect(),
        }
    }

    /// Pre-order descendants of `root`, excluding `root`
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .node(root)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// `id` followed by its ancestors
    fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.node(id).map(|_| id);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.node(current).and_then(|n| n.parent);
        }
        path
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old_parent) = self.node(child).and_then(|n| n.parent) {
            if let Some(p) = self.node_mut(old_parent) {
                p.children.retain(|&c| c != child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    /// Drop `id` and everything under it, with their listeners
    fn free_subtree(&mut self, id: NodeId) {
        self.detach(id);
        let mut freed: HashSet<NodeId> = self.descendants(id).into_iter().collect();
        freed.insert(id);
        for &n in &freed {
            self.nodes.remove(n.0);
        }
        self.listeners.retain(|_, l| !freed.contains(&l.node));
    }

    fn option_value(&self, option: NodeId) -> String {
        self.element(option)
            .and_then(|el| el.attrs.get("value").cloned())
            .unwrap_or_else(|| self.text_content(option))
    }

    fn options_of(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|&n| self.element(n).map(|el| el.tag == "option").unwrap_or(false))
            .collect()
    }

    fn enclosing_form(&self, id: NodeId) -> Option<NodeId> {
        self.path_to_root(id)
            .into_iter()
            .skip(1)
            .find(|&n| self.element(n).map(|el| el.tag == "form").unwrap_or(false))
    }
}

/// Declared default of a form control
enum ControlDefault {
    Checked(bool),
    Value(String),
}

/// What a click does after listeners have run
enum Activation {
    Toggle,
    Submit(NodeId),
    Reset(NodeId),
    None,
}

/// Shared handle to an in-memory document
#[derive(Clone)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

/// Non-owning document handle for use inside listeners
#[derive(Clone)]
pub struct WeakDocument {
    tree: Weak<RefCell<Tree>>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.tree.upgrade().map(|tree| Document { tree })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("Document")
            .field("nodes", &tree.nodes.len())
            .field("listeners", &tree.listeners.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document with a `<body>` root
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new())),
        }
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            tree: Rc::downgrade(&self.tree),
        }
    }

    pub fn body(&self) -> NodeId {
        self.tree.borrow().body
    }

    // ---- construction ----

    /// Create a detached element
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree
            .borrow_mut()
            .insert(NodeData::Element(Element::new(tag)))
    }

    /// Create a detached text node
    pub fn create_text(&self, text: &str) -> NodeId {
        self.tree
            .borrow_mut()
            .insert(NodeData::Text(text.to_string()))
    }

    /// Append `child` to `parent`, moving it if it already has a parent
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if tree.node(parent).is_none() || tree.node(child).is_none() || parent == child {
            return;
        }
        tree.detach(child);
        if let Some(p) = tree.node_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = tree.node_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Insert `child` into `parent` before `reference`; appends when
    /// `reference` is not a child of `parent`
    pub fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if tree.node(parent).is_none() || tree.node(child).is_none() || parent == child {
            return;
        }
        tree.detach(child);
        if let Some(p) = tree.node_mut(parent) {
            let idx = p
                .children
                .iter()
                .position(|&c| c == reference)
                .unwrap_or(p.children.len());
            p.children.insert(idx, child);
        }
        if let Some(c) = tree.node_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Detach `node` and drop it with its subtree and listeners
    pub fn remove_node(&self, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if tree.node(node).is_some() && node != tree.body {
            tree.free_subtree(node);
        }
    }

    /// Remove every child of `node` (the `innerHTML = ''` of this surface)
    pub fn clear_children(&self, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        let children = tree.node(node).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            tree.free_subtree(child);
        }
    }

    // ---- attributes, text, style ----

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.tree.borrow_mut().element_mut(node) {
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .element(node)
            .and_then(|el| el.attrs.get(name).cloned())
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(el) = self.tree.borrow_mut().element_mut(node) {
            el.attrs.remove(name);
        }
    }

    /// Add `class` to the element's class list
    pub fn add_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.tree.borrow_mut().element_mut(node) {
            let current = el.attrs.entry("class".to_string()).or_default();
            if !current.split_whitespace().any(|c| c == class) {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(class);
            }
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get_attribute(node, "class")
            .map(|c| c.split_whitespace().any(|x| x == class))
            .unwrap_or(false)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().element(node).map(|el| el.tag.clone())
    }

    /// Replace the children of `node` with a single text node
    pub fn set_text(&self, node: NodeId, text: &str) {
        self.clear_children(node);
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.borrow().text_content(node)
    }

    pub fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.tree.borrow_mut().element_mut(node) {
            el.styles.insert(property.to_string(), value.to_string());
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree
            .borrow()
            .element(node)
            .and_then(|el| el.styles.get(property).cloned())
    }

    // ---- live properties ----

    /// Current value; toggles report their `value` attribute (default "on")
    pub fn value(&self, node: NodeId) -> String {
        let tree = self.tree.borrow();
        match tree.element(node) {
            Some(el) if el.is_toggle() => el.attrs.get("value").cloned().unwrap_or_else(|| "on".to_string()),
            Some(el) => el.value.clone(),
            None => String::new(),
        }
    }

    /// Set the current value
    ///
    /// A select only takes values one of its options carries; anything else
    /// leaves it with no selection (""), as browsers do.
    pub fn set_value(&self, node: NodeId, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let (is_toggle, is_select) = match tree.element(node) {
            Some(el) => (el.is_toggle(), el.tag == "select"),
            None => return,
        };

        if is_toggle {
            if let Some(el) = tree.element_mut(node) {
                el.attrs.insert("value".to_string(), value.to_string());
            }
            return;
        }

        let resolved = if is_select {
            let matches = tree
                .options_of(node)
                .into_iter()
                .any(|opt| tree.option_value(opt) == value);
            if matches {
                value.to_string()
            } else {
                String::new()
            }
        } else {
            value.to_string()
        };

        if let Some(el) = tree.element_mut(node) {
            el.value = resolved;
        }
    }

    pub fn checked(&self, node: NodeId) -> bool {
        self.tree
            .borrow()
            .element(node)
            .map(|el| el.checked)
            .unwrap_or(false)
    }

    /// Set the checked state; checking a radio unchecks its group
    pub fn set_checked(&self, node: NodeId, checked: bool) {
        let mut tree = self.tree.borrow_mut();
        let group = match tree.element(node) {
            Some(el) if checked && el.tag == "input" && el.input_type() == "radio" => {
                el.attrs.get("name").cloned()
            }
            Some(_) => None,
            None => return,
        };

        if let Some(name) = group {
            let scope = tree.enclosing_form(node).unwrap_or(tree.body);
            let peers: Vec<NodeId> = tree
                .descendants(scope)
                .into_iter()
                .filter(|&n| {
                    n != node
                        && tree
                            .element(n)
                            .map(|el| {
                                el.tag == "input"
                                    && el.input_type() == "radio"
                                    && el.attrs.get("name") == Some(&name)
                            })
                            .unwrap_or(false)
                })
                .collect();
            for peer in peers {
                if let Some(el) = tree.element_mut(peer) {
                    el.checked = false;
                }
            }
        }

        if let Some(el) = tree.element_mut(node) {
            el.checked = checked;
        }
    }

    // ---- lookup ----

    /// Find an attached element by its `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(tree.body).into_iter().find(|&n| {
            tree.element(n)
                .map(|el| el.attrs.get("id").map(String::as_str) == Some(id))
                .unwrap_or(false)
        })
    }

    /// First attached element carrying `class`
    pub fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.elements_by_class(self.body(), class).into_iter().next()
    }

    pub fn elements_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.find_all(root, |el| {
            el.attrs
                .get("class")
                .map(|c| c.split_whitespace().any(|x| x == class))
                .unwrap_or(false)
        })
    }

    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.find_all(root, |el| el.tag == tag)
    }

    pub fn elements_by_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.find_all(root, |el| el.attrs.get("name").map(String::as_str) == Some(name))
    }

    /// Elements under `root` that carry attribute `name`
    pub fn elements_with_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.find_all(root, |el| el.attrs.contains_key(name))
    }

    fn find_all(&self, root: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(root)
            .into_iter()
            .filter(|&n| tree.element(n).map(&pred).unwrap_or(false))
            .collect()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(node).and_then(|n| n.parent)
    }

    /// Whether `node` still exists
    pub fn contains(&self, node: NodeId) -> bool {
        self.tree.borrow().node(node).is_some()
    }

    pub fn enclosing_form(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().enclosing_form(node)
    }

    // ---- events ----

    pub fn add_listener(
        &self,
        node: NodeId,
        kind: EventKind,
        handler: impl Fn(&Event) + 'static,
    ) -> ListenerId {
        let handler: Handler = Rc::new(handler);
        ListenerId(self.tree.borrow_mut().listeners.insert(Listener {
            node,
            kind,
            handler,
        }))
    }

    /// Remove a listener; returns false if it was already gone
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.tree.borrow_mut().listeners.remove(id.0).is_some()
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.tree.borrow().listeners.len()
    }

    /// Number of live nodes, the body included
    pub fn node_count(&self) -> usize {
        self.tree.borrow().nodes.len()
    }

    /// Node and listener slots allocated so far, live or free
    pub fn allocated_slots(&self) -> usize {
        let tree = self.tree.borrow();
        tree.nodes.capacity() + tree.listeners.capacity()
    }

    /// Dispatch `kind` at `target`, bubbling to ancestors
    pub fn dispatch(&self, target: NodeId, kind: EventKind) -> Event {
        let event = Event::new(kind, target);
        let path = self.tree.borrow().path_to_root(target);

        for node in path {
            let handlers: Vec<Handler> = self
                .tree
                .borrow()
                .listeners
                .values()
                .filter(|l| l.node == node && l.kind == kind)
                .map(|l| l.handler.clone())
                .collect();

            for handler in handlers {
                handler(&event);
            }

            if event.propagation_stopped() {
                break;
            }
        }

        event
    }

    /// Type into an input or textarea
    pub fn input_text(&self, node: NodeId, text: &str) {
        self.set_value(node, text);
        self.dispatch(node, EventKind::Input);
    }

    /// Choose a value in a select
    pub fn select_value(&self, node: NodeId, value: &str) {
        self.set_value(node, value);
        self.dispatch(node, EventKind::Change);
    }

    /// Click `node`, then run the browser's default action for it
    pub fn click(&self, node: NodeId) -> Event {
        let activation = self.activation_for(node);
        let event = self.dispatch(node, EventKind::Click);
        if event.default_prevented() {
            return event;
        }

        match activation {
            Activation::Toggle => {
                let is_radio = self.get_attribute(node, "type").as_deref() == Some("radio");
                let was = self.checked(node);
                if is_radio {
                    if !was {
                        self.set_checked(node, true);
                        self.dispatch(node, EventKind::Change);
                    }
                } else {
                    self.set_checked(node, !was);
                    self.dispatch(node, EventKind::Change);
                }
            }
            Activation::Submit(form) => {
                self.request_submit(form);
            }
            Activation::Reset(form) => {
                self.request_reset(form);
            }
            Activation::None => {}
        }

        event
    }

    fn activation_for(&self, node: NodeId) -> Activation {
        let tree = self.tree.borrow();
        let Some(el) = tree.element(node) else {
            return Activation::None;
        };
        if el.is_toggle() {
            return Activation::Toggle;
        }

        let kind = match (el.tag.as_str(), el.attrs.get("type").map(String::as_str)) {
            ("button", None) | ("button", Some("submit")) | ("input", Some("submit")) => "submit",
            ("button", Some("reset")) | ("input", Some("reset")) => "reset",
            _ => return Activation::None,
        };

        match (kind, tree.enclosing_form(node)) {
            ("submit", Some(form)) => Activation::Submit(form),
            ("reset", Some(form)) => Activation::Reset(form),
            _ => Activation::None,
        }
    }

    /// Fire `submit` at a form
    pub fn request_submit(&self, form: NodeId) -> Event {
        self.dispatch(form, EventKind::Submit)
    }

    /// Fire `reset` at a form, then restore defaults unless prevented
    pub fn request_reset(&self, form: NodeId) -> Event {
        let event = self.dispatch(form, EventKind::Reset);
        if !event.default_prevented() {
            self.reset_form(form);
        }
        event
    }

    /// Restore every control in `form` to its declared default
    ///
    /// Inputs fall back to their `value` attribute, toggles to their
    /// `checked` attribute, textareas to their text content, and selects to
    /// the option marked `selected` (or the first option).
    pub fn reset_form(&self, form: NodeId) {
        let mut tree = self.tree.borrow_mut();
        for node in tree.descendants(form) {
            let default = match tree.element(node) {
                Some(el) if el.is_toggle() => ControlDefault::Checked(el.attrs.contains_key("checked")),
                Some(el) if el.tag == "input" => {
                    ControlDefault::Value(el.attrs.get("value").cloned().unwrap_or_default())
                }
                Some(el) if el.tag == "textarea" => ControlDefault::Value(tree.text_content(node)),
                Some(el) if el.tag == "select" => {
                    let options = tree.options_of(node);
                    let chosen = options
                        .iter()
                        .copied()
                        .find(|&o| {
                            tree.element(o)
                                .map(|el| el.attrs.contains_key("selected"))
                                .unwrap_or(false)
                        })
                        .or_else(|| options.first().copied());
                    ControlDefault::Value(chosen.map(|o| tree.option_value(o)).unwrap_or_default())
                }
                _ => continue,
            };

            if let Some(el) = tree.element_mut(node) {
                match default {
                    ControlDefault::Checked(checked) => el.checked = checked,
                    ControlDefault::Value(value) => el.value = value,
                }
            }
        }
    }

    // ---- viewport ----

    /// Ask the viewport to scroll to the top
    pub fn scroll_to_top(&self) {
        self.tree.borrow_mut().scroll_requests += 1;
    }

    pub fn scroll_requests(&self) -> usize {
        self.tree.borrow().scroll_requests
    }

    // ---- output ----

    /// Serialize `node` and its subtree as HTML
    pub fn to_html(&self, node: NodeId) -> String {
        html::serialize(&self.tree.borrow(), node)
    }

    /// Serialize the children of `node`, without `node` itself
    pub fn inner_html(&self, node: NodeId) -> String {
        self.children(node).into_iter().map(|c| self.to_html(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn form_with(doc: &Document, controls: &[NodeId]) -> NodeId {
        let form = doc.create_element("form");
        doc.append_child(doc.body(), form);
        for &c in controls {
            doc.append_child(form, c);
        }
        form
    }

    #[test]
    fn test_get_element_by_id_only_finds_attached() {
        let doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attribute(div, "id", "app");
        assert_eq!(doc.get_element_by_id("app"), None);

        doc.append_child(doc.body(), div);
        assert_eq!(doc.get_element_by_id("app"), Some(div));
    }

    #[test]
    fn test_clear_children_drops_listeners() {
        let doc = Document::new();
        let container = doc.create_element("div");
        doc.append_child(doc.body(), container);
        let button = doc.create_element("button");
        doc.append_child(container, button);
        let id = doc.add_listener(button, EventKind::Click, |_| {});
        assert_eq!(doc.listener_count(), 1);

        doc.clear_children(container);
        assert_eq!(doc.listener_count(), 0);
        assert!(!doc.contains(button));
        assert!(!doc.remove_listener(id));
    }

    #[test]
    fn test_events_bubble_and_stop() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(doc.body(), outer);
        doc.append_child(outer, inner);

        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        doc.add_listener(outer, EventKind::Click, move |_| h.set(h.get() + 1));
        doc.click(inner);
        assert_eq!(hits.get(), 1);

        doc.add_listener(inner, EventKind::Click, |e| e.stop_propagation());
        doc.click(inner);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_radio_group_is_exclusive() {
        let doc = Document::new();
        let a = doc.create_element("input");
        let b = doc.create_element("input");
        for r in [a, b] {
            doc.set_attribute(r, "type", "radio");
            doc.set_attribute(r, "name", "size");
        }
        form_with(&doc, &[a, b]);

        doc.click(a);
        doc.click(b);
        assert!(!doc.checked(a));
        assert!(doc.checked(b));
    }

    #[test]
    fn test_select_rejects_unknown_value() {
        let doc = Document::new();
        let select = doc.create_element("select");
        for v in ["red", "blue"] {
            let opt = doc.create_element("option");
            doc.set_attribute(opt, "value", v);
            doc.append_child(select, opt);
        }
        doc.set_value(select, "blue");
        assert_eq!(doc.value(select), "blue");
        doc.set_value(select, "green");
        assert_eq!(doc.value(select), "");
    }

    #[test]
    fn test_submit_button_submits_enclosing_form() {
        let doc = Document::new();
        let button = doc.create_element("button");
        doc.set_attribute(button, "type", "submit");
        let form = form_with(&doc, &[button]);

        let submitted = Rc::new(Cell::new(false));
        let flag = submitted.clone();
        doc.add_listener(form, EventKind::Submit, move |_| flag.set(true));

        doc.click(button);
        assert!(submitted.get());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let doc = Document::new();
        let input = doc.create_element("input");
        doc.set_attribute(input, "value", "default");
        let check = doc.create_element("input");
        doc.set_attribute(check, "type", "checkbox");
        let reset = doc.create_element("button");
        doc.set_attribute(reset, "type", "reset");
        form_with(&doc, &[input, check, reset]);

        doc.input_text(input, "typed");
        doc.click(check);
        assert!(doc.checked(check));

        doc.click(reset);
        assert_eq!(doc.value(input), "default");
        assert!(!doc.checked(check));
    }

    #[test]
    fn test_removed_handle_stays_dead_after_slot_reuse() {
        let doc = Document::new();
        let old = doc.create_element("div");
        doc.append_child(doc.body(), old);
        doc.add_listener(old, EventKind::Click, |_| {});
        doc.remove_node(old);

        let new = doc.create_element("span");
        doc.add_listener(new, EventKind::Click, |_| {});
        assert!(!doc.contains(old));
        assert_eq!(doc.tag_name(old), None);
        assert_eq!(doc.tag_name(new).as_deref(), Some("span"));

        doc.set_attribute(old, "id", "stale");
        assert_eq!(doc.get_attribute(new, "id"), None);
        // body plus one reused node slot, one reused listener slot
        assert_eq!(doc.allocated_slots(), 3);
    }

    #[test]
    fn test_weak_handle_does_not_keep_document_alive() {
        let doc = Document::new();
        let weak = doc.downgrade();
        assert!(weak.upgrade().is_some());
        drop(doc);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_to_html_reflects_live_state() {
        let doc = Document::new();
        let input = doc.create_element("input");
        doc.set_attribute(input, "name", "q");
        doc.set_value(input, "a<b");
        assert_eq!(doc.to_html(input), "<input name=\"q\" value=\"a&lt;b\">");

        let p = doc.create_element("p");
        doc.set_text(p, "Tom & Jerry");
        assert_eq!(doc.to_html(p), "<p>Tom &amp; Jerry</p>");
    }
}
