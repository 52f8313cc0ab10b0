//! Rendering port
//!
//! `FieldRenderer` and `TableRenderer` draw through `Surface` only, so the
//! same rendering code targets the in-memory `Document` or, with the `web`
//! feature, a live browser page through `web::WebDocument`.

use super::{Document, Event, EventKind, ListenerId, NodeId, WeakDocument};
use std::fmt::Debug;

/// What a listener can do to the event it receives
pub trait SurfaceEvent {
    fn prevent_default(&self);
    fn stop_propagation(&self);
}

/// A document the renderers can build elements in and listen on
pub trait Surface: Clone + 'static {
    type Node: Clone + PartialEq + Debug + 'static;
    type Event: SurfaceEvent;
    /// Handle that does not keep the document alive
    type Weak: Clone + 'static;

    fn downgrade(&self) -> Self::Weak;
    fn upgrade(weak: &Self::Weak) -> Option<Self>;

    // lookup
    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;
    fn first_by_class(&self, class: &str) -> Option<Self::Node>;

    // tree
    fn create_element(&self, tag: &str) -> Self::Node;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    /// Insert before `reference`, or append when it is not a child of `parent`
    fn insert_before(&self, parent: &Self::Node, child: &Self::Node, reference: &Self::Node);
    fn remove_node(&self, node: &Self::Node);
    fn clear_children(&self, node: &Self::Node);

    // attributes
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn set_text(&self, node: &Self::Node, text: &str);
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    // live control state
    fn value(&self, node: &Self::Node) -> String;
    fn set_value(&self, node: &Self::Node, value: &str);
    fn checked(&self, node: &Self::Node) -> bool;
    fn set_checked(&self, node: &Self::Node, checked: bool);

    // events
    fn add_listener<F>(&self, node: &Self::Node, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&Self::Event) + 'static;
    /// Returns false if the listener was already gone
    fn remove_listener(&self, id: ListenerId) -> bool;

    // forms
    /// Fire `submit` at `form`
    fn request_submit(&self, form: &Self::Node);
    /// Fire `reset` at `form`, restoring defaults unless a listener prevents it
    fn request_reset(&self, form: &Self::Node);
    /// Restore every control in `form` to its declared default, firing nothing
    fn reset_form(&self, form: &Self::Node);

    fn scroll_to_top(&self);
    fn inner_html(&self, node: &Self::Node) -> String;
}

impl SurfaceEvent for Event {
    fn prevent_default(&self) {
        Event::prevent_default(self)
    }

    fn stop_propagation(&self) {
        Event::stop_propagation(self)
    }
}

impl Surface for Document {
    type Node = NodeId;
    type Event = Event;
    type Weak = WeakDocument;

    fn downgrade(&self) -> WeakDocument {
        Document::downgrade(self)
    }

    fn upgrade(weak: &WeakDocument) -> Option<Self> {
        weak.upgrade()
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        Document::get_element_by_id(self, id)
    }

    fn first_by_class(&self, class: &str) -> Option<NodeId> {
        Document::first_by_class(self, class)
    }

    fn create_element(&self, tag: &str) -> NodeId {
        Document::create_element(self, tag)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        Document::append_child(self, *parent, *child)
    }

    fn insert_before(&self, parent: &NodeId, child: &NodeId, reference: &NodeId) {
        Document::insert_before(self, *parent, *child, *reference)
    }

    fn remove_node(&self, node: &NodeId) {
        Document::remove_node(self, *node)
    }

    fn clear_children(&self, node: &NodeId) {
        Document::clear_children(self, *node)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        Document::set_attribute(self, *node, name, value)
    }

    fn get_attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        Document::get_attribute(self, *node, name)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        Document::add_class(self, *node, class)
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        Document::set_text(self, *node, text)
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        Document::set_style(self, *node, property, value)
    }

    fn value(&self, node: &NodeId) -> String {
        Document::value(self, *node)
    }

    fn set_value(&self, node: &NodeId, value: &str) {
        Document::set_value(self, *node, value)
    }

    fn checked(&self, node: &NodeId) -> bool {
        Document::checked(self, *node)
    }

    fn set_checked(&self, node: &NodeId, checked: bool) {
        Document::set_checked(self, *node, checked)
    }

    fn add_listener<F>(&self, node: &NodeId, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        Document::add_listener(self, *node, kind, handler)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        Document::remove_listener(self, id)
    }

    fn request_submit(&self, form: &NodeId) {
        Document::request_submit(self, *form);
    }

    fn request_reset(&self, form: &NodeId) {
        Document::request_reset(self, *form);
    }

    fn reset_form(&self, form: &NodeId) {
        Document::reset_form(self, *form)
    }

    fn scroll_to_top(&self) {
        Document::scroll_to_top(self)
    }

    fn inner_html(&self, node: &NodeId) -> String {
        Document::inner_html(self, *node)
    }
}
