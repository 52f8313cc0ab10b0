//! Event types for the document surface

use super::{NodeId, SlotKey};
use std::cell::Cell;
use std::rc::Rc;

/// Events the surface can dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Text edited in an input or textarea
    Input,
    /// Committed change (select, checkbox, radio)
    Change,
    Click,
    Submit,
    Reset,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Input => write!(f, "input"),
            EventKind::Change => write!(f, "change"),
            EventKind::Click => write!(f, "click"),
            EventKind::Submit => write!(f, "submit"),
            EventKind::Reset => write!(f, "reset"),
        }
    }
}

/// A dispatched event
///
/// Bubbles from `target` up through its ancestors. Handlers may call
/// `prevent_default` to suppress the surface's default action.
#[derive(Debug)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop the event from reaching ancestor listeners
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Handle for removing a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) SlotKey);

pub(crate) type Handler = Rc<dyn Fn(&Event)>;

pub(crate) struct Listener {
    pub node: NodeId,
    pub kind: EventKind,
    pub handler: Handler,
}
