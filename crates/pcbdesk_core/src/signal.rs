//! Change-notification signals.
//!
//! # Responsibility
//! - Let observers subscribe to state changes of an object.
//! - Offer direct delivery (inside `emit`) and queued delivery (through the
//!   event loop, after control returns to it).
//!
//! # Invariants
//! - `emit` calls slots in connection order.
//! - Slots connected or disconnected during an emission take effect from the
//!   next emission on.
//! - The signal holds no borrow while a slot runs, so slots may re-enter the
//!   emitting object.

use crate::event_loop::EventLoop;
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Handle returned by `connect*`, used to disconnect one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// How a connected slot receives emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Direct,
    Queued,
}

type Slot<T> = Rc<dyn Fn(&T)>;

struct Connection<T> {
    id: ConnectionId,
    kind: ConnectionType,
    slot: Slot<T>,
}

/// Observable event carrying a `T` payload.
pub struct Signal<T> {
    connections: RefCell<Vec<Connection<T>>>,
    next_id: Cell<u64>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            connections: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Connects a slot that runs synchronously inside [`Signal::emit`].
    pub fn connect(&self, slot: impl Fn(&T) + 'static) -> ConnectionId {
        self.push(ConnectionType::Direct, Rc::new(slot))
    }

    /// Connects a slot that runs on a later turn of `event_loop`.
    ///
    /// The payload is cloned at emission time.
    pub fn connect_queued(
        &self,
        event_loop: &EventLoop,
        slot: impl Fn(&T) + 'static,
    ) -> ConnectionId
    where
        T: Clone,
    {
        let event_loop = event_loop.clone();
        let slot: Slot<T> = Rc::new(slot);
        self.push(
            ConnectionType::Queued,
            Rc::new(move |value: &T| {
                let slot = slot.clone();
                let value = value.clone();
                event_loop.post(move || slot(&value));
            }),
        )
    }

    /// Removes one connection. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.borrow_mut();
        let before = connections.len();
        connections.retain(|connection| connection.id != id);
        connections.len() != before
    }

    pub fn connection_count(&self) -> usize {
        self.connections.borrow().len()
    }

    pub fn connection_type(&self, id: ConnectionId) -> Option<ConnectionType> {
        self.connections
            .borrow()
            .iter()
            .find(|connection| connection.id == id)
            .map(|connection| connection.kind)
    }

    pub fn emit(&self, value: &T) {
        let slots: Vec<Slot<T>> = self
            .connections
            .borrow()
            .iter()
            .map(|connection| connection.slot.clone())
            .collect();
        for slot in slots {
            slot(value);
        }
    }

    fn push(&self, kind: ConnectionType, slot: Slot<T>) -> ConnectionId {
        let id = ConnectionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.connections
            .borrow_mut()
            .push(Connection { id, kind, slot });
        id
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for Signal<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.borrow().len())
            .finish()
    }
}
