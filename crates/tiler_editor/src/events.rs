//! Event subscription between the editor and its host
//!
//! The host pushes asset changes and key presses through [`HostEvents::emit`].
//! Listeners register with [`HostEvents::subscribe`] and stay registered for
//! as long as the returned [`Subscription`] lives.

use crate::shortcuts::KeyPress;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

/// Something that happened in the host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A file in the project was created, modified or removed
    AssetChanged(PathBuf),
    KeyPressed(KeyPress),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AssetChanged,
    KeyPressed,
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::AssetChanged(_) => EventKind::AssetChanged,
            HostEvent::KeyPressed(_) => EventKind::KeyPressed,
        }
    }
}

type Handler = Box<dyn FnMut(&HostEvent)>;

struct Listener {
    id: u64,
    kind: EventKind,
    /// Taken out while the handler runs
    handler: Option<Handler>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl Registry {
    /// Detach listeners so the caller can drop them after releasing the borrow
    fn remove(&mut self, ids: &[u64]) -> Vec<Listener> {
        let (removed, kept): (Vec<Listener>, Vec<Listener>) = std::mem::take(&mut self.listeners)
            .into_iter()
            .partition(|l| ids.contains(&l.id));
        self.listeners = kept;
        removed
    }
}

#[derive(Default)]
struct Shared {
    registry: RefCell<Registry>,
    /// Ids whose guard was dropped while the registry was borrowed
    pending: RefCell<Vec<u64>>,
}

impl Shared {
    fn unregister(&self, id: u64) {
        self.pending.borrow_mut().push(id);
        self.flush();
    }

    /// Remove every pending id. Handlers owning further guards are dropped
    /// after the registry borrow ends, so nested guards unregister too.
    fn flush(&self) {
        loop {
            let ids = std::mem::take(&mut *self.pending.borrow_mut());
            if ids.is_empty() {
                return;
            }
            let removed = match self.registry.try_borrow_mut() {
                Ok(mut registry) => registry.remove(&ids),
                Err(_) => {
                    self.pending.borrow_mut().extend(ids);
                    return;
                }
            };
            drop(removed);
        }
    }
}

/// Registration point for host event listeners
#[derive(Default, Clone)]
pub struct HostEvents {
    shared: Rc<Shared>,
}

impl HostEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one kind of event
    #[must_use = "the handler is removed when the subscription is dropped"]
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&HostEvent) + 'static,
    {
        self.shared.flush();
        let mut registry = self.shared.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push(Listener {
            id,
            kind,
            handler: Some(Box::new(handler)),
        });
        Subscription {
            id,
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Deliver an event to every matching handler. Handlers may subscribe or
    /// unsubscribe while running.
    pub fn emit(&self, event: &HostEvent) -> usize {
        self.shared.flush();
        let kind = event.kind();
        let ids: Vec<u64> = self
            .shared
            .registry
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.id)
            .collect();

        let mut delivered = 0;
        for id in ids {
            let handler = self
                .shared
                .registry
                .borrow_mut()
                .listeners
                .iter_mut()
                .find(|l| l.id == id)
                .and_then(|l| l.handler.take());
            let Some(mut handler) = handler else {
                continue;
            };

            handler(event);
            delivered += 1;

            // Put it back unless it was unsubscribed meanwhile
            let mut handler = Some(handler);
            if let Some(listener) = self
                .shared
                .registry
                .borrow_mut()
                .listeners
                .iter_mut()
                .find(|l| l.id == id)
            {
                listener.handler = handler.take();
            }
            drop(handler);
        }
        self.shared.flush();
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.shared.flush();
        self.shared.registry.borrow().listeners.len()
    }
}

/// Keeps a handler registered. Dropping it removes the handler.
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Remove the handler now
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.unregister(self.id);
        }
    }
}
