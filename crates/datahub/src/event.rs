//! Ordered, synchronous multi-subscriber event dispatch.
//!
//! An [`EventHandler`] keeps its subscribers in registration order and invokes
//! them on the caller's thread. All methods take `&self`, so a callback may
//! subscribe or unsubscribe (itself or others) on the handler that is
//! currently dispatching.
//!
//! # Dispatch Semantics
//!
//! - Callbacks run in subscription order.
//! - `dispatch` iterates a snapshot of the subscriber list. A subscriber added
//!   during a dispatch is first called by the next dispatch.
//! - A subscriber removed during a dispatch is skipped for the rest of it.
//! - Callbacks return nothing; there is no way for one subscriber to abort
//!   delivery to the others.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::config::HubConfig;
use crate::token::EventToken;

struct Subscriber<A: ?Sized> {
    token: EventToken,
    active: Cell<bool>,
    callback: Box<dyn Fn(&A)>,
}

/// Broadcasts `&A` to every registered callback.
///
/// Not `Clone`: a handler is owned by exactly one value or collection, and
/// its tokens only mean something to that handler.
pub struct EventHandler<A: ?Sized> {
    subscribers: RefCell<Vec<Rc<Subscriber<A>>>>,
    next_token: Cell<u64>,
}

impl<A: ?Sized> EventHandler<A> {
    /// Creates a handler with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            next_token: Cell::new(HubConfig::FIRST_TOKEN),
        }
    }

    /// Appends `callback` to the subscriber list and returns its token.
    ///
    /// The token is distinct from every token this handler has issued before.
    pub fn subscribe(&self, callback: impl Fn(&A) + 'static) -> EventToken {
        let raw = self.next_token.get();
        self.next_token.set(raw + 1);
        let token = EventToken::new(raw);

        self.subscribers.borrow_mut().push(Rc::new(Subscriber {
            token,
            active: Cell::new(true),
            callback: Box::new(callback),
        }));
        token
    }

    /// Removes the callback registered under `token`.
    ///
    /// Returns `false` when the token is unknown or was already removed;
    /// that case is otherwise a no-op.
    pub fn unsubscribe(&self, token: EventToken) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        match subscribers.iter().position(|sub| sub.token == token) {
            Some(index) => {
                let removed = subscribers.remove(index);
                removed.active.set(false);
                true
            }
            None => false,
        }
    }

    /// Invokes every current subscriber with `args`, in subscription order.
    pub fn dispatch(&self, args: &A) {
        let snapshot: Vec<Rc<Subscriber<A>>> = self.subscribers.borrow().clone();
        if snapshot.is_empty() {
            return;
        }

        tracing::trace!(subscribers = snapshot.len(), "dispatching event");
        for subscriber in &snapshot {
            if subscriber.active.get() {
                (subscriber.callback)(args);
            }
        }
    }

    /// Removes every subscriber.
    pub fn clear(&self) {
        for subscriber in self.subscribers.borrow_mut().drain(..) {
            subscriber.active.set(false);
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }
}

impl<A: ?Sized> Default for EventHandler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for EventHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("subscriber_count", &self.len())
            .finish()
    }
}
