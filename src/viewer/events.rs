use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use super::points::PointId;

// ---------------------------------------------------------------------------
// Data-changed events emitted by a points layer
// ---------------------------------------------------------------------------

/// What happened to the layer's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAction {
    Added,
    Removed,
    Changed,
}

/// A single "data changed" notification.
#[derive(Debug, Clone, PartialEq)]
pub struct DataEvent {
    pub action: DataAction,
    /// Points the action applies to, in the order they were affected.
    pub points: Vec<PointId>,
    /// Coordinates of every point in the layer after the change.
    pub value: Vec<Vec<f64>>,
}

type Inbox = RefCell<VecDeque<DataEvent>>;

// ---------------------------------------------------------------------------
// Emitter / subscription
// ---------------------------------------------------------------------------

/// Fan-out of [`DataEvent`]s to live subscriptions.
///
/// The emitter only keeps weak references: once a [`Subscription`] is
/// dropped, nothing more is delivered to it.
#[derive(Debug, Default)]
pub struct EventEmitter {
    subscribers: Vec<Weak<Inbox>>,
}

impl EventEmitter {
    pub fn subscribe(&mut self) -> Subscription {
        let inbox = Rc::new(RefCell::new(VecDeque::new()));
        self.subscribers.push(Rc::downgrade(&inbox));
        Subscription { inbox }
    }

    /// Queue `event` on every live subscription, in subscription order.
    pub fn emit(&mut self, event: DataEvent) {
        self.subscribers.retain(|weak| weak.strong_count() > 0);
        for weak in &self.subscribers {
            if let Some(inbox) = weak.upgrade() {
                inbox.borrow_mut().push_back(event.clone());
            }
        }
    }

    /// Number of subscriptions that have not been released yet.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// Handle for one subscription. Owns the queue of undelivered events;
/// releasing the handle (drop or [`Subscription::unsubscribe`]) detaches it
/// from the emitter and discards anything still queued.
#[derive(Debug)]
pub struct Subscription {
    inbox: Rc<Inbox>,
}

impl Subscription {
    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<DataEvent> {
        self.inbox.borrow_mut().drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.inbox.borrow().len()
    }

    pub fn unsubscribe(self) {
        log::debug!("releasing subscription with {} undelivered event(s)", self.pending());
    }
}
