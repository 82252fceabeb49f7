//! Synchronous change notifications
//!
//! Subscribers are plain callbacks invoked in registration order after each
//! mutating operation, once per emitted value. A panicking subscriber is
//! isolated so the remaining subscribers still observe the event.

use crate::UneditableVariable;
use octofhir_qrules_expr::{Question, Variable};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A discrete state-change notification
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Variables(Vec<Variable>),
    Questions(Vec<Question>),
    UneditableVariables(Vec<UneditableVariable>),
    FinalExpression(String),
    NeedsAdvancedInterface(bool),
    MightBeScore(bool),
}

/// Handle returned by [`ChangeListeners::subscribe`]
pub type SubscriptionId = usize;

/// Registry of change subscribers
#[derive(Default)]
pub struct ChangeListeners {
    next_id: SubscriptionId,
    listeners: Vec<(SubscriptionId, Box<dyn Fn(&ChangeEvent)>)>,
}

impl ChangeListeners {
    /// Register a subscriber; it sees every event emitted from now on
    pub fn subscribe(&mut self, listener: impl Fn(&ChangeEvent) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a subscriber; returns false when the id is unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every subscriber, in registration order. A
    /// subscriber that panics is skipped and logged; the rest still run.
    pub fn emit(&self, event: &ChangeEvent) {
        for (id, listener) in &self.listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                log::warn!("change subscriber {id} panicked, continuing with the rest");
            }
        }
    }
}

impl fmt::Debug for ChangeListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeListeners")
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}
