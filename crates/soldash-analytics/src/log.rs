//! Bounded notification store.
//!
//! Events are kept newest first. Appending beyond the capacity evicts the
//! oldest events, so `len() <= capacity()` holds after every append.

use soldash_core::NotificationEvent;
use std::collections::VecDeque;
use uuid::Uuid;

/// Default number of retained notifications.
pub const DEFAULT_CAPACITY: usize = 50;

/// Newest-first, capacity-bounded list of notification events.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    events: VecDeque<NotificationEvent>,
    capacity: usize,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationLog {
    /// Creates an empty log with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty log holding at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of retained events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prepends an event, evicting the oldest beyond capacity.
    pub fn append(&mut self, event: NotificationEvent) {
        self.events.push_front(event);
        self.events.truncate(self.capacity);
    }

    /// Appends events in emission order; the last one ends up newest.
    pub fn append_all(&mut self, events: impl IntoIterator<Item = NotificationEvent>) {
        for event in events {
            self.append(event);
        }
    }

    /// Marks every event read. Idempotent.
    pub fn mark_all_read(&mut self) {
        for event in &mut self.events {
            event.read = true;
        }
    }

    /// Marks one event read. Returns false if no event has that id.
    pub fn mark_read(&mut self, id: Uuid) -> bool {
        match self.events.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                event.read = true;
                true
            }
            None => false,
        }
    }

    /// Number of unread events.
    pub fn unread_count(&self) -> usize {
        self.events.iter().filter(|e| !e.read).count()
    }

    /// Events, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &NotificationEvent> {
        self.events.iter()
    }

    /// Owned copy of the events, newest first.
    pub fn to_vec(&self) -> Vec<NotificationEvent> {
        self.events.iter().cloned().collect()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
