//! Lifecycle event dispatch
//!
//! Every lifecycle event is delivered both to the single-slot handler for
//! its type and to every registered listener, through one uniform ordered
//! list of listener records per event type. The single-slot handler is just
//! one more record: first assignment inserts it at the current end of the
//! list, reassignment replaces it in place, so dispatch is a single loop in
//! registration order.

use core::fmt;
use std::sync::Arc;

// ----------------------------------------------------------------------------
// Event Types
// ----------------------------------------------------------------------------

/// Lifecycle event type. Events carry no payload beyond their type;
/// consumers read state off the client instance, not the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    ReadyStateChange,
    LoadStart,
    Progress,
    Load,
    LoadEnd,
    Error,
    Timeout,
    Abort,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::ReadyStateChange,
        EventType::LoadStart,
        EventType::Progress,
        EventType::Load,
        EventType::LoadEnd,
        EventType::Error,
        EventType::Timeout,
        EventType::Abort,
    ];

    /// Event name as exposed on the native surface
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::ReadyStateChange => "readystatechange",
            EventType::LoadStart => "loadstart",
            EventType::Progress => "progress",
            EventType::Load => "load",
            EventType::LoadEnd => "loadend",
            EventType::Error => "error",
            EventType::Timeout => "timeout",
            EventType::Abort => "abort",
        }
    }

    fn index(self) -> usize {
        match self {
            EventType::ReadyStateChange => 0,
            EventType::LoadStart => 1,
            EventType::Progress => 2,
            EventType::Load => 3,
            EventType::LoadEnd => 4,
            EventType::Error => 5,
            EventType::Timeout => 6,
            EventType::Abort => 7,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dispatched lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XhrEvent {
    pub kind: EventType,
}

/// Callback invoked for a dispatched event
pub type EventCallback = Arc<dyn Fn(&XhrEvent) + Send + Sync>;

// ----------------------------------------------------------------------------
// Event Bridge
// ----------------------------------------------------------------------------

struct ListenerRecord {
    /// Record backing the single-slot handler for this type
    slot: bool,
    callback: EventCallback,
}

/// Ordered listener registry with uniform dispatch
#[derive(Default)]
pub struct EventBridge {
    listeners: [Vec<ListenerRecord>; 8],
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a multi-listener callback; dispatch follows registration order
    pub fn add_listener(&mut self, kind: EventType, callback: EventCallback) {
        self.listeners[kind.index()].push(ListenerRecord {
            slot: false,
            callback,
        });
    }

    /// Set or clear the single-slot handler for a type. The slot record
    /// keeps the position of its first assignment; reassignment replaces the
    /// callback in place, `None` removes the record.
    pub fn set_handler(&mut self, kind: EventType, callback: Option<EventCallback>) {
        let records = &mut self.listeners[kind.index()];
        let existing = records.iter_mut().position(|r| r.slot);

        match (existing, callback) {
            (Some(i), Some(callback)) => records[i].callback = callback,
            (Some(i), None) => {
                records.remove(i);
            }
            (None, Some(callback)) => records.push(ListenerRecord {
                slot: true,
                callback,
            }),
            (None, None) => {}
        }
    }

    /// Number of records registered for a type
    pub fn listener_count(&self, kind: EventType) -> usize {
        self.listeners[kind.index()].len()
    }

    /// Snapshot the callbacks for a type, in dispatch order.
    ///
    /// Dispatch happens on the snapshot with no locks held, so callbacks may
    /// reenter the client's accessor methods.
    pub fn snapshot(&self, kind: EventType) -> Vec<EventCallback> {
        self.listeners[kind.index()]
            .iter()
            .map(|r| Arc::clone(&r.callback))
            .collect()
    }
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("EventBridge");
        for kind in EventType::ALL {
            s.field(kind.as_str(), &self.listener_count(kind));
        }
        s.finish()
    }
}

/// Invoke every callback in the snapshot, in order
pub fn dispatch(snapshot: &[EventCallback], kind: EventType) {
    let event = XhrEvent { kind };
    for callback in snapshot {
        callback(&event);
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> EventCallback {
        let log = Arc::clone(log);
        Arc::new(move |_event| log.lock().unwrap().push(tag))
    }

    #[test]
    fn test_dispatch_follows_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bridge = EventBridge::new();

        bridge.add_listener(EventType::Load, recorder(&log, "first"));
        bridge.add_listener(EventType::Load, recorder(&log, "second"));
        bridge.add_listener(EventType::Load, recorder(&log, "third"));

        dispatch(&bridge.snapshot(EventType::Load), EventType::Load);

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_slot_handler_is_one_more_record() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bridge = EventBridge::new();

        bridge.add_listener(EventType::Load, recorder(&log, "listener"));
        bridge.set_handler(EventType::Load, Some(recorder(&log, "handler")));

        dispatch(&bridge.snapshot(EventType::Load), EventType::Load);

        assert_eq!(*log.lock().unwrap(), vec!["listener", "handler"]);
    }

    #[test]
    fn test_slot_reassignment_keeps_position() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bridge = EventBridge::new();

        bridge.set_handler(EventType::Load, Some(recorder(&log, "old")));
        bridge.add_listener(EventType::Load, recorder(&log, "later"));
        bridge.set_handler(EventType::Load, Some(recorder(&log, "new")));

        dispatch(&bridge.snapshot(EventType::Load), EventType::Load);

        // The replaced handler fires at its original position, before the
        // listener registered after the first assignment.
        assert_eq!(*log.lock().unwrap(), vec!["new", "later"]);
    }

    #[test]
    fn test_slot_clear_removes_record() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bridge = EventBridge::new();

        bridge.set_handler(EventType::Load, Some(recorder(&log, "handler")));
        bridge.set_handler(EventType::Load, None);

        assert_eq!(bridge.listener_count(EventType::Load), 0);
        dispatch(&bridge.snapshot(EventType::Load), EventType::Load);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_types_are_isolated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bridge = EventBridge::new();

        bridge.add_listener(EventType::Load, recorder(&log, "load"));
        dispatch(&bridge.snapshot(EventType::Abort), EventType::Abort);

        assert!(log.lock().unwrap().is_empty());
    }
}
