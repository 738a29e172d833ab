//! Activity timing and the end-event queue.

/// Activity state machine and acceleration curves.
pub mod activity;
/// Ordered queue of end events.
pub mod event_queue;
