use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// Identifier of a queued event, unique within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u64);

/// What an end event announces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// A slide transition reached its last frame (or was forcibly ended).
    TransitionEnded {
        /// Index of the slide being entered.
        slide: usize,
    },
    /// A shape-level effect finished all of its repeat cycles.
    EffectEnded {
        /// Id of the animated shape.
        target: String,
    },
}

/// An event handed to an activity on activation and enqueued when it ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Event id.
    pub id: EventId,
    /// Event payload.
    pub kind: EventKind,
}

#[derive(Debug)]
struct Queued {
    due: Duration,
    seq: u64,
    event: Event,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Ordered queue of timed events.
///
/// Determinism rule: events are dispatched by due time; events with equal due times are dispatched
/// in insertion order.
#[derive(Debug, Default)]
pub struct TimerEventQueue {
    heap: BinaryHeap<Reverse<Queued>>,
    next_seq: u64,
    next_id: u64,
}

impl TimerEventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an event with a fresh id. The event is not queued yet.
    pub fn make_event(&mut self, kind: EventKind) -> Event {
        let id = EventId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        Event { id, kind }
    }

    /// Queue `event` to fire at `due`.
    pub fn add_event(&mut self, event: Event, due: Duration) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.heap.push(Reverse(Queued { due, seq, event }));
    }

    /// Due time of the earliest queued event.
    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(q)| q.due)
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Return `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Remove and return every event due at or before `now`, in dispatch order.
    pub fn process_events(&mut self, now: Duration) -> Vec<Event> {
        let mut out = Vec::new();
        while let Some(Reverse(head)) = self.heap.peek() {
            if head.due > now {
                break;
            }
            if let Some(Reverse(q)) = self.heap.pop() {
                out.push(q.event);
            }
        }
        out
    }

    /// Drop every queued event.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/event_queue.rs"]
mod tests;
