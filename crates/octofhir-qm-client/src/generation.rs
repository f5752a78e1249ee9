//! Latest-request-wins bookkeeping
//!
//! Every load takes a [`Ticket`]. A result may only be committed while its
//! ticket is still the newest one issued; anything older is discarded.

use parking_lot::Mutex;
use std::sync::Arc;

/// Generation number handed to one load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub enum Commit<T> {
    Committed(Arc<T>),
    /// A newer ticket exists; the value is handed back unstored
    Superseded { value: T, latest: Ticket },
}

impl<T> Commit<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

#[derive(Debug)]
struct State<T> {
    latest: u64,
    committed: Option<(Ticket, Arc<T>)>,
}

#[derive(Debug)]
pub struct GenerationGuard<T> {
    state: Mutex<State<T>>,
}

impl<T> GenerationGuard<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                latest: 0,
                committed: None,
            }),
        }
    }

    /// Start a new load, superseding every earlier ticket
    pub fn begin(&self) -> Ticket {
        let mut state = self.state.lock();
        state.latest += 1;
        Ticket(state.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.state.lock().latest == ticket.0
    }

    pub fn commit(&self, ticket: Ticket, value: T) -> Commit<T> {
        let mut state = self.state.lock();
        if state.latest != ticket.0 {
            return Commit::Superseded {
                value,
                latest: Ticket(state.latest),
            };
        }
        let value = Arc::new(value);
        state.committed = Some((ticket, Arc::clone(&value)));
        Commit::Committed(value)
    }

    /// Most recently committed value
    pub fn current(&self) -> Option<Arc<T>> {
        self.state.lock().committed.as_ref().map(|(_, v)| Arc::clone(v))
    }

    pub fn committed_ticket(&self) -> Option<Ticket> {
        self.state.lock().committed.as_ref().map(|(t, _)| *t)
    }
}

impl<T> Default for GenerationGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}
