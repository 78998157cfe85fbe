//! Buffer between the transport and the render loop.
//!
//! Producers on any thread append; the render loop drains once per tick. A
//! drain takes everything present at that moment, later arrivals wait for the
//! next tick.

use shared::InboundEvent;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct UpdateQueue {
    inner: Arc<Mutex<VecDeque<InboundEvent>>>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<InboundEvent>> {
        // A panicking producer cannot leave the deque half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enqueue(&self, event: InboundEvent) {
        self.lock().push_back(event);
    }

    /// Removes and returns the current contents in arrival order.
    pub fn drain(&self) -> std::collections::vec_deque::IntoIter<InboundEvent> {
        std::mem::take(&mut *self.lock()).into_iter()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
