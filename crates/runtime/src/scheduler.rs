use foundation::time::TimeMs;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// One-shot deferred tasks, fired cooperatively from the frame loop.
///
/// Ordering is deterministic: `(due_time, insertion_order)`. There is no background
/// thread; a task only fires when [`DeferredQueue::take_due`] is called with a time at or
/// past its due time.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    next_order: u64,
    pending: Vec<(TimeMs, u64, T)>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            next_order: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: TimeMs, task: T) -> TimerId {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.pending.push((due, order, task));
        TimerId(order)
    }

    /// Cancel a pending task. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(_, order, _)| *order != id.0);
        before != self.pending.len()
    }

    /// Remove and return every task due at `now`, earliest first.
    pub fn take_due(&mut self, now: TimeMs) -> Vec<T> {
        self.pending.sort_by(|(da, oa, _), (db, ob, _)| {
            da.0.total_cmp(&db.0).then_with(|| oa.cmp(ob))
        });
        let split = self
            .pending
            .iter()
            .position(|(due, _, _)| due.0 > now.0)
            .unwrap_or(self.pending.len());
        self.pending.drain(..split).map(|(_, _, task)| task).collect()
    }

    pub fn next_due(&self) -> Option<TimeMs> {
        self.pending
            .iter()
            .map(|(due, _, _)| *due)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::DeferredQueue;
    use foundation::time::TimeMs;

    #[test]
    fn nothing_fires_before_due_time() {
        let mut q = DeferredQueue::new();
        q.schedule(TimeMs(1000.0), "traffic");
        assert!(q.take_due(TimeMs(999.9)).is_empty());
        assert_eq!(q.take_due(TimeMs(1000.0)), vec!["traffic"]);
        assert!(q.is_empty());
    }

    #[test]
    fn fires_in_due_then_insertion_order() {
        let mut q = DeferredQueue::new();
        q.schedule(TimeMs(20.0), "c");
        q.schedule(TimeMs(10.0), "a");
        q.schedule(TimeMs(10.0), "b");
        assert_eq!(q.next_due(), Some(TimeMs(10.0)));
        assert_eq!(q.take_due(TimeMs(50.0)), vec!["a", "b", "c"]);
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut q = DeferredQueue::new();
        let id = q.schedule(TimeMs(5.0), 1);
        q.schedule(TimeMs(5.0), 2);
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.take_due(TimeMs(5.0)), vec![2]);
    }
}
