
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    slot: i32,
    ticks_waited: u32,
}

/// Dimensions waiting out their unload delay, in the order they were queued.
#[derive(Debug, Default)]
pub struct UnloadQueue {
    pending: Vec<Pending>,
}
impl UnloadQueue {
    pub fn new() -> Self {
        Self::default()
    }
    /// Queues `slot`, or restarts its wait if it is already queued.
    /// Returns whether the slot was newly queued.
    pub fn enqueue(&mut self, slot: i32) -> bool {
        match self.pending.iter_mut().find(|p| p.slot == slot) {
            Some(pending) => {
                pending.ticks_waited = 0;
                false
            }
            None => {
                self.pending.push(Pending { slot, ticks_waited: 0 });
                true
            }
        }
    }
    pub fn contains(&self, slot: i32) -> bool {
        self.pending.iter().any(|p| p.slot == slot)
    }
    pub fn ticks_waited(&self, slot: i32) -> Option<u32> {
        self.pending.iter().find(|p| p.slot == slot).map(|p| p.ticks_waited)
    }
    pub fn remove(&mut self, slot: i32) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.slot != slot);
        self.pending.len() != before
    }
    /// Counts one tick for every queued slot and dequeues those that have now
    /// waited `delay` ticks. A delay of 0 behaves like 1.
    pub fn advance(&mut self, delay: u32) -> Vec<i32> {
        let mut due = vec![];
        self.pending.retain_mut(|p| {
            p.ticks_waited += 1;
            if p.ticks_waited < delay {
                true
            } else {
                due.push(p.slot);
                false
            }
        });
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_come_due_after_delay() {
        let mut queue = UnloadQueue::new();
        assert!(queue.enqueue(4));
        assert!(queue.advance(3).is_empty());
        assert!(queue.advance(3).is_empty());
        assert_eq!(queue.ticks_waited(4), Some(2));
        assert_eq!(queue.advance(3), vec![4]);
        assert!(!queue.contains(4));
    }

    #[test]
    fn requeue_restarts_the_wait() {
        let mut queue = UnloadQueue::new();
        queue.enqueue(4);
        queue.advance(2);
        assert!(!queue.enqueue(4));
        assert_eq!(queue.ticks_waited(4), Some(0));
        assert!(queue.advance(2).is_empty());
        assert_eq!(queue.advance(2), vec![4]);
    }

    #[test]
    fn zero_delay_unloads_next_tick() {
        let mut queue = UnloadQueue::new();
        queue.enqueue(2);
        queue.enqueue(3);
        assert_eq!(queue.advance(0), vec![2, 3]);
    }
}
