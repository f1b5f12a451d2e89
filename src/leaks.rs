//! Diagnostics for worlds that outlive their slot.
//!
//! Every world the manager publishes is tracked through a [`Weak`]. A world that
//! is still alive but no longer in the instance table is being held by someone
//! else, usually a mod caching a reference across an unload.
use crate::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakReport {
    pub handle: Handle,
    pub occurrences: u32,
}

#[derive(Debug)]
pub struct LeakDetector<W> {
    tracked: SlotMap<Weak<W>>,
    by_addr: HashMap<usize, Handle>,
    // never pruned, only sampled
    tombstones: HashMap<Handle, u32>,
    report_interval: u32,
}
impl<W> LeakDetector<W> {
    pub fn new(report_interval: u32) -> Self {
        Self {
            tracked: SlotMap::new(),
            by_addr: HashMap::new(),
            tombstones: HashMap::new(),
            report_interval: report_interval.max(1),
        }
    }
    pub fn track(&mut self, world: &Arc<W>) -> Handle {
        let addr = Arc::as_ptr(world) as usize;
        if let Some(&handle) = self.by_addr.get(&addr) {
            if self.tracked.get(handle).map_or(false, |w| w.as_ptr() == Arc::as_ptr(world)) {
                return handle;
            }
            self.tracked.release(handle);
        }
        let handle = self.tracked.insert(Arc::downgrade(world));
        self.by_addr.insert(addr, handle);
        handle
    }
    pub fn tracked(&self) -> usize {
        self.tracked.len()
    }
    pub fn occurrences(&self, handle: Handle) -> u32 {
        self.tombstones.get(&handle).copied().unwrap_or(0)
    }
    /// Sweeps collected worlds out of tracking, then counts a sighting for each
    /// world that is alive but absent from `live`.
    ///
    /// Returns the sightings that were due to be reported this pass.
    pub fn scan(&mut self, live: &[Arc<W>], describe: impl Fn(&W) -> String) -> Vec<LeakReport> {
        let live: HashSet<*const W> = live.iter().map(Arc::as_ptr).collect();
        let mut orphans = vec![];
        self.tracked.retain(|handle, weak| match weak.upgrade() {
            None => false,
            Some(world) => {
                if !live.contains(&Arc::as_ptr(&world)) {
                    orphans.push((handle, world));
                }
                true
            }
        });
        let tracked = &self.tracked;
        self.by_addr.retain(|_, handle| tracked.get(*handle).is_some());

        let mut reports = vec![];
        for (handle, world) in orphans {
            let occurrences = self.tombstones.entry(handle).or_insert(0);
            *occurrences += 1;
            let occurrences = *occurrences;
            if occurrences % self.report_interval != 0 {
                continue;
            }
            if occurrences == self.report_interval {
                log::debug!("The world {handle} ({}) may have leaked: first encounter ({occurrences} occurrences).", describe(&world));
            } else {
                log::debug!("The world {handle} ({}) may have leaked: seen {occurrences} times.", describe(&world));
            }
            reports.push(LeakReport { handle, occurrences });
        }
        reports
    }
}
