use std::collections::BTreeMap;
use std::sync::Arc;

/// Slots that lead the published world list, in this order.
pub const PRIMARY_SLOTS: [i32; 3] = [0, -1, 1];

/// Live worlds by slot, plus the ordered list the server ticks through.
#[derive(Debug)]
pub struct WorldTable<W> {
    live: BTreeMap<i32, Arc<W>>,
    ordered: Arc<[Arc<W>]>,
}
impl<W> Default for WorldTable<W> {
    fn default() -> Self {
        Self {
            live: BTreeMap::new(),
            ordered: Arc::from(Vec::new()),
        }
    }
}
impl<W> WorldTable<W> {
    pub fn new() -> Self {
        Self::default()
    }
    /// Inserts or removes the world at `slot`, returning what was there before.
    pub fn set(&mut self, slot: i32, world: Option<Arc<W>>) -> Option<Arc<W>> {
        let old = match world {
            Some(world) => self.live.insert(slot, world),
            None => self.live.remove(&slot),
        };
        self.rebuild();
        old
    }
    pub fn get(&self, slot: i32) -> Option<&Arc<W>> {
        self.live.get(&slot)
    }
    pub fn contains(&self, slot: i32) -> bool {
        self.live.contains_key(&slot)
    }
    pub fn slots(&self) -> impl Iterator<Item = i32> + '_ {
        self.live.keys().copied()
    }
    pub fn ordered(&self) -> Arc<[Arc<W>]> {
        self.ordered.clone()
    }
    fn rebuild(&mut self) {
        let primaries = PRIMARY_SLOTS.iter().filter_map(|slot| self.live.get(slot));
        let rest = self
            .live
            .iter()
            .filter(|(slot, _)| !PRIMARY_SLOTS.contains(*slot))
            .map(|(_, world)| world);
        self.ordered = primaries.chain(rest).cloned().collect();
    }
}
