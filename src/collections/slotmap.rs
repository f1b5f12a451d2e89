
/// Generation-counted key into a [`SlotMap`].
///
/// A released slot bumps its generation, so stale handles never alias a newer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    idx: u32,
    generation: u32,
}
impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}v{}", self.idx, self.generation)
    }
}

#[derive(Debug)]
struct Entry<T> {
    generation: u32,
    // Err holds the next free index
    value: Result<T, u32>,
}

#[derive(Debug)]
pub struct SlotMap<T> {
    head: u32,
    len: usize,
    entries: Vec<Entry<T>>,
}
impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T> SlotMap<T> {
    pub fn new() -> Self {
        Self {
            head: u32::MAX,
            len: 0,
            entries: vec![],
        }
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.entries
            .get(handle.idx as usize)
            .filter(|e| e.generation == handle.generation)
            .and_then(|e| e.value.as_ref().ok())
    }
    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;
        if self.head == u32::MAX {
            let idx = self.entries.len() as u32;
            self.entries.push(Entry { generation: 0, value: Ok(value) });
            Handle { idx, generation: 0 }
        } else {
            let idx = self.head;
            let entry = &mut self.entries[idx as usize];
            let next = core::mem::replace(&mut entry.value, Ok(value));
            // free entries always hold Err
            self.head = next.err().unwrap_or(u32::MAX);
            Handle { idx, generation: entry.generation }
        }
    }
    pub fn release(&mut self, handle: Handle) -> Option<T> {
        let entry = self.entries.get_mut(handle.idx as usize)?;
        if entry.generation != handle.generation || entry.value.is_err() {
            return None;
        }
        entry.generation = entry.generation.wrapping_add(1);
        self.len -= 1;
        let old = core::mem::replace(&mut entry.value, Err(self.head));
        self.head = handle.idx;
        old.ok()
    }
    pub fn retain(&mut self, mut f: impl FnMut(Handle, &mut T) -> bool) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            let handle = Handle { idx: i as u32, generation: entry.generation };
            if let Ok(item) = &mut entry.value {
                if !f(handle, item) {
                    entry.value = Err(core::mem::replace(&mut self.head, i as u32));
                    entry.generation = entry.generation.wrapping_add(1);
                    self.len -= 1;
                }
            }
        }
    }
}
