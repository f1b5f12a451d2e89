use crate::prelude::*;
use std::path::Path;

/// Occupancy bitmap of non-negative dimension slots.
#[derive(Debug, Default)]
pub struct SlotAllocator {
    reserved: BitSet,
}
impl SlotAllocator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn is_reserved(&self, slot: i32) -> bool {
        slot >= 0 && self.reserved.get(slot as usize)
    }
    /// Negative slots are never tracked.
    pub fn reserve(&mut self, slot: i32) {
        if slot >= 0 {
            self.reserved.set(slot as usize);
        }
    }
    pub fn release(&mut self, slot: i32) {
        if slot >= 0 {
            self.reserved.unset(slot as usize);
        }
    }
    /// Returns the lowest free slot and reserves it.
    ///
    /// Slots that `is_registered` claims are reserved on the way past, since
    /// the bitmap may lag behind the registry after a restore.
    pub fn allocate(&mut self, is_registered: impl Fn(i32) -> bool) -> i32 {
        let mut next = 0;
        loop {
            next = self.reserved.next_clear(next);
            let slot = next as i32;
            self.reserved.set(next);
            if !is_registered(slot) {
                return slot;
            }
        }
    }
    pub fn persist(&self) -> DimensionMap {
        DimensionMap {
            words: self.reserved.words().to_vec(),
        }
    }
    /// With no snapshot, the bitmap is rebuilt from `registered`.
    pub fn restore(&mut self, snapshot: Option<&DimensionMap>, registered: impl IntoIterator<Item = i32>) {
        match snapshot {
            Some(map) => self.reserved = BitSet::from_words(map.words.clone()),
            None => {
                self.reserved.clear();
                registered.into_iter().for_each(|slot| self.reserve(slot));
            }
        }
    }
}

/// Persisted snapshot of the occupancy bitmap.
///
/// Word `i`, bit `j` marks slot `32 * i + j`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionMap {
    pub words: Vec<u32>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct DimensionMapNbt {
    #[serde(rename = "DimensionArray")]
    dimension_array: fastnbt::IntArray,
}

impl DimensionMap {
    pub fn slots(&self) -> Vec<i32> {
        BitSet::from_words(self.words.clone()).iter().map(|i| i as i32).collect()
    }
    pub fn to_nbt(&self) -> crate::Result<Vec<u8>> {
        let nbt = DimensionMapNbt {
            dimension_array: fastnbt::IntArray::new(self.words.iter().map(|&w| w as i32).collect()),
        };
        Ok(fastnbt::to_bytes(&nbt)?)
    }
    pub fn from_nbt(bytes: &[u8]) -> crate::Result<Self> {
        let nbt: DimensionMapNbt = fastnbt::from_bytes(bytes)?;
        Ok(Self {
            words: nbt.dimension_array.iter().map(|&w| w as u32).collect(),
        })
    }
    pub fn write_to(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_nbt()?)?;
        Ok(())
    }
    /// `None` when no snapshot was ever written.
    pub fn read_from(path: impl AsRef<Path>) -> crate::Result<Option<Self>> {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_nbt(&bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
