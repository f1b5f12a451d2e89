use crate::prelude::*;
use crate::allocator::{DimensionMap, SlotAllocator};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRecord {
    pub slot: i32,
    pub key: ResourceLocation,
    pub ty: DimensionType,
}

/// Bijective key <-> slot table, plus the allocator that hands out slots.
#[derive(Debug, Default)]
pub struct Registry {
    has_init: bool,
    dimensions: BTreeMap<i32, DimensionRecord>,
    ids: HashMap<ResourceLocation, i32>,
    allocator: SlotAllocator,
}
impl Registry {
    pub fn new() -> Self {
        Self::default()
    }
    /// Registers the three vanilla dimensions. Only the first call does anything.
    pub fn init(&mut self) -> Result<()> {
        if core::mem::replace(&mut self.has_init, true) {
            return Ok(());
        }
        self.register(0, DimensionType::OVERWORLD, ResourceLocation::minecraft("overworld"))?;
        self.register(-1, DimensionType::NETHER, ResourceLocation::minecraft("the_nether"))?;
        self.register(1, DimensionType::THE_END, ResourceLocation::minecraft("the_end"))?;
        Ok(())
    }
    pub fn register(&mut self, slot: i32, ty: DimensionType, key: ResourceLocation) -> Result<()> {
        if let Some(existing) = self.dimensions.get(&slot) {
            return Err(Error::DuplicateSlot { slot, key, existing: existing.key.clone() });
        }
        if let Some(&existing) = self.ids.get(&key) {
            return Err(Error::DuplicateKey { slot, key, existing });
        }
        self.ids.insert(key.clone(), slot);
        self.dimensions.insert(slot, DimensionRecord { slot, key, ty });
        self.allocator.reserve(slot);
        Ok(())
    }
    /// Registers `key` at the lowest free slot.
    pub fn register_next(&mut self, key: ResourceLocation, ty: DimensionType) -> Result<i32> {
        if key.namespace() == ResourceLocation::MINECRAFT {
            return Err(Error::InvalidKey {
                key: key.to_string(),
                reason: "no mod namespace provided",
            });
        }
        if let Some(&existing) = self.ids.get(&key) {
            return Err(Error::DuplicateKey { slot: existing, key, existing });
        }
        let slot = self.next_free_slot();
        self.register(slot, ty, key)?;
        Ok(slot)
    }
    pub fn unregister_slot(&mut self, slot: i32) -> Result<DimensionRecord> {
        let record = self.dimensions.remove(&slot).ok_or(Error::NotRegistered(slot.into()))?;
        self.ids.remove(&record.key);
        self.allocator.release(slot);
        Ok(record)
    }
    pub fn get(&self, key: &ResourceLocation) -> Result<&DimensionRecord> {
        self.ids
            .get(key)
            .and_then(|slot| self.dimensions.get(slot))
            .ok_or_else(|| Error::NotRegistered(key.into()))
    }
    pub fn get_slot(&self, slot: i32) -> Result<&DimensionRecord> {
        self.dimensions.get(&slot).ok_or(Error::NotRegistered(slot.into()))
    }
    pub fn contains(&self, key: &ResourceLocation) -> bool {
        self.ids.contains_key(key)
    }
    pub fn contains_slot(&self, slot: i32) -> bool {
        self.dimensions.contains_key(&slot)
    }
    pub fn slots(&self) -> impl Iterator<Item = i32> + '_ {
        self.dimensions.keys().copied()
    }
    pub fn records(&self) -> impl Iterator<Item = &DimensionRecord> + '_ {
        self.dimensions.values()
    }
    pub fn of_type(&self, ty: DimensionType) -> impl Iterator<Item = &DimensionRecord> + '_ {
        self.records().filter(move |r| r.ty == ty)
    }
    /// Paths of every key registered under `modid`.
    pub fn for_mod(&self, modid: &str) -> Vec<String> {
        self.records()
            .filter(|r| r.key.namespace() == modid)
            .map(|r| r.key.path().to_owned())
            .collect()
    }
    pub fn next_free_slot(&mut self) -> i32 {
        let dimensions = &self.dimensions;
        self.allocator.allocate(|slot| dimensions.contains_key(&slot))
    }
    pub fn save_dimension_map(&self) -> DimensionMap {
        self.allocator.persist()
    }
    pub fn load_dimension_map(&mut self, snapshot: Option<&DimensionMap>) {
        self.allocator.restore(snapshot, self.dimensions.keys().copied());
    }
}
