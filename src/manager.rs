use crate::prelude::*;
use crate::allocator::DimensionMap;
use crate::leaks::{LeakDetector, LeakReport};
use crate::registry::{DimensionRecord, Registry};
use crate::unload::UnloadQueue;
use crate::worlds::WorldTable;
use crate::{Config, Host};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;

/// What the unload sweep did with a dimension that came due.
#[derive(Debug)]
pub enum UnloadOutcome {
    Unloaded { slot: i32, save_error: Option<Error> },
    /// The world was gone, pinned, or of a type that stays resident.
    Aborted { slot: i32 },
}

/// Owns every dimension the server knows about and every world it has loaded.
///
/// Registration normally happens before the tick loop starts. After that, the
/// main loop calls [`unload_worlds`](Self::unload_worlds) once per tick, while
/// other threads may read the live worlds at any time.
pub struct DimensionManager<H: Host> {
    host: H,
    config: Config,
    registry: RwLock<Registry>,
    worlds: RwLock<WorldTable<H::World>>,
    unload_queue: Mutex<UnloadQueue>,
    leaks: Option<Mutex<LeakDetector<H::World>>>,
}

impl<H: Host> DimensionManager<H> {
    pub fn new(host: H, config: Config) -> Result<Self> {
        let leaks = config.track_leaks.then(|| Mutex::new(LeakDetector::new(config.leak_report_interval)));
        let manager = Self {
            host,
            config,
            registry: RwLock::new(Registry::new()),
            worlds: RwLock::new(WorldTable::new()),
            unload_queue: Mutex::new(UnloadQueue::new()),
            leaks,
        };
        manager.init()?;
        Ok(manager)
    }
    pub fn host(&self) -> &H {
        &self.host
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    /// Registers overworld, nether and end. Safe to call more than once.
    pub fn init(&self) -> Result<()> {
        self.registry.write().init()
    }
}

// registration
impl<H: Host> DimensionManager<H> {
    pub fn register(&self, slot: i32, ty: DimensionType, key: ResourceLocation) -> Result<()> {
        self.registry.write().register(slot, ty, key)
    }
    /// Registers `key` at the next free slot and returns that slot.
    pub fn register_next(&self, key: ResourceLocation, ty: DimensionType) -> Result<i32> {
        self.registry.write().register_next(key, ty)
    }
    /// Like [`register_next`](Self::register_next), for keys written as `modid:name`.
    pub fn register_str(&self, key: &str, ty: DimensionType) -> Result<i32> {
        self.register_next(ResourceLocation::parse(key)?, ty)
    }
    pub fn unregister(&self, key: &ResourceLocation) -> Result<DimensionRecord> {
        let mut registry = self.registry.write();
        let slot = registry.get(key)?.slot;
        self.unregister_locked(&mut registry, slot)
    }
    /// Fails with [`Error::DimensionLoaded`] while the dimension still has a world.
    pub fn unregister_slot(&self, slot: i32) -> Result<DimensionRecord> {
        let mut registry = self.registry.write();
        self.unregister_locked(&mut registry, slot)
    }
    fn unregister_locked(&self, registry: &mut Registry, slot: i32) -> Result<DimensionRecord> {
        if self.worlds.read().contains(slot) {
            return Err(Error::DimensionLoaded(slot));
        }
        let record = registry.unregister_slot(slot)?;
        self.unload_queue.lock().remove(slot);
        Ok(record)
    }
    pub fn is_registered(&self, key: &ResourceLocation) -> bool {
        self.registry.read().contains(key)
    }
    pub fn is_slot_registered(&self, slot: i32) -> bool {
        self.registry.read().contains_slot(slot)
    }
    pub fn record(&self, key: &ResourceLocation) -> Result<DimensionRecord> {
        self.registry.read().get(key).cloned()
    }
    pub fn record_of(&self, slot: i32) -> Result<DimensionRecord> {
        self.registry.read().get_slot(slot).cloned()
    }
    pub fn slot_of(&self, key: &ResourceLocation) -> Result<i32> {
        self.registry.read().get(key).map(|r| r.slot)
    }
    pub fn key_of(&self, slot: i32) -> Result<ResourceLocation> {
        self.registry.read().get_slot(slot).map(|r| r.key.clone())
    }
    pub fn provider_type(&self, key: &ResourceLocation) -> Result<DimensionType> {
        self.registry.read().get(key).map(|r| r.ty)
    }
    pub fn provider_type_of(&self, slot: i32) -> Result<DimensionType> {
        self.registry.read().get_slot(slot).map(|r| r.ty)
    }
    /// Every registered slot, loaded or not.
    pub fn registered_slots(&self) -> Vec<i32> {
        self.registry.read().slots().collect()
    }
    pub fn dimensions_of_type(&self, ty: DimensionType) -> Vec<ResourceLocation> {
        self.registry.read().of_type(ty).map(|r| r.key.clone()).collect()
    }
    pub fn slots_of_type(&self, ty: DimensionType) -> Vec<i32> {
        self.registry.read().of_type(ty).map(|r| r.slot).collect()
    }
    pub fn dimensions_for_mod(&self, modid: &str) -> Vec<String> {
        self.registry.read().for_mod(modid)
    }
    pub fn is_from_mod(&self, slot: i32, modid: &str) -> bool {
        self.registry
            .read()
            .get_slot(slot)
            .map_or(false, |r| r.key.namespace() == modid)
    }
    /// Reserves and returns the lowest unused slot. Each call yields a new slot.
    pub fn next_free_slot(&self) -> i32 {
        self.registry.write().next_free_slot()
    }
    pub fn save_dimension_map(&self) -> DimensionMap {
        self.registry.read().save_dimension_map()
    }
    /// `None` rebuilds the occupancy map from the current registrations.
    pub fn load_dimension_map(&self, snapshot: Option<&DimensionMap>) {
        self.registry.write().load_dimension_map(snapshot)
    }
}

// live worlds
impl<H: Host> DimensionManager<H> {
    /// Publishes or removes the world for `slot` and rebuilds the world list.
    pub fn set_world(&self, slot: i32, world: Option<Arc<H::World>>) -> Result<()> {
        match world {
            Some(world) => self.publish(slot, world, true).map(drop),
            None => {
                self.remove_world(slot);
                Ok(())
            }
        }
    }
    /// Returns whichever world ends up live at `slot`. Without `replace`, an
    /// already-live world wins over `world`.
    fn publish(&self, slot: i32, world: Arc<H::World>, replace: bool) -> Result<Arc<H::World>> {
        let registry = self.registry.read();
        let record = registry.get_slot(slot)?;
        let mut worlds = self.worlds.write();
        if !replace {
            if let Some(existing) = worlds.get(slot) {
                return Ok(existing.clone());
            }
        }
        log::info!("Loading dimension {slot} ({}) ({})", record.key, self.host.world_name(&world));
        worlds.set(slot, Some(world.clone()));
        drop(worlds);
        drop(registry);
        if let Some(leaks) = &self.leaks {
            leaks.lock().track(&world);
        }
        Ok(world)
    }
    fn remove_world(&self, slot: i32) {
        if self.worlds.write().set(slot, None).is_some() {
            log::info!("Unloading dimension {slot}");
        }
    }
    pub fn set_world_by_key(&self, key: &ResourceLocation, world: Option<Arc<H::World>>) -> Result<()> {
        self.set_world(self.slot_of(key)?, world)
    }
    pub fn world(&self, slot: i32) -> Option<Arc<H::World>> {
        self.worlds.read().get(slot).cloned()
    }
    pub fn world_by_key(&self, key: &ResourceLocation) -> Option<Arc<H::World>> {
        self.slot_of(key).ok().and_then(|slot| self.world(slot))
    }
    /// Live worlds, overworld, nether and end first.
    pub fn worlds(&self) -> Arc<[Arc<H::World>]> {
        self.worlds.read().ordered()
    }
    pub fn is_loaded(&self, slot: i32) -> bool {
        self.worlds.read().contains(slot)
    }
    /// Slots with a loaded world, as opposed to merely registered ones.
    pub fn live_slots(&self) -> Vec<i32> {
        self.worlds.read().slots().collect()
    }
    /// [`live_slots`](Self::live_slots), after checking for leaked worlds.
    pub fn live_slots_checked(&self) -> Vec<i32> {
        self.scan_for_leaks();
        self.live_slots()
    }
    pub fn scan_for_leaks(&self) -> Vec<LeakReport> {
        let Some(leaks) = &self.leaks else {
            return vec![];
        };
        let live = self.worlds();
        leaks.lock().scan(&live, |w| self.host.world_name(w))
    }
    /// Asks the host for a fresh world for `key`, without publishing it.
    pub fn create_provider(&self, key: &ResourceLocation) -> Result<H::World> {
        let record = self.record(key)?;
        self.create_provider_for(&record)
    }
    fn create_provider_for(&self, record: &DimensionRecord) -> Result<H::World> {
        self.host.create_world(record.slot, record.ty).map_err(|source| {
            log::error!(
                "An error occurred trying to create a world for {} ({}): {source}",
                record.key, record.ty.name
            );
            Error::ProviderCreationFailed { slot: record.slot, source }
        })
    }
    /// Loads a registered dimension while the server is running.
    ///
    /// The overworld has to be live already; it owns the save the new world
    /// is stored in. If the dimension is already live, or another thread
    /// publishes it first, that world is returned and no load event fires.
    pub fn init_dimension(&self, key: &ResourceLocation) -> Result<Arc<H::World>> {
        if !self.is_loaded(0) {
            return Err(Error::HotloadUnavailable);
        }
        let record = self.record(key).map_err(|e| {
            log::error!("Cannot hotload dimension {key}: {e}");
            e
        })?;
        if let Some(world) = self.world(record.slot) {
            return Ok(world);
        }
        let created = Arc::new(self.create_provider_for(&record)?);
        let world = self.publish(record.slot, created.clone(), false)?;
        if Arc::ptr_eq(&world, &created) {
            self.host.notify_load(&world);
        }
        Ok(world)
    }
    /// Save directory of the running server, found through the overworld.
    pub fn current_save_root(&self) -> Option<PathBuf> {
        self.world(0).map(|overworld| self.host.world_directory(&overworld))
    }
}

// unloading
impl<H: Host> DimensionManager<H> {
    /// Queues a dimension to unload. If it is already queued, its delay restarts.
    pub fn queue_unload(&self, slot: i32) -> Result<()> {
        if !self.is_slot_registered(slot) {
            return Err(Error::NotRegistered(slot.into()));
        }
        if self.unload_queue.lock().enqueue(slot) {
            log::debug!("Queueing dimension {slot} to unload");
        }
        Ok(())
    }
    pub fn unload_world(&self, key: &ResourceLocation) -> Result<()> {
        self.queue_unload(self.slot_of(key)?)
    }
    pub fn is_queued_to_unload(&self, slot: i32) -> bool {
        self.unload_queue.lock().contains(slot)
    }
    pub fn is_world_queued_to_unload(&self, key: &ResourceLocation) -> bool {
        self.slot_of(key).map_or(false, |slot| self.is_queued_to_unload(slot))
    }
    /// Advances the unload queue by one tick and tears down whatever came due.
    ///
    /// Called by the server loop once per tick. Slots queued while this runs
    /// wait for the next call.
    pub fn unload_worlds(&self) -> Vec<UnloadOutcome> {
        let due = self.unload_queue.lock().advance(self.config.unload_delay);
        due.into_iter().map(|slot| self.teardown(slot)).collect()
    }
    fn teardown(&self, slot: i32) -> UnloadOutcome {
        let keep_loaded = self.registry.read().get_slot(slot).map(|r| r.ty.keep_loaded);
        let world = match (keep_loaded, self.world(slot)) {
            (Ok(false), Some(world)) if !self.host.is_pinned(&world) => world,
            _ => {
                log::debug!("Aborting unload for dimension {slot} as status changed");
                return UnloadOutcome::Aborted { slot };
            }
        };
        let save_error = self.host.save(&world).err().map(|source| {
            let err = Error::SaveFailed { slot, source };
            log::error!("{err}, unloading anyway: {}", std::error::Error::source(&err).map_or(String::new(), |e| e.to_string()));
            err
        });
        self.host.notify_unload(&world);
        self.host.flush(&world);
        self.remove_world(slot);
        UnloadOutcome::Unloaded { slot, save_error }
    }
}
