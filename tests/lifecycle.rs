use dimserv::{
    BoxError, Config, DimensionManager, DimensionMap, DimensionRef, DimensionType, Error, Host, ResourceLocation,
    UnloadOutcome,
};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const CUSTOM: DimensionType = DimensionType::new(9, "custom", false);

#[derive(Debug)]
struct World {
    slot: i32,
    pinned: AtomicBool,
}

#[derive(Default)]
struct MockHost {
    events: Mutex<Vec<String>>,
    fail_save: AtomicBool,
    fail_create: AtomicBool,
}
impl MockHost {
    fn record(&self, event: String) {
        self.events.lock().push(event);
    }
}
impl Host for MockHost {
    type World = World;
    fn create_world(&self, slot: i32, _ty: DimensionType) -> Result<World, BoxError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err("provider exploded".into());
        }
        self.record(format!("create {slot}"));
        Ok(World { slot, pinned: AtomicBool::new(false) })
    }
    fn save(&self, world: &World) -> Result<(), BoxError> {
        self.record(format!("save {}", world.slot));
        if self.fail_save.load(Ordering::SeqCst) {
            return Err("disk full".into());
        }
        Ok(())
    }
    fn notify_load(&self, world: &World) {
        self.record(format!("load {}", world.slot));
    }
    fn notify_unload(&self, world: &World) {
        self.record(format!("unload {}", world.slot));
    }
    fn is_pinned(&self, world: &World) -> bool {
        world.pinned.load(Ordering::SeqCst)
    }
    fn flush(&self, world: &World) {
        self.record(format!("flush {}", world.slot));
    }
    fn world_directory(&self, _world: &World) -> PathBuf {
        PathBuf::from("/saves/test")
    }
    fn world_name(&self, world: &World) -> String {
        format!("world {}", world.slot)
    }
}

fn manager(unload_delay: u32) -> DimensionManager<MockHost> {
    let config = Config { unload_delay, ..Config::default() };
    DimensionManager::new(MockHost::default(), config).unwrap()
}

fn world(slot: i32) -> Option<Arc<World>> {
    Some(Arc::new(World { slot, pinned: AtomicBool::new(false) }))
}

fn key(s: &str) -> ResourceLocation {
    ResourceLocation::parse(s).unwrap()
}

fn take_events(manager: &DimensionManager<MockHost>) -> Vec<String> {
    std::mem::take(&mut *manager.host().events.lock())
}

#[test]
fn custom_dimension_registration_round_trip() {
    let manager = manager(0);
    let slot = manager.register_str("modidA:custom", CUSTOM).unwrap();
    assert!(slot >= 2);
    assert!(manager.is_registered(&key("modidA:custom")));
    assert_eq!(manager.provider_type(&key("modidA:custom")).unwrap(), CUSTOM);
    assert_eq!(manager.key_of(slot).unwrap(), key("modidA:custom"));
    assert!(manager.is_from_mod(slot, "modidA"));

    manager.unregister(&key("modidA:custom")).unwrap();
    assert!(!manager.is_registered(&key("modidA:custom")));
    assert!(matches!(manager.provider_type_of(slot), Err(Error::NotRegistered(_))));
    assert_eq!(manager.next_free_slot(), slot);
}

#[test]
fn next_free_slot_never_repeats() {
    let manager = manager(0);
    let slots: Vec<_> = (0..5).map(|_| manager.next_free_slot()).collect();
    assert_eq!(slots, vec![2, 3, 4, 5, 6]);
}

#[test]
fn dimension_map_survives_a_restart() {
    let first = manager(0);
    first.register_str("moda:one", CUSTOM).unwrap();
    first.register_str("moda:two", CUSTOM).unwrap();
    let snapshot = DimensionMap::from_nbt(&first.save_dimension_map().to_nbt().unwrap()).unwrap();

    let second = manager(0);
    second.load_dimension_map(Some(&snapshot));
    assert_eq!(second.save_dimension_map(), snapshot);
    assert_eq!(second.register_str("modb:three", CUSTOM).unwrap(), 4);
}

#[test]
fn world_list_puts_vanilla_dimensions_first() {
    let manager = manager(0);
    let extra = manager.register_next(key("moda:extra"), CUSTOM).unwrap();
    manager.register(5, CUSTOM, key("moda:five")).unwrap();
    for slot in [5, 1, extra, -1, 0] {
        manager.set_world(slot, world(slot)).unwrap();
    }
    manager.set_world(extra, None).unwrap();
    let order: Vec<_> = manager.worlds().iter().map(|w| w.slot).collect();
    assert_eq!(order, vec![0, -1, 1, 5]);
    assert_eq!(manager.live_slots(), vec![-1, 0, 1, 5]);
}

#[test]
fn unregistered_slots_cannot_hold_worlds() {
    let manager = manager(0);
    assert!(matches!(manager.set_world(12, world(12)), Err(Error::NotRegistered(DimensionRef::Slot(12)))));
    let slot = manager.register_str("moda:live", CUSTOM).unwrap();
    manager.set_world(slot, world(slot)).unwrap();
    assert!(matches!(manager.unregister_slot(slot), Err(Error::DimensionLoaded(s)) if s == slot));
    assert!(manager.is_slot_registered(slot));
}

#[test]
fn queued_world_unloads_after_exactly_the_delay() {
    let manager = manager(3);
    let slot = manager.register_str("moda:dim", CUSTOM).unwrap();
    manager.set_world(slot, world(slot)).unwrap();
    manager.queue_unload(slot).unwrap();
    assert!(manager.is_world_queued_to_unload(&key("moda:dim")));

    assert!(manager.unload_worlds().is_empty());
    assert!(manager.unload_worlds().is_empty());
    assert!(manager.is_loaded(slot));

    let outcomes = manager.unload_worlds();
    assert!(matches!(outcomes.as_slice(), [UnloadOutcome::Unloaded { save_error: None, .. }]));
    assert!(!manager.is_loaded(slot));
    assert!(!manager.is_queued_to_unload(slot));
    assert_eq!(take_events(&manager), vec![format!("save {slot}"), format!("unload {slot}"), format!("flush {slot}")]);
}

#[test]
fn requeueing_restarts_the_delay() {
    let manager = manager(3);
    let slot = manager.register_str("moda:dim", CUSTOM).unwrap();
    manager.set_world(slot, world(slot)).unwrap();
    manager.unload_world(&key("moda:dim")).unwrap();
    manager.unload_worlds();
    manager.unload_worlds();
    manager.unload_world(&key("moda:dim")).unwrap();
    manager.unload_worlds();
    manager.unload_worlds();
    assert!(manager.is_loaded(slot));
    manager.unload_worlds();
    assert!(!manager.is_loaded(slot));
}

#[test]
fn pinned_worlds_are_dropped_from_the_queue_but_stay_loaded() {
    let manager = manager(1);
    let slot = manager.register_str("moda:busy", CUSTOM).unwrap();
    let busy = world(slot).unwrap();
    busy.pinned.store(true, Ordering::SeqCst);
    manager.set_world(slot, Some(busy)).unwrap();
    manager.queue_unload(slot).unwrap();

    assert!(matches!(manager.unload_worlds().as_slice(), [UnloadOutcome::Aborted { .. }]));
    assert!(manager.is_loaded(slot));
    assert!(!manager.is_queued_to_unload(slot));
    assert!(manager.unload_worlds().is_empty());
    assert!(take_events(&manager).is_empty());
}

#[test]
fn resident_types_and_missing_worlds_abort() {
    let manager = manager(1);
    manager.set_world(0, world(0)).unwrap();
    let slot = manager.register_str("moda:empty", CUSTOM).unwrap();
    manager.queue_unload(0).unwrap();
    manager.queue_unload(slot).unwrap();
    let outcomes = manager.unload_worlds();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| matches!(o, UnloadOutcome::Aborted { .. })));
    assert!(manager.is_loaded(0));
    assert!(matches!(manager.queue_unload(77), Err(Error::NotRegistered(_))));
}

#[test]
fn save_failure_does_not_stop_the_unload() {
    let manager = manager(1);
    let slot = manager.register_str("moda:dim", CUSTOM).unwrap();
    manager.set_world(slot, world(slot)).unwrap();
    manager.host().fail_save.store(true, Ordering::SeqCst);
    manager.queue_unload(slot).unwrap();

    let outcomes = manager.unload_worlds();
    assert!(matches!(
        outcomes.as_slice(),
        [UnloadOutcome::Unloaded { save_error: Some(Error::SaveFailed { .. }), .. }]
    ));
    assert!(!manager.is_loaded(slot));
    assert_eq!(take_events(&manager), vec![format!("save {slot}"), format!("unload {slot}"), format!("flush {slot}")]);
}

#[test]
fn hotloading_needs_the_overworld() {
    let manager = manager(0);
    let slot = manager.register_str("moda:hot", CUSTOM).unwrap();
    assert!(matches!(manager.init_dimension(&key("moda:hot")), Err(Error::HotloadUnavailable)));
    assert_eq!(manager.current_save_root(), None);

    manager.set_world(0, world(0)).unwrap();
    let hot = manager.init_dimension(&key("moda:hot")).unwrap();
    assert_eq!(hot.slot, slot);
    assert!(manager.is_loaded(slot));
    assert_eq!(take_events(&manager), vec![format!("create {slot}"), format!("load {slot}")]);
    assert_eq!(manager.current_save_root(), Some(PathBuf::from("/saves/test")));

    assert!(matches!(manager.init_dimension(&key("moda:cold")), Err(Error::NotRegistered(_))));
}

#[test]
fn provider_failures_are_surfaced() {
    let manager = manager(0);
    manager.set_world(0, world(0)).unwrap();
    manager.register_str("moda:broken", CUSTOM).unwrap();
    manager.host().fail_create.store(true, Ordering::SeqCst);
    let err = manager.init_dimension(&key("moda:broken")).unwrap_err();
    assert!(matches!(err, Error::ProviderCreationFailed { .. }));
    assert!(std::error::Error::source(&err).is_some());
    assert!(!manager.is_registered(&key("moda:missing")));
}

#[test]
fn worlds_held_after_unload_are_reported_as_leaks() {
    let manager = manager(1);
    let slot = manager.register_str("moda:leaky", CUSTOM).unwrap();
    manager.set_world(slot, world(slot)).unwrap();
    let held = manager.world(slot).unwrap();
    manager.queue_unload(slot).unwrap();
    manager.unload_worlds();

    let mut reported_at = vec![];
    for sighting in 1..=10 {
        if !manager.scan_for_leaks().is_empty() {
            reported_at.push(sighting);
        }
    }
    assert_eq!(reported_at, vec![5, 10]);

    drop(held);
    assert!(manager.scan_for_leaks().is_empty());
    assert!(manager.live_slots_checked().is_empty());
}

#[test]
fn readers_never_see_a_half_built_world_list() {
    let manager = manager(0);
    for slot in 2..10 {
        manager.register(slot, CUSTOM, key(&format!("moda:dim{slot}"))).unwrap();
    }
    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..200 {
                let slots: Vec<_> = manager.worlds().iter().map(|w| w.slot).collect();
                let primaries: Vec<_> = slots.iter().copied().take_while(|s| (-1..=1).contains(s)).collect();
                let expected: Vec<_> = [0, -1, 1].into_iter().filter(|s| primaries.contains(s)).collect();
                assert_eq!(primaries, expected);
                assert!(slots[primaries.len()..].windows(2).all(|w| w[0] < w[1]));
            }
        });
        for round in 0..50 {
            for slot in [3, 1, 0, 7, -1] {
                let w = if round % 2 == 0 { world(slot) } else { None };
                manager.set_world(slot, w).unwrap();
            }
        }
    });
}

#[test]
fn racing_unregisters_leave_later_registrations_alone() {
    let manager = manager(0);
    for _ in 0..200 {
        manager.register_str("moda:x", CUSTOM).unwrap();
        let (first, second) = std::thread::scope(|s| {
            let a = s.spawn(|| manager.unregister(&key("moda:x")).is_ok());
            let b = s.spawn(|| {
                let removed = manager.unregister(&key("moda:x")).is_ok();
                manager.register_str("modb:y", CUSTOM).unwrap();
                removed
            });
            (a.join().unwrap(), b.join().unwrap())
        });
        assert!(first ^ second);
        assert!(manager.is_registered(&key("modb:y")));
        assert!(!manager.is_registered(&key("moda:x")));
        manager.unregister(&key("modb:y")).unwrap();
    }
}

#[test]
fn concurrent_hotloads_publish_one_world() {
    let manager = manager(0);
    manager.set_world(0, world(0)).unwrap();
    let slot = manager.register_str("moda:hot", CUSTOM).unwrap();
    take_events(&manager);

    let loaded: Vec<_> = std::thread::scope(|s| {
        let threads: Vec<_> = (0..8).map(|_| s.spawn(|| manager.init_dimension(&key("moda:hot")).unwrap())).collect();
        threads.into_iter().map(|t| t.join().unwrap()).collect()
    });
    let live = manager.world(slot).unwrap();
    assert!(loaded.iter().all(|w| Arc::ptr_eq(w, &live)));
    let loads = take_events(&manager).into_iter().filter(|e| e.starts_with("load")).count();
    assert_eq!(loads, 1);
}
