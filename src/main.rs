use dimserv::{BoxError, Config, DimensionManager, DimensionMap, DimensionType, Host, ResourceLocation};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::*;

const SKYLANDS: DimensionType = DimensionType::new(2, "skylands", false);
const MINING: DimensionType = DimensionType::new(3, "mining", false);
const RUN_FOR_TICKS: u32 = 20 * 10;

#[derive(Debug)]
struct SimWorld {
    slot: i32,
    name: String,
    players: AtomicU32,
}

/// Stand-in for a real server: worlds are empty shells that remember who's inside.
struct SimHost {
    save_dir: PathBuf,
}
impl Host for SimHost {
    type World = SimWorld;
    fn create_world(&self, slot: i32, ty: DimensionType) -> Result<SimWorld, BoxError> {
        Ok(SimWorld {
            slot,
            name: format!("DIM{slot} {}", ty.name),
            players: AtomicU32::new(0),
        })
    }
    fn save(&self, world: &SimWorld) -> Result<(), BoxError> {
        log::trace!("saving {} to {}", world.name, self.world_directory(world).display());
        Ok(())
    }
    fn notify_load(&self, world: &SimWorld) {
        log::trace!("load event for {}", world.name);
    }
    fn notify_unload(&self, world: &SimWorld) {
        log::trace!("unload event for {}", world.name);
    }
    fn is_pinned(&self, world: &SimWorld) -> bool {
        world.players.load(Ordering::Relaxed) > 0
    }
    fn flush(&self, _world: &SimWorld) {}
    fn world_directory(&self, _world: &SimWorld) -> PathBuf {
        self.save_dir.clone()
    }
    fn world_name(&self, world: &SimWorld) -> String {
        world.name.clone()
    }
}

fn dimension_data(save_root: &Path) -> PathBuf {
    save_root.join("data").join("dimensions.dat")
}

fn main() -> dimserv::Result<()> {
    env_logger::init();
    let mut args = std::env::args_os().skip(1);
    let config = match args.next() {
        Some(path) => Config::load(path)?,
        None => Config { unload_delay: 20, ..Config::default() },
    };
    let save_dir = PathBuf::from(args.next().unwrap_or_else(|| "world".into()));

    let manager = DimensionManager::new(SimHost { save_dir: save_dir.clone() }, config)?;
    manager.load_dimension_map(DimensionMap::read_from(dimension_data(&save_dir))?.as_ref());
    let skylands = manager.register_str("demo:skylands", SKYLANDS)?;
    let mining = manager.register_str("demo:mining", MINING)?;
    log::info!("registered skylands at {skylands}, mining at {mining}");

    let overworld = manager.create_provider(&ResourceLocation::minecraft("overworld"))?;
    manager.set_world(0, Some(overworld.into()))?;
    for slot in manager.registered_slots() {
        let key = manager.key_of(slot)?;
        manager.init_dimension(&key)?;
    }
    if let Some(world) = manager.world(skylands) {
        world.players.store(1, Ordering::Relaxed);
    }

    let starttime = Instant::now();
    let mut tick = 0;
    while tick < RUN_FOR_TICKS {
        match tick {
            20 => {
                manager.queue_unload(mining)?;
                manager.queue_unload(skylands)?;
            }
            100 => {
                if let Some(world) = manager.world(skylands) {
                    world.players.store(0, Ordering::Relaxed);
                }
                manager.queue_unload(skylands)?;
            }
            _ => {}
        }
        for outcome in manager.unload_worlds() {
            log::debug!("tick {tick}: {outcome:?}");
        }
        if tick % 100 == 0 {
            let loaded: Vec<_> = manager.worlds().iter().map(|w| w.slot).collect();
            log::info!("tick {tick}: live dimensions {:?} (by slot {:?})", loaded, manager.live_slots_checked());
        }

        tick += 1;
        let next_tick_due = starttime + tick * Duration::from_millis(50);
        if let Some(wait) = next_tick_due.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
    }

    match manager.current_save_root() {
        Some(root) => manager.save_dimension_map().write_to(dimension_data(&root))?,
        None => log::warn!("overworld unloaded before shutdown, dimension data not saved"),
    }
    Ok(())
}
