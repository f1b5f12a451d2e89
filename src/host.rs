use crate::error::BoxError;
use crate::types::DimensionType;
use std::path::PathBuf;

/// The game server the dimension manager runs inside.
///
/// Worlds, their persistence, and the event bus all belong to the host; the
/// manager only decides when to create and tear them down.
pub trait Host {
    type World: Send + Sync + 'static;

    /// Instantiate a world for a registered slot.
    fn create_world(&self, slot: i32, ty: DimensionType) -> Result<Self::World, BoxError>;
    /// Durable save of every loaded chunk.
    fn save(&self, world: &Self::World) -> Result<(), BoxError>;
    fn notify_load(&self, world: &Self::World);
    fn notify_unload(&self, world: &Self::World);
    /// Whether something still needs this world resident: players inside it,
    /// or chunks force-loaded by a mod.
    fn is_pinned(&self, world: &Self::World) -> bool;
    fn flush(&self, world: &Self::World);
    /// Root directory of the save this world belongs to.
    fn world_directory(&self, world: &Self::World) -> PathBuf;
    /// Human-readable name for log lines.
    fn world_name(&self, world: &Self::World) -> String;
}
