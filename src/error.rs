use thiserror::Error;

use crate::types::{DimensionRef, ResourceLocation};

/// Failure reported by a [`Host`](crate::Host) callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to register dimension {key}: slot {slot} already belongs to {existing}")]
    DuplicateSlot {
        slot: i32,
        key: ResourceLocation,
        existing: ResourceLocation,
    },
    #[error("failed to register dimension {key} at slot {slot}: key already bound to slot {existing}")]
    DuplicateKey {
        slot: i32,
        key: ResourceLocation,
        existing: i32,
    },
    #[error("dimension {0} is not registered")]
    NotRegistered(DimensionRef),
    #[error("invalid dimension key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },
    #[error("dimension {0} is still loaded")]
    DimensionLoaded(i32),
    #[error("could not create a world for dimension {slot}")]
    ProviderCreationFailed {
        slot: i32,
        #[source]
        source: BoxError,
    },
    #[error("failed to save dimension {slot}")]
    SaveFailed {
        slot: i32,
        #[source]
        source: BoxError,
    },
    #[error("cannot hotload dimension: overworld is not loaded")]
    HotloadUnavailable,
    #[error("malformed dimension data")]
    Nbt(#[from] fastnbt::error::Error),
    #[error("malformed config")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
