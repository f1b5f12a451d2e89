mod collections;
pub mod allocator;
pub mod config;
pub mod error;
pub mod host;
pub mod leaks;
pub mod manager;
pub mod registry;
pub mod types;
pub mod unload;
pub mod worlds;

pub use allocator::DimensionMap;
pub use collections::Handle;
pub use config::Config;
pub use error::{BoxError, Error, Result};
pub use host::Host;
pub use manager::{DimensionManager, UnloadOutcome};
pub use registry::DimensionRecord;
pub use types::{DimensionRef, DimensionType, ResourceLocation};

mod prelude {
    pub(crate) use crate::collections::*;
    pub(crate) use crate::error::{Error, Result};
    pub(crate) use crate::types::*;
    pub(crate) use std::io;
}
