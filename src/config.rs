use crate::prelude::*;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ticks a queued dimension waits before it is torn down.
    pub unload_delay: u32,
    pub track_leaks: bool,
    /// A leaked world is reported on every n-th sighting.
    pub leak_report_interval: u32,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            unload_delay: 0,
            track_leaks: true,
            leak_report_interval: 5,
        }
    }
}
impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
