use std::fmt;

/// A namespaced key such as `minecraft:overworld` or `modid:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    namespace: String,
    path: String,
}
impl ResourceLocation {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }
    pub fn minecraft(path: &str) -> Self {
        Self::new(ResourceLocation::MINECRAFT, path)
    }
    pub const MINECRAFT: &'static str = "minecraft";

    /// Parses `modid:name`. The namespace must be present and non-empty.
    pub fn parse(key: &str) -> crate::Result<Self> {
        match key.split_once(':') {
            Some((namespace, path)) if !namespace.is_empty() => Ok(Self::new(namespace, path)),
            _ => Err(crate::Error::InvalidKey {
                key: key.to_owned(),
                reason: "expected the format modid:name",
            }),
        }
    }
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
    pub fn path(&self) -> &str {
        &self.path
    }
}
impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}
impl std::str::FromStr for ResourceLocation {
    type Err = crate::Error;
    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

/// Capability class of a dimension.
///
/// `keep_loaded` marks types whose worlds must stay resident once loaded,
/// such as the overworld keeping its spawn area around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionType {
    pub id: i32,
    pub name: &'static str,
    pub keep_loaded: bool,
}
impl DimensionType {
    pub const OVERWORLD: Self = Self::new(0, "overworld", true);
    pub const NETHER: Self = Self::new(-1, "the_nether", false);
    pub const THE_END: Self = Self::new(1, "the_end", false);

    pub const fn new(id: i32, name: &'static str, keep_loaded: bool) -> Self {
        Self { id, name, keep_loaded }
    }
}

/// Either side of the key/slot bijection, used to name a dimension in errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionRef {
    Slot(i32),
    Key(ResourceLocation),
}
impl fmt::Display for DimensionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionRef::Slot(slot) => write!(f, "{slot}"),
            DimensionRef::Key(key) => write!(f, "{key}"),
        }
    }
}
impl From<i32> for DimensionRef {
    fn from(slot: i32) -> Self {
        DimensionRef::Slot(slot)
    }
}
impl From<&ResourceLocation> for DimensionRef {
    fn from(key: &ResourceLocation) -> Self {
        DimensionRef::Key(key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_keys() {
        let key = ResourceLocation::parse("modida:custom").unwrap();
        assert_eq!(key.namespace(), "modida");
        assert_eq!(key.path(), "custom");
        assert_eq!(key.to_string(), "modida:custom");
    }

    #[test]
    fn rejects_keys_without_namespace() {
        assert!(matches!(ResourceLocation::parse("custom"), Err(crate::Error::InvalidKey { .. })));
        assert!(matches!(ResourceLocation::parse(":custom"), Err(crate::Error::InvalidKey { .. })));
    }
}
