//! Embedded asset access.

/// Maps a logical asset name to its text content.
///
/// Generators that ship fixed support files (runtime helpers, base classes)
/// resolve them through this capability instead of reading paths, so the
/// embedding mechanism can differ per target language packaging.
pub trait AssetSource {
    /// Look up an asset by logical name.
    fn asset(&self, name: &str) -> Option<&'static str>;

    /// All logical names, in a stable order.
    fn names(&self) -> Vec<&'static str>;
}

/// An `AssetSource` backed by a compile-time table.
#[derive(Debug, Clone, Copy)]
pub struct StaticAssets {
    entries: &'static [(&'static str, &'static str)],
}

impl StaticAssets {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }
}

impl AssetSource for StaticAssets {
    fn asset(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, content)| *content)
    }

    fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(n, _)| *n).collect()
    }
}
