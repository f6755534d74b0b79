use alloc::vec::Vec;

use crate::*;

/// Line separating levels inside a pack file.
pub const PACK_SEPARATOR: &str = "===";

/// A level entry that could not be loaded. `index` is its 0-based position in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogFailure {
    pub index: usize,
    pub error: MalformedLevel,
}

/// Ordered collection of loaded levels. A malformed entry is skipped and recorded, never fatal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    levels: Vec<Level>,
    failures: Vec<CatalogFailure>,
}

impl Catalog {
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> Self {
        let mut catalog = Self::default();
        for (index, source) in sources.into_iter().enumerate() {
            match format::parse(source) {
                Ok(level) => catalog.levels.push(level),
                Err(error) => {
                    log::warn!("Skipping level #{index}: {error}");
                    catalog.failures.push(CatalogFailure { index, error });
                }
            }
        }
        catalog
    }

    /// Loads every `===`-separated entry of a pack.
    ///
    /// Entries holding only blank or comment lines are ignored.
    pub fn from_pack(text: &str) -> Self {
        Self::from_sources(split_pack(text))
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn failures(&self) -> &[CatalogFailure] {
        &self.failures
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.name() == name)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

fn split_pack(text: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim() == PACK_SEPARATOR {
            entries.push(&text[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    entries.push(&text[start..]);

    entries.retain(|entry| {
        entry
            .lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && !line.starts_with(format::COMMENT_PREFIX))
    });
    entries
}
