//! Transcription variant map: id 0 holds the source form, other ids hold alternatives.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::CodecError;

/// Reserved id of the source form.
pub const SOURCE_ID: u32 = 0;

/// Variant id → transcription. Always contains the source entry.
///
/// Ordered by id, so encoding the same map always yields the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantMap {
    entries: BTreeMap<u32, String>,
}

impl VariantMap {
    pub fn new(source: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(SOURCE_ID, source.into());
        Self { entries }
    }

    /// Builder-style insert.
    pub fn with_variant(mut self, id: u32, text: impl Into<String>) -> Self {
        self.insert(id, text);
        self
    }

    /// Insert or replace an entry. Inserting id 0 replaces the source form.
    pub fn insert(&mut self, id: u32, text: impl Into<String>) -> Option<String> {
        self.entries.insert(id, text.into())
    }

    pub fn source(&self) -> &str {
        self.entries
            .get(&SOURCE_ID)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Non-source entries in ascending id order.
    pub fn variants(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries
            .range(SOURCE_ID + 1..)
            .map(|(&id, text)| (id, text.as_str()))
    }

    pub fn variant_count(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(&id, text)| (id, text.as_str()))
    }
}

impl TryFrom<BTreeMap<u32, String>> for VariantMap {
    type Error = CodecError;

    fn try_from(entries: BTreeMap<u32, String>) -> Result<Self, Self::Error> {
        if !entries.contains_key(&SOURCE_ID) {
            return Err(CodecError::MissingSource);
        }
        Ok(Self { entries })
    }
}

impl TryFrom<HashMap<u32, String>> for VariantMap {
    type Error = CodecError;

    fn try_from(entries: HashMap<u32, String>) -> Result<Self, Self::Error> {
        Self::try_from(entries.into_iter().collect::<BTreeMap<_, _>>())
    }
}
