//! Photo records and the ordered gallery collection.

use serde::{Deserialize, Serialize};

/// One photograph known to the gallery.
///
/// Serialized with the field names the metadata store has always used
/// (`filepath`, `webviewPath`). Inline content is reconstructible from the
/// blob store and is never written to metadata.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Where the payload lives in the blob store: a bare filename on web hosts,
    /// a `file://` URI on native hosts.
    #[serde(rename = "filepath")]
    pub locator: String,

    /// Reference the UI can render directly.
    #[serde(
        rename = "webviewPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_reference: Option<String>,

    /// `data:` URI with the payload inlined, only on hosts that cannot address
    /// local files by URI.
    #[serde(skip)]
    pub inline_content: Option<String>,
}

impl PhotoRecord {
    pub fn new(locator: impl Into<String>, display_reference: Option<String>) -> Self {
        Self {
            locator: locator.into(),
            display_reference,
            inline_content: None,
        }
    }

    /// Blob store name for this record: the locator's trailing path segment.
    pub fn blob_name(&self) -> &str {
        blob_name_of(&self.locator)
    }
}

/// Strip any path or URI prefix from a locator.
pub fn blob_name_of(locator: &str) -> &str {
    match locator.rfind('/') {
        Some(idx) => &locator[idx + 1..],
        None => locator,
    }
}

/// Newest-first ordered sequence of photos.
///
/// Locators are unique within a collection.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct PhotoCollection(Vec<PhotoRecord>);

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhotoRecord> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, PhotoRecord> {
        self.0.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&PhotoRecord> {
        self.0.get(index)
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.0.iter().any(|p| p.locator == locator)
    }

    /// Insert at the front. Returns the record back if its locator is taken.
    pub fn prepend(&mut self, record: PhotoRecord) -> Result<(), PhotoRecord> {
        if self.contains(&record.locator) {
            return Err(record);
        }
        self.0.insert(0, record);
        Ok(())
    }

    /// Remove the record with this locator, if any.
    pub fn remove_by_locator(&mut self, locator: &str) -> Option<PhotoRecord> {
        let idx = self.0.iter().position(|p| p.locator == locator)?;
        Some(self.0.remove(idx))
    }

    /// Copy of the collection with every `inline_content` cleared.
    pub fn stripped(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|p| PhotoRecord {
                    inline_content: None,
                    ..p.clone()
                })
                .collect(),
        )
    }

    /// Drop later records whose locator already appeared. Returns how many
    /// were dropped.
    pub fn dedup_locators(&mut self) -> usize {
        let before = self.0.len();
        let mut seen = std::collections::HashSet::new();
        self.0.retain(|p| seen.insert(p.locator.clone()));
        before - self.0.len()
    }

    pub fn locators(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.locator.as_str()).collect()
    }
}

impl From<Vec<PhotoRecord>> for PhotoCollection {
    fn from(records: Vec<PhotoRecord>) -> Self {
        Self(records)
    }
}

impl IntoIterator for PhotoCollection {
    type Item = PhotoRecord;
    type IntoIter = std::vec::IntoIter<PhotoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PhotoCollection {
    type Item = &'a PhotoRecord;
    type IntoIter = std::slice::Iter<'a, PhotoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
