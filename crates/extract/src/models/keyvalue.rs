use std::slice::Iter;

/// One labelled value of a stat block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
    pub icon_url: Option<String>,
}

/// Ordered key/value block (stats, movement, "others").
///
/// Insertion order is preserved and the first occurrence of a key wins: the
/// source pages sometimes repeat a label further down a card with a less
/// specific value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct KeyValues(Vec<KeyValueRow>);
impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row unless its key (compared case-insensitively) is already present.
    ///
    /// Returns `true` if the row was added.
    pub fn insert(&mut self, row: KeyValueRow) -> bool {
        if self.contains_key(&row.key) {
            return false;
        }
        self.0.push(row);
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.row(key).is_some()
    }

    /// Looks up a value by key, case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.row(key).map(|row| row.value.as_str())
    }

    pub fn row(&self, key: &str) -> Option<&KeyValueRow> {
        self.0.iter().find(|row| row.key.eq_ignore_ascii_case(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|row| row.key.as_str())
    }

    pub fn iter(&self) -> Iter<'_, KeyValueRow> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl FromIterator<KeyValueRow> for KeyValues {
    fn from_iter<T: IntoIterator<Item = KeyValueRow>>(iter: T) -> Self {
        let mut values = Self::new();
        for row in iter {
            values.insert(row);
        }
        values
    }
}
impl<'a> IntoIterator for &'a KeyValues {
    type Item = &'a KeyValueRow;
    type IntoIter = Iter<'a, KeyValueRow>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One row of a levelled table: the level, then header → cell pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct LevelRow {
    pub level: u32,
    pub values: KeyValues,
}
