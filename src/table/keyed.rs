use crate::bits::TypedBits;
use crate::error::{EnumError, Result};
use crate::types::EnumType;
use std::collections::HashSet;

/// Ordered map from enum keys to values.
///
/// Keys are unique and keep their insertion position. `default_key` is the
/// candidate for the next insertion and usually fixes the key type.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumKeyedTable<V> {
    default_key: TypedBits,
    entries: Vec<(TypedBits, V)>,
}

impl<V> Default for EnumKeyedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> EnumKeyedTable<V> {
    pub fn new() -> Self {
        Self {
            default_key: TypedBits::empty(),
            entries: Vec::new(),
        }
    }

    pub fn with_default_key(default_key: impl Into<TypedBits>) -> Self {
        Self {
            default_key: default_key.into(),
            entries: Vec::new(),
        }
    }

    pub fn default_key(&self) -> &TypedBits {
        &self.default_key
    }

    pub fn set_default_key(&mut self, key: impl Into<TypedBits>) {
        self.default_key = key.into();
    }

    /// Type the keys are expected to share
    pub fn key_type(&self) -> Option<&EnumType> {
        self.default_key.enum_type()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_of(&self, key: &TypedBits) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains(&self, key: &TypedBits) -> bool {
        self.index_of(key).is_some()
    }

    pub fn get(&self, key: &TypedBits) -> Option<&V> {
        self.index_of(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &TypedBits) -> Option<&mut V> {
        let index = self.index_of(key)?;
        Some(&mut self.entries[index].1)
    }

    /// Inserts or replaces. A replaced entry keeps its position and the old
    /// value is returned.
    pub fn set(&mut self, key: impl Into<TypedBits>, value: V) -> Option<V> {
        let key = key.into();
        match self.index_of(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes the entry for `key`, reporting whether one existed
    pub fn remove(&mut self, key: &TypedBits) -> bool {
        match self.index_of(key) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Result<(TypedBits, V)> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypedBits> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypedBits, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Moves a whole entry (key and value together) to `new_index`
    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> Result<()> {
        self.check_index(old_index)?;
        self.check_index(new_index)?;
        let entry = self.entries.remove(old_index);
        self.entries.insert(new_index, entry);
        Ok(())
    }

    /// Stable ascending sort by the keys' bit patterns
    pub fn sort_by_bits(&mut self) {
        self.entries.sort_by_key(|(k, _)| k.bits());
    }

    /// True when some key occurs more than once
    pub fn validate_duplicates(&self) -> bool {
        has_duplicates(self.keys())
    }

    /// Checks every key against the default key's type
    pub fn validate_key_types(&self) -> Result<()> {
        let Some(expected) = self.key_type() else {
            return Ok(());
        };

        for key in self.keys() {
            if let Some(actual) = key.enum_type() {
                if actual != expected {
                    return Err(EnumError::TypeMismatch {
                        left: format!("{}({})", key, actual.name()),
                        right: format!("{}({})", self.default_key, expected.name()),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(EnumError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}

impl<V: Default> EnumKeyedTable<V> {
    /// Adds `default_key` with a default value unless it is already present
    pub fn insert_default(&mut self) -> bool {
        if self.default_key.is_empty() || self.contains(&self.default_key) {
            return false;
        }
        let key = self.default_key.clone();
        self.entries.push((key, V::default()));
        true
    }

    /// Inserts every value not yet present with a default value.
    /// Returns how many entries were added.
    pub fn fill_missing<I>(&mut self, values: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<TypedBits>,
    {
        let mut added = 0;
        for key in values {
            let key = key.into();
            if !self.contains(&key) {
                self.entries.push((key, V::default()));
                added += 1;
            }
        }
        added
    }

    /// Seeds every declared value of the default key's type
    pub fn fill_from_default_key(&mut self) -> usize {
        let Some(enum_type) = self.key_type().cloned() else {
            return 0;
        };
        let keys: Vec<TypedBits> = enum_type
            .descriptor()
            .values()
            .into_iter()
            .map(|bits| TypedBits::from_bits(enum_type.clone(), bits))
            .collect();
        self.fill_missing(keys)
    }
}

pub(crate) fn has_duplicates<'a>(keys: impl IntoIterator<Item = &'a TypedBits>) -> bool {
    let mut seen = HashSet::new();
    keys.into_iter().any(|k| !seen.insert(k))
}

impl<V> FromIterator<(TypedBits, V)> for EnumKeyedTable<V> {
    fn from_iter<I: IntoIterator<Item = (TypedBits, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.set(key, value);
        }
        if let Some(first) = table.entries.first() {
            table.default_key = first.0.clone();
        }
        table
    }
}

impl<V> IntoIterator for EnumKeyedTable<V> {
    type Item = (TypedBits, V);
    type IntoIter = std::vec::IntoIter<(TypedBits, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a EnumKeyedTable<V> {
    type Item = (&'a TypedBits, &'a V);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (TypedBits, V)>,
        fn(&'a (TypedBits, V)) -> (&'a TypedBits, &'a V),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let split: fn(&'a (TypedBits, V)) -> (&'a TypedBits, &'a V) = |(k, v)| (k, v);
        self.entries.iter().map(split)
    }
}
