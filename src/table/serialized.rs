use super::keyed::{has_duplicates, EnumKeyedTable};
use crate::bits::TypedBits;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Flattened form of an `EnumKeyedTable`: parallel key and value sequences
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedTable<V> {
    pub default_key: TypedBits,
    pub keys: Vec<TypedBits>,
    pub values: Vec<V>,
}

impl<V> SerializedTable<V> {
    /// Duplicates can only exist in hand-edited or merged data
    pub fn has_duplicate_keys(&self) -> bool {
        has_duplicates(&self.keys)
    }
}

#[derive(Serialize)]
struct SerializedTableRef<'a, V> {
    default_key: &'a TypedBits,
    keys: Vec<&'a TypedBits>,
    values: Vec<&'a V>,
}

impl<V: Clone> EnumKeyedTable<V> {
    pub fn to_serialized(&self) -> SerializedTable<V> {
        SerializedTable {
            default_key: self.default_key().clone(),
            keys: self.keys().cloned().collect(),
            values: self.values().cloned().collect(),
        }
    }
}

impl<V> From<SerializedTable<V>> for EnumKeyedTable<V> {
    /// Zips keys with values. A repeated key overwrites the earlier value in
    /// the earlier position.
    fn from(serialized: SerializedTable<V>) -> Self {
        let SerializedTable {
            default_key,
            keys,
            values,
        } = serialized;

        if keys.len() != values.len() {
            tracing::warn!(
                "Table has {} keys but {} values, dropping unmatched entries",
                keys.len(),
                values.len()
            );
        }

        let mut table = EnumKeyedTable::with_default_key(default_key);
        for (key, value) in keys.into_iter().zip(values) {
            table.set(key, value);
        }
        tracing::debug!("Loaded enum-keyed table with {} entries", table.len());
        table
    }
}

impl<V: Serialize> EnumKeyedTable<V> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<V: DeserializeOwned> EnumKeyedTable<V> {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<V: Serialize> Serialize for EnumKeyedTable<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SerializedTableRef {
            default_key: self.default_key(),
            keys: self.keys().collect(),
            values: self.values().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for EnumKeyedTable<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        SerializedTable::deserialize(deserializer).map(EnumKeyedTable::from)
    }
}
