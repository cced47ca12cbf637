use serde::ser::{Serialize, SerializeMap, Serializer};

/// A station-id keyed map that iterates in insertion order.
///
/// Tie-breaking in the balancer depends on visiting stations in the order
/// the caller supplied them, so this keeps a plain `Vec` of entries rather
/// than a hashed map. Station counts are small; lookups are linear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for StationMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> StationMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or overwrite. A new key goes to the end; an existing key keeps
    /// its position.
    pub fn insert(&mut self, station_id: impl Into<String>, value: V) {
        let station_id = station_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == station_id) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((station_id, value)),
        }
    }

    pub fn get(&self, station_id: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(id, _)| id == station_id)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, station_id: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(id, _)| id == station_id)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(id, v)| (id.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for StationMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StationMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for StationMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, v) in &self.entries {
            map.serialize_entry(id, v)?;
        }
        map.end()
    }
}
