use crate::{model::CityQuery, store::KeyValueStore};

pub const HISTORY_CAPACITY: usize = 5;

/// Key the history is stored under, as a JSON array of strings.
pub const HISTORY_KEY: &str = "recentSearches";

/// Most-recent-first list of distinct past searches, bounded at
/// `HISTORY_CAPACITY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentSearches {
    entries: Vec<CityQuery>,
}

impl RecentSearches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the persisted history. Anything missing or unreadable gives an
    /// empty history.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let raw = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read recent searches; starting empty");
                return Self::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(stored) => {
                let mut history = Self::new();
                for city in stored.iter().filter_map(|s| CityQuery::parse(s)) {
                    if history.entries.len() == HISTORY_CAPACITY {
                        break;
                    }
                    if !history.entries.contains(&city) {
                        history.entries.push(city);
                    }
                }
                history
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed recent searches");
                Self::new()
            }
        }
    }

    /// Put `city` at the front, dropping any earlier copy and whatever falls
    /// past capacity.
    pub fn record(&mut self, city: CityQuery) {
        self.entries.retain(|existing| existing != &city);
        self.entries.insert(0, city);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[CityQuery] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CityQuery> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn persist(&self, store: &mut impl KeyValueStore) -> Result<(), crate::error::StoreError> {
        let names: Vec<&str> = self.entries.iter().map(CityQuery::as_str).collect();
        store.set(HISTORY_KEY, &serde_json::to_string(&names)?)
    }

    /// Drop the persisted key entirely.
    pub fn forget(store: &mut impl KeyValueStore) -> Result<(), crate::error::StoreError> {
        store.remove(HISTORY_KEY)
    }
}
