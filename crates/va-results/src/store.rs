//! In-memory named result collections.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use va_core::ResultId;

use crate::types::ResultRecord;
use crate::{ResultsError, ResultsResult};

/// Owns every result record. Ids increase monotonically and are never
/// reused, so the highest id under a name is the most recent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultStore {
    records: BTreeMap<ResultId, ResultRecord>,
    next_id: ResultId,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: ResultId::from_index(0),
        }
    }
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record and return its id.
    pub fn create(&mut self, name: impl Into<String>) -> ResultId {
        let id = self.next_id;
        self.next_id = id.next();
        let record = ResultRecord::new(id, name);
        debug!(id = %id, name = %record.name, "result created");
        self.records.insert(id, record);
        id
    }

    pub fn get(&self, id: ResultId) -> Option<&ResultRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: ResultId) -> Option<&mut ResultRecord> {
        self.records.get_mut(&id)
    }

    pub fn require(&self, id: ResultId) -> ResultsResult<&ResultRecord> {
        self.get(id).ok_or(ResultsError::ResultNotFound { id })
    }

    pub fn require_mut(&mut self, id: ResultId) -> ResultsResult<&mut ResultRecord> {
        self.get_mut(id).ok_or(ResultsError::ResultNotFound { id })
    }

    /// Ids of every record with `name`, oldest first.
    pub fn ids_for(&self, name: &str) -> Vec<ResultId> {
        self.records
            .values()
            .filter(|r| r.name == name)
            .map(|r| r.id)
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.records.values().filter(|r| r.name == name).count()
    }

    pub fn find_latest(&self, name: &str) -> Option<ResultId> {
        self.records
            .values()
            .rev()
            .find(|r| r.name == name)
            .map(|r| r.id)
    }

    /// The `index`-th record with `name`, oldest first.
    pub fn find_nth(&self, name: &str, index: usize) -> Option<ResultId> {
        self.records
            .values()
            .filter(|r| r.name == name)
            .nth(index)
            .map(|r| r.id)
    }

    pub fn delete(&mut self, id: ResultId) -> Option<ResultRecord> {
        self.records.remove(&id)
    }

    /// Delete every record with `name`; returns how many went.
    pub fn clear_named(&mut self, name: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| r.name != name);
        let removed = before - self.records.len();
        if removed > 0 {
            debug!(name, removed, "results cleared");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Distinct record names in id order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for r in self.records.values() {
            if !names.contains(&r.name.as_str()) {
                names.push(&r.name);
            }
        }
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn save_json(&self, path: &Path) -> ResultsResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> ResultsResult<Self> {
        let content = fs::read_to_string(path)?;
        let store = serde_json::from_str(&content)?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_and_nth() {
        let mut s = ResultStore::new();
        let a = s.create("VSPAERO_History");
        let _ = s.create("VSPAERO_Load");
        let b = s.create("VSPAERO_History");
        assert_eq!(s.find_latest("VSPAERO_History"), Some(b));
        assert_eq!(s.find_nth("VSPAERO_History", 0), Some(a));
        assert_eq!(s.ids_for("VSPAERO_History"), vec![a, b]);
        assert_eq!(s.find_latest("VSPAERO_Stab"), None);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut s = ResultStore::new();
        let a = s.create("x");
        s.delete(a);
        let b = s.create("x");
        assert_ne!(a, b);
    }

    #[test]
    fn clear_named_leaves_others() {
        let mut s = ResultStore::new();
        s.create("CpSlicer_Case");
        s.create("CpSlicer_Case");
        let keep = s.create("VSPAERO_Wrapper");
        assert_eq!(s.clear_named("CpSlicer_Case"), 2);
        assert_eq!(s.len(), 1);
        assert!(s.get(keep).is_some());
        assert_eq!(s.names(), vec!["VSPAERO_Wrapper"]);
    }

    #[test]
    fn missing_id_is_an_error() {
        let s = ResultStore::new();
        let err = s.require(ResultId::from_index(7)).unwrap_err();
        assert!(matches!(err, ResultsError::ResultNotFound { .. }));
    }
}
