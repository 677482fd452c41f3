//! Saved stations, persisted as a single line of JSON: `{"<location>": [uid, ...]}`.
//!
//! The location key is the search query the station was found with, so `show`
//! can repeat that query and pick the saved stations out of the response.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadySaved,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationRegistry {
    locations: BTreeMap<String, Vec<i64>>,
}

impl StationRegistry {
    /// A missing or empty file is an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no stations file yet");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read stations file: {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(contents.trim())
            .with_context(|| format!("Failed to parse stations file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(self).context("Failed to serialize saved stations")?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write stations file: {}", path.display()))?;

        debug!(path = %path.display(), locations = self.locations.len(), "stations saved");
        Ok(())
    }

    pub fn add(&mut self, location: &str, uid: i64) -> AddOutcome {
        let uids = self.locations.entry(location.to_string()).or_default();

        if uids.contains(&uid) {
            AddOutcome::AlreadySaved
        } else {
            uids.push(uid);
            AddOutcome::Added
        }
    }

    /// Returns whether anything was removed. Locations left without stations are dropped.
    pub fn remove(&mut self, location: &str, uid: i64) -> bool {
        let Some(uids) = self.locations.get_mut(location) else {
            return false;
        };

        let before = uids.len();
        uids.retain(|&u| u != uid);
        let removed = uids.len() != before;

        if uids.is_empty() {
            self.locations.remove(location);
        }

        removed
    }

    pub fn uids_for(&self, location: &str) -> &[i64] {
        self.locations.get(location).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    pub fn all_uids(&self) -> BTreeSet<i64> {
        self.locations.values().flatten().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_detects_duplicates_per_location() {
        let mut reg = StationRegistry::default();

        assert_eq!(reg.add("kathmandu", 10495), AddOutcome::Added);
        assert_eq!(reg.add("kathmandu", 9468), AddOutcome::Added);
        assert_eq!(reg.add("kathmandu", 10495), AddOutcome::AlreadySaved);
        assert_eq!(reg.add("nepal", 10495), AddOutcome::Added);

        assert_eq!(reg.uids_for("kathmandu"), &[10495, 9468]);
        assert_eq!(reg.all_uids().into_iter().collect::<Vec<_>>(), vec![9468, 10495]);
    }

    #[test]
    fn remove_drops_empty_locations() {
        let mut reg = StationRegistry::default();
        reg.add("kathmandu", 1);
        reg.add("kathmandu", 2);

        assert!(reg.remove("kathmandu", 1));
        assert_eq!(reg.uids_for("kathmandu"), &[2]);
        assert!(!reg.remove("kathmandu", 1));

        assert!(reg.remove("kathmandu", 2));
        assert_eq!(reg.locations().count(), 0);
        assert!(reg.is_empty());
        assert!(!reg.remove("pokhara", 2));
    }

    #[test]
    fn file_is_a_single_json_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations");

        let mut reg = StationRegistry::default();
        reg.add("kathmandu", 10495);
        reg.add("delhi", 7021);
        reg.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"delhi":[7021],"kathmandu":[10495]}"#);

        let loaded = StationRegistry::load(&path).unwrap();
        assert_eq!(loaded, reg);
    }

    #[test]
    fn missing_and_blank_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations");
        assert!(StationRegistry::load(&path).unwrap().is_empty());

        fs::write(&path, "\n").unwrap();
        assert!(StationRegistry::load(&path).unwrap().is_empty());
    }

    #[test]
    fn reads_files_written_with_a_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations");
        fs::write(&path, "{\"london\": [5724]}\n").unwrap();

        let reg = StationRegistry::load(&path).unwrap();
        assert_eq!(reg.uids_for("london"), &[5724]);
        assert_eq!(reg.locations().collect::<Vec<_>>(), vec!["london"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations");
        fs::write(&path, "{not json").unwrap();

        let err = StationRegistry::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse stations file"));
    }
}
