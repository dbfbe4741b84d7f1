use crate::types::{AlertConfig, TrackedItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use url::Url;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no tracked item for {0}")]
    UnknownItem(String),
}

/// On-disk layout of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    #[serde(default)]
    tracked_items: Vec<TrackedItem>,
    #[serde(default)]
    last_sync_at: Option<DateTime<Utc>>,
}

/// Tracked items and their price histories, kept in one JSON file.
///
/// Mutations only touch memory; call [`TrackerStore::save`] to persist.
#[derive(Debug)]
pub struct TrackerStore {
    path: PathBuf,
    data: StoreFile,
}

impl TrackerStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => StoreFile::default(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &[TrackedItem] {
        &self.data.tracked_items
    }

    pub fn items_mut(&mut self) -> &mut [TrackedItem] {
        &mut self.data.tracked_items
    }

    pub fn get(&self, url: &str) -> Option<&TrackedItem> {
        let key = url_key(url);
        self.data.tracked_items.iter().find(|item| url_key(&item.url) == key)
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.data.last_sync_at
    }

    pub fn set_last_sync(&mut self, at: DateTime<Utc>) {
        self.data.last_sync_at = Some(at);
    }

    /// Merge a freshly tracked entry: an existing URL takes the entry's title,
    /// currency and timestamp and appends its history; a new URL is inserted.
    pub fn add_or_update(&mut self, mut entry: TrackedItem) -> &TrackedItem {
        let now = Utc::now();
        entry.url = url_key(&entry.url);
        let idx = match self
            .data
            .tracked_items
            .iter()
            .position(|i| url_key(&i.url) == entry.url)
        {
            Some(idx) => {
                let existing = &mut self.data.tracked_items[idx];
                existing.title = entry.title;
                existing.currency = entry.currency;
                existing.last_updated = entry.last_updated;
                existing.prices.extend(entry.prices);
                idx
            }
            None => {
                self.data.tracked_items.push(entry);
                self.data.tracked_items.len() - 1
            }
        };
        self.data.last_sync_at = Some(now);
        &self.data.tracked_items[idx]
    }

    /// Stop tracking `url`. Returns whether anything was removed.
    pub fn remove(&mut self, url: &str) -> bool {
        let key = url_key(url);
        let before = self.data.tracked_items.len();
        self.data.tracked_items.retain(|item| url_key(&item.url) != key);
        self.data.tracked_items.len() != before
    }

    /// Replace the alert of `url`; an alert with no thresholds clears it.
    pub fn update_alert(&mut self, url: &str, alert: AlertConfig) -> Result<(), StoreError> {
        let key = url_key(url);
        let item = self
            .data
            .tracked_items
            .iter_mut()
            .find(|item| url_key(&item.url) == key)
            .ok_or_else(|| StoreError::UnknownItem(url.to_string()))?;
        item.alert = (!alert.is_empty()).then_some(alert);
        Ok(())
    }

    /// Write the store atomically (temp file + rename), creating parent dirs.
    pub fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&self.data).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        info!(
            "saved {} tracked item(s) to {}",
            self.data.tracked_items.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Canonical form items are keyed by: the parsed URL (lowercased host,
/// explicit root path), or the trimmed input when it does not parse.
pub fn url_key(url: &str) -> String {
    let url = url.trim();
    Url::parse(url).map_or_else(|_| url.to_string(), |u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceHistoryPoint;
    use chrono::TimeZone;

    fn item(url: &str, price: f64, day: u32) -> TrackedItem {
        let at = Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap();
        TrackedItem {
            url: url.to_string(),
            title: format!("Item {day}"),
            currency: "USD".into(),
            last_updated: Some(at),
            prices: vec![PriceHistoryPoint { price, date: at }],
            alert: None,
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TrackerStore::open(dir.path().join("nope.json")).unwrap();
        assert!(store.items().is_empty());
        assert!(store.last_sync().is_none());
    }

    #[test]
    fn add_or_update_appends_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TrackerStore::open(dir.path().join("items.json")).unwrap();

        store.add_or_update(item("https://a.example/1", 10.0, 1));
        store.add_or_update(item("https://b.example/2", 99.0, 1));
        let merged = store.add_or_update(item("https://a.example/1", 9.0, 2));

        assert_eq!(merged.title, "Item 2");
        assert_eq!(merged.prices.len(), 2);
        assert_eq!(merged.latest_price(), Some(9.0));
        assert_eq!(store.items().len(), 2);
        assert!(store.last_sync().is_some());
    }

    #[test]
    fn save_and_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("items.json");

        let mut store = TrackerStore::open(&path).unwrap();
        store.add_or_update(item("https://a.example/1", 10.0, 1));
        store
            .update_alert(
                "https://a.example/1",
                AlertConfig {
                    target_price: Some(8.0),
                    target_percent: None,
                },
            )
            .unwrap();
        store.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("trackedItems"));
        assert!(raw.contains("lastSyncAt"));

        let reopened = TrackerStore::open(&path).unwrap();
        assert_eq!(reopened.items(), store.items());
        assert_eq!(
            reopened.get("https://a.example/1").unwrap().alert,
            Some(AlertConfig {
                target_price: Some(8.0),
                target_percent: None
            })
        );
    }

    #[test]
    fn remove_and_unknown_alert() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TrackerStore::open(dir.path().join("items.json")).unwrap();
        store.add_or_update(item("https://a.example/1", 10.0, 1));

        assert!(matches!(
            store.update_alert("https://missing.example", AlertConfig::default()),
            Err(StoreError::UnknownItem(_))
        ));
        assert!(store.remove("https://a.example/1"));
        assert!(!store.remove("https://a.example/1"));
    }

    #[test]
    fn lookups_accept_the_url_as_typed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TrackerStore::open(dir.path().join("items.json")).unwrap();
        let stored = store.add_or_update(item("https://Shop.example", 10.0, 1));
        assert_eq!(stored.url, "https://shop.example/");

        assert!(store.get("https://Shop.example").is_some());
        store
            .update_alert(
                " https://SHOP.example ",
                AlertConfig {
                    target_price: Some(8.0),
                    target_percent: None,
                },
            )
            .unwrap();
        assert!(store.get("https://shop.example/").unwrap().alert.is_some());

        store.add_or_update(item("https://shop.example/", 9.0, 2));
        assert_eq!(store.items().len(), 1);

        assert!(store.remove("https://Shop.example"));
        assert!(store.items().is_empty());
    }

    #[test]
    fn empty_alert_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TrackerStore::open(dir.path().join("items.json")).unwrap();
        store.add_or_update(item("https://a.example/1", 10.0, 1));
        store
            .update_alert(
                "https://a.example/1",
                AlertConfig {
                    target_price: None,
                    target_percent: Some(5.0),
                },
            )
            .unwrap();
        store
            .update_alert("https://a.example/1", AlertConfig::default())
            .unwrap();
        assert!(store.get("https://a.example/1").unwrap().alert.is_none());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            TrackerStore::open(&path),
            Err(StoreError::Json { .. })
        ));
    }
}
