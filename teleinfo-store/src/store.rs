//! Most-recent value per label, with change detection

use crate::events::{ChangeEvent, ChangeOutcome};
use std::collections::HashMap;
use std::time::SystemTime;
use teleinfo_core::ValidatedMeasurement;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct LabelEntry {
    value: String,
    observed_at: SystemTime,
}

/// Table of the most recently observed value per label
///
/// Writes are exclusive and reads shared, so a concurrent consumer never
/// observes a partially applied measurement. Entries are never deleted:
/// absence of updates, not deletion, is what signals staleness downstream
/// (`last_seen` advances even when a value is unchanged).
///
/// A store is an explicitly owned instance, typically shared behind an
/// `Arc`; independent meter streams can use separate stores or share one.
#[derive(Debug, Default)]
pub struct LabelValueStore {
    entries: RwLock<HashMap<String, LabelEntry>>,
}

impl LabelValueStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one validated measurement in arrival order
    ///
    /// An unseen label or a differing value updates the table and reports a
    /// `ChangeEvent`; an identical value only advances the observation
    /// timestamp.
    pub async fn apply(&self, measurement: &ValidatedMeasurement) -> ChangeOutcome {
        let mut entries = self.entries.write().await;
        match entries.get_mut(measurement.label()) {
            Some(entry) if entry.value == measurement.value() => {
                entry.observed_at = measurement.observed_at();
                ChangeOutcome::Unchanged
            }
            Some(entry) => {
                let old_value =
                    std::mem::replace(&mut entry.value, measurement.value().to_string());
                entry.observed_at = measurement.observed_at();
                ChangeOutcome::Changed(ChangeEvent {
                    label: measurement.label().to_string(),
                    old_value: Some(old_value),
                    new_value: measurement.value().to_string(),
                    observed_at: measurement.observed_at(),
                })
            }
            None => {
                entries.insert(
                    measurement.label().to_string(),
                    LabelEntry {
                        value: measurement.value().to_string(),
                        observed_at: measurement.observed_at(),
                    },
                );
                ChangeOutcome::Changed(ChangeEvent {
                    label: measurement.label().to_string(),
                    old_value: None,
                    new_value: measurement.value().to_string(),
                    observed_at: measurement.observed_at(),
                })
            }
        }
    }

    /// Get the stored value for a label
    pub async fn get(&self, label: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(label)
            .map(|entry| entry.value.clone())
    }

    /// Get the time a label was last observed, changed or not
    pub async fn last_seen(&self, label: &str) -> Option<SystemTime> {
        self.entries
            .read()
            .await
            .get(label)
            .map(|entry| entry.observed_at)
    }

    /// Get a consistent snapshot of all current label values
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(label, entry)| (label.clone(), entry.value.clone()))
            .collect()
    }

    /// Get the number of distinct labels seen
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if no label has been seen yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn measurement(label: &str, value: &str, at_secs: u64) -> ValidatedMeasurement {
        ValidatedMeasurement::new(
            label.to_string(),
            value.to_string(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(at_secs),
        )
    }

    #[tokio::test]
    async fn test_first_observation_is_a_change() {
        let store = LabelValueStore::new();
        let outcome = store.apply(&measurement("PAPP", "01000", 1)).await;
        match outcome {
            ChangeOutcome::Changed(event) => {
                assert_eq!(event.label, "PAPP");
                assert_eq!(event.old_value, None);
                assert_eq!(event.new_value, "01000");
            }
            ChangeOutcome::Unchanged => panic!("expected a change event"),
        }
        assert_eq!(store.get("PAPP").await.as_deref(), Some("01000"));
    }

    #[tokio::test]
    async fn test_value_change_emits_single_event() {
        let store = LabelValueStore::new();
        store.apply(&measurement("PAPP", "01000", 1)).await;
        let outcome = store.apply(&measurement("PAPP", "01500", 2)).await;
        match outcome {
            ChangeOutcome::Changed(event) => {
                assert_eq!(event.old_value.as_deref(), Some("01000"));
                assert_eq!(event.new_value, "01500");
            }
            ChangeOutcome::Unchanged => panic!("expected a change event"),
        }

        // A repeated value is not re-published.
        let outcome = store.apply(&measurement("PAPP", "01500", 3)).await;
        assert!(!outcome.is_change());
    }

    #[tokio::test]
    async fn test_last_seen_advances_without_change() {
        let store = LabelValueStore::new();
        store.apply(&measurement("BASE", "012345678", 10)).await;
        store.apply(&measurement("BASE", "012345678", 20)).await;
        assert_eq!(
            store.last_seen("BASE").await,
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(20))
        );
        assert_eq!(store.last_seen("PAPP").await, None);
    }

    #[tokio::test]
    async fn test_snapshot() {
        let store = LabelValueStore::new();
        assert!(store.is_empty().await);
        store.apply(&measurement("BASE", "012345678", 1)).await;
        store.apply(&measurement("IINST", "018", 1)).await;
        store.apply(&measurement("IINST", "019", 2)).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("BASE").map(String::as_str), Some("012345678"));
        assert_eq!(snapshot.get("IINST").map(String::as_str), Some("019"));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_snapshot_during_writes() {
        let store = std::sync::Arc::new(LabelValueStore::new());
        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..100u64 {
                    store
                        .apply(&measurement("IINST", &format!("{:03}", i), i))
                        .await;
                }
            })
        };
        // Snapshots taken while the writer runs must always be internally
        // consistent: either absent or a fully applied value.
        for _ in 0..50 {
            let snapshot = store.snapshot().await;
            if let Some(value) = snapshot.get("IINST") {
                assert_eq!(value.len(), 3);
            }
        }
        writer.await.unwrap();
        assert_eq!(store.get("IINST").await.as_deref(), Some("099"));
    }
}
