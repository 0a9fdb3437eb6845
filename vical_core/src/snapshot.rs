//! Calendar snapshot for deterministic undo/redo comparison

use crate::model::Subcalendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whole-model state plus the cursor
///
/// Subcalendars keep their order and each keeps its sorted items, so two
/// snapshots are equal exactly when the models are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSnapshot {
    pub subcalendars: Vec<Subcalendar>,
    pub selected_date: NaiveDate,
    pub item_index: usize,
    pub subcal_index: usize,
    pub dirty: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

impl CalendarSnapshot {
    /// Snapshot without cursor and history fields, for model-only comparison
    pub fn model_only(&self) -> Vec<Subcalendar> {
        self.subcalendars.clone()
    }

    /// Deterministic hash of the model contents
    #[cfg(test)]
    pub fn hash(&self) -> u64 {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        let encoded = serde_json::to_vec(&self.subcalendars).unwrap();
        hasher.update(&encoded);
        hasher.update(self.selected_date.to_string().as_bytes());
        hasher.update(self.item_index.to_le_bytes());

        let result = hasher.finalize();
        let bytes: [u8; 8] = result[..8].try_into().unwrap();
        u64::from_le_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CalendarItem;

    fn snapshot(name: &str) -> CalendarSnapshot {
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let mut sc = Subcalendar::new("Home", "green");
        sc.insert_item(CalendarItem::task(name, date)).unwrap();
        CalendarSnapshot {
            subcalendars: vec![sc],
            selected_date: date,
            item_index: 0,
            subcal_index: 0,
            dirty: false,
            undo_depth: 0,
            redo_depth: 0,
        }
    }

    #[test]
    fn test_snapshot_hash_deterministic() {
        let snap = snapshot("a");
        assert_eq!(snap.hash(), snap.clone().hash());
    }

    #[test]
    fn test_snapshot_hash_differs_for_different_model() {
        assert_ne!(snapshot("a").hash(), snapshot("b").hash());
    }
}
