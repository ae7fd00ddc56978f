//! Inventory system - batched load/unload across shelves with rollback

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransactionError;
use crate::registry::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadAction {
    Load,
    Unload,
}

impl FromStr for LoadAction {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Load" => Ok(LoadAction::Load),
            "Unload" => Ok(LoadAction::Unload),
            other => Err(TransactionError::InvalidAction(other.to_string())),
        }
    }
}

impl std::fmt::Display for LoadAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadAction::Load => write!(f, "Load"),
            LoadAction::Unload => write!(f, "Unload"),
        }
    }
}

/// One row of a batch as entered by an operator. Action and amount stay
/// raw text so that bad input is reported at the row it appears in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadEntry {
    pub id: String,
    pub action: String,
    pub amount: String,
}

impl LoadEntry {
    pub fn new(id: impl Into<String>, action: LoadAction, amount: f64) -> Self {
        Self {
            id: id.into(),
            action: action.to_string(),
            amount: amount.to_string(),
        }
    }

    pub fn raw(
        id: impl Into<String>,
        action: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            amount: amount.into(),
        }
    }
}

/// Result of a batch, always returned as data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub success: bool,
    /// Empty on success.
    pub message: String,
    /// One line per applied change, e.g. "  • Storage unit ID# S1: 0 → 5".
    pub change_log: Vec<String>,
}

/// Apply `entries` in order.
///
/// Processing stops at the first bad entry. With `abort_on_error` every
/// shelf is put back to its load from before the call and the log is
/// dropped; otherwise changes made so far stay. Zero amounts are skipped.
pub fn change_storage_load(
    storage: &mut Storage,
    entries: &[LoadEntry],
    abort_on_error: bool,
) -> LoadOutcome {
    let before: Vec<(String, f64)> = storage
        .iter()
        .map(|unit| (unit.id().to_string(), unit.load()))
        .collect();

    let mut change_log = Vec::new();
    let mut failure = None;
    for entry in entries {
        match apply_entry(storage, entry) {
            Ok(Some(line)) => change_log.push(line),
            Ok(None) => {}
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    match failure {
        None => {
            log::info!("Storage load batch committed ({} changes)", change_log.len());
            LoadOutcome {
                success: true,
                message: String::new(),
                change_log,
            }
        }
        Some(e) => {
            if abort_on_error {
                for (id, load) in &before {
                    if let Some(unit) = storage.get_mut(id) {
                        unit.restore_load(*load);
                    }
                }
                change_log.clear();
                log::info!("Storage load batch rolled back: {}", e);
            } else {
                log::warn!("Storage load batch stopped early: {}", e);
            }
            LoadOutcome {
                success: false,
                message: e.to_string(),
                change_log,
            }
        }
    }
}

fn apply_entry(
    storage: &mut Storage,
    entry: &LoadEntry,
) -> Result<Option<String>, TransactionError> {
    let amount: f64 = entry
        .amount
        .trim()
        .parse()
        .map_err(|_| TransactionError::InvalidAmount(entry.amount.clone()))?;
    if !amount.is_finite() {
        return Err(TransactionError::InvalidAmount(entry.amount.clone()));
    }
    if amount < 0.0 {
        return Err(TransactionError::NegativeAmount);
    }
    if amount == 0.0 {
        return Ok(None);
    }
    let action: LoadAction = entry.action.parse()?;
    let unit = storage
        .get_mut(&entry.id)
        .ok_or_else(|| TransactionError::InvalidId(entry.id.clone()))?;

    let old = unit.load();
    match action {
        LoadAction::Load => unit.apply_load(amount)?,
        LoadAction::Unload => unit.apply_unload(amount)?,
    }
    Ok(Some(format!(
        "  \u{2022} Storage unit ID# {}: {} \u{2192} {}",
        entry.id,
        old,
        unit.load()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Position, StorageUnit};

    fn storage() -> Storage {
        let mut storage = Storage::new();
        for (id, x) in [("S1", 2.0), ("S2", 5.0)] {
            let unit = StorageUnit::new(id, Position::new(x, 2.0), Position::new(x, 3.0), 1.0, 10.0)
                .unwrap();
            storage.add(unit, None, None).unwrap();
        }
        storage
    }

    fn loads(storage: &Storage) -> Vec<f64> {
        storage.iter().map(|u| u.load()).collect()
    }

    #[test]
    fn test_batch_commits_in_order() {
        let mut s = storage();
        let outcome = change_storage_load(
            &mut s,
            &[
                LoadEntry::new("S1", LoadAction::Load, 5.0),
                LoadEntry::new("S2", LoadAction::Load, 0.0),
                LoadEntry::new("S1", LoadAction::Unload, 2.0),
            ],
            true,
        );
        assert!(outcome.success);
        assert!(outcome.message.is_empty());
        assert_eq!(
            outcome.change_log,
            vec![
                "  \u{2022} Storage unit ID# S1: 0 \u{2192} 5".to_string(),
                "  \u{2022} Storage unit ID# S1: 5 \u{2192} 3".to_string(),
            ]
        );
        assert_eq!(loads(&s), vec![3.0, 0.0]);
    }

    #[test]
    fn test_negative_amount_rolls_back() {
        let mut s = storage();
        let outcome = change_storage_load(
            &mut s,
            &[
                LoadEntry::new("S1", LoadAction::Load, 4.0),
                LoadEntry::raw("S2", "Load", "-1"),
            ],
            true,
        );
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Negative load detected!!!");
        assert!(outcome.change_log.is_empty());
        assert_eq!(loads(&s), vec![0.0, 0.0]);
    }

    #[test]
    fn test_overflow_without_abort_keeps_earlier_changes() {
        let mut s = storage();
        let outcome = change_storage_load(
            &mut s,
            &[
                LoadEntry::new("S1", LoadAction::Load, 4.0),
                LoadEntry::new("S2", LoadAction::Load, 11.0),
                LoadEntry::new("S1", LoadAction::Load, 1.0),
            ],
            false,
        );
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Overflow shelf S2's capacity");
        assert_eq!(outcome.change_log.len(), 1);
        assert_eq!(loads(&s), vec![4.0, 0.0]);
    }

    #[test]
    fn test_bad_action_id_and_amount() {
        let mut s = storage();
        let outcome = change_storage_load(&mut s, &[LoadEntry::raw("S1", "Shuffle", "1")], true);
        assert_eq!(outcome.message, "Invalid action!!!");

        let outcome = change_storage_load(&mut s, &[LoadEntry::raw("S9", "Load", "1")], true);
        assert_eq!(outcome.message, "Invalid ID detected!!!");

        let outcome = change_storage_load(&mut s, &[LoadEntry::raw("S1", "Load", "lots")], true);
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Invalid amount"));

        for amount in ["inf", "-inf", "NaN"] {
            let entry = LoadEntry::raw("S1", "Load", amount);
            let outcome = change_storage_load(&mut s, &[entry], true);
            assert_eq!(outcome.message, format!("Invalid amount: {:?}", amount));
        }
        assert_eq!(loads(&s), vec![0.0, 0.0]);

        // zero wins over a bad action
        let outcome = change_storage_load(&mut s, &[LoadEntry::raw("S9", "Shuffle", "0")], true);
        assert!(outcome.success);
        assert_eq!(loads(&s), vec![0.0, 0.0]);
    }
}
