//! Transaction log: recording, bounded undo/redo, saved marker

use super::{HistoryError, HistoryResult, Op};
use crate::model::Calendar;
use log::{debug, error, info};
use std::collections::VecDeque;

/// Default number of retained transactions
pub const MAX_HISTORY: usize = 50;

/// Monotonic transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxId(u64);

impl TxId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// An atomic, ordered group of ops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TxId,
    label: String,
    ops: Vec<Op>,
}

impl Transaction {
    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn changes_layout(&self) -> bool {
        self.ops.iter().any(Op::changes_layout)
    }

    fn apply_all(&self, calendar: &mut Calendar) -> HistoryResult<()> {
        for (done, op) in self.ops.iter().enumerate() {
            if let Err(err) = op.apply(calendar) {
                for applied in self.ops[..done].iter().rev() {
                    if let Err(undo_err) = applied.revert(calendar) {
                        error!(
                            "event=tx_compensate_failed module=history id={} op={} error={}",
                            self.id.0,
                            applied.name(),
                            undo_err
                        );
                    }
                }
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn revert_all(&self, calendar: &mut Calendar) -> HistoryResult<()> {
        for (done, op) in self.ops.iter().rev().enumerate() {
            if let Err(err) = op.revert(calendar) {
                for reverted in self.ops[self.ops.len() - done..].iter() {
                    if let Err(redo_err) = reverted.apply(calendar) {
                        error!(
                            "event=tx_compensate_failed module=history id={} op={} error={}",
                            self.id.0,
                            reverted.name(),
                            redo_err
                        );
                    }
                }
                return Err(err.into());
            }
        }
        Ok(())
    }
}

/// Records transactions and replays them for undo/redo
///
/// State machine: idle until [`begin`](Self::begin), recording until
/// [`commit`](Self::commit) or [`rollback`](Self::rollback). Ops passed to
/// [`apply`](Self::apply) are executed against the calendar and recorded in
/// one step so the model never holds an unrecorded mutation.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    undo: VecDeque<Transaction>,
    redo: Vec<Transaction>,
    active: Option<Transaction>,
    next_id: u64,
    max_history: usize,
    saved: Option<TxId>,
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl TransactionLog {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            active: None,
            next_id: 1,
            max_history: max_history.max(1),
            saved: None,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Most recent committed transaction
    pub fn last(&self) -> Option<&Transaction> {
        self.undo.back()
    }

    pub fn begin(&mut self, label: impl Into<String>) -> HistoryResult<TxId> {
        if self.active.is_some() {
            error!("event=tx_begin module=history status=error reason=nested");
            return Err(HistoryError::NestedTransaction);
        }
        let id = TxId(self.next_id);
        self.next_id += 1;
        self.active = Some(Transaction {
            id,
            label: label.into(),
            ops: Vec::new(),
        });
        Ok(id)
    }

    /// Appends an already-applied op to the active transaction
    pub fn record(&mut self, op: Op) -> HistoryResult<()> {
        let active = self.active.as_mut().ok_or(HistoryError::NotRecording)?;
        active.ops.push(op);
        Ok(())
    }

    /// Applies `op` to the calendar and records it
    ///
    /// Nothing is recorded when the op fails; the caller is expected to
    /// roll back.
    pub fn apply(&mut self, calendar: &mut Calendar, op: Op) -> HistoryResult<()> {
        if self.active.is_none() {
            return Err(HistoryError::NotRecording);
        }
        op.apply(calendar)?;
        self.record(op)
    }

    /// Closes the active transaction
    ///
    /// Returns `None` when the transaction held no ops and was discarded.
    pub fn commit(&mut self) -> HistoryResult<Option<TxId>> {
        let tx = self.active.take().ok_or(HistoryError::NotRecording)?;
        if tx.ops.is_empty() {
            debug!("event=tx_discard module=history label={}", tx.label);
            return Ok(None);
        }
        let id = tx.id;
        info!(
            "event=tx_commit module=history id={} label={} ops={}",
            id.0,
            tx.label,
            tx.ops.len()
        );
        self.undo.push_back(tx);
        self.redo.clear();
        while self.undo.len() > self.max_history {
            if let Some(evicted) = self.undo.pop_front() {
                debug!("event=tx_evict module=history id={}", evicted.id.0);
            }
        }
        Ok(Some(id))
    }

    /// Reverts every op applied inside the active transaction and drops it
    pub fn rollback(&mut self, calendar: &mut Calendar) -> HistoryResult<()> {
        let tx = self.active.take().ok_or(HistoryError::NotRecording)?;
        for op in tx.ops.iter().rev() {
            op.revert(calendar)?;
        }
        info!(
            "event=tx_rollback module=history id={} label={} ops={}",
            tx.id.0,
            tx.label,
            tx.ops.len()
        );
        Ok(())
    }

    /// Reverts the most recent transaction
    ///
    /// Returns `Ok(None)` when there is nothing to undo. On failure the
    /// calendar and both stacks are left as they were.
    pub fn undo(&mut self, calendar: &mut Calendar) -> HistoryResult<Option<&Transaction>> {
        if self.active.is_some() {
            return Err(HistoryError::NestedTransaction);
        }
        let Some(tx) = self.undo.pop_back() else {
            return Ok(None);
        };
        if let Err(err) = tx.revert_all(calendar) {
            self.undo.push_back(tx);
            return Err(err);
        }
        info!("event=undo module=history id={} label={}", tx.id.0, tx.label);
        self.redo.push(tx);
        Ok(self.redo.last())
    }

    /// Re-applies the most recently undone transaction
    pub fn redo(&mut self, calendar: &mut Calendar) -> HistoryResult<Option<&Transaction>> {
        if self.active.is_some() {
            return Err(HistoryError::NestedTransaction);
        }
        let Some(tx) = self.redo.pop() else {
            return Ok(None);
        };
        if let Err(err) = tx.apply_all(calendar) {
            self.redo.push(tx);
            return Err(err);
        }
        info!("event=redo module=history id={} label={}", tx.id.0, tx.label);
        self.undo.push_back(tx);
        Ok(self.undo.back())
    }

    /// Records the current undo-stack top as the saved state
    pub fn mark_saved(&mut self) {
        self.saved = self.undo.back().map(|tx| tx.id);
    }

    /// True when the undo-stack top differs from the saved marker
    ///
    /// An empty undo stack is clean.
    pub fn is_dirty(&self) -> bool {
        match self.undo.back() {
            None => false,
            Some(top) => self.saved != Some(top.id),
        }
    }

    /// Forgets all history, e.g. after loading a different calendar
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.active = None;
        self.saved = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CalendarItem, Subcalendar};
    use chrono::NaiveDate;

    fn setup() -> (Calendar, crate::ids::SubcalId) {
        let home = Subcalendar::new("Home", "green");
        let id = home.uid().clone();
        (Calendar::from_subcalendars(vec![home]).unwrap(), id)
    }

    fn insert(log: &mut TransactionLog, cal: &mut Calendar, sc: &crate::ids::SubcalId, name: &str) {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        log.begin(name).unwrap();
        log.apply(
            cal,
            Op::InsertItem {
                subcal: sc.clone(),
                item: CalendarItem::task(name, date),
            },
        )
        .unwrap();
        log.commit().unwrap();
    }

    #[test]
    fn test_nested_begin_is_rejected() {
        let mut log = TransactionLog::default();
        log.begin("outer").unwrap();
        assert_eq!(log.begin("inner"), Err(HistoryError::NestedTransaction));
    }

    #[test]
    fn test_record_while_idle_is_rejected() {
        let (_, sc) = setup();
        let mut log = TransactionLog::default();
        let op = Op::InsertItem {
            subcal: sc,
            item: CalendarItem::task("x", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
        };
        assert_eq!(log.record(op), Err(HistoryError::NotRecording));
    }

    #[test]
    fn test_empty_commit_is_discarded() {
        let mut log = TransactionLog::default();
        log.begin("nothing").unwrap();
        assert_eq!(log.commit().unwrap(), None);
        assert!(!log.can_undo());
    }

    #[test]
    fn test_commit_clears_redo() {
        let (mut cal, sc) = setup();
        let mut log = TransactionLog::default();
        insert(&mut log, &mut cal, &sc, "a");
        log.undo(&mut cal).unwrap();
        assert!(log.can_redo());
        insert(&mut log, &mut cal, &sc, "b");
        assert!(!log.can_redo());
    }

    #[test]
    fn test_eviction_is_fifo() {
        let (mut cal, sc) = setup();
        let mut log = TransactionLog::new(3);
        for name in ["a", "b", "c", "d", "e"] {
            insert(&mut log, &mut cal, &sc, name);
        }
        assert_eq!(log.undo_len(), 3);
        let mut labels = Vec::new();
        while let Some(tx) = log.undo(&mut cal).unwrap() {
            labels.push(tx.label().to_string());
        }
        assert_eq!(labels, vec!["e", "d", "c"]);
        let names: Vec<&str> = cal.subcalendars()[0].items().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_rollback_reverts_applied_ops() {
        let (mut cal, sc) = setup();
        let before = cal.clone();
        let mut log = TransactionLog::default();
        log.begin("partial").unwrap();
        log.apply(
            &mut cal,
            Op::InsertItem {
                subcal: sc,
                item: CalendarItem::task("x", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            },
        )
        .unwrap();
        log.rollback(&mut cal).unwrap();
        assert_eq!(cal, before);
        assert!(!log.is_recording());
        assert!(!log.can_undo());
    }

    #[test]
    fn test_failed_replay_restores_applied_ops() {
        let (mut cal, sc) = setup();
        let before = cal.clone();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let tx = Transaction {
            id: TxId(7),
            label: "stale".into(),
            ops: vec![
                Op::InsertItem {
                    subcal: sc,
                    item: CalendarItem::task("kept out", date),
                },
                Op::InsertItem {
                    subcal: crate::ids::SubcalId::new(),
                    item: CalendarItem::task("orphan", date),
                },
            ],
        };

        assert!(tx.apply_all(&mut cal).is_err());
        assert_eq!(cal, before);
    }

    #[test]
    fn test_dirty_tracks_saved_identity() {
        let (mut cal, sc) = setup();
        let mut log = TransactionLog::default();
        assert!(!log.is_dirty());

        insert(&mut log, &mut cal, &sc, "a");
        assert!(log.is_dirty());
        log.mark_saved();
        assert!(!log.is_dirty());

        insert(&mut log, &mut cal, &sc, "b");
        assert!(log.is_dirty());
        log.undo(&mut cal).unwrap();
        assert!(!log.is_dirty());
        log.redo(&mut cal).unwrap();
        assert!(log.is_dirty());
    }
}
