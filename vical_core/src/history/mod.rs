//! Op log and transactions
//!
//! Every mutation of a [`Calendar`] after load goes through an [`Op`]
//! recorded in the [`TransactionLog`]. [`transact`] is the usual entry
//! point: it opens a transaction, hands the closure a [`Recorder`], and
//! commits on success or rolls back on error.

mod op;
mod transaction;

pub use self::transaction::{Transaction, TransactionLog, TxId, MAX_HISTORY};
pub use self::op::Op;
pub(crate) use self::op::remove_item_op;

use crate::ids::{ItemId, SubcalId};
use crate::model::{Calendar, CalendarItem, ItemAttr, ModelError, SubcalAttr, Subcalendar};
use log::error;
use thiserror::Error;

/// Transaction log error
///
/// All variants are invariant violations: they mean the caller drove the
/// log incorrectly or referenced state the model does not hold.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("A transaction is already recording")]
    NestedTransaction,

    #[error("No transaction is recording")]
    NotRecording,

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl HistoryError {
    pub fn is_invariant_violation(&self) -> bool {
        true
    }
}

/// History result
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Write handle given to [`transact`] closures
///
/// Each method captures the previous state, builds the op, applies it and
/// records it.
pub struct Recorder<'a> {
    calendar: &'a mut Calendar,
    log: &'a mut TransactionLog,
}

impl<'a> Recorder<'a> {
    pub fn calendar(&self) -> &Calendar {
        self.calendar
    }

    pub fn apply(&mut self, op: Op) -> HistoryResult<()> {
        self.log.apply(self.calendar, op)
    }

    /// Sets an item attribute; unchanged values record nothing
    pub fn set_item_attr(&mut self, item: &ItemId, new: ItemAttr) -> HistoryResult<()> {
        let current = self
            .calendar
            .item(item)
            .ok_or_else(|| ModelError::ItemNotFound(item.clone()))?
            .get_attr(new.field())?;
        if current == new {
            return Ok(());
        }
        self.apply(Op::SetAttr {
            item: item.clone(),
            old: current,
            new,
        })
    }

    pub fn set_subcal_attr(&mut self, subcal: &SubcalId, new: SubcalAttr) -> HistoryResult<()> {
        let current = self
            .calendar
            .subcal(subcal)
            .ok_or_else(|| ModelError::SubcalNotFound(subcal.clone()))?
            .get_attr(new.field());
        if current == new {
            return Ok(());
        }
        self.apply(Op::SetSubcalAttr {
            subcal: subcal.clone(),
            old: current,
            new,
        })
    }

    pub fn insert_item(&mut self, subcal: &SubcalId, item: CalendarItem) -> HistoryResult<()> {
        self.apply(Op::InsertItem {
            subcal: subcal.clone(),
            item,
        })
    }

    pub fn remove_item(&mut self, item: &ItemId) -> HistoryResult<()> {
        let op = remove_item_op(self.calendar, item)?;
        self.apply(op)
    }

    pub fn move_item(&mut self, item: &ItemId, dst: &SubcalId) -> HistoryResult<()> {
        let src = self
            .calendar
            .owner_of(item)
            .cloned()
            .ok_or_else(|| ModelError::ItemNotFound(item.clone()))?;
        self.apply(Op::MoveItem {
            item: item.clone(),
            src,
            dst: dst.clone(),
        })
    }

    pub fn insert_subcal(&mut self, index: usize, subcal: Subcalendar) -> HistoryResult<()> {
        self.apply(Op::InsertSubcal { index, subcal })
    }

    pub fn remove_subcal(&mut self, subcal: &SubcalId) -> HistoryResult<()> {
        let index = self
            .calendar
            .subcal_index(subcal)
            .ok_or_else(|| ModelError::SubcalNotFound(subcal.clone()))?;
        let captured = self.calendar.subcalendars()[index].clone();
        self.apply(Op::RemoveSubcal {
            index,
            subcal: captured,
        })
    }
}

/// Runs `f` inside one transaction
///
/// Commits when `f` succeeds. When `f` fails, every op it already applied
/// is reverted before the error is returned, so the calendar is observably
/// unchanged. Returns the committed id, or `None` when nothing was recorded.
pub fn transact<F>(
    log: &mut TransactionLog,
    calendar: &mut Calendar,
    label: &str,
    f: F,
) -> HistoryResult<Option<TxId>>
where
    F: FnOnce(&mut Recorder<'_>) -> HistoryResult<()>,
{
    log.begin(label)?;
    let result = {
        let mut recorder = Recorder {
            calendar: &mut *calendar,
            log: &mut *log,
        };
        f(&mut recorder)
    };
    match result {
        Ok(()) => log.commit(),
        Err(err) => {
            error!(
                "event=tx_failed module=history label={} error={}",
                label, err
            );
            log.rollback(calendar)?;
            Err(err)
        }
    }
}
