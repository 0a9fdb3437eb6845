//! Reversible mutation units

use crate::ids::{ItemId, SubcalId};
use crate::model::{Calendar, CalendarItem, ItemAttr, ModelError, ModelResult, SubcalAttr, Subcalendar};

/// The smallest reversible mutation
///
/// Each variant captures everything needed to go both ways: `old` values
/// for attribute changes, and the whole entity for inserts and removals.
/// `revert` never recomputes state, so `apply` followed by `revert` is an
/// exact round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    SetAttr {
        item: ItemId,
        old: ItemAttr,
        new: ItemAttr,
    },
    SetSubcalAttr {
        subcal: SubcalId,
        old: SubcalAttr,
        new: SubcalAttr,
    },
    InsertItem {
        subcal: SubcalId,
        item: CalendarItem,
    },
    RemoveItem {
        subcal: SubcalId,
        item: CalendarItem,
    },
    MoveItem {
        item: ItemId,
        src: SubcalId,
        dst: SubcalId,
    },
    InsertSubcal {
        index: usize,
        subcal: Subcalendar,
    },
    RemoveSubcal {
        index: usize,
        subcal: Subcalendar,
    },
}

impl Op {
    pub fn apply(&self, calendar: &mut Calendar) -> ModelResult<()> {
        match self {
            Op::SetAttr { item, new, .. } => calendar.set_item_attr(item, new.clone()).map(drop),
            Op::SetSubcalAttr { subcal, new, .. } => {
                calendar.set_subcal_attr(subcal, new.clone()).map(drop)
            }
            Op::InsertItem { subcal, item } => calendar.insert_item(subcal, item.clone()),
            Op::RemoveItem { subcal, item } => calendar.remove_item(subcal, item.uid()).map(drop),
            Op::MoveItem { item, src, dst } => calendar.move_item(item, src, dst),
            Op::InsertSubcal { index, subcal } => calendar.insert_subcal(*index, subcal.clone()),
            Op::RemoveSubcal { index, subcal } => {
                calendar.remove_subcal(*index, subcal.uid()).map(drop)
            }
        }
    }

    pub fn revert(&self, calendar: &mut Calendar) -> ModelResult<()> {
        match self {
            Op::SetAttr { item, old, .. } => calendar.set_item_attr(item, old.clone()).map(drop),
            Op::SetSubcalAttr { subcal, old, .. } => {
                calendar.set_subcal_attr(subcal, old.clone()).map(drop)
            }
            Op::InsertItem { subcal, item } => calendar.remove_item(subcal, item.uid()).map(drop),
            Op::RemoveItem { subcal, item } => calendar.insert_item(subcal, item.clone()),
            Op::MoveItem { item, src, dst } => calendar.move_item(item, dst, src),
            Op::InsertSubcal { index, subcal } => {
                calendar.remove_subcal(*index, subcal.uid()).map(drop)
            }
            Op::RemoveSubcal { index, subcal } => calendar.insert_subcal(*index, subcal.clone()),
        }
    }

    /// Short op name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            Op::SetAttr { .. } => "set_attr",
            Op::SetSubcalAttr { .. } => "set_subcal_attr",
            Op::InsertItem { .. } => "insert_item",
            Op::RemoveItem { .. } => "remove_item",
            Op::MoveItem { .. } => "move_item",
            Op::InsertSubcal { .. } => "insert_subcal",
            Op::RemoveSubcal { .. } => "remove_subcal",
        }
    }

    /// True when the op changes which items exist on screen
    pub fn changes_layout(&self) -> bool {
        !matches!(self, Op::SetAttr { .. } | Op::SetSubcalAttr { .. })
    }
}

/// Builds a `RemoveItem` op from the live item, capturing it in full
pub(crate) fn remove_item_op(calendar: &Calendar, item: &ItemId) -> ModelResult<Op> {
    let subcal = calendar
        .owner_of(item)
        .ok_or_else(|| ModelError::ItemNotFound(item.clone()))?;
    let captured = calendar
        .item(item)
        .ok_or_else(|| ModelError::ItemNotFound(item.clone()))?;
    Ok(Op::RemoveItem {
        subcal: subcal.clone(),
        item: captured.clone(),
    })
}
