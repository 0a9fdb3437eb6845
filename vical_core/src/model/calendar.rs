//! Calendar: the root of the entity model

use super::{CalendarItem, ItemAttr, ModelError, ModelResult, SubcalAttr, Subcalendar};
use crate::ids::{ItemId, SubcalId};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Ordered subcalendars plus the item ownership table
///
/// Read access is public; every mutator is crate-private and only called
/// from [`Op::apply`](crate::history::Op::apply) and
/// [`Op::revert`](crate::history::Op::revert).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    subcals: Vec<Subcalendar>,
    owners: HashMap<ItemId, SubcalId>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a calendar from loaded subcalendars
    ///
    /// Rejects duplicate subcalendar or item uids anywhere in the input.
    pub fn from_subcalendars(subcals: Vec<Subcalendar>) -> ModelResult<Self> {
        let mut calendar = Self::new();
        for subcal in subcals {
            let index = calendar.subcals.len();
            calendar.insert_subcal(index, subcal)?;
        }
        Ok(calendar)
    }

    pub fn subcalendars(&self) -> &[Subcalendar] {
        &self.subcals
    }

    pub fn into_subcalendars(self) -> Vec<Subcalendar> {
        self.subcals
    }

    pub fn subcal_count(&self) -> usize {
        self.subcals.len()
    }

    pub fn subcal(&self, id: &SubcalId) -> Option<&Subcalendar> {
        self.subcals.iter().find(|sc| sc.uid() == id)
    }

    pub fn subcal_index(&self, id: &SubcalId) -> Option<usize> {
        self.subcals.iter().position(|sc| sc.uid() == id)
    }

    pub fn subcal_at(&self, index: usize) -> Option<&Subcalendar> {
        self.subcals.get(index)
    }

    pub fn owner_of(&self, item: &ItemId) -> Option<&SubcalId> {
        self.owners.get(item)
    }

    pub fn item(&self, id: &ItemId) -> Option<&CalendarItem> {
        let owner = self.owner_of(id)?;
        self.subcal(owner)?.get(id)
    }

    pub fn item_count(&self) -> usize {
        self.owners.len()
    }

    /// Items occurring on `date` in visible subcalendars, in sort order
    pub fn items_on(&self, date: NaiveDate) -> Vec<&CalendarItem> {
        let mut items: Vec<&CalendarItem> = self
            .subcals
            .iter()
            .filter(|sc| !sc.hidden())
            .flat_map(|sc| sc.items().iter())
            .filter(|item| item.occurs_on(date))
            .collect();
        items.sort_by_key(|item| item.sort_key());
        items
    }

    /// Items occurring on any day of `start..=end`, each listed once
    ///
    /// Ordered by the first day each item occurs inside the range, then by
    /// sort key, which is the order a day-by-day walk would produce.
    pub fn items_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&CalendarItem> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let mut hits: Vec<(NaiveDate, &CalendarItem)> = self
            .subcals
            .iter()
            .filter(|sc| !sc.hidden())
            .flat_map(|sc| sc.items().iter())
            .filter_map(|item| item.first_day_within(start, end).map(|day| (day, item)))
            .collect();
        hits.sort_by_key(|(day, item)| (*day, item.sort_key()));
        hits.into_iter().map(|(_, item)| item).collect()
    }

    /// Checks the sort invariant and the ownership table together
    pub fn is_consistent(&self) -> bool {
        let total: usize = self.subcals.iter().map(|sc| sc.len()).sum();
        total == self.owners.len()
            && self.subcals.iter().all(|sc| {
                sc.is_sorted()
                    && sc
                        .items()
                        .iter()
                        .all(|item| self.owners.get(item.uid()) == Some(sc.uid()))
            })
    }

    pub(crate) fn insert_item(&mut self, subcal: &SubcalId, item: CalendarItem) -> ModelResult<()> {
        if self.owners.contains_key(item.uid()) {
            return Err(ModelError::DuplicateItem(item.uid().clone()));
        }
        let uid = item.uid().clone();
        self.subcal_mut(subcal)?.insert_item(item)?;
        self.owners.insert(uid, subcal.clone());
        Ok(())
    }

    pub(crate) fn remove_item(&mut self, subcal: &SubcalId, item: &ItemId) -> ModelResult<CalendarItem> {
        if self.owner_of(item) != Some(subcal) {
            return Err(ModelError::ItemNotFound(item.clone()));
        }
        let removed = self.subcal_mut(subcal)?.take_item(item)?;
        self.owners.remove(item);
        Ok(removed)
    }

    pub(crate) fn move_item(&mut self, item: &ItemId, src: &SubcalId, dst: &SubcalId) -> ModelResult<()> {
        if src == dst {
            return Err(ModelError::SameSubcalendar(dst.clone()));
        }
        if self.subcal(dst).is_none() {
            return Err(ModelError::SubcalNotFound(dst.clone()));
        }
        let taken = self.remove_item(src, item)?;
        self.insert_item(dst, taken)
    }

    pub(crate) fn set_item_attr(&mut self, item: &ItemId, attr: ItemAttr) -> ModelResult<ItemAttr> {
        let owner = self
            .owner_of(item)
            .cloned()
            .ok_or_else(|| ModelError::ItemNotFound(item.clone()))?;
        let subcal = self.subcal_mut(&owner)?;
        let old = subcal.item_mut(item)?.set_attr(attr)?;
        subcal.resort();
        Ok(old)
    }

    pub(crate) fn set_subcal_attr(&mut self, subcal: &SubcalId, attr: SubcalAttr) -> ModelResult<SubcalAttr> {
        Ok(self.subcal_mut(subcal)?.set_attr(attr))
    }

    pub(crate) fn insert_subcal(&mut self, index: usize, subcal: Subcalendar) -> ModelResult<()> {
        if index > self.subcals.len() {
            return Err(ModelError::SubcalIndexOutOfRange(index));
        }
        if self.subcal(subcal.uid()).is_some() {
            return Err(ModelError::DuplicateSubcal(subcal.uid().clone()));
        }
        if let Some(dup) = subcal
            .items()
            .iter()
            .find(|item| self.owners.contains_key(item.uid()))
        {
            return Err(ModelError::DuplicateItem(dup.uid().clone()));
        }
        for item in subcal.items() {
            self.owners.insert(item.uid().clone(), subcal.uid().clone());
        }
        self.subcals.insert(index, subcal);
        Ok(())
    }

    pub(crate) fn remove_subcal(&mut self, index: usize, expected: &SubcalId) -> ModelResult<Subcalendar> {
        match self.subcals.get(index) {
            Some(sc) if sc.uid() == expected => {}
            Some(_) | None => return Err(ModelError::SubcalNotFound(expected.clone())),
        }
        let removed = self.subcals.remove(index);
        for item in removed.items() {
            self.owners.remove(item.uid());
        }
        Ok(removed)
    }

    fn subcal_mut(&mut self, id: &SubcalId) -> ModelResult<&mut Subcalendar> {
        self.subcals
            .iter_mut()
            .find(|sc| sc.uid() == id)
            .ok_or_else(|| ModelError::SubcalNotFound(id.clone()))
    }
}
