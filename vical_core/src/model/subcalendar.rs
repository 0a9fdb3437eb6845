//! Subcalendars: named, colored, sorted item collections

use super::{CalendarItem, ModelError, ModelResult};
use crate::ids::{ItemId, SubcalId};
use serde::{Deserialize, Serialize};

/// Subcalendar attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubcalField {
    Name,
    Color,
    Hidden,
}

impl SubcalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubcalField::Name => "name",
            SubcalField::Color => "color",
            SubcalField::Hidden => "hidden",
        }
    }
}

/// A subcalendar attribute value, as captured by `SetSubcalAttr` ops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubcalAttr {
    Name(String),
    Color(String),
    Hidden(bool),
}

impl SubcalAttr {
    pub fn field(&self) -> SubcalField {
        match self {
            SubcalAttr::Name(_) => SubcalField::Name,
            SubcalAttr::Color(_) => SubcalField::Color,
            SubcalAttr::Hidden(_) => SubcalField::Hidden,
        }
    }
}

/// A named group of items
///
/// # Invariants
/// - `items` is sorted by [`CalendarItem::sort_key`] after every mutation
/// - item uids are unique within the subcalendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcalendar {
    uid: SubcalId,
    name: String,
    color: String,
    hidden: bool,
    items: Vec<CalendarItem>,
}

impl Subcalendar {
    /// Creates an empty, visible subcalendar with a fresh uid
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::with_id(SubcalId::new(), name, color, false)
    }

    /// Creates an empty subcalendar with a caller-provided uid
    pub fn with_id(
        uid: SubcalId,
        name: impl Into<String>,
        color: impl Into<String>,
        hidden: bool,
    ) -> Self {
        Self {
            uid,
            name: name.into(),
            color: color.into(),
            hidden,
            items: Vec::new(),
        }
    }

    pub fn uid(&self) -> &SubcalId {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn items(&self) -> &[CalendarItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, uid: &ItemId) -> Option<&CalendarItem> {
        self.position(uid).map(|idx| &self.items[idx])
    }

    pub fn contains(&self, uid: &ItemId) -> bool {
        self.position(uid).is_some()
    }

    /// Checks the ordering invariant
    pub fn is_sorted(&self) -> bool {
        self.items
            .windows(2)
            .all(|pair| pair[0].sort_key() <= pair[1].sort_key())
    }

    /// Inserts an item at its sorted position
    ///
    /// Public so loaders can populate a subcalendar before it joins a
    /// [`Calendar`](super::Calendar); once inside, inserts go through ops.
    pub fn insert_item(&mut self, item: CalendarItem) -> ModelResult<usize> {
        if self.contains(item.uid()) {
            return Err(ModelError::DuplicateItem(item.uid().clone()));
        }
        let key = item.sort_key();
        let idx = self.items.partition_point(|existing| existing.sort_key() < key);
        self.items.insert(idx, item);
        Ok(idx)
    }

    /// Detaches an item, returning it by value
    pub(crate) fn take_item(&mut self, uid: &ItemId) -> ModelResult<CalendarItem> {
        let idx = self
            .position(uid)
            .ok_or_else(|| ModelError::ItemNotFound(uid.clone()))?;
        Ok(self.items.remove(idx))
    }

    pub(crate) fn item_mut(&mut self, uid: &ItemId) -> ModelResult<&mut CalendarItem> {
        let idx = self
            .position(uid)
            .ok_or_else(|| ModelError::ItemNotFound(uid.clone()))?;
        Ok(&mut self.items[idx])
    }

    /// Restores ordering after an attribute that feeds the sort key changed
    pub(crate) fn resort(&mut self) {
        self.items.sort_by_key(|item| item.sort_key());
    }

    /// Replaces an attribute, returning the previous value
    pub(crate) fn set_attr(&mut self, attr: SubcalAttr) -> SubcalAttr {
        match attr {
            SubcalAttr::Name(name) => SubcalAttr::Name(std::mem::replace(&mut self.name, name)),
            SubcalAttr::Color(color) => {
                SubcalAttr::Color(std::mem::replace(&mut self.color, color))
            }
            SubcalAttr::Hidden(hidden) => {
                SubcalAttr::Hidden(std::mem::replace(&mut self.hidden, hidden))
            }
        }
    }

    pub fn get_attr(&self, field: SubcalField) -> SubcalAttr {
        match field {
            SubcalField::Name => SubcalAttr::Name(self.name.clone()),
            SubcalField::Color => SubcalAttr::Color(self.color.clone()),
            SubcalField::Hidden => SubcalAttr::Hidden(self.hidden),
        }
    }

    fn position(&self, uid: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.uid() == uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn test_insert_keeps_sorted() {
        let mut sc = Subcalendar::new("Home", "green");
        sc.insert_item(CalendarItem::task("c", d(3))).unwrap();
        sc.insert_item(CalendarItem::task("a", d(1))).unwrap();
        sc.insert_item(CalendarItem::event("b", d(3), d(4)).unwrap())
            .unwrap();
        sc.insert_item(CalendarItem::task("B", d(1))).unwrap();

        let names: Vec<&str> = sc.items().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["a", "B", "b", "c"]);
        assert!(sc.is_sorted());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut sc = Subcalendar::new("Home", "green");
        let item = CalendarItem::task("a", d(1));
        sc.insert_item(item.clone()).unwrap();
        assert_eq!(
            sc.insert_item(item.clone()),
            Err(ModelError::DuplicateItem(item.uid().clone()))
        );
    }

    #[test]
    fn test_take_item() {
        let mut sc = Subcalendar::new("Home", "green");
        let item = CalendarItem::task("a", d(1));
        let uid = item.uid().clone();
        sc.insert_item(item).unwrap();
        assert_eq!(sc.take_item(&uid).unwrap().uid(), &uid);
        assert!(sc.is_empty());
        assert_eq!(sc.take_item(&uid), Err(ModelError::ItemNotFound(uid)));
    }

    #[test]
    fn test_set_attr_returns_previous() {
        let mut sc = Subcalendar::new("Home", "green");
        assert_eq!(
            sc.set_attr(SubcalAttr::Color("red".into())),
            SubcalAttr::Color("green".into())
        );
        assert_eq!(sc.set_attr(SubcalAttr::Hidden(true)), SubcalAttr::Hidden(false));
        assert!(sc.hidden());
        assert_eq!(sc.color(), "red");
    }
}
