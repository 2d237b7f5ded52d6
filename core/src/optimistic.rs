//! Optimistic removal with rollback to the original position.

use crate::models::{HistoryEntry, Notification};

/// Items addressable by a stable key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for HistoryEntry {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Notification {
    fn key(&self) -> &str {
        &self.id
    }
}

/// An item taken out of the list before the remote call confirmed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal<T> {
    pub index: usize,
    pub item: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticList<T> {
    items: Vec<T>,
}

impl<T: Keyed> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn push_front(&mut self, item: T) {
        self.items.insert(0, item);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|item| item.key() == key)
    }

    /// Remove right away; keep the receipt until the remote call settles.
    pub fn remove(&mut self, key: &str) -> Option<Removal<T>> {
        let index = self.items.iter().position(|item| item.key() == key)?;
        let item = self.items.remove(index);
        Some(Removal { index, item })
    }

    /// Put a removed item back where it was. If the list shrank meanwhile
    /// it goes to the end.
    pub fn rollback(&mut self, removal: Removal<T>) {
        if self.contains(removal.item.key()) {
            return;
        }
        let index = removal.index.min(self.items.len());
        self.items.insert(index, removal.item);
    }
}

impl<T: Keyed> Default for OptimisticList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    impl Keyed for Item {
        fn key(&self) -> &str {
            self.0
        }
    }

    fn keys(list: &OptimisticList<Item>) -> Vec<&'static str> {
        list.items().iter().map(|i| i.0).collect()
    }

    #[test]
    fn test_remove_then_rollback_restores_position() {
        let mut list = OptimisticList::new(vec![Item("a"), Item("h"), Item("c")]);

        let removal = list.remove("h").unwrap();
        assert_eq!(keys(&list), ["a", "c"]);
        assert_eq!(removal.index, 1);

        list.rollback(removal);
        assert_eq!(keys(&list), ["a", "h", "c"]);
    }

    #[test]
    fn test_rollback_after_list_shrank() {
        let mut list = OptimisticList::new(vec![Item("a"), Item("b"), Item("c")]);
        let removal = list.remove("c").unwrap();
        list.remove("b").unwrap();

        list.rollback(removal);
        assert_eq!(keys(&list), ["a", "c"]);
    }

    #[test]
    fn test_rollback_is_idempotent_and_unknown_key_is_none() {
        let mut list = OptimisticList::new(vec![Item("a")]);
        assert!(list.remove("zzz").is_none());

        let removal = list.remove("a").unwrap();
        list.rollback(removal.clone());
        list.rollback(removal);
        assert_eq!(keys(&list), ["a"]);
    }
}
