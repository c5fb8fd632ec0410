//! Always-sorted priority store
//!
//! [`PriorityStore`] keeps its items ordered by a comparator (ascending
//! priority by default, 0 first) using binary-search insertion. Items
//! that compare equal keep their insertion order.

use std::cmp::Ordering;

/// Items that carry a dispatch priority (0 = most urgent)
pub trait Prioritized {
    fn priority(&self) -> u8;
}

/// Ordering function used by a [`PriorityStore`]
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// Ascending-priority comparator
pub fn by_priority<T: Prioritized>(a: &T, b: &T) -> Ordering {
    a.priority().cmp(&b.priority())
}

/// Vector-backed store that stays sorted after every insert
///
/// With auto-sort disabled, inserts append and the store is no longer
/// known to be sorted until [`sort`](PriorityStore::sort) is called.
#[derive(Debug, Clone)]
pub struct PriorityStore<T> {
    items: Vec<T>,
    comparator: Comparator<T>,
    auto_sort: bool,
    sorted: bool,
}

impl<T: Prioritized> PriorityStore<T> {
    /// Auto-sorting store ordered by ascending priority
    pub fn new() -> Self {
        Self::with_comparator(true, by_priority::<T>)
    }
}

impl<T: Prioritized> Default for PriorityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityStore<T> {
    pub fn with_comparator(auto_sort: bool, comparator: Comparator<T>) -> Self {
        Self {
            items: Vec::new(),
            comparator,
            auto_sort,
            sorted: true,
        }
    }

    /// Insert keeping order; equal items go after existing ones
    pub fn insert(&mut self, item: T) {
        if self.auto_sort {
            let comparator = self.comparator;
            let index = self
                .items
                .partition_point(|existing| comparator(existing, &item) != Ordering::Greater);
            self.items.insert(index, item);
        } else {
            self.items.push(item);
            self.sorted = self.items.len() <= 1;
        }
    }

    /// Replace the comparator; re-sorts immediately when auto-sort is on
    pub fn set_comparator(&mut self, comparator: Comparator<T>) {
        self.comparator = comparator;
        if self.auto_sort {
            self.sort();
        } else {
            self.sorted = false;
        }
    }

    /// Stable sort by the current comparator
    pub fn sort(&mut self) {
        let comparator = self.comparator;
        self.items.sort_by(comparator);
        self.sorted = true;
    }

    pub fn set_auto_sort(&mut self, auto_sort: bool) {
        self.auto_sort = auto_sort;
    }

    pub fn is_auto_sort(&self) -> bool {
        self.auto_sort
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Remove item at `index`, preserving the order of the rest
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Remove every item for which `keep` returns false; returns how many went
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    pub fn position(&self, predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(predicate)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.sorted = true;
    }
}

impl<T: PartialEq> PriorityStore<T> {
    /// Remove the first item equal to `item`
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let index = self.position(|existing| existing == item)?;
        self.remove_at(index)
    }
}

impl<T> std::ops::Index<usize> for PriorityStore<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a PriorityStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
