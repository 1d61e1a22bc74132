//! Pareto sets.
//!
//! A `ParetoSet` keeps values none of which dominates another. Dominance is
//! defined by a `ParetoComparator`, which only answers "is `left` better than
//! `right` in at least one criterion". Left dominates right when left has
//! such an advantage and right has none; when both have one they are
//! mutually non-dominated and both are kept.

use smallvec::SmallVec;

/// Criterion test used by [`ParetoSet`].
pub trait ParetoComparator<T> {
    /// Whether `left` is strictly better than `right` in some criterion.
    fn left_dominance(&self, left: &T, right: &T) -> bool;
}

impl<T, F> ParetoComparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn left_dominance(&self, left: &T, right: &T) -> bool {
        self(left, right)
    }
}

/// A set of mutually non-dominated values.
///
/// The comparator is passed to each call so the same set type can serve
/// stop bags, pattern rides and destination paths.
#[derive(Debug, Clone)]
pub struct ParetoSet<T> {
    items: SmallVec<[T; 4]>,
}

impl<T> Default for ParetoSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ParetoSet<T> {
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    /// Whether `value` would be added.
    pub fn qualify<C: ParetoComparator<T>>(&self, value: &T, cmp: &C) -> bool {
        self.items.iter().all(|e| cmp.left_dominance(value, e))
    }

    /// Add `value` unless an existing value dominates or equals it; remove
    /// every value it dominates.
    ///
    /// Returns whether the value was added.
    pub fn add<C: ParetoComparator<T>>(&mut self, value: T, cmp: &C) -> bool {
        if !self.qualify(&value, cmp) {
            return false;
        }
        self.items.retain(|e| cmp.left_dominance(e, &value));
        self.items.push(value);
        true
    }

    /// Like [`add`](Self::add), but a value equal to an existing one in
    /// every criterion is kept next to it.
    pub fn add_keeping_equal<C: ParetoComparator<T>>(&mut self, value: T, cmp: &C) -> bool {
        let dominated = self
            .items
            .iter()
            .any(|e| cmp.left_dominance(e, &value) && !cmp.left_dominance(&value, e));
        if dominated {
            return false;
        }
        self.items
            .retain(|e| !(cmp.left_dominance(&value, e) && !cmp.left_dominance(e, &value)));
        self.items.push(value);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Mutable access; callers may only make values better.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items.into_vec()
    }
}

impl<'a, T> IntoIterator for &'a ParetoSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
