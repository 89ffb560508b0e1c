/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A fixed-length buffer shared by every view linked to it.
///
/// `Storage` is a handle: cloning it yields another handle to the
/// *same* elements, so a write through one is visible through all.
/// Copying the elements is never implicit; use
/// [`Storage::deep_copy`] to obtain an independent buffer.
///
/// ```
/// # use arrayview::Storage;
/// let a = Storage::from(vec![1, 2, 3]);
/// let b = a.clone();
/// let c = a.deep_copy();
/// assert!(a.shares_with(&b));
/// assert!(!a.shares_with(&c));
/// ```
///
/// The length is fixed at construction. Views bind their selectors
/// against it, so it cannot change under them.
///
/// Storage is single-threaded: it is neither `Send` nor `Sync`.
/// Borrows of the elements never outlive a single read or write, so
/// reentrant use (e.g. reading through one view from inside a mapper
/// applied through another) does not conflict.
pub struct Storage<T> {
    cells: Rc<RefCell<Box<[T]>>>,
}

impl<T> Storage<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            cells: Rc::new(RefCell::new(items.into_boxed_slice())),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether `self` and `other` are handles to the same
    /// elements.
    pub fn shares_with(&self, other: &Storage<T>) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }

    // Caller guarantees `pos < len()`.
    pub(crate) fn write(&self, pos: usize, value: T) {
        self.cells.borrow_mut()[pos] = value;
    }
}

impl<T: Clone> Storage<T> {
    pub fn get(&self, pos: usize) -> Option<T> {
        self.cells.borrow().get(pos).cloned()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.cells.borrow().to_vec()
    }

    /// An independent buffer holding a copy of the current elements.
    pub fn deep_copy(&self) -> Self {
        Self::new(self.to_vec())
    }

    // Caller guarantees `pos < len()`.
    pub(crate) fn read(&self, pos: usize) -> T {
        self.cells.borrow()[pos].clone()
    }
}

impl<T> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self {
            cells: Rc::clone(&self.cells),
        }
    }
}

impl<T> From<Vec<T>> for Storage<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for Storage<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cells.borrow().iter()).finish()
    }
}
