/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Views over shared storage.
//!
//! A [`View`] exposes a virtual index space `0..len()` and translates
//! it, through zero or more bound selectors, down to positions in a
//! [`Storage`]. The root view over a storage has no translation at
//! all; every [`View::subview`] pushes one more layer:
//!
//! ```text
//!     storage ← f₁ ← f₂ ← … ← fₖ ← virtual index
//! ```
//!
//! Reads and writes walk that chain on every access, so a view always
//! reflects the current contents of its storage and writes through
//! any linked view are visible through all of them.
//!
//! ```
//! use arrayview::View;
//!
//! let view = View::from_vec((1..=10).collect::<Vec<i32>>());
//! let odd = view.subview("::2").unwrap();
//! assert_eq!(odd.to_vec(), vec![1, 3, 5, 7, 9]);
//!
//! odd.set(-1, 90).unwrap();
//! assert_eq!(view.get(8).unwrap(), 90);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;

use enum_as_inner::EnumAsInner;

use crate::config::Config;
use crate::parse;
use crate::selector::Binding;
use crate::selector::IndexList;
use crate::selector::IntoSelector;
use crate::selector::Mask;
use crate::selector::Selector;
use crate::selector::SelectorError;
use crate::slice::ErrorKind;
use crate::slice::Slice;
use crate::slice::SliceError;
use crate::storage::Storage;
use crate::util;

/// The type of error for view operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ViewError {
    #[error("cannot modify a readonly view")]
    Readonly,

    #[error("length mismatch: expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("cannot unset an element of a fixed-length view")]
    UnsetUnsupported,

    #[error("view depth {depth} exceeds the configured maximum {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error(transparent)]
    SelectorError(#[from] SelectorError),

    #[error(transparent)]
    SliceError(#[from] SliceError),
}

impl ViewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ViewError::Readonly => ErrorKind::Readonly,
            ViewError::LengthMismatch { .. }
            | ViewError::UnsetUnsupported
            | ViewError::DepthExceeded { .. } => ErrorKind::Value,
            ViewError::SelectorError(err) => err.kind(),
            ViewError::SliceError(err) => err.kind(),
        }
    }
}

// One bound selector, and the layers beneath it. Layers are shared
// between a view and all of its subviews.
#[derive(Debug)]
struct Layer {
    binding: Binding,
    parent: Option<Rc<Layer>>,
}

impl Layer {
    fn resolve(&self, index: usize) -> usize {
        let mut pos = self.binding.map(index);
        let mut parent = self.parent.as_deref();
        while let Some(layer) = parent {
            pos = layer.binding.map(pos);
            parent = layer.parent.as_deref();
        }
        pos
    }
}

/// A linked, fixed-length window onto a [`Storage`].
///
/// `View` is a handle: cloning it is cheap and yields another view of
/// the same elements through the same selectors. Subviews stay linked
/// to the storage; use [`crate::to_unlinked_view`] for an
/// independent copy.
///
/// A readonly view rejects every mutation with
/// [`ViewError::Readonly`], and every view derived from it is
/// readonly too.
pub struct View<T> {
    storage: Storage<T>,
    layer: Option<Rc<Layer>>,
    len: usize,
    readonly: bool,
    depth: usize,
    config: Config,
}

impl<T> View<T> {
    /// A root view over `storage` with the default [`Config`].
    pub fn new(storage: impl Into<Storage<T>>) -> Self {
        Self::with_config(storage, &Config::default())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self::new(items)
    }

    /// A root view over `storage`. It is readonly if
    /// `config.default_readonly` is set.
    pub fn with_config(storage: impl Into<Storage<T>>, config: &Config) -> Self {
        let storage = storage.into();
        let len = storage.len();
        tracing::debug!(len, readonly = config.default_readonly, "created root view");
        Self {
            storage,
            layer: None,
            len,
            readonly: config.default_readonly,
            depth: 0,
            config: *config,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// The number of selector layers between this view and its
    /// storage. Root views have depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A readonly handle onto the same elements.
    pub fn to_readonly(&self) -> Self {
        Self {
            readonly: true,
            ..self.clone()
        }
    }

    /// A view of the elements of this view picked out by `selector`,
    /// inheriting this view's readonly flag.
    ///
    /// Strings are parsed as slices, and a `&View<bool>` or
    /// `&View<isize>` is snapshotted into a mask or an index list.
    ///
    /// # Errors
    ///
    /// Fails if `selector` does not parse, if it cannot be bound
    /// against `self.len()`, or if the new view would be deeper than
    /// `Config::max_depth`.
    pub fn subview(&self, selector: impl IntoSelector) -> Result<Self, ViewError> {
        self.subview_with(selector, false)
    }

    /// Like [`View::subview`], but the result is always readonly.
    pub fn readonly_subview(&self, selector: impl IntoSelector) -> Result<Self, ViewError> {
        self.subview_with(selector, true)
    }

    /// Like [`View::subview`]. The result is readonly if this view is
    /// or if `readonly` is set; a readonly view cannot be reopened.
    pub fn subview_with(
        &self,
        selector: impl IntoSelector,
        readonly: bool,
    ) -> Result<Self, ViewError> {
        let selector = selector.into_selector()?;
        let depth = self.depth.saturating_add(1);
        if depth > self.config.max_depth {
            tracing::warn!(depth, max = self.config.max_depth, "view depth limit reached");
            return Err(ViewError::DepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }
        let binding = selector.bind(self.len)?;
        let len = binding.len();
        let readonly = self.readonly || readonly;
        tracing::debug!(
            depth,
            len,
            kind = selector.kind(),
            selector = %selector,
            readonly,
            "created subview"
        );
        Ok(Self {
            storage: self.storage.clone(),
            layer: Some(Rc::new(Layer {
                binding,
                parent: self.layer.clone(),
            })),
            len,
            readonly,
            depth,
            config: self.config,
        })
    }

    /// Always fails: a view cannot remove elements from its storage.
    pub fn offset_unset(&self, _offset: impl IntoOffset) -> Result<(), ViewError> {
        Err(ViewError::UnsetUnsupported)
    }

    /// Returns true iff `offset` resolves: an index within bounds, or
    /// a selector that binds against this view.
    pub fn offset_exists(&self, offset: impl IntoOffset) -> bool {
        match offset.into_offset() {
            Ok(Offset::Index(index)) => util::normalize_index(index, self.len, true).is_ok(),
            Ok(Offset::Select(selector)) => selector.is_compatible_with(self.len),
            Err(_) => false,
        }
    }

    // Caller guarantees `index < len`.
    fn position(&self, index: usize) -> usize {
        match &self.layer {
            Some(layer) => layer.resolve(index),
            None => index,
        }
    }

    fn resolve(&self, index: isize) -> Result<usize, ViewError> {
        let index = util::normalize_index(index, self.len, true)?;
        Ok(self.position(index as usize))
    }

    fn positions(&self, selector: impl IntoSelector) -> Result<Vec<usize>, ViewError> {
        let binding = selector.into_selector()?.bind(self.len)?;
        Ok(binding.iter().map(|index| self.position(index)).collect())
    }

    fn ensure_writable(&self) -> Result<(), ViewError> {
        if self.readonly {
            tracing::warn!(len = self.len, depth = self.depth, "rejected write to readonly view");
            return Err(ViewError::Readonly);
        }
        Ok(())
    }
}

impl<T: Clone> View<T> {
    /// The element at `index`. Negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns `SliceError::IndexOutOfRange` if `index` is out of
    /// bounds after wrapping.
    pub fn get(&self, index: isize) -> Result<T, ViewError> {
        Ok(self.storage.read(self.resolve(index)?))
    }

    /// Overwrite the element at `index`.
    pub fn set(&self, index: isize, value: T) -> Result<(), ViewError> {
        self.ensure_writable()?;
        let pos = self.resolve(index)?;
        self.storage.write(pos, value);
        Ok(())
    }

    /// The elements picked out by `selector`, in selection order.
    pub fn get_selected(&self, selector: impl IntoSelector) -> Result<Vec<T>, ViewError> {
        Ok(self
            .positions(selector)?
            .into_iter()
            .map(|pos| self.storage.read(pos))
            .collect())
    }

    /// Overwrite the elements picked out by `selector`. A scalar is
    /// written to every selected position; a sequence must hold
    /// exactly one value per position and is written in order.
    ///
    /// Nothing is written unless the lengths match.
    pub fn set_selected(
        &self,
        selector: impl IntoSelector,
        values: impl Into<Values<T>>,
    ) -> Result<(), ViewError> {
        self.ensure_writable()?;
        let positions = self.positions(selector)?;
        self.write_all(positions, values.into())
    }

    /// Overwrite every element of this view.
    pub fn assign(&self, values: impl Into<Values<T>>) -> Result<(), ViewError> {
        self.ensure_writable()?;
        let positions = (0..self.len).map(|index| self.position(index)).collect();
        self.write_all(positions, values.into())
    }

    fn write_all(&self, positions: Vec<usize>, values: Values<T>) -> Result<(), ViewError> {
        tracing::trace!(count = positions.len(), "bulk write");
        match values {
            Values::Scalar(value) => {
                for pos in positions {
                    self.storage.write(pos, value.clone());
                }
            }
            Values::Many(values) => {
                if values.len() != positions.len() {
                    return Err(ViewError::LengthMismatch {
                        expected: positions.len(),
                        got: values.len(),
                    });
                }
                for (pos, value) in positions.into_iter().zip(values) {
                    self.storage.write(pos, value);
                }
            }
        }
        Ok(())
    }

    /// Read through the generic offset surface: an index yields one
    /// element, a selector yields a sequence.
    pub fn offset_get(&self, offset: impl IntoOffset) -> Result<Element<T>, ViewError> {
        match offset.into_offset()? {
            Offset::Index(index) => Ok(Element::One(self.get(index)?)),
            Offset::Select(selector) => Ok(Element::Many(self.get_selected(selector)?)),
        }
    }

    /// Write through the generic offset surface. An index accepts a
    /// scalar or a sequence of exactly one value.
    pub fn offset_set(
        &self,
        offset: impl IntoOffset,
        values: impl Into<Values<T>>,
    ) -> Result<(), ViewError> {
        match offset.into_offset()? {
            Offset::Index(index) => match values.into() {
                Values::Scalar(value) => self.set(index, value),
                Values::Many(mut values) => {
                    if values.len() != 1 {
                        return Err(ViewError::LengthMismatch {
                            expected: 1,
                            got: values.len(),
                        });
                    }
                    let value = values.remove(0);
                    self.set(index, value)
                }
            },
            Offset::Select(selector) => self.set_selected(selector, values),
        }
    }

    /// Iterator over the elements of this view, in order. Every step
    /// reads the storage afresh.
    pub fn iter(&self) -> ViewIter<'_, T> {
        ViewIter {
            view: self,
            front: 0,
            back: self.len,
        }
    }

    /// The elements of this view, in order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// One boolean per element: whether it satisfies `predicate`.
    pub fn is(&self, mut predicate: impl FnMut(&T) -> bool) -> Mask {
        self.iter().map(|value| predicate(&value)).collect()
    }

    /// Like [`View::is`], but `predicate` also receives the index.
    pub fn is_indexed(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> Mask {
        self.iter()
            .enumerate()
            .map(|(index, value)| predicate(&value, index))
            .collect()
    }

    /// A subview of the elements satisfying `predicate`.
    pub fn filter(&self, predicate: impl FnMut(&T) -> bool) -> Result<Self, ViewError> {
        self.subview(self.is(predicate))
    }

    pub fn filter_indexed(
        &self,
        predicate: impl FnMut(&T, usize) -> bool,
    ) -> Result<Self, ViewError> {
        self.subview(self.is_indexed(predicate))
    }

    /// Replace every element with `mapper(element, index)`.
    pub fn apply(&self, mut mapper: impl FnMut(&T, usize) -> T) -> Result<&Self, ViewError> {
        self.ensure_writable()?;
        for index in 0..self.len {
            let pos = self.position(index);
            let value = self.storage.read(pos);
            self.storage.write(pos, mapper(&value, index));
        }
        Ok(self)
    }

    /// Replace every element with `mapper(element, other, index)`,
    /// pairing elements with `other` in order.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::LengthMismatch` if `other` does not hold
    /// exactly `len()` items; nothing is written in that case.
    pub fn apply_with<U, I>(
        &self,
        other: I,
        mut mapper: impl FnMut(&T, &U, usize) -> T,
    ) -> Result<&Self, ViewError>
    where
        I: IntoIterator<Item = U>,
        I::IntoIter: ExactSizeIterator,
    {
        self.ensure_writable()?;
        let other = other.into_iter();
        if other.len() != self.len {
            return Err(ViewError::LengthMismatch {
                expected: self.len,
                got: other.len(),
            });
        }
        for (index, item) in other.enumerate() {
            let pos = self.position(index);
            let value = self.storage.read(pos);
            self.storage.write(pos, mapper(&value, &item, index));
        }
        Ok(self)
    }
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            layer: self.layer.clone(),
            len: self.len,
            readonly: self.readonly,
            depth: self.depth,
            config: self.config,
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("elements", &self.to_vec())
            .field("readonly", &self.readonly)
            .field("depth", &self.depth)
            .finish()
    }
}

impl<'a, T: Clone> IntoIterator for &'a View<T> {
    type Item = T;
    type IntoIter = ViewIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of a [`View`].
pub struct ViewIter<'a, T> {
    view: &'a View<T>,
    front: usize,
    back: usize,
}

impl<T: Clone> Iterator for ViewIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let pos = self.view.position(self.front);
        self.front += 1;
        Some(self.view.storage.read(pos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for ViewIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.view.storage.read(self.view.position(self.back)))
    }
}

impl<T: Clone> ExactSizeIterator for ViewIter<'_, T> {}

impl<T: Clone> FusedIterator for ViewIter<'_, T> {}

/// An argument to the generic offset surface
/// ([`View::offset_get`] and friends).
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum Offset {
    Index(isize),
    Select(Selector),
}

/// Conversion into an [`Offset`]. Integers and numeric strings are
/// indices; other strings are parsed as slices.
pub trait IntoOffset {
    fn into_offset(self) -> Result<Offset, SliceError>;
}

impl IntoOffset for Offset {
    fn into_offset(self) -> Result<Offset, SliceError> {
        Ok(self)
    }
}

// Integers outside the range of `isize` saturate, so they fail the
// bounds check like any other out-of-range index.
macro_rules! impl_into_offset_for_int {
    ($($ty:ty),*) => {
        $(
            impl IntoOffset for $ty {
                fn into_offset(self) -> Result<Offset, SliceError> {
                    let saturated = if self < 0 { isize::MIN } else { isize::MAX };
                    Ok(Offset::Index(isize::try_from(self).unwrap_or(saturated)))
                }
            }
        )*
    };
}

macro_rules! impl_into_offset_for_uint {
    ($($ty:ty),*) => {
        $(
            impl IntoOffset for $ty {
                fn into_offset(self) -> Result<Offset, SliceError> {
                    Ok(Offset::Index(isize::try_from(self).unwrap_or(isize::MAX)))
                }
            }
        )*
    };
}

impl_into_offset_for_int!(isize, i32, i64);
impl_into_offset_for_uint!(usize, u32, u64);

impl IntoOffset for &str {
    fn into_offset(self) -> Result<Offset, SliceError> {
        match parse::index(self) {
            Some(index) => Ok(Offset::Index(index)),
            None => Ok(Offset::Select(Selector::Slice(Slice::parse(self)?))),
        }
    }
}

impl IntoOffset for String {
    fn into_offset(self) -> Result<Offset, SliceError> {
        self.as_str().into_offset()
    }
}

macro_rules! impl_into_offset_for_selector {
    ($($ty:ty),*) => {
        $(
            impl IntoOffset for $ty {
                fn into_offset(self) -> Result<Offset, SliceError> {
                    Ok(Offset::Select(self.into_selector()?))
                }
            }
        )*
    };
}

impl_into_offset_for_selector!(
    Selector,
    &Selector,
    Slice,
    Mask,
    IndexList,
    &View<bool>,
    &View<isize>
);

/// The result of [`View::offset_get`].
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum Element<T> {
    One(T),
    Many(Vec<T>),
}

/// The right-hand side of a bulk write: a scalar broadcast to every
/// selected position, or one value per position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Values<T> {
    Scalar(T),
    Many(Vec<T>),
}

impl<T> From<Vec<T>> for Values<T> {
    fn from(values: Vec<T>) -> Self {
        Values::Many(values)
    }
}

impl<T: Clone> From<&[T]> for Values<T> {
    fn from(values: &[T]) -> Self {
        Values::Many(values.to_vec())
    }
}

impl<T, const N: usize> From<[T; N]> for Values<T> {
    fn from(values: [T; N]) -> Self {
        Values::Many(values.into())
    }
}

/// Snapshot of the current contents of a view.
impl<T: Clone> From<&View<T>> for Values<T> {
    fn from(view: &View<T>) -> Self {
        Values::Many(view.to_vec())
    }
}
