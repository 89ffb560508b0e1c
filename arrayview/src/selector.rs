/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Selectors describe how a view picks elements out of its parent.
//!
//! A [`Selector`] is one of four kinds:
//!
//! - [`Selector::Slice`]: a Python-style `start:end:step` range;
//! - [`Selector::Mask`]: one boolean per parent element, selecting
//!   the positions that are `true`;
//! - [`Selector::IndexList`]: explicit parent indices, in any order,
//!   possibly repeated or negative;
//! - [`Selector::Pipe`]: a sequence of selectors applied in series,
//!   each to the output of the previous.
//!
//! A selector on its own is only a description. Binding it against a
//! concrete parent length `N` with [`Selector::bind`] validates it
//! and produces a [`Binding`]: a pure function from the selected
//! index space `0..M` to the parent index space `0..N`.
//!
//! ```
//! use arrayview::selector::dsl;
//!
//! let pipe = dsl::pipe([
//!     dsl::slice(..).with_step(2).into(),
//!     dsl::mask([true, false, true, false, true]),
//!     dsl::indices([0, 2]),
//! ]);
//! let binding = pipe.bind(10).unwrap();
//! assert_eq!(binding.iter().collect::<Vec<_>>(), vec![0, 8]);
//! ```
//!
//! ## Composition
//!
//! For a pipe `[s₁, …, sₖ]` bound against `N₀`, each `sᵢ` is bound
//! against the output length `Nᵢ₋₁` of its predecessor, yielding
//! `fᵢ: [0, Nᵢ) → [0, Nᵢ₋₁)`. The pipe maps its own indices down
//! to the original space as
//! ```text
//!     f₁ ∘ f₂ ∘ … ∘ fₖ
//! ```
//! that is, `fₖ` is applied first. Binding a pipe is thus equivalent
//! to chaining one subview per stage.

use std::fmt;
use std::str::FromStr;

use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use crate::slice::ErrorKind;
use crate::slice::NormalizedSlice;
use crate::slice::Slice;
use crate::slice::SliceError;
use crate::util;
use crate::view::View;

/// Errors that can occur when binding a selector to a length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SelectorError {
    #[error("mask length {got} does not match length {expected}")]
    MaskLengthMismatch { expected: usize, got: usize },

    #[error(transparent)]
    SliceError(#[from] SliceError),
}

impl SelectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SelectorError::MaskLengthMismatch { .. } => ErrorKind::Value,
            SelectorError::SliceError(err) => err.kind(),
        }
    }
}

/// A boolean mask. Selects the positions holding `true`, in
/// ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mask(Vec<bool>);

impl Mask {
    pub fn new(mask: Vec<bool>) -> Self {
        Self(mask)
    }

    /// Snapshot the current contents of `view` as a mask. Later
    /// writes through `view` do not affect the mask.
    pub fn from_view(view: &View<bool>) -> Self {
        Self(view.to_vec())
    }

    /// The mask itself.
    pub fn value(&self) -> &[bool] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<bool> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of selected positions.
    pub fn count_true(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

impl From<Vec<bool>> for Mask {
    fn from(mask: Vec<bool>) -> Self {
        Self(mask)
    }
}

impl<const N: usize> From<[bool; N]> for Mask {
    fn from(mask: [bool; N]) -> Self {
        Self(mask.to_vec())
    }
}

impl FromIterator<bool> for Mask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An explicit list of indices. Negative indices count from the end
/// of the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexList(Vec<isize>);

impl IndexList {
    pub fn new(indices: Vec<isize>) -> Self {
        Self(indices)
    }

    /// Snapshot the current contents of `view` as an index list.
    /// Later writes through `view` do not affect the list.
    pub fn from_view(view: &View<isize>) -> Self {
        Self(view.to_vec())
    }

    pub fn value(&self) -> &[isize] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<isize> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<isize>> for IndexList {
    fn from(indices: Vec<isize>) -> Self {
        Self(indices)
    }
}

impl<const N: usize> From<[isize; N]> for IndexList {
    fn from(indices: [isize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl FromIterator<isize> for IndexList {
    fn from_iter<I: IntoIterator<Item = isize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A description of which elements of a parent a view exposes.
/// See the [module documentation](self) for the four kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumAsInner)]
pub enum Selector {
    Slice(Slice),
    Mask(Mask),
    IndexList(IndexList),
    Pipe(Vec<Selector>),
}

impl Selector {
    /// Bind this selector against a parent of length `len`.
    ///
    /// # Errors
    ///
    /// - `SliceError::ZeroStep` for a slice with step `0`;
    /// - `SelectorError::MaskLengthMismatch` for a mask whose length
    ///   differs from `len`;
    /// - `SliceError::IndexOutOfRange` for an index list entry that is
    ///   out of bounds after wrapping.
    ///
    /// A pipe fails with the error of its first failing stage.
    pub fn bind(&self, len: usize) -> Result<Binding, SelectorError> {
        match self {
            Selector::Slice(slice) => Ok(Binding::Slice(slice.normalize(len)?)),
            Selector::Mask(mask) => {
                if mask.len() != len {
                    return Err(SelectorError::MaskLengthMismatch {
                        expected: len,
                        got: mask.len(),
                    });
                }
                Ok(Binding::Mask(mask.value().iter().positions(|&b| b).collect()))
            }
            Selector::IndexList(indices) => {
                let positions = indices
                    .value()
                    .iter()
                    .map(|&index| util::normalize_index(index, len, true).map(|i| i as usize))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Binding::IndexList(positions))
            }
            Selector::Pipe(selectors) => {
                let mut stages = Vec::with_capacity(selectors.len());
                let mut stage_len = len;
                for selector in selectors {
                    let binding = selector.bind(stage_len)?;
                    stage_len = binding.len();
                    stages.push(binding);
                }
                Ok(Binding::Pipe {
                    stages,
                    source_len: len,
                })
            }
        }
    }

    /// Returns whether this selector can be bound against a parent of
    /// length `len`.
    pub fn is_compatible_with(&self, len: usize) -> bool {
        self.bind(len).is_ok()
    }

    /// A short name for the kind of this selector.
    pub fn kind(&self) -> &'static str {
        match self {
            Selector::Slice(_) => "slice",
            Selector::Mask(_) => "mask",
            Selector::IndexList(_) => "index_list",
            Selector::Pipe(_) => "pipe",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Slice(slice) => write!(f, "{}", slice),
            Selector::Mask(mask) => write!(
                f,
                "mask[{}]",
                mask.value().iter().map(|&b| u8::from(b)).join(",")
            ),
            Selector::IndexList(indices) => write!(f, "indices[{}]", indices.value().iter().join(",")),
            Selector::Pipe(selectors) => write!(f, "pipe({})", selectors.iter().join(" | ")),
        }
    }
}

impl FromStr for Selector {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Selector::Slice(Slice::parse(s)?))
    }
}

impl From<Slice> for Selector {
    fn from(slice: Slice) -> Self {
        Selector::Slice(slice)
    }
}

impl From<Mask> for Selector {
    fn from(mask: Mask) -> Self {
        Selector::Mask(mask)
    }
}

impl From<IndexList> for Selector {
    fn from(indices: IndexList) -> Self {
        Selector::IndexList(indices)
    }
}

/// A selector bound against a concrete parent length: a map from the
/// selected index space `0..len()` into the parent's index space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Slice(NormalizedSlice),
    /// The parent positions of the `true` entries.
    Mask(Vec<usize>),
    /// The parent positions, already wrapped and bounds-checked.
    IndexList(Vec<usize>),
    /// Stages in application order; `source_len` is the parent
    /// length, which an empty pipe passes through unchanged.
    Pipe {
        stages: Vec<Binding>,
        source_len: usize,
    },
}

impl Binding {
    /// The number of selected elements.
    pub fn len(&self) -> usize {
        match self {
            Binding::Slice(slice) => slice.count(),
            Binding::Mask(positions) | Binding::IndexList(positions) => positions.len(),
            Binding::Pipe { stages, source_len } => {
                stages.last().map_or(*source_len, Binding::len)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map a selected index to a parent index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn map(&self, index: usize) -> usize {
        assert!(
            index < self.len(),
            "index {index} out of range for a selection of length {}",
            self.len()
        );
        match self {
            Binding::Slice(slice) => slice.position(index),
            Binding::Mask(positions) | Binding::IndexList(positions) => positions[index],
            Binding::Pipe { stages, .. } => stages
                .iter()
                .rev()
                .fold(index, |index, stage| stage.map(index)),
        }
    }

    /// The parent indices of all selected elements, in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        (0..self.len()).map(|index| self.map(index))
    }
}

/// Conversion into a [`Selector`] at API boundaries. Strings are
/// parsed as slices here, once, so that every operation taking a
/// selector also accepts the `start:end:step` shorthand.
pub trait IntoSelector {
    fn into_selector(self) -> Result<Selector, SliceError>;
}

impl IntoSelector for Selector {
    fn into_selector(self) -> Result<Selector, SliceError> {
        Ok(self)
    }
}

impl IntoSelector for &Selector {
    fn into_selector(self) -> Result<Selector, SliceError> {
        Ok(self.clone())
    }
}

impl IntoSelector for Slice {
    fn into_selector(self) -> Result<Selector, SliceError> {
        Ok(Selector::Slice(self))
    }
}

impl IntoSelector for Mask {
    fn into_selector(self) -> Result<Selector, SliceError> {
        Ok(Selector::Mask(self))
    }
}

impl IntoSelector for IndexList {
    fn into_selector(self) -> Result<Selector, SliceError> {
        Ok(Selector::IndexList(self))
    }
}

impl IntoSelector for &str {
    fn into_selector(self) -> Result<Selector, SliceError> {
        self.parse()
    }
}

impl IntoSelector for String {
    fn into_selector(self) -> Result<Selector, SliceError> {
        self.as_str().parse()
    }
}

/// Snapshot of a boolean view, used as a mask.
impl IntoSelector for &View<bool> {
    fn into_selector(self) -> Result<Selector, SliceError> {
        Ok(Selector::Mask(Mask::from_view(self)))
    }
}

/// Snapshot of an integer view, used as an index list.
impl IntoSelector for &View<isize> {
    fn into_selector(self) -> Result<Selector, SliceError> {
        Ok(Selector::IndexList(IndexList::from_view(self)))
    }
}

/// Constructors for building [`Selector`]s.
pub mod dsl {
    use super::IndexList;
    use super::Mask;
    use super::Selector;
    use crate::slice::Slice;

    pub fn slice<S: Into<Slice>>(s: S) -> Slice {
        s.into()
    }
    pub fn mask<M: Into<Mask>>(m: M) -> Selector {
        Selector::Mask(m.into())
    }
    pub fn indices<I: Into<IndexList>>(i: I) -> Selector {
        Selector::IndexList(i.into())
    }
    pub fn pipe<I: IntoIterator<Item = Selector>>(selectors: I) -> Selector {
        Selector::Pipe(selectors.into_iter().collect())
    }
}
