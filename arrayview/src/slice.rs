/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::parse;
use crate::util;

/// The class of a failure, independent of the layer that raised it.
///
/// `Value` covers malformed input and length mismatches, `Index`
/// covers zero steps and out-of-range positions, and `Readonly` is
/// reported for mutations attempted through a readonly view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Value,
    Index,
    Readonly,
}

/// The type of error for slice operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SliceError {
    #[error("step cannot be 0")]
    ZeroStep,

    #[error("invalid slice: \"{input}\"")]
    InvalidSlice { input: String },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },
}

impl SliceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SliceError::InvalidSlice { .. } => ErrorKind::Value,
            SliceError::ZeroStep | SliceError::IndexOutOfRange { .. } => ErrorKind::Index,
        }
    }
}

/// A possibly-partial range specification in the style of Python
/// slices: `start`, `end` and `step` may each be left unset, and
/// negative values count from the end of the container.
///
/// Slices are resolved against a concrete length with
/// [`Slice::normalize`]. They can be written in the compact form
/// `start:end:step`, where every field is optional:
///
/// ```
/// # use arrayview::Slice;
/// let s: Slice = "::2".parse().unwrap();
/// assert_eq!(s, Slice::new(None, None, Some(2)));
/// assert_eq!(s.to_string(), "::2");
///
/// let indices: Vec<_> = s.normalize(10).unwrap().iter().collect();
/// assert_eq!(indices, vec![0, 2, 4, 6, 8]);
/// ```
///
/// Slices are also convertible from native Rust ranges over `isize`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize
)]
pub struct Slice {
    pub start: Option<isize>,
    pub end: Option<isize>,
    pub step: Option<isize>,
}

impl Slice {
    pub fn new(start: Option<isize>, end: Option<isize>, step: Option<isize>) -> Self {
        Self { start, end, step }
    }

    /// The slice that selects every element in order (`::`).
    pub fn full() -> Self {
        Self::default()
    }

    /// Replace the step of this slice.
    pub fn with_step(self, step: isize) -> Self {
        Self {
            step: Some(step),
            ..self
        }
    }

    /// Parse the compact `start:end:step` form. One to three
    /// colon-separated fields are accepted, each an optional signed
    /// integer. A bare integer is an index, not a slice, and is
    /// rejected here.
    pub fn parse(input: &str) -> Result<Self, SliceError> {
        parse::slice(input)
    }

    /// Returns true if `input` is in the compact slice form.
    pub fn is_slice_str(input: &str) -> bool {
        parse::slice(input).is_ok()
    }

    /// Resolve this slice against a container of length `len`.
    ///
    /// Unset fields take their defaults from the direction of the
    /// step: an ascending slice runs from `0` to `len`, a descending
    /// one from `len - 1` down to and including index `0`. Negative
    /// bounds wrap once by adding `len`, and whatever is still out of
    /// range is clamped rather than rejected, so that
    ///
    /// ```text
    ///     normalize(len).count() == len(range(len)[start:end:step])
    /// ```
    ///
    /// holds for every slice with a nonzero step.
    ///
    /// # Errors
    ///
    /// Returns `SliceError::ZeroStep` if the step is `0`.
    pub fn normalize(&self, len: usize) -> Result<NormalizedSlice, SliceError> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(SliceError::ZeroStep);
        }
        let size = len as isize;

        // A descending slice without an end runs past index 0, which
        // no wrapped index can express.
        let mut sentinel_end = (step < 0 && self.end.is_none()).then_some(-1);

        let start = self.start.unwrap_or(if step > 0 { 0 } else { size - 1 });
        let end = self.end.unwrap_or(if step > 0 { size } else { -1 });

        let mut start = util::normalize_index(start, len, false)?;
        let mut end = util::normalize_index(end, len, false)?;

        if step > 0 && start >= size {
            start = size - 1;
            end = size - 1;
        } else if step < 0 && start < 0 {
            start = 0;
            end = 0;
            sentinel_end = Some(0);
        }

        let start = util::squeeze_in_bounds(start, 0, size - 1);
        let mut end = util::squeeze_in_bounds(end, if step > 0 { 0 } else { -1 }, size);

        if (step > 0 && end < start) || (step < 0 && end > start) {
            end = start;
        }

        Ok(NormalizedSlice {
            start,
            end: sentinel_end.unwrap_or(end),
            step,
        })
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = |v: Option<isize>| v.map(|v| v.to_string()).unwrap_or_default();
        write!(
            f,
            "{}:{}:{}",
            field(self.start),
            field(self.end),
            field(self.step)
        )
    }
}

impl FromStr for Slice {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slice::parse(s)
    }
}

impl From<std::ops::Range<isize>> for Slice {
    fn from(r: std::ops::Range<isize>) -> Self {
        Self::new(Some(r.start), Some(r.end), None)
    }
}

impl From<std::ops::RangeFrom<isize>> for Slice {
    fn from(r: std::ops::RangeFrom<isize>) -> Self {
        Self::new(Some(r.start), None, None)
    }
}

impl From<std::ops::RangeTo<isize>> for Slice {
    fn from(r: std::ops::RangeTo<isize>) -> Self {
        Self::new(None, Some(r.end), None)
    }
}

impl From<std::ops::RangeFull> for Slice {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::full()
    }
}

/// A [`Slice`] whose fields have been resolved against a concrete
/// container length.
///
/// `start` always lies in `[0, len)` for a nonempty container, and
/// `end` may be `-1` for a descending slice that includes index `0`.
/// The slice maps the positions `0..count()` to container indices:
///
/// ```text
///     convert_index(i) = start + i × step
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NormalizedSlice {
    start: isize,
    end: isize,
    step: isize,
}

impl NormalizedSlice {
    pub fn start(&self) -> isize {
        self.start
    }

    pub fn end(&self) -> isize {
        self.end
    }

    pub fn step(&self) -> isize {
        self.step
    }

    /// The number of indices the slice selects. This is ⌈|end -
    /// start| / |step|⌉.
    pub fn count(&self) -> usize {
        (self.end - self.start)
            .unsigned_abs()
            .div_ceil(self.step.unsigned_abs())
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Convert a position within the slice to an index into the
    /// container. Negative positions count back from `count()`.
    ///
    /// # Errors
    ///
    /// Returns `SliceError::IndexOutOfRange` if `index` does not
    /// address one of the `count()` selected elements.
    pub fn convert_index(&self, index: isize) -> Result<usize, SliceError> {
        let index = util::normalize_index(index, self.count(), true)?;
        Ok(self.position(index as usize))
    }

    // Panics unless `index < count()`.
    pub(crate) fn position(&self, index: usize) -> usize {
        assert!(
            index < self.count(),
            "index {index} out of range for a slice selecting {}",
            self.count()
        );
        (self.start + index as isize * self.step) as usize
    }

    /// Iterator over the container indices selected by this slice,
    /// in order. Each call starts a fresh traversal.
    pub fn iter(&self) -> NormalizedSliceIterator {
        NormalizedSliceIterator {
            slice: *self,
            pos: 0,
            count: self.count(),
        }
    }
}

impl fmt::Display for NormalizedSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.end, self.step)
    }
}

impl<'a> IntoIterator for &'a NormalizedSlice {
    type Item = usize;
    type IntoIter = NormalizedSliceIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct NormalizedSliceIterator {
    slice: NormalizedSlice,
    pos: usize,
    count: usize,
}

impl Iterator for NormalizedSliceIterator {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.count {
            return None;
        }
        let index = self.slice.position(self.pos);
        self.pos += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NormalizedSliceIterator {}

impl FusedIterator for NormalizedSliceIterator {}
