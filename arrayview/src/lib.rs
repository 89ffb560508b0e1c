/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Composable, linked views over one-dimensional storage.
//!
//! Provides [`View`], a window onto a shared [`Storage`] that picks
//! out elements with numpy-style selectors: Python slices, boolean
//! masks, explicit index lists, and pipes combining them. Views nest
//! to any depth and stay linked to their storage, so a write through
//! any of them is visible through all. See [`View`] for more details.
//!
//! ```
//! use arrayview::View;
//! use arrayview::dsl;
//!
//! let view = View::from_vec((1..=10).collect::<Vec<i32>>());
//! let picked = view
//!     .subview("::2")?
//!     .subview(dsl::mask([true, false, true, false, true]))?
//!     .subview(dsl::indices([0, 2]))?;
//! assert_eq!(picked.to_vec(), vec![1, 9]);
//! # Ok::<(), arrayview::ViewError>(())
//! ```

mod factory;
mod parse;
mod slice;
mod storage;

pub use factory::ViewSource;
pub use factory::to_unlinked_view;
pub use factory::to_unlinked_view_with_config;
pub use factory::to_view;
pub use factory::to_view_with_config;
pub use slice::ErrorKind;
pub use slice::NormalizedSlice;
pub use slice::NormalizedSliceIterator;
pub use slice::Slice;
pub use slice::SliceError;
pub use storage::Storage;

/// View configuration, loaded from the environment or YAML.
pub mod config;

/// Selector kinds, their binding against a length, and the selector
/// DSL.
pub mod selector;

/// Linked views and the indexing surface.
pub mod view;

/// Utilities.
pub mod util;

pub use config::Config;
pub use selector::Binding;
pub use selector::IndexList;
pub use selector::IntoSelector;
pub use selector::Mask;
pub use selector::Selector;
pub use selector::SelectorError;
/// DSL-style constructors for building `Selector`s.
pub use selector::dsl;
pub use view::Element;
pub use view::IntoOffset;
pub use view::Offset;
pub use view::Values;
pub use view::View;
pub use view::ViewError;
pub use view::ViewIter;

/// Property-based generators for randomized test input.
#[cfg(test)]
pub mod strategy;
