/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Property-based generators for [`Slice`], [`Selector`] and related
//! types.
//!
//! Selector generators take the length they will be bound against
//! and only produce selectors that bind successfully at that length,
//! so tests can chain them.
//!
//! Example usage:
//!
//! ```
//! use proptest::prelude::*;
//!
//! use crate::strategy::gen_selector;
//!
//! proptest! {
//!     #[test]
//!     fn test_selector(s in gen_selector(8)) {
//!         prop_assert!(s.is_compatible_with(8));
//!     }
//! }
//! ```
//!
//! This module is only included in test builds (`#[cfg(test)]`).

use proptest::prelude::*;

use crate::selector::IndexList;
use crate::selector::Mask;
use crate::selector::Selector;
use crate::slice::Slice;

/// Generates a [`Slice`] whose fields, when set, lie in
/// `[-max, max]`. The step is never `0`.
pub fn gen_slice(max: isize) -> impl Strategy<Value = Slice> {
    let max = max.max(1);
    (
        prop::option::of(-max..=max),
        prop::option::of(-max..=max),
        prop::option::of(prop_oneof![-max..=-1isize, 1..=max]),
    )
        .prop_map(|(start, end, step)| Slice::new(start, end, step))
}

/// Generates a [`Mask`] of exactly `len` entries.
pub fn gen_mask(len: usize) -> impl Strategy<Value = Mask> {
    prop::collection::vec(any::<bool>(), len).prop_map(Mask::new)
}

/// Generates an [`IndexList`] of up to `max_count` entries, each
/// valid (possibly negative) for a container of length `len`.
pub fn gen_index_list(len: usize, max_count: usize) -> BoxedStrategy<IndexList> {
    if len == 0 {
        return Just(IndexList::default()).boxed();
    }
    let len = len as isize;
    prop::collection::vec(-len..len, 0..=max_count)
        .prop_map(IndexList::new)
        .boxed()
}

/// Generates a slice, mask or index list selector that binds against
/// `len`.
pub fn gen_selector(len: usize) -> BoxedStrategy<Selector> {
    prop_oneof![
        gen_slice(len as isize + 2).prop_map(Selector::Slice),
        gen_mask(len).prop_map(Selector::Mask),
        gen_index_list(len, 2 * len + 1).prop_map(Selector::IndexList),
    ]
    .boxed()
}

/// Generates `(len, s1, s2)` such that `s1` binds against `len` and
/// `s2` binds against the length `s1` selects.
pub fn gen_selector_chain(max_len: usize) -> impl Strategy<Value = (usize, Selector, Selector)> {
    (0..=max_len)
        .prop_flat_map(|len| (Just(len), gen_selector(len)))
        .prop_flat_map(|(len, first)| {
            let mid = first.bind(len).map_or(0, |binding| binding.len());
            (Just(len), Just(first), gen_selector(mid))
        })
}

/// The indices `range(len)[start:end:step]` selects in Python.
pub fn python_slice(len: usize, slice: &Slice) -> Vec<usize> {
    let len = len as isize;
    let step = slice.step.unwrap_or(1);
    let adjust = |value: Option<isize>, default: isize| match value {
        None => default,
        Some(v) if v < 0 => {
            let v = v + len;
            if v < 0 {
                if step < 0 { -1 } else { 0 }
            } else {
                v
            }
        }
        Some(v) if v >= len => {
            if step < 0 {
                len - 1
            } else {
                len
            }
        }
        Some(v) => v,
    };
    let start = adjust(slice.start, if step < 0 { len - 1 } else { 0 });
    let end = adjust(slice.end, if step < 0 { -1 } else { len });

    let mut indices = Vec::new();
    let mut i = start;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        indices.push(i as usize);
        i += step;
    }
    indices
}

#[cfg(test)]
mod tests {
    use proptest::strategy::ValueTree;
    use proptest::test_runner::Config;
    use proptest::test_runner::TestRunner;

    use super::*;
    use crate::View;
    use crate::ViewError;
    use crate::selector::SelectorError;
    use crate::selector::dsl;
    use crate::slice::ErrorKind;

    fn root(len: usize) -> View<i32> {
        View::with_config((0..len as i32).collect::<Vec<_>>(), &crate::Config::default())
    }

    #[test]
    fn print_some_selectors() {
        let mut runner = TestRunner::new(Config::default());

        for _ in 0..64 {
            let value = gen_selector(6).new_tree(&mut runner).unwrap().current();
            println!("{}", value);
        }
    }

    #[test]
    fn test_python_slice_reference() {
        assert_eq!(python_slice(5, &"::-1".parse().unwrap()), vec![4, 3, 2, 1, 0]);
        assert_eq!(python_slice(5, &"-100:2".parse().unwrap()), vec![0, 1]);
        assert_eq!(python_slice(5, &"10::-2".parse().unwrap()), vec![4, 2, 0]);
        assert!(python_slice(0, &"::-1".parse().unwrap()).is_empty());
    }

    proptest! {
        // Normalization agrees with Python's slice semantics, both
        // in count and in the indices produced.
        #[test]
        fn normalize_matches_python(len in 0usize..24, slice in gen_slice(30)) {
            let normalized = slice.normalize(len).unwrap();
            let expected = python_slice(len, &slice);
            prop_assert_eq!(normalized.count(), expected.len());
            prop_assert_eq!(normalized.iter().collect::<Vec<_>>(), expected);
        }

        #[test]
        fn root_view_matches_source(len in 0usize..32) {
            let view = root(len);
            let source: Vec<i32> = (0..len as i32).collect();
            prop_assert_eq!(view.to_vec(), source.clone());
            prop_assert_eq!(view.iter().len(), len);
            for (i, value) in source.iter().enumerate() {
                prop_assert_eq!(view.get(i as isize).unwrap(), *value);
                prop_assert_eq!(view.get(i as isize - len as isize).unwrap(), *value);
            }
        }

        #[test]
        fn full_slice_is_identity((len, s1, _) in gen_selector_chain(16)) {
            let view = root(len).subview(s1).unwrap();
            let same = view.subview("::1").unwrap();
            prop_assert_eq!(same.to_vec(), view.to_vec());
        }

        // `subview(s1).subview(s2)` selects the same elements as
        // `subview(pipe[s1, s2])`.
        #[test]
        fn chaining_is_piping((len, s1, s2) in gen_selector_chain(16)) {
            let view = root(len);
            let chained = view.subview(s1.clone()).unwrap().subview(s2.clone()).unwrap();
            let piped = view.subview(dsl::pipe([s1.clone(), s2.clone()])).unwrap();
            prop_assert_eq!(chained.len(), piped.len());
            prop_assert_eq!(chained.to_vec(), piped.to_vec());
            prop_assert_eq!(
                view.get_selected(dsl::pipe([s1, s2])).unwrap(),
                chained.to_vec()
            );
        }

        // Writes through a subview land where reads through it come
        // from.
        #[test]
        fn writes_follow_reads((len, s1, _) in gen_selector_chain(16)) {
            let view = root(len);
            let sub = view.subview(s1).unwrap();
            sub.apply(|x, _| x + 100).unwrap();
            for value in sub.iter() {
                prop_assert!(value >= 100);
            }
            let untouched = view.iter().filter(|x| *x < 100).count();
            let touched = len - untouched;
            prop_assert!(touched <= sub.len());
        }

        #[test]
        fn mask_length_mismatch(
            (len, other) in (0usize..16, 0usize..16).prop_filter("lengths differ", |(a, b)| a != b),
            bit in any::<bool>(),
        ) {
            let err = root(len).subview(Mask::new(vec![bit; other])).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::Value);
            prop_assert_eq!(
                err,
                ViewError::SelectorError(SelectorError::MaskLengthMismatch {
                    expected: len,
                    got: other,
                })
            );
        }
    }
}
