/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Entry points that turn raw storage or an existing view into a
//! view, deciding between wrapping, reusing and copying.

use crate::config::Config;
use crate::storage::Storage;
use crate::view::View;

/// Anything a view can be built from.
pub enum ViewSource<T> {
    Raw(Storage<T>),
    View(View<T>),
}

impl<T> From<Vec<T>> for ViewSource<T> {
    fn from(items: Vec<T>) -> Self {
        ViewSource::Raw(Storage::new(items))
    }
}

impl<T> From<Storage<T>> for ViewSource<T> {
    fn from(storage: Storage<T>) -> Self {
        ViewSource::Raw(storage)
    }
}

impl<T> From<View<T>> for ViewSource<T> {
    fn from(view: View<T>) -> Self {
        ViewSource::View(view)
    }
}

impl<T> From<&View<T>> for ViewSource<T> {
    fn from(view: &View<T>) -> Self {
        ViewSource::View(view.clone())
    }
}

/// A view linked to `source`, built with the default [`Config`].
/// See [`to_view_with_config`].
pub fn to_view<T>(source: impl Into<ViewSource<T>>, readonly: Option<bool>) -> View<T> {
    to_view_with_config(source, readonly, &Config::default())
}

/// A view linked to `source`.
///
/// Raw storage is wrapped in a new root view configured by `config`,
/// readonly if `readonly` says so, or else per
/// `config.default_readonly`. An existing view keeps its own
/// configuration and is returned as is, unless `readonly` is
/// `Some(true)` and the view is writable, in which case a readonly
/// handle onto it is returned. A readonly view is never made
/// writable.
pub fn to_view_with_config<T>(
    source: impl Into<ViewSource<T>>,
    readonly: Option<bool>,
    config: &Config,
) -> View<T> {
    match source.into() {
        ViewSource::Raw(storage) => {
            let config = config.with_default_readonly(readonly.unwrap_or(config.default_readonly));
            tracing::debug!(len = storage.len(), "wrapping storage in a view");
            View::with_config(storage, &config)
        }
        ViewSource::View(view) => {
            if readonly == Some(true) && !view.is_readonly() {
                tracing::debug!(len = view.len(), "upgrading view to readonly");
                view.to_readonly()
            } else {
                tracing::debug!(len = view.len(), "reusing view");
                view
            }
        }
    }
}

/// A root view over a fresh copy of the current contents of
/// `source`, built with the default [`Config`]. See
/// [`to_unlinked_view_with_config`].
pub fn to_unlinked_view<T: Clone>(
    source: impl Into<ViewSource<T>>,
    readonly: Option<bool>,
) -> View<T> {
    to_unlinked_view_with_config(source, readonly, &Config::default())
}

/// A root view over a fresh copy of the current contents of
/// `source`. Writes to the copy and to `source` are not visible to
/// each other.
///
/// A copy of a view keeps that view's configuration, and without an
/// explicit `readonly` it is readonly iff the view is. A copy of raw
/// storage is configured by `config`.
pub fn to_unlinked_view_with_config<T: Clone>(
    source: impl Into<ViewSource<T>>,
    readonly: Option<bool>,
    config: &Config,
) -> View<T> {
    let (items, inherited, config) = match source.into() {
        ViewSource::Raw(storage) => (storage.to_vec(), config.default_readonly, *config),
        ViewSource::View(view) => (view.to_vec(), view.is_readonly(), *view.config()),
    };
    tracing::debug!(len = items.len(), "copying into an unlinked view");
    let config = config.with_default_readonly(readonly.unwrap_or(inherited));
    View::with_config(items, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_view_wraps_storage() {
        let storage = Storage::from(vec![1, 2, 3]);
        let view = to_view(storage.clone(), Some(false));
        assert!(view.storage().shares_with(&storage));
        assert!(!view.is_readonly());
        view.set(0, 10).unwrap();
        assert_eq!(storage.to_vec(), vec![10, 2, 3]);

        assert!(to_view(vec![1], Some(true)).is_readonly());
    }

    #[test]
    fn test_to_view_reuses_views() {
        let view = View::with_config(vec![1, 2, 3], &Config::default());
        let sub = view.subview("1:").unwrap();

        let same = to_view(&sub, None);
        assert_eq!(same.depth(), 1);
        assert!(!same.is_readonly());
        same.set(0, 20).unwrap();
        assert_eq!(view.to_vec(), vec![1, 20, 3]);

        let ro = to_view(&sub, Some(true));
        assert!(ro.is_readonly());
        assert!(!sub.is_readonly());
        assert_eq!(ro.to_vec(), vec![20, 3]);

        // Never lowered.
        assert!(to_view(ro, Some(false)).is_readonly());
    }

    #[test]
    fn test_to_unlinked_view() {
        let view = View::with_config(vec![1, 2, 3, 4], &Config::default());
        let rev = view.subview("::-1").unwrap();
        let copy = to_unlinked_view(&rev, None);
        assert_eq!(copy.to_vec(), vec![4, 3, 2, 1]);
        assert_eq!(copy.depth(), 0);
        assert!(!copy.storage().shares_with(view.storage()));

        copy.set(0, 40).unwrap();
        view.set(0, 10).unwrap();
        assert_eq!(view.to_vec(), vec![10, 2, 3, 4]);
        assert_eq!(copy.to_vec(), vec![40, 3, 2, 1]);
    }

    #[test]
    fn test_to_unlinked_view_readonly() {
        let ro = View::with_config(vec![1, 2], &Config::default()).to_readonly();
        assert!(to_unlinked_view(&ro, None).is_readonly());
        assert!(!to_unlinked_view(&ro, Some(false)).is_readonly());

        let storage = Storage::from(vec![1, 2]);
        let copy = to_unlinked_view(storage.clone(), Some(true));
        assert!(copy.is_readonly());
        assert!(!copy.storage().shares_with(&storage));
    }

    #[test]
    fn test_default_config() {
        assert_eq!(*to_view(vec![1, 2, 3], None).config(), Config::default());
        assert_eq!(*to_unlinked_view(vec![1, 2, 3], None).config(), Config::default());
        assert!(!to_view(vec![1], None).is_readonly());
        assert!(!to_unlinked_view(vec![1], None).is_readonly());
    }

    #[test]
    fn test_with_config() {
        let config = Config::default().with_default_readonly(true).with_max_depth(1);

        let view = to_view_with_config(vec![1, 2, 3], None, &config);
        assert!(view.is_readonly());
        assert_eq!(view.config().max_depth, 1);
        assert!(!to_view_with_config(vec![1], Some(false), &config).is_readonly());

        let copy = to_unlinked_view_with_config(vec![1, 2, 3], None, &config);
        assert!(copy.is_readonly());
        assert_eq!(*copy.config(), config);

        // Views keep the configuration they were built with.
        let writable = View::with_config(vec![1, 2], &Config::default());
        let reused = to_view_with_config(&writable, None, &config);
        assert!(!reused.is_readonly());
        assert_eq!(reused.config().max_depth, usize::MAX);
        let copy = to_unlinked_view_with_config(&writable, None, &config);
        assert!(!copy.is_readonly());
        assert_eq!(*copy.config(), Config::default());
    }
}
