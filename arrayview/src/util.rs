/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::slice::SliceError;

/// Wraps a possibly negative `index` into a container of length
/// `len`: negative indices count from the end, so `-1` is the last
/// element.
///
/// With `strict`, the wrapped index must address an element, i.e.
/// lie in `[0, len)`. Without it the wrapped value is returned
/// as-is, which slice normalization relies on before clamping.
///
/// ```
/// # use arrayview::util::normalize_index;
/// assert_eq!(normalize_index(-1, 5, true).unwrap(), 4);
/// assert_eq!(normalize_index(-7, 5, false).unwrap(), -2);
/// assert!(normalize_index(5, 5, true).is_err());
/// ```
///
/// # Errors
///
/// Returns `SliceError::IndexOutOfRange`, naming the original
/// `index`, if `strict` is set and the wrapped index is out of
/// bounds.
pub fn normalize_index(index: isize, len: usize, strict: bool) -> Result<isize, SliceError> {
    let wrapped = if index >= 0 {
        index
    } else {
        index.saturating_add(len as isize)
    };
    if strict && (wrapped < 0 || wrapped as usize >= len) {
        return Err(SliceError::IndexOutOfRange { index, len });
    }
    Ok(wrapped)
}

/// Bounds `x` to `[min, max]`. Unlike [`Ord::clamp`] this does not
/// require `min <= max`: when the interval is empty the result is
/// `min`.
pub(crate) fn squeeze_in_bounds(x: isize, min: isize, max: isize) -> isize {
    x.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_index_strict() {
        assert_eq!(normalize_index(0, 3, true).unwrap(), 0);
        assert_eq!(normalize_index(2, 3, true).unwrap(), 2);
        assert_eq!(normalize_index(-1, 3, true).unwrap(), 2);
        assert_eq!(normalize_index(-3, 3, true).unwrap(), 0);
        assert_eq!(
            normalize_index(3, 3, true).unwrap_err(),
            SliceError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(
            normalize_index(-4, 3, true).unwrap_err(),
            SliceError::IndexOutOfRange { index: -4, len: 3 }
        );
        assert!(normalize_index(0, 0, true).is_err());
        assert!(normalize_index(isize::MIN, 3, true).is_err());
    }

    #[test]
    fn test_normalize_index_lenient() {
        assert_eq!(normalize_index(10, 3, false).unwrap(), 10);
        assert_eq!(normalize_index(-1, 3, false).unwrap(), 2);
        assert_eq!(normalize_index(-10, 3, false).unwrap(), -7);
        assert_eq!(normalize_index(-1, 0, false).unwrap(), -1);
    }

    #[test]
    fn test_squeeze_in_bounds() {
        assert_eq!(squeeze_in_bounds(5, 0, 3), 3);
        assert_eq!(squeeze_in_bounds(-5, 0, 3), 0);
        assert_eq!(squeeze_in_bounds(2, 0, 3), 2);
        // Empty interval, as for a zero-length container.
        assert_eq!(squeeze_in_bounds(-1, 0, -1), 0);
    }
}
