/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Parsers for the compact textual forms accepted wherever an offset
//! or a selector is expected.
//! ```text
//! offset   ::= index | slice
//! index    ::= integer
//! slice    ::= field? ( ":" field? ( ":" field? )? )?
//! field    ::= integer | "-"
//! integer  ::= "-"? [0-9]+
//! ```
//!
//! Notes:
//! - A slice has the form `start:end:step`; any field may be empty,
//!   which leaves it unset (see [`Slice::normalize`] for defaults).
//! - A bare `-` field is zero, so `":-"` selects nothing. It is not an
//!   index: `"-"` on its own is rejected.
//! - A lone integer is an index, never a slice: `"3"` addresses one
//!   element while `"3:"` selects a range.
//! - The empty string is the full slice.
//! - Whitespace is not admitted.

use nom::IResult;
use nom::Parser as _;
use nom::branch::alt;
use nom::character::complete::char;
use nom::character::complete::digit1;
use nom::combinator::all_consuming;
use nom::combinator::map_res;
use nom::combinator::opt;
use nom::combinator::recognize;
use nom::combinator::value;
use nom::sequence::preceded;

use crate::slice::Slice;
use crate::slice::SliceError;

fn integer(input: &str) -> IResult<&str, isize> {
    map_res(recognize((opt(char('-')), digit1)), str::parse).parse(input)
}

fn field(input: &str) -> IResult<&str, isize> {
    alt((integer, value(0, char('-')))).parse(input)
}

// The fields of a slice, with the number of fields present.
fn fields(input: &str) -> IResult<&str, (usize, [Option<isize>; 3])> {
    let (input, (start, rest)) = (
        opt(field),
        opt(preceded(
            char(':'),
            (opt(field), opt(preceded(char(':'), opt(field)))),
        )),
    )
        .parse(input)?;

    Ok((
        input,
        match rest {
            None => (1, [start, None, None]),
            Some((end, None)) => (2, [start, end, None]),
            Some((end, Some(step))) => (3, [start, end, step]),
        },
    ))
}

/// Parses `input` as an index. Returns `None` if it is anything else.
pub fn index(input: &str) -> Option<isize> {
    all_consuming(integer)
        .parse(input)
        .ok()
        .map(|(_, index)| index)
}

/// Parses `input` as a slice in `start:end:step` form.
///
/// # Errors
///
/// Returns `SliceError::InvalidSlice` if `input` is not in slice
/// form, including when it is a lone integer.
pub fn slice(input: &str) -> Result<Slice, SliceError> {
    let invalid = || SliceError::InvalidSlice {
        input: input.to_string(),
    };
    let (_, (num_fields, [start, end, step])) =
        all_consuming(fields).parse(input).map_err(|_| invalid())?;
    if num_fields == 1 && start.is_some() {
        return Err(invalid());
    }
    Ok(Slice::new(start, end, step))
}
