//! Per-block-type parsers, one module per non-trivial block (spec.md §4.3
//! table). Each exposes a zero-sized `...Parser` implementing
//! [`super::BlockParser`].

pub mod bo;
pub mod contour;
pub mod en;
pub mod generic;
pub mod ko;
pub mod pu;
pub mod sc;
pub mod si;
pub mod st;
