//! Range math and download planning.
//!
//! Splits the content into fixed-size download chunks, computes HTTP Range
//! bounds, and lays out the output segments (whose size is independent of the
//! chunk size).

mod range;

pub use range::{ByteRange, PlanError, RangePlan};
