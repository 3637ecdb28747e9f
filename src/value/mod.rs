//! Dynamic value domain
//!
//! `Value` is the closed set of runtime types a cell can hold.
//! `ValuesComparator` orders any two values; `ValuesConverter` coerces a
//! value into a concrete Rust type. `LikePattern` implements SQL LIKE.

mod comparator;
mod converter;
mod errors;
mod pattern;
mod types;

pub use comparator::ValuesComparator;
pub use converter::ValuesConverter;
pub use errors::{ConversionError, ConversionResult};
pub use pattern::LikePattern;
pub use types::{Row, Value};

