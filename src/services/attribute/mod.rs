//! Whitespace-delimited text encodings of collection attributes.
//!
//! Both formats are positional integer lists. A blob that ends early keeps
//! the fields read so far; any malformed field discards the whole blob in
//! favour of the attribute's defaults.

mod collection;
mod compatibility;
mod fields;

pub use fields::FieldReader;
