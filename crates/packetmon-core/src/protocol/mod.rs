//! Game packet decoding.
//!
//! The protocol follows a layered structure:
//! - `layout`: tags, field widths and bit masks (source of truth)
//! - `reader`/`view`: bounds-checked cursor over one payload window
//! - `parser`: per-packet decoders (no direct byte indexing)
//! - `classify`: noise tables and decoder selection
//! - `error`: explicit, typed decode errors
//!
//! Decoders are pure and stateless; they never allocate beyond the record
//! they return and never touch bytes outside the declared window.

pub mod classify;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod record;
pub mod view;
