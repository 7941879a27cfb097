//! Low-level scanner for the Java lexicon.
//!
//! Produces `(RawTag, len)` pairs over a sentinel-terminated
//! [`SourceBuffer`]. Keywords are not resolved, literal values are not
//! decoded, and trivia (whitespace, comments) is reported rather than
//! skipped: the cooking layer and the cursor-aware tokenizer both need to
//! see it.

mod cursor;
mod raw_scanner;
mod source_buffer;
mod tag;

pub use cursor::Cursor;
pub use raw_scanner::RawScanner;
pub use source_buffer::SourceBuffer;
pub use tag::{RawTag, RawToken};
