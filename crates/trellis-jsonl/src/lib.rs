//! JSON Lines support for trellis data files.
//!
//! Feature catalogs and invocation ledgers are stored one record per line.
//! Reading is resilient: a damaged line produces a [`Warning`] and the rest of
//! the file still loads. Writing is atomic: data goes to a sibling temp file
//! that is renamed over the target once fully flushed.

#![forbid(unsafe_code)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;

pub use atomic::write_jsonl_atomic;
pub use error::{Error, Result};
pub use reader::{JsonlReader, read_jsonl_resilient};
pub use warning::Warning;
