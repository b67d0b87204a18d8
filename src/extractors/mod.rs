//! Blueprint-driven extraction
//!
//! Parse, resolve the blueprint, run each key's selector and project every
//! match. The whole pass is synchronous and keeps no state between calls.

mod assembler;
mod projector;
mod selector;

pub use assembler::*;
pub use projector::*;
pub use selector::*;

use crate::blueprint::{resolve, Blueprint};
use crate::document::{DocumentQuery, HtmlDocument};
use crate::error::Result;

/// Extract from HTML text with the `scraper` backend.
pub fn extract(
    raw_markup: &str,
    default: &Blueprint,
    over: Option<&Blueprint>,
) -> Result<OutputDocument> {
    extract_with::<HtmlDocument>(raw_markup, default, over)
}

/// Extract from raw bytes; non-UTF-8 input is a parse error.
pub fn extract_bytes(
    raw_markup: &[u8],
    default: &Blueprint,
    over: Option<&Blueprint>,
) -> Result<OutputDocument> {
    // Blueprint problems are reported before the markup is looked at
    let compiled = resolve(default, over)?.compile::<HtmlDocument>()?;
    let document = HtmlDocument::from_bytes(raw_markup)?;
    Ok(assemble(&compiled, &document))
}

/// Extract with any [`DocumentQuery`] backend.
pub fn extract_with<D: DocumentQuery>(
    raw_markup: &str,
    default: &Blueprint,
    over: Option<&Blueprint>,
) -> Result<OutputDocument> {
    let compiled = resolve(default, over)?.compile::<D>()?;
    let document = D::parse(raw_markup)?;
    Ok(assemble(&compiled, &document))
}
