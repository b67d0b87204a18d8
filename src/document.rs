//! Document loading and the query contract the extractors run against
//!
//! The extractors only see [`DocumentQuery`] and [`ElementView`]; the
//! `scraper` backend below is the one the crate ships with.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ParseError;

/// Read access to one matched element.
pub trait ElementView {
    /// Value of `name` if the element carries it.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Concatenated descendant text, untrimmed.
    fn text_content(&self) -> String;
}

/// A parsed tree that can be queried with compiled selectors.
pub trait DocumentQuery: Sized {
    /// Backend-specific compiled selector.
    type Query;

    type Element<'a>: ElementView
    where
        Self: 'a;

    fn parse(markup: &str) -> Result<Self, ParseError>;

    /// Compile a selector string. The error is the backend's reason text.
    fn compile(selector: &str) -> Result<Self::Query, String>;

    /// Matches in document order (pre-order, depth-first).
    fn select<'a>(
        &'a self,
        query: &'a Self::Query,
    ) -> Box<dyn Iterator<Item = Self::Element<'a>> + 'a>;
}

/// HTML document parsed with html5ever through `scraper`.
#[derive(Debug)]
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parse raw bytes, rejecting anything that is not UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let markup = std::str::from_utf8(bytes)?;
        Self::parse(markup)
    }
}

impl DocumentQuery for HtmlDocument {
    type Query = Selector;
    type Element<'a> = ElementRef<'a>;

    fn parse(markup: &str) -> Result<Self, ParseError> {
        let html = Html::parse_document(markup);
        if !html.errors.is_empty() {
            // html5ever recovers from these; they never fail the run
            debug!(count = html.errors.len(), "recovered from markup errors");
        }
        Ok(Self { html })
    }

    fn compile(selector: &str) -> Result<Selector, String> {
        Selector::parse(selector).map_err(|e| e.to_string())
    }

    fn select<'a>(
        &'a self,
        query: &'a Selector,
    ) -> Box<dyn Iterator<Item = ElementRef<'a>> + 'a> {
        Box::new(self.html.select(query))
    }
}

impl ElementView for ElementRef<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn text_content(&self) -> String {
        self.text().collect::<String>()
    }
}
