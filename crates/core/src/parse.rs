//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! table extractor to locate a table and walk its rows and cells.
//!
//! # Example
//!
//! ```rust
//! use crimetrend_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <table><tr><td>2020</td><td>1 234</td></tr></table>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let tables = doc.select("table").unwrap();
//! assert_eq!(tables.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{CrimetrendError, Result};

/// Represents a parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Parsing never fails; malformed markup is repaired the way a browser
    /// would repair it.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`CrimetrendError::HtmlParse`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Gets the title of the document.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }
}

/// A wrapper around scraper's ElementRef.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content with whitespace runs collapsed to one space.
    ///
    /// Non-breaking and narrow spaces count as whitespace, so a published
    /// value such as `1\u{a0}234` comes out as `1 234`.
    pub fn normalized_text(&self) -> String {
        self.text().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Returns the direct element children with one of the given tag names.
    pub fn children_named(&self, names: &[&str]) -> Vec<Element<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| names.contains(&child.value().name()))
            .map(|element| Element { element })
            .collect()
    }

    /// Returns the `<tr>` rows that belong to this table.
    ///
    /// Rows of tables nested inside cells are skipped.
    pub fn table_rows(&self) -> Vec<Element<'a>> {
        let Ok(sel) = Selector::parse("tr") else {
            return Vec::new();
        };
        let table_id = self.element.id();

        self.element
            .select(&sel)
            .filter(|row| {
                row.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|ancestor| ancestor.value().name() == "table")
                    .is_some_and(|ancestor| ancestor.id() == table_id)
            })
            .map(|element| Element { element })
            .collect()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`CrimetrendError::HtmlParse`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| CrimetrendError::HtmlParse(format!("Invalid selector: {}", e)))
}
