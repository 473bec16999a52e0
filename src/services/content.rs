// src/services/content.rs

//! HTML content extraction.
//!
//! Pulls readable paragraph and list text out of archived pages, section by
//! section, using configured CSS selectors.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::ContentConfig;
use crate::utils::normalize_whitespace;

/// Extracts section text from HTML documents.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    main: Selector,
    fallback: Selector,
    section: Selector,
    text: Selector,
    separator: String,
}

impl ContentExtractor {
    /// Compile the selectors from configuration.
    pub fn new(config: &ContentConfig) -> Result<Self> {
        Ok(Self {
            main: Self::parse_selector(&config.main_selector)?,
            fallback: Self::parse_selector(&config.fallback_selector)?,
            section: Self::parse_selector(&config.section_selector)?,
            text: Self::parse_selector(&config.text_selector)?,
            separator: config.separator.clone(),
        })
    }

    /// Extract text blocks from an HTML document.
    ///
    /// Each paragraph or list item becomes one string. The separator marker
    /// is placed before every non-empty section after the first; sections
    /// without text contribute nothing.
    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let main = self.main_region(&document);

        let mut sections: Vec<ElementRef<'_>> = main
            .select(&self.section)
            .filter(|el| !nested_match(*el, &self.section, main))
            .collect();
        if sections.is_empty() {
            sections.push(main);
        }

        let mut blocks = Vec::new();
        let mut emitted = false;
        for section in sections {
            let texts: Vec<String> = section
                .select(&self.text)
                .filter(|el| !nested_match(*el, &self.text, section))
                .map(|el| normalize_whitespace(&el.text().collect::<String>()))
                .filter(|t| !t.is_empty())
                .collect();
            if texts.is_empty() {
                continue;
            }
            if emitted {
                blocks.push(self.separator.clone());
            }
            blocks.extend(texts);
            emitted = true;
        }
        blocks
    }

    /// Extract text blocks from raw (possibly non-UTF-8) HTML bytes.
    pub fn extract_bytes(&self, html: &[u8]) -> Vec<String> {
        self.extract(&String::from_utf8_lossy(html))
    }

    /// Primary container, then the fallback, then the whole document.
    fn main_region<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        document
            .select(&self.main)
            .next()
            .or_else(|| document.select(&self.fallback).next())
            .unwrap_or_else(|| document.root_element())
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// Whether an ancestor of `el` below `boundary` also matches `selector`.
///
/// The outer match already carries the nested element's text.
fn nested_match(el: ElementRef<'_>, selector: &Selector, boundary: ElementRef<'_>) -> bool {
    el.ancestors()
        .take_while(|node| node.id() != boundary.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| selector.matches(&ancestor))
}

/// Extract text blocks from `html` with the default selectors.
pub fn extract_content_html(html: &str) -> Result<Vec<String>> {
    Ok(ContentExtractor::new(&ContentConfig::default())?.extract(html))
}
