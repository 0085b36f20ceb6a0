//! Extraction pipeline: fetched document -> selected node -> filtered text
//!
//! Selection and filtering are pure and synchronous so a bad selector and a
//! bad filter can be diagnosed independently. `scrape_once` adds the single
//! network step in front of them.

use crate::fetcher::PageFetcher;
use regex::Regex;
use scrape_widget_core::{Result, SourceError};
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use url::Url;

/// A parsed CSS selector that remembers its source text
#[derive(Clone)]
pub struct NodeSelector {
    text: String,
    compiled: Selector,
}

impl NodeSelector {
    /// Parse a selector expression. Blank or unparsable selectors fail.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(SourceError::invalid_argument("node selector is blank"));
        }

        let compiled = Selector::parse(text).map_err(|e| SourceError::InvalidSelector {
            selector: text.to_string(),
            reason: format!("{:?}", e),
        })?;

        Ok(Self {
            text: text.to_string(),
            compiled,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeSelector").field(&self.text).finish()
    }
}

/// Compile a content filter. A blank pattern is a range error.
pub fn compile_filter(pattern: &str) -> Result<Regex> {
    if pattern.trim().is_empty() {
        return Err(SourceError::out_of_range("content filter contains no pattern"));
    }
    Regex::new(pattern).map_err(|e| SourceError::InvalidFilter(e.to_string()))
}

/// Return the first node matching `selector`, in document order
pub fn select_node<'a>(document: &'a Html, selector: &NodeSelector) -> Result<ElementRef<'a>> {
    document
        .select(&selector.compiled)
        .next()
        .ok_or_else(|| SourceError::NoMatchingNode(selector.as_str().to_string()))
}

/// Run `filter` over the flattened text of `node` and return the first match
pub fn filter_content(node: ElementRef<'_>, filter: &Regex) -> Result<String> {
    let text: String = node.text().collect();
    filter
        .find(&text)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| SourceError::NoMatchingContent(filter.as_str().to_string()))
}

/// Parse `html` and run selection followed by filtering
pub fn extract(html: &str, selector: &NodeSelector, filter: &Regex) -> Result<String> {
    let document = Html::parse_document(html);
    let node = select_node(&document, selector)?;
    filter_content(node, filter)
}

/// Fetch `url` and extract a single value from it.
///
/// Only HTTPS URLs are accepted. Fetch failures are returned as produced by
/// the fetcher.
pub async fn scrape_once(
    fetcher: &dyn PageFetcher,
    url: &Url,
    selector: &NodeSelector,
    filter: &Regex,
) -> Result<String> {
    if url.scheme() != "https" {
        return Err(SourceError::out_of_range(format!(
            "website URL does not use HTTPS: {}",
            url
        )));
    }

    let page = fetcher.fetch(url).await?;
    extract(&page, selector, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const PAGE: &str = r#"
        <html><body>
            <div class="reading"><span>first:</span> 42 units</div>
            <div class="reading">second: 17 units</div>
            <p id="multi">temp 21 C, humidity 55 %</p>
        </body></html>
    "#;

    struct StaticPage(&'static str);

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, _url: &Url) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenNetwork;

    #[async_trait]
    impl PageFetcher for BrokenNetwork {
        async fn fetch(&self, _url: &Url) -> Result<String> {
            Err(SourceError::fetch(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        }
    }

    fn digits() -> Regex {
        compile_filter(r"\d+").unwrap()
    }

    #[test]
    fn test_select_node_without_match_fails() {
        let document = Html::parse_document(PAGE);
        let selector = NodeSelector::parse("table td").unwrap();
        let err = select_node(&document, &selector).unwrap_err();
        assert!(matches!(err, SourceError::NoMatchingNode(ref s) if s == "table td"));
    }

    #[test]
    fn test_select_node_takes_first_in_document_order() {
        let document = Html::parse_document(PAGE);
        let selector = NodeSelector::parse("div.reading").unwrap();
        let node = select_node(&document, &selector).unwrap();
        let text: String = node.text().collect();
        assert!(text.contains("42"));
        assert!(!text.contains("17"));
    }

    #[test]
    fn test_filter_content_takes_first_match() {
        let document = Html::parse_document(PAGE);
        let node = select_node(&document, &NodeSelector::parse("#multi").unwrap()).unwrap();
        assert_eq!(filter_content(node, &digits()).unwrap(), "21");
    }

    #[test]
    fn test_filter_content_sees_flattened_text() {
        let document = Html::parse_document(PAGE);
        let node = select_node(&document, &NodeSelector::parse("div.reading").unwrap()).unwrap();
        let filter = compile_filter(r"first:\s+\d+").unwrap();
        assert_eq!(filter_content(node, &filter).unwrap(), "first: 42");
    }

    #[test]
    fn test_filter_content_without_match_fails() {
        let document = Html::parse_document(PAGE);
        let node = select_node(&document, &NodeSelector::parse("#multi").unwrap()).unwrap();
        let filter = compile_filter(r"\$\d+").unwrap();
        assert!(matches!(
            filter_content(node, &filter),
            Err(SourceError::NoMatchingContent(_))
        ));
    }

    #[test]
    fn test_extract_composes_selection_and_filtering() {
        let selector = NodeSelector::parse("div.reading").unwrap();
        assert_eq!(extract(PAGE, &selector, &digits()).unwrap(), "42");
    }

    #[test]
    fn test_invalid_selector_and_filter_are_reported_separately() {
        assert!(matches!(
            NodeSelector::parse("div[[["),
            Err(SourceError::InvalidSelector { .. })
        ));
        assert!(matches!(
            NodeSelector::parse("   "),
            Err(SourceError::InvalidArgument(_))
        ));
        assert!(matches!(compile_filter("(unclosed"), Err(SourceError::InvalidFilter(_))));
        assert!(matches!(compile_filter(" "), Err(SourceError::OutOfRange(_))));
    }

    #[tokio::test]
    async fn test_scrape_once_uses_fetched_page() {
        let url = Url::parse("https://example.com/readings").unwrap();
        let selector = NodeSelector::parse("div.reading").unwrap();
        let value = scrape_once(&StaticPage(PAGE), &url, &selector, &digits())
            .await
            .unwrap();
        assert_eq!(value, "42");
    }

    #[tokio::test]
    async fn test_scrape_once_propagates_fetch_error_unchanged() {
        let url = Url::parse("https://example.com/readings").unwrap();
        let selector = NodeSelector::parse("div.reading").unwrap();
        let err = scrape_once(&BrokenNetwork, &url, &selector, &digits())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Fetch(_)));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test]
    async fn test_scrape_once_rejects_plain_http() {
        let url = Url::parse("http://example.com/readings").unwrap();
        let selector = NodeSelector::parse("div.reading").unwrap();
        let err = scrape_once(&StaticPage(PAGE), &url, &selector, &digits())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::OutOfRange(_)));
    }
}
