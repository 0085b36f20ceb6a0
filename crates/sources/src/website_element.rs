//! Website element data source: one value scraped from one web page

use crate::extraction::{compile_filter, scrape_once, NodeSelector};
use crate::fetcher::PageFetcher;
use regex::Regex;
use scrape_widget_core::{DataSource, Result, SourceError, SourceState};
use scrape_widget_types::{format_iso8601_duration, WebsiteElementDefinition};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Scraped website element
///
/// URL, selector and filter are fixed at construction and fully determine
/// one scrape.
pub struct WebsiteElement {
    state: SourceState,
    website_url: Url,
    node_selector: NodeSelector,
    content_filter: Regex,
    fetcher: Arc<dyn PageFetcher>,
}

impl WebsiteElement {
    /// Create a website element.
    ///
    /// The URL must use HTTPS, the selector must parse and the filter must
    /// be a non-empty regular expression.
    pub fn new(
        state: SourceState,
        website_url: &str,
        node_selector: &str,
        content_filter: &str,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let website_url = Url::parse(website_url).map_err(|e| {
            SourceError::invalid_argument(format!("invalid website URL '{}': {}", website_url, e))
        })?;

        if website_url.scheme() != "https" {
            return Err(SourceError::out_of_range(format!(
                "website URL does not refer to an HTTPS connection: {}",
                website_url
            )));
        }

        Ok(Self {
            state,
            website_url,
            node_selector: NodeSelector::parse(node_selector)?,
            content_filter: compile_filter(content_filter)?,
            fetcher,
        })
    }

    /// Create a website element from its on-disk definition
    pub fn from_definition(
        definition: &WebsiteElementDefinition,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let state = SourceState::new(
            definition.name.as_str(),
            &definition.description,
            definition.data_unit.as_str(),
            definition.refresh_rate()?,
        )?;

        Self::new(
            state,
            &definition.website_url,
            &definition.node_selector,
            &definition.content_filter,
            fetcher,
        )
    }

    /// Re-derive the definition this element corresponds to.
    ///
    /// URL and refresh rate come back in canonical form (`https://host/`,
    /// `PT1M30S`), so the result parses to the same values as the input
    /// but is not necessarily the same text.
    pub fn definition(&self) -> WebsiteElementDefinition {
        WebsiteElementDefinition {
            name: self.state.name().to_string(),
            description: self.state.description().to_string(),
            data_unit: self.state.data_unit().to_string(),
            refresh_rate: format_iso8601_duration(self.state.refresh_rate()),
            website_url: self.website_url.to_string(),
            node_selector: self.node_selector.as_str().to_string(),
            content_filter: self.content_filter.as_str().to_string(),
        }
    }

    pub fn website_url(&self) -> &Url {
        &self.website_url
    }

    pub fn node_selector(&self) -> &str {
        self.node_selector.as_str()
    }

    pub fn content_filter(&self) -> &Regex {
        &self.content_filter
    }

    /// Scrape the element once without touching the state
    pub(crate) async fn sample(&self) -> Result<String> {
        scrape_once(
            self.fetcher.as_ref(),
            &self.website_url,
            &self.node_selector,
            &self.content_filter,
        )
        .await
    }
}

impl DataSource for WebsiteElement {
    fn state(&self) -> &SourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SourceState {
        &mut self.state
    }

    fn kind(&self) -> &'static str {
        "website_element"
    }
}

impl fmt::Debug for WebsiteElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebsiteElement")
            .field("state", &self.state)
            .field("website_url", &self.website_url.as_str())
            .field("node_selector", &self.node_selector)
            .field("content_filter", &self.content_filter.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Unreachable;

    #[async_trait]
    impl PageFetcher for Unreachable {
        async fn fetch(&self, url: &Url) -> Result<String> {
            panic!("unexpected fetch of {}", url);
        }
    }

    fn definition() -> WebsiteElementDefinition {
        WebsiteElementDefinition {
            name: "answer".to_string(),
            description: "The answer to everything.".to_string(),
            data_unit: "units".to_string(),
            refresh_rate: "PT1M30S".to_string(),
            website_url: "https://example.com/answer?lang=en".to_string(),
            node_selector: "div.answer > span".to_string(),
            content_filter: r"\d+".to_string(),
        }
    }

    fn state() -> SourceState {
        SourceState::new("element", "", "", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_definition_round_trip() {
        let element = WebsiteElement::from_definition(&definition(), Arc::new(Unreachable)).unwrap();
        assert_eq!(element.refresh_rate(), Duration::from_secs(90));
        assert_eq!(element.definition(), definition());
    }

    #[test]
    fn test_definition_is_returned_in_canonical_form() {
        let mut input = definition();
        input.website_url = "https://example.com".to_string();
        input.refresh_rate = "PT90S".to_string();

        let element = WebsiteElement::from_definition(&input, Arc::new(Unreachable)).unwrap();
        let derived = element.definition();
        assert_eq!(derived.website_url, "https://example.com/");
        assert_eq!(derived.refresh_rate, "PT1M30S");
        assert_eq!(derived.refresh_rate().unwrap(), input.refresh_rate().unwrap());
        assert_eq!(
            Url::parse(&derived.website_url).unwrap(),
            Url::parse(&input.website_url).unwrap()
        );

        // Canonical text is stable
        let again = WebsiteElement::from_definition(&derived, Arc::new(Unreachable)).unwrap();
        assert_eq!(again.definition(), derived);
    }

    #[test]
    fn test_plain_http_url_is_out_of_range() {
        let err = WebsiteElement::new(state(), "http://example.com/", "div", r"\d+", Arc::new(Unreachable))
            .unwrap_err();
        assert!(matches!(err, SourceError::OutOfRange(_)));
    }

    #[test]
    fn test_unparsable_url_is_invalid_argument() {
        let err = WebsiteElement::new(state(), "not a url", "div", r"\d+", Arc::new(Unreachable))
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidArgument(_)));
    }

    #[test]
    fn test_blank_selector_and_filter_rejected() {
        let err = WebsiteElement::new(state(), "https://example.com/", " ", r"\d+", Arc::new(Unreachable))
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidArgument(_)));

        let err = WebsiteElement::new(state(), "https://example.com/", "div", "", Arc::new(Unreachable))
            .unwrap_err();
        assert!(matches!(err, SourceError::OutOfRange(_)));
    }

    #[test]
    fn test_too_fast_refresh_rate_in_definition_rejected() {
        let mut def = definition();
        def.refresh_rate = "PT1S".to_string();
        let err = WebsiteElement::from_definition(&def, Arc::new(Unreachable)).unwrap_err();
        assert!(matches!(err, SourceError::OutOfRange(_)));

        def.refresh_rate = "soon".to_string();
        let err = WebsiteElement::from_definition(&def, Arc::new(Unreachable)).unwrap_err();
        assert!(matches!(err, SourceError::MalformedDefinition(_)));
    }
}
