use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::FetchError;

static BODY_ELEMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body *").expect("valid selector"));

/// A parsed page together with the URL it was loaded for.
///
/// The URL is always the page's real address, even when the markup came
/// from a fixture, so relative links resolve the same way in every mode.
pub struct Document {
    url: Url,
    html: Html,
}

impl Document {
    /// Parse `markup` as an HTML document located at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::EmptyDocument`] when the markup is blank.
    pub fn parse(url: Url, markup: &str) -> Result<Self, FetchError> {
        if markup.trim().is_empty() {
            return Err(FetchError::EmptyDocument {
                url: url.to_string(),
            });
        }
        Ok(Self {
            html: Html::parse_document(markup),
            url,
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Resolve `href` against the page URL. Returns `None` for blank or
    /// unresolvable references.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.url.join(href).ok().map(String::from)
    }

    /// Whether the body holds any element at all.
    #[must_use]
    pub fn has_body_content(&self) -> bool {
        self.html.select(&BODY_ELEMENT).next().is_some()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

/// Text nodes of `element`, each trimmed, empty ones dropped, joined by a space.
pub(crate) fn text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Text of the first match, or `None` when there is no match or it is blank.
pub(crate) fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    first(element, selector)
        .map(text)
        .filter(|s| !s.is_empty())
}

pub(crate) fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
