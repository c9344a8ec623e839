//! Page Object Model support.
//!
//! A page object names the URL shape it lives at and how long it may take
//! to load. [`UrlMatcher`] checks a live URL against that shape.

use url::Url;

/// A page or component of the UI under test.
///
/// ```
/// use postcheck::{PageObject, UrlMatcher};
///
/// struct LoginPage;
///
/// impl PageObject for LoginPage {
///     fn url_pattern(&self) -> &str {
///         "/login"
///     }
/// }
///
/// let page = LoginPage;
/// assert!(UrlMatcher::new(page.url_pattern()).matches("https://cms.test/login"));
/// ```
pub trait PageObject {
    /// URL pattern that matches this page (e.g., "/login", "**/blog/post/create/**")
    fn url_pattern(&self) -> &str;

    /// Wait bound for the page to become ready (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        30000
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Matcher built from [`Self::url_pattern`]
    fn url_matcher(&self) -> UrlMatcher {
        UrlMatcher::new(self.url_pattern())
    }
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Rest,
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/users/*`
    /// - Any number of segments, including none: `**/blog/post/create/**`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "**" => UrlSegment::Rest,
                "*" => UrlSegment::Wildcard,
                _ => UrlSegment::Literal(s.to_string()),
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL matches the pattern.
    ///
    /// Absolute URLs are reduced to their path first; query and fragment are
    /// ignored.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path = path_of(url);
        let url_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        Self::match_from(&self.segments, &url_segments)
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn match_from(pattern: &[UrlSegment], url: &[&str]) -> bool {
        let Some((head, tail)) = pattern.split_first() else {
            return url.is_empty();
        };
        match head {
            UrlSegment::Rest => (0..=url.len()).any(|skip| Self::match_from(tail, &url[skip..])),
            UrlSegment::Literal(lit) => {
                url.first() == Some(&lit.as_str()) && Self::match_from(tail, &url[1..])
            }
            UrlSegment::Wildcard => !url.is_empty() && Self::match_from(tail, &url[1..]),
        }
    }
}

fn path_of(url: &str) -> String {
    Url::parse(url).map_or_else(
        |_| {
            url.split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string()
        },
        |parsed| parsed.path().to_string(),
    )
}
