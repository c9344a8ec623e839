//! Locator abstraction for element selection.
//!
//! A [`Locator`] pairs a semantic name ("post title", "save button") with a
//! [`Selector`]. Selectors never reach the page as hand-formatted strings:
//! CSS fragments that embed captured values go through [`CssQuery`], and
//! every selector is turned into a JavaScript expression with JSON-quoted
//! literals by [`Selector::to_query_all`].

use std::fmt;

use crate::result::{CheckError, CheckResult};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// ARIA role with accessible name
    Role {
        /// Role name ("button", "link", ...)
        role: String,
        /// Accessible name (aria-label or trimmed text)
        name: String,
    },
    /// Innermost element containing the text
    Text(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// JavaScript expression evaluating to an `Array` of matching elements
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(css) => format!("Array.from(document.querySelectorAll({}))", js_string(css)),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => el.textContent.includes({}))",
                js_string(css),
                js_string(text)
            ),
            Self::Role { role, name } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => \
                 ((el.getAttribute('aria-label') || el.textContent || '').trim()) === {})",
                js_string(role_css(role).as_str()),
                js_string(name)
            ),
            Self::Text(text) => format!(
                "Array.from(document.querySelectorAll('body *')).filter(el => \
                 el.textContent.includes({t}) && \
                 !Array.from(el.children).some(c => c.textContent.includes({t})))",
                t = js_string(text)
            ),
        }
    }

    /// JavaScript expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("({}[0] || null)", self.to_query_all())
    }

    /// JavaScript expression evaluating to the match count
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_query_all())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css={css}"),
            Self::CssWithText { css, text } => write!(f, "css={css} has-text={text:?}"),
            Self::Role { role, name } => write!(f, "role={role} name={name:?}"),
            Self::Text(text) => write!(f, "text={text:?}"),
        }
    }
}

/// CSS used to pre-filter elements for an ARIA role, implicit roles included
fn role_css(role: &str) -> String {
    match role {
        "button" => {
            r#"button, [role="button"], input[type="button"], input[type="submit"]"#.to_string()
        }
        "link" => r#"a[href], [role="link"]"#.to_string(),
        "checkbox" => r#"input[type="checkbox"], [role="checkbox"]"#.to_string(),
        other => format!("[role=\"{other}\"]"),
    }
}

/// Quote a value as a JavaScript string literal
#[must_use]
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// Quote a value as a CSS string, escaping `"` and `\`.
///
/// Control characters are rejected rather than escaped.
pub fn css_string(value: &str) -> CheckResult<String> {
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(CheckError::UnsafeQueryValue {
            value: value.to_string(),
            reason: format!("contains control character U+{:04X}", u32::from(c)),
        });
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Ok(out)
}

fn check_identifier(ident: &str) -> CheckResult<()> {
    let valid = !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CheckError::UnsafeQueryValue {
            value: ident.to_string(),
            reason: "not a plain CSS identifier".to_string(),
        })
    }
}

/// Parameterized CSS query builder.
///
/// ```
/// use postcheck::CssQuery;
///
/// let image = CssQuery::new("img").attr_equals("src", "https://cdn/a \"b\".jpg").unwrap();
/// let entry = CssQuery::new("li").has(image).build();
/// assert_eq!(entry, r#"li:has(img[src="https://cdn/a \"b\".jpg"])"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssQuery {
    buf: String,
}

impl CssQuery {
    /// Start from a trusted, literal CSS fragment
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            buf: base.to_string(),
        }
    }

    /// Append `[name="value"]` with `value` escaped
    pub fn attr_equals(mut self, name: &str, value: &str) -> CheckResult<Self> {
        check_identifier(name)?;
        let quoted = css_string(value)?;
        self.buf.push('[');
        self.buf.push_str(name);
        self.buf.push('=');
        self.buf.push_str(&quoted);
        self.buf.push(']');
        Ok(self)
    }

    /// Append `:has(inner)`
    #[must_use]
    pub fn has(mut self, inner: Self) -> Self {
        self.buf.push_str(":has(");
        self.buf.push_str(&inner.buf);
        self.buf.push(')');
        self
    }

    /// Append a descendant fragment
    #[must_use]
    pub fn descendant(mut self, child: &str) -> Self {
        self.buf.push(' ');
        self.buf.push_str(child);
        self
    }

    /// Finish the query
    #[must_use]
    pub fn build(self) -> String {
        self.buf
    }
}

/// A named locator for a semantic UI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    name: String,
    selector: Selector,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(name: impl Into<String>, css: impl Into<String>) -> Self {
        Self::from_selector(name, Selector::Css(css.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
        }
    }

    /// Filter by text content
    ///
    /// Only CSS selectors can be narrowed; other kinds are returned unchanged.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css(css) => Selector::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        };
        Self {
            name: self.name,
            selector,
        }
    }

    /// Semantic name used in logs and errors
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.selector)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod css_string_tests {
        use super::*;
        use proptest::prelude::*;

        fn unescape(quoted: &str) -> String {
            let inner = &quoted[1..quoted.len() - 1];
            let mut out = String::new();
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }

        #[test]
        fn test_plain_url_is_quoted() {
            let quoted = css_string("https://cdn.example.com/img/cat.jpg").unwrap();
            assert_eq!(quoted, "\"https://cdn.example.com/img/cat.jpg\"");
        }

        #[test]
        fn test_quote_and_backslash_escaped() {
            let quoted = css_string(r#"a"b\c"#).unwrap();
            assert_eq!(quoted, r#""a\"b\\c""#);
        }

        #[test]
        fn test_control_characters_rejected() {
            let err = css_string("line\nbreak").unwrap_err();
            assert!(matches!(err, CheckError::UnsafeQueryValue { .. }));
            assert!(css_string("nul\0").is_err());
        }

        proptest! {
            #[test]
            fn prop_escaped_value_never_terminates_early(value in "[^\\p{Cc}]{0,64}") {
                let quoted = css_string(&value).unwrap();
                let inner = &quoted[1..quoted.len() - 1];
                // Every quote inside the literal is preceded by a backslash.
                let bytes = inner.as_bytes();
                let mut escaped = false;
                for &b in bytes {
                    if b == b'"' {
                        prop_assert!(escaped);
                    }
                    escaped = b == b'\\' && !escaped;
                }
                prop_assert_eq!(unescape(&quoted), value);
            }
        }
    }

    mod css_query_tests {
        use super::*;

        #[test]
        fn test_list_entry_by_image() {
            let image = CssQuery::new("img")
                .attr_equals("src", "https://cdn/x.jpg")
                .unwrap();
            let entry = CssQuery::new("li").has(image).build();
            assert_eq!(entry, r#"li:has(img[src="https://cdn/x.jpg"])"#);
        }

        #[test]
        fn test_descendant() {
            let q = CssQuery::new("li").descendant("h2").build();
            assert_eq!(q, "li h2");
        }

        #[test]
        fn test_attribute_name_validated() {
            let err = CssQuery::new("img").attr_equals("src] *", "x").unwrap_err();
            assert!(matches!(err, CheckError::UnsafeQueryValue { .. }));
        }

        #[test]
        fn test_injection_attempt_stays_inside_literal() {
            let hostile = r#"x"]), body *:not(["#;
            let q = CssQuery::new("img").attr_equals("src", hostile).unwrap().build();
            assert_eq!(q, r#"img[src="x\"]), body *:not(["]"#);
        }
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query_uses_json_literal() {
            let sel = Selector::css(r#"h1[aria-label="Post title"]"#);
            let js = sel.to_query_all();
            assert!(js.contains(r#"querySelectorAll("h1[aria-label=\"Post title\"]")"#));
        }

        #[test]
        fn test_text_literal_is_json_escaped() {
            let sel = Selector::CssWithText {
                css: "li h2".into(),
                text: "it's \"quoted\"".into(),
            };
            let js = sel.to_query_all();
            assert!(js.contains(r#"includes("it's \"quoted\"")"#));
        }

        #[test]
        fn test_role_button_includes_implicit_roles() {
            let sel = Selector::role("button", "Your profile and settings");
            let js = sel.to_query_all();
            assert!(js.contains("button, [role=\\\"button\\\"]"));
            assert!(js.contains("\"Your profile and settings\""));
        }

        #[test]
        fn test_count_and_first_queries() {
            let sel = Selector::text("All Posts");
            assert!(sel.to_count_query().ends_with(".length"));
            assert!(sel.to_query().ends_with("[0] || null)"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("#loginbtn").to_string(), "css=#loginbtn");
            assert_eq!(
                Selector::role("link", "Add Blog Post").to_string(),
                "role=link name=\"Add Blog Post\""
            );
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_with_text_narrows_css() {
            let loc = Locator::new("save button", "a.button").with_text("Save");
            assert_eq!(
                loc.selector(),
                &Selector::CssWithText {
                    css: "a.button".into(),
                    text: "Save".into()
                }
            );
            assert_eq!(loc.name(), "save button");
        }

        #[test]
        fn test_with_text_keeps_other_selectors() {
            let loc = Locator::from_selector("all posts", Selector::text("All Posts")).with_text("x");
            assert_eq!(loc.selector(), &Selector::text("All Posts"));
        }
    }
}
