//! UiDriver - the capability interface over a rendering surface
//!
//! The page layer never touches an automation backend directly. It asks a
//! [`UiDriver`] to probe, read, click and type against [`Selector`]s, so
//! the backend can be swapped without touching workflow logic.
//!
//! # Implementations
//!
//! - `CdpDriver` - Chrome DevTools Protocol via chromiumoxide (`browser` feature)
//! - [`MockDriver`] - scripted in-memory page for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::locator::Selector;
use crate::result::{CheckError, CheckResult};
use crate::wait::{poll_until, ElementProbe, ElementState, WaitResult};

/// Narrow set of UI capabilities the page layer depends on
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Load a URL in the current tab
    async fn navigate(&self, url: &str) -> CheckResult<()>;

    /// Reload the current page
    async fn reload(&self) -> CheckResult<()>;

    /// URL currently displayed
    async fn current_url(&self) -> CheckResult<String>;

    /// Snapshot the first element matching `selector`
    async fn probe(&self, selector: &Selector) -> CheckResult<ElementProbe>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &Selector) -> CheckResult<usize>;

    /// Rendered text of the first match, `None` when nothing matches
    async fn read_text(&self, selector: &Selector) -> CheckResult<Option<String>>;

    /// Attribute of the first match as written in the DOM, `None` when absent
    async fn read_attribute(&self, selector: &Selector, name: &str)
        -> CheckResult<Option<String>>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> CheckResult<()>;

    /// Focus the first match and type `text` key by key
    async fn type_text(&self, selector: &Selector, text: &str) -> CheckResult<()>;

    /// Replace the value of an input in one step
    async fn fill(&self, selector: &Selector, text: &str) -> CheckResult<()>;

    /// Press a named key on the focused element
    async fn press_key(&self, key: &str) -> CheckResult<()>;

    /// Scroll the first match into the viewport
    async fn scroll_into_view(&self, selector: &Selector) -> CheckResult<()>;

    /// Attach a local file to a file input
    async fn set_input_files(&self, selector: &Selector, path: &Path) -> CheckResult<()>;

    /// Set a checkbox checked without actionability checks
    async fn force_check(&self, selector: &Selector) -> CheckResult<()>;

    /// Poll until the first match reaches `state` or `timeout` elapses
    async fn wait_for_state(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
        interval: Duration,
    ) -> CheckResult<WaitResult> {
        let driver = self;
        poll_until(format!("{selector} to be {state}"), timeout, interval, || async move {
            let probe = driver.probe(selector).await?;
            Ok::<_, CheckError>(state.satisfied_by(&probe))
        })
        .await
    }
}

// =============================================================================
// MOCK DRIVER
// =============================================================================

/// One scripted element on a [`MockDriver`] page
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Selector this element answers to
    pub selector: Selector,
    /// Rendered text
    pub text: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// State reported once the element has appeared
    pub probe: ElementProbe,
    /// Probes answered with "absent" before the element appears
    pub appears_after: u32,
    /// Matches reported by `count`
    pub matches: usize,
    /// URL the page moves to when this element is clicked
    pub navigates_to: Option<String>,
}

impl MockElement {
    /// Create a visible, enabled element with empty text
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            text: String::new(),
            attributes: HashMap::new(),
            probe: ElementProbe::ready(),
            appears_after: 0,
            matches: 1,
            navigates_to: None,
        }
    }

    /// Set rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Report this state once appeared
    #[must_use]
    pub const fn with_probe(mut self, probe: ElementProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Stay absent for the first `probes` probes
    #[must_use]
    pub const fn appearing_after(mut self, probes: u32) -> Self {
        self.appears_after = probes;
        self
    }

    /// Report `matches` elements for this selector
    #[must_use]
    pub const fn with_matches(mut self, matches: usize) -> Self {
        self.matches = matches;
        self
    }

    /// Change the current URL when clicked
    #[must_use]
    pub fn navigating_to(mut self, url: impl Into<String>) -> Self {
        self.navigates_to = Some(url.into());
        self
    }

    const fn has_appeared(&self) -> bool {
        self.appears_after == 0
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    elements: Vec<MockElement>,
    call_history: Vec<String>,
    uploads: Vec<PathBuf>,
}

impl MockState {
    fn find(&self, selector: &Selector) -> Option<&MockElement> {
        self.elements
            .iter()
            .find(|e| &e.selector == selector && e.has_appeared())
    }

    fn find_mut(&mut self, selector: &Selector) -> Option<&mut MockElement> {
        self.elements
            .iter_mut()
            .find(|e| &e.selector == selector && e.has_appeared())
    }

    fn require_mut(&mut self, selector: &Selector) -> CheckResult<&mut MockElement> {
        self.find_mut(selector)
            .ok_or_else(|| CheckError::driver(format!("no element matching {selector}")))
    }
}

/// Scripted in-memory page for unit and scenario tests.
///
/// Elements answer only to the exact [`Selector`] they were registered
/// with. Typing appends to an element's text, so form echoes reflect what
/// the page layer typed.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scripted element
    #[must_use]
    pub fn with_element(self, element: MockElement) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.elements.push(element);
        }
        self
    }

    /// Add a scripted element to a shared driver
    pub fn add_element(&self, element: MockElement) -> CheckResult<()> {
        self.lock()?.elements.push(element);
        Ok(())
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.call_history.clone())
            .unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    /// Files attached through `set_input_files`
    #[must_use]
    pub fn uploads(&self) -> Vec<PathBuf> {
        self.state
            .lock()
            .map(|s| s.uploads.clone())
            .unwrap_or_default()
    }

    /// Current text of a scripted element
    #[must_use]
    pub fn text_of(&self, selector: &Selector) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.find(selector).map(|e| e.text.clone()))
    }

    fn lock(&self) -> CheckResult<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| CheckError::driver("mock driver state poisoned"))
    }

    fn record(&self, call: String) -> CheckResult<MutexGuard<'_, MockState>> {
        let mut state = self.lock()?;
        state.call_history.push(call);
        Ok(state)
    }
}

#[async_trait]
impl UiDriver for MockDriver {
    async fn navigate(&self, url: &str) -> CheckResult<()> {
        let mut state = self.record(format!("navigate:{url}"))?;
        state.current_url = url.to_string();
        Ok(())
    }

    async fn reload(&self) -> CheckResult<()> {
        let _state = self.record("reload".to_string())?;
        Ok(())
    }

    async fn current_url(&self) -> CheckResult<String> {
        Ok(self.lock()?.current_url.clone())
    }

    async fn probe(&self, selector: &Selector) -> CheckResult<ElementProbe> {
        let mut state = self.lock()?;
        let Some(element) = state.elements.iter_mut().find(|e| &e.selector == selector) else {
            return Ok(ElementProbe::absent());
        };
        if element.appears_after > 0 {
            element.appears_after -= 1;
            return Ok(ElementProbe::absent());
        }
        Ok(element.probe)
    }

    async fn count(&self, selector: &Selector) -> CheckResult<usize> {
        Ok(self.lock()?.find(selector).map_or(0, |e| e.matches))
    }

    async fn read_text(&self, selector: &Selector) -> CheckResult<Option<String>> {
        Ok(self.lock()?.find(selector).map(|e| e.text.clone()))
    }

    async fn read_attribute(
        &self,
        selector: &Selector,
        name: &str,
    ) -> CheckResult<Option<String>> {
        Ok(self
            .lock()?
            .find(selector)
            .and_then(|e| e.attributes.get(name).cloned()))
    }

    async fn click(&self, selector: &Selector) -> CheckResult<()> {
        let mut state = self.record(format!("click:{selector}"))?;
        let target = state.require_mut(selector)?.navigates_to.clone();
        if let Some(url) = target {
            state.current_url = url;
        }
        Ok(())
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> CheckResult<()> {
        let mut state = self.record(format!("type_text:{selector}:{text}"))?;
        state.require_mut(selector)?.text.push_str(text);
        Ok(())
    }

    async fn fill(&self, selector: &Selector, text: &str) -> CheckResult<()> {
        let mut state = self.record(format!("fill:{selector}"))?;
        let element = state.require_mut(selector)?;
        let _ = element
            .attributes
            .insert("value".to_string(), text.to_string());
        Ok(())
    }

    async fn press_key(&self, key: &str) -> CheckResult<()> {
        let _state = self.record(format!("press_key:{key}"))?;
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &Selector) -> CheckResult<()> {
        let mut state = self.record(format!("scroll_into_view:{selector}"))?;
        let _ = state.require_mut(selector)?;
        Ok(())
    }

    async fn set_input_files(&self, selector: &Selector, path: &Path) -> CheckResult<()> {
        let mut state = self.record(format!("set_input_files:{selector}"))?;
        let _ = state.require_mut(selector)?;
        state.uploads.push(path.to_path_buf());
        Ok(())
    }

    async fn force_check(&self, selector: &Selector) -> CheckResult<()> {
        let mut state = self.record(format!("force_check:{selector}"))?;
        let element = state.require_mut(selector)?;
        let _ = element
            .attributes
            .insert("checked".to_string(), "true".to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn login_button() -> Selector {
        Selector::css("#loginbtn")
    }

    mod mock_element_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let element = MockElement::new(login_button());
            assert_eq!(element.matches, 1);
            assert_eq!(element.probe, ElementProbe::ready());
            assert!(element.navigates_to.is_none());
        }

        #[test]
        fn test_builder() {
            let element = MockElement::new(login_button())
                .with_text("Log in")
                .with_attribute("title", "login")
                .with_matches(2)
                .appearing_after(3)
                .navigating_to("https://cms.test/home");
            assert_eq!(element.text, "Log in");
            assert_eq!(element.attributes.get("title").unwrap(), "login");
            assert_eq!(element.matches, 2);
            assert_eq!(element.appears_after, 3);
        }
    }

    mod mock_driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigate_records_history() {
            let driver = MockDriver::new();
            driver.navigate("https://cms.test").await.unwrap();
            assert_eq!(driver.current_url().await.unwrap(), "https://cms.test");
            assert!(driver.was_called("navigate"));
            assert!(!driver.was_called("click"));
        }

        #[tokio::test]
        async fn test_probe_absent_for_unknown_selector() {
            let driver = MockDriver::new();
            let probe = driver.probe(&login_button()).await.unwrap();
            assert_eq!(probe, ElementProbe::absent());
            assert_eq!(driver.count(&login_button()).await.unwrap(), 0);
            assert!(driver.read_text(&login_button()).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_element_appears_after_probes() {
            let driver =
                MockDriver::new().with_element(MockElement::new(login_button()).appearing_after(2));
            assert!(!driver.probe(&login_button()).await.unwrap().attached);
            assert!(!driver.probe(&login_button()).await.unwrap().attached);
            assert!(driver.probe(&login_button()).await.unwrap().attached);
        }

        #[tokio::test]
        async fn test_type_text_appends() {
            let title = Selector::css("h1");
            let driver = MockDriver::new().with_element(MockElement::new(title.clone()));
            driver.type_text(&title, "Alpha ").await.unwrap();
            driver.type_text(&title, "Post").await.unwrap();
            assert_eq!(driver.text_of(&title).unwrap(), "Alpha Post");
        }

        #[tokio::test]
        async fn test_click_navigates() {
            let link = Selector::role("link", "Add Blog Post");
            let driver = MockDriver::new()
                .with_element(MockElement::new(link.clone()).navigating_to("/blog/post/create/1"));
            driver.click(&link).await.unwrap();
            assert_eq!(driver.current_url().await.unwrap(), "/blog/post/create/1");
        }

        #[tokio::test]
        async fn test_add_element_to_shared_driver() {
            let driver = MockDriver::new();
            assert_eq!(driver.count(&login_button()).await.unwrap(), 0);
            driver
                .add_element(MockElement::new(login_button()).with_matches(3))
                .unwrap();
            assert_eq!(driver.count(&login_button()).await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_click_missing_element_fails() {
            let driver = MockDriver::new();
            let err = driver.click(&login_button()).await.unwrap_err();
            assert!(matches!(err, CheckError::Driver { .. }));
        }

        #[tokio::test]
        async fn test_force_check_sets_checked() {
            let checkbox = Selector::css("input[type=\"checkbox\"]");
            let driver = MockDriver::new().with_element(
                MockElement::new(checkbox.clone()).with_probe(ElementProbe {
                    attached: true,
                    visible: false,
                    enabled: true,
                }),
            );
            driver.force_check(&checkbox).await.unwrap();
            assert_eq!(
                driver.read_attribute(&checkbox, "checked").await.unwrap(),
                Some("true".to_string())
            );
        }

        #[tokio::test]
        async fn test_uploads_recorded() {
            let input = Selector::css("input[type=file]");
            let driver = MockDriver::new().with_element(MockElement::new(input.clone()));
            driver
                .set_input_files(&input, Path::new("/tmp/cat.jpg"))
                .await
                .unwrap();
            assert_eq!(driver.uploads(), vec![PathBuf::from("/tmp/cat.jpg")]);
        }
    }

    mod wait_for_state_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_waits_until_attached() {
            let driver =
                MockDriver::new().with_element(MockElement::new(login_button()).appearing_after(4));
            let result = driver
                .wait_for_state(
                    &login_button(),
                    ElementState::Attached,
                    Duration::from_secs(2),
                    Duration::from_millis(100),
                )
                .await
                .unwrap();
            assert_eq!(result.probes, 5);
        }

        #[tokio::test(start_paused = true)]
        async fn test_visible_times_out_on_hidden_element() {
            let driver = MockDriver::new().with_element(
                MockElement::new(login_button()).with_probe(ElementProbe {
                    attached: true,
                    visible: false,
                    enabled: true,
                }),
            );
            let err = driver
                .wait_for_state(
                    &login_button(),
                    ElementState::Visible,
                    Duration::from_millis(500),
                    Duration::from_millis(100),
                )
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }
    }
}
