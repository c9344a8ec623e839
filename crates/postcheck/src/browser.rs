//! Browser control over the Chrome DevTools Protocol.
//!
//! With the `browser` feature this module provides [`CdpDriver`], the
//! [`UiDriver`](crate::UiDriver) backed by chromiumoxide. Elements are
//! resolved in page JavaScript from a [`Selector`] query, tagged with a
//! one-shot handle attribute, then fetched as CDP elements so clicks and
//! typing go through real input events.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 900,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::UiDriver;
    use crate::locator::{js_string, Selector};
    use crate::result::{CheckError, CheckResult};
    use crate::wait::ElementProbe;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchKeyEventParams, DispatchKeyEventType,
    };
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::path::Path;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Mutex;

    const HANDLE_ATTRIBUTE: &str = "data-postcheck-handle";

    fn driver_err(e: impl std::fmt::Display) -> CheckError {
        CheckError::driver(e)
    }

    /// Launched browser owning one tab
    #[derive(Debug)]
    pub struct CdpDriver {
        browser: Mutex<CdpBrowser>,
        page: CdpPage,
        handle: tokio::task::JoinHandle<()>,
        next_handle: AtomicU64,
    }

    impl CdpDriver {
        /// Launch a browser and open a blank tab
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: &BrowserConfig) -> CheckResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(driver_err)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(driver_err)?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(driver_err)?;
            tracing::debug!(headless = config.headless, "browser launched");

            Ok(Self {
                browser: Mutex::new(browser),
                page,
                handle,
                next_handle: AtomicU64::new(1),
            })
        }

        /// Close the browser
        pub async fn close(self) -> CheckResult<()> {
            let mut browser = self.browser.lock().await;
            browser.close().await.map_err(driver_err)?;
            let _ = browser.wait().await;
            self.handle.abort();
            Ok(())
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, js: &str) -> CheckResult<T> {
            let result = self.page.evaluate(js).await.map_err(driver_err)?;
            result.into_value().map_err(driver_err)
        }

        /// Run `body` with `el` bound to the first match, or `fallback` if none
        fn with_first(selector: &Selector, body: &str, fallback: &str) -> String {
            format!(
                "(() => {{ const el = {}; if (!el) {{ return {fallback}; }} {body} }})()",
                selector.to_query()
            )
        }

        /// Tag the first match and fetch it as a CDP element
        async fn resolve(&self, selector: &Selector) -> CheckResult<Element> {
            let token = format!("h{}", self.next_handle.fetch_add(1, Ordering::Relaxed));
            let js = Self::with_first(
                selector,
                &format!(
                    "el.setAttribute({}, {}); return true;",
                    js_string(HANDLE_ATTRIBUTE),
                    js_string(&token)
                ),
                "false",
            );
            let found: bool = self.eval(&js).await?;
            if !found {
                return Err(CheckError::driver(format!("no element matching {selector}")));
            }
            self.page
                .find_element(format!("[{HANDLE_ATTRIBUTE}=\"{token}\"]"))
                .await
                .map_err(driver_err)
        }
    }

    /// CDP key parameters for a named key
    fn key_event(key: &str, kind: DispatchKeyEventType) -> CheckResult<DispatchKeyEventParams> {
        let (code, vk) = match key {
            "Tab" => ("Tab", 9),
            "Enter" => ("Enter", 13),
            "Escape" => ("Escape", 27),
            other => return Err(CheckError::driver(format!("unsupported key {other:?}"))),
        };
        DispatchKeyEventParams::builder()
            .r#type(kind)
            .key(key)
            .code(code)
            .windows_virtual_key_code(vk)
            .native_virtual_key_code(vk)
            .build()
            .map_err(driver_err)
    }

    #[async_trait]
    impl UiDriver for CdpDriver {
        async fn navigate(&self, url: &str) -> CheckResult<()> {
            let _ = self
                .page
                .goto(url)
                .await
                .map_err(|e| CheckError::driver(format!("navigation to {url} failed: {e}")))?;
            Ok(())
        }

        async fn reload(&self) -> CheckResult<()> {
            let _ = self.page.reload().await.map_err(driver_err)?;
            Ok(())
        }

        async fn current_url(&self) -> CheckResult<String> {
            Ok(self.page.url().await.map_err(driver_err)?.unwrap_or_default())
        }

        async fn probe(&self, selector: &Selector) -> CheckResult<ElementProbe> {
            let js = Self::with_first(
                selector,
                "const r = el.getBoundingClientRect(); \
                 const s = window.getComputedStyle(el); \
                 return { attached: true, \
                          visible: r.width > 0 && r.height > 0 && s.visibility !== 'hidden', \
                          enabled: !el.disabled && el.getAttribute('aria-disabled') !== 'true' };",
                "{ attached: false, visible: false, enabled: false }",
            );
            self.eval(&js).await
        }

        async fn count(&self, selector: &Selector) -> CheckResult<usize> {
            self.eval(&selector.to_count_query()).await
        }

        async fn read_text(&self, selector: &Selector) -> CheckResult<Option<String>> {
            let js = Self::with_first(selector, "return el.innerText;", "null");
            self.eval(&js).await
        }

        async fn read_attribute(
            &self,
            selector: &Selector,
            name: &str,
        ) -> CheckResult<Option<String>> {
            let js = Self::with_first(
                selector,
                &format!("return el.getAttribute({});", js_string(name)),
                "null",
            );
            self.eval(&js).await
        }

        async fn click(&self, selector: &Selector) -> CheckResult<()> {
            let element = self.resolve(selector).await?;
            let _ = element.click().await.map_err(driver_err)?;
            Ok(())
        }

        async fn type_text(&self, selector: &Selector, text: &str) -> CheckResult<()> {
            let element = self.resolve(selector).await?;
            let _ = element.click().await.map_err(driver_err)?;
            let _ = element.type_str(text).await.map_err(driver_err)?;
            Ok(())
        }

        async fn fill(&self, selector: &Selector, text: &str) -> CheckResult<()> {
            let js = Self::with_first(
                selector,
                &format!(
                    "el.focus(); el.value = {}; \
                     el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                     el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                     return true;",
                    js_string(text)
                ),
                "false",
            );
            let filled: bool = self.eval(&js).await?;
            if filled {
                Ok(())
            } else {
                Err(CheckError::driver(format!("no element matching {selector}")))
            }
        }

        async fn press_key(&self, key: &str) -> CheckResult<()> {
            for kind in [DispatchKeyEventType::RawKeyDown, DispatchKeyEventType::KeyUp] {
                let _ = self
                    .page
                    .execute(key_event(key, kind)?)
                    .await
                    .map_err(driver_err)?;
            }
            Ok(())
        }

        async fn scroll_into_view(&self, selector: &Selector) -> CheckResult<()> {
            let element = self.resolve(selector).await?;
            let _ = element.scroll_into_view().await.map_err(driver_err)?;
            Ok(())
        }

        async fn set_input_files(&self, selector: &Selector, path: &Path) -> CheckResult<()> {
            let element = self.resolve(selector).await?;
            let params = SetFileInputFilesParams::builder()
                .files(vec![path.display().to_string()])
                .backend_node_id(element.backend_node_id)
                .build()
                .map_err(driver_err)?;
            let _ = self.page.execute(params).await.map_err(driver_err)?;
            Ok(())
        }

        async fn force_check(&self, selector: &Selector) -> CheckResult<()> {
            let js = Self::with_first(
                selector,
                "if (!el.checked) { el.click(); } return el.checked;",
                "null",
            );
            let checked: Option<bool> = self.eval(&js).await?;
            match checked {
                Some(true) => Ok(()),
                Some(false) => Err(CheckError::driver(format!("{selector} refused to check"))),
                None => Err(CheckError::driver(format!("no element matching {selector}"))),
            }
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::CdpDriver;
