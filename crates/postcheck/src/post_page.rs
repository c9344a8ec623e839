//! Page object for the post authoring surface.
//!
//! [`PostPage`] turns the element map of the CMS into semantic actions
//! (log in, fill the form, publish, find the post again) and read-only
//! renderings. Every action that depends on earlier UI work waits for its
//! element under a named bound from [`WaitPolicy`] first.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::driver::UiDriver;
use crate::locator::{CssQuery, Locator, Selector};
use crate::page_object::{PageObject, UrlMatcher};
use crate::post::{CorrelationKey, PostDraft, Rendering, RenderedPost};
use crate::result::{CheckError, CheckResult};
use crate::wait::{poll_until, ElementState, WaitPolicy, WaitResult};

/// URL shape of the creation form
pub const CREATE_ROUTE_PATTERN: &str = "**/blog/post/create/**";

const LIST_ENTRY_HEADING: &str = "ul#person-blog-results li h2";

/// Semantic element map of the authoring surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLocators {
    /// Login submit button, also the "entry page loaded" marker
    pub login_button: Locator,
    /// Username field
    pub username: Locator,
    /// Password field
    pub password: Locator,
    /// Profile menu, the "authenticated" marker
    pub profile_button: Locator,
    /// Link to the creation form
    pub create_post_link: Locator,
    /// Editable title
    pub post_title: Locator,
    /// Editable summary
    pub post_summary: Locator,
    /// Editable body
    pub post_body: Locator,
    /// File input for the post image
    pub image_uploader: Locator,
    /// Advances the form to the publish step
    pub continue_button: Locator,
    /// Public visibility toggle
    pub publish_checkbox: Locator,
    /// Final save
    pub save_button: Locator,
    /// Listing affordance
    pub all_posts: Locator,
    /// Rendered image after upload
    pub image_preview: Locator,
    /// Detail title
    pub detail_title: Locator,
    /// Detail summary
    pub detail_summary: Locator,
    /// Detail body
    pub detail_body: Locator,
}

impl Default for PostLocators {
    fn default() -> Self {
        Self {
            login_button: Locator::new("login button", "#loginbtn"),
            username: Locator::new("username", "#Username"),
            password: Locator::new("password", "#Password"),
            profile_button: Locator::from_selector(
                "profile button",
                Selector::role("button", "Your profile and settings"),
            ),
            create_post_link: Locator::from_selector(
                "create post link",
                Selector::role("link", "Add Blog Post"),
            ),
            post_title: Locator::new("post title", r#"h1[aria-label="Post title"]"#),
            post_summary: Locator::new("post summary", r#"p[aria-label="Post Summary"]"#),
            post_body: Locator::new("post body", "#blogPostBodyContent"),
            image_uploader: Locator::new(
                "image uploader",
                r#"input[title="Image uploader for blog"]"#,
            ),
            continue_button: Locator::new("continue", r#"a[aria-label="Continue"]"#),
            publish_checkbox: Locator::new(
                "publish checkbox",
                r#"label[data-original-title="Published blog posts are visible for everyone"] input[type="checkbox"]"#,
            ),
            save_button: Locator::new(
                "save button",
                "a.button.is-medium-button.btn-block.is-inverted",
            )
            .with_text("Save"),
            all_posts: Locator::from_selector("all posts", Selector::text("All Posts")),
            image_preview: Locator::new("image preview", r#"img[aria-hidden="true"]"#),
            detail_title: Locator::new("detail title", "header h1"),
            detail_summary: Locator::new("detail summary", "header p strong"),
            detail_body: Locator::new("detail body", "section.content p"),
        }
    }
}

impl PostLocators {
    /// Create the default element map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the list entry whose heading contains `title`
    #[must_use]
    pub fn entry_by_title(&self, title: &str) -> PostHandle {
        let title = title.trim();
        let heading = Locator::new("list entry heading", LIST_ENTRY_HEADING).with_text(title);
        PostHandle {
            criterion: format!("title {title:?}"),
            entry: heading.clone(),
            title: heading,
        }
    }

    /// Handle for the list entry holding an image with `src` equal to `key`
    pub fn entry_by_key(&self, key: &CorrelationKey) -> CheckResult<PostHandle> {
        let image = CssQuery::new("img").attr_equals("src", key.as_str())?;
        let entry = CssQuery::new("li").has(image);
        let heading = entry.clone().descendant("h2");
        Ok(PostHandle {
            criterion: format!("image src {:?}", key.as_str()),
            entry: Locator::new("list entry", entry.build()),
            title: Locator::new("list entry heading", heading.build()),
        })
    }
}

/// A list entry resolved by one lookup criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostHandle {
    criterion: String,
    entry: Locator,
    title: Locator,
}

impl PostHandle {
    /// Human readable lookup criterion
    #[must_use]
    pub fn criterion(&self) -> &str {
        &self.criterion
    }

    /// Whole list entry
    #[must_use]
    pub const fn entry(&self) -> &Locator {
        &self.entry
    }

    /// Heading inside the entry
    #[must_use]
    pub const fn title(&self) -> &Locator {
        &self.title
    }
}

/// Resolve the image to an absolute path and check it exists
pub fn resolve_image(path: &Path) -> CheckResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    if absolute.is_file() {
        Ok(absolute)
    } else {
        Err(CheckError::configuration(format!(
            "image not found: {}",
            absolute.display()
        )))
    }
}

/// The authoring surface, driven through a [`UiDriver`]
#[derive(Debug)]
pub struct PostPage<'d, D: UiDriver + ?Sized> {
    driver: &'d D,
    waits: WaitPolicy,
    locators: PostLocators,
}

impl<D: UiDriver + ?Sized> PageObject for PostPage<'_, D> {
    fn url_pattern(&self) -> &str {
        CREATE_ROUTE_PATTERN
    }

    fn load_timeout_ms(&self) -> u64 {
        self.waits.route_ms
    }

    fn page_name(&self) -> &str {
        "post page"
    }
}

impl<'d, D: UiDriver + ?Sized> PostPage<'d, D> {
    /// Create a page over `driver` with the given wait bounds
    #[must_use]
    pub fn new(driver: &'d D, waits: WaitPolicy) -> Self {
        Self {
            driver,
            waits,
            locators: PostLocators::default(),
        }
    }

    /// Element map in use
    #[must_use]
    pub const fn locators(&self) -> &PostLocators {
        &self.locators
    }

    /// Wait bounds in use
    #[must_use]
    pub const fn waits(&self) -> &WaitPolicy {
        &self.waits
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        ms: u64,
    ) -> CheckResult<WaitResult> {
        self.driver
            .wait_for_state(
                locator.selector(),
                state,
                Duration::from_millis(ms),
                self.waits.poll_interval(),
            )
            .await
    }

    async fn click_when_visible(&self, locator: &Locator) -> CheckResult<()> {
        self.wait_for(locator, ElementState::Visible, self.waits.element_ms)
            .await?;
        tracing::debug!(element = locator.name(), "click");
        self.driver.click(locator.selector()).await
    }

    async fn read_field(&self, locator: &Locator) -> CheckResult<String> {
        self.wait_for(locator, ElementState::Attached, self.waits.element_ms)
            .await?;
        self.driver
            .read_text(locator.selector())
            .await?
            .map(|text| text.trim().to_string())
            .ok_or_else(|| CheckError::driver(format!("{locator} detached before it was read")))
    }

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    /// Load the entry page and wait for the login control
    pub async fn navigate_to(&self, url: &str) -> CheckResult<()> {
        self.driver.navigate(url).await?;
        self.wait_for(
            &self.locators.login_button,
            ElementState::Visible,
            self.waits.page_load_ms,
        )
        .await
        .map_err(|e| match e {
            CheckError::Timeout { ms, .. } => CheckError::NavigationTimeout {
                url: url.to_string(),
                ms,
            },
            other => other,
        })?;
        tracing::info!(url, "entry page loaded");
        Ok(())
    }

    /// Submit credentials and wait for the authenticated-state marker.
    ///
    /// A rejected password and a slow server both surface as
    /// [`CheckError::AuthenticationTimeout`].
    pub async fn login(&self, username: &str, password: &str) -> CheckResult<()> {
        self.wait_for(
            &self.locators.username,
            ElementState::Visible,
            self.waits.element_ms,
        )
        .await?;
        self.driver
            .fill(self.locators.username.selector(), username)
            .await?;
        self.driver
            .fill(self.locators.password.selector(), password)
            .await?;
        self.click_when_visible(&self.locators.login_button).await?;
        self.wait_for(
            &self.locators.profile_button,
            ElementState::Visible,
            self.waits.authentication_ms,
        )
        .await
        .map_err(|e| match e {
            CheckError::Timeout { ms, .. } => CheckError::AuthenticationTimeout { ms },
            other => other,
        })?;
        tracing::info!(username, "logged in");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Authoring
    // -------------------------------------------------------------------------

    /// Open the creation form through the profile menu
    pub async fn navigate_to_create_form(&self) -> CheckResult<()> {
        self.click_when_visible(&self.locators.profile_button)
            .await?;
        self.click_when_visible(&self.locators.create_post_link)
            .await
    }

    /// Wait until the current URL is the creation route.
    ///
    /// Returns the URL reached; a mismatch at the bound is an assertion
    /// failure on the page URL.
    pub async fn await_create_route(&self) -> CheckResult<String> {
        let matcher: UrlMatcher = self.url_matcher();
        let driver = self.driver;
        let matcher_ref = &matcher;
        let waited = poll_until(
            format!("url to match {}", matcher.pattern()),
            Duration::from_millis(self.load_timeout_ms()),
            self.waits.poll_interval(),
            || async move {
                let url = driver.current_url().await?;
                Ok::<_, CheckError>(matcher_ref.matches(&url))
            },
        )
        .await;
        let url = self.driver.current_url().await?;
        match waited {
            Ok(_) => Ok(url),
            Err(CheckError::Timeout { .. }) => Err(CheckError::assertion(
                "page",
                "url",
                matcher.pattern(),
                url,
            )),
            Err(other) => Err(other),
        }
    }

    /// Attach `image`, then type title, summary and body in order.
    ///
    /// `image` is the path returned by [`resolve_image`].
    pub async fn fill_post_form(&self, draft: &PostDraft, image: &Path) -> CheckResult<()> {
        self.wait_for(
            &self.locators.image_uploader,
            ElementState::Attached,
            self.waits.element_ms,
        )
        .await?;
        self.driver
            .set_input_files(self.locators.image_uploader.selector(), image)
            .await?;
        tracing::debug!(image = %image.display(), "image attached");

        self.wait_for(
            &self.locators.post_title,
            ElementState::Visible,
            self.waits.element_ms,
        )
        .await?;
        self.driver
            .type_text(self.locators.post_title.selector(), draft.title())
            .await?;
        self.driver.press_key("Tab").await?;

        self.wait_for(
            &self.locators.post_summary,
            ElementState::Visible,
            self.waits.element_ms,
        )
        .await?;
        self.driver
            .type_text(self.locators.post_summary.selector(), draft.summary())
            .await?;
        self.driver.press_key("Tab").await?;

        self.wait_for(
            &self.locators.post_body,
            ElementState::Attached,
            self.waits.element_ms,
        )
        .await?;
        self.driver
            .scroll_into_view(self.locators.post_body.selector())
            .await?;
        self.driver
            .type_text(self.locators.post_body.selector(), draft.body())
            .await?;
        self.driver.press_key("Tab").await?;
        tracing::info!(title = draft.title(), "post form filled");
        Ok(())
    }

    /// Read the preview image `src`.
    ///
    /// Must run while the form is still on screen; a missing or empty
    /// attribute is fatal.
    pub async fn capture_correlation_key(&self) -> CheckResult<CorrelationKey> {
        let preview = &self.locators.image_preview;
        self.wait_for(preview, ElementState::Attached, self.waits.element_ms)
            .await?;
        let src = self
            .driver
            .read_attribute(preview.selector(), "src")
            .await?
            .filter(|src| !src.trim().is_empty())
            .ok_or_else(|| CheckError::MissingAttribute {
                element: preview.name().to_string(),
                attribute: "src".to_string(),
            })?;
        tracing::info!(key = %src, "correlation key captured");
        Ok(CorrelationKey::new(src))
    }

    /// Advance to the publish step
    pub async fn continue_to_publish(&self) -> CheckResult<()> {
        self.click_when_visible(&self.locators.continue_button)
            .await?;
        self.wait_for(
            &self.locators.publish_checkbox,
            ElementState::Attached,
            self.waits.publish_ready_ms,
        )
        .await?;
        Ok(())
    }

    /// Force the publish toggle on and save
    pub async fn submit_post(&self) -> CheckResult<()> {
        self.waits.publish_settle().take().await;
        self.driver
            .force_check(self.locators.publish_checkbox.selector())
            .await?;
        self.click_when_visible(&self.locators.save_button).await?;
        tracing::info!("post submitted");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Listing
    // -------------------------------------------------------------------------

    /// Wait for the listing affordance to show after saving
    pub async fn await_listing_affordance(&self) -> CheckResult<()> {
        self.wait_for(
            &self.locators.all_posts,
            ElementState::Visible,
            self.waits.listing_ms,
        )
        .await?;
        Ok(())
    }

    /// Reload and open the listing of all posts
    pub async fn reload_and_open_listing(&self) -> CheckResult<()> {
        self.driver.reload().await?;
        self.await_listing_affordance().await?;
        self.driver.click(self.locators.all_posts.selector()).await?;
        tracing::debug!("listing opened");
        Ok(())
    }

    async fn locate(&self, handle: PostHandle) -> CheckResult<PostHandle> {
        let ms = self.waits.record_lookup_ms;
        self.wait_for(handle.entry(), ElementState::Attached, ms)
            .await
            .map_err(|e| match e {
                CheckError::Timeout { .. } => CheckError::RecordNotFound {
                    criterion: handle.criterion.clone(),
                    ms,
                },
                other => other,
            })?;
        tracing::info!(criterion = handle.criterion(), "list entry located");
        Ok(handle)
    }

    /// Find the list entry by its heading text
    pub async fn locate_post_by_title(&self, title: &str) -> CheckResult<PostHandle> {
        self.locate(self.locators.entry_by_title(title)).await
    }

    /// Find the list entry by its image `src`
    pub async fn locate_post_by_correlation_key(
        &self,
        key: &CorrelationKey,
    ) -> CheckResult<PostHandle> {
        self.locate(self.locators.entry_by_key(key)?).await
    }

    /// Number of entries matching the handle's criterion
    pub async fn count_matches(&self, handle: &PostHandle) -> CheckResult<usize> {
        self.driver.count(handle.entry().selector()).await
    }

    /// Open the detail view of a located entry
    pub async fn open_post(&self, handle: &PostHandle) -> CheckResult<()> {
        self.click_when_visible(handle.title()).await?;
        self.wait_for(
            &self.locators.detail_title,
            ElementState::Visible,
            self.waits.page_load_ms,
        )
        .await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Renderings
    // -------------------------------------------------------------------------

    /// Fields as echoed by the creation form
    pub async fn read_form(&self) -> CheckResult<RenderedPost> {
        Ok(RenderedPost {
            rendering: Rendering::Form,
            title: self.read_field(&self.locators.post_title).await?,
            summary: Some(self.read_field(&self.locators.post_summary).await?),
            body: Some(self.read_field(&self.locators.post_body).await?),
        })
    }

    /// Fields shown by a list entry (title only)
    pub async fn read_list_entry(&self, handle: &PostHandle) -> CheckResult<RenderedPost> {
        Ok(RenderedPost {
            rendering: Rendering::ListEntry,
            title: self.read_field(handle.title()).await?,
            summary: None,
            body: None,
        })
    }

    /// Fields shown by the detail view
    pub async fn read_detail(&self) -> CheckResult<RenderedPost> {
        Ok(RenderedPost {
            rendering: Rendering::Detail,
            title: self.read_field(&self.locators.detail_title).await?,
            summary: Some(self.read_field(&self.locators.detail_summary).await?),
            body: Some(self.read_field(&self.locators.detail_body).await?),
        })
    }

    /// URL currently displayed
    pub async fn current_url(&self) -> CheckResult<String> {
        self.driver.current_url().await
    }
}
