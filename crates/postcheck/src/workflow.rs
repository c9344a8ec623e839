//! The create → publish → locate → verify scenario.
//!
//! A linear state machine over [`PostPage`]. Each transition either
//! succeeds and advances [`WorkflowState`] or aborts the whole run; there
//! are no retries above the bounded waits of the page layer. A failed run
//! may leave a half-created post behind in the target system.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::{Credentials, LocateStrategy, ScenarioConfig};
use crate::driver::UiDriver;
use crate::post::{CorrelationKey, PostDraft, Rendering};
use crate::post_page::{resolve_image, PostHandle, PostPage};
use crate::result::{CheckError, CheckResult};
use crate::verify::verify_rendering;

/// Progress of a scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorkflowState {
    /// Nothing done yet
    Unauthenticated,
    /// Logged in
    Authenticated,
    /// Creation form on screen
    FormOpen,
    /// Post saved with the publish toggle on
    Submitted,
    /// Post found exactly once in the listing
    Listed,
    /// Every rendering matched the draft
    Verified,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
            Self::FormOpen => "form-open",
            Self::Submitted => "submitted",
            Self::Listed => "listed",
            Self::Verified => "verified",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// Always [`WorkflowState::Verified`]
    pub reached: WorkflowState,
    /// How the post was found in the listing
    pub strategy: LocateStrategy,
    /// Key captured from the form, when looking up by key
    pub correlation_key: Option<CorrelationKey>,
    /// Renderings compared against the draft, in order
    pub renderings_checked: Vec<Rendering>,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// A run that stopped before [`WorkflowState::Verified`]
#[derive(Debug, Error)]
#[error("scenario failed after reaching {reached}: {error}")]
pub struct ScenarioFailure {
    /// Last state reached
    pub reached: WorkflowState,
    /// Cause
    #[source]
    pub error: CheckError,
}

/// One verification run against one driver
#[derive(Debug)]
pub struct Scenario<'d, D: UiDriver + ?Sized> {
    page: PostPage<'d, D>,
    credentials: Credentials,
    draft: PostDraft,
    strategy: LocateStrategy,
}

struct Progress {
    reached: WorkflowState,
    correlation_key: Option<CorrelationKey>,
    renderings_checked: Vec<Rendering>,
}

impl Progress {
    fn advance(&mut self, state: WorkflowState) {
        tracing::info!(from = %self.reached, to = %state, "state reached");
        self.reached = state;
    }
}

impl<'d, D: UiDriver + ?Sized> Scenario<'d, D> {
    /// Prepare a run with validated credentials
    #[must_use]
    pub fn new(
        driver: &'d D,
        credentials: Credentials,
        draft: PostDraft,
        config: &ScenarioConfig,
    ) -> Self {
        Self {
            page: PostPage::new(driver, config.waits.clone()),
            credentials,
            draft,
            strategy: config.strategy,
        }
    }

    /// Prepare a run, loading credentials through `lookup`.
    ///
    /// Fails with [`CheckError::Configuration`] before the driver is used.
    pub fn from_lookup<F>(
        driver: &'d D,
        lookup: F,
        draft: PostDraft,
        config: &ScenarioConfig,
    ) -> CheckResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(lookup)?;
        Ok(Self::new(driver, credentials, draft, config))
    }

    /// Page object the scenario drives
    #[must_use]
    pub const fn page(&self) -> &PostPage<'d, D> {
        &self.page
    }

    /// Draft being verified
    #[must_use]
    pub const fn draft(&self) -> &PostDraft {
        &self.draft
    }

    /// Execute every transition up to [`WorkflowState::Verified`]
    pub async fn run(&self) -> Result<VerificationReport, ScenarioFailure> {
        let started = Instant::now();
        let mut progress = Progress {
            reached: WorkflowState::Unauthenticated,
            correlation_key: None,
            renderings_checked: Vec::new(),
        };
        tracing::info!(
            title = self.draft.title(),
            strategy = %self.strategy,
            "scenario started"
        );

        match self.execute(&mut progress).await {
            Ok(()) => {
                let elapsed = started.elapsed();
                tracing::info!(?elapsed, "scenario verified");
                Ok(VerificationReport {
                    reached: progress.reached,
                    strategy: self.strategy,
                    correlation_key: progress.correlation_key,
                    renderings_checked: progress.renderings_checked,
                    elapsed,
                })
            }
            Err(error) => {
                tracing::error!(reached = %progress.reached, %error, "scenario failed");
                Err(ScenarioFailure {
                    reached: progress.reached,
                    error,
                })
            }
        }
    }

    async fn execute(&self, progress: &mut Progress) -> CheckResult<()> {
        let page = &self.page;
        let image = resolve_image(self.draft.image_path())?;

        page.navigate_to(self.credentials.base_url()).await?;
        page.login(self.credentials.username(), self.credentials.password())
            .await?;
        progress.advance(WorkflowState::Authenticated);

        page.navigate_to_create_form().await?;
        let url = page.await_create_route().await?;
        tracing::debug!(%url, "creation form open");
        progress.advance(WorkflowState::FormOpen);

        page.fill_post_form(&self.draft, &image).await?;
        let form = page.read_form().await?;
        verify_rendering(&self.draft, &form)?;
        progress.renderings_checked.push(form.rendering);
        if self.strategy == LocateStrategy::CorrelationKey {
            progress.correlation_key = Some(page.capture_correlation_key().await?);
        }
        page.continue_to_publish().await?;
        page.submit_post().await?;
        page.await_listing_affordance().await?;
        progress.advance(WorkflowState::Submitted);

        page.reload_and_open_listing().await?;
        let handle = self.locate(progress.correlation_key.as_ref()).await?;
        self.ensure_unique(&handle).await?;
        let entry = page.read_list_entry(&handle).await?;
        verify_rendering(&self.draft, &entry)?;
        progress.renderings_checked.push(entry.rendering);
        progress.advance(WorkflowState::Listed);

        page.open_post(&handle).await?;
        let detail = page.read_detail().await?;
        verify_rendering(&self.draft, &detail)?;
        progress.renderings_checked.push(detail.rendering);
        progress.advance(WorkflowState::Verified);
        Ok(())
    }

    async fn locate(&self, key: Option<&CorrelationKey>) -> CheckResult<PostHandle> {
        match (self.strategy, key) {
            (LocateStrategy::CorrelationKey, Some(key)) => {
                self.page.locate_post_by_correlation_key(key).await
            }
            (LocateStrategy::CorrelationKey, None) => Err(CheckError::MissingAttribute {
                element: self.page.locators().image_preview.name().to_string(),
                attribute: "src".to_string(),
            }),
            (LocateStrategy::Title, _) => self.page.locate_post_by_title(self.draft.title()).await,
        }
    }

    async fn ensure_unique(&self, handle: &PostHandle) -> CheckResult<()> {
        match self.page.count_matches(handle).await? {
            1 => Ok(()),
            0 => Err(CheckError::RecordNotFound {
                criterion: handle.criterion().to_string(),
                ms: self.page.waits().record_lookup_ms,
            }),
            count => Err(CheckError::AmbiguousMatch {
                criterion: handle.criterion().to_string(),
                count,
            }),
        }
    }
}
