//! Wait Mechanisms
//!
//! Every read of UI state that depends on a prior action goes through a
//! bounded poll: probe, sleep, probe again, give up deterministically once
//! the bound elapses. The bounds are named in [`WaitPolicy`] so a scenario
//! file can tune them without touching the page layer.
//!
//! Fixed delays are only allowed as a [`SettleDelay`], which carries a name
//! and the reason no observable readiness signal exists. Each one logs a
//! warning when taken so they stay visible as debt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::result::{CheckError, CheckResult};

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default bound for generic element readiness (5 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 5_000;

/// Bound used for list lookups and the post-save listing affordance
pub const DEFAULT_LISTING_TIMEOUT_MS: u64 = 20_000;

// =============================================================================
// ELEMENT STATE
// =============================================================================

/// State an element can be waited into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    /// Present in the DOM, visible or not
    Attached,
    /// Present and rendered with a non-empty box
    Visible,
    /// Present and not disabled
    Enabled,
    /// Absent or not rendered
    Hidden,
}

impl ElementState {
    /// Whether a probe result satisfies this state
    #[must_use]
    pub const fn satisfied_by(self, probe: &ElementProbe) -> bool {
        match self {
            Self::Attached => probe.attached,
            Self::Visible => probe.attached && probe.visible,
            Self::Enabled => probe.attached && probe.enabled,
            Self::Hidden => !probe.attached || !probe.visible,
        }
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attached => "attached",
            Self::Visible => "visible",
            Self::Enabled => "enabled",
            Self::Hidden => "hidden",
        };
        f.write_str(name)
    }
}

/// Snapshot of the first element matching a selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementProbe {
    /// Element exists
    pub attached: bool,
    /// Element has a rendered box
    pub visible: bool,
    /// Element is not disabled
    pub enabled: bool,
}

impl ElementProbe {
    /// Probe for a missing element
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            attached: false,
            visible: false,
            enabled: false,
        }
    }

    /// Probe for an attached, visible, enabled element
    #[must_use]
    pub const fn ready() -> Self {
        Self {
            attached: true,
            visible: true,
            enabled: true,
        }
    }
}

// =============================================================================
// WAIT POLICY
// =============================================================================

/// Named wait bounds, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// Login control visible after loading the entry page
    pub page_load_ms: u64,
    /// Profile control visible after submitting credentials
    pub authentication_ms: u64,
    /// Generic element readiness before click/type/read
    pub element_ms: u64,
    /// Creation route reached after following the create link
    pub route_ms: u64,
    /// Publish checkbox attached after "continue"
    pub publish_ready_ms: u64,
    /// "All Posts" affordance after save or reload
    pub listing_ms: u64,
    /// List entry attached
    pub record_lookup_ms: u64,
    /// Fixed settle before forcing the publish toggle
    pub publish_settle_ms: u64,
    /// Interval between probes
    pub poll_interval_ms: u64,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            page_load_ms: 10_000,
            authentication_ms: 10_000,
            element_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            route_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            publish_ready_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            listing_ms: DEFAULT_LISTING_TIMEOUT_MS,
            record_lookup_ms: DEFAULT_LISTING_TIMEOUT_MS,
            publish_settle_ms: 1_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitPolicy {
    /// Create a policy with default bounds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record lookup bound
    #[must_use]
    pub const fn with_record_lookup(mut self, ms: u64) -> Self {
        self.record_lookup_ms = ms;
        self
    }

    /// Set the authentication bound
    #[must_use]
    pub const fn with_authentication(mut self, ms: u64) -> Self {
        self.authentication_ms = ms;
        self
    }

    /// Set the publish settle delay
    #[must_use]
    pub const fn with_publish_settle(mut self, ms: u64) -> Self {
        self.publish_settle_ms = ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settle taken before the publish toggle is forced.
    ///
    /// The toggle reports enabled before its click handler is bound and the
    /// page exposes nothing that flips when it is.
    #[must_use]
    pub const fn publish_settle(&self) -> SettleDelay {
        SettleDelay::new(
            "publish-toggle-settle",
            "toggle is enabled before its handler is bound; no readiness signal",
            Duration::from_millis(self.publish_settle_ms),
        )
    }
}

// =============================================================================
// SETTLE DELAY
// =============================================================================

/// A fixed delay with no condition behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelay {
    name: &'static str,
    justification: &'static str,
    duration: Duration,
}

impl SettleDelay {
    /// Create a named delay
    #[must_use]
    pub const fn new(name: &'static str, justification: &'static str, duration: Duration) -> Self {
        Self {
            name,
            justification,
            duration,
        }
    }

    /// Delay name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Delay length
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Sleep for the delay, logging it as debt
    pub async fn take(&self) {
        tracing::warn!(
            delay = self.name,
            ms = self.duration.as_millis() as u64,
            reason = self.justification,
            "fixed settle delay"
        );
        tokio::time::sleep(self.duration).await;
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probes taken
    pub probes: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields `true` or `timeout` elapses.
///
/// The probe always runs at least once. Probe errors end the wait
/// immediately; an elapsed bound yields [`CheckError::Timeout`].
pub async fn poll_until<F, Fut>(
    waited_for: impl Into<String>,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> CheckResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CheckResult<bool>>,
{
    let waited_for = waited_for.into();
    let start = Instant::now();
    let mut probes = 0_u32;

    loop {
        probes += 1;
        if probe().await? {
            let elapsed = start.elapsed();
            tracing::trace!(%waited_for, probes, ?elapsed, "wait satisfied");
            return Ok(WaitResult {
                elapsed,
                probes,
                waited_for,
            });
        }
        if start.elapsed() >= timeout {
            tracing::debug!(%waited_for, probes, "wait timed out");
            return Err(CheckError::Timeout {
                waited_for,
                ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(interval).await;
    }
}
