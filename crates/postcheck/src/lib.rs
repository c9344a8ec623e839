//! Postcheck: end-to-end verification of CMS post authoring
//!
//! Logs in, creates a post with a title, summary, body and image, publishes
//! it, finds it again in the listing and checks that every rendering shows
//! what was submitted.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────┐    ┌──────────────────┐   │
//! │   │ Scenario   │───►│ PostPage   │───►│ UiDriver         │   │
//! │   │ (workflow) │    │ (page obj) │    │ Cdp / Mock       │   │
//! │   └────────────┘    └────────────┘    └──────────────────┘   │
//! │         │                 │                                  │
//! │         ▼                 ▼                                  │
//! │     verify.rs      locator.rs + wait.rs                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The post is re-identified in the listing through the `src` of its
//! uploaded image ([`CorrelationKey`]), with a title lookup kept as the
//! legacy fallback ([`LocateStrategy::Title`]).

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[allow(clippy::missing_errors_doc)]
pub mod browser;
#[allow(clippy::missing_errors_doc)]
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod driver;
pub mod locator;
pub mod page_object;
pub mod post;
#[allow(clippy::missing_errors_doc)]
pub mod post_page;
mod result;
pub mod verify;
#[allow(clippy::missing_errors_doc)]
pub mod wait;
#[allow(clippy::missing_errors_doc)]
pub mod workflow;

#[cfg(feature = "browser")]
pub use browser::CdpDriver;
pub use browser::BrowserConfig;
pub use config::{Credentials, LocateStrategy, ScenarioConfig};
pub use driver::{MockDriver, MockElement, UiDriver};
pub use locator::{css_string, js_string, CssQuery, Locator, Selector};
pub use page_object::{PageObject, UrlMatcher};
pub use post::{CorrelationKey, DraftGenerator, PostDraft, Rendering, RenderedPost};
pub use post_page::{PostHandle, PostLocators, PostPage, CREATE_ROUTE_PATTERN};
pub use result::{CheckError, CheckResult};
pub use verify::{verify_rendering, FieldMatch};
pub use wait::{
    poll_until, ElementProbe, ElementState, SettleDelay, WaitPolicy, WaitResult,
};
pub use workflow::{Scenario, ScenarioFailure, VerificationReport, WorkflowState};
