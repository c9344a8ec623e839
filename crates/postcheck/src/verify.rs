//! Field-by-field comparison of a rendering against the submitted draft.

use crate::post::{PostDraft, RenderedPost};
use crate::result::{CheckError, CheckResult};

/// How one field is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// Rendered value equals the draft value
    Exact,
    /// Rendered value contains the draft value (wrapped or paginated text)
    Contains,
}

impl FieldMatch {
    /// Whether `actual` satisfies this rule against `expected`.
    ///
    /// Both sides are trimmed first; renderings drop surrounding whitespace.
    #[must_use]
    pub fn accepts(self, expected: &str, actual: &str) -> bool {
        let (expected, actual) = (expected.trim(), actual.trim());
        match self {
            Self::Exact => expected == actual,
            Self::Contains => actual.contains(expected),
        }
    }
}

/// Check every field `rendered` exposes against `draft`.
///
/// Title and summary must be equal, the body only has to contain the
/// draft body. Fields the rendering does not expose are skipped. The first
/// mismatch is returned with both values.
pub fn verify_rendering(draft: &PostDraft, rendered: &RenderedPost) -> CheckResult<()> {
    let fields = [
        ("title", draft.title(), Some(rendered.title.as_str()), FieldMatch::Exact),
        ("summary", draft.summary(), rendered.summary.as_deref(), FieldMatch::Exact),
        ("body", draft.body(), rendered.body.as_deref(), FieldMatch::Contains),
    ];

    for (field, expected, actual, rule) in fields {
        let Some(actual) = actual else {
            continue;
        };
        if !rule.accepts(expected, actual) {
            return Err(CheckError::assertion(
                rendered.rendering,
                field,
                expected,
                actual,
            ));
        }
        tracing::debug!(rendering = %rendered.rendering, field, "field verified");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::post::Rendering;
    use proptest::prelude::*;

    fn draft() -> PostDraft {
        PostDraft::new(
            "Alpha Post",
            "Alpha summary.",
            "Alpha body text.",
            "cat.jpg",
        )
    }

    fn detail(title: &str, summary: &str, body: &str) -> RenderedPost {
        RenderedPost {
            rendering: Rendering::Detail,
            title: title.to_string(),
            summary: Some(summary.to_string()),
            body: Some(body.to_string()),
        }
    }

    #[test]
    fn test_matching_detail_passes() {
        let rendered = detail("Alpha Post", "Alpha summary.", "Alpha body text.");
        verify_rendering(&draft(), &rendered).unwrap();
    }

    #[test]
    fn test_body_containment() {
        let rendered = detail(
            "Alpha Post",
            "Alpha summary.",
            "Intro. Alpha body text. Read more",
        );
        verify_rendering(&draft(), &rendered).unwrap();
    }

    #[test]
    fn test_summary_mismatch_reports_both_values() {
        let rendered = detail("Alpha Post", "Beta summary.", "Alpha body text.");
        let err = verify_rendering(&draft(), &rendered).unwrap_err();
        match err {
            CheckError::AssertionFailure {
                rendering,
                field,
                expected,
                actual,
            } => {
                assert_eq!(rendering, "detail");
                assert_eq!(field, "summary");
                assert_eq!(expected, "Alpha summary.");
                assert_eq!(actual, "Beta summary.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_title_prefix_is_not_equal() {
        let rendered = detail("Alpha Post 2", "Alpha summary.", "Alpha body text.");
        let err = verify_rendering(&draft(), &rendered).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_padded_draft_matches_trimmed_rendering() {
        let draft = PostDraft::new(
            " Alpha Post ",
            "Alpha summary.\n",
            "  Alpha body text.",
            "cat.jpg",
        );
        let rendered = detail("Alpha Post", "Alpha summary.", "Intro. Alpha body text.");
        verify_rendering(&draft, &rendered).unwrap();
    }

    #[test]
    fn test_list_entry_checks_title_only() {
        let rendered = RenderedPost {
            rendering: Rendering::ListEntry,
            title: "Alpha Post".to_string(),
            summary: None,
            body: None,
        };
        verify_rendering(&draft(), &rendered).unwrap();
    }

    proptest! {
        #[test]
        fn prop_faithful_rendering_always_passes(
            title in "[A-Za-z0-9 .]{1,40}",
            summary in "[A-Za-z0-9 .]{1,80}",
            body in "[A-Za-z0-9 .]{1,200}",
            prefix in "[A-Za-z .]{0,20}",
        ) {
            let draft = PostDraft::new(title.clone(), summary.clone(), body.clone(), "cat.jpg");
            let rendered = detail(
                title.trim(),
                summary.trim(),
                format!("{prefix}{body}").trim(),
            );
            prop_assert!(verify_rendering(&draft, &rendered).is_ok());
        }

        #[test]
        fn prop_changed_summary_always_fails(
            summary in "[A-Za-z0-9 .]{1,80}",
            extra in "[A-Za-z0-9]{1,5}",
        ) {
            let draft = PostDraft::new("T", summary.clone(), "B", "cat.jpg");
            let rendered = detail("T", &format!("{summary}{extra}"), "B");
            prop_assert!(verify_rendering(&draft, &rendered).is_err());
        }
    }
}
