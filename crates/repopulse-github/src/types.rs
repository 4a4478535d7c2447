use serde::{Deserialize, Serialize};

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CreateIssueRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub labels: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePullRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct MergePullRequest<'a> {
    pub commit_message: &'a str,
}

// ============================================================================
// Response payloads
// ============================================================================

/// The subset of an issue object the runner reports on.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
}

/// The subset of a pull-request object the runner needs.
///
/// `mergeable` is `None` while GitHub is still computing mergeability for a
/// freshly opened pull request; callers poll until it settles.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub merged: bool,
}

/// Result of a merge call.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeOutcome {
    pub merged: bool,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_request_mergeable_null() {
        let pr: PullRequest = serde_json::from_str(
            r#"{"number": 7, "title": "t", "html_url": "u", "mergeable": null}"#,
        )
        .unwrap();
        assert_eq!(pr.mergeable, None);
        assert!(!pr.merged);
    }

    #[test]
    fn test_pull_request_mergeable_settled() {
        let pr: PullRequest = serde_json::from_str(
            r#"{"number": 7, "title": "t", "html_url": "u", "mergeable": true, "merged": false}"#,
        )
        .unwrap();
        assert_eq!(pr.mergeable, Some(true));
    }

    #[test]
    fn test_pull_request_tolerates_missing_fields() {
        let pr: PullRequest =
            serde_json::from_str(r#"{"number": 1, "title": "t", "html_url": "u"}"#).unwrap();
        assert_eq!(pr.mergeable, None);
    }

    #[test]
    fn test_issue_request_serializes_labels() {
        let labels = vec!["bug".to_string(), "help wanted".to_string()];
        let req = CreateIssueRequest {
            title: "Title",
            body: "Body",
            labels: &labels,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["labels"][1], "help wanted");
    }

    #[test]
    fn test_merge_outcome_deserializes() {
        let outcome: MergeOutcome =
            serde_json::from_str(r#"{"merged": true, "sha": "abc123", "message": "ok"}"#).unwrap();
        assert!(outcome.merged);
        assert_eq!(outcome.sha.as_deref(), Some("abc123"));
    }
}
