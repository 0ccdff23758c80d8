//! Resolution schema - One panelist's recommendation for a case

use serde::{Deserialize, Serialize};

/// Lifecycle of a resolution record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionState {
    #[default]
    Draft,
    Submitted,
}

/// Panelist's verdict on whether the dispute was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved,
    NoOutcome,
}

impl std::fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionOutcome::Resolved => write!(f, "resolved"),
            ResolutionOutcome::NoOutcome => write!(f, "no_outcome"),
        }
    }
}

/// Input for saving or submitting a resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionPayload {
    #[serde(default)]
    pub resolution_status: Option<ResolutionOutcome>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
}

/// One record per (case, panelist)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub case_id: String,
    pub panelist_id: String,
    pub state: ResolutionState,
    #[serde(default)]
    pub resolution_status: Option<ResolutionOutcome>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

impl Resolution {
    /// Create an empty draft
    pub fn draft(case_id: &str, panelist_id: &str) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Resolution {
            case_id: case_id.to_string(),
            panelist_id: panelist_id.to_string(),
            state: ResolutionState::Draft,
            resolution_status: None,
            notes: String::new(),
            outcome: None,
            recommendations: None,
            created_at: now.clone(),
            updated_at: now,
            submitted_at: None,
        }
    }

    /// Return a new Resolution carrying the payload's content
    pub fn with_payload(mut self, payload: &ResolutionPayload) -> Self {
        self.resolution_status = payload.resolution_status;
        self.notes = payload.notes.trim().to_string();
        self.outcome = payload.outcome.clone();
        self.recommendations = payload.recommendations.clone();
        self.updated_at = chrono::Utc::now().to_rfc3339();
        self
    }

    /// Return a new Resolution marked submitted
    pub fn as_submitted(mut self) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        self.state = ResolutionState::Submitted;
        self.submitted_at = Some(now.clone());
        self.updated_at = now;
        self
    }

    pub fn is_submitted(&self) -> bool {
        self.state == ResolutionState::Submitted
    }
}

/// Submitted resolutions over the live panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Progress {
    pub submitted: usize,
    pub total: usize,
}

impl Progress {
    /// Every active panelist has submitted, and there is at least one
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.submitted == self.total
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.submitted, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&ResolutionOutcome::NoOutcome).unwrap(),
            "\"no_outcome\""
        );
        assert_eq!(
            serde_json::from_str::<ResolutionOutcome>("\"resolved\"").unwrap(),
            ResolutionOutcome::Resolved
        );
    }

    #[test]
    fn test_progress_complete() {
        assert!(!Progress { submitted: 0, total: 0 }.is_complete());
        assert!(!Progress { submitted: 1, total: 2 }.is_complete());
        assert!(Progress { submitted: 2, total: 2 }.is_complete());
    }

    #[test]
    fn test_submit_sets_timestamp() {
        let payload = ResolutionPayload {
            resolution_status: Some(ResolutionOutcome::Resolved),
            notes: "  parties agreed  ".into(),
            outcome: Some("Shared schedule".into()),
            recommendations: None,
        };
        let resolution = Resolution::draft("c", "p").with_payload(&payload);
        assert_eq!(resolution.notes, "parties agreed");
        assert!(!resolution.is_submitted());

        let submitted = resolution.as_submitted();
        assert!(submitted.is_submitted());
        assert!(submitted.submitted_at.is_some());
    }
}
