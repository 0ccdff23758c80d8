//! Case schema - The durable dispute record

use serde::{Deserialize, Serialize};

use super::session::Submission;

/// Lifecycle status of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Finalized from intake, nobody assigned yet
    Open,
    /// An owning admin has been assigned
    Assigned,
    /// At least one panelist is actively assigned
    PanelAssigned,
    /// Panel work is underway
    InProgress,
    /// All active panelists submitted, or an admin resolved it
    Resolved,
    /// Terminal
    Closed,
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Open => write!(f, "open"),
            CaseStatus::Assigned => write!(f, "assigned"),
            CaseStatus::PanelAssigned => write!(f, "panel_assigned"),
            CaseStatus::InProgress => write!(f, "in_progress"),
            CaseStatus::Resolved => write!(f, "resolved"),
            CaseStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(CaseStatus::Open),
            "assigned" => Ok(CaseStatus::Assigned),
            "panel_assigned" => Ok(CaseStatus::PanelAssigned),
            "in_progress" => Ok(CaseStatus::InProgress),
            "resolved" => Ok(CaseStatus::Resolved),
            "closed" => Ok(CaseStatus::Closed),
            _ => Err(format!("Unknown case status: {}", s)),
        }
    }
}

/// Kind of dispute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Family,
    Workplace,
    Commercial,
    Neighborhood,
    Consumer,
    Other,
}

/// Case priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A disputant or other involved person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub contact: String,
    /// Free-form role, e.g. "claimant", "respondent", "witness"
    #[serde(default)]
    pub role: String,
}

/// Whether a panel assignment is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Active,
    Removed,
}

/// A panelist's attachment to a case; removed entries are kept for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelAssignment {
    pub panelist_id: String,
    pub status: AssignmentStatus,
    pub assigned_at: String,
    pub assigned_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_at: Option<String>,
}

impl PanelAssignment {
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseNote {
    pub author: String,
    pub text: String,
    pub created_at: String,
}

/// What happened in a timeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    CaseCreated,
    PartyBJoined,
    StatusChanged,
    AdminAssigned,
    PanelistAssigned,
    PanelistRemoved,
    ResolutionSubmitted,
    NoteAdded,
}

impl std::fmt::Display for TimelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimelineKind::CaseCreated => "case_created",
            TimelineKind::PartyBJoined => "party_b_joined",
            TimelineKind::StatusChanged => "status_changed",
            TimelineKind::AdminAssigned => "admin_assigned",
            TimelineKind::PanelistAssigned => "panelist_assigned",
            TimelineKind::PanelistRemoved => "panelist_removed",
            TimelineKind::ResolutionSubmitted => "resolution_submitted",
            TimelineKind::NoteAdded => "note_added",
        };
        write!(f, "{}", s)
    }
}

/// Append-only history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub kind: TimelineKind,
    pub actor: String,
    pub timestamp: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_status: Option<CaseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_status: Option<CaseStatus>,
}

impl TimelineEntry {
    pub fn new(kind: TimelineKind, actor: &str, description: impl Into<String>) -> Self {
        TimelineEntry {
            kind,
            actor: actor.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            description: description.into(),
            from_status: None,
            to_status: None,
        }
    }

    pub fn status_change(actor: &str, from: CaseStatus, to: CaseStatus) -> Self {
        TimelineEntry {
            from_status: Some(from),
            to_status: Some(to),
            ..TimelineEntry::new(
                TimelineKind::StatusChanged,
                actor,
                format!("Status changed from {} to {}", from, to),
            )
        }
    }
}

/// Admin-supplied disposition when resolving a case by override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminResolution {
    pub feedback: String,
    pub next_steps: String,
}

/// The durable dispute record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Schema version for forward compatibility
    pub schema_version: u32,

    pub case_id: String,
    pub title: String,
    pub description: String,
    pub case_type: CaseType,
    pub priority: Priority,

    /// User id of Party A
    pub created_by: String,

    /// User id of Party B, once their submission is attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_by: Option<String>,

    /// Owning admin
    #[serde(default)]
    pub assigned_to: Option<String>,

    pub status: CaseStatus,

    /// Party A's listed parties, then Party B's once attached
    #[serde(default)]
    pub parties: Vec<Party>,

    pub party_a_submission: Submission,

    #[serde(default)]
    pub party_b_submission: Option<Submission>,

    #[serde(default)]
    pub assigned_panelists: Vec<PanelAssignment>,

    #[serde(default)]
    pub notes: Vec<CaseNote>,

    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_resolution: Option<AdminResolution>,

    /// Party A session this case was finalized from
    pub source_session_id: String,

    /// ISO 8601 creation timestamp
    pub created_at: String,

    /// ISO 8601 last update timestamp
    pub updated_at: String,
}

impl Case {
    /// Build an open case from Party A's completed intake
    pub fn from_submission(
        case_id: String,
        created_by: String,
        source_session_id: String,
        submission: Submission,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let overview = &submission.case_overview;
        Case {
            schema_version: 1,
            case_id,
            title: overview.title.trim().to_string(),
            description: overview.description.trim().to_string(),
            case_type: overview.case_type,
            priority: overview.priority.unwrap_or_default(),
            created_by: created_by.clone(),
            joined_by: None,
            assigned_to: None,
            status: CaseStatus::Open,
            parties: submission.parties.parties.clone(),
            party_a_submission: submission,
            party_b_submission: None,
            assigned_panelists: Vec::new(),
            notes: Vec::new(),
            timeline: vec![TimelineEntry::new(
                TimelineKind::CaseCreated,
                &created_by,
                "Case created from intake",
            )],
            admin_resolution: None,
            source_session_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    // ===== IMMUTABLE BUILDER METHODS =====

    /// Return a new Case with the given status, updating the timestamp
    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = status;
        self.touch_returning()
    }

    /// Return a new Case with the given timeline entry appended
    pub fn with_timeline_entry(mut self, entry: TimelineEntry) -> Self {
        self.timeline.push(entry);
        self.touch_returning()
    }

    fn touch_returning(mut self) -> Self {
        self.touch();
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    // ===== QUERIES =====

    pub fn is_closed(&self) -> bool {
        self.status == CaseStatus::Closed
    }

    /// The active assignment for `panelist_id`, if any
    pub fn active_assignment(&self, panelist_id: &str) -> Option<&PanelAssignment> {
        self.assigned_panelists
            .iter()
            .find(|a| a.is_active() && a.panelist_id == panelist_id)
    }

    /// Ids of actively assigned panelists, in assignment order
    pub fn active_panelists(&self) -> Vec<&str> {
        self.assigned_panelists
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.panelist_id.as_str())
            .collect()
    }

    pub fn active_panel_count(&self) -> usize {
        self.assigned_panelists.iter().filter(|a| a.is_active()).count()
    }

    /// Whether `user_id` is a party to the case or sits (or sat) on its panel
    pub fn involves(&self, user_id: &str) -> bool {
        self.created_by == user_id
            || self.joined_by.as_deref() == Some(user_id)
            || self.assigned_panelists.iter().any(|a| a.panelist_id == user_id)
    }
}
