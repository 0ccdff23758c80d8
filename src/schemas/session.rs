//! Session schema - Resumable intake drafts and their step payloads

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::case::{CaseType, Party, Priority};

/// One of the six fixed intake steps, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    CaseOverview,
    Parties,
    Background,
    DesiredOutcomes,
    Scheduling,
    Documents,
}

/// Canonical step ordering; step numbers are 1-based positions in this list.
pub const INTAKE_STEPS: &[IntakeStep] = &[
    IntakeStep::CaseOverview,
    IntakeStep::Parties,
    IntakeStep::Background,
    IntakeStep::DesiredOutcomes,
    IntakeStep::Scheduling,
    IntakeStep::Documents,
];

impl IntakeStep {
    /// 1-based step number
    pub fn number(self) -> u8 {
        INTAKE_STEPS
            .iter()
            .position(|&s| s == self)
            .map(|i| i as u8 + 1)
            .unwrap_or(0)
    }

    /// Look a step up by its 1-based number
    pub fn from_number(number: u8) -> Option<IntakeStep> {
        if number == 0 {
            return None;
        }
        INTAKE_STEPS.get(number as usize - 1).copied()
    }

    pub fn first() -> IntakeStep {
        INTAKE_STEPS[0]
    }
}

impl std::fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeStep::CaseOverview => write!(f, "case_overview"),
            IntakeStep::Parties => write!(f, "parties"),
            IntakeStep::Background => write!(f, "background"),
            IntakeStep::DesiredOutcomes => write!(f, "desired_outcomes"),
            IntakeStep::Scheduling => write!(f, "scheduling"),
            IntakeStep::Documents => write!(f, "documents"),
        }
    }
}

impl std::str::FromStr for IntakeStep {
    type Err = String;

    /// Accepts either the step number ("3") or its name ("background")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u8>() {
            return IntakeStep::from_number(n).ok_or_else(|| format!("Unknown intake step: {}", s));
        }
        match s {
            "case_overview" => Ok(IntakeStep::CaseOverview),
            "parties" => Ok(IntakeStep::Parties),
            "background" => Ok(IntakeStep::Background),
            "desired_outcomes" => Ok(IntakeStep::DesiredOutcomes),
            "scheduling" => Ok(IntakeStep::Scheduling),
            "documents" => Ok(IntakeStep::Documents),
            _ => Err(format!("Unknown intake step: {}", s)),
        }
    }
}

/// Which disputant a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    PartyA,
    PartyB,
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartyRole::PartyA => write!(f, "party_a"),
            PartyRole::PartyB => write!(f, "party_b"),
        }
    }
}

/// Step 1 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOverview {
    pub title: String,
    pub description: String,
    pub case_type: CaseType,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_in_dispute: Option<String>,
}

/// Step 2 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartiesStep {
    pub parties: Vec<Party>,
}

/// Step 3 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub timeline: String,
    #[serde(default)]
    pub key_issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_attempts: Option<String>,
}

/// Step 4 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredOutcomes {
    pub desired_outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptable_compromises: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_negotiables: Option<String>,
}

/// How the parties would like to meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingFormat {
    Online,
    InPerson,
    Hybrid,
}

/// Step 5 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduling {
    #[serde(default)]
    pub availability: Vec<String>,
    pub preferred_format: MeetingFormat,
    pub timezone: String,
}

/// Reference to a file held by the external storage service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub storage_key: String,
}

/// Step 6 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Documents {
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub confidentiality_acknowledged: bool,
}

/// Payload for a single intake step, tagged by the step it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepPayload {
    CaseOverview(CaseOverview),
    Parties(PartiesStep),
    Background(Background),
    DesiredOutcomes(DesiredOutcomes),
    Scheduling(Scheduling),
    Documents(Documents),
}

impl StepPayload {
    /// The step this payload belongs to
    pub fn step(&self) -> IntakeStep {
        match self {
            StepPayload::CaseOverview(_) => IntakeStep::CaseOverview,
            StepPayload::Parties(_) => IntakeStep::Parties,
            StepPayload::Background(_) => IntakeStep::Background,
            StepPayload::DesiredOutcomes(_) => IntakeStep::DesiredOutcomes,
            StepPayload::Scheduling(_) => IntakeStep::Scheduling,
            StepPayload::Documents(_) => IntakeStep::Documents,
        }
    }
}

/// In-progress answers, one slot per step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_overview: Option<CaseOverview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parties: Option<PartiesStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_outcomes: Option<DesiredOutcomes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<Scheduling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Documents>,
}

impl Draft {
    /// Overwrite the slot belonging to the payload's step
    pub fn merge(&mut self, payload: StepPayload) {
        match payload {
            StepPayload::CaseOverview(p) => self.case_overview = Some(p),
            StepPayload::Parties(p) => self.parties = Some(p),
            StepPayload::Background(p) => self.background = Some(p),
            StepPayload::DesiredOutcomes(p) => self.desired_outcomes = Some(p),
            StepPayload::Scheduling(p) => self.scheduling = Some(p),
            StepPayload::Documents(p) => self.documents = Some(p),
        }
    }

    /// Whether the slot for `step` is filled
    pub fn has(&self, step: IntakeStep) -> bool {
        match step {
            IntakeStep::CaseOverview => self.case_overview.is_some(),
            IntakeStep::Parties => self.parties.is_some(),
            IntakeStep::Background => self.background.is_some(),
            IntakeStep::DesiredOutcomes => self.desired_outcomes.is_some(),
            IntakeStep::Scheduling => self.scheduling.is_some(),
            IntakeStep::Documents => self.documents.is_some(),
        }
    }

    /// Convert into a full submission, or report the first empty slot
    pub fn to_submission(&self) -> Result<Submission, IntakeStep> {
        let missing = INTAKE_STEPS.iter().copied().find(|&s| !self.has(s));
        if let Some(step) = missing {
            return Err(step);
        }
        match (
            &self.case_overview,
            &self.parties,
            &self.background,
            &self.desired_outcomes,
            &self.scheduling,
            &self.documents,
        ) {
            (Some(o), Some(p), Some(b), Some(d), Some(s), Some(docs)) => Ok(Submission {
                case_overview: o.clone(),
                parties: p.clone(),
                background: b.clone(),
                desired_outcomes: d.clone(),
                scheduling: s.clone(),
                documents: docs.clone(),
            }),
            _ => Err(IntakeStep::first()),
        }
    }
}

/// A completed set of intake answers attached to a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub case_overview: CaseOverview,
    pub parties: PartiesStep,
    pub background: Background,
    pub desired_outcomes: DesiredOutcomes,
    pub scheduling: Scheduling,
    pub documents: Documents,
}

/// A resumable intake session owned by one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Schema version for forward compatibility
    pub schema_version: u32,

    pub session_id: String,

    /// Party A session this one joins (Party B only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_session_id: Option<String>,

    pub role: PartyRole,

    /// User id of the submitting party
    pub owner: String,

    /// Step to resume at. Once every step is completed it stays on the last
    /// step submitted; `is_complete` then means ready to finalize.
    pub current_step: IntakeStep,

    #[serde(default)]
    pub completed_steps: BTreeSet<IntakeStep>,

    #[serde(default)]
    pub draft: Draft,

    /// Set once finalized; the session is read-only afterwards
    #[serde(default)]
    pub archived: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,

    /// ISO 8601 creation timestamp
    pub created_at: String,

    /// ISO 8601 timestamp of the last successful write
    pub last_modified: String,
}

impl Session {
    /// Create a new Party A session
    pub fn new(session_id: String, owner: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Session {
            schema_version: 1,
            session_id,
            parent_session_id: None,
            role: PartyRole::PartyA,
            owner,
            current_step: IntakeStep::first(),
            completed_steps: BTreeSet::new(),
            draft: Draft::default(),
            archived: false,
            case_id: None,
            created_at: now.clone(),
            last_modified: now,
        }
    }

    /// Create a Party B session joining `parent_session_id`
    pub fn joining(session_id: String, owner: String, parent_session_id: String) -> Self {
        let mut session = Session::new(session_id, owner);
        session.role = PartyRole::PartyB;
        session.parent_session_id = Some(parent_session_id);
        session
    }

    pub fn is_complete(&self) -> bool {
        INTAKE_STEPS.iter().all(|s| self.completed_steps.contains(s))
    }

    /// First step not yet completed, in step order
    pub fn first_missing_step(&self) -> Option<IntakeStep> {
        INTAKE_STEPS
            .iter()
            .copied()
            .find(|s| !self.completed_steps.contains(s))
    }

    /// Next incomplete step after `after`, wrapping to the start
    pub fn next_incomplete_after(&self, after: IntakeStep) -> Option<IntakeStep> {
        INTAKE_STEPS
            .iter()
            .copied()
            .filter(|&s| s > after)
            .chain(INTAKE_STEPS.iter().copied().filter(|&s| s <= after))
            .find(|s| !self.completed_steps.contains(s))
    }

    pub fn touch(&mut self) {
        self.last_modified = chrono::Utc::now().to_rfc3339();
    }
}
