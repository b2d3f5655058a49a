use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Identifier as the backend sent it: some endpoints use numeric keys,
/// others strings. Serialized back in the same shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum OpaqueId {
    Number(i64),
    Text(String),
}

impl OpaqueId {
    pub fn from_json(v: &serde_json::Value) -> Option<Self> {
        match v {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(OpaqueId::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(OpaqueId::Number),
            _ => None,
        }
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpaqueId::Number(n) => write!(f, "{}", n),
            OpaqueId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OpaqueId {
    fn from(s: &str) -> Self {
        OpaqueId::Text(s.to_string())
    }
}

impl From<i64> for OpaqueId {
    fn from(n: i64) -> Self {
        OpaqueId::Number(n)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Completed,
    Resume,
    Pending,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Option<OpaqueId>,
    pub title: String,
    pub completed: bool,
    pub needs_resume: bool,
}

impl Activity {
    // completed wins over a stale resume flag
    pub fn status(&self) -> ActivityStatus {
        if self.completed {
            ActivityStatus::Completed
        } else if self.needs_resume {
            ActivityStatus::Resume
        } else {
            ActivityStatus::Pending
        }
    }
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: Option<OpaqueId>,
    pub index: usize, // position in the curriculum, never reordered
    pub title: String,
    pub activities: Vec<Activity>,
}

/// Ordered modules assigned to one enrollment.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Curriculum {
    pub modules: Vec<Module>,
}

impl Curriculum {
    /// Activities in curriculum order with their (module, activity) position.
    pub fn positions(&self) -> impl Iterator<Item = (&Module, usize, &Activity)> + '_ {
        self.modules
            .iter()
            .flat_map(|m| m.activities.iter().enumerate().map(move |(i, a)| (m, i, a)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total: u32,
    pub completed: u32,
    pub percent: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub per_module: BTreeMap<usize, ProgressSummary>,
    pub overall: ProgressSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NextReason {
    /// learner left an open session here
    Resume,
    /// first activity not yet completed
    Pending,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NextActivityRef {
    pub module_index: usize,
    pub activity_index: usize,
    pub title: String,
    pub activity_id: Option<OpaqueId>,
    pub module_title: String,
    pub reason: NextReason,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("no curriculum returned for enrollment")]
    Missing,
    #[error("curriculum unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub enrollment_id: OpaqueId,
    pub snapshot: Result<Curriculum, SnapshotError>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    pub enrollment_id: OpaqueId,
    pub summary: ProgressSummary,
    #[serialize_always]
    pub next: Option<NextActivityRef>,
    pub error: Option<String>,
}

// --- HTTP payloads ---

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub overall: ProgressSummary,
    pub per_module: BTreeMap<usize, ProgressSummary>,
    pub next: Option<NextActivityRef>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InlineRosterEntry {
    pub enrollment_id: OpaqueId,
    #[serde(default)]
    pub curriculum: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InlineRosterReq {
    #[serde(default)]
    pub entries: Vec<InlineRosterEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FetchRosterReq {
    pub enrollment_ids: Vec<OpaqueId>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub rows: Vec<RosterRow>,
    pub computed_at: DateTime<Utc>,
}
