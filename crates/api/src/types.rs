use serde::{Deserialize, Serialize};

use crate::dates::CanonicalDate;

/// Payload for creating an account. The server calls the display name
/// `userName`; everywhere in this client it is the nickname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: String,
    pub password: String,
    #[serde(rename = "userName")]
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    #[serde(rename = "userName")]
    pub nickname: String,
}

/// Wire shape of the duplicate-ID probe. The server answers in terms of
/// "is duplicated"; callers ask "is available".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdAvailability {
    pub is_user_id_duplicated: bool,
}

impl IdAvailability {
    pub fn available(&self) -> bool {
        !self.is_user_id_duplicated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneOverview {
    pub milestone_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub deadline: CanonicalDate,
    pub total_issue: u64,
    pub closed_issue: u64,
    pub is_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneListResponse {
    pub milestones: Vec<MilestoneOverview>,
}

/// Outbound milestone payload from the editor. `milestone_id` never goes on
/// the wire; when present it selects the update route and rides in the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDraft {
    #[serde(skip_serializing)]
    pub milestone_id: Option<u64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deadline: CanonicalDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCounts {
    pub open_issue_count: u64,
    pub close_issue_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOverview {
    pub label_id: u64,
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStub {
    pub milestone_id: u64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorOverview {
    pub user_id: String,
}

/// Everything the filter bar needs in one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    #[serde(rename = "issueNumberResponse")]
    pub issue_counts: IssueCounts,
    #[serde(rename = "labelListResponse")]
    pub labels: Vec<LabelOverview>,
    #[serde(rename = "milestoneListResponse")]
    pub milestones: Vec<MilestoneStub>,
    #[serde(rename = "authorListResponse")]
    pub authors: Vec<AuthorOverview>,
}

/// Error bodies are `{ "message": ... }` when the server has something to
/// say; absent or unreadable bodies are tolerated.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
