//! Append-only activity (audit) log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    AccountCreated,
    Encrypt,
    Analyze,
    KeyCreated,
    KeyStatusChanged,
    KeyDeleted,
    ProfileRenamed,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountCreated => "account_created",
            Self::Encrypt => "encrypt",
            Self::Analyze => "analyze",
            Self::KeyCreated => "key_created",
            Self::KeyStatusChanged => "key_status_changed",
            Self::KeyDeleted => "key_deleted",
            Self::ProfileRenamed => "profile_renamed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "account_created" => Some(Self::AccountCreated),
            "encrypt" => Some(Self::Encrypt),
            "analyze" => Some(Self::Analyze),
            "key_created" => Some(Self::KeyCreated),
            "key_status_changed" => Some(Self::KeyStatusChanged),
            "key_deleted" => Some(Self::KeyDeleted),
            "profile_renamed" => Some(Self::ProfileRenamed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Success,
    Completed,
    Failed,
    Pending,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Written once, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub user_id: String,
    pub action: ActivityAction,
    pub item_name: String,
    pub status: ActivityStatus,
    pub credits_used: u32,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        user_id: &str,
        action: ActivityAction,
        item_name: &str,
        status: ActivityStatus,
        credits_used: u32,
        details: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: super::new_id(),
            user_id: user_id.to_string(),
            action,
            item_name: item_name.to_string(),
            status,
            credits_used,
            details,
            created_at: now,
        }
    }
}
