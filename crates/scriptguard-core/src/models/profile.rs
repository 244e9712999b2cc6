//! User profile and subscription plan.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription plan. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Trial,
    Basic,
    Pro,
    Infinite,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [Self::Trial, Self::Basic, Self::Pro, Self::Infinite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Infinite => "infinite",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(Self::Trial),
            "basic" => Some(Self::Basic),
            "pro" => Some(Self::Pro),
            "infinite" => Some(Self::Infinite),
            _ => None,
        }
    }

    /// The top tier: never charged, never balance-checked.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One profile per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub company_name: String,
    pub age: u32,
    /// Ignored for unlimited plans.
    pub credits: u32,
    pub plan: PlanTier,
    pub name_change_used: bool,
    pub theme_preference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
