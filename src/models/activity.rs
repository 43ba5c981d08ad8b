use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Blog,
    Project,
    Service,
    Message,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Publish,
    Unpublish,
    Login,
    Settings,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Success,
    Warning,
    Error,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Blog => "blog",
            ActivityType::Project => "project",
            ActivityType::Service => "service",
            ActivityType::Message => "message",
            ActivityType::System => "system",
        }
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" => Ok(ActivityType::Blog),
            "project" => Ok(ActivityType::Project),
            "service" => Ok(ActivityType::Service),
            "message" => Ok(ActivityType::Message),
            "system" => Ok(ActivityType::System),
            other => Err(format!("unknown activity type: {other}")),
        }
    }
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Delete => "delete",
            ActivityAction::Publish => "publish",
            ActivityAction::Unpublish => "unpublish",
            ActivityAction::Login => "login",
            ActivityAction::Settings => "settings",
            ActivityAction::Error => "error",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ActivityAction::Create),
            "update" => Ok(ActivityAction::Update),
            "delete" => Ok(ActivityAction::Delete),
            "publish" => Ok(ActivityAction::Publish),
            "unpublish" => Ok(ActivityAction::Unpublish),
            "login" => Ok(ActivityAction::Login),
            "settings" => Ok(ActivityAction::Settings),
            "error" => Ok(ActivityAction::Error),
            other => Err(format!("unknown activity action: {other}")),
        }
    }
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Success => "success",
            ActivityStatus::Warning => "warning",
            ActivityStatus::Error => "error",
        }
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ActivityStatus::Success),
            "warning" => Ok(ActivityStatus::Warning),
            "error" => Ok(ActivityStatus::Error),
            other => Err(format!("unknown activity status: {other}")),
        }
    }
}

/// An audit-log record of one administrative action. Immutable once written;
/// removed only by the retention sweep or an explicit purge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub entity: ActivityType,
    pub action: ActivityAction,
    pub title: String,
    pub description: Option<String>,
    pub metadata: Value,
    pub actor: Option<String>,
    pub ip: String,
    pub user_agent: String,
    pub status: ActivityStatus,
    pub importance: super::notification::Importance,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub entity: ActivityType,
    pub action: ActivityAction,
    pub title: String,
    pub description: Option<String>,
    pub metadata: Value,
    pub actor: Option<String>,
    /// Best-effort request context; empty when the headers were absent.
    pub ip: String,
    pub user_agent: String,
    pub status: ActivityStatus,
    pub importance: super::notification::Importance,
}

impl NewActivity {
    pub fn new(entity: ActivityType, action: ActivityAction, title: impl Into<String>) -> Self {
        Self {
            entity,
            action,
            title: title.into(),
            description: None,
            metadata: json!({}),
            actor: None,
            ip: String::new(),
            user_agent: String::new(),
            status: ActivityStatus::default(),
            importance: super::notification::Importance::default(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        Ok(())
    }

    pub fn materialize(self) -> Result<Activity, AppError> {
        self.validate()?;
        Ok(Activity {
            id: Uuid::new_v4(),
            entity: self.entity,
            action: self.action,
            title: self.title,
            description: self.description,
            metadata: self.metadata,
            actor: self.actor,
            ip: self.ip,
            user_agent: self.user_agent,
            status: self.status,
            importance: self.importance,
            created_at: Utc::now(),
        })
    }
}

/// Query filters for the activity timeline. Absent fields are unconstrained.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityFilter {
    #[serde(rename = "type")]
    pub entity: Option<ActivityType>,
    pub action: Option<ActivityAction>,
    pub status: Option<ActivityStatus>,
    pub importance: Option<super::notification::Importance>,
    #[serde(alias = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(alias = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
}

impl ActivityFilter {
    pub fn matches(&self, a: &Activity) -> bool {
        self.entity.map_or(true, |t| a.entity == t)
            && self.action.map_or(true, |x| a.action == x)
            && self.status.map_or(true, |s| a.status == s)
            && self.importance.map_or(true, |i| a.importance == i)
            && self.start_date.map_or(true, |t| a.created_at >= t)
            && self.end_date.map_or(true, |t| a.created_at <= t)
    }
}

/// Filters for bulk deletion. `older_than` bounds creation time from above.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityPurgeFilter {
    #[serde(rename = "type")]
    pub entity: Option<ActivityType>,
    pub action: Option<ActivityAction>,
    pub status: Option<ActivityStatus>,
    pub importance: Option<super::notification::Importance>,
    #[serde(alias = "olderThan")]
    pub older_than: Option<DateTime<Utc>>,
}

impl ActivityPurgeFilter {
    pub fn matches(&self, a: &Activity) -> bool {
        self.entity.map_or(true, |t| a.entity == t)
            && self.action.map_or(true, |x| a.action == x)
            && self.status.map_or(true, |s| a.status == s)
            && self.importance.map_or(true, |i| a.importance == i)
            && self.older_than.map_or(true, |t| a.created_at < t)
    }
}
