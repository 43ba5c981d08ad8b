use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// Severity of a notification, rendered as the bell icon color in the admin UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Success,
    Warning,
    Error,
    #[default]
    Info,
}

/// Content area the notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Blog,
    Project,
    Service,
    Experience,
    Education,
    System,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    #[default]
    Low,
    Medium,
    High,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Success => "success",
            Kind::Warning => "warning",
            Kind::Error => "error",
            Kind::Info => "info",
        }
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Kind::Success),
            "warning" => Ok(Kind::Warning),
            "error" => Ok(Kind::Error),
            "info" => Ok(Kind::Info),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Blog => "blog",
            Category::Project => "project",
            Category::Service => "service",
            Category::Experience => "experience",
            Category::Education => "education",
            Category::System => "system",
            Category::Contact => "contact",
        }
    }

    /// Admin dashboard path for this content area, used as the
    /// click-through link on generated notifications.
    pub fn admin_path(&self) -> &'static str {
        match self {
            Category::Blog => "/admin/blog",
            Category::Project => "/admin/projects",
            Category::Service => "/admin/services",
            Category::Experience => "/admin/experience",
            Category::Education => "/admin/education",
            Category::System => "/admin",
            Category::Contact => "/admin/messages",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" => Ok(Category::Blog),
            "project" => Ok(Category::Project),
            "service" => Ok(Category::Service),
            "experience" => Ok(Category::Experience),
            "education" => Ok(Category::Education),
            "system" => Ok(Category::System),
            "contact" => Ok(Category::Contact),
            other => Err(format!("unknown notification category: {other}")),
        }
    }
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
        }
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Importance::Low),
            "medium" => Ok(Importance::Medium),
            "high" => Ok(Importance::High),
            other => Err(format!("unknown importance: {other}")),
        }
    }
}

/// A persisted notification, surfaced in the admin bell UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub category: Category,
    pub read: bool,
    pub link: Option<String>,
    pub importance: Importance,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// Content-mutation events that generate notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEvent {
    Created,
    Updated,
    Deleted,
    Published,
}

impl ContentEvent {
    fn verb(&self) -> &'static str {
        match self {
            ContentEvent::Created => "created",
            ContentEvent::Updated => "updated",
            ContentEvent::Deleted => "deleted",
            ContentEvent::Published => "published",
        }
    }
}

/// A notification that has not been persisted yet. Built by handlers or by
/// the per-domain-event constructors, validated, then handed to the store.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub message: String,
    pub kind: Kind,
    pub category: Category,
    pub link: Option<String>,
    pub importance: Importance,
    pub metadata: Value,
}

impl NewNotification {
    pub fn new(message: impl Into<String>, category: Category) -> Self {
        Self {
            message: message.into(),
            kind: Kind::default(),
            category,
            link: None,
            importance: Importance::default(),
            metadata: json!({}),
        }
    }

    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build the notification for a content-mutation event from a message
    /// template. Deletions are tagged `warning`, everything else `success`.
    pub fn content_event(category: Category, event: ContentEvent, title: &str) -> Self {
        let noun = match category {
            Category::Blog => "Blog post",
            Category::Project => "Project",
            Category::Service => "Service",
            Category::Experience => "Experience entry",
            Category::Education => "Education entry",
            Category::Contact => "Contact message",
            Category::System => "System item",
        };
        let kind = match event {
            ContentEvent::Deleted => Kind::Warning,
            _ => Kind::Success,
        };
        Self::new(format!("{noun} \"{title}\" {}", event.verb()), category)
            .kind(kind)
            .link(category.admin_path())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.message.trim().is_empty() {
            return Err(AppError::Validation("message must not be empty".into()));
        }
        Ok(())
    }

    /// Assign identity and timestamps, producing the record to insert.
    /// `read` always starts false.
    pub fn materialize(self) -> Result<Notification, AppError> {
        self.validate()?;
        Ok(Notification {
            id: Uuid::new_v4(),
            message: self.message,
            kind: self.kind,
            category: self.category,
            read: false,
            link: self.link,
            importance: self.importance,
            metadata: self.metadata,
            created_at: Utc::now(),
        })
    }
}

/// Optional filters for listing notifications. An absent field means
/// "unconstrained" — there is no null-as-wildcard anywhere.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    pub category: Option<Category>,
    #[serde(alias = "type")]
    pub kind: Option<Kind>,
    pub read: Option<bool>,
    pub importance: Option<Importance>,
}

impl NotificationFilter {
    pub fn matches(&self, n: &Notification) -> bool {
        self.category.map_or(true, |c| n.category == c)
            && self.kind.map_or(true, |k| n.kind == k)
            && self.read.map_or(true, |r| n.read == r)
            && self.importance.map_or(true, |i| n.importance == i)
    }
}
